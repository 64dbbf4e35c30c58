//! Rebuilding typed data from a value tree.
//!
//! Destinations opt in by implementing [`Unwrap`]. The walk is structural
//! rather than schema-driven: arrays fill sequences, objects fill maps keyed
//! by strings, scalars fill scalars. `null` leaves the destination as it
//! was, so "absent" and "explicit zero" stay distinguishable.
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! let doc = xjson::parse(r#"{"tags": {"env": "prod", "tier": "web"}, "ports": [80, 443]}"#);
//!
//! let tags: BTreeMap<String, String> = doc.get("tags").unwrap_as().unwrap();
//! assert_eq!(tags["tier"], "web");
//!
//! let mut ports: Vec<u16> = Vec::new();
//! doc.get("ports").unwrap_into(&mut ports).unwrap();
//! assert_eq!(ports, [80, 443]);
//! ```

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use std::collections::HashMap;

use crate::node::Node;
use crate::{Error, ErrorKind, Number, Value};

/// A destination [`Value::unwrap_into`] can fill.
///
/// `unwrap_from` is only called with values that hold data: errors,
/// missing values and `null` are handled before it runs. An implementation
/// must leave `self` untouched when it returns an error.
pub trait Unwrap {
    /// Overwrite `self` with the content of `value`.
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error>;
}

impl Value<'_> {
    /// Fill `dest` from this value.
    ///
    /// - A value carrying an error (or a missing value) returns that error.
    /// - `null` leaves `dest` untouched and succeeds.
    /// - Anything else is handed to [`Unwrap::unwrap_from`].
    pub fn unwrap_into<T>(&self, dest: &mut T) -> Result<(), Error>
    where
        T: Unwrap + ?Sized,
    {
        match self.node_or_error()? {
            Node::Null(_) => Ok(()),
            _ => dest.unwrap_from(self).inspect_err(|e| {
                trace!("unwrap at {} failed: {}", self.selector(), e);
            }),
        }
    }

    /// Build a `T` from this value, starting from `T::default()`.
    pub fn unwrap_as<T>(&self) -> Result<T, Error>
    where
        T: Unwrap + Default,
    {
        let mut dest = T::default();
        self.unwrap_into(&mut dest).inspect_err(|e| {
            debug!("unwrap failed: {}", e);
        })?;
        Ok(dest)
    }

    /// The error for a value that does not fit the `expected` destination
    /// shape, bound to this value's selector.
    pub fn shape_mismatch(&self, expected: &'static str) -> Error {
        match self.error() {
            Some(e) => e.clone(),
            None => Error::new(
                ErrorKind::ShapeMismatch {
                    actual: self.kind(),
                    expected,
                },
                self.selector().clone(),
            ),
        }
    }

    fn out_of_range(&self, number: &Number<'_>, target: &'static str) -> Error {
        Error::new(
            ErrorKind::NumberOutOfRange {
                raw: number.raw().to_owned(),
                target,
            },
            self.selector().clone(),
        )
    }
}

impl Unwrap for bool {
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        *self = value.maybe_bool().ok_or_else(|| value.shape_mismatch("bool"))?;
        Ok(())
    }
}

impl Unwrap for String {
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        let s = value
            .maybe_str()
            .ok_or_else(|| value.shape_mismatch("string"))?;
        s.clone_into(self);
        Ok(())
    }
}

macro_rules! unwrap_integer {
    ($($ty:ty),*) => {
        $(
            impl Unwrap for $ty {
                fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
                    let number = value
                        .maybe_number()
                        .ok_or_else(|| value.shape_mismatch(stringify!($ty)))?;
                    *self = number
                        .to_i128()
                        .and_then(|n| <$ty>::try_from(n).ok())
                        .ok_or_else(|| value.out_of_range(&number, stringify!($ty)))?;
                    Ok(())
                }
            }
        )*
    };
}

unwrap_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Unwrap for f64 {
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        let number = value
            .maybe_number()
            .ok_or_else(|| value.shape_mismatch("f64"))?;
        *self = number.to_f64();
        Ok(())
    }
}

impl Unwrap for f32 {
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        let number = value
            .maybe_number()
            .ok_or_else(|| value.shape_mismatch("f32"))?;
        let wide = number.to_f64();
        let narrow = wide as f32;
        if wide.is_finite() && narrow.is_infinite() {
            return Err(value.out_of_range(&number, "f32"));
        }
        *self = narrow;
        Ok(())
    }
}

/// `None` is replaced with a freshly built `T`; `Some` is filled in place.
impl<T> Unwrap for Option<T>
where
    T: Unwrap + Default,
{
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        match self {
            Some(inner) => value.unwrap_into(inner),
            None => {
                *self = Some(value.unwrap_as()?);
                Ok(())
            }
        }
    }
}

impl<T> Unwrap for Box<T>
where
    T: Unwrap + ?Sized,
{
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        value.unwrap_into(&mut **self)
    }
}

/// Replaced by a new vector with one element per array element.
impl<T> Unwrap for Vec<T>
where
    T: Unwrap + Default,
{
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        let elements = value
            .maybe_array()
            .ok_or_else(|| value.shape_mismatch("sequence"))?;
        let items = elements
            .map(|element| element.unwrap_as::<T>())
            .collect::<Result<Vec<_>, _>>()?;
        *self = items;
        Ok(())
    }
}

/// Replaced by a new map with one entry per object member.
impl<T, S> Unwrap for HashMap<String, T, S>
where
    T: Unwrap + Default,
    S: BuildHasher + Default,
{
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        *self = collect_members(value)?;
        Ok(())
    }
}

/// Replaced by a new map with one entry per object member.
impl<T> Unwrap for BTreeMap<String, T>
where
    T: Unwrap + Default,
{
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        *self = collect_members(value)?;
        Ok(())
    }
}

fn collect_members<T, M>(value: &Value<'_>) -> Result<M, Error>
where
    T: Unwrap + Default,
    M: FromIterator<(String, T)>,
{
    let members = value
        .maybe_object()
        .ok_or_else(|| value.shape_mismatch("map"))?;
    members
        .map(|(key, member)| Ok::<_, Error>((key.to_owned(), member.unwrap_as::<T>()?)))
        .collect()
}

/// Any value, as its natural host representation.
impl Unwrap for serde_json::Value {
    fn unwrap_from(&mut self, value: &Value<'_>) -> Result<(), Error> {
        *self = value.to_host()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Kind, parse};
    use xjson_testhelpers::test;

    #[test]
    fn scalars() {
        let doc = parse(r#"{"b": true, "s": "hi", "i": -7, "f": 2.5, "big": 300}"#);
        assert!(doc.get("b").unwrap_as::<bool>().unwrap());
        assert_eq!(doc.get("s").unwrap_as::<String>().unwrap(), "hi");
        assert_eq!(doc.get("i").unwrap_as::<i32>().unwrap(), -7);
        assert_eq!(doc.get("f").unwrap_as::<f64>().unwrap(), 2.5);
        assert_eq!(doc.get("f").unwrap_as::<i64>().unwrap(), 2);
        assert_eq!(doc.get("big").unwrap_as::<u16>().unwrap(), 300);
    }

    #[test]
    fn integers_out_of_width_fail() {
        let doc = parse(r#"{"big": 300, "neg": -1, "huge": 1e300}"#);
        let err = doc.get("big").unwrap_as::<u8>().unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::NumberOutOfRange {
                raw: "300".into(),
                target: "u8"
            }
        );
        assert_eq!(err.to_string(), "xjson: number 300 out of range for u8 (at: $root.big)");
        assert!(doc.get("neg").unwrap_as::<u32>().is_err());
        assert!(doc.get("huge").unwrap_as::<i64>().is_err());
        assert!(doc.get("huge").unwrap_as::<f32>().is_err());
        assert!(doc.get("huge").unwrap_as::<f64>().is_ok());
    }

    #[test]
    fn null_leaves_destination_untouched() {
        let doc = parse(r#"{"n": null}"#);
        let mut dest = 42_i64;
        doc.get("n").unwrap_into(&mut dest).unwrap();
        assert_eq!(dest, 42);

        let mut opt: Option<String> = None;
        doc.get("n").unwrap_into(&mut opt).unwrap();
        assert_eq!(opt, None);
    }

    #[test]
    fn errors_leave_destination_untouched() {
        let doc = parse(r#"{"xs": [1, 2, "three"]}"#);
        let mut dest = vec![9_i64];
        let err = doc.get("xs").unwrap_into(&mut dest).unwrap_err();
        assert_eq!(dest, [9]);
        assert_eq!(err.selector().unwrap().to_string(), "$root.xs[2]");
        assert_eq!(
            err.kind(),
            &ErrorKind::ShapeMismatch {
                actual: Kind::String,
                expected: "i64"
            }
        );

        let mut flag = true;
        let err = doc.get("missing").unwrap_into(&mut flag).unwrap_err();
        assert_eq!(err.code(), "xjson::key_not_found");
        assert!(flag);
    }

    #[test]
    fn missing_values_report_their_deferred_error() {
        let doc = parse(r#"{"a": []}"#);
        let err = doc.path(["a", "b"]).unwrap_as::<i64>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "xjson: array is not a json object (at: $root.a)"
        );
        let err = doc
            .map_index("nope")
            .unwrap_as::<Vec<i64>>()
            .unwrap_err();
        assert_eq!(err.to_string(), "xjson: key not found (at: $root.nope)");
    }

    #[test]
    fn options_and_boxes_allocate() {
        let doc = parse(r#"{"n": 5, "inner": {"k": "v"}}"#);
        let mut opt: Option<u8> = None;
        doc.get("n").unwrap_into(&mut opt).unwrap();
        assert_eq!(opt, Some(5));

        let mut boxed: Box<Option<HashMap<String, String>>> = Box::new(None);
        doc.get("inner").unwrap_into(&mut boxed).unwrap();
        let inner = (*boxed).clone().unwrap();
        assert_eq!(inner["k"], "v");
    }

    #[test]
    fn nested_containers() {
        let doc = parse(r#"{"grid": [[1, 2], [], [3]], "m": {"a": [true], "b": []}}"#);
        let grid: Vec<Vec<u8>> = doc.get("grid").unwrap_as().unwrap();
        assert_eq!(grid, vec![vec![1, 2], vec![], vec![3]]);

        let m: BTreeMap<String, Vec<bool>> = doc.get("m").unwrap_as().unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m["a"], [true]);
    }

    #[test]
    fn null_elements_keep_defaults() {
        let doc = parse(r#"[1, null, 3]"#);
        let xs: Vec<Option<i64>> = doc.unwrap_as().unwrap();
        assert_eq!(xs, [Some(1), None, Some(3)]);
        let ys: Vec<i64> = doc.unwrap_as().unwrap();
        assert_eq!(ys, [1, 0, 3]);
    }

    #[test]
    fn shape_mismatches() {
        let doc = parse(r#"{"a": [1], "o": {}, "s": "x"}"#);
        let err = doc.get("a").unwrap_as::<String>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "xjson: cannot unwrap array into string (at: $root.a)"
        );
        assert!(doc.get("o").unwrap_as::<Vec<i64>>().is_err());
        assert!(doc.get("a").unwrap_as::<BTreeMap<String, i64>>().is_err());
        assert_eq!(
            doc.get("s").unwrap_as::<bool>().unwrap_err().code(),
            "xjson::shape_mismatch"
        );
    }

    #[test]
    fn host_fallback() {
        let doc = parse(r#"{"a": [1, 2.5, "x", null, {"b": false}]}"#);
        let host: serde_json::Value = doc.get("a").unwrap_as().unwrap();
        assert_eq!(host, serde_json::json!([1, 2.5, "x", null, {"b": false}]));
    }
}
