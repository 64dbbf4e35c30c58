//! Bridging to `serde`: the host representation and serialization.

use alloc::borrow::ToOwned;
use alloc::string::ToString;
use alloc::vec::Vec;

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::node::Node;
use crate::{Error, ErrorKind, Number, Value};

impl Value<'_> {
    /// This value as a [`serde_json::Value`].
    ///
    /// Integral numbers become `i64` or `u64` when they fit and `f64`
    /// otherwise; numbers with a fraction or exponent become `f64`. Numbers
    /// beyond the `f64` range are a `NumberOutOfRange` error.
    ///
    /// ```
    /// let doc = xjson::parse(r#"{"a": [1, 2.5, "x"]}"#);
    /// assert_eq!(doc.to_host().unwrap(), serde_json::json!({"a": [1, 2.5, "x"]}));
    /// ```
    pub fn to_host(&self) -> Result<serde_json::Value, Error> {
        use serde_json::Value as Host;

        match self.node_or_error()? {
            Node::Null(_) => Ok(Host::Null),
            Node::Bool(b, _) => Ok(Host::Bool(*b)),
            Node::Number(n) => host_number(n).map(Host::Number).ok_or_else(|| {
                Error::new(
                    ErrorKind::NumberOutOfRange {
                        raw: n.raw().to_owned(),
                        target: "f64",
                    },
                    self.selector().clone(),
                )
            }),
            Node::String(s) => Ok(Host::String(s.value.to_string())),
            Node::Array(_) => self
                .must_array()
                .map(|element| element.to_host())
                .collect::<Result<Vec<_>, _>>()
                .map(Host::Array),
            Node::Object(_) => self
                .must_object()
                .map(|(key, member)| Ok((key.to_owned(), member.to_host()?)))
                .collect::<Result<serde_json::Map<_, _>, Error>>()
                .map(Host::Object),
        }
    }
}

fn host_number(n: &Number<'_>) -> Option<serde_json::Number> {
    if let Some(i) = n.as_exact_i64() {
        return Some(i.into());
    }
    if let Some(u) = n.as_exact_u64() {
        return Some(u.into());
    }
    serde_json::Number::from_f64(n.to_f64())
}

/// Serializes the tree. Values carrying an error fail with that error's
/// message.
impl Serialize for Value<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.node_or_error().map_err(S::Error::custom)? {
            Node::Null(_) => serializer.serialize_unit(),
            Node::Bool(b, _) => serializer.serialize_bool(*b),
            Node::Number(n) => {
                if let Some(i) = n.as_exact_i64() {
                    serializer.serialize_i64(i)
                } else if let Some(u) = n.as_exact_u64() {
                    serializer.serialize_u64(u)
                } else {
                    serializer.serialize_f64(n.to_f64())
                }
            }
            Node::String(s) => serializer.serialize_str(&s.value),
            Node::Array(_) => {
                let mut seq = serializer.serialize_seq(Some(self.len()))?;
                for element in self.must_array() {
                    seq.serialize_element(&element)?;
                }
                seq.end()
            }
            Node::Object(_) => {
                let mut map = serializer.serialize_map(Some(self.len()))?;
                for (key, member) in self.must_object() {
                    map.serialize_entry(key, &member)?;
                }
                map.end()
            }
        }
    }
}
