use alloc::string::String;
use core::fmt;

/// One step of a multi-step lookup: an array index or an object key.
///
/// Build them from `usize` and string literals, or with [`path!`](crate::path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathPart<'p> {
    /// An array index.
    Index(usize),
    /// An object key.
    Key(&'p str),
}

impl From<usize> for PathPart<'_> {
    fn from(index: usize) -> Self {
        PathPart::Index(index)
    }
}

impl<'p> From<&'p str> for PathPart<'p> {
    fn from(key: &'p str) -> Self {
        PathPart::Key(key)
    }
}

impl<'p> From<&'p String> for PathPart<'p> {
    fn from(key: &'p String) -> Self {
        PathPart::Key(key)
    }
}

impl<'p> From<&PathPart<'p>> for PathPart<'p> {
    fn from(part: &PathPart<'p>) -> Self {
        *part
    }
}

impl fmt::Display for PathPart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPart::Index(index) => write!(f, "{index}"),
            PathPart::Key(key) => write!(f, "{key:?}"),
        }
    }
}

/// Build an array of [`PathPart`]s from mixed index and key literals.
///
/// ```
/// use xjson::{PathPart, path};
///
/// let parts = path!["people", 2, "name"];
/// assert_eq!(parts[1], PathPart::Index(2));
///
/// let doc = xjson::parse(r#"{"people": [{}, {}, {"name": "Grace"}]}"#);
/// assert_eq!(doc.path(parts).must_str(), "Grace");
/// ```
///
/// Anything that is neither an index nor a key does not compile:
///
/// ```compile_fail
/// let parts = xjson::path!["a", 1.5];
/// ```
#[macro_export]
macro_rules! path {
    ($($part:expr),* $(,)?) => {
        [$($crate::PathPart::from($part)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use xjson_testhelpers::test;

    #[test]
    fn parts_from_literals() {
        let owned = String::from("k");
        let parts = crate::path![0, "a", &owned];
        assert_eq!(
            parts,
            [PathPart::Index(0), PathPart::Key("a"), PathPart::Key("k")]
        );
    }

    #[test]
    fn display() {
        assert_eq!(PathPart::Index(3).to_string(), "3");
        assert_eq!(PathPart::Key("a b").to_string(), "\"a b\"");
    }
}
