#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

extern crate alloc;

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    };
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    };
}

mod error;
mod host;
mod kind;
mod node;
mod number;
mod options;
mod path;
mod scanner;
mod selector;
mod span;
mod unwrap;
mod value;

pub use error::{DOMAIN, Error, ErrorKind, ParseError, ParseErrorKind};
pub use kind::Kind;
pub use number::Number;
pub use options::{DEFAULT_MAX_DEPTH, ParseOptions};
pub use path::PathPart;
pub use selector::{Ancestors, Selector, Step};
pub use span::Span;
pub use unwrap::Unwrap;
pub use value::{Elements, Members, Value};

/// Parse a complete JSON document.
///
/// Never fails outright: invalid input yields a value of kind
/// [`Kind::Error`] carrying the [`ParseError`], and everything derived from
/// it carries the same error.
///
/// ```
/// let doc = xjson::parse(r#"{"ok": true}"#);
/// assert!(doc.get("ok").must_bool());
///
/// let bad = xjson::parse("[1, 2");
/// assert_eq!(bad.kind(), xjson::Kind::Error);
/// assert_eq!(
///     bad.get_index(0).as_i64().unwrap_err().to_string(),
///     "xjson: unexpected end of input (pos=5)"
/// );
/// ```
pub fn parse<B>(input: &B) -> Value<'_>
where
    B: AsRef<[u8]> + ?Sized,
{
    parse_with(input, &ParseOptions::default())
}

/// Parse a complete JSON document with explicit [`ParseOptions`].
pub fn parse_with<'a, B>(input: &'a B, options: &ParseOptions) -> Value<'a>
where
    B: AsRef<[u8]> + ?Sized,
{
    let bytes = input.as_ref();
    match scanner::scan(bytes, options) {
        Ok(node) => {
            trace!("parsed {} bytes into {}", bytes.len(), node.kind());
            Value::document(node, bytes)
        }
        Err(e) => {
            debug!("parse failed: {}", e);
            Value::failed(Error::parse(e), bytes)
        }
    }
}
