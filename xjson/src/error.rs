//! Errors carried by values and returned by strict accessors.

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use core::fmt::{self, Display};

use crate::{Kind, Selector, Span};

/// Prefix every message starts with.
pub const DOMAIN: &str = "xjson";

/// Error produced by parsing, navigation, conversion or unwrapping.
///
/// Errors are data: a value that carries one hands the same error to every
/// value derived from it, so the payload is shared and cloning is cheap.
#[derive(Clone)]
pub struct Error(Arc<Inner>);

struct Inner {
    kind: ErrorKind,
    selector: Option<Selector>,
    source_code: Option<String>,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input is not valid JSON.
    Parse(ParseError),
    /// A conversion or navigation step asked for a kind the value does not have.
    TypeConflict {
        /// The kind the value has.
        actual: Kind,
        /// The kind that was requested.
        expected: Kind,
    },
    /// An object has no member with this key.
    KeyNotFound {
        /// The key that was looked up.
        key: String,
        /// The closest existing key, if any is close enough.
        suggestion: Option<String>,
    },
    /// An array has no element at this index.
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The array's length.
        len: usize,
    },
    /// Unwrap found a value that does not fit the destination.
    ShapeMismatch {
        /// The kind of the source value.
        actual: Kind,
        /// Description of the destination shape.
        expected: &'static str,
    },
    /// A number does not fit the requested numeric type.
    NumberOutOfRange {
        /// The number as written in the input.
        raw: String,
        /// The type it was converted to.
        target: &'static str,
    },
}

/// A syntax error at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What the scanner ran into.
    pub kind: ParseErrorKind,
    /// Byte offset of the offending input.
    pub offset: usize,
}

/// Syntax errors the scanner reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// A byte that cannot start or continue the current production.
    UnexpectedByte(u8),
    /// The input ended inside a value.
    UnexpectedEof,
    /// A backslash followed by something other than a JSON escape.
    InvalidEscape(u8),
    /// `\u` not followed by four hex digits.
    InvalidUnicodeEscape,
    /// A raw control byte inside a string.
    ControlCharacter(u8),
    /// Arrays and objects nested deeper than the configured limit.
    TooDeep(usize),
    /// Something other than whitespace after the top-level value.
    TrailingContent(u8),
}

struct ByteRepr(u8);

impl Display for ByteRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b @ 0x20..=0x7e => write!(f, "'{}'", char::from(b)),
            b => write!(f, "0x{b:02x}"),
        }
    }
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParseErrorKind::UnexpectedByte(b) => write!(f, "unexpected byte {}", ByteRepr(b)),
            ParseErrorKind::UnexpectedEof => f.write_str("unexpected end of input"),
            ParseErrorKind::InvalidEscape(b) => match b {
                0x20..=0x7e => write!(f, "invalid escape '\\{}'", char::from(b)),
                _ => write!(f, "invalid escape byte 0x{b:02x}"),
            },
            ParseErrorKind::InvalidUnicodeEscape => f.write_str("invalid unicode escape"),
            ParseErrorKind::ControlCharacter(b) => {
                write!(f, "control character 0x{b:02x} in string")
            }
            ParseErrorKind::TooDeep(limit) => write!(f, "nesting deeper than {limit} levels"),
            ParseErrorKind::TrailingContent(b) => {
                write!(f, "unexpected byte {} after top-level value", ByteRepr(b))
            }
        }
    }
}

impl ParseError {
    pub(crate) const fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// The message without position, e.g. `unexpected end of input`.
    pub fn message(&self) -> String {
        format!("{}", self.kind)
    }

    /// Byte offset of the offending input.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DOMAIN}: {} (pos={})", self.kind, self.offset)
    }
}

impl core::error::Error for ParseError {}

impl ErrorKind {
    /// Stable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::Parse(_) => "xjson::parse",
            ErrorKind::TypeConflict { .. } => "xjson::type_conflict",
            ErrorKind::KeyNotFound { .. } => "xjson::key_not_found",
            ErrorKind::IndexOutOfRange { .. } => "xjson::index_out_of_range",
            ErrorKind::ShapeMismatch { .. } => "xjson::shape_mismatch",
            ErrorKind::NumberOutOfRange { .. } => "xjson::number_out_of_range",
        }
    }

    /// Short description for diagnostic labels.
    pub fn label(&self) -> String {
        match self {
            ErrorKind::Parse(e) => format!("{}", e.kind),
            ErrorKind::TypeConflict { actual, expected } => {
                format!("expected {expected}, found {actual}")
            }
            ErrorKind::KeyNotFound { key, .. } => format!("no member `{key}` in this object"),
            ErrorKind::IndexOutOfRange { index, len } => {
                format!("index {index} is past the end of this array (length {len})")
            }
            ErrorKind::ShapeMismatch { actual, expected } => {
                format!("{actual} does not fit {expected}")
            }
            ErrorKind::NumberOutOfRange { target, .. } => format!("out of range for {target}"),
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse(e) => write!(f, "{DOMAIN}: {}", e.kind),
            ErrorKind::TypeConflict { actual, expected } => {
                write!(f, "{DOMAIN}: {actual} is not a json {expected}")
            }
            ErrorKind::KeyNotFound { .. } => write!(f, "{DOMAIN}: key not found"),
            ErrorKind::IndexOutOfRange { .. } => write!(f, "{DOMAIN}: index out of range"),
            ErrorKind::ShapeMismatch { actual, expected } => {
                write!(f, "{DOMAIN}: cannot unwrap {actual} into {expected}")
            }
            ErrorKind::NumberOutOfRange { raw, target } => {
                write!(f, "{DOMAIN}: number {raw} out of range for {target}")
            }
        }
    }
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, selector: Selector) -> Self {
        Error(Arc::new(Inner {
            kind,
            selector: Some(selector),
            source_code: None,
        }))
    }

    pub(crate) fn parse(error: ParseError) -> Self {
        Error(Arc::new(Inner {
            kind: ErrorKind::Parse(error),
            selector: None,
            source_code: None,
        }))
    }

    pub(crate) fn type_conflict(actual: Kind, expected: Kind, selector: Selector) -> Self {
        Self::new(ErrorKind::TypeConflict { actual, expected }, selector)
    }

    /// What went wrong.
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// Stable error code, e.g. `xjson::key_not_found`.
    pub fn code(&self) -> &'static str {
        self.0.kind.code()
    }

    /// The selector this error is bound to. `None` for parse errors.
    ///
    /// For a missing key or index this is the step that failed
    /// (`$root.pets`, `$root.people[3]`).
    pub fn selector(&self) -> Option<&Selector> {
        self.0.selector.as_ref()
    }

    /// The container the failure happened in.
    ///
    /// For a missing key or index, the object or array that lacked the
    /// member. For other errors, the same as [`Error::selector`].
    pub fn container(&self) -> Option<&Selector> {
        let selector = self.0.selector.as_ref()?;
        match self.0.kind {
            ErrorKind::KeyNotFound { .. } | ErrorKind::IndexOutOfRange { .. } => {
                selector.parent().or(Some(selector))
            }
            _ => Some(selector),
        }
    }

    /// The message without the selector suffix, e.g. `xjson: key not found`.
    pub fn message(&self) -> String {
        format!("{}", self.0.kind)
    }

    /// The syntax error, if this is one.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match &self.0.kind {
            ErrorKind::Parse(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this is a syntax error.
    pub fn is_parse(&self) -> bool {
        self.as_parse_error().is_some()
    }

    /// The input span the error points at, if known.
    ///
    /// Parse errors point at the offending byte. Access errors point at the
    /// closest node on their selector chain that resolved.
    pub fn span(&self) -> Option<Span> {
        match &self.0.kind {
            ErrorKind::Parse(e) => {
                let len = match e.kind {
                    ParseErrorKind::UnexpectedEof => 0,
                    _ => 1,
                };
                Some(Span::new(e.offset, len))
            }
            _ => self.selector()?.ancestors().find_map(Selector::span),
        }
    }

    /// Attach the input text so diagnostics can show a snippet.
    ///
    /// [`Value::diagnostic`](crate::Value::diagnostic) does this with the
    /// document's own input.
    pub fn with_source_code(&self, source: impl AsRef<[u8]>) -> Self {
        Error(Arc::new(Inner {
            kind: self.0.kind.clone(),
            selector: self.0.selector.clone(),
            source_code: Some(String::from_utf8_lossy(source.as_ref()).into_owned()),
        }))
    }

    /// Fill in the closest of `candidates` for a missing key that has no
    /// suggestion yet. Other errors come back as they are.
    pub(crate) fn with_suggestion<'k>(&self, candidates: impl Iterator<Item = &'k str>) -> Self {
        let key = match &self.0.kind {
            ErrorKind::KeyNotFound {
                key,
                suggestion: None,
            } => key,
            _ => return self.clone(),
        };
        let Some(suggestion) = suggest(key, candidates) else {
            return self.clone();
        };
        Error(Arc::new(Inner {
            kind: ErrorKind::KeyNotFound {
                key: key.clone(),
                suggestion: Some(suggestion),
            },
            selector: self.0.selector.clone(),
            source_code: self.0.source_code.clone(),
        }))
    }

    /// Whether two errors are the same shared payload.
    pub fn ptr_eq(&self, other: &Error) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.0.kind, &self.0.selector) {
            (ErrorKind::Parse(e), _) => write!(f, "{e}"),
            (kind, Some(selector)) => write!(f, "{kind} (at: {selector})"),
            (kind, None) => write!(f, "{kind}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Error");
        s.field("kind", &self.0.kind);
        if let Some(selector) = &self.0.selector {
            s.field("selector", &format_args!("{selector}"));
        }
        s.finish()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.kind == other.0.kind && self.0.selector == other.0.selector)
    }
}

impl core::error::Error for Error {}

impl miette::Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.0.kind.code()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.0
            .source_code
            .as_ref()
            .map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let span = self.span()?;
        Some(Box::new(core::iter::once(miette::LabeledSpan::at(
            span,
            self.0.kind.label(),
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        match &self.0.kind {
            ErrorKind::KeyNotFound {
                suggestion: Some(suggestion),
                ..
            } => Some(Box::new(format!("did you mean `{suggestion}`?"))),
            ErrorKind::TypeConflict {
                actual: Kind::Null, ..
            } => Some(Box::new("the value is null or missing")),
            _ => None,
        }
    }
}

/// Pick the candidate closest to `key`, if any is reasonably close.
fn suggest<'k>(key: &str, candidates: impl Iterator<Item = &'k str>) -> Option<String> {
    const SIMILARITY_THRESHOLD: f64 = 0.8;

    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let similarity = strsim::jaro_winkler(key, candidate);
        if similarity >= SIMILARITY_THRESHOLD && best.is_none_or(|(_, b)| similarity > b) {
            best = Some((candidate, similarity));
        }
    }
    best.map(|(candidate, _)| candidate.to_owned())
}
