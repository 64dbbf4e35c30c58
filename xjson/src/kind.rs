use core::fmt;

/// The discriminator of a [`Value`](crate::Value).
///
/// The six JSON kinds plus [`Kind::Error`], which is what a value carrying a
/// parse or access failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// `null`, and the absorbing missing value produced by lenient navigation.
    Null,
    /// `true` or `false`.
    Bool,
    /// Any JSON number.
    Number,
    /// A JSON string.
    String,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
    /// A value that carries an [`Error`](crate::Error) instead of data.
    Error,
}

impl Kind {
    /// Lowercase name, as used in type-conflict messages.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Error => "error",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
