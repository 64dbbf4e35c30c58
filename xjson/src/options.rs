/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum nesting of arrays and objects (default: 128).
    ///
    /// Deeper input is a syntax error instead of a stack overflow.
    pub max_depth: usize,

    /// Also accept form feed (`\x0c`) as whitespace between tokens
    /// (default: false).
    pub form_feed_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            form_feed_whitespace: false,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting limit.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Treat form feed as whitespace.
    pub const fn form_feed_whitespace(mut self) -> Self {
        self.form_feed_whitespace = true;
        self
    }
}
