//! JSON numbers kept as their source text.

use core::fmt;

use lexical_parse_float::FromLexical as _;
use lexical_parse_integer::FromLexical as _;

use crate::Span;

const FRACTION: u8 = 1 << 0;
const EXPONENT: u8 = 1 << 1;
const NEGATIVE: u8 = 1 << 2;

/// Shape of a number literal, recorded while scanning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct NumberFlags(u8);

impl NumberFlags {
    pub(crate) const fn with_fraction(self) -> Self {
        Self(self.0 | FRACTION)
    }

    pub(crate) const fn with_exponent(self) -> Self {
        Self(self.0 | EXPONENT)
    }

    pub(crate) const fn with_negative(self) -> Self {
        Self(self.0 | NEGATIVE)
    }
}

/// A number as written in the input.
///
/// Nothing is converted at parse time. Each accessor converts the verbatim
/// text on demand, so the literal can always be re-emitted exactly.
///
/// Conversions never fail:
///
/// - [`Number::to_i64`] truncates fractions toward zero and saturates at
///   `i64::MIN`/`i64::MAX`.
/// - [`Number::to_u64`] returns `0` for negative literals and saturates at
///   `u64::MAX`.
/// - [`Number::to_f64`] rounds to the nearest double, and literals beyond the
///   double range become infinite.
#[derive(Clone, Copy)]
pub struct Number<'a> {
    raw: &'a str,
    flags: NumberFlags,
    span: Span,
}

impl<'a> Number<'a> {
    pub(crate) const fn new(raw: &'a str, flags: NumberFlags, span: Span) -> Self {
        Self { raw, flags, span }
    }

    /// The literal exactly as written, e.g. `-1.50e3`.
    pub const fn raw(&self) -> &'a str {
        self.raw
    }

    /// Where the literal sits in the input.
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Whether the literal has a `.` part.
    pub const fn has_fraction(&self) -> bool {
        self.flags.0 & FRACTION != 0
    }

    /// Whether the literal has an `e`/`E` part.
    pub const fn has_exponent(&self) -> bool {
        self.flags.0 & EXPONENT != 0
    }

    /// Whether the literal starts with `-`.
    pub const fn is_negative(&self) -> bool {
        self.flags.0 & NEGATIVE != 0
    }

    /// Whether the literal is a plain integer (no fraction, no exponent).
    pub const fn is_integral(&self) -> bool {
        self.flags.0 & (FRACTION | EXPONENT) == 0
    }

    /// Convert to `i64`, truncating and saturating.
    pub fn to_i64(&self) -> i64 {
        if !self.is_integral() {
            return self.to_f64() as i64;
        }
        match i64::from_lexical(self.raw.as_bytes()) {
            Ok(n) => n,
            Err(_) if self.is_negative() => i64::MIN,
            Err(_) => i64::MAX,
        }
    }

    /// Convert to `u64`, truncating and saturating. Negative literals give `0`.
    pub fn to_u64(&self) -> u64 {
        if !self.is_integral() {
            return self.to_f64() as u64;
        }
        if self.is_negative() {
            return 0;
        }
        u64::from_lexical(self.raw.as_bytes()).unwrap_or(u64::MAX)
    }

    /// Convert to `f64`.
    pub fn to_f64(&self) -> f64 {
        f64::from_lexical(self.raw.as_bytes())
            .or_else(|_| self.raw.parse::<f64>())
            .unwrap_or(f64::NAN)
    }

    /// Exact `i64` value, if the literal is integral and fits.
    pub fn as_exact_i64(&self) -> Option<i64> {
        if !self.is_integral() {
            return None;
        }
        i64::from_lexical(self.raw.as_bytes()).ok()
    }

    /// Exact `u64` value, if the literal is integral, non-negative and fits.
    pub fn as_exact_u64(&self) -> Option<u64> {
        if !self.is_integral() || self.is_negative() {
            return None;
        }
        u64::from_lexical(self.raw.as_bytes()).ok()
    }

    /// Integer value for range checks: exact for integral literals,
    /// truncated toward zero otherwise. `None` for non-finite values and
    /// integers beyond 128 bits.
    pub(crate) fn to_i128(&self) -> Option<i128> {
        if self.is_integral() {
            return i128::from_lexical(self.raw.as_bytes()).ok();
        }
        let f = self.to_f64();
        f.is_finite().then_some(f as i128)
    }
}

impl fmt::Debug for Number<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({})", self.raw)
    }
}

impl fmt::Display for Number<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}

/// Numbers compare by value: exactly when both are integers that fit 64
/// bits, as doubles otherwise. `1`, `1.0` and `1e0` are equal.
impl PartialEq for Number<'_> {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_exact_i64(), other.as_exact_i64()) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (self.as_exact_u64(), other.as_exact_u64()) {
            return a == b;
        }
        self.to_f64() == other.to_f64()
    }
}
