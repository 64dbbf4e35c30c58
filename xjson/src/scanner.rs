//! Recursive-descent scanner that builds the tree straight from bytes.
//!
//! There is no token stream: each production dispatches on the next
//! significant byte and returns a finished node. Nodes reference the input
//! buffer wherever they can. Strings are located in a first pass (with a
//! 16-byte window fast path) and unescaped in a second pass that borrows
//! from the input when the string has no escapes.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::str;

use crate::error::{ParseError, ParseErrorKind};
use crate::node::{Array, JsonString, Member, Node, Object};
use crate::number::NumberFlags;
use crate::{Number, ParseOptions, Span};

type ScanResult<T> = Result<T, ParseError>;

/// Parse a complete document. Only whitespace may follow the top-level value.
pub(crate) fn scan<'a>(buf: &'a [u8], options: &ParseOptions) -> ScanResult<Node<'a>> {
    let mut scanner = Scanner::new(buf, options);
    let node = scanner.parse_value()?;
    scanner.skip_whitespace();
    match scanner.peek() {
        None => Ok(node),
        Some(byte) => Err(ParseError::new(
            ParseErrorKind::TrailingContent(byte),
            scanner.pos,
        )),
    }
}

struct Scanner<'a, 'o> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
    options: &'o ParseOptions,
}

impl<'a, 'o> Scanner<'a, 'o> {
    const fn new(buf: &'a [u8], options: &'o ParseOptions) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
            options,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }

    /// Error for whatever sits at the cursor: the byte, or end of input.
    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(byte) => self.error(ParseErrorKind::UnexpectedByte(byte)),
            None => self.error(ParseErrorKind::UnexpectedEof),
        }
    }

    fn skip_whitespace(&mut self) {
        let mut pos = self.pos;
        while let Some(&b) = self.buf.get(pos) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
                0x0c if self.options.form_feed_whitespace => pos += 1,
                _ => break,
            }
        }
        self.pos = pos;
    }

    fn parse_value(&mut self) -> ScanResult<Node<'a>> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => Ok(Node::String(Arc::new(self.parse_string()?))),
            Some(b'-' | b'0'..=b'9') => Ok(Node::Number(self.parse_number()?)),
            Some(b't') => Ok(Node::Bool(true, self.parse_literal(b"true")?)),
            Some(b'f') => Ok(Node::Bool(false, self.parse_literal(b"false")?)),
            Some(b'n') => Ok(Node::Null(self.parse_literal(b"null")?)),
            _ => Err(self.unexpected()),
        }
    }

    fn enter(&mut self) -> ScanResult<()> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(ParseErrorKind::TooDeep(self.options.max_depth)));
        }
        self.depth += 1;
        Ok(())
    }

    /// After an element or member: `,` continues, `close` ends the container.
    fn next_or_close(&mut self, close: u8) -> ScanResult<bool> {
        self.skip_whitespace();
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(true)
            }
            Some(b) if b == close => {
                self.pos += 1;
                Ok(false)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array(&mut self) -> ScanResult<Node<'a>> {
        let start = self.pos;
        self.enter()?;
        self.pos += 1;

        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
        } else {
            loop {
                items.push(self.parse_value()?);
                if !self.next_or_close(b']')? {
                    break;
                }
            }
        }

        self.depth -= 1;
        Ok(Node::Array(Arc::new(Array {
            items,
            span: Span::from_bounds(start, self.pos),
        })))
    }

    fn parse_object(&mut self) -> ScanResult<Node<'a>> {
        let start = self.pos;
        self.enter()?;
        self.pos += 1;

        let mut members = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                if self.peek() != Some(b'"') {
                    return Err(self.unexpected());
                }
                let key = self.parse_string()?.value;

                self.skip_whitespace();
                if self.peek() != Some(b':') {
                    return Err(self.unexpected());
                }
                self.pos += 1;

                let value = self.parse_value()?;
                members.push(Member { key, value });
                if !self.next_or_close(b'}')? {
                    break;
                }
            }
        }

        self.depth -= 1;
        let (object, dropped) = Object::from_members(members, Span::from_bounds(start, self.pos));
        if dropped > 0 {
            debug!(
                "object at {} had {} duplicate key(s), kept last occurrence",
                start, dropped
            );
        }
        Ok(Node::Object(Arc::new(object)))
    }

    fn parse_string(&mut self) -> ScanResult<JsonString<'a>> {
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        let has_escapes = self.scan_string_content()?;
        let content = &self.buf[content_start..self.pos];
        self.pos += 1;

        Ok(JsonString {
            value: decode_string(content, has_escapes),
            span: Span::from_bounds(start, self.pos),
        })
    }

    /// Advance to the closing quote, validating escapes on the way.
    ///
    /// Returns whether any escape was seen.
    fn scan_string_content(&mut self) -> ScanResult<bool> {
        const STEP_SIZE: usize = 16;
        type Window = u128;
        type Chunk = [u8; STEP_SIZE];

        let mut has_escapes = false;
        loop {
            // Skip whole windows that hold no quote, backslash or control byte.
            while let Some(Ok(chunk)) = self
                .buf
                .get(self.pos..self.pos + STEP_SIZE)
                .map(Chunk::try_from)
            {
                let window = Window::from_ne_bytes(chunk);
                if contains_byte(window, b'"')
                    || contains_byte(window, b'\\')
                    || contains_control(window)
                {
                    break;
                }
                self.pos += STEP_SIZE;
            }

            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnexpectedEof)),
                Some(b'"') => return Ok(has_escapes),
                Some(b'\\') => {
                    has_escapes = true;
                    self.scan_escape()?;
                }
                Some(byte @ 0x00..=0x1f) => {
                    return Err(self.error(ParseErrorKind::ControlCharacter(byte)));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Cursor is on a backslash.
    fn scan_escape(&mut self) -> ScanResult<()> {
        let at = self.pos;
        match self.buf.get(at + 1).copied() {
            None => {
                self.pos = at + 1;
                Err(self.error(ParseErrorKind::UnexpectedEof))
            }
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                self.pos = at + 2;
                Ok(())
            }
            Some(b'u') => {
                let rest = self.buf.get(at + 2..).unwrap_or_default();
                let hex = rest
                    .iter()
                    .take(4)
                    .take_while(|b| b.is_ascii_hexdigit())
                    .count();
                if hex == 4 {
                    self.pos = at + 6;
                    Ok(())
                } else if hex == rest.len() {
                    self.pos = self.buf.len();
                    Err(self.error(ParseErrorKind::UnexpectedEof))
                } else {
                    Err(self.error(ParseErrorKind::InvalidUnicodeEscape))
                }
            }
            Some(other) => {
                self.pos = at + 1;
                Err(self.error(ParseErrorKind::InvalidEscape(other)))
            }
        }
    }

    fn parse_number(&mut self) -> ScanResult<Number<'a>> {
        let start = self.pos;
        let mut flags = NumberFlags::default();

        if self.peek() == Some(b'-') {
            flags = flags.with_negative();
            self.pos += 1;
        }

        // Integer part: a single zero, or digits without a leading zero.
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.unexpected()),
        }

        if self.peek() == Some(b'.') {
            flags = flags.with_fraction();
            self.pos += 1;
            self.expect_digits()?;
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            flags = flags.with_exponent();
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.expect_digits()?;
        }

        let bytes = &self.buf[start..self.pos];
        let raw = str::from_utf8(bytes).map_err(|e| {
            let offset = e.valid_up_to();
            ParseError::new(
                ParseErrorKind::UnexpectedByte(bytes[offset]),
                start + offset,
            )
        })?;
        Ok(Number::new(raw, flags, Span::from_bounds(start, self.pos)))
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn expect_digits(&mut self) -> ScanResult<()> {
        if !matches!(self.peek(), Some(b'0'..=b'9')) {
            return Err(self.unexpected());
        }
        self.skip_digits();
        Ok(())
    }

    fn parse_literal(&mut self, literal: &'static [u8]) -> ScanResult<Span> {
        let start = self.pos;
        for &expected in literal {
            if self.peek() != Some(expected) {
                return Err(self.unexpected());
            }
            self.pos += 1;
        }
        Ok(Span::new(start, literal.len()))
    }
}

/// Check if a 128-bit window contains a specific byte.
#[inline]
const fn contains_byte(window: u128, byte: u8) -> bool {
    let pattern = u128::from_ne_bytes([byte; 16]);
    let xor = window ^ pattern;
    let has_zero = (xor.wrapping_sub(0x01010101010101010101010101010101))
        & !xor
        & 0x80808080808080808080808080808080;
    has_zero != 0
}

/// Check if a 128-bit window contains a byte below 0x20.
#[inline]
const fn contains_control(window: u128) -> bool {
    let has_less = (window.wrapping_sub(0x20202020202020202020202020202020))
        & !window
        & 0x80808080808080808080808080808080;
    has_less != 0
}

/// Unescape string content (between the quotes).
///
/// Escapes were validated by the scan. Strings without escapes that are valid
/// UTF-8 are borrowed. Unpaired surrogates and invalid UTF-8 become U+FFFD.
pub(crate) fn decode_string(content: &[u8], has_escapes: bool) -> Cow<'_, str> {
    if !has_escapes {
        return String::from_utf8_lossy(content);
    }

    let mut out = String::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        let run_end = content[i..]
            .iter()
            .position(|&b| b == b'\\')
            .map_or(content.len(), |p| i + p);
        if run_end > i {
            out.push_str(&String::from_utf8_lossy(&content[i..run_end]));
            i = run_end;
            continue;
        }

        // content[i] is a backslash
        let Some(&esc) = content.get(i + 1) else {
            break;
        };
        i += 2;
        let c = match esc {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\x08',
            b'f' => '\x0c',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let Some(unit) = hex4(&content[i..]) else {
                    out.push(char::REPLACEMENT_CHARACTER);
                    continue;
                };
                i += 4;
                decode_utf16_escape(unit, content, &mut i)
            }
            other => char::from(other),
        };
        out.push(c);
    }
    Cow::Owned(out)
}

/// Resolve a `\u` code unit, consuming a following low surrogate escape when
/// `unit` is a high surrogate.
fn decode_utf16_escape(unit: u16, content: &[u8], i: &mut usize) -> char {
    match unit {
        0xD800..=0xDBFF => {
            let low = content
                .get(*i..*i + 2)
                .filter(|prefix| *prefix == b"\\u")
                .and_then(|_| hex4(&content[*i + 2..]))
                .filter(|low| (0xDC00..=0xDFFF).contains(low));
            match low {
                Some(low) => {
                    *i += 6;
                    let high = u32::from(unit);
                    let low = u32::from(low);
                    let code_point = 0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF);
                    char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER)
                }
                None => char::REPLACEMENT_CHARACTER,
            }
        }
        0xDC00..=0xDFFF => char::REPLACEMENT_CHARACTER,
        _ => char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

fn hex4(bytes: &[u8]) -> Option<u16> {
    let digits = bytes.get(..4)?;
    let mut value = 0u16;
    for &b in digits {
        let digit = char::from(b).to_digit(16)?;
        value = (value << 4) | digit as u16;
    }
    Some(value)
}
