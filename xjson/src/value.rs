//! The cursor callers navigate with.
//!
//! A [`Value`] pairs a node of the parsed tree with the [`Selector`] that
//! reached it. Navigation never fails: a miss or a type conflict produces a
//! value that carries the error, and every later step hands that error on.
//!
//! There are two navigation disciplines:
//!
//! - [`Value::get`], [`Value::get_index`] and [`Value::get_path`] fail
//!   eagerly. A missing key or index yields an [`Kind::Error`] value right
//!   away.
//! - [`Value::map_index`], [`Value::index`] and [`Value::path`] are lenient.
//!   A missing key or index yields a *missing* value that behaves like
//!   `null` ([`Value::kind`] is [`Kind::Null`]) and keeps the failure
//!   around. The failure is reported by the next strict conversion.
//!
//! Every scalar conversion comes in three flavors: `as_*` returns a
//! `Result`, `maybe_*` returns an `Option`, and `must_*` returns the type's
//! default on mismatch.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;
use core::iter::{Enumerate, FusedIterator};
use core::slice;

use crate::node::{Member, Node, Object};
use crate::selector::Step;
use crate::{Error, ErrorKind, Kind, Number, PathPart, Selector, Span};

/// A position in a parsed document.
///
/// Cheap to clone, and `Send + Sync`: the tree is immutable and shared.
#[derive(Clone)]
pub struct Value<'a> {
    state: State<'a>,
    selector: Selector,
    source: &'a [u8],
    /// The object a key lookup missed in, kept for [`Value::diagnostic`].
    missed_in: Option<Arc<Object<'a>>>,
}

#[derive(Clone)]
enum State<'a> {
    Node(Node<'a>),
    /// Reached by lenient navigation past a missing member.
    Missing(Error),
    Error(Error),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Eager,
    Lenient,
}

enum Lookup<'a> {
    Found(Node<'a>),
    /// Nothing there; the error is bound to the step that missed.
    Miss(ErrorKind, Option<Arc<Object<'a>>>),
    Fail(Error),
    Defer(Error),
}

impl<'a> Value<'a> {
    pub(crate) fn document(node: Node<'a>, source: &'a [u8]) -> Self {
        Value {
            selector: Selector::root_at(Some(node.span())),
            state: State::Node(node),
            source,
            missed_in: None,
        }
    }

    pub(crate) fn failed(error: Error, source: &'a [u8]) -> Self {
        Value {
            state: State::Error(error),
            selector: Selector::root(),
            source,
            missed_in: None,
        }
    }

    pub(crate) fn node(&self) -> Option<&Node<'a>> {
        match &self.state {
            State::Node(node) => Some(node),
            State::Missing(_) | State::Error(_) => None,
        }
    }

    pub(crate) fn node_or_error(&self) -> Result<&Node<'a>, Error> {
        match &self.state {
            State::Node(node) => Ok(node),
            State::Missing(e) | State::Error(e) => Err(e.clone()),
        }
    }

    fn with_node(&self, node: Node<'a>, selector: Selector) -> Value<'a> {
        Value {
            state: State::Node(node),
            selector,
            source: self.source,
            missed_in: None,
        }
    }

    /// The same value as the root of its own document: its selector starts
    /// over at `$root`. Carried errors are kept as they are.
    ///
    /// ```
    /// let doc = xjson::parse(r#"{"people": [{"name": "Ada"}]}"#);
    /// let person = doc.get("people").get_index(0).rooted();
    /// assert_eq!(person.get("name").selector().to_string(), "$root.name");
    /// ```
    pub fn rooted(&self) -> Value<'a> {
        Value {
            state: self.state.clone(),
            selector: Selector::root_at(self.span()),
            source: self.source,
            missed_in: self.missed_in.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// The kind of this value.
    ///
    /// Missing values report [`Kind::Null`]; values carrying an error report
    /// [`Kind::Error`].
    pub fn kind(&self) -> Kind {
        match &self.state {
            State::Node(node) => node.kind(),
            State::Missing(_) => Kind::Null,
            State::Error(_) => Kind::Error,
        }
    }

    /// How this value was reached from the document root.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Where this value sits in the input. `None` for missing and error values.
    pub fn span(&self) -> Option<Span> {
        self.node().map(Node::span)
    }

    /// The input bytes this value was parsed from, verbatim.
    pub fn raw(&self) -> Option<&'a [u8]> {
        self.span()?.slice(self.source)
    }

    /// The error this value carries, including the deferred error of a
    /// missing value.
    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            State::Node(_) => None,
            State::Missing(e) | State::Error(e) => Some(e),
        }
    }

    /// The carried error with the input text attached, so a `miette`
    /// report can show where it points.
    ///
    /// A missing key also gets the closest existing key of its object as a
    /// "did you mean" hint. [`Value::error`] leaves it out.
    ///
    /// ```
    /// use miette::Diagnostic;
    ///
    /// let doc = xjson::parse(r#"{"name": "Ada"}"#);
    /// let err = doc.get("nmae").diagnostic().unwrap();
    /// assert_eq!(err.help().unwrap().to_string(), "did you mean `name`?");
    /// ```
    pub fn diagnostic(&self) -> Option<Error> {
        let error = self.error()?;
        let error = match &self.missed_in {
            Some(object) => error.with_suggestion(object.keys()),
            None => error.clone(),
        };
        Some(error.with_source_code(self.source))
    }

    /// Whether this value carries an error.
    pub fn is_error(&self) -> bool {
        matches!(self.state, State::Error(_))
    }

    /// Whether this value was reached by lenient navigation past a missing
    /// member.
    pub fn is_missing(&self) -> bool {
        matches!(self.state, State::Missing(_))
    }

    /// Whether this value is `null` or missing.
    pub fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    /// Whether this value is `null`, missing, or an empty array or object.
    pub fn is_nil(&self) -> bool {
        match &self.state {
            State::Node(Node::Null(_)) | State::Missing(_) => true,
            State::Node(Node::Array(a)) => a.items.is_empty(),
            State::Node(Node::Object(o)) => o.len() == 0,
            State::Node(_) | State::Error(_) => false,
        }
    }

    /// Number of elements of an array or members of an object. Zero for
    /// everything else.
    pub fn len(&self) -> usize {
        match self.node() {
            Some(Node::Array(a)) => a.items.len(),
            Some(Node::Object(o)) => o.len(),
            _ => 0,
        }
    }

    /// Whether [`Value::len`] is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An object's keys in sorted order. Empty for everything else.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let object = match self.node() {
            Some(Node::Object(o)) => Some(o),
            _ => None,
        };
        object.into_iter().flat_map(|o| o.keys())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// The member under `key`. A missing key yields an error value.
    pub fn get(&self, key: &str) -> Value<'a> {
        self.navigate(Step::Key(key.into()), Mode::Eager)
    }

    /// The element at `index`. A missing element yields an error value.
    pub fn get_index(&self, index: usize) -> Value<'a> {
        self.navigate(Step::Index(index), Mode::Eager)
    }

    /// Apply [`Value::get`] and [`Value::get_index`] for each part in turn.
    ///
    /// ```
    /// use xjson::path;
    ///
    /// let doc = xjson::parse(r#"{"people": [{"name": "Ada"}]}"#);
    /// assert_eq!(doc.get_path(path!["people", 0, "name"]).as_str().unwrap(), "Ada");
    /// ```
    pub fn get_path<'p, I>(&self, parts: I) -> Value<'a>
    where
        I: IntoIterator,
        I::Item: Into<PathPart<'p>>,
    {
        parts
            .into_iter()
            .fold(self.clone(), |value, part| match part.into() {
                PathPart::Index(i) => value.get_index(i),
                PathPart::Key(k) => value.get(k),
            })
    }

    /// The member under `key`, or a missing value whose error surfaces on
    /// the next strict conversion.
    pub fn map_index(&self, key: &str) -> Value<'a> {
        self.navigate(Step::Key(key.into()), Mode::Lenient)
    }

    /// The element at `index`, or a missing value whose error surfaces on
    /// the next strict conversion.
    pub fn index(&self, index: usize) -> Value<'a> {
        self.navigate(Step::Index(index), Mode::Lenient)
    }

    /// Apply [`Value::map_index`] and [`Value::index`] for each part in turn.
    pub fn path<'p, I>(&self, parts: I) -> Value<'a>
    where
        I: IntoIterator,
        I::Item: Into<PathPart<'p>>,
    {
        parts
            .into_iter()
            .fold(self.clone(), |value, part| match part.into() {
                PathPart::Index(i) => value.index(i),
                PathPart::Key(k) => value.map_index(k),
            })
    }

    fn navigate(&self, step: Step, mode: Mode) -> Value<'a> {
        let lookup = match &self.state {
            State::Error(e) => Lookup::Fail(e.clone()),
            State::Missing(e) if mode == Mode::Eager => Lookup::Fail(e.clone()),
            State::Missing(e) => Lookup::Defer(e.clone()),
            State::Node(node) => self.lookup(node, &step, mode),
        };
        // A carried error is handed on unchanged, and so is where it missed.
        let missed_in = match &self.state {
            State::Node(_) => None,
            State::Missing(_) | State::Error(_) => self.missed_in.clone(),
        };

        let (state, span) = match lookup {
            Lookup::Found(node) => {
                let span = node.span();
                (State::Node(node), Some(span))
            }
            Lookup::Miss(kind, missed_in) => {
                let selector = self.selector.child(step, None);
                let error = Error::new(kind, selector.clone());
                trace!("{}", error);
                let state = match mode {
                    Mode::Eager => State::Error(error),
                    Mode::Lenient => State::Missing(error),
                };
                return Value {
                    state,
                    selector,
                    source: self.source,
                    missed_in,
                };
            }
            Lookup::Fail(e) => (State::Error(e), None),
            Lookup::Defer(e) => (State::Missing(e), None),
        };

        Value {
            state,
            selector: self.selector.child(step, span),
            source: self.source,
            missed_in,
        }
    }

    fn lookup(&self, node: &Node<'a>, step: &Step, mode: Mode) -> Lookup<'a> {
        let expected = match step {
            Step::Index(_) => Kind::Array,
            Step::Key(_) | Step::Root => Kind::Object,
        };
        match (node, step) {
            (Node::Object(object), Step::Key(key)) => match object.get(key) {
                Some(child) => Lookup::Found(child.clone()),
                None => Lookup::Miss(
                    ErrorKind::KeyNotFound {
                        key: key.clone(),
                        suggestion: None,
                    },
                    Some(object.clone()),
                ),
            },
            (Node::Array(array), Step::Index(index)) => match array.items.get(*index) {
                Some(child) => Lookup::Found(child.clone()),
                None => Lookup::Miss(
                    ErrorKind::IndexOutOfRange {
                        index: *index,
                        len: array.items.len(),
                    },
                    None,
                ),
            },
            (Node::Null(_), _) if mode == Mode::Lenient => Lookup::Defer(Error::type_conflict(
                Kind::Null,
                expected,
                self.selector.clone(),
            )),
            (node, _) => Lookup::Fail(Error::type_conflict(
                node.kind(),
                expected,
                self.selector.clone(),
            )),
        }
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    /// The error a failed conversion to `expected` reports: the carried
    /// error if there is one, a type conflict otherwise.
    fn mismatch(&self, expected: Kind) -> Error {
        match &self.state {
            State::Node(node) => Error::type_conflict(node.kind(), expected, self.selector.clone()),
            State::Missing(e) | State::Error(e) => e.clone(),
        }
    }

    /// `true` or `false`.
    pub fn maybe_bool(&self) -> Option<bool> {
        match self.node()? {
            Node::Bool(b, _) => Some(*b),
            _ => None,
        }
    }

    /// `true` or `false`, or why not.
    pub fn as_bool(&self) -> Result<bool, Error> {
        self.maybe_bool().ok_or_else(|| self.mismatch(Kind::Bool))
    }

    /// `true` or `false`, `false` on mismatch.
    pub fn must_bool(&self) -> bool {
        self.maybe_bool().unwrap_or_default()
    }

    /// The number as written.
    pub fn maybe_number(&self) -> Option<Number<'a>> {
        match self.node()? {
            Node::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The number as written, or why not.
    pub fn as_number(&self) -> Result<Number<'a>, Error> {
        self.maybe_number().ok_or_else(|| self.mismatch(Kind::Number))
    }

    /// The number as written, `None` on mismatch.
    ///
    /// There is no sensible default number, so this is [`Value::maybe_number`].
    pub fn must_number(&self) -> Option<Number<'a>> {
        self.maybe_number()
    }

    /// A number as `i64`, see [`Number::to_i64`].
    pub fn maybe_i64(&self) -> Option<i64> {
        self.maybe_number().map(|n| n.to_i64())
    }

    /// A number as `i64`, or why not.
    pub fn as_i64(&self) -> Result<i64, Error> {
        self.maybe_i64().ok_or_else(|| self.mismatch(Kind::Number))
    }

    /// A number as `i64`, `0` on mismatch.
    pub fn must_i64(&self) -> i64 {
        self.maybe_i64().unwrap_or_default()
    }

    /// A number as `u64`, see [`Number::to_u64`].
    pub fn maybe_u64(&self) -> Option<u64> {
        self.maybe_number().map(|n| n.to_u64())
    }

    /// A number as `u64`, or why not.
    pub fn as_u64(&self) -> Result<u64, Error> {
        self.maybe_u64().ok_or_else(|| self.mismatch(Kind::Number))
    }

    /// A number as `u64`, `0` on mismatch.
    pub fn must_u64(&self) -> u64 {
        self.maybe_u64().unwrap_or_default()
    }

    /// A number as `f64`.
    pub fn maybe_f64(&self) -> Option<f64> {
        self.maybe_number().map(|n| n.to_f64())
    }

    /// A number as `f64`, or why not.
    pub fn as_f64(&self) -> Result<f64, Error> {
        self.maybe_f64().ok_or_else(|| self.mismatch(Kind::Number))
    }

    /// A number as `f64`, `0.0` on mismatch.
    pub fn must_f64(&self) -> f64 {
        self.maybe_f64().unwrap_or_default()
    }

    /// The unescaped string.
    pub fn maybe_str(&self) -> Option<&str> {
        match self.node()? {
            Node::String(s) => Some(&*s.value),
            _ => None,
        }
    }

    /// The unescaped string, or why not.
    pub fn as_str(&self) -> Result<&str, Error> {
        self.maybe_str().ok_or_else(|| self.mismatch(Kind::String))
    }

    /// The unescaped string, `""` on mismatch.
    pub fn must_str(&self) -> &str {
        self.maybe_str().unwrap_or_default()
    }

    /// The unescaped string, borrowed from the input when it had no escapes.
    pub fn maybe_cow_str(&self) -> Option<Cow<'a, str>> {
        match self.node()? {
            Node::String(s) => Some(s.value.clone()),
            _ => None,
        }
    }

    /// The elements of an array, each with its own selector.
    pub fn maybe_array(&self) -> Option<Elements<'_, 'a>> {
        match self.node()? {
            Node::Array(a) => Some(Elements {
                items: a.items.iter().enumerate(),
                parent: self,
            }),
            _ => None,
        }
    }

    /// The elements of an array, or why not.
    pub fn as_array(&self) -> Result<Elements<'_, 'a>, Error> {
        self.maybe_array().ok_or_else(|| self.mismatch(Kind::Array))
    }

    /// The elements of an array, nothing on mismatch.
    pub fn must_array(&self) -> Elements<'_, 'a> {
        self.maybe_array().unwrap_or_else(|| {
            let empty: &[Node<'a>] = &[];
            Elements {
                items: empty.iter().enumerate(),
                parent: self,
            }
        })
    }

    /// The members of an object in key order, each value with its own
    /// selector.
    pub fn maybe_object(&self) -> Option<Members<'_, 'a>> {
        match self.node()? {
            Node::Object(o) => Some(Members {
                members: o.members().iter(),
                parent: self,
            }),
            _ => None,
        }
    }

    /// The members of an object, or why not.
    pub fn as_object(&self) -> Result<Members<'_, 'a>, Error> {
        self.maybe_object().ok_or_else(|| self.mismatch(Kind::Object))
    }

    /// The members of an object, nothing on mismatch.
    pub fn must_object(&self) -> Members<'_, 'a> {
        self.maybe_object().unwrap_or_else(|| {
            let empty: &[Member<'a>] = &[];
            Members {
                members: empty.iter(),
                parent: self,
            }
        })
    }
}

/// Iterator over an array's elements, see [`Value::as_array`].
pub struct Elements<'v, 'a> {
    items: Enumerate<slice::Iter<'v, Node<'a>>>,
    parent: &'v Value<'a>,
}

impl<'a> Elements<'_, 'a> {
    fn element(&self, (index, node): (usize, &Node<'a>)) -> Value<'a> {
        let selector = self
            .parent
            .selector
            .child(Step::Index(index), Some(node.span()));
        self.parent.with_node(node.clone(), selector)
    }
}

impl<'a> Iterator for Elements<'_, 'a> {
    type Item = Value<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next()?;
        Some(self.element(item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl DoubleEndedIterator for Elements<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let item = self.items.next_back()?;
        Some(self.element(item))
    }
}

impl ExactSizeIterator for Elements<'_, '_> {}
impl FusedIterator for Elements<'_, '_> {}

/// Iterator over an object's members in key order, see [`Value::as_object`].
pub struct Members<'v, 'a> {
    members: slice::Iter<'v, Member<'a>>,
    parent: &'v Value<'a>,
}

impl<'v, 'a> Members<'v, 'a> {
    fn member(&self, member: &'v Member<'a>) -> (&'v str, Value<'a>) {
        let selector = self
            .parent
            .selector
            .child(Step::Key(member.key.to_string()), Some(member.value.span()));
        (
            &*member.key,
            self.parent.with_node(member.value.clone(), selector),
        )
    }
}

impl<'v, 'a> Iterator for Members<'v, 'a> {
    type Item = (&'v str, Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let member = self.members.next()?;
        Some(self.member(member))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.members.size_hint()
    }
}

impl DoubleEndedIterator for Members<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let member = self.members.next_back()?;
        Some(self.member(member))
    }
}

impl ExactSizeIterator for Members<'_, '_> {}
impl FusedIterator for Members<'_, '_> {}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Value");
        s.field("kind", &self.kind());
        s.field("selector", &format_args!("{}", self.selector));
        match &self.state {
            State::Node(_) => {
                if let Some(raw) = self.raw() {
                    s.field("raw", &String::from_utf8_lossy(raw));
                }
            }
            State::Missing(e) => {
                s.field("missing", &format_args!("{e}"));
            }
            State::Error(e) => {
                s.field("error", &format_args!("{e}"));
            }
        }
        s.finish()
    }
}

/// Values compare by content: kind, scalar content, elements in order and
/// members by key. Selectors and spans are ignored. Error values are never
/// equal to anything.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (State::Node(a), State::Node(b)) => nodes_eq(a, b),
            (State::Missing(_), State::Missing(_)) => true,
            (State::Missing(_), State::Node(Node::Null(_)))
            | (State::Node(Node::Null(_)), State::Missing(_)) => true,
            _ => false,
        }
    }
}

fn nodes_eq(a: &Node<'_>, b: &Node<'_>) -> bool {
    match (a, b) {
        (Node::Null(_), Node::Null(_)) => true,
        (Node::Bool(a, _), Node::Bool(b, _)) => a == b,
        (Node::Number(a), Node::Number(b)) => a == b,
        (Node::String(a), Node::String(b)) => a.value == b.value,
        (Node::Array(a), Node::Array(b)) => {
            a.items.len() == b.items.len()
                && a.items.iter().zip(&b.items).all(|(a, b)| nodes_eq(a, b))
        }
        (Node::Object(a), Node::Object(b)) => {
            a.len() == b.len()
                && a
                    .members()
                    .iter()
                    .zip(b.members())
                    .all(|(a, b)| a.key == b.key && nodes_eq(&a.value, &b.value))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::{Kind, parse};
    use xjson_testhelpers::test;

    #[test]
    fn missing_behaves_like_null() {
        let doc = parse(r#"{"a": 1}"#);
        let missing = doc.map_index("b");
        assert!(missing.is_missing());
        assert!(missing.is_null());
        assert!(missing.is_nil());
        assert_eq!(missing.kind(), Kind::Null);
        assert_eq!(missing.len(), 0);
        assert!(missing.span().is_none());
        assert!(missing.maybe_i64().is_none());
    }

    #[test]
    fn len_and_nil() {
        let doc = parse(r#"{"a": [1, 2], "o": {}, "s": "abc", "n": null}"#);
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.get("a").len(), 2);
        assert!(doc.get("o").is_nil());
        assert!(doc.get("o").is_empty());
        assert_eq!(doc.get("s").len(), 0);
        assert!(!doc.get("s").is_nil());
        assert!(doc.get("n").is_nil());
    }

    #[test]
    fn raw_is_verbatim() {
        let doc = parse(r#"{"n": 1.50e1, "s": "ab"}"#);
        assert_eq!(doc.get("n").raw(), Some(&b"1.50e1"[..]));
        assert_eq!(doc.get("s").raw(), Some(&br#""ab""#[..]));
        assert_eq!(doc.get("s").as_str().unwrap(), "ab");
    }

    #[test]
    fn iterators_carry_selectors() {
        let doc = parse(r#"{"xs": [10, 20], "o": {"b": 2, "a": 1}}"#);
        let xs: Vec<_> = doc
            .get("xs")
            .as_array()
            .unwrap()
            .map(|v| (v.selector().to_string(), v.must_i64()))
            .collect();
        assert_eq!(
            xs,
            [("$root.xs[0]".to_string(), 10), ("$root.xs[1]".to_string(), 20)]
        );

        let members: Vec<_> = doc
            .get("o")
            .as_object()
            .unwrap()
            .map(|(k, v)| (k.to_string(), v.selector().to_string()))
            .collect();
        assert_eq!(
            members,
            [
                ("a".to_string(), "$root.o.a".to_string()),
                ("b".to_string(), "$root.o.b".to_string())
            ]
        );

        assert_eq!(doc.get("xs").as_array().unwrap().len(), 2);
        assert_eq!(doc.get("xs").as_array().unwrap().next_back().unwrap().must_i64(), 20);
        assert_eq!(doc.get("o").must_array().count(), 0);
        assert_eq!(doc.get("xs").must_object().count(), 0);
    }

    #[test]
    fn equality_ignores_selectors_and_order() {
        let a = parse(r#"{"x": [1, "s", true, null], "y": 2.0}"#);
        let b = parse(r#"{"y": 2, "x": [1.0, "s", true, null]}"#);
        assert_eq!(a, b);
        assert_ne!(a, parse(r#"{"y": 2}"#));
        assert_ne!(a.get("nope"), a.get("nope"));
        assert_eq!(a.map_index("nope"), parse("null"));
    }
}
