//! The parsed tree.
//!
//! Nodes are built once by the scanner and never mutated. Containers sit
//! behind `Arc` so a [`Value`](crate::Value) cursor can be cloned and sent
//! to other threads without copying the subtree.

use alloc::borrow::Cow;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{Kind, Number, Span};

#[derive(Debug, Clone)]
pub(crate) enum Node<'a> {
    Null(Span),
    Bool(bool, Span),
    Number(Number<'a>),
    String(Arc<JsonString<'a>>),
    Array(Arc<Array<'a>>),
    Object(Arc<Object<'a>>),
}

/// A string's unescaped text. The span includes the quotes.
#[derive(Debug)]
pub(crate) struct JsonString<'a> {
    pub(crate) value: Cow<'a, str>,
    pub(crate) span: Span,
}

#[derive(Debug)]
pub(crate) struct Array<'a> {
    pub(crate) items: Vec<Node<'a>>,
    pub(crate) span: Span,
}

#[derive(Debug)]
pub(crate) struct Member<'a> {
    pub(crate) key: Cow<'a, str>,
    pub(crate) value: Node<'a>,
}

/// Members sorted by key, each key present once.
#[derive(Debug)]
pub(crate) struct Object<'a> {
    members: Vec<Member<'a>>,
    pub(crate) span: Span,
}

impl<'a> Node<'a> {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Node::Null(_) => Kind::Null,
            Node::Bool(..) => Kind::Bool,
            Node::Number(_) => Kind::Number,
            Node::String(_) => Kind::String,
            Node::Array(_) => Kind::Array,
            Node::Object(_) => Kind::Object,
        }
    }

    pub(crate) fn span(&self) -> Span {
        match self {
            Node::Null(span) | Node::Bool(_, span) => *span,
            Node::Number(n) => n.span(),
            Node::String(s) => s.span,
            Node::Array(a) => a.span,
            Node::Object(o) => o.span,
        }
    }
}

impl<'a> Object<'a> {
    /// Sort members by key and drop all but the last occurrence of each key.
    ///
    /// Returns the object and how many duplicates were dropped.
    pub(crate) fn from_members(mut members: Vec<Member<'a>>, span: Span) -> (Self, usize) {
        let before = members.len();
        // Stable, so duplicates keep their input order.
        members.sort_by(|a, b| a.key.as_bytes().cmp(b.key.as_bytes()));
        members.reverse();
        // `dedup_by` keeps the first of each run; after the reverse that is
        // the last occurrence in the input.
        members.dedup_by(|later, kept| later.key == kept.key);
        members.reverse();
        let dropped = before - members.len();
        (Object { members, span }, dropped)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Node<'a>> {
        self.members
            .binary_search_by(|m| m.key.as_bytes().cmp(key.as_bytes()))
            .ok()
            .map(|i| &self.members[i].value)
    }

    pub(crate) fn members(&self) -> &[Member<'a>] {
        &self.members
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.key.as_ref())
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }
}
