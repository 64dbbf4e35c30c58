//! The navigation trail that explains where a value came from.
//!
//! Every navigation step allocates one link pointing back at its parent, so
//! building a selector is O(1) per step and nothing is rendered until a
//! diagnostic asks for it. Rendering walks the chain root-to-leaf:
//!
//! ```text
//! $root.people[1]["first name"]
//! ```
//!
//! Keys that are plain identifiers use dotted notation, anything else is
//! bracketed and quoted.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use unicode_general_category::{GeneralCategory, get_general_category};

use crate::Span;

/// The literal a rendered selector starts with.
pub(crate) const ROOT: &str = "$root";

/// A single navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// The document root.
    Root,
    /// An array element.
    Index(usize),
    /// An object member.
    Key(String),
}

struct Link {
    step: Step,
    parent: Option<Selector>,
    span: Option<Span>,
}

/// An immutable, backward-linked description of how a value was reached.
///
/// Cloning is a reference-count bump; selectors can be shared across threads.
#[derive(Clone)]
pub struct Selector(Arc<Link>);

impl Selector {
    /// A selector for the document root.
    pub fn root() -> Self {
        Self::root_at(None)
    }

    pub(crate) fn root_at(span: Option<Span>) -> Self {
        Selector(Arc::new(Link {
            step: Step::Root,
            parent: None,
            span,
        }))
    }

    /// Extend this selector with an array index.
    pub fn index(&self, index: usize) -> Self {
        self.child(Step::Index(index), None)
    }

    /// Extend this selector with an object key.
    pub fn key(&self, key: &str) -> Self {
        self.child(Step::Key(key.into()), None)
    }

    pub(crate) fn child(&self, step: Step, span: Option<Span>) -> Self {
        Selector(Arc::new(Link {
            step,
            parent: Some(self.clone()),
            span,
        }))
    }

    /// The last step of this selector.
    pub fn step(&self) -> &Step {
        &self.0.step
    }

    /// The selector this one extends, `None` for the root.
    pub fn parent(&self) -> Option<&Selector> {
        self.0.parent.as_ref()
    }

    /// Span of the node this step resolved to. `None` when the step did not
    /// resolve (missing key, index out of range, navigation past an error).
    pub fn span(&self) -> Option<Span> {
        self.0.span
    }

    /// Whether this is the root selector.
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Walk from this selector up to the root, leaf first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// The steps from the root down to this selector, root first.
    pub fn steps(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.ancestors().map(Selector::step).collect();
        steps.reverse();
        steps
    }
}

/// Iterator returned by [`Selector::ancestors`].
pub struct Ancestors<'s> {
    next: Option<&'s Selector>,
}

impl<'s> Iterator for Ancestors<'s> {
    type Item = &'s Selector;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::root()
    }
}

/// Whether `key` can be rendered with dotted notation.
///
/// Non-empty, starts with a letter (general category `L*`) or underscore,
/// continues with letters, decimal digits (`Nd`) or underscores. Other
/// numerics such as `²` or `Ⅻ` and combining marks force brackets.
pub(crate) fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if is_letter(c) || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| is_letter(c) || c == '_' || get_general_category(c) == GeneralCategory::DecimalNumber)
}

fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Root => f.write_str(ROOT),
            Step::Index(index) => write!(f, "[{index}]"),
            Step::Key(key) if is_identifier(key) => write!(f, ".{key}"),
            Step::Key(key) => write!(f, "[{key:?}]"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.steps() {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({self})")
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        let mut ours = self.ancestors();
        let mut theirs = other.ancestors();
        loop {
            match (ours.next(), theirs.next()) {
                (Some(a), Some(b)) if a.step() == b.step() => {}
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

impl Eq for Selector {}
