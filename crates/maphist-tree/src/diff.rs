//! Diff trees
//!
//! A [`DiffTree`] has the shape of a mapping tree, but every attribute holds
//! two values: side A (before, the parent's view) and side B (after, the
//! child's view).

use crate::diagnostic::Attribute;
use crate::node::{Node, Tree};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Side of a two-sided diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Before
    A,
    /// After
    B,
}

impl Side {
    /// The other side
    #[inline]
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Operation implied by a two-sided value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Both sides equal
    None,
    /// A empty, B set
    Add,
    /// A set, B empty
    Remove,
    /// Both set and different
    Change,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Change => "change",
        };
        f.write_str(name)
    }
}

/// Two-sided value of one attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diff {
    /// Side A (before)
    pub a: String,
    /// Side B (after)
    pub b: String,
}

impl Diff {
    /// Create diff from both sides
    #[inline]
    #[must_use]
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    /// Value on `side`
    #[inline]
    #[must_use]
    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// Set value on `side`
    #[inline]
    pub fn set(&mut self, side: Side, value: impl Into<String>) {
        match side {
            Side::A => self.a = value.into(),
            Side::B => self.b = value.into(),
        }
    }

    /// Whether the sides differ
    #[inline]
    #[must_use]
    pub fn is_diff(&self) -> bool {
        self.a != self.b
    }

    /// Derived operation
    #[must_use]
    pub fn operation(&self) -> Operation {
        match (self.a.is_empty(), self.b.is_empty()) {
            _ if self.a == self.b => Operation::None,
            (true, false) => Operation::Add,
            (false, true) => Operation::Remove,
            _ => Operation::Change,
        }
    }

    /// Sides swapped
    #[inline]
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }
}

/// Payload of a diff node: destination and documentation diffs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffEntry {
    /// Destination name diff
    pub dst: Diff,
    /// Documentation diff
    pub javadoc: Diff,
}

impl DiffEntry {
    /// Entry with a destination diff only
    #[inline]
    #[must_use]
    pub fn dst(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            dst: Diff::new(a, b),
            javadoc: Diff::default(),
        }
    }

    /// Whether either attribute carries a delta
    #[inline]
    #[must_use]
    pub fn is_diff(&self) -> bool {
        self.dst.is_diff() || self.javadoc.is_diff()
    }

    /// Diff of one attribute
    #[inline]
    #[must_use]
    pub fn attribute(&self, attribute: Attribute) -> &Diff {
        match attribute {
            Attribute::Destination => &self.dst,
            Attribute::Documentation => &self.javadoc,
        }
    }

    /// Mutable diff of one attribute
    #[inline]
    pub fn attribute_mut(&mut self, attribute: Attribute) -> &mut Diff {
        match attribute {
            Attribute::Destination => &mut self.dst,
            Attribute::Documentation => &mut self.javadoc,
        }
    }
}

/// Node of a diff tree
pub type DiffNode = Node<DiffEntry>;

/// Two-sided delta between two identifier sets
pub type DiffTree = Tree<DiffEntry>;

impl Node<DiffEntry> {
    /// Destination on `side`
    #[inline]
    #[must_use]
    pub fn get(&self, side: Side) -> &str {
        self.value().dst.get(side)
    }

    /// Set destination on `side`
    #[inline]
    pub fn set(&mut self, side: Side, value: impl Into<String>) {
        self.value_mut().dst.set(side, value);
    }

    /// Documentation on `side`
    #[inline]
    #[must_use]
    pub fn javadoc(&self, side: Side) -> &str {
        self.value().javadoc.get(side)
    }

    /// Set documentation on `side`
    #[inline]
    pub fn set_javadoc(&mut self, side: Side, text: impl Into<String>) {
        self.value_mut().javadoc.set(side, text);
    }

    /// Whether this node carries a delta
    #[inline]
    #[must_use]
    pub fn is_diff(&self) -> bool {
        self.value().is_diff()
    }

    /// Whether this node and every descendant remove everything they name:
    /// side B empty for both attributes throughout
    #[must_use]
    pub fn is_full_removal(&self) -> bool {
        let v = self.value();
        v.dst.b.is_empty() && v.javadoc.b.is_empty() && self.children().all(Self::is_full_removal)
    }
}

impl Tree<DiffEntry> {
    /// Prune dead nodes bottom-up: no delta and no surviving children.
    /// Returns how many nodes were dropped.
    pub fn validate(&mut self) -> usize {
        let pruned = self.prune(DiffEntry::is_diff);
        if pruned > 0 {
            tracing::trace!(pruned, "pruned no-op diff nodes");
        }
        pruned
    }

    /// The same diff with sides A and B swapped everywhere
    #[must_use]
    pub fn reversed(&self) -> DiffTree {
        let mut out = self.clone();
        out.for_each_value_mut(|entry| {
            entry.dst = entry.dst.reversed();
            entry.javadoc = entry.javadoc.reversed();
        });
        out
    }
}
