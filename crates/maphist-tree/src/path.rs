//! Node paths for addressing within trees
//!
//! Provides [`NodePath`] for hierarchical addressing of one node across
//! every tree in a version history.

use crate::key::{NodeKey, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Path from the tree root to a node
///
/// The same path addresses "the same identifier" in the mapping tree of a
/// root version and in the diff trees of every other version.
///
/// # Examples
/// - `[Class a/A]` → `a/A`
/// - `[Class a/A, Method m (I)V, Parameter #0:x]` → `a/A.m(I)V.#0:x`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<NodeKey>);

impl NodePath {
    /// Create new path from keys
    #[inline]
    #[must_use]
    pub fn new(keys: Vec<NodeKey>) -> Self {
        Self(keys)
    }

    /// Empty path (tree root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path to a class, including the outer classes of nested names
    ///
    /// `a/A$B` becomes `[a/A, a/A$B]`.
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self(
            outer_class_chain(name)
                .into_iter()
                .map(NodeKey::class)
                .collect(),
        )
    }

    /// Get path keys
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[NodeKey] {
        &self.0
    }

    /// Get number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last key (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&NodeKey> {
        self.0.last()
    }

    /// Kind of the addressed node (if not root)
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        self.0.last().map(NodeKey::kind)
    }

    /// Append a key, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, key: NodeKey) -> Self {
        let mut new = self.clone();
        new.0.push(key);
        new
    }

    /// Replace the last key, returning new path
    ///
    /// Used to address a sibling of the same parent.
    #[must_use]
    pub fn sibling(&self, key: NodeKey) -> Self {
        let mut new = self.clone();
        new.0.pop();
        new.0.push(key);
        new
    }

    /// Check if this path is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Iterator over keys from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &NodeKey> {
        self.0.iter()
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl From<Vec<NodeKey>> for NodePath {
    fn from(keys: Vec<NodeKey>) -> Self {
        Self(keys)
    }
}

/// Outer class names of a binary class name, outermost first, ending with
/// the name itself
///
/// Empty segments (`a/A$$1`, trailing `$`) do not start a new level.
#[must_use]
pub fn outer_class_chain(name: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let bytes = name.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'$' && i > 0 && i + 1 < bytes.len() && bytes[i - 1] != b'$' && bytes[i + 1] != b'$'
        {
            let prefix = &name[..i];
            if !prefix.ends_with('/') {
                chain.push(prefix.to_string());
            }
        }
    }
    chain.push(name.to_string());
    chain
}
