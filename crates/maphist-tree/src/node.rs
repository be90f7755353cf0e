//! Generic tree structure shared by mapping and diff trees
//!
//! A [`Tree<V>`] owns its top-level classes; every [`Node<V>`] exclusively
//! owns its children. The payload `V` is the only thing that differs between
//! a mapping tree and a diff tree.

use crate::key::{NodeKey, NodeKind};
use crate::path::NodePath;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// One node: immutable key, mutable payload, owned children
#[derive(Debug, Clone, PartialEq)]
pub struct Node<V> {
    key: NodeKey,
    value: V,
    children: IndexMap<NodeKey, Node<V>>,
}

impl<V> Node<V> {
    /// Create a childless node
    #[inline]
    #[must_use]
    pub fn new(key: NodeKey, value: V) -> Self {
        Self {
            key,
            value,
            children: IndexMap::new(),
        }
    }

    /// Source identity
    #[inline]
    #[must_use]
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Kind derived from the key
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.key.kind()
    }

    /// Payload
    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Mutable payload
    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Children in insertion order
    #[inline]
    pub fn children(&self) -> impl Iterator<Item = &Node<V>> {
        self.children.values()
    }

    /// Mutable children in insertion order
    #[inline]
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Node<V>> {
        self.children.values_mut()
    }

    /// Whether this node owns any children
    #[inline]
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Child by key
    #[inline]
    #[must_use]
    pub fn child(&self, key: &NodeKey) -> Option<&Node<V>> {
        self.children.get(key)
    }

    /// Mutable child by key
    #[inline]
    pub fn child_mut(&mut self, key: &NodeKey) -> Option<&mut Node<V>> {
        self.children.get_mut(key)
    }

    /// Add or replace a child
    ///
    /// A colliding key logs a warning and the old subtree is replaced.
    ///
    /// # Errors
    /// Returns [`TreeError::InvalidChild`] if this node's kind cannot own the
    /// child's kind.
    pub fn add_child(&mut self, key: NodeKey, value: V) -> Result<&mut Node<V>, TreeError> {
        if !self.kind().can_own(key.kind()) {
            return Err(TreeError::InvalidChild {
                parent: Some(self.kind()),
                child: key.kind(),
            });
        }
        if self.children.contains_key(&key) {
            tracing::warn!(parent = %self.key, child = %key, "duplicate key, replacing existing node");
        }
        Ok(replace_entry(&mut self.children, key, value))
    }

    /// Remove a child and its whole subtree
    #[inline]
    pub fn remove_child(&mut self, key: &NodeKey) -> Option<Node<V>> {
        self.children.shift_remove(key)
    }

    /// Add or replace a nested class
    ///
    /// # Errors
    /// Returns [`TreeError::InvalidChild`] unless this node is a class.
    #[inline]
    pub fn add_class(&mut self, name: &str, value: V) -> Result<&mut Node<V>, TreeError> {
        self.add_child(NodeKey::class(name), value)
    }

    /// Add or replace a field
    ///
    /// # Errors
    /// Returns [`TreeError::InvalidChild`] unless this node is a class.
    #[inline]
    pub fn add_field(&mut self, name: &str, desc: &str, value: V) -> Result<&mut Node<V>, TreeError> {
        self.add_child(NodeKey::field(name, desc), value)
    }

    /// Add or replace a method
    ///
    /// # Errors
    /// Returns [`TreeError::InvalidChild`] unless this node is a class.
    #[inline]
    pub fn add_method(&mut self, name: &str, desc: &str, value: V) -> Result<&mut Node<V>, TreeError> {
        self.add_child(NodeKey::method(name, desc), value)
    }

    /// Add or replace a parameter
    ///
    /// # Errors
    /// Returns [`TreeError::InvalidChild`] unless this node is a method.
    #[inline]
    pub fn add_parameter(&mut self, index: u32, name: &str, value: V) -> Result<&mut Node<V>, TreeError> {
        self.add_child(NodeKey::parameter(index, name), value)
    }

    /// Nested class by source name
    #[inline]
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&Node<V>> {
        self.child(&NodeKey::class(name))
    }

    /// Field by name and descriptor
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str, desc: &str) -> Option<&Node<V>> {
        self.child(&NodeKey::field(name, desc))
    }

    /// Method by name and descriptor
    #[inline]
    #[must_use]
    pub fn method(&self, name: &str, desc: &str) -> Option<&Node<V>> {
        self.child(&NodeKey::method(name, desc))
    }

    /// Parameter by index and source name
    #[inline]
    #[must_use]
    pub fn parameter(&self, index: u32, name: &str) -> Option<&Node<V>> {
        self.child(&NodeKey::parameter(index, name))
    }

    /// Number of nodes in this subtree, including this one
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.values().map(Node::len).sum::<usize>()
    }

    fn walk_into<F>(&self, path: &NodePath, f: &mut F)
    where
        F: FnMut(&NodePath, &Node<V>),
    {
        f(path, self);
        for child in self.children.values() {
            child.walk_into(&path.child(child.key.clone()), f);
        }
    }

    fn for_each_value_mut<F: FnMut(&mut V)>(&mut self, f: &mut F) {
        f(&mut self.value);
        for child in self.children.values_mut() {
            child.for_each_value_mut(f);
        }
    }

    /// Drop children, bottom-up, that fail `keep` and have no children left.
    /// Returns the number of nodes dropped.
    fn prune_children<F: Fn(&V) -> bool>(&mut self, keep: &F) -> usize {
        let mut removed = 0;
        self.children.retain(|_, child| {
            removed += child.prune_children(keep);
            let alive = keep(&child.value) || child.has_children();
            if !alive {
                removed += 1;
            }
            alive
        });
        removed
    }
}

fn replace_entry<V>(map: &mut IndexMap<NodeKey, Node<V>>, key: NodeKey, value: V) -> &mut Node<V> {
    let node = Node::new(key.clone(), value);
    match map.entry(key) {
        Entry::Occupied(mut slot) => {
            slot.insert(node);
            slot.into_mut()
        }
        Entry::Vacant(slot) => slot.insert(node),
    }
}

/// Tree root: owns the top-level classes keyed by source name
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<V> {
    classes: IndexMap<NodeKey, Node<V>>,
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Tree<V> {
    /// Create empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: IndexMap::new(),
        }
    }

    /// Add or replace a top-level class
    ///
    /// A colliding name logs a warning and the old subtree is replaced.
    pub fn add_class(&mut self, name: &str, value: V) -> &mut Node<V> {
        let key = NodeKey::class(name);
        if self.classes.contains_key(&key) {
            tracing::warn!(class = name, "duplicate class, replacing existing node");
        }
        replace_entry(&mut self.classes, key, value)
    }

    /// Top-level class by source name
    #[inline]
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&Node<V>> {
        self.classes.get(&NodeKey::class(name))
    }

    /// Mutable top-level class by source name
    #[inline]
    pub fn class_mut(&mut self, name: &str) -> Option<&mut Node<V>> {
        self.classes.get_mut(&NodeKey::class(name))
    }

    /// Remove a top-level class and its subtree
    #[inline]
    pub fn remove_class(&mut self, name: &str) -> Option<Node<V>> {
        self.classes.shift_remove(&NodeKey::class(name))
    }

    /// Top-level classes in insertion order
    #[inline]
    pub fn classes(&self) -> impl Iterator<Item = &Node<V>> {
        self.classes.values()
    }

    /// Mutable top-level classes in insertion order
    #[inline]
    pub fn classes_mut(&mut self) -> impl Iterator<Item = &mut Node<V>> {
        self.classes.values_mut()
    }

    /// Whether the tree has no classes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.values().map(Node::len).sum()
    }

    /// Node at `path`
    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&Node<V>> {
        let (first, rest) = path.keys().split_first()?;
        let mut node = self.classes.get(first)?;
        for key in rest {
            node = node.children.get(key)?;
        }
        Some(node)
    }

    /// Mutable node at `path`
    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Node<V>> {
        let (first, rest) = path.keys().split_first()?;
        let mut node = self.classes.get_mut(first)?;
        for key in rest {
            node = node.children.get_mut(key)?;
        }
        Some(node)
    }

    /// Node at `path`, creating it and any missing ancestors with default
    /// payloads
    ///
    /// # Errors
    /// Returns [`TreeError::EmptyPath`] for the root path and
    /// [`TreeError::InvalidChild`] if the path breaks ownership rules.
    pub fn ensure(&mut self, path: &NodePath) -> Result<&mut Node<V>, TreeError>
    where
        V: Default,
    {
        let (first, rest) = path.keys().split_first().ok_or(TreeError::EmptyPath)?;
        if first.kind() != NodeKind::Class {
            return Err(TreeError::InvalidChild {
                parent: None,
                child: first.kind(),
            });
        }
        let mut node = self
            .classes
            .entry(first.clone())
            .or_insert_with(|| Node::new(first.clone(), V::default()));
        for key in rest {
            if !node.kind().can_own(key.kind()) {
                return Err(TreeError::InvalidChild {
                    parent: Some(node.kind()),
                    child: key.kind(),
                });
            }
            node = node
                .children
                .entry(key.clone())
                .or_insert_with(|| Node::new(key.clone(), V::default()));
        }
        Ok(node)
    }

    /// Remove the node at `path` with its whole subtree
    pub fn remove(&mut self, path: &NodePath) -> Option<Node<V>> {
        let last = path.last()?;
        match path.parent() {
            Some(parent) if !parent.is_empty() => self.get_mut(&parent)?.remove_child(last),
            _ => self.classes.shift_remove(last),
        }
    }

    /// Visit every node depth-first, parents before children
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(&NodePath, &Node<V>),
    {
        for class in self.classes.values() {
            class.walk_into(&NodePath::new(vec![class.key.clone()]), &mut f);
        }
    }

    /// Apply `f` to every payload
    pub fn for_each_value_mut<F: FnMut(&mut V)>(&mut self, mut f: F) {
        for class in self.classes.values_mut() {
            class.for_each_value_mut(&mut f);
        }
    }

    /// Drop every node, bottom-up, whose payload fails `keep` and which has
    /// no children left. Returns the number of nodes dropped.
    pub fn prune<F: Fn(&V) -> bool>(&mut self, keep: F) -> usize {
        let mut removed = 0;
        self.classes.retain(|_, class| {
            removed += class.prune_children(&keep);
            let alive = keep(&class.value) || class.has_children();
            if !alive {
                removed += 1;
            }
            alive
        });
        removed
    }
}

/// Errors from structural tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Child kind not allowed under the parent kind (`None` = tree root)
    #[error("a {child} cannot be placed under {}", parent_label(.parent))]
    InvalidChild {
        /// Parent kind, `None` for the root
        parent: Option<NodeKind>,
        /// Rejected child kind
        child: NodeKind,
    },

    /// The root path does not address a node
    #[error("empty node path")]
    EmptyPath,
}

fn parent_label(parent: &Option<NodeKind>) -> String {
    parent.map_or_else(|| "the root".to_string(), |p| format!("a {p}"))
}
