//! Mapping trees
//!
//! A [`MappingTree`] records one complete identifier set: for every source
//! identifier, its destination name (empty = unmapped) and documentation.

use crate::diagnostic::Attribute;
use crate::key::NodeKey;
use crate::node::{Node, Tree};
use crate::path::NodePath;
use std::collections::HashMap;

/// Payload of a mapping node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    /// Destination name, empty when unmapped
    pub dst: String,
    /// Documentation, empty when absent
    pub javadoc: String,
}

impl Mapping {
    /// Mapping with a destination and no documentation
    #[inline]
    #[must_use]
    pub fn named(dst: impl Into<String>) -> Self {
        Self {
            dst: dst.into(),
            javadoc: String::new(),
        }
    }

    /// Whether the payload carries nothing
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.dst.is_empty() && self.javadoc.is_empty()
    }

    /// Value of one attribute
    #[inline]
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Destination => &self.dst,
            Attribute::Documentation => &self.javadoc,
        }
    }

    /// Replace one attribute
    #[inline]
    pub fn set(&mut self, attribute: Attribute, value: impl Into<String>) {
        match attribute {
            Attribute::Destination => self.dst = value.into(),
            Attribute::Documentation => self.javadoc = value.into(),
        }
    }
}

/// Node of a mapping tree
pub type MappingNode = Node<Mapping>;

/// Complete identifier set
pub type MappingTree = Tree<Mapping>;

impl Node<Mapping> {
    /// Destination name
    #[inline]
    #[must_use]
    pub fn dst(&self) -> &str {
        &self.value().dst
    }

    /// Set the destination name
    #[inline]
    pub fn set_dst(&mut self, dst: impl Into<String>) {
        self.value_mut().dst = dst.into();
    }

    /// Documentation
    #[inline]
    #[must_use]
    pub fn javadoc(&self) -> &str {
        &self.value().javadoc
    }

    /// Set the documentation
    #[inline]
    pub fn set_javadoc(&mut self, text: impl Into<String>) {
        self.value_mut().javadoc = text.into();
    }

    /// Destination name, falling back to the source name when unmapped
    #[inline]
    #[must_use]
    pub fn effective_name(&self) -> &str {
        if self.dst().is_empty() {
            self.key().name()
        } else {
            self.dst()
        }
    }
}

impl Tree<Mapping> {
    /// Deep, independent copy
    #[inline]
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Tree keyed by destination names with source names as destinations
    ///
    /// Member descriptors are remapped through the class mapping, so the
    /// result addresses the destination namespace exactly. Built on demand;
    /// it never goes stale because nothing is cached.
    #[must_use]
    pub fn inverted(&self) -> MappingTree {
        let classes = self.class_names();
        let mut out = MappingTree::new();
        for class in self.classes() {
            let inv = out.add_class(class.effective_name(), invert_payload(class));
            invert_children(class, inv, &classes);
        }
        out
    }

    /// Source → destination names for every mapped class, nested ones included
    #[must_use]
    pub fn class_names(&self) -> HashMap<String, String> {
        let mut names = HashMap::new();
        self.walk(|_, node| {
            if let NodeKey::Class { name } = node.key() {
                if !node.dst().is_empty() {
                    names.insert(name.clone(), node.dst().to_string());
                }
            }
        });
        names
    }
}

fn invert_payload(node: &MappingNode) -> Mapping {
    Mapping {
        dst: node.key().name().to_string(),
        javadoc: node.javadoc().to_string(),
    }
}

fn invert_children(src: &MappingNode, dst: &mut MappingNode, classes: &HashMap<String, String>) {
    for child in src.children() {
        let key = match child.key() {
            NodeKey::Class { .. } => NodeKey::class(child.effective_name()),
            NodeKey::Field { desc, .. } => {
                NodeKey::field(child.effective_name(), remap_descriptor(desc, classes))
            }
            NodeKey::Method { desc, .. } => {
                NodeKey::method(child.effective_name(), remap_descriptor(desc, classes))
            }
            NodeKey::Parameter { index, .. } => NodeKey::parameter(*index, child.effective_name()),
        };
        // kinds are preserved, so ownership rules still hold
        if let Ok(inv) = dst.add_child(key, invert_payload(child)) {
            invert_children(child, inv, classes);
        }
    }
}

/// Rewrite every class reference (`L...;`) in a field or method descriptor
#[must_use]
pub fn remap_descriptor(desc: &str, classes: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(desc.len());
    let mut rest = desc;
    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..=start]);
        let after = &rest[start + 1..];
        match after.find(';') {
            Some(end) => {
                let name = &after[..end];
                out.push_str(classes.get(name).map_or(name, String::as_str));
                out.push(';');
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Lookup from destination class names back to source paths
///
/// Rebuilt from a [`MappingTree`] whenever needed.
#[derive(Debug, Clone, Default)]
pub struct DestinationIndex {
    classes: HashMap<String, NodePath>,
}

impl DestinationIndex {
    /// Index every mapped class of `tree`
    #[must_use]
    pub fn build(tree: &MappingTree) -> Self {
        let mut classes = HashMap::new();
        tree.walk(|path, node| {
            if matches!(node.key(), NodeKey::Class { .. }) && !node.dst().is_empty() {
                classes.insert(node.dst().to_string(), path.clone());
            }
        });
        Self { classes }
    }

    /// Source path of the class mapped to `dst`
    #[inline]
    #[must_use]
    pub fn class(&self, dst: &str) -> Option<&NodePath> {
        self.classes.get(dst)
    }

    /// Number of indexed classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is indexed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> MappingTree {
        let mut tree = MappingTree::new();
        let class = tree.add_class("a/A", Mapping::named("com/Foo"));
        class.set_javadoc("The foo.");
        class.add_field("b", "La/B;", Mapping::named("bar")).unwrap();
        let method = class.add_method("c", "(La/A;)V", Mapping::named("run")).unwrap();
        method.add_parameter(1, "", Mapping::named("self")).unwrap();
        tree.add_class("a/B", Mapping::named("com/Bar"));
        tree.add_class("a/C", Mapping::default());
        tree
    }

    #[test]
    fn copy_is_independent() {
        let tree = sample();
        let mut copy = tree.copy();
        copy.class_mut("a/A").unwrap().set_dst("com/Changed");
        assert_eq!(tree.class("a/A").unwrap().dst(), "com/Foo");
        assert_eq!(copy.class("a/A").unwrap().dst(), "com/Changed");
    }

    #[test]
    fn descriptor_remap() {
        let classes: HashMap<_, _> = [("a/A".to_string(), "com/Foo".to_string())].into();
        assert_eq!(remap_descriptor("(La/A;I[La/A;)La/Z;", &classes), "(Lcom/Foo;I[Lcom/Foo;)La/Z;");
        assert_eq!(remap_descriptor("I", &classes), "I");
        assert_eq!(remap_descriptor("La/A", &classes), "La/A");
    }

    #[test]
    fn inverted_swaps_namespaces() {
        let inv = sample().inverted();
        let foo = inv.class("com/Foo").unwrap();
        assert_eq!(foo.dst(), "a/A");
        assert_eq!(foo.javadoc(), "The foo.");
        assert_eq!(foo.field("bar", "Lcom/Bar;").unwrap().dst(), "b");
        let run = foo.method("run", "(Lcom/Foo;)V").unwrap();
        assert_eq!(run.parameter(1, "self").unwrap().dst(), "");
        // unmapped classes keep their source name on both sides
        assert_eq!(inv.class("a/C").unwrap().dst(), "a/C");
    }

    #[test]
    fn inverting_twice_restores_mapped_names() {
        let tree = sample();
        let back = tree.inverted().inverted();
        assert_eq!(back.class("a/A").unwrap().dst(), "com/Foo");
        assert_eq!(
            back.class("a/A").unwrap().field("b", "La/B;").unwrap().dst(),
            "bar"
        );
    }

    #[test]
    fn destination_index_tracks_current_tree() {
        let mut tree = sample();
        let index = DestinationIndex::build(&tree);
        assert_eq!(index.class("com/Foo"), Some(&NodePath::class("a/A")));
        assert_eq!(index.len(), 2);

        tree.class_mut("a/A").unwrap().set_dst("com/Baz");
        let index = DestinationIndex::build(&tree);
        assert!(index.class("com/Foo").is_none());
        assert_eq!(index.class("com/Baz"), Some(&NodePath::class("a/A")));
    }
}
