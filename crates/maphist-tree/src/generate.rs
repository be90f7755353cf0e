//! Diff generation
//!
//! Builds a [`DiffTree`] from a structural comparison of two mapping trees.
//! The result is a pure delta: it knows nothing about versions.

use crate::diff::{Diff, DiffEntry, DiffNode, DiffTree};
use crate::key::NodeKey;
use crate::mapping::{MappingNode, MappingTree};

/// Diff turning `a` into `b`
///
/// Both trees are walked in lock-step and children are paired by key.
/// A node only in `a` yields `before = a.dst, after = ""`; a node only in
/// `b` the mirror. Attributes equal on both sides are never recorded, and
/// nodes left without any delta are pruned.
#[must_use]
pub fn generate(a: &MappingTree, b: &MappingTree) -> DiffTree {
    let mut out = DiffTree::new();
    let names = a
        .classes()
        .map(|c| c.key().name())
        .chain(b.classes().map(|c| c.key().name()).filter(|n| a.class(n).is_none()));
    for name in names {
        let (ca, cb) = (a.class(name), b.class(name));
        let node = out.add_class(name, entry(ca, cb));
        fill(node, ca, cb);
    }
    out.validate();
    out
}

fn fill(out: &mut DiffNode, a: Option<&MappingNode>, b: Option<&MappingNode>) {
    for key in union_keys(a, b) {
        let ca = a.and_then(|n| n.child(key));
        let cb = b.and_then(|n| n.child(key));
        // both inputs obey the same ownership rules, so insertion cannot fail
        if let Ok(child) = out.add_child(key.clone(), entry(ca, cb)) {
            fill(child, ca, cb);
        }
    }
}

fn union_keys<'t>(a: Option<&'t MappingNode>, b: Option<&'t MappingNode>) -> Vec<&'t NodeKey> {
    let mut keys: Vec<&NodeKey> = a.into_iter().flat_map(|n| n.children().map(MappingNode::key)).collect();
    if let Some(b) = b {
        keys.extend(
            b.children()
                .map(MappingNode::key)
                .filter(|k| a.map_or(true, |a| a.child(k).is_none())),
        );
    }
    keys
}

fn entry(a: Option<&MappingNode>, b: Option<&MappingNode>) -> DiffEntry {
    let (dst_a, doc_a) = a.map_or(("", ""), |n| (n.dst(), n.javadoc()));
    let (dst_b, doc_b) = b.map_or(("", ""), |n| (n.dst(), n.javadoc()));
    DiffEntry {
        dst: changed(dst_a, dst_b),
        javadoc: changed(doc_a, doc_b),
    }
}

fn changed(a: &str, b: &str) -> Diff {
    if a == b {
        Diff::default()
    } else {
        Diff::new(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{Operation, Side};
    use crate::mapping::Mapping;
    use crate::path::NodePath;

    #[test]
    fn removed_class() {
        let mut a = MappingTree::new();
        a.add_class("X", Mapping::named("Y"));
        let diff = generate(&a, &MappingTree::new());

        assert_eq!(diff.len(), 1);
        let node = diff.class("X").unwrap();
        assert_eq!(node.get(Side::A), "Y");
        assert_eq!(node.get(Side::B), "");
        assert_eq!(node.value().dst.operation(), Operation::Remove);
    }

    #[test]
    fn added_member_with_parameters() {
        let a = MappingTree::new();
        let mut b = MappingTree::new();
        b.add_class("a/A", Mapping::default())
            .add_method("m", "(I)V", Mapping::named("run"))
            .unwrap()
            .add_parameter(1, "", Mapping::named("count"))
            .unwrap();

        let diff = generate(&a, &b);
        let class = diff.class("a/A").unwrap();
        assert!(!class.is_diff());
        let method = class.method("m", "(I)V").unwrap();
        assert_eq!(method.value().dst, Diff::new("", "run"));
        assert_eq!(method.parameter(1, "").unwrap().value().dst, Diff::new("", "count"));
    }

    #[test]
    fn unchanged_attributes_are_not_recorded() {
        let mut a = MappingTree::new();
        let class = a.add_class("a/A", Mapping::named("com/Foo"));
        class.set_javadoc("old");
        class.add_field("f", "I", Mapping::named("size")).unwrap();
        let mut b = a.copy();
        b.class_mut("a/A").unwrap().set_javadoc("new");

        let diff = generate(&a, &b);
        let class = diff.class("a/A").unwrap();
        assert_eq!(class.value().dst, Diff::default());
        assert_eq!(class.value().javadoc, Diff::new("old", "new"));
        assert!(class.field("f", "I").is_none());
    }

    #[test]
    fn identical_trees_give_empty_diff() {
        let mut a = MappingTree::new();
        a.add_class("a/A", Mapping::named("com/Foo"));
        assert!(generate(&a, &a.copy()).is_empty());
    }

    #[test]
    fn nested_class_changes() {
        let mut a = MappingTree::new();
        a.add_class("a/A", Mapping::named("com/Foo"))
            .add_class("a/A$B", Mapping::named("com/Foo$Inner"))
            .unwrap();
        let mut b = a.copy();
        b.class_mut("a/A")
            .unwrap()
            .child_mut(&NodeKey::class("a/A$B"))
            .unwrap()
            .set_dst("com/Foo$Nested");

        let diff = generate(&a, &b);
        let nested = diff.get(&NodePath::class("a/A$B")).unwrap();
        assert_eq!(nested.value().dst, Diff::new("com/Foo$Inner", "com/Foo$Nested"));
    }
}
