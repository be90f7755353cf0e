//! Mapping history trees
//!
//! In-memory model of name mappings for compiled software, plus the pure
//! diff machinery built on it.
//!
//! # Core Concepts
//!
//! - [`MappingTree`]: one complete identifier set (class → field/method → parameter)
//! - [`DiffTree`]: two-sided (before/after) delta with the same shape
//! - [`NodeKey`] / [`NodePath`]: immutable source identity and addressing
//! - [`generate`]: structural diff of two mapping trees
//! - [`apply`]: guarded replay of diffs onto a mapping tree
//! - [`Diagnostics`]: recoverable anomalies returned alongside results
//!
//! # Example
//!
//! ```rust
//! use maphist_tree::{apply, generate, Mapping, MappingTree};
//!
//! let mut old = MappingTree::new();
//! old.add_class("a/A", Mapping::named("com/Foo"));
//! let mut new = old.copy();
//! new.class_mut("a/A").unwrap().set_dst("com/Bar");
//!
//! let diff = generate(&old, &new);
//! let diagnostics = apply(&mut old, &[&diff]);
//! assert!(diagnostics.is_empty());
//! assert_eq!(old, new);
//! ```

#![warn(unreachable_pub)]

mod apply;
mod diagnostic;
mod diff;
mod generate;
mod key;
mod mapping;
mod node;
mod path;

pub use apply::{apply, apply_one};
pub use diagnostic::{Attribute, Diagnostic, DiagnosticKind, Diagnostics};
pub use diff::{Diff, DiffEntry, DiffNode, DiffTree, Operation, Side};
pub use generate::generate;
pub use key::{NodeKey, NodeKind};
pub use mapping::{remap_descriptor, DestinationIndex, Mapping, MappingNode, MappingTree};
pub use node::{Node, Tree, TreeError};
pub use path::{outer_class_chain, NodePath};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;

    const CLASSES: [&str; 3] = ["a/A", "a/B", "a/A$C"];
    const MEMBERS: [&str; 2] = ["f", "g"];
    const DESCS: [&str; 2] = ["I", "(I)V"];
    const NAMES: [&str; 3] = ["", "x", "y"];
    const DOCS: [&str; 2] = ["", "doc"];

    type Record = (usize, Option<(usize, usize, bool)>, usize, usize);

    fn build(records: &[Record]) -> MappingTree {
        let mut tree = MappingTree::new();
        for &(class, member, name, doc) in records {
            let mut path = NodePath::class(CLASSES[class]);
            if let Some((m, d, is_method)) = member {
                let key = if is_method {
                    NodeKey::method(MEMBERS[m], DESCS[d])
                } else {
                    NodeKey::field(MEMBERS[m], DESCS[d])
                };
                path = path.child(key);
            }
            let node = tree.ensure(&path).unwrap();
            node.set_dst(NAMES[name]);
            node.set_javadoc(DOCS[doc]);
        }
        tree
    }

    fn without_blank(mut tree: MappingTree) -> MappingTree {
        tree.prune(|m| !m.is_blank());
        tree
    }

    fn records() -> impl Strategy<Value = Vec<Record>> {
        proptest::collection::vec(
            (
                0..CLASSES.len(),
                proptest::option::of((0..MEMBERS.len(), 0..DESCS.len(), any::<bool>())),
                0..NAMES.len(),
                0..DOCS.len(),
            ),
            0..12,
        )
    }

    proptest! {
        #[test]
        fn applying_generated_diff_reproduces_target(a in records(), b in records()) {
            let a = build(&a);
            let b = build(&b);
            let diff = generate(&a, &b);

            let mut result = a.copy();
            let diagnostics = apply(&mut result, &[&diff]);

            prop_assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
            prop_assert_eq!(without_blank(result), without_blank(b));
        }

        #[test]
        fn reversed_diff_restores_source(a in records(), b in records()) {
            let a = build(&a);
            let b = build(&b);
            let diff = generate(&a, &b);

            let mut result = b.copy();
            let diagnostics = apply(&mut result, &[&diff.reversed()]);

            prop_assert!(diagnostics.is_empty());
            prop_assert_eq!(without_blank(result), without_blank(a));
        }
    }

    #[test]
    fn scenario_remove_then_missing() {
        let mut a = MappingTree::new();
        a.add_class("X", Mapping::named("Y"));
        let diff = generate(&a, &MappingTree::new());
        assert_eq!(diff.class("X").unwrap().value().dst, Diff::new("Y", ""));

        let mut present = a.copy();
        assert!(apply(&mut present, &[&diff]).is_empty());
        assert!(present.class("X").is_none());

        let mut missing = MappingTree::new();
        let diagnostics = apply(&mut missing, &[&diff]);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::TargetMissing).count(), 1);
        assert!(missing.is_empty());
    }
}
