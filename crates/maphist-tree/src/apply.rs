//! Diff application
//!
//! Replays diff trees onto a mapping tree. Every write is guarded by a
//! match-before-write check; edits that fail the check are skipped and
//! reported as [`Diagnostic`]s, never as errors.

use crate::diagnostic::{Attribute, Diagnostic, DiagnosticKind, Diagnostics};
use crate::diff::{Diff, DiffNode, DiffTree, Operation};
use crate::mapping::{Mapping, MappingNode, MappingTree};
use crate::path::NodePath;

/// Apply `diffs` to `tree` in argument order
///
/// Returns the diagnostics of every skipped edit.
pub fn apply(tree: &mut MappingTree, diffs: &[&DiffTree]) -> Diagnostics {
    let mut out = Diagnostics::new();
    for diff in diffs {
        out.extend(apply_one(tree, diff));
    }
    out
}

/// Apply a single diff to `tree`
pub fn apply_one(tree: &mut MappingTree, diff: &DiffTree) -> Diagnostics {
    let mut out = Diagnostics::new();
    for class in diff.classes() {
        apply_node(tree, &NodePath::new(vec![class.key().clone()]), class, &mut out);
    }
    out
}

fn apply_node(tree: &mut MappingTree, path: &NodePath, diff: &DiffNode, out: &mut Diagnostics) {
    let entry = diff.value();
    let dst_op = entry.dst.operation();

    if dst_op == Operation::Remove {
        if let Some(target) = tree.get(path) {
            if diff.is_full_removal() && removes_entirely(diff, target) {
                tree.remove(path);
                return;
            }
        }
    }

    apply_attribute(tree, path, &entry.dst, Attribute::Destination, out);
    apply_attribute(tree, path, &entry.javadoc, Attribute::Documentation, out);

    for child in diff.children() {
        apply_node(tree, &path.child(child.key().clone()), child, out);
    }

    let removed_something =
        dst_op == Operation::Remove || entry.javadoc.operation() == Operation::Remove;
    if removed_something
        && tree
            .get(path)
            .is_some_and(|n| n.value().is_blank() && !n.has_children())
    {
        tree.remove(path);
    }
}

fn apply_attribute(
    tree: &mut MappingTree,
    path: &NodePath,
    diff: &Diff,
    attribute: Attribute,
    out: &mut Diagnostics,
) {
    let skip = |kind: DiagnosticKind, actual: &str| {
        Diagnostic::new(kind, path.clone())
            .attribute(attribute)
            .values(diff.a.as_str(), actual)
    };

    match diff.operation() {
        Operation::None => {}
        Operation::Add => {
            let occupied = tree
                .get(path)
                .map(|n| read(n, attribute).to_string())
                .filter(|value| !value.is_empty());
            match occupied {
                Some(value) => out.push(skip(DiagnosticKind::TargetPresent, &value)),
                None => {
                    if let Ok(node) = tree.ensure(path) {
                        write(node, attribute, &diff.b);
                    }
                }
            }
        }
        Operation::Remove | Operation::Change => match tree.get_mut(path) {
            None => out.push(skip(DiagnosticKind::TargetMissing, "")),
            Some(node) if read(node, attribute) != diff.a => {
                let actual = read(node, attribute).to_string();
                out.push(skip(DiagnosticKind::StaleBefore, &actual));
            }
            Some(node) => write(node, attribute, &diff.b),
        },
    }
}

fn read(node: &MappingNode, attribute: Attribute) -> &str {
    node.value().get(attribute)
}

fn write(node: &mut MappingNode, attribute: Attribute, value: &str) {
    node.value_mut().set(attribute, value);
}

/// Whether applying `diff` would leave nothing of `target`: every value it
/// holds is matched and removed, and every child is either removed the same
/// way or carries nothing.
fn removes_entirely(diff: &DiffNode, target: &MappingNode) -> bool {
    let v = diff.value();
    let Mapping { dst, javadoc } = target.value();
    *dst == v.dst.a
        && *javadoc == v.javadoc.a
        && target.children().all(|child| match diff.child(child.key()) {
            Some(d) => removes_entirely(d, child),
            None => is_hollow(child),
        })
}

fn is_hollow(node: &MappingNode) -> bool {
    node.value().is_blank() && node.children().all(is_hollow)
}
