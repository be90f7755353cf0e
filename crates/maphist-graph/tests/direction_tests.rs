//! Direction barriers and overload handling

use maphist_graph::{propagate, Direction, PropagationError, PropagationOptions, VersionGraph};
use maphist_test_utils::{diff, mappings, path, HistoryFixture};
use maphist_tree::{Attribute, DiffTree, MappingTree};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;

fn label(i: usize) -> String {
    format!("v{i}")
}

/// Random DAG over `v0..vn`; each edge carries no entry, a placeholder or a rename
fn build(n: usize, masks: &[Vec<bool>], kinds: &[u8]) -> VersionGraph {
    let mut edges = Vec::new();
    for child in 1..n {
        let mut parents: Vec<usize> = (0..child).filter(|&p| masks[child][p]).collect();
        if parents.is_empty() {
            parents.push(child - 1);
        }
        for parent in parents {
            let tree = match kinds[child * n + parent] {
                0 => DiffTree::new(),
                1 => diff(&[("a/A", "x", "x")]),
                _ => {
                    let name = label(child);
                    diff(&[("a/A", "x", name.as_str())])
                }
            };
            edges.push((label(parent), label(child), tree));
        }
    }
    VersionGraph::from_parts([(label(0), mappings(&[("a/A", "x")]))], edges).unwrap()
}

/// Versions every parent path of which passes through `seed`
fn dominated(graph: &VersionGraph, seed: &str) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let mut stack = vec![graph.root().label().to_string()];
    while let Some(label) = stack.pop() {
        if label == seed || !reachable.insert(label.clone()) {
            continue;
        }
        for child in graph.children(&label).unwrap() {
            stack.push(child.to_string());
        }
    }
    graph
        .versions()
        .iter()
        .map(|v| v.label().to_string())
        .filter(|l| l != seed && !reachable.contains(l))
        .collect()
}

fn rename_seed(graph: &VersionGraph, seed: &str) -> DiffTree {
    let before = graph
        .value_at(seed, &path("a/A"), Attribute::Destination)
        .unwrap();
    diff(&[("a/A", before.as_str(), "renamed")])
}

fn dag() -> impl Strategy<Value = (usize, Vec<Vec<bool>>, Vec<u8>, usize)> {
    (2usize..7).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec(proptest::collection::vec(any::<bool>(), n), n),
            proptest::collection::vec(0u8..3, n * n),
            0..n,
        )
    })
}

proptest! {
    #[test]
    fn test_up_never_touches_dominated_descendants((n, masks, kinds, seed) in dag()) {
        let mut graph = build(n, &masks, &kinds);
        let seed = label(seed);
        let below = dominated(&graph, &seed);
        let edit = rename_seed(&graph, &seed);

        let report = propagate(
            &mut graph,
            &seed,
            &edit,
            PropagationOptions::default().with_direction(Direction::Up),
        )
        .unwrap();
        for version in &report.dirty {
            prop_assert!(!below.contains(version), "{} rewritten", version);
        }
    }

    #[test]
    fn test_down_never_touches_ancestors((n, masks, kinds, seed) in dag()) {
        let mut graph = build(n, &masks, &kinds);
        let seed = label(seed);
        let edit = rename_seed(&graph, &seed);

        let report = propagate(
            &mut graph,
            &seed,
            &edit,
            PropagationOptions::default().with_direction(Direction::Down),
        )
        .unwrap();
        for version in &report.dirty {
            prop_assert!(
                *version == seed || graph.is_ancestor(&seed, version).unwrap(),
                "{} is not below {}", version, seed
            );
        }
        prop_assert_eq!(
            graph.value_at(&seed, &path("a/A"), Attribute::Destination).unwrap(),
            "renamed"
        );
    }

    #[test]
    fn test_second_run_is_a_no_op((n, masks, kinds, seed) in dag()) {
        let mut graph = build(n, &masks, &kinds);
        let seed = label(seed);
        let edit = rename_seed(&graph, &seed);

        propagate(&mut graph, &seed, &edit, PropagationOptions::default()).unwrap();
        let after: Vec<String> = (0..n)
            .map(|i| graph.value_at(&label(i), &path("a/A"), Attribute::Destination).unwrap())
            .collect();
        let report = propagate(&mut graph, &seed, &edit, PropagationOptions::default()).unwrap();
        prop_assert_eq!(report.applied, 0);
        let again: Vec<String> = (0..n)
            .map(|i| graph.value_at(&label(i), &path("a/A"), Attribute::Destination).unwrap())
            .collect();
        prop_assert_eq!(after, again);
    }
}

#[test]
fn test_up_only_leaves_child_files_alone() {
    let fixture = HistoryFixture::flat()
        .root("1.0", &mappings(&[("a/A", "com/Foo")]))
        .edge("1.0", "1.1", &diff(&[("a/A", "com/Foo", "com/Mid")]))
        .edge("1.1", "1.2", &diff(&[]));

    let child_before = fixture.read("1.1#1.2.flatdiff");
    let mut graph = VersionGraph::load(fixture.path(), fixture.format()).unwrap();
    propagate(
        &mut graph,
        "1.1",
        &diff(&[("a/A", "com/Mid", "com/Bar")]),
        PropagationOptions::default().with_direction(Direction::Up),
    )
    .unwrap();
    assert_eq!(graph.write_dirty().unwrap(), vec!["1.1".to_string()]);
    assert_eq!(fixture.read("1.1#1.2.flatdiff"), child_before);

    let reloaded = VersionGraph::load(fixture.path(), fixture.format()).unwrap();
    let name = |v: &str| {
        reloaded
            .value_at(v, &path("a/A"), Attribute::Destination)
            .unwrap()
    };
    assert_eq!(name("1.0"), "com/Foo");
    assert_eq!(name("1.1"), "com/Bar");
    // no entry of its own, so it still follows its parent
    assert_eq!(name("1.2"), "com/Bar");
}

fn unset_fields(descs: &[&str]) -> MappingTree {
    let mut tree = mappings(&[("a/A", "com/Foo")]);
    let class = tree.class_mut("a/A").unwrap();
    for desc in descs {
        class.add_field("f", *desc, Default::default()).unwrap();
    }
    tree
}

fn name_unset_field(root: MappingTree, spec: &str) -> PropagationError {
    let mut graph = VersionGraph::from_parts(
        [("1.0".to_string(), root)],
        [("1.0".to_string(), "1.1".to_string(), DiffTree::new())],
    )
    .unwrap();
    propagate(
        &mut graph,
        "1.1",
        &diff(&[(spec, "", "x")]),
        PropagationOptions::default().with_lenient(true),
    )
    .unwrap_err()
}

#[test]
fn test_lenient_naming_one_of_two_unset_fields_is_fatal() {
    match name_unset_field(unset_fields(&["I", "J"]), "a/A.f:I") {
        PropagationError::AmbiguousSibling {
            version,
            path: seed,
            candidates,
        } => {
            assert_eq!(version, "1.0");
            assert_eq!(seed, path("a/A.f:I"));
            assert_eq!(candidates, vec![path("a/A.f:J")]);
        }
        other => panic!("expected ambiguity, got {other}"),
    }
}

#[test]
fn test_lenient_naming_one_of_three_unset_fields_is_fatal() {
    match name_unset_field(unset_fields(&["I", "J", "Z"]), "a/A.f:Z") {
        PropagationError::AmbiguousSibling { candidates, .. } => {
            assert_eq!(candidates, vec![path("a/A.f:I"), path("a/A.f:J")]);
        }
        other => panic!("expected ambiguity, got {other}"),
    }
}

#[test]
fn test_lenient_overload_rename_at_intermediate_version() {
    let root = mappings(&[("a/A", "com/Foo"), ("a/A.m(I)V", "go"), ("a/A.m(J)V", "go")]);
    let rename = diff(&[("a/A.m(I)V", "go", "run"), ("a/A.m(J)V", "go", "run")]);
    let mut graph = VersionGraph::from_parts(
        [("1.0".to_string(), root)],
        [
            ("1.0".to_string(), "1.1".to_string(), rename),
            ("1.1".to_string(), "1.2".to_string(), DiffTree::new()),
        ],
    )
    .unwrap();

    let report = propagate(
        &mut graph,
        "1.2",
        &diff(&[("a/A.m(I)V", "run", "start")]),
        PropagationOptions::default().with_lenient(true),
    )
    .unwrap();
    assert_eq!(report.waves, 2);
    assert_eq!(report.dirty, vec!["1.1".to_string()]);
    for spec in ["a/A.m(I)V", "a/A.m(J)V"] {
        let name = |v: &str| graph.value_at(v, &path(spec), Attribute::Destination).unwrap();
        assert_eq!(name("1.0"), "go");
        assert_eq!(name("1.2"), "start");
    }
}
