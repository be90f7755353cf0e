//! Subcommands against on-disk histories

use maphist_test_utils::{diff, mappings, HistoryFixture};
use pretty_assertions::assert_eq;

fn run(fixture: &HistoryFixture, args: &[&str]) -> anyhow::Result<String> {
    let dir = fixture.path().to_str().unwrap();
    let mut argv = vec!["maphist", "--dir", dir];
    argv.extend_from_slice(args);
    let matches = maphist_cli::cli().try_get_matches_from(argv)?;
    let mut out = Vec::new();
    maphist_cli::run(&matches, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn history() -> HistoryFixture {
    HistoryFixture::flat()
        .root("1.0", &mappings(&[("a/A", "com/Foo"), ("a/A.size:I", "count")]))
        .edge("1.0", "1.1", &diff(&[]))
        .edge("1.1", "1.2", &diff(&[("a/A", "com/Foo", "com/Bar")]))
}

#[test]
fn test_validate_lists_versions() {
    let fixture = history();
    let out = run(&fixture, &["validate"]).unwrap();
    assert!(out.contains("1.0  (root)"), "{out}");
    assert!(out.contains("1.2  <- 1.1"), "{out}");
    assert!(out.ends_with("3 versions, root 1.0, max depth 2, 3 files read\n"), "{out}");
}

#[test]
fn test_validate_reports_repeated_records() {
    let fixture = history().raw(
        "1.0#1.1.flatdiff",
        "CLASS\ta/A\tcom/Foo\tcom/X\nCLASS\ta/A\tcom/Foo\tcom/Y\n",
    );
    let out = run(&fixture, &["validate"]).unwrap();
    assert!(out.contains("warning [1.1] a/A: duplicate key\n"), "{out}");
    assert!(out.ends_with("3 versions, root 1.0, max depth 2, 3 files read\n"), "{out}");
}

#[test]
fn test_rename_writes_root() {
    let fixture = history();
    let out = run(
        &fixture,
        &["rename", "--version", "1.1", "--class", "a/A", "--member", "size:I", "--from", "count", "--to", "total"],
    )
    .unwrap();
    assert!(out.contains("1 version(s) changed: 1.0"), "{out}");
    assert!(fixture.read("1.0.flatmap").contains("total"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let fixture = history();
    let before = fixture.read("1.0.flatmap");
    run(
        &fixture,
        &["rename", "--version", "1.1", "--class", "a/A", "--from", "com/Foo", "--to", "com/Baz", "--dry-run"],
    )
    .unwrap();
    assert_eq!(fixture.read("1.0.flatmap"), before);
}

#[test]
fn test_propagate_seed_file_as_json() {
    let fixture = history().raw("seed.flatdiff", "CLASS\ta/A\tcom/Bar\tcom/Qux\n");
    let seed = fixture.path().join("seed.flatdiff");
    let out = run(
        &fixture,
        &["propagate", "--version", "1.2", "--seed", seed.to_str().unwrap(), "--json"],
    )
    .unwrap();

    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["applied"], 1);
    assert_eq!(report["dirty"], serde_json::json!(["1.2"]));
    assert!(fixture.read("1.1#1.2.flatdiff").contains("com/Qux"));
}

#[test]
fn test_history_marks_changes() {
    let fixture = history();
    let out = run(&fixture, &["history", "--class", "a/A", "--changes"]).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("1.0") && lines[0].ends_with("com/Foo"));
    assert!(lines[1].contains("1.2") && lines[1].ends_with("com/Bar"));
}

#[test]
fn test_diff_then_apply() {
    let fixture = HistoryFixture::flat()
        .raw("a.flatmap", "CLASS\ta/A\tcom/Foo\n")
        .raw("b.flatmap", "CLASS\ta/A\tcom/Bar\nCLASS\ta/B\tcom/New\n");
    let dir = fixture.path();
    let a = dir.join("a.flatmap");
    let b = dir.join("b.flatmap");
    let d = dir.join("a-b.flatdiff");
    let patched = dir.join("patched.flatmap");

    run(
        &fixture,
        &["diff", a.to_str().unwrap(), b.to_str().unwrap(), "--out", d.to_str().unwrap()],
    )
    .unwrap();
    let out = run(
        &fixture,
        &["apply", a.to_str().unwrap(), d.to_str().unwrap(), "--out", patched.to_str().unwrap()],
    )
    .unwrap();
    assert!(out.is_empty(), "{out}");
    assert_eq!(fixture.read("patched.flatmap"), fixture.read("b.flatmap"));
}

#[test]
fn test_resolve_writes_in_requested_format() {
    let fixture = history();
    let target = fixture.path().join("resolved.treemap");
    run(&fixture, &["resolve", "--version", "1.2", "--out", target.to_str().unwrap()]).unwrap();
    let content = fixture.read("resolved.treemap");
    assert!(content.contains("com/Bar"), "{content}");
    assert!(content.contains("count"), "{content}");
}

#[test]
fn test_unknown_version_is_an_error() {
    let fixture = history();
    let err = run(
        &fixture,
        &["rename", "--version", "9.9", "--class", "a/A", "--to", "x"],
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("unknown version '9.9'"), "{err:#}");
}
