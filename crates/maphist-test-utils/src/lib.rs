//! Testing utilities for the maphist workspace
//!
//! Tree builders and an on-disk history fixture.

#![allow(missing_docs)]

use maphist_format::{FlatFormat, MappingFormat, TreeFormat};
use maphist_tree::{DiffEntry, DiffTree, Mapping, MappingTree, NodeKey, NodePath};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Parse `a/A`, `a/A.name:desc` (field), `a/A.name(desc)` (method) or
/// `a/A.name(desc)#index` (parameter, empty source name)
pub fn path(spec: &str) -> NodePath {
    let (class, member) = match spec.split_once('.') {
        Some((class, member)) => (class, Some(member)),
        None => (spec, None),
    };
    let mut path = NodePath::class(class);
    let Some(member) = member else {
        return path;
    };
    if let Some(open) = member.find('(') {
        let (name, rest) = member.split_at(open);
        let (desc, param) = match rest.split_once('#') {
            Some((desc, index)) => (desc, Some(index)),
            None => (rest, None),
        };
        path = path.child(NodeKey::method(name, desc));
        if let Some(index) = param {
            path = path.child(NodeKey::parameter(index.parse().unwrap(), ""));
        }
    } else {
        let (name, desc) = member.split_once(':').unwrap();
        path = path.child(NodeKey::field(name, desc));
    }
    path
}

/// Mapping tree from `(path spec, destination)` pairs
pub fn mappings(entries: &[(&str, &str)]) -> MappingTree {
    let mut tree = MappingTree::new();
    for (spec, dst) in entries {
        *tree.ensure(&path(spec)).unwrap().value_mut() = Mapping::named(*dst);
    }
    tree
}

/// Diff tree from `(path spec, before, after)` triples
pub fn diff(entries: &[(&str, &str, &str)]) -> DiffTree {
    let mut tree = DiffTree::new();
    for (spec, a, b) in entries {
        *tree.ensure(&path(spec)).unwrap().value_mut() = DiffEntry::dst(*a, *b);
    }
    tree
}

/// History directory in a temporary location
pub struct HistoryFixture {
    dir: TempDir,
    format: Arc<dyn MappingFormat>,
}

impl HistoryFixture {
    pub fn new(format: Arc<dyn MappingFormat>) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            format,
        }
    }

    pub fn flat() -> Self {
        Self::new(Arc::new(FlatFormat))
    }

    pub fn tree() -> Self {
        Self::new(Arc::new(TreeFormat))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn format(&self) -> Arc<dyn MappingFormat> {
        Arc::clone(&self.format)
    }

    pub fn mappings_file(&self, version: &str) -> PathBuf {
        self.path()
            .join(format!("{version}{}", self.format.mappings_extension()))
    }

    pub fn diff_file(&self, parent: &str, child: &str) -> PathBuf {
        self.path()
            .join(format!("{parent}#{child}{}", self.format.diff_extension()))
    }

    /// Write a root's mappings
    pub fn root(self, version: &str, tree: &MappingTree) -> Self {
        self.format
            .write_mappings(&self.mappings_file(version), tree)
            .unwrap();
        self
    }

    /// Write the diff of `child` against `parent`, unpruned
    pub fn edge(self, parent: &str, child: &str, tree: &DiffTree) -> Self {
        std::fs::write(self.diff_file(parent, child), self.format.render_diff(tree)).unwrap();
        self
    }

    /// Write an arbitrary file
    pub fn raw(self, name: &str, content: &str) -> Self {
        std::fs::write(self.path().join(name), content).unwrap();
        self
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).unwrap()
    }
}
