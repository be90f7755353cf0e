//! Whole-graph traversal and name history lookup

use crate::error::GraphError;
use crate::graph::{Version, VersionGraph};
use maphist_tree::{Attribute, NodePath};
use serde::Serialize;
use std::ops::ControlFlow;

/// Callback for [`VersionGraph::walk`]
pub trait VersionVisitor {
    /// Visit one version; `Break` ends the walk
    ///
    /// # Errors
    /// Any error aborts the walk and is returned from it.
    fn visit(&mut self, graph: &VersionGraph, version: &Version) -> Result<ControlFlow<()>, GraphError>;
}

/// Name of one node at one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Version label
    pub version: String,
    /// Version depth
    pub depth: usize,
    /// Effective destination, empty when unmapped
    pub name: String,
    /// Whether this version sets the name itself rather than inheriting it
    pub changed: bool,
}

/// Collects the destination of one node path at every version
#[derive(Debug, Clone)]
pub struct NameHistory {
    path: NodePath,
    entries: Vec<HistoryEntry>,
}

impl NameHistory {
    /// History of `path`
    #[must_use]
    pub fn new(path: NodePath) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    /// Run over `graph`
    ///
    /// # Errors
    /// A tree cannot be loaded.
    pub fn collect(path: NodePath, graph: &VersionGraph) -> Result<Vec<HistoryEntry>, GraphError> {
        let mut history = Self::new(path);
        graph.walk(&mut history)?;
        Ok(history.entries)
    }

    /// Path being tracked
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Entries gathered so far, root-first
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Only the versions where the name changed
    pub fn changes(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(|e| e.changed)
    }
}

impl VersionVisitor for NameHistory {
    fn visit(&mut self, graph: &VersionGraph, version: &Version) -> Result<ControlFlow<()>, GraphError> {
        let label = version.label();
        let name = graph.value_at(label, &self.path, Attribute::Destination)?;
        let changed = if version.is_root() {
            !name.is_empty()
        } else {
            let mut changed = false;
            for parent in version.parents() {
                let diff = graph.diff(label, parent)?;
                changed |= diff
                    .get(&self.path)
                    .is_some_and(|n| n.value().dst.is_diff());
            }
            changed
        };
        self.entries.push(HistoryEntry {
            version: label.to_string(),
            depth: version.depth(),
            name,
            changed,
        });
        Ok(ControlFlow::Continue(()))
    }
}
