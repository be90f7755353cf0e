//! Version graph
//!
//! A DAG of versions backed by `petgraph`, edges running parent → child.
//! The single root owns a complete [`MappingTree`]; every other version owns
//! one [`DiffTree`] per parent edge. Trees are loaded from the store on first
//! access and kept for the life of the graph; nothing is written until
//! [`VersionGraph::write_dirty`].

use crate::config::HistoryConfig;
use crate::error::GraphError;
use crate::history::VersionVisitor;
use crate::store::Store;
use maphist_format::MappingFormat;
use maphist_tree::{apply_one, Attribute, Diagnostics, DiffTree, MappingTree, NodePath};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction::{Incoming, Outgoing};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;

/// One version of the history
#[derive(Debug)]
pub struct Version {
    label: String,
    depth: usize,
    parents: Vec<String>,
    mappings: OnceCell<MappingTree>,
    // aligned with `parents`
    diffs: Vec<OnceCell<DiffTree>>,
    dirty: bool,
}

impl Version {
    fn new(label: String) -> Self {
        Self {
            label,
            depth: 0,
            parents: Vec::new(),
            mappings: OnceCell::new(),
            diffs: Vec::new(),
            dirty: false,
        }
    }

    /// Label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Longest distance from the root
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Parent labels; the first one is the primary line of descent
    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Primary parent
    #[inline]
    #[must_use]
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// Whether this version owns mappings rather than diffs
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Whether this version was modified since it was loaded or written
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn parent_slot(&self, parent: &str) -> Option<usize> {
        self.parents.iter().position(|p| p == parent)
    }
}

/// Directed acyclic graph of versions with exactly one root
#[derive(Debug)]
pub struct VersionGraph {
    graph: DiGraph<Version, ()>,
    index: HashMap<String, NodeIndex>,
    root: NodeIndex,
    store: Option<Store>,
}

impl VersionGraph {
    /// Load the history in `dir` stored in `format`
    ///
    /// # Errors
    /// See [`VersionGraph::from_store`].
    pub fn load(dir: &Path, format: Arc<dyn MappingFormat>) -> Result<Self, GraphError> {
        Self::from_store(Store::new(dir, format))
    }

    /// Load the history in `dir` as described by `config`
    ///
    /// # Errors
    /// Unknown format, or see [`VersionGraph::from_store`].
    pub fn open(dir: &Path, config: &HistoryConfig) -> Result<Self, GraphError> {
        Self::from_store(Store::from_config(dir, config)?)
    }

    /// Build the graph from a store's directory listing; trees stay unread
    ///
    /// # Errors
    /// Unreadable directory, cycles, unresolved parents, zero or several
    /// roots.
    pub fn from_store(store: Store) -> Result<Self, GraphError> {
        let layout = store.scan()?;
        let mappings = layout.mappings.into_iter().map(|v| (v, None)).collect();
        let edges = layout.edges.into_iter().map(|(p, c)| (p, c, None)).collect();
        let graph = Self::build(mappings, edges, Some(store))?;
        tracing::info!(
            versions = graph.len(),
            root = %graph.root().label(),
            "loaded version graph"
        );
        Ok(graph)
    }

    /// Build an in-memory graph from roots and `(parent, child, diff)` edges
    ///
    /// # Errors
    /// Cycles, unresolved parents, zero or several roots.
    pub fn from_parts<R, E>(roots: R, edges: E) -> Result<Self, GraphError>
    where
        R: IntoIterator<Item = (String, MappingTree)>,
        E: IntoIterator<Item = (String, String, DiffTree)>,
    {
        let mappings = roots.into_iter().map(|(v, t)| (v, Some(t))).collect();
        let edges = edges
            .into_iter()
            .map(|(p, c, mut d)| {
                d.validate();
                (p, c, Some(d))
            })
            .collect();
        Self::build(mappings, edges, None)
    }

    fn build(
        mappings: Vec<(String, Option<MappingTree>)>,
        edges: Vec<(String, String, Option<DiffTree>)>,
        store: Option<Store>,
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        let labels = mappings
            .iter()
            .map(|(v, _)| v)
            .chain(edges.iter().map(|(_, c, _)| c));
        for label in labels {
            if !index.contains_key(label) {
                let ix = graph.add_node(Version::new(label.clone()));
                index.insert(label.clone(), ix);
            }
        }

        for (parent, child, diff) in edges {
            let p = *index.get(&parent).ok_or_else(|| GraphError::UnresolvedParent {
                child: child.clone(),
                parent: parent.clone(),
            })?;
            let c = index[&child];
            let version = &mut graph[c];
            if version.parent_slot(&parent).is_some() {
                tracing::warn!(%parent, %child, "duplicate parent edge ignored");
                continue;
            }
            version.parents.push(parent);
            version.diffs.push(diff.map(OnceCell::from).unwrap_or_default());
            graph.add_edge(p, c, ());
        }

        for (label, tree) in mappings {
            let version = &mut graph[index[&label]];
            if !version.is_root() {
                tracing::warn!(version = %label, "ignoring mappings of a version with parents");
            } else if let Some(tree) = tree {
                version.mappings = OnceCell::from(tree);
            }
        }

        if let Some(path) = find_cycle(&graph) {
            return Err(GraphError::Cycle { path });
        }

        let mut roots: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&ix| graph[ix].is_root())
            .collect();
        let root = match roots.len() {
            0 => return Err(GraphError::NoRoot),
            1 => roots[0],
            _ => {
                roots.sort_by(|a, b| graph[*a].label.cmp(&graph[*b].label));
                return Err(GraphError::MultipleRoots {
                    roots: roots.iter().map(|&ix| graph[ix].label.clone()).collect(),
                });
            }
        };

        let order = toposort(&graph, None).map_err(|cycle| GraphError::Cycle {
            path: vec![graph[cycle.node_id()].label.clone()],
        })?;
        for ix in order {
            let depth = graph[ix].depth + 1;
            let children: Vec<NodeIndex> = graph.neighbors_directed(ix, Outgoing).collect();
            for child in children {
                let version = &mut graph[child];
                version.depth = version.depth.max(depth);
            }
        }

        Ok(Self {
            graph,
            index,
            root,
            store,
        })
    }

    fn ix(&self, label: &str) -> Result<NodeIndex, GraphError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| GraphError::UnknownVersion(label.to_string()))
    }

    /// Version by label
    #[must_use]
    pub fn version(&self, label: &str) -> Option<&Version> {
        self.index.get(label).map(|&ix| &self.graph[ix])
    }

    /// The root version
    #[must_use]
    pub fn root(&self) -> &Version {
        &self.graph[self.root]
    }

    /// Number of versions
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// A graph always holds its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Greatest depth of any version
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.graph.node_weights().map(Version::depth).max().unwrap_or(0)
    }

    /// Versions root-first: ascending depth, then label
    #[must_use]
    pub fn versions(&self) -> Vec<&Version> {
        let mut versions: Vec<&Version> = self.graph.node_weights().collect();
        versions.sort_by(|a, b| (a.depth, &a.label).cmp(&(b.depth, &b.label)));
        versions
    }

    /// Child labels of a version, sorted
    ///
    /// # Errors
    /// Unknown version.
    pub fn children(&self, label: &str) -> Result<Vec<&str>, GraphError> {
        let ix = self.ix(label)?;
        let mut children: Vec<&str> = self
            .graph
            .neighbors_directed(ix, Outgoing)
            .map(|c| self.graph[c].label.as_str())
            .collect();
        children.sort_unstable();
        Ok(children)
    }

    /// Whether `ancestor` lies on some parent path above `label`
    ///
    /// # Errors
    /// Unknown version.
    pub fn is_ancestor(&self, ancestor: &str, label: &str) -> Result<bool, GraphError> {
        let target = self.ix(ancestor)?;
        let mut stack = vec![self.ix(label)?];
        let mut seen = vec![false; self.graph.node_count()];
        while let Some(ix) = stack.pop() {
            for parent in self.graph.neighbors_directed(ix, Incoming) {
                if parent == target {
                    return Ok(true);
                }
                if !seen[parent.index()] {
                    seen[parent.index()] = true;
                    stack.push(parent);
                }
            }
        }
        Ok(false)
    }

    /// Mappings of the root version `label`, loading them if needed
    ///
    /// # Errors
    /// Unknown or non-root version, or the file cannot be read.
    pub fn mappings(&self, label: &str) -> Result<&MappingTree, GraphError> {
        let version = &self.graph[self.ix(label)?];
        if !version.is_root() {
            return Err(GraphError::NotRoot(label.to_string()));
        }
        if let Some(tree) = version.mappings.get() {
            return Ok(tree);
        }
        let tree = self.store.as_ref().ok_or(GraphError::NoStore)?.read_mappings(label)?;
        Ok(version.mappings.get_or_init(|| tree))
    }

    /// Mutable mappings of the root version `label`
    ///
    /// # Errors
    /// See [`VersionGraph::mappings`].
    pub fn mappings_mut(&mut self, label: &str) -> Result<&mut MappingTree, GraphError> {
        self.mappings(label)?;
        let ix = self.ix(label)?;
        self.graph[ix]
            .mappings
            .get_mut()
            .ok_or_else(|| GraphError::NotRoot(label.to_string()))
    }

    /// Diff of `child` against `parent`, loading it if needed
    ///
    /// # Errors
    /// Unknown version, no such edge, or the file cannot be read.
    pub fn diff(&self, child: &str, parent: &str) -> Result<&DiffTree, GraphError> {
        let version = &self.graph[self.ix(child)?];
        let slot = version.parent_slot(parent).ok_or_else(|| GraphError::NoEdge {
            child: child.to_string(),
            parent: parent.to_string(),
        })?;
        let cell = &version.diffs[slot];
        if let Some(tree) = cell.get() {
            return Ok(tree);
        }
        let tree = self
            .store
            .as_ref()
            .ok_or(GraphError::NoStore)?
            .read_diff(parent, child)?;
        Ok(cell.get_or_init(|| tree))
    }

    /// Mutable diff of `child` against `parent`
    ///
    /// # Errors
    /// See [`VersionGraph::diff`].
    pub fn diff_mut(&mut self, child: &str, parent: &str) -> Result<&mut DiffTree, GraphError> {
        self.diff(child, parent)?;
        let ix = self.ix(child)?;
        let version = &mut self.graph[ix];
        let no_edge = || GraphError::NoEdge {
            child: child.to_string(),
            parent: parent.to_string(),
        };
        let slot = version.parent_slot(parent).ok_or_else(no_edge)?;
        version.diffs[slot].get_mut().ok_or_else(no_edge)
    }

    /// Flag a version for persistence
    ///
    /// # Errors
    /// Unknown version.
    pub fn mark_dirty(&mut self, label: &str) -> Result<(), GraphError> {
        let ix = self.ix(label)?;
        let version = &mut self.graph[ix];
        if !version.dirty {
            tracing::debug!(version = %label, "marked dirty");
            version.dirty = true;
        }
        Ok(())
    }

    /// Labels of dirty versions, root-first
    #[must_use]
    pub fn dirty(&self) -> Vec<String> {
        self.versions()
            .into_iter()
            .filter(|v| v.dirty)
            .map(|v| v.label.clone())
            .collect()
    }

    /// Persist every dirty version and clear the flags
    ///
    /// The root writes its mappings file; any other version writes the diff
    /// of each loaded parent edge, pruned of no-op nodes. Returns the labels
    /// written.
    ///
    /// # Errors
    /// No store, or a file cannot be written.
    pub fn write_dirty(&mut self) -> Result<Vec<String>, GraphError> {
        let store = self.store.as_ref().ok_or(GraphError::NoStore)?;
        let written = self.dirty();
        for label in &written {
            let version = &self.graph[self.index[label]];
            if version.is_root() {
                if let Some(tree) = version.mappings.get() {
                    store.write_mappings(label, tree)?;
                }
            } else {
                for (parent, cell) in version.parents.iter().zip(&version.diffs) {
                    if let Some(tree) = cell.get() {
                        store.write_diff(parent, label, tree)?;
                    }
                }
            }
        }
        for label in &written {
            let ix = self.index[label];
            self.graph[ix].dirty = false;
        }
        tracing::info!(versions = written.len(), "persisted dirty versions");
        Ok(written)
    }

    /// Effective value of one attribute of `path` at a version
    ///
    /// Follows primary parents until an edge holds a real change or the root
    /// is reached. Unmapped and absent both read as empty.
    ///
    /// # Errors
    /// Unknown version or a tree cannot be loaded.
    pub fn value_at(
        &self,
        label: &str,
        path: &NodePath,
        attribute: Attribute,
    ) -> Result<String, GraphError> {
        let mut current = self.ix(label)?;
        loop {
            let version = &self.graph[current];
            let Some(parent) = version.first_parent() else {
                let tree = self.mappings(&version.label)?;
                return Ok(tree
                    .get(path)
                    .map(|n| n.value().get(attribute).to_string())
                    .unwrap_or_default());
            };
            let diff = self.diff(&version.label, parent)?;
            if let Some(node) = diff.get(path) {
                let entry = node.value().attribute(attribute);
                if entry.is_diff() {
                    return Ok(entry.b.clone());
                }
            }
            current = self.ix(parent)?;
        }
    }

    /// Complete mappings of any version
    ///
    /// Applies the diffs along the primary line of descent to a copy of the
    /// root's mappings. Edits that do not apply are returned as diagnostics.
    ///
    /// # Errors
    /// Unknown version or a tree cannot be loaded.
    pub fn resolve_mappings(&self, label: &str) -> Result<(MappingTree, Diagnostics), GraphError> {
        let mut chain = Vec::new();
        let mut current = self.ix(label)?;
        while let Some(parent) = self.graph[current].first_parent() {
            chain.push(current);
            current = self.ix(parent)?;
        }

        let mut tree = self.mappings(&self.graph[current].label)?.copy();
        let mut diagnostics = Diagnostics::new();
        for ix in chain.into_iter().rev() {
            let version = &self.graph[ix];
            let parent = &version.parents[0];
            let diff = self.diff(&version.label, parent)?;
            diagnostics.extend(apply_one(&mut tree, diff).at_version(&version.label));
        }
        Ok((tree, diagnostics))
    }

    /// Visit every version root-first until the visitor breaks
    ///
    /// # Errors
    /// Whatever the visitor returns.
    pub fn walk<V: VersionVisitor + ?Sized>(&self, visitor: &mut V) -> Result<(), GraphError> {
        for version in self.versions() {
            if let ControlFlow::Break(()) = visitor.visit(self, version)? {
                break;
            }
        }
        Ok(())
    }
}

/// First cycle found by an iterative depth-first search, as a label path
/// that starts and ends on the same version
fn find_cycle(graph: &DiGraph<Version, ()>) -> Option<Vec<String>> {
    const NEW: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let sorted_children = |ix: NodeIndex| {
        let mut children: Vec<NodeIndex> = graph.neighbors_directed(ix, Outgoing).collect();
        // popped from the back: visited in ascending label order
        children.sort_by(|a, b| graph[*b].label.cmp(&graph[*a].label));
        children
    };

    let mut starts: Vec<NodeIndex> = graph.node_indices().collect();
    starts.sort_by(|a, b| graph[*a].label.cmp(&graph[*b].label));

    let mut state = vec![NEW; graph.node_count()];
    for start in starts {
        if state[start.index()] != NEW {
            continue;
        }
        state[start.index()] = ON_PATH;
        let mut stack = vec![(start, sorted_children(start))];
        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let node = frame.0;
            match frame.1.pop() {
                None => {
                    state[node.index()] = DONE;
                    stack.pop();
                }
                Some(next) => match state[next.index()] {
                    NEW => {
                        state[next.index()] = ON_PATH;
                        stack.push((next, sorted_children(next)));
                    }
                    ON_PATH => {
                        let from = stack.iter().position(|(ix, _)| *ix == next).unwrap_or(0);
                        let mut path: Vec<String> =
                            stack[from..].iter().map(|(ix, _)| graph[*ix].label.clone()).collect();
                        path.push(graph[next].label.clone());
                        return Some(path);
                    }
                    _ => {}
                },
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use maphist_tree::{DiffEntry, Mapping, NodeKey};
    use pretty_assertions::assert_eq;

    fn root_tree() -> MappingTree {
        let mut tree = MappingTree::new();
        let class = tree.add_class("a/A", Mapping::named("com/Foo"));
        class.add_field("b", "I", Mapping::named("size")).unwrap();
        tree
    }

    fn rename(from: &str, to: &str) -> DiffTree {
        let mut diff = DiffTree::new();
        diff.add_class("a/A", DiffEntry::dst(from, to));
        diff
    }

    fn chain() -> VersionGraph {
        VersionGraph::from_parts(
            [("1.0".to_string(), root_tree())],
            [
                ("1.0".to_string(), "1.1".to_string(), DiffTree::new()),
                ("1.1".to_string(), "1.2".to_string(), rename("com/Foo", "com/Bar")),
                ("1.2".to_string(), "1.3".to_string(), DiffTree::new()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn depth_and_order() {
        let graph = chain();
        assert_eq!(graph.root().label(), "1.0");
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.version("1.3").unwrap().depth(), 3);
        let labels: Vec<&str> = graph.versions().iter().map(|v| v.label()).collect();
        assert_eq!(labels, vec!["1.0", "1.1", "1.2", "1.3"]);
        assert_eq!(graph.children("1.1").unwrap(), vec!["1.2"]);
        assert!(graph.is_ancestor("1.0", "1.3").unwrap());
        assert!(!graph.is_ancestor("1.3", "1.0").unwrap());
    }

    #[test]
    fn depth_is_longest_path() {
        // 1.0 -> 1.1 -> 1.2 and 1.0 -> 1.2
        let graph = VersionGraph::from_parts(
            [("1.0".to_string(), root_tree())],
            [
                ("1.0".to_string(), "1.1".to_string(), DiffTree::new()),
                ("1.0".to_string(), "1.2".to_string(), DiffTree::new()),
                ("1.1".to_string(), "1.2".to_string(), DiffTree::new()),
            ],
        )
        .unwrap();
        assert_eq!(graph.version("1.2").unwrap().depth(), 2);
        assert_eq!(graph.max_depth(), 2);
    }

    #[test]
    fn value_follows_first_parent_until_real_change() {
        let graph = chain();
        let class = NodePath::class("a/A");
        let field = class.child(NodeKey::field("b", "I"));
        assert_eq!(graph.value_at("1.1", &class, Attribute::Destination).unwrap(), "com/Foo");
        assert_eq!(graph.value_at("1.3", &class, Attribute::Destination).unwrap(), "com/Bar");
        assert_eq!(graph.value_at("1.3", &field, Attribute::Destination).unwrap(), "size");
        assert_eq!(graph.value_at("1.3", &class, Attribute::Documentation).unwrap(), "");
    }

    #[test]
    fn placeholder_entries_inherit() {
        let graph = VersionGraph::from_parts(
            [("1.0".to_string(), root_tree())],
            [("1.0".to_string(), "1.1".to_string(), rename("stale", "stale"))],
        )
        .unwrap();
        let class = NodePath::class("a/A");
        assert_eq!(graph.value_at("1.1", &class, Attribute::Destination).unwrap(), "com/Foo");
    }

    #[test]
    fn resolve_applies_primary_line() {
        let graph = chain();
        let (tree, diagnostics) = graph.resolve_mappings("1.3").unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(tree.class("a/A").unwrap().dst(), "com/Bar");
        assert_eq!(tree.class("a/A").unwrap().field("b", "I").unwrap().dst(), "size");
        // root untouched
        assert_eq!(graph.mappings("1.0").unwrap().class("a/A").unwrap().dst(), "com/Foo");
    }

    #[test]
    fn resolve_reports_stale_diffs_with_version() {
        let graph = VersionGraph::from_parts(
            [("1.0".to_string(), root_tree())],
            [("1.0".to_string(), "1.1".to_string(), rename("com/Other", "com/Bar"))],
        )
        .unwrap();
        let (tree, diagnostics) = graph.resolve_mappings("1.1").unwrap();
        assert_eq!(tree.class("a/A").unwrap().dst(), "com/Foo");
        let d = diagnostics.iter().next().unwrap();
        assert_eq!(d.version.as_deref(), Some("1.1"));
    }

    #[test]
    fn cycle_is_reported_with_members() {
        let err = VersionGraph::from_parts(
            [("1.0".to_string(), root_tree())],
            [
                ("1.0".to_string(), "a".to_string(), DiffTree::new()),
                ("a".to_string(), "b".to_string(), DiffTree::new()),
                ("b".to_string(), "c".to_string(), DiffTree::new()),
                ("c".to_string(), "a".to_string(), DiffTree::new()),
            ],
        )
        .unwrap_err();
        match err {
            GraphError::Cycle { path } => assert_eq!(path, vec!["a", "b", "c", "a"]),
            other => panic!("expected cycle, got {other}"),
        }
    }

    #[test]
    fn root_count_checked() {
        let err = VersionGraph::from_parts(
            [("1.0".to_string(), root_tree()), ("2.0".to_string(), root_tree())],
            std::iter::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::MultipleRoots { ref roots } if roots == &["1.0", "2.0"]));

        let err = VersionGraph::from_parts(std::iter::empty(), std::iter::empty()).unwrap_err();
        assert!(matches!(err, GraphError::NoRoot));
    }

    #[test]
    fn unknown_parent_is_fatal() {
        let err = VersionGraph::from_parts(
            [("1.0".to_string(), root_tree())],
            [("0.9".to_string(), "1.1".to_string(), DiffTree::new())],
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::UnresolvedParent { ref parent, .. } if parent == "0.9"));
    }

    #[test]
    fn accessors_reject_wrong_versions() {
        let mut graph = chain();
        assert!(matches!(graph.mappings("1.1"), Err(GraphError::NotRoot(_))));
        assert!(matches!(graph.diff("1.2", "1.0"), Err(GraphError::NoEdge { .. })));
        assert!(matches!(graph.mark_dirty("9.9"), Err(GraphError::UnknownVersion(_))));
        assert!(matches!(graph.write_dirty(), Err(GraphError::NoStore)));
    }

    #[test]
    fn dirty_tracking() {
        let mut graph = chain();
        assert!(graph.dirty().is_empty());
        graph.mark_dirty("1.2").unwrap();
        graph.mark_dirty("1.0").unwrap();
        assert_eq!(graph.dirty(), vec!["1.0".to_string(), "1.2".to_string()]);
        assert!(graph.version("1.2").unwrap().is_dirty());
    }

    struct Labels(Vec<String>, usize);

    impl VersionVisitor for Labels {
        fn visit(&mut self, _: &VersionGraph, version: &Version) -> Result<ControlFlow<()>, GraphError> {
            self.0.push(version.label().to_string());
            if self.0.len() == self.1 {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        }
    }

    #[test]
    fn walk_stops_on_break() {
        let graph = chain();
        let mut visitor = Labels(Vec::new(), 2);
        graph.walk(&mut visitor).unwrap();
        assert_eq!(visitor.0, vec!["1.0", "1.1"]);
    }
}
