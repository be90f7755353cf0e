//! Propagation engine
//!
//! Replicates one localized edit, expressed as a seed [`DiffTree`] anchored
//! at a version, to every version of the graph that must change with it.
//!
//! # Algorithm
//!
//! Each seed node contributes up to two independent [`Edit`]s (destination,
//! then documentation). For each edit:
//!
//! 1. **Climb.** Starting at the seed, versions are taken from a queue in
//!    ascending depth. The root is edited directly under a match-before-write
//!    guard. Any other version inspects its own edge to each parent: a real
//!    entry whose after-side equals `before` is the authority and takes the
//!    edit; an edge without a real entry defers to the parent, which is
//!    queued. Every version that takes the edit queues its children.
//! 2. **Fan out.** Queued children are taken in ascending depth. On an edge
//!    from a changed parent, a real entry keeps the child's own value and
//!    gets its before-side rewritten; a placeholder or a missing entry means
//!    the child inherits the new value, so its other edges are aligned and
//!    its own children are queued.
//!
//! `Direction` places barriers: without `Up` the seed takes the edit on its
//! own edges, inserting entries if needed, and never climbs; without `Down`
//! the fan-out never enters the seed's children.
//!
//! In lenient mode a successful field or method rename is offered to the
//! overloads of the node (same source name, other descriptor) that still
//! carry the old name. One such overload becomes a seed of the next wave;
//! several are a fatal ambiguity, and so is any unset overload when the
//! seed itself was unset.

use crate::config::PropagationOptions;
use crate::error::{GraphError, PropagationError};
use crate::graph::VersionGraph;
use maphist_tree::{
    Attribute, Diagnostic, DiagnosticKind, Diagnostics, Diff, DiffTree, NodeKind, NodePath,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// One attribute change of one node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edit {
    /// Node
    pub path: NodePath,
    /// Attribute
    pub attribute: Attribute,
    /// Expected current value
    pub before: String,
    /// New value
    pub after: String,
}

impl Edit {
    /// Edits expressed by a seed diff, destination before documentation
    #[must_use]
    pub fn from_seed(seed: &DiffTree) -> Vec<Self> {
        let mut seed = seed.clone();
        seed.validate();
        let mut edits = Vec::new();
        seed.walk(|path, node| {
            let entry = node.value();
            for attribute in [Attribute::Destination, Attribute::Documentation] {
                let diff = entry.attribute(attribute);
                if diff.is_diff() {
                    edits.push(Self {
                        path: path.clone(),
                        attribute,
                        before: diff.a.clone(),
                        after: diff.b.clone(),
                    });
                }
            }
        });
        edits
    }

    fn diagnostic(&self, kind: DiagnosticKind, version: &str, actual: &str) -> Diagnostic {
        Diagnostic::new(kind, self.path.clone())
            .attribute(self.attribute)
            .values(self.before.as_str(), actual)
            .at_version(version)
    }
}

/// Outcome of a propagation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropagationReport {
    /// Number of values written
    pub applied: usize,
    /// Number of waves run
    pub waves: usize,
    /// Dirty versions at the end of the run, root-first
    pub dirty: Vec<String>,
    /// Edits or parts of edits that were skipped
    pub diagnostics: Diagnostics,
}

/// Propagate `seed`, anchored at `version`, through `graph`
///
/// Trees are modified in memory and versions marked dirty; persisting is
/// left to [`VersionGraph::write_dirty`].
///
/// # Errors
/// Unknown seed version, unreadable trees, or an ambiguous overload in
/// lenient mode. The graph may be partially modified and must not be
/// written after an error.
pub fn propagate(
    graph: &mut VersionGraph,
    version: &str,
    seed: &DiffTree,
    options: PropagationOptions,
) -> Result<PropagationReport, PropagationError> {
    if graph.version(version).is_none() {
        return Err(GraphError::UnknownVersion(version.to_string()).into());
    }

    let mut engine = Engine {
        graph,
        options,
        report: PropagationReport::default(),
    };
    let mut wave: Vec<(String, Edit)> = Edit::from_seed(seed)
        .into_iter()
        .map(|edit| (version.to_string(), edit))
        .collect();
    let mut seeded = HashSet::new();

    while !wave.is_empty() {
        engine.report.waves += 1;
        tracing::debug!(wave = engine.report.waves, edits = wave.len(), "starting wave");
        let mut next = Vec::new();
        for (at, edit) in wave {
            if !seeded.insert((at.clone(), edit.path.clone(), edit.attribute)) {
                tracing::debug!(version = %at, path = %edit.path, "already seeded this run");
                continue;
            }
            next.extend(engine.run(&at, &edit)?);
        }
        wave = next;
    }

    let mut report = engine.report;
    report.dirty = engine.graph.dirty();
    tracing::info!(
        seed = %version,
        applied = report.applied,
        waves = report.waves,
        dirty = report.dirty.len(),
        skipped = report.diagnostics.len(),
        "propagation finished"
    );
    Ok(report)
}

struct Engine<'g> {
    graph: &'g mut VersionGraph,
    options: PropagationOptions,
    report: PropagationReport,
}

/// Traversal state of one edit
struct Pass<'a> {
    seed: &'a str,
    up: BTreeSet<(usize, String)>,
    up_seen: HashSet<String>,
    down: BTreeSet<(usize, String)>,
    down_seen: HashSet<String>,
    // versions whose effective value is now `after`
    changed: HashSet<String>,
    // versions where the climb found its authority
    authorities: Vec<String>,
}

impl Engine<'_> {
    /// Run one edit seeded at `seed`; returns seeds for the next wave
    fn run(&mut self, seed: &str, edit: &Edit) -> Result<Vec<(String, Edit)>, PropagationError> {
        let current = self.graph.value_at(seed, &edit.path, edit.attribute)?;
        if current == edit.after {
            self.report
                .diagnostics
                .push(edit.diagnostic(DiagnosticKind::AlreadyApplied, seed, &current));
            return Ok(Vec::new());
        }

        let mut pass = Pass {
            seed,
            up: BTreeSet::new(),
            up_seen: HashSet::new(),
            down: BTreeSet::new(),
            down_seen: HashSet::new(),
            changed: HashSet::new(),
            authorities: Vec::new(),
        };
        self.queue_up(&mut pass, seed)?;
        while let Some((_, label)) = pass.up.pop_first() {
            self.climb(&mut pass, &label, edit)?;
        }
        while let Some((_, label)) = pass.down.pop_first() {
            self.descend(&mut pass, &label, edit)?;
        }

        let overloadable = matches!(edit.path.kind(), Some(NodeKind::Field | NodeKind::Method));
        if !(self.options.lenient && edit.attribute == Attribute::Destination && overloadable) {
            return Ok(Vec::new());
        }
        let mut next = Vec::new();
        for at in &pass.authorities {
            if let Some(sibling) = self.consistent_overload(at, edit)? {
                tracing::debug!(version = %at, path = %sibling.path, "queued overload for next wave");
                next.push((at.clone(), sibling));
            }
        }
        Ok(next)
    }

    fn queue_up(&self, pass: &mut Pass<'_>, label: &str) -> Result<(), GraphError> {
        if pass.up_seen.insert(label.to_string()) {
            let depth = self.depth(label)?;
            pass.up.insert((depth, label.to_string()));
        }
        Ok(())
    }

    fn queue_children(&self, pass: &mut Pass<'_>, label: &str) -> Result<(), GraphError> {
        if label == pass.seed && !self.options.direction.down() {
            return Ok(());
        }
        for child in self.graph.children(label)? {
            if pass.down_seen.insert(child.to_string()) {
                pass.down.insert((self.depth(child)?, child.to_string()));
            }
        }
        Ok(())
    }

    fn depth(&self, label: &str) -> Result<usize, GraphError> {
        self.graph
            .version(label)
            .map(|v| v.depth())
            .ok_or_else(|| GraphError::UnknownVersion(label.to_string()))
    }

    fn parents(&self, label: &str) -> Result<Vec<String>, GraphError> {
        self.graph
            .version(label)
            .map(|v| v.parents().to_vec())
            .ok_or_else(|| GraphError::UnknownVersion(label.to_string()))
    }

    /// Entry of `edit` on the edge `child` → `parent`, if the diff has a node
    fn entry(&self, child: &str, parent: &str, edit: &Edit) -> Result<Option<Diff>, GraphError> {
        Ok(self
            .graph
            .diff(child, parent)?
            .get(&edit.path)
            .map(|n| n.value().attribute(edit.attribute).clone()))
    }

    fn write_entry(
        &mut self,
        child: &str,
        parent: &str,
        edit: &Edit,
        entry: Diff,
    ) -> Result<(), PropagationError> {
        tracing::debug!(version = %child, %parent, path = %edit.path, a = %entry.a, b = %entry.b, "rewrote edge");
        let node = self.graph.diff_mut(child, parent)?.ensure(&edit.path)?;
        *node.value_mut().attribute_mut(edit.attribute) = entry;
        self.graph.mark_dirty(child)?;
        self.report.applied += 1;
        Ok(())
    }

    /// Reset an equal-sided attribute in memory; it stays an inheriting
    /// placeholder and the version is not marked dirty
    fn clear_placeholder(&mut self, child: &str, parent: &str, edit: &Edit) -> Result<(), GraphError> {
        if let Some(node) = self.graph.diff_mut(child, parent)?.get_mut(&edit.path) {
            *node.value_mut().attribute_mut(edit.attribute) = Diff::default();
        }
        Ok(())
    }

    fn skip(&mut self, kind: DiagnosticKind, version: &str, edit: &Edit, actual: &str) {
        self.report
            .diagnostics
            .push(edit.diagnostic(kind, version, actual));
    }

    /// Mark `label` as carrying the new value and fan out from it
    fn took_edit(&self, pass: &mut Pass<'_>, label: &str) -> Result<(), GraphError> {
        pass.changed.insert(label.to_string());
        self.queue_children(pass, label)
    }

    fn climb(&mut self, pass: &mut Pass<'_>, label: &str, edit: &Edit) -> Result<(), PropagationError> {
        tracing::debug!(version = %label, path = %edit.path, "climb");
        let parents = self.parents(label)?;
        if parents.is_empty() {
            return self.edit_root(pass, label, edit);
        }

        let barrier = label == pass.seed && !self.options.direction.up();
        for parent in &parents {
            match self.entry(label, parent, edit)? {
                Some(entry) if entry.is_diff() => {
                    if entry.b == edit.before {
                        self.write_entry(label, parent, edit, Diff::new(entry.a, edit.after.as_str()))?;
                        pass.authorities.push(label.to_string());
                        self.took_edit(pass, label)?;
                    } else if entry.b == edit.after {
                        self.skip(DiagnosticKind::AlreadyApplied, label, edit, &entry.b);
                    } else {
                        self.skip(DiagnosticKind::StaleBefore, label, edit, &entry.b);
                    }
                }
                _ if barrier => {
                    let inherited = self.graph.value_at(parent, &edit.path, edit.attribute)?;
                    if inherited == edit.before {
                        let entry = Diff::new(edit.before.as_str(), edit.after.as_str());
                        self.write_entry(label, parent, edit, entry)?;
                        pass.authorities.push(label.to_string());
                        self.took_edit(pass, label)?;
                    } else if inherited == edit.after {
                        self.skip(DiagnosticKind::AlreadyApplied, label, edit, &inherited);
                    } else {
                        self.skip(DiagnosticKind::BarrierMismatch, label, edit, &inherited);
                    }
                }
                _ => self.queue_up(pass, parent)?,
            }
        }
        Ok(())
    }

    fn edit_root(&mut self, pass: &mut Pass<'_>, label: &str, edit: &Edit) -> Result<(), PropagationError> {
        let tree = self.graph.mappings_mut(label)?;
        let current = tree
            .get(&edit.path)
            .map(|n| n.value().get(edit.attribute).to_string())
            .unwrap_or_default();
        if current == edit.after {
            self.skip(DiagnosticKind::AlreadyApplied, label, edit, &current);
            return Ok(());
        }
        if current != edit.before {
            self.skip(DiagnosticKind::StaleBefore, label, edit, &current);
            return Ok(());
        }

        if edit.after.is_empty() {
            if let Some(node) = tree.get_mut(&edit.path) {
                node.value_mut().set(edit.attribute, "");
                if node.value().is_blank() && !node.has_children() {
                    tree.remove(&edit.path);
                }
            }
        } else {
            tree.ensure(&edit.path)?
                .value_mut()
                .set(edit.attribute, edit.after.as_str());
        }
        tracing::debug!(version = %label, path = %edit.path, after = %edit.after, "rewrote root");
        self.graph.mark_dirty(label)?;
        self.report.applied += 1;
        pass.authorities.push(label.to_string());
        self.took_edit(pass, label)?;
        Ok(())
    }

    fn descend(&mut self, pass: &mut Pass<'_>, label: &str, edit: &Edit) -> Result<(), PropagationError> {
        tracing::debug!(version = %label, path = %edit.path, "descend");
        let parents = self.parents(label)?;
        let mut inherits = pass.changed.contains(label);

        for parent in parents.iter().filter(|p| pass.changed.contains(*p)) {
            match self.entry(label, parent, edit)? {
                Some(entry) if entry.is_diff() => {
                    if entry.a == edit.before {
                        self.write_entry(label, parent, edit, Diff::new(edit.after.as_str(), entry.b))?;
                    } else if entry.a != edit.after {
                        self.skip(DiagnosticKind::StaleBefore, label, edit, &entry.a);
                    }
                }
                Some(entry) => {
                    if !entry.a.is_empty() {
                        self.clear_placeholder(label, parent, edit)?;
                    }
                    inherits = true;
                }
                None => inherits = true,
            }
        }

        if !inherits {
            return Ok(());
        }

        // align edges from parents that kept the old value
        for parent in parents.iter().filter(|p| !pass.changed.contains(*p)) {
            match self.entry(label, parent, edit)? {
                Some(entry) if entry.is_diff() => {
                    if entry.b != edit.after {
                        self.write_entry(label, parent, edit, Diff::new(entry.a, edit.after.as_str()))?;
                    }
                }
                _ => {
                    let inherited = self.graph.value_at(parent, &edit.path, edit.attribute)?;
                    if inherited != edit.after {
                        let entry = Diff::new(inherited, edit.after.as_str());
                        self.write_entry(label, parent, edit, entry)?;
                    }
                }
            }
        }
        self.took_edit(pass, label)?;
        Ok(())
    }

    /// The one overload of `edit.path` at `at` that still carries `before`
    ///
    /// Several such overloads, or any when `before` is empty, are ambiguous.
    fn consistent_overload(&self, at: &str, edit: &Edit) -> Result<Option<Edit>, PropagationError> {
        let (Some(key), Some(owner)) = (edit.path.last(), edit.path.parent()) else {
            return Ok(None);
        };

        let mut candidates = BTreeSet::new();
        let mut current = Some(at.to_string());
        while let Some(label) = current {
            let parents = self.parents(&label)?;
            if parents.is_empty() {
                if let Some(node) = self.graph.mappings(&label)?.get(&owner) {
                    candidates.extend(node.children().map(|c| c.key().clone()));
                }
            } else {
                for parent in &parents {
                    if let Some(node) = self.graph.diff(&label, parent)?.get(&owner) {
                        candidates.extend(node.children().map(|c| c.key().clone()));
                    }
                }
            }
            current = parents.into_iter().next();
        }

        let mut consistent = Vec::new();
        for candidate in candidates.into_iter().filter(|c| key.is_overload_of(c)) {
            let path = owner.child(candidate);
            if self.graph.value_at(at, &path, Attribute::Destination)? == edit.before {
                consistent.push(path);
            }
        }

        // unset overloads cannot be told apart from the seed itself
        let unset = edit.before.is_empty();
        match consistent.len() {
            0 => Ok(None),
            1 if !unset => Ok(consistent.pop().map(|path| Edit {
                path,
                ..edit.clone()
            })),
            _ => Err(PropagationError::AmbiguousSibling {
                version: at.to_string(),
                path: edit.path.clone(),
                candidates: consistent,
            }),
        }
    }
}
