//! Structured diagnostics for recoverable anomalies
//!
//! Edits that cannot be applied are skipped, never fatal. Each skip is
//! recorded as a [`Diagnostic`] and returned with the result so callers and
//! tests can inspect it; it is also logged through `tracing`.

use crate::path::NodePath;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Mutable attribute of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Attribute {
    /// Destination name
    Destination,
    /// Documentation
    Documentation,
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Destination => "destination",
            Self::Documentation => "documentation",
        })
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Current value differs from the edit's "before" value
    StaleBefore,
    /// Add targeted an already populated node
    TargetPresent,
    /// Remove or change targeted a missing node
    TargetMissing,
    /// Two records with the same key; the later one won
    DuplicateKey,
    /// Current value already equals the edit's "after" value
    AlreadyApplied,
    /// A barrier version could not take the edit on its own edge
    BarrierMismatch,
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StaleBefore => "stale before-value",
            Self::TargetPresent => "target already present",
            Self::TargetMissing => "target missing",
            Self::DuplicateKey => "duplicate key",
            Self::AlreadyApplied => "already applied",
            Self::BarrierMismatch => "barrier mismatch",
        })
    }
}

/// One skipped edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Version label, when raised inside a version graph
    pub version: Option<String>,
    /// Affected node
    pub path: NodePath,
    /// Affected attribute
    pub attribute: Option<Attribute>,
    /// Value the edit expected
    pub expected: String,
    /// Value actually found
    pub actual: String,
}

impl Diagnostic {
    /// Create diagnostic for a node
    #[inline]
    #[must_use]
    pub fn new(kind: DiagnosticKind, path: NodePath) -> Self {
        Self {
            kind,
            version: None,
            path,
            attribute: None,
            expected: String::new(),
            actual: String::new(),
        }
    }

    /// With attribute
    #[inline]
    #[must_use]
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = Some(attribute);
        self
    }

    /// With expected and actual values
    #[inline]
    #[must_use]
    pub fn values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = expected.into();
        self.actual = actual.into();
        self
    }

    /// With version label
    #[inline]
    #[must_use]
    pub fn at_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(version) = &self.version {
            write!(f, "[{version}] ")?;
        }
        write!(f, "{}: {}", self.path, self.kind)?;
        if let Some(attribute) = self.attribute {
            write!(f, " ({attribute})")?;
        }
        if !self.expected.is_empty() || !self.actual.is_empty() {
            write!(f, ": expected {:?}, found {:?}", self.expected, self.actual)?;
        }
        Ok(())
    }
}

/// Ordered list of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record and log a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::AlreadyApplied => tracing::debug!("{diagnostic}"),
            _ => tracing::warn!("{diagnostic}"),
        }
        self.0.push(diagnostic);
    }

    /// Append every diagnostic of `other`
    #[inline]
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Attribute every diagnostic to `version`
    #[must_use]
    pub fn at_version(mut self, version: &str) -> Self {
        for diagnostic in &mut self.0 {
            diagnostic.version = Some(version.to_string());
        }
        self
    }

    /// Diagnostics in order of occurrence
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Diagnostics of one kind
    #[inline]
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |d| d.kind == kind)
    }

    /// Number of diagnostics
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
