//! On-disk layout of a history directory
//!
//! ```text
//! <dir>/<root><mappings ext>            complete mappings of the root
//! <dir>/<parent>#<child><diff ext>      diff of child against parent
//! ```
//!
//! Diff names that do not split into exactly two labels are ignored, as is
//! every file with neither suffix.

use crate::config::HistoryConfig;
use crate::error::GraphError;
use maphist_format::{FormatRegistry, MappingFormat};
use maphist_tree::{Diagnostics, DiffTree, MappingTree};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Separator between parent and child labels in diff file names
pub const EDGE_SEPARATOR: char = '#';

/// What a directory scan found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// Labels owning a mappings file, sorted
    pub mappings: Vec<String>,
    /// `(parent, child)` pairs owning a diff file, sorted
    pub edges: Vec<(String, String)>,
}

/// A history directory bound to one encoding
#[derive(Clone)]
pub struct Store {
    dir: PathBuf,
    format: Arc<dyn MappingFormat>,
    mappings_extension: String,
    diff_extension: String,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("dir", &self.dir)
            .field("format", &self.format.name())
            .field("mappings_extension", &self.mappings_extension)
            .field("diff_extension", &self.diff_extension)
            .finish()
    }
}

impl Store {
    /// Store using the format's own suffixes
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: Arc<dyn MappingFormat>) -> Self {
        Self {
            dir: dir.into(),
            mappings_extension: format.mappings_extension().to_string(),
            diff_extension: format.diff_extension().to_string(),
            format,
        }
    }

    /// Store described by a configuration
    ///
    /// # Errors
    /// The configured format is not registered.
    pub fn from_config(dir: impl Into<PathBuf>, config: &HistoryConfig) -> Result<Self, GraphError> {
        let format = FormatRegistry::with_defaults().by_name(&config.format)?;
        let mut store = Self::new(dir, format);
        if let Some(ext) = &config.mappings_extension {
            store.mappings_extension = ext.clone();
        }
        if let Some(ext) = &config.diff_extension {
            store.diff_extension = ext.clone();
        }
        Ok(store)
    }

    /// Directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encoding
    #[inline]
    #[must_use]
    pub fn format(&self) -> &dyn MappingFormat {
        &*self.format
    }

    /// Path of a root's mappings file
    #[must_use]
    pub fn mappings_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("{version}{}", self.mappings_extension))
    }

    /// Path of the diff file of `child` against `parent`
    #[must_use]
    pub fn diff_path(&self, parent: &str, child: &str) -> PathBuf {
        self.dir
            .join(format!("{parent}{EDGE_SEPARATOR}{child}{}", self.diff_extension))
    }

    /// List mappings and diff files
    ///
    /// # Errors
    /// The directory cannot be read.
    pub fn scan(&self) -> Result<Layout, GraphError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| GraphError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GraphError::io(&self.dir, e))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut layout = Layout::default();
        for name in names {
            if let Some(stem) = name.strip_suffix(self.diff_extension.as_str()) {
                match split_edge(stem) {
                    Some(edge) => layout.edges.push(edge),
                    None => tracing::warn!(file = %name, "ignoring diff file without exactly two labels"),
                }
            } else if let Some(stem) = name.strip_suffix(self.mappings_extension.as_str()) {
                if stem.is_empty() || stem.contains(EDGE_SEPARATOR) {
                    tracing::warn!(file = %name, "ignoring mappings file with invalid label");
                } else {
                    layout.mappings.push(stem.to_string());
                }
            }
        }
        tracing::debug!(
            dir = %self.dir.display(),
            mappings = layout.mappings.len(),
            diffs = layout.edges.len(),
            "scanned history directory"
        );
        Ok(layout)
    }

    /// Read a root's mappings
    ///
    /// # Errors
    /// IO or decoding failure.
    pub fn read_mappings(&self, version: &str) -> Result<MappingTree, GraphError> {
        Ok(self.format.read_mappings(&self.mappings_path(version))?)
    }

    /// Write a root's mappings
    ///
    /// # Errors
    /// IO failure.
    pub fn write_mappings(&self, version: &str, tree: &MappingTree) -> Result<(), GraphError> {
        Ok(self.format.write_mappings(&self.mappings_path(version), tree)?)
    }

    /// Read the diff of `child` against `parent`
    ///
    /// # Errors
    /// IO or decoding failure.
    pub fn read_diff(&self, parent: &str, child: &str) -> Result<DiffTree, GraphError> {
        Ok(self.format.read_diff(&self.diff_path(parent, child))?)
    }

    /// Decode a root's mappings file, returning what the decoder flagged
    ///
    /// # Errors
    /// IO or decoding failure.
    pub fn check_mappings(&self, version: &str) -> Result<Diagnostics, GraphError> {
        let (_, diagnostics) = self.format.load_mappings(&self.mappings_path(version))?;
        Ok(diagnostics.at_version(version))
    }

    /// Decode the diff of `child` against `parent`, returning what the
    /// decoder flagged
    ///
    /// # Errors
    /// IO or decoding failure.
    pub fn check_diff(&self, parent: &str, child: &str) -> Result<Diagnostics, GraphError> {
        let (_, diagnostics) = self.format.load_diff(&self.diff_path(parent, child))?;
        Ok(diagnostics.at_version(child))
    }

    /// Write the diff of `child` against `parent`
    ///
    /// # Errors
    /// IO failure.
    pub fn write_diff(&self, parent: &str, child: &str, tree: &DiffTree) -> Result<(), GraphError> {
        Ok(self.format.write_diff(&self.diff_path(parent, child), tree)?)
    }
}

fn split_edge(stem: &str) -> Option<(String, String)> {
    let mut parts = stem.split(EDGE_SEPARATOR);
    let parent = parts.next().filter(|p| !p.is_empty())?;
    let child = parts.next().filter(|c| !c.is_empty())?;
    if parts.next().is_some() {
        return None;
    }
    Some((parent.to_string(), child.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use maphist_format::{FlatFormat, TreeFormat};
    use pretty_assertions::assert_eq;

    #[test]
    fn edge_names() {
        assert_eq!(split_edge("1.0#1.1"), Some(("1.0".into(), "1.1".into())));
        assert_eq!(split_edge("1.0"), None);
        assert_eq!(split_edge("1.0#1.1#1.2"), None);
        assert_eq!(split_edge("#1.1"), None);
    }

    #[test]
    fn scan_classifies_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "1.0.flatmap",
            "1.0#1.1.flatdiff",
            "1.1#1.2.flatdiff",
            "junk.flatdiff",
            "a#b#c.flatdiff",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let store = Store::new(dir.path(), Arc::new(FlatFormat));
        let layout = store.scan().unwrap();
        assert_eq!(layout.mappings, vec!["1.0".to_string()]);
        assert_eq!(
            layout.edges,
            vec![
                ("1.0".to_string(), "1.1".to_string()),
                ("1.1".to_string(), "1.2".to_string())
            ]
        );
    }

    #[test]
    fn check_reports_repeated_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.0.flatmap"), "CLASS\ta/A\tx\n").unwrap();
        std::fs::write(
            dir.path().join("1.0#1.1.flatdiff"),
            "CLASS\ta/A\tx\ty\nFIELD\ta/A\tb\tI\t\tz\nFIELD\ta/A\tb\tI\t\tw\n",
        )
        .unwrap();
        let store = Store::new(dir.path(), Arc::new(FlatFormat));

        assert!(store.check_mappings("1.0").unwrap().is_empty());
        let diagnostics = store.check_diff("1.0", "1.1").unwrap();
        let found: Vec<_> = diagnostics.iter().collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, maphist_tree::DiagnosticKind::DuplicateKey);
        assert_eq!(found[0].version.as_deref(), Some("1.1"));
        assert_eq!(found[0].path.to_string(), "a/A.b:I");
    }

    #[test]
    fn configured_extensions() {
        let config = HistoryConfig::default()
            .with_format("tree")
            .with_mappings_extension(".m")
            .with_diff_extension(".d");
        let store = Store::from_config("/h", &config).unwrap();
        assert_eq!(store.format().name(), TreeFormat.name());
        assert_eq!(store.mappings_path("1.0"), Path::new("/h/1.0.m"));
        assert_eq!(store.diff_path("1.0", "1.1"), Path::new("/h/1.0#1.1.d"));
    }

    #[test]
    fn unknown_format_is_fatal() {
        let config = HistoryConfig::default().with_format("binary");
        assert!(matches!(
            Store::from_config("/h", &config),
            Err(GraphError::Format(_))
        ));
    }
}
