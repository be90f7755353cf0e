//! Mapping file formats
//!
//! Textual, tab-delimited, one-record-per-line encodings for
//! [`MappingTree`]s and [`DiffTree`]s.
//!
//! # Encodings
//!
//! - [`FlatFormat`]: every line names its full key (`.flatmap` / `.flatdiff`)
//! - [`TreeFormat`]: leading tabs encode depth (`.treemap` / `.treediff`)
//!
//! Both escape `\\`, tab, newline and carriage return inside fields and skip
//! blank lines and `//` comments. Decoding errors carry the 1-based line.
//!
//! # Example
//!
//! ```rust
//! use maphist_format::{FlatFormat, MappingFormat};
//!
//! let tree = FlatFormat.parse_mappings("CLASS\ta/A\tcom/Foo\n").unwrap();
//! assert_eq!(tree.class("a/A").unwrap().dst(), "com/Foo");
//! assert_eq!(FlatFormat.render_mappings(&tree), "CLASS\ta/A\tcom/Foo\n");
//! ```

#![warn(unreachable_pub)]

mod error;
mod flat;
mod indented;
mod record;
mod registry;

pub use error::FormatError;
pub use flat::FlatFormat;
pub use indented::TreeFormat;
pub use registry::FormatRegistry;

use maphist_tree::{Diagnostics, DiffTree, MappingTree};
use std::path::Path;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One textual encoding of mapping and diff trees
///
/// Implement this trait to add support for new encodings. Only the string
/// conversions are required; plain parsing and file helpers are provided.
pub trait MappingFormat: Send + Sync + 'static {
    /// Registry name
    fn name(&self) -> &'static str;

    /// File suffix of a root mappings file, with leading dot
    fn mappings_extension(&self) -> &'static str;

    /// File suffix of a diff file, with leading dot
    fn diff_extension(&self) -> &'static str;

    /// Decode a mapping tree along with the recoverable anomalies met on
    /// the way, such as records repeating a key
    ///
    /// # Errors
    /// Any malformed record is fatal.
    fn decode_mappings(&self, content: &str) -> Result<(MappingTree, Diagnostics), FormatError>;

    /// Encode a mapping tree
    fn render_mappings(&self, tree: &MappingTree) -> String;

    /// Decode a diff tree, already validated, along with its diagnostics
    ///
    /// # Errors
    /// Any malformed record is fatal.
    fn decode_diff(&self, content: &str) -> Result<(DiffTree, Diagnostics), FormatError>;

    /// Encode a diff tree as given
    fn render_diff(&self, tree: &DiffTree) -> String;

    /// Decode a mapping tree; diagnostics are only logged
    ///
    /// # Errors
    /// Any malformed record is fatal.
    fn parse_mappings(&self, content: &str) -> Result<MappingTree, FormatError> {
        self.decode_mappings(content).map(|(tree, _)| tree)
    }

    /// Decode a diff tree; diagnostics are only logged
    ///
    /// # Errors
    /// Any malformed record is fatal.
    fn parse_diff(&self, content: &str) -> Result<DiffTree, FormatError> {
        self.decode_diff(content).map(|(tree, _)| tree)
    }

    /// Read a mappings file with its diagnostics
    ///
    /// # Errors
    /// IO failures and decoding errors, the latter tagged with the path.
    fn load_mappings(&self, path: &Path) -> Result<(MappingTree, Diagnostics), FormatError> {
        let content = std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
        let (tree, diagnostics) = self.decode_mappings(&content).map_err(|e| e.in_file(path))?;
        tracing::debug!(path = %path.display(), nodes = tree.len(), "read mappings");
        Ok((tree, diagnostics))
    }

    /// Read a diff file with its diagnostics
    ///
    /// # Errors
    /// IO failures and decoding errors, the latter tagged with the path.
    fn load_diff(&self, path: &Path) -> Result<(DiffTree, Diagnostics), FormatError> {
        let content = std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
        let (tree, diagnostics) = self.decode_diff(&content).map_err(|e| e.in_file(path))?;
        tracing::debug!(path = %path.display(), nodes = tree.len(), "read diff");
        Ok((tree, diagnostics))
    }

    /// Read a mappings file
    ///
    /// # Errors
    /// See [`MappingFormat::load_mappings`].
    fn read_mappings(&self, path: &Path) -> Result<MappingTree, FormatError> {
        self.load_mappings(path).map(|(tree, _)| tree)
    }

    /// Write a mappings file
    ///
    /// # Errors
    /// IO failures.
    fn write_mappings(&self, path: &Path, tree: &MappingTree) -> Result<(), FormatError> {
        std::fs::write(path, self.render_mappings(tree)).map_err(|e| FormatError::io(path, e))?;
        tracing::debug!(path = %path.display(), nodes = tree.len(), "wrote mappings");
        Ok(())
    }

    /// Read a diff file
    ///
    /// # Errors
    /// See [`MappingFormat::load_diff`].
    fn read_diff(&self, path: &Path) -> Result<DiffTree, FormatError> {
        self.load_diff(path).map(|(tree, _)| tree)
    }

    /// Write a diff file, pruning no-op nodes first
    ///
    /// # Errors
    /// IO failures.
    fn write_diff(&self, path: &Path, tree: &DiffTree) -> Result<(), FormatError> {
        let mut tree = tree.clone();
        tree.validate();
        std::fs::write(path, self.render_diff(&tree)).map_err(|e| FormatError::io(path, e))?;
        tracing::debug!(path = %path.display(), nodes = tree.len(), "wrote diff");
        Ok(())
    }
}

/// Blank lines and `//` comments carry no record
pub(crate) fn is_ignored(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.starts_with("//")
}
