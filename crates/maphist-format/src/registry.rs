//! Format lookup by name or file extension

use crate::error::FormatError;
use crate::{FlatFormat, MappingFormat, TreeFormat};
use std::path::Path;
use std::sync::Arc;

/// Registry of available encodings
#[derive(Clone)]
pub struct FormatRegistry {
    formats: Vec<Arc<dyn MappingFormat>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

impl FormatRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Create registry with the built-in encodings
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FlatFormat);
        registry.register(TreeFormat);
        registry
    }

    /// Register a format; a later registration under the same name wins
    pub fn register<F: MappingFormat>(&mut self, format: F) {
        self.formats.retain(|f| f.name() != format.name());
        self.formats.push(Arc::new(format));
    }

    /// Format registered as `name`
    ///
    /// # Errors
    /// [`FormatError::UnknownFormat`] if nothing is registered under `name`.
    pub fn by_name(&self, name: &str) -> Result<Arc<dyn MappingFormat>, FormatError> {
        self.formats
            .iter()
            .find(|f| f.name() == name)
            .cloned()
            .ok_or_else(|| FormatError::UnknownFormat(name.to_string()))
    }

    /// Format whose mappings or diff extension ends the file name of `path`
    ///
    /// # Errors
    /// [`FormatError::UnknownFormat`] if no extension matches.
    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn MappingFormat>, FormatError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.formats
            .iter()
            .find(|f| {
                file_name.ends_with(f.mappings_extension()) || file_name.ends_with(f.diff_extension())
            })
            .cloned()
            .ok_or_else(|| FormatError::UnknownFormat(path.display().to_string()))
    }

    /// Registered names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.by_name("flat").unwrap().name(), "flat");
        assert_eq!(registry.by_name("tree").unwrap().name(), "tree");
        assert!(matches!(
            registry.by_name("tiny"),
            Err(FormatError::UnknownFormat(name)) if name == "tiny"
        ));
    }

    #[test]
    fn lookup_by_extension() {
        let registry = FormatRegistry::default();
        let format = registry.for_path(Path::new("/h/1.0#1.1.treediff")).unwrap();
        assert_eq!(format.name(), "tree");
        let format = registry.for_path(Path::new("1.0.flatmap")).unwrap();
        assert_eq!(format.name(), "flat");
        assert!(registry.for_path(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn reregistering_replaces() {
        let mut registry = FormatRegistry::with_defaults();
        registry.register(FlatFormat);
        assert_eq!(registry.names(), vec!["tree", "flat"]);
    }
}
