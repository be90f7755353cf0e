//! Error types for the version graph and propagation

use maphist_format::FormatError;
use maphist_tree::{NodePath, TreeError};
use std::path::PathBuf;

/// Fatal errors while loading, querying or persisting a version graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Parent edges form a cycle; members listed in traversal order
    #[error("version cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// More than one parentless version
    #[error("multiple root versions: {}", .roots.join(", "))]
    MultipleRoots { roots: Vec<String> },

    /// No versions at all
    #[error("no root version")]
    NoRoot,

    /// A diff names a parent that is not a known version
    #[error("version '{child}' names unknown parent '{parent}'")]
    UnresolvedParent { child: String, parent: String },

    /// Version label not in the graph
    #[error("unknown version '{0}'")]
    UnknownVersion(String),

    /// Mappings requested from a version that has parents
    #[error("version '{0}' is not a root and owns no mappings")]
    NotRoot(String),

    /// Diff requested for a non-existent parent edge
    #[error("version '{child}' has no parent '{parent}'")]
    NoEdge { child: String, parent: String },

    /// Graph was built in memory and has nowhere to persist to
    #[error("graph has no backing store")]
    NoStore,

    /// Directory could not be scanned
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping or diff file could not be read or written
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GraphError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Fatal errors during a propagation run
#[derive(Debug, thiserror::Error)]
pub enum PropagationError {
    /// Seed matched more than one overload and cannot pick between them
    #[error("ambiguous overloads of {path} at version '{version}': {}", display_paths(.candidates))]
    AmbiguousSibling {
        version: String,
        path: NodePath,
        candidates: Vec<NodePath>,
    },

    /// Seed addresses a node that cannot exist
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Graph access failed mid-run
    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn display_paths(paths: &[NodePath]) -> String {
    paths
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors loading history configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File exists but could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration TOML
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Direction name not recognised
    #[error("unknown propagation direction '{0}' (expected both, up, down or none)")]
    InvalidDirection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_lists_members() {
        let err = GraphError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "version cycle: a -> b -> a");
    }

    #[test]
    fn ambiguity_lists_candidates() {
        let class = NodePath::class("a/A");
        let err = PropagationError::AmbiguousSibling {
            version: "1.0".into(),
            path: class.child(maphist_tree::NodeKey::field("f", "Z")),
            candidates: vec![
                class.child(maphist_tree::NodeKey::field("f", "I")),
                class.child(maphist_tree::NodeKey::field("f", "J")),
            ],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous overloads of a/A.f:Z at version '1.0': a/A.f:I, a/A.f:J"
        );
    }
}
