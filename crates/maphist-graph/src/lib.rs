//! Mapping history graph
//!
//! Loads a history directory into a DAG of versions and replicates
//! localized edits across it.
//!
//! # Core Concepts
//!
//! - [`VersionGraph`]: versions, their parent edges and lazily loaded trees
//! - [`Store`]: file naming convention of a history directory
//! - [`propagate`]: replicate a seed diff to every affected version
//! - [`NameHistory`]: name of one node at every version
//! - [`HistoryConfig`]: optional `maphist.toml` of a history directory
//!
//! # Architecture
//!
//! ```text
//! maphist.toml ─→ HistoryConfig ─→ Store ─→ VersionGraph ─┬─→ propagate ─→ write_dirty
//!                                                        └─→ walk / value_at / resolve_mappings
//! ```
//!
//! # Example
//!
//! ```rust
//! use maphist_graph::{propagate, PropagationOptions, VersionGraph};
//! use maphist_tree::{Attribute, DiffEntry, DiffTree, Mapping, MappingTree, NodePath};
//!
//! let mut root = MappingTree::new();
//! root.add_class("a/A", Mapping::named("com/Foo"));
//! let mut graph = VersionGraph::from_parts(
//!     [("1.0".to_string(), root)],
//!     [("1.0".to_string(), "1.1".to_string(), DiffTree::new())],
//! )?;
//!
//! let mut seed = DiffTree::new();
//! seed.add_class("a/A", DiffEntry::dst("com/Foo", "com/Bar"));
//! let report = propagate(&mut graph, "1.1", &seed, PropagationOptions::default())?;
//!
//! assert_eq!(report.dirty, vec!["1.0".to_string()]);
//! let path = NodePath::class("a/A");
//! assert_eq!(graph.value_at("1.1", &path, Attribute::Destination)?, "com/Bar");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]

mod config;
mod error;
mod graph;
mod history;
mod propagate;
mod store;

pub use config::{Direction, HistoryConfig, PropagationOptions, CONFIG_FILE};
pub use error::{ConfigError, GraphError, PropagationError};
pub use graph::{Version, VersionGraph};
pub use history::{HistoryEntry, NameHistory, VersionVisitor};
pub use propagate::{propagate, Edit, PropagationReport};
pub use store::{Layout, Store, EDGE_SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
