//! Node identity
//!
//! Provides [`NodeKey`], the immutable source identity of a node, and
//! [`NodeKind`], the kind derived from it.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of a node in a mapping or diff tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Class (top-level or nested)
    Class,
    /// Field of a class
    Field,
    /// Method of a class
    Method,
    /// Parameter of a method
    Parameter,
}

impl NodeKind {
    /// Whether a node of this kind may own a child of `child` kind
    #[inline]
    #[must_use]
    pub fn can_own(self, child: NodeKind) -> bool {
        matches!(
            (self, child),
            (Self::Class, Self::Class | Self::Field | Self::Method)
                | (Self::Method, Self::Parameter)
        )
    }

    /// Whether members of this kind carry a descriptor
    #[inline]
    #[must_use]
    pub fn is_member(self) -> bool {
        matches!(self, Self::Field | Self::Method)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Class => "class",
            Self::Field => "field",
            Self::Method => "method",
            Self::Parameter => "parameter",
        };
        f.write_str(name)
    }
}

/// Source identity of a node
///
/// Sibling keys are unique within their parent. Keys never change once a
/// node is created; only the destination and documentation are mutable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKey {
    /// Class by full binary name (`a/b/C`, `a/b/C$Inner`)
    Class {
        /// Source name
        name: String,
    },
    /// Field by name and type descriptor
    Field {
        /// Source name
        name: String,
        /// Type descriptor (`I`, `La/B;`)
        desc: String,
    },
    /// Method by name and method descriptor
    Method {
        /// Source name
        name: String,
        /// Method descriptor (`(I)V`)
        desc: String,
    },
    /// Parameter by local variable index and source name
    Parameter {
        /// Local variable index
        index: u32,
        /// Source name (may be empty)
        name: String,
    },
}

impl NodeKey {
    /// Class key
    #[inline]
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class { name: name.into() }
    }

    /// Field key
    #[inline]
    #[must_use]
    pub fn field(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            desc: desc.into(),
        }
    }

    /// Method key
    #[inline]
    #[must_use]
    pub fn method(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self::Method {
            name: name.into(),
            desc: desc.into(),
        }
    }

    /// Parameter key
    #[inline]
    #[must_use]
    pub fn parameter(index: u32, name: impl Into<String>) -> Self {
        Self::Parameter {
            index,
            name: name.into(),
        }
    }

    /// Kind of the node this key identifies
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Class { .. } => NodeKind::Class,
            Self::Field { .. } => NodeKind::Field,
            Self::Method { .. } => NodeKind::Method,
            Self::Parameter { .. } => NodeKind::Parameter,
        }
    }

    /// Source name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Class { name }
            | Self::Field { name, .. }
            | Self::Method { name, .. }
            | Self::Parameter { name, .. } => name,
        }
    }

    /// Descriptor, for fields and methods
    #[inline]
    #[must_use]
    pub fn desc(&self) -> Option<&str> {
        match self {
            Self::Field { desc, .. } | Self::Method { desc, .. } => Some(desc),
            Self::Class { .. } | Self::Parameter { .. } => None,
        }
    }

    /// True when `other` is an overload of this member: same kind, same
    /// source name, different descriptor
    #[must_use]
    pub fn is_overload_of(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Field { name: a, desc: da }, Self::Field { name: b, desc: db })
            | (Self::Method { name: a, desc: da }, Self::Method { name: b, desc: db }) => {
                a == b && da != db
            }
            _ => false,
        }
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { name } => f.write_str(name),
            Self::Field { name, desc } => write!(f, "{name}:{desc}"),
            Self::Method { name, desc } => write!(f, "{name}{desc}"),
            Self::Parameter { index, name } => write!(f, "#{index}:{name}"),
        }
    }
}
