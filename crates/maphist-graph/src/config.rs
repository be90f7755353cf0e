//! History and propagation configuration
//!
//! A history directory may carry an optional `maphist.toml`:
//!
//! ```toml
//! format = "tree"
//! mappings_extension = ".mapping"
//!
//! [propagation]
//! direction = "up"
//! lenient = true
//! ```
//!
//! Missing keys take their defaults; a missing file means all defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Name of the optional configuration file inside a history directory
pub const CONFIG_FILE: &str = "maphist.toml";

/// Which way an edit may travel from its seed version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stay on the seed version's own edges
    None,
    /// Climb toward the root; never enter the seed's children
    Up,
    /// Fan out to descendants; never climb past the seed
    Down,
    /// Both ways
    #[default]
    Both,
}

impl Direction {
    /// Whether the edit may climb past the seed
    #[inline]
    #[must_use]
    pub fn up(self) -> bool {
        matches!(self, Self::Up | Self::Both)
    }

    /// Whether the edit may fan out into the seed's children
    #[inline]
    #[must_use]
    pub fn down(self) -> bool {
        matches!(self, Self::Down | Self::Both)
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Up => "up",
            Self::Down => "down",
            Self::Both => "both",
        })
    }
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::InvalidDirection(s.to_string())),
        }
    }
}

/// Options of one propagation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationOptions {
    /// Barrier placement
    pub direction: Direction,
    /// Carry destination edits across same-named overloads
    pub lenient: bool,
}

impl PropagationOptions {
    /// With direction
    #[inline]
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// With lenient overload handling
    #[inline]
    #[must_use]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}

/// Configuration of one history directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Registered format name
    pub format: String,
    /// Override of the format's mappings file suffix
    pub mappings_extension: Option<String>,
    /// Override of the format's diff file suffix
    pub diff_extension: Option<String>,
    /// Default propagation options
    pub propagation: PropagationOptions,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            format: "flat".to_string(),
            mappings_extension: None,
            diff_extension: None,
            propagation: PropagationOptions::default(),
        }
    }
}

impl HistoryConfig {
    /// Read `maphist.toml` from `dir`, or defaults if there is none
    ///
    /// # Errors
    /// The file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "no configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        let config: Self =
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), format = %config.format, "loaded configuration");
        Ok(config)
    }

    /// With format name
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// With mappings file suffix
    #[must_use]
    pub fn with_mappings_extension(mut self, extension: impl Into<String>) -> Self {
        self.mappings_extension = Some(extension.into());
        self
    }

    /// With diff file suffix
    #[must_use]
    pub fn with_diff_extension(mut self, extension: impl Into<String>) -> Self {
        self.diff_extension = Some(extension.into());
        self
    }

    /// With propagation options
    #[must_use]
    pub fn with_propagation(mut self, propagation: PropagationOptions) -> Self {
        self.propagation = propagation;
        self
    }
}
