//! Fixture directory configuration

use std::path::{Path, PathBuf};

use fixture_tree::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{io_at, FixtureError, Result};

/// Settings for creating temporary fixture directories, e.g. from
/// `fixture.toml`:
///
/// ```toml
/// temp_root = "/tmp/my-tests"
/// prefix = "app-"
/// default_encoding = "utf8"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Parent directory for temporary roots. Defaults to the OS temp dir.
    #[serde(default)]
    pub temp_root: Option<PathBuf>,

    /// Name prefix of each temporary directory
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Encoding for text reads and writes that do not name one
    #[serde(default)]
    pub default_encoding: Encoding,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            prefix: default_prefix(),
            default_encoding: Encoding::default(),
        }
    }
}

fn default_prefix() -> String {
    "fixture-".to_string()
}

impl FixtureConfig {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(io_at(path))?;
        toml::from_str(&content).map_err(|source| FixtureError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Try to load config, returning default if the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
