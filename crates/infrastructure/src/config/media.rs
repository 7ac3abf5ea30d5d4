//! Media download settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Media configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAppConfig {
    /// Scratch directory for downloaded media (default: `<tmp>/wati-mcp/downloads`)
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("wati-mcp").join("downloads")
}

impl Default for MediaAppConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
        }
    }
}
