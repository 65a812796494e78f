//! Configuration loading.

mod types;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl ConvertConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ConvertConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}
