//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConvertError;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    /// Target database variant (default: spanner).
    #[serde(default)]
    pub target_dialect: TargetDialect,

    /// DDL rendering options.
    #[serde(default)]
    pub ddl: DdlOptions,
}

impl ConvertConfig {
    /// Configuration for the given target dialect with default DDL options.
    pub fn for_dialect(target_dialect: TargetDialect) -> Self {
        Self {
            target_dialect,
            ddl: DdlOptions::default(),
        }
    }
}

/// Selects how column types are post-processed after the base mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDialect {
    /// Standard Spanner type vocabulary, with one-dimensional arrays.
    #[default]
    Spanner,
    /// Narrower variant: numeric, date and array columns become strings.
    ExperimentalPostgres,
}

impl TargetDialect {
    /// Config-file spelling of the dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetDialect::Spanner => "spanner",
            TargetDialect::ExperimentalPostgres => "experimental_postgres",
        }
    }
}

impl fmt::Display for TargetDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetDialect {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spanner" => Ok(TargetDialect::Spanner),
            "experimental_postgres" => Ok(TargetDialect::ExperimentalPostgres),
            other => Err(ConvertError::Config(format!(
                "target_dialect must be 'spanner' or 'experimental_postgres', got '{}'",
                other
            ))),
        }
    }
}

/// Options controlling DDL rendering of the target schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DdlOptions {
    /// Emit provenance comments for tables and columns (default: true).
    #[serde(default = "default_true")]
    pub comments: bool,

    /// Emit foreign key constraints (default: true).
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
}

impl Default for DdlOptions {
    fn default() -> Self {
        Self {
            comments: true,
            foreign_keys: true,
        }
    }
}

fn default_true() -> bool {
    true
}
