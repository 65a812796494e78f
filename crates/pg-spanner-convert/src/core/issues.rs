//! Conversion issues and entity diagnostics.
//!
//! Two result channels come out of a conversion run:
//!
//! - [`IssueRegistry`]: per-column annotations that a type conversion was
//!   lossy or approximate. The column is still emitted.
//! - [`Diagnostic`]: an entity (table, column, key column, foreign key, index)
//!   that could not be converted and was dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A lossy or approximate aspect of a column's conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionIssue {
    /// Numeric type widened to a larger representation.
    Widened,
    /// Serial column mapped to a plain integer without a sequence.
    Serial,
    /// Timestamp without time zone mapped to a zoned timestamp.
    Timestamp,
    /// Array with more than one dimension stored as a string.
    MultiDimensionalArray,
    /// No good target type; stored as a string.
    NoGoodTypeMatch,
    /// Inline foreign key on the column was dropped.
    ForeignKeyDropped,
    /// Default value on the column was dropped.
    DefaultValueDropped,
}

/// How much attention a conversion issue deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Behavior may differ; review recommended.
    Warning,
    /// Informational only.
    Note,
}

impl ConversionIssue {
    /// Stable tag used in serialized output.
    pub fn tag(&self) -> &'static str {
        match self {
            ConversionIssue::Widened => "widened",
            ConversionIssue::Serial => "serial",
            ConversionIssue::Timestamp => "timestamp",
            ConversionIssue::MultiDimensionalArray => "multi-dimensional-array",
            ConversionIssue::NoGoodTypeMatch => "no-good-type-match",
            ConversionIssue::ForeignKeyDropped => "foreign-key-dropped",
            ConversionIssue::DefaultValueDropped => "default-value-dropped",
        }
    }

    /// Human-readable explanation of the issue.
    pub fn description(&self) -> &'static str {
        match self {
            ConversionIssue::Widened => "Spanner does not support this width; values are widened",
            ConversionIssue::Serial => {
                "Spanner does not support autoincrementing types; the sequence is dropped"
            }
            ConversionIssue::Timestamp => {
                "Spanner does not support timestamp without time zone; values are stored as UTC timestamps"
            }
            ConversionIssue::MultiDimensionalArray => {
                "Spanner does not support multi-dimensional arrays; values are stored as strings"
            }
            ConversionIssue::NoGoodTypeMatch => {
                "No appropriate Spanner type; values are stored as strings"
            }
            ConversionIssue::ForeignKeyDropped => {
                "Spanner does not support this foreign key form; it is dropped"
            }
            ConversionIssue::DefaultValueDropped => {
                "Spanner does not support default values; the default is dropped"
            }
        }
    }

    /// Severity of the issue.
    pub fn severity(&self) -> Severity {
        match self {
            ConversionIssue::Widened | ConversionIssue::Serial | ConversionIssue::Timestamp => {
                Severity::Note
            }
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for ConversionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Issues keyed by (source table name, source column name).
///
/// Only columns with at least one issue have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueRegistry {
    tables: BTreeMap<String, BTreeMap<String, Vec<ConversionIssue>>>,
}

impl IssueRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the issues for a column. Empty lists are ignored.
    pub fn record(&mut self, table: &str, column: &str, issues: Vec<ConversionIssue>) {
        if issues.is_empty() {
            return;
        }
        self.tables
            .entry(table.to_string())
            .or_default()
            .entry(column.to_string())
            .or_default()
            .extend(issues);
    }

    /// Issues recorded for a column, in the order they were found.
    pub fn for_column(&self, table: &str, column: &str) -> &[ConversionIssue] {
        self.tables
            .get(table)
            .and_then(|cols| cols.get(column))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Source table names with at least one issue.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Iterate over (table, column, issues) in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[ConversionIssue])> {
        self.tables.iter().flat_map(|(table, cols)| {
            cols.iter()
                .map(move |(col, issues)| (table.as_str(), col.as_str(), issues.as_slice()))
        })
    }

    /// Number of columns with issues.
    pub fn len(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }

    /// Whether no issues were recorded.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Kind of entity a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Table,
    Column,
    PrimaryKey,
    ForeignKey,
    Index,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Table => "table",
            EntityKind::Column => "column",
            EntityKind::PrimaryKey => "primary key",
            EntityKind::ForeignKey => "foreign key",
            EntityKind::Index => "index",
        };
        f.write_str(s)
    }
}

/// An entity that was skipped during conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What was skipped.
    pub kind: EntityKind,
    /// Source table the entity belongs to.
    pub table: String,
    /// Identifying name within the table (column, constraint, ...), if any.
    pub entity: Option<String>,
    /// Why it was skipped.
    pub reason: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(
        kind: EntityKind,
        table: impl Into<String>,
        entity: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            entity,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(
                f,
                "Can't map {} {} of table {}: {}",
                self.kind, entity, self.table, self.reason
            ),
            None => write!(f, "Can't map {} {}: {}", self.kind, self.table, self.reason),
        }
    }
}

/// Collects diagnostics and logs each one as it is recorded.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Number of diagnostics recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the collector, returning diagnostics in report order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
