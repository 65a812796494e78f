//! Source schema types: tables, columns, keys, foreign keys and indexes as
//! produced by the PostgreSQL schema reader.
//!
//! These types are read-only inputs to the conversion engine. They derive
//! serde traits so a parsed schema can be stored and reloaded as JSON or YAML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// A complete source schema, tables in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    /// Tables in declaration order.
    pub tables: Vec<SourceTable>,
}

impl SourceSchema {
    /// Create a schema from tables in declaration order.
    pub fn new(tables: Vec<SourceTable>) -> Self {
        Self { tables }
    }

    /// Parse a schema from its JSON encoding.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a schema from its YAML encoding.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Find a table by source name.
    pub fn table(&self, name: &str) -> Option<&SourceTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Source table metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTable {
    /// Table name.
    pub name: String,

    /// Column names in declaration order.
    pub col_names: Vec<String>,

    /// Column definitions keyed by column name.
    pub col_defs: BTreeMap<String, SourceColumn>,

    /// Primary key columns, in key order.
    #[serde(default)]
    pub primary_keys: Vec<Key>,

    /// Foreign key constraints.
    #[serde(default)]
    pub foreign_keys: Vec<SourceForeignKey>,

    /// Secondary indexes.
    #[serde(default)]
    pub indexes: Vec<SourceIndex>,
}

impl SourceTable {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a column, keeping declaration order.
    pub fn with_column(mut self, column: SourceColumn) -> Self {
        self.col_names.push(column.name.clone());
        self.col_defs.insert(column.name.clone(), column);
        self
    }

    /// Set the primary key.
    pub fn with_primary_key(mut self, keys: Vec<Key>) -> Self {
        self.primary_keys = keys;
        self
    }

    /// Append a foreign key.
    pub fn with_foreign_key(mut self, fk: SourceForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Append an index.
    pub fn with_index(mut self, index: SourceIndex) -> Self {
        self.indexes.push(index);
        self
    }

    /// Look up a column definition by name.
    pub fn column(&self, name: &str) -> Option<&SourceColumn> {
        self.col_defs.get(name)
    }
}

/// Source column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumn {
    /// Column name.
    pub name: String,

    /// Column type.
    #[serde(rename = "type")]
    pub ty: SourceType,

    /// Whether the column is declared NOT NULL.
    #[serde(default)]
    pub not_null: bool,

    /// Source features that the target cannot represent.
    #[serde(default)]
    pub ignored: IgnoredFeatures,
}

impl SourceColumn {
    /// Create a nullable column with no ignored features.
    pub fn new(name: impl Into<String>, ty: SourceType) -> Self {
        Self {
            name: name.into(),
            ty,
            not_null: false,
            ignored: IgnoredFeatures::default(),
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Record that the column had a default expression.
    pub fn with_dropped_default(mut self) -> Self {
        self.ignored.default = true;
        self
    }

    /// Record that the column had an inline foreign key.
    pub fn with_dropped_foreign_key(mut self) -> Self {
        self.ignored.foreign_key = true;
        self
    }
}

/// Source scalar type: identifier, modifiers and array dimensionality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceType {
    /// Type identifier, e.g. "varchar" or "timestamp with time zone".
    pub name: String,

    /// Type modifiers such as length or precision/scale.
    #[serde(default)]
    pub mods: Vec<i64>,

    /// Number of array dimensions (0 for scalars).
    #[serde(default)]
    pub array_dims: usize,
}

impl SourceType {
    /// Create a scalar type with no modifiers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mods: Vec::new(),
            array_dims: 0,
        }
    }

    /// Set the type modifiers.
    pub fn with_mods(mut self, mods: impl Into<Vec<i64>>) -> Self {
        self.mods = mods.into();
        self
    }

    /// Set the number of array dimensions.
    pub fn with_array_dims(mut self, dims: usize) -> Self {
        self.array_dims = dims;
        self
    }

    /// Whether the type is an array of any dimensionality.
    pub fn is_array(&self) -> bool {
        self.array_dims > 0
    }

    /// Render the type as it would appear in PostgreSQL DDL,
    /// e.g. `numeric(10,2)` or `text[][]`.
    pub fn print(&self) -> String {
        let mut s = self.name.clone();
        if !self.mods.is_empty() {
            let mods: Vec<String> = self.mods.iter().map(|m| m.to_string()).collect();
            s.push('(');
            s.push_str(&mods.join(","));
            s.push(')');
        }
        for _ in 0..self.array_dims {
            s.push_str("[]");
        }
        s
    }
}

/// Column features dropped during conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredFeatures {
    /// Column had a DEFAULT expression.
    #[serde(default)]
    pub default: bool,

    /// Column had an inline foreign key that could not be represented.
    #[serde(default)]
    pub foreign_key: bool,
}

/// A key column with its sort direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Column name.
    pub column: String,

    /// Descending order.
    #[serde(default)]
    pub desc: bool,
}

impl Key {
    /// Ascending key on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            desc: false,
        }
    }

    /// Descending key on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            desc: true,
        }
    }
}

/// Source foreign key constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceForeignKey {
    /// Constraint name, empty when undeclared.
    #[serde(default)]
    pub name: String,

    /// Referencing columns.
    pub columns: Vec<String>,

    /// Referenced table name.
    pub refer_table: String,

    /// Referenced columns, positionally paired with `columns`.
    pub refer_columns: Vec<String>,
}

impl SourceForeignKey {
    /// Create a foreign key.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
        refer_table: impl Into<String>,
        refer_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            refer_table: refer_table.into(),
            refer_columns: refer_columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Source secondary index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIndex {
    /// Index name, empty when undeclared.
    #[serde(default)]
    pub name: String,

    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,

    /// Key columns in order.
    pub keys: Vec<Key>,
}

impl SourceIndex {
    /// Create an index.
    pub fn new(name: impl Into<String>, unique: bool, keys: Vec<Key>) -> Self {
        Self {
            name: name.into(),
            unique,
            keys,
        }
    }
}
