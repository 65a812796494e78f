//! Target (Spanner) schema types produced by the conversion engine.
//!
//! Entities are built once during the conversion pass and placed into a
//! [`TargetSchema`]; only the final reference-resolution pass may drop
//! foreign keys from them afterwards.

pub mod ddl;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed set of target scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeName {
    Bool,
    Int64,
    Float64,
    Numeric,
    String,
    Bytes,
    Date,
    Timestamp,
}

/// Length of a STRING or BYTES column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    /// Unbounded (`MAX`).
    Max,
    /// Fixed upper bound.
    Limit(i64),
}

/// A target column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetType {
    /// Scalar type.
    pub name: TypeName,

    /// Length for STRING/BYTES, `None` for other types.
    pub len: Option<Length>,

    /// Whether the column is an ARRAY of `name`.
    pub is_array: bool,
}

impl TargetType {
    /// Scalar type without length.
    pub const fn scalar(name: TypeName) -> Self {
        Self {
            name,
            len: None,
            is_array: false,
        }
    }

    /// STRING(n).
    pub const fn string(len: i64) -> Self {
        Self {
            name: TypeName::String,
            len: Some(Length::Limit(len)),
            is_array: false,
        }
    }

    /// STRING(MAX).
    pub const fn string_max() -> Self {
        Self {
            name: TypeName::String,
            len: Some(Length::Max),
            is_array: false,
        }
    }

    /// BYTES(MAX).
    pub const fn bytes_max() -> Self {
        Self {
            name: TypeName::Bytes,
            len: Some(Length::Max),
            is_array: false,
        }
    }

    /// The same type as an ARRAY.
    pub const fn into_array(self) -> Self {
        Self {
            is_array: true,
            ..self
        }
    }
}

/// Target column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetColumn {
    /// Column name.
    pub name: String,

    /// Column type.
    #[serde(rename = "type")]
    pub ty: TargetType,

    /// NOT NULL constraint.
    pub not_null: bool,

    /// Provenance comment.
    pub comment: String,
}

/// A key column with its sort direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    /// Target column name.
    pub column: String,

    /// Descending order.
    pub desc: bool,
}

/// Target foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetForeignKey {
    /// Constraint name; `None` lets the database choose one.
    pub name: Option<String>,

    /// Referencing columns.
    pub columns: Vec<String>,

    /// Referenced table.
    pub refer_table: String,

    /// Referenced columns, positionally paired with `columns`.
    pub refer_columns: Vec<String>,
}

/// Target secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetIndex {
    /// Index name, unique in the shared namespace.
    pub name: String,

    /// Indexed table.
    pub table: String,

    /// UNIQUE index.
    pub unique: bool,

    /// Key columns in order.
    pub keys: Vec<IndexKey>,
}

/// Target table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTable {
    /// Table name.
    pub name: String,

    /// Column names in source declaration order.
    pub col_names: Vec<String>,

    /// Column definitions keyed by target column name.
    pub col_defs: BTreeMap<String, TargetColumn>,

    /// Primary key columns.
    pub primary_keys: Vec<IndexKey>,

    /// Foreign key constraints.
    pub foreign_keys: Vec<TargetForeignKey>,

    /// Secondary indexes.
    pub indexes: Vec<TargetIndex>,

    /// Provenance comment.
    pub comment: String,
}

impl TargetTable {
    /// Columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &TargetColumn> {
        self.col_names.iter().filter_map(|name| self.col_defs.get(name))
    }

    /// Look up a column by target name.
    pub fn column(&self, name: &str) -> Option<&TargetColumn> {
        self.col_defs.get(name)
    }
}

/// Target schema: tables keyed by target name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSchema {
    tables: BTreeMap<String, TargetTable>,
}

impl TargetSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table keyed by its name.
    pub fn insert(&mut self, table: TargetTable) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Look up a table by target name.
    pub fn table(&self, name: &str) -> Option<&TargetTable> {
        self.tables.get(name)
    }

    /// Whether a table with this target name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Tables sorted by name.
    pub fn tables(&self) -> impl Iterator<Item = &TargetTable> {
        self.tables.values()
    }

    /// Mutable access to tables, sorted by name.
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut TargetTable> {
        self.tables.values_mut()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ty: TargetType) -> TargetColumn {
        TargetColumn {
            name: name.to_string(),
            ty,
            not_null: false,
            comment: String::new(),
        }
    }

    #[test]
    fn test_type_constructors() {
        assert_eq!(TargetType::string(50).len, Some(Length::Limit(50)));
        assert_eq!(TargetType::string_max().len, Some(Length::Max));
        assert_eq!(TargetType::bytes_max().name, TypeName::Bytes);
        assert_eq!(TargetType::scalar(TypeName::Int64).len, None);

        let arr = TargetType::scalar(TypeName::Int64).into_array();
        assert!(arr.is_array);
        assert_eq!(arr.name, TypeName::Int64);
    }

    #[test]
    fn test_table_columns_in_declaration_order() {
        let mut col_defs = BTreeMap::new();
        col_defs.insert("b".to_string(), column("b", TargetType::string_max()));
        col_defs.insert("a".to_string(), column("a", TargetType::scalar(TypeName::Bool)));
        let table = TargetTable {
            name: "t".to_string(),
            col_names: vec!["b".to_string(), "a".to_string()],
            col_defs,
            primary_keys: vec![],
            foreign_keys: vec![],
            indexes: vec![],
            comment: String::new(),
        };
        let names: Vec<_> = table.columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(table.column("a").is_some());
    }

    #[test]
    fn test_schema_sorted_by_name() {
        let mut schema = TargetSchema::new();
        for name in ["zebra", "apple"] {
            schema.insert(TargetTable {
                name: name.to_string(),
                col_names: vec![],
                col_defs: BTreeMap::new(),
                primary_keys: vec![],
                foreign_keys: vec![],
                indexes: vec![],
                comment: String::new(),
            });
        }
        let names: Vec<_> = schema.tables().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "zebra"]);
        assert!(schema.contains("zebra"));
        assert_eq!(schema.len(), 2);
    }
}
