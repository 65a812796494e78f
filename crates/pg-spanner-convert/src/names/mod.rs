//! Default source-to-target name resolution.
//!
//! [`NameMapper`] turns PostgreSQL table and column names into legal Spanner
//! identifiers, keeps table names unique among tables and column names unique
//! within their table, and remembers every mapping so repeat lookups agree.

use std::collections::HashMap;

use tracing::debug;

use crate::core::identifier::{fix_name, Namespace};
use crate::core::traits::NameResolver;
use crate::error::{ConvertError, Result};

/// Column mappings for one source table.
#[derive(Debug, Clone, Default)]
struct ColumnNames {
    mapped: HashMap<String, String>,
    used: Namespace,
}

/// Caching name resolver backed by [`fix_name`].
///
/// Create one per conversion run.
#[derive(Debug, Clone, Default)]
pub struct NameMapper {
    tables: HashMap<String, String>,
    table_names: Namespace,
    columns: HashMap<String, ColumnNames>,
}

impl NameMapper {
    /// Create an empty mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Target name already assigned to a source table, if any.
    pub fn table_name(&self, src_table: &str) -> Option<&str> {
        self.tables.get(src_table).map(String::as_str)
    }
}

impl NameResolver for NameMapper {
    fn resolve_table(&mut self, src_table: &str) -> Result<String> {
        if src_table.is_empty() {
            return Err(ConvertError::TableNotFound(src_table.to_string()));
        }
        if let Some(name) = self.tables.get(src_table) {
            return Ok(name.clone());
        }

        let (fixed, changed) = fix_name(src_table)?;
        let name = self.table_names.allocate(&fixed);
        if changed || name != fixed {
            debug!("Renamed table {} to {}", src_table, name);
        }
        self.tables.insert(src_table.to_string(), name.clone());
        self.columns.entry(src_table.to_string()).or_default();
        Ok(name)
    }

    fn resolve_column(
        &mut self,
        src_table: &str,
        src_column: &str,
        is_key_column: bool,
    ) -> Result<String> {
        if src_column.is_empty() {
            return Err(ConvertError::column_not_found(src_table, src_column));
        }
        let columns = self
            .columns
            .get_mut(src_table)
            .ok_or_else(|| ConvertError::TableNotFound(src_table.to_string()))?;

        if let Some(name) = columns.mapped.get(src_column) {
            return Ok(name.clone());
        }
        // Key columns must refer to a column already declared on the table.
        if is_key_column {
            return Err(ConvertError::column_not_found(src_table, src_column));
        }

        let (fixed, changed) = fix_name(src_column)?;
        let name = columns.used.allocate(&fixed);
        if changed || name != fixed {
            debug!("Renamed column {}.{} to {}", src_table, src_column, name);
        }
        columns.mapped.insert(src_column.to_string(), name.clone());
        Ok(name)
    }
}
