//! Final cross-table reference resolution.

use std::collections::{HashMap, HashSet};

use crate::core::issues::{Diagnostic, Diagnostics, EntityKind};
use crate::core::traits::ReferenceResolver;
use crate::target::{TargetForeignKey, TargetSchema};

/// Drops foreign keys whose columns or referenced table/columns are missing
/// from the finished target schema.
///
/// Foreign keys are converted table by table, so a reference to a table that
/// was later skipped, or to a column that was never declared, can only be
/// detected once every table has been built.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignKeyResolver;

impl ReferenceResolver for ForeignKeyResolver {
    fn resolve(&mut self, schema: &mut TargetSchema, diagnostics: &mut Diagnostics) {
        let columns: HashMap<String, HashSet<String>> = schema
            .tables()
            .map(|t| (t.name.clone(), t.col_names.iter().cloned().collect()))
            .collect();

        for table in schema.tables_mut() {
            let own_columns = &columns[&table.name];
            let table_name = table.name.clone();
            table.foreign_keys.retain(|fk| {
                match check_foreign_key(fk, own_columns, &columns) {
                    Ok(()) => true,
                    Err(reason) => {
                        diagnostics.report(Diagnostic::new(
                            EntityKind::ForeignKey,
                            table_name.as_str(),
                            fk.name.clone(),
                            reason,
                        ));
                        false
                    }
                }
            });
        }
    }
}

fn check_foreign_key(
    fk: &TargetForeignKey,
    own_columns: &HashSet<String>,
    tables: &HashMap<String, HashSet<String>>,
) -> Result<(), String> {
    if let Some(col) = fk.columns.iter().find(|c| !own_columns.contains(*c)) {
        return Err(format!("column {} does not exist", col));
    }
    let refer_columns = tables
        .get(&fk.refer_table)
        .ok_or_else(|| format!("referenced table {} does not exist", fk.refer_table))?;
    if let Some(col) = fk.refer_columns.iter().find(|c| !refer_columns.contains(*c)) {
        return Err(format!(
            "referenced column {} does not exist in table {}",
            col, fk.refer_table
        ));
    }
    Ok(())
}
