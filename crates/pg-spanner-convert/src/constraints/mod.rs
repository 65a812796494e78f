//! Primary key, foreign key and index conversion.
//!
//! Unresolvable references never abort a table. A primary key or index loses
//! only the columns that fail to resolve; a foreign key is dropped as a whole,
//! so a partial foreign key is never emitted.
//!
//! Foreign key and index names are allocated from the shared [`Namespace`],
//! which must already hold every table name.

use crate::core::identifier::{fix_name, Namespace};
use crate::core::issues::{Diagnostic, Diagnostics, EntityKind};
use crate::core::schema::{Key, SourceForeignKey, SourceIndex};
use crate::core::traits::NameResolver;
use crate::target::{IndexKey, TargetForeignKey, TargetIndex};

/// Converts the constraints of one source table.
pub struct ConstraintConverter<'a, R: NameResolver + ?Sized> {
    names: &'a mut R,
    namespace: &'a mut Namespace,
    diagnostics: &'a mut Diagnostics,
}

impl<'a, R: NameResolver + ?Sized> ConstraintConverter<'a, R> {
    /// Create a converter over the run's resolver, namespace and diagnostics.
    pub fn new(
        names: &'a mut R,
        namespace: &'a mut Namespace,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            names,
            namespace,
            diagnostics,
        }
    }

    /// Convert primary key columns, dropping those that do not resolve.
    pub fn primary_keys(&mut self, src_table: &str, keys: &[Key]) -> Vec<IndexKey> {
        let mut converted = Vec::with_capacity(keys.len());
        for key in keys {
            match self.names.resolve_column(src_table, &key.column, true) {
                Ok(column) => converted.push(IndexKey {
                    column,
                    desc: key.desc,
                }),
                Err(e) => self.diagnostics.report(Diagnostic::new(
                    EntityKind::PrimaryKey,
                    src_table,
                    Some(key.column.clone()),
                    format!("can't map key column: {}", e),
                )),
            }
        }
        converted
    }

    /// Convert foreign keys. Any failure drops the whole foreign key.
    pub fn foreign_keys(
        &mut self,
        src_table: &str,
        fks: &[SourceForeignKey],
    ) -> Vec<TargetForeignKey> {
        fks.iter()
            .filter_map(|fk| self.foreign_key(src_table, fk))
            .collect()
    }

    fn foreign_key(
        &mut self,
        src_table: &str,
        fk: &SourceForeignKey,
    ) -> Option<TargetForeignKey> {
        let entity = (!fk.name.is_empty()).then(|| fk.name.clone());

        if fk.columns.len() != fk.refer_columns.len() {
            self.drop_foreign_key(
                src_table,
                &entity,
                format!(
                    "columns and refer_columns don't have the same lengths: len(columns)={}, len(refer_columns)={} for referenced table {}",
                    fk.columns.len(),
                    fk.refer_columns.len(),
                    fk.refer_table
                ),
            );
            return None;
        }
        if fk.columns.is_empty() {
            self.drop_foreign_key(
                src_table,
                &entity,
                format!("no columns for referenced table {}", fk.refer_table),
            );
            return None;
        }

        let refer_table = match self.names.resolve_table(&fk.refer_table) {
            Ok(name) => name,
            Err(e) => {
                self.drop_foreign_key(
                    src_table,
                    &entity,
                    format!("can't map referenced table {}: {}", fk.refer_table, e),
                );
                return None;
            }
        };

        let mut columns = Vec::with_capacity(fk.columns.len());
        let mut refer_columns = Vec::with_capacity(fk.refer_columns.len());
        for (col, refer_col) in fk.columns.iter().zip(&fk.refer_columns) {
            // Both sides must name declared columns; resolving a foreign key
            // never introduces a column mapping.
            let resolved = self
                .names
                .resolve_column(src_table, col, true)
                .and_then(|c| {
                    let r = self.names.resolve_column(&fk.refer_table, refer_col, true)?;
                    Ok((c, r))
                });
            match resolved {
                Ok((c, r)) => {
                    columns.push(c);
                    refer_columns.push(r);
                }
                Err(e) => {
                    self.drop_foreign_key(
                        src_table,
                        &entity,
                        format!(
                            "can't map column {} referencing table {}: {}",
                            col, fk.refer_table, e
                        ),
                    );
                    return None;
                }
            }
        }

        // Unnamed foreign keys stay unnamed and take no namespace.
        let name = match fix_name(&fk.name) {
            Ok((fixed, _)) => Some(self.namespace.allocate(&fixed)),
            Err(_) => None,
        };

        Some(TargetForeignKey {
            name,
            columns,
            refer_table,
            refer_columns,
        })
    }

    fn drop_foreign_key(&mut self, src_table: &str, entity: &Option<String>, reason: String) {
        self.diagnostics.report(Diagnostic::new(
            EntityKind::ForeignKey,
            src_table,
            entity.clone(),
            reason,
        ));
    }

    /// Convert secondary indexes of `src_table`, which maps to `target_table`.
    ///
    /// Unresolved key columns are dropped; an index left without key columns
    /// is dropped entirely. Unnamed indexes are named `Index_<src_table>`.
    pub fn indexes(
        &mut self,
        target_table: &str,
        src_table: &str,
        indexes: &[SourceIndex],
    ) -> Vec<TargetIndex> {
        let mut converted = Vec::with_capacity(indexes.len());
        for index in indexes {
            let candidate = if index.name.is_empty() {
                format!("Index_{}", src_table)
            } else {
                index.name.clone()
            };

            let mut keys = Vec::with_capacity(index.keys.len());
            for key in &index.keys {
                match self.names.resolve_column(src_table, &key.column, true) {
                    Ok(column) => keys.push(IndexKey {
                        column,
                        desc: key.desc,
                    }),
                    Err(e) => self.diagnostics.report(Diagnostic::new(
                        EntityKind::Index,
                        src_table,
                        Some(candidate.clone()),
                        format!("can't map index key column {}: {}", key.column, e),
                    )),
                }
            }
            // CREATE INDEX needs at least one key column, so an index with
            // none left is dropped and takes no name.
            if keys.is_empty() {
                self.diagnostics.report(Diagnostic::new(
                    EntityKind::Index,
                    src_table,
                    Some(candidate),
                    "no key columns could be mapped",
                ));
                continue;
            }

            let fixed = fix_name(&candidate).map(|(n, _)| n).unwrap_or(candidate);
            converted.push(TargetIndex {
                name: self.namespace.allocate(&fixed),
                table: target_table.to_string(),
                unique: index.unique,
                keys,
            });
        }
        converted
    }
}
