//! Schema conversion orchestrator - drives the whole conversion pass.
//!
//! A run has three strictly ordered phases:
//!
//! 1. **Namespace seeding**: every source table's target name is resolved and
//!    reserved, since tables, foreign keys and indexes share one namespace.
//!    Declared columns are registered with the name resolver at the same
//!    time, so constraints can only refer to columns that exist.
//! 2. **Per-table conversion**: tables and their columns in declaration
//!    order; type mapping, issue recording, then constraint conversion.
//! 3. **Reference resolution**: cross-table references are checked against
//!    the finished schema.
//!
//! The run always completes. Skipped entities are reported as diagnostics;
//! lossy column conversions are recorded in the issue registry.

mod refs;

pub use refs::ForeignKeyResolver;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::ConvertConfig;
use crate::constraints::ConstraintConverter;
use crate::core::identifier::{quote_if_needed, Namespace};
use crate::core::issues::{Diagnostic, Diagnostics, EntityKind, IssueRegistry};
use crate::core::schema::{SourceSchema, SourceTable};
use crate::core::traits::{NameResolver, ReferenceResolver};
use crate::error::Result;
use crate::names::NameMapper;
use crate::target::{TargetColumn, TargetSchema, TargetTable};
use crate::typemap::PostgresToSpannerMapper;

/// Result of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Converted schema, tables keyed by target name.
    pub schema: TargetSchema,

    /// Lossy column conversions keyed by source table and column.
    pub issues: IssueRegistry,

    /// Entities that were skipped, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// Whether every entity converted and no column conversion was lossy.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.diagnostics.is_empty()
    }

    /// Render the converted schema as DDL statements.
    pub fn ddl(&self, config: &ConvertConfig) -> Vec<String> {
        self.schema.print_ddl(config.target_dialect, &config.ddl)
    }

    /// Serialize the result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA256 of the converted schema and issue registry.
    ///
    /// Two runs over the same source schema and configuration produce the
    /// same fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let json = serde_json::to_vec(&(&self.schema, &self.issues))?;
        let mut hasher = Sha256::new();
        hasher.update(&json);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// PostgreSQL to Spanner schema converter.
#[derive(Debug, Clone, Default)]
pub struct SchemaConverter {
    config: ConvertConfig,
    mapper: PostgresToSpannerMapper,
}

impl SchemaConverter {
    /// Create a converter.
    pub fn new(config: ConvertConfig) -> Self {
        let mapper = PostgresToSpannerMapper::new(config.target_dialect);
        Self { config, mapper }
    }

    /// The converter's configuration.
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert `source` using the default [`NameMapper`] and
    /// [`ForeignKeyResolver`].
    pub fn convert(&self, source: &SourceSchema) -> Conversion {
        self.convert_with(source, &mut NameMapper::new(), &mut ForeignKeyResolver)
    }

    /// Convert `source` with caller-supplied collaborators.
    ///
    /// `names` and `refs` should be fresh for each run.
    pub fn convert_with<N, F>(&self, source: &SourceSchema, names: &mut N, refs: &mut F) -> Conversion
    where
        N: NameResolver + ?Sized,
        F: ReferenceResolver + ?Sized,
    {
        let mut run = Run {
            mapper: self.mapper,
            names,
            namespace: Namespace::new(),
            schema: TargetSchema::new(),
            issues: IssueRegistry::new(),
            diagnostics: Diagnostics::new(),
        };

        info!(
            "Converting {} tables for target dialect {}",
            source.tables.len(),
            self.config.target_dialect
        );

        info!("Phase 1: Seeding namespace with table names");
        run.seed_namespace(source);

        info!("Phase 2: Converting tables");
        for table in &source.tables {
            run.convert_table(table);
        }

        info!("Phase 3: Resolving references");
        refs.resolve(&mut run.schema, &mut run.diagnostics);

        info!(
            "Converted {} tables: {} columns with issues, {} skipped entities",
            run.schema.len(),
            run.issues.len(),
            run.diagnostics.len()
        );

        Conversion {
            schema: run.schema,
            issues: run.issues,
            diagnostics: run.diagnostics.into_vec(),
        }
    }
}

/// State of one conversion run.
struct Run<'a, N: NameResolver + ?Sized> {
    mapper: PostgresToSpannerMapper,
    names: &'a mut N,
    namespace: Namespace,
    schema: TargetSchema,
    issues: IssueRegistry,
    diagnostics: Diagnostics,
}

impl<N: NameResolver + ?Sized> Run<'_, N> {
    /// Reserve every table name and register every declared column, so
    /// that constraints converted later only ever refer to known columns.
    fn seed_namespace(&mut self, source: &SourceSchema) {
        for table in &source.tables {
            match self.names.resolve_table(&table.name) {
                Ok(name) => {
                    self.namespace.reserve(&name);
                }
                Err(e) => {
                    self.skip_table(&table.name, format!("can't seed namespace: {}", e));
                    continue;
                }
            }
            // Failures are reported when the column is converted.
            for col in table.col_names.iter().filter_map(|c| table.column(c)) {
                if let Err(e) = self.names.resolve_column(&table.name, &col.name, false) {
                    debug!("Can't register column {}.{}: {}", table.name, col.name, e);
                }
            }
        }
    }

    fn convert_table(&mut self, src: &SourceTable) {
        let name = match self.names.resolve_table(&src.name) {
            Ok(name) => name,
            Err(e) => {
                self.skip_table(&src.name, e.to_string());
                return;
            }
        };
        if self.schema.contains(&name) {
            self.skip_table(&src.name, format!("target name {} is already used", name));
            return;
        }
        debug!("Converting table {} to {}", src.name, name);

        let mut col_names = Vec::with_capacity(src.col_names.len());
        let mut col_defs = BTreeMap::new();
        for src_col_name in &src.col_names {
            let Some(src_col) = src.column(src_col_name) else {
                self.skip_column(&src.name, src_col_name, "no column definition".to_string());
                continue;
            };
            let col_name = match self.names.resolve_column(&src.name, &src_col.name, false) {
                Ok(col_name) => col_name,
                Err(e) => {
                    self.skip_column(&src.name, src_col_name, e.to_string());
                    continue;
                }
            };

            let mapping = self.mapper.map_column(src_col);
            self.issues.record(&src.name, &src_col.name, mapping.issues);

            col_names.push(col_name.clone());
            col_defs.insert(
                col_name.clone(),
                TargetColumn {
                    name: col_name,
                    ty: mapping.ty,
                    not_null: src_col.not_null,
                    comment: format!(
                        "From: {} {}",
                        quote_if_needed(&src_col.name),
                        src_col.ty.print()
                    ),
                },
            );
        }

        let mut constraints =
            ConstraintConverter::new(&mut *self.names, &mut self.namespace, &mut self.diagnostics);
        let primary_keys = constraints.primary_keys(&src.name, &src.primary_keys);
        let foreign_keys = constraints.foreign_keys(&src.name, &src.foreign_keys);
        let indexes = constraints.indexes(&name, &src.name, &src.indexes);

        self.schema.insert(TargetTable {
            comment: format!(
                "Spanner schema for source table {}",
                quote_if_needed(&src.name)
            ),
            name,
            col_names,
            col_defs,
            primary_keys,
            foreign_keys,
            indexes,
        });
    }

    fn skip_table(&mut self, table: &str, reason: String) {
        self.diagnostics
            .report(Diagnostic::new(EntityKind::Table, table, None, reason));
    }

    fn skip_column(&mut self, table: &str, column: &str, reason: String) {
        self.diagnostics.report(Diagnostic::new(
            EntityKind::Column,
            table,
            Some(column.to_string()),
            reason,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetDialect;
    use crate::core::issues::ConversionIssue;
    use crate::core::schema::{Key, SourceColumn, SourceForeignKey, SourceIndex, SourceType};
    use crate::core::traits::NoopResolver;
    use crate::error::ConvertError;
    use crate::target::{TargetForeignKey, TargetType, TypeName};

    fn col(name: &str, ty: &str) -> SourceColumn {
        SourceColumn::new(name, SourceType::new(ty))
    }

    fn users() -> SourceTable {
        SourceTable::new("users")
            .with_column(col("id", "bigserial").not_null())
            .with_column(col("email", "text"))
            .with_primary_key(vec![Key::asc("id")])
    }

    fn orders() -> SourceTable {
        SourceTable::new("orders")
            .with_column(col("id", "int8").not_null())
            .with_column(col("user_id", "int8"))
            .with_primary_key(vec![Key::asc("id")])
            .with_foreign_key(SourceForeignKey::new("fk_user", ["user_id"], "users", ["id"]))
            .with_index(SourceIndex::new("", false, vec![Key::asc("user_id")]))
    }

    /// Resolver that refuses one table name.
    struct RefusingResolver {
        inner: NameMapper,
        refused: &'static str,
    }

    impl NameResolver for RefusingResolver {
        fn resolve_table(&mut self, src_table: &str) -> Result<String> {
            if src_table == self.refused {
                return Err(ConvertError::TableNotFound(src_table.to_string()));
            }
            self.inner.resolve_table(src_table)
        }

        fn resolve_column(&mut self, t: &str, c: &str, key: bool) -> Result<String> {
            self.inner.resolve_column(t, c, key)
        }
    }

    fn target_table(name: &str, cols: &[&str], fks: Vec<TargetForeignKey>) -> TargetTable {
        TargetTable {
            name: name.into(),
            col_names: cols.iter().map(|c| c.to_string()).collect(),
            col_defs: BTreeMap::new(),
            primary_keys: vec![],
            foreign_keys: fks,
            indexes: vec![],
            comment: String::new(),
        }
    }

    fn foreign_key(column: &str, refer_table: &str, refer_column: &str) -> TargetForeignKey {
        TargetForeignKey {
            name: None,
            columns: vec![column.into()],
            refer_table: refer_table.into(),
            refer_columns: vec![refer_column.into()],
        }
    }

    #[test]
    fn test_convert_builds_tables() {
        let source = SourceSchema::new(vec![users(), orders()]);
        let result = SchemaConverter::default().convert(&source);

        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(result.schema.len(), 2);

        let users = result.schema.table("users").unwrap();
        assert_eq!(users.col_names, vec!["id", "email"]);
        let id = users.column("id").unwrap();
        assert_eq!(id.ty, TargetType::scalar(TypeName::Int64));
        assert!(id.not_null);
        assert_eq!(id.comment, "From: id bigserial");
        assert_eq!(users.comment, "Spanner schema for source table users");

        let orders = result.schema.table("orders").unwrap();
        assert_eq!(orders.primary_keys[0].column, "id");
        assert_eq!(orders.foreign_keys[0].name.as_deref(), Some("fk_user"));
        assert_eq!(orders.indexes[0].name, "Index_orders");
        assert_eq!(orders.indexes[0].table, "orders");
    }

    #[test]
    fn test_convert_records_issues_per_column() {
        let source = SourceSchema::new(vec![users(), orders()]);
        let result = SchemaConverter::default().convert(&source);

        assert_eq!(
            result.issues.for_column("users", "id"),
            &[ConversionIssue::Serial]
        );
        assert!(result.issues.for_column("users", "email").is_empty());
        assert!(result.issues.for_column("orders", "id").is_empty());
        assert_eq!(result.issues.len(), 1);
        assert!(!result.is_clean());
    }

    #[test]
    fn test_index_name_colliding_with_table_is_suffixed() {
        let tables = vec![
            SourceTable::new("Index_orders").with_column(col("id", "int8")),
            orders(),
            users(),
        ];
        let result = SchemaConverter::default().convert(&SourceSchema::new(tables));
        let orders = result.schema.table("orders").unwrap();
        assert_eq!(orders.indexes[0].name, "Index_orders_2");
    }

    #[test]
    fn test_refused_table_skipped_others_converted() {
        let source = SourceSchema::new(vec![users(), orders()]);
        let mut names = RefusingResolver {
            inner: NameMapper::new(),
            refused: "users",
        };
        let result =
            SchemaConverter::default().convert_with(&source, &mut names, &mut ForeignKeyResolver);

        assert!(result.schema.table("users").is_none());
        let orders = result.schema.table("orders").unwrap();
        assert!(orders.foreign_keys.is_empty());
        assert_eq!(orders.indexes.len(), 1);

        // seeding + per-table skip for users, then the dropped foreign key
        let kinds: Vec<_> = result.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![EntityKind::Table, EntityKind::Table, EntityKind::ForeignKey]
        );
        let fk_diag = &result.diagnostics[2];
        assert_eq!(fk_diag.table, "orders");
        assert!(fk_diag.reason.contains("users"));
    }

    #[test]
    fn test_column_without_definition_skipped() {
        let mut table = users();
        table.col_names.push("ghost".to_string());
        let result = SchemaConverter::default().convert(&SourceSchema::new(vec![table]));

        let users = result.schema.table("users").unwrap();
        assert_eq!(users.col_names, vec!["id", "email"]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, EntityKind::Column);
        assert_eq!(result.diagnostics[0].entity.as_deref(), Some("ghost"));
    }

    #[test]
    fn test_experimental_dialect_overrides_types() {
        let table = SourceTable::new("prices")
            .with_column(col("amount", "numeric"))
            .with_column(SourceColumn::new(
                "tags",
                SourceType::new("text").with_array_dims(1),
            ));
        let converter =
            SchemaConverter::new(ConvertConfig::for_dialect(TargetDialect::ExperimentalPostgres));
        let result = converter.convert(&SourceSchema::new(vec![table]));

        let prices = result.schema.table("prices").unwrap();
        assert_eq!(prices.column("amount").unwrap().ty, TargetType::string_max());
        let tags = prices.column("tags").unwrap();
        assert_eq!(tags.ty, TargetType::string_max());
        assert!(!tags.ty.is_array);
        assert_eq!(tags.comment, "From: tags text[]");
    }

    #[test]
    fn test_duplicate_source_table_skipped() {
        let source = SourceSchema::new(vec![users(), users()]);
        let mut names = NameMapper::new();
        let result =
            SchemaConverter::default().convert_with(&source, &mut names, &mut NoopResolver);
        assert_eq!(result.schema.len(), 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].reason.contains("already used"));
    }

    #[test]
    fn test_fingerprint_stable_across_runs() {
        let source = SourceSchema::new(vec![orders(), users()]);
        let converter = SchemaConverter::default();
        let first = converter.convert(&source);
        let second = converter.convert(&source);
        assert_eq!(first, second);
        let fingerprint = first.fingerprint().unwrap();
        assert_eq!(fingerprint, second.fingerprint().unwrap());
        assert_eq!(fingerprint.len(), 64);
    }

    #[test]
    fn test_to_json_contains_issue_tags() {
        let result = SchemaConverter::default().convert(&SourceSchema::new(vec![users()]));
        let json = result.to_json().unwrap();
        assert!(json.contains("\"serial\""));
        let back: Conversion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    // =========================================================================
    // Reference resolution tests
    // =========================================================================

    #[test]
    fn test_fk_to_undeclared_column_dropped() {
        let table = orders().with_foreign_key(SourceForeignKey::new(
            "fk_ghost",
            ["user_id"],
            "users",
            ["ghost"],
        ));
        let result = SchemaConverter::default().convert(&SourceSchema::new(vec![users(), table]));

        let orders = result.schema.table("orders").unwrap();
        let names: Vec<_> = orders
            .foreign_keys
            .iter()
            .map(|fk| fk.name.as_deref())
            .collect();
        assert_eq!(names, vec![Some("fk_user")]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, EntityKind::ForeignKey);
        assert!(result.diagnostics[0]
            .reason
            .contains("Column ghost not found in table users"));
        assert_eq!(
            result.schema.table("users").unwrap().col_names,
            vec!["id", "email"]
        );
    }

    #[test]
    fn test_fk_declared_before_referenced_table_keeps_its_columns() {
        let table = SourceTable::new("orders")
            .with_column(col("email", "text"))
            .with_foreign_key(SourceForeignKey::new("fk_email", ["email"], "users", ["EMAIL"]));
        let result =
            SchemaConverter::default().convert(&SourceSchema::new(vec![table, users()]));

        let users = result.schema.table("users").unwrap();
        assert_eq!(users.col_names, vec!["id", "email"]);
        assert!(result.schema.table("orders").unwrap().foreign_keys.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].reason.contains("EMAIL"));
    }

    #[test]
    fn test_reference_resolver_drops_fk_to_undeclared_column() {
        let mut schema = TargetSchema::new();
        schema.insert(target_table("users", &["id"], vec![]));
        schema.insert(target_table(
            "orders",
            &["user_id"],
            vec![foreign_key("user_id", "users", "uid")],
        ));
        let mut diags = Diagnostics::new();
        ForeignKeyResolver.resolve(&mut schema, &mut diags);

        assert!(schema.table("orders").unwrap().foreign_keys.is_empty());
        let diags = diags.into_vec();
        assert_eq!(diags[0].table, "orders");
        assert_eq!(
            diags[0].reason,
            "referenced column uid does not exist in table users"
        );
    }

    #[test]
    fn test_reference_resolver_after_table_rename() {
        let mut schema = TargetSchema::new();
        schema.insert(target_table("users", &["id"], vec![]));
        schema.insert(target_table(
            "orders",
            &["user_id"],
            vec![foreign_key("user_id", "users", "id")],
        ));
        for table in schema.tables_mut() {
            if table.name == "orders" {
                table.name = "purchases".into();
            }
        }
        let mut diags = Diagnostics::new();
        ForeignKeyResolver.resolve(&mut schema, &mut diags);

        assert!(diags.is_empty());
        assert_eq!(schema.table("orders").unwrap().foreign_keys.len(), 1);
    }

    #[test]
    fn test_reference_resolver_drops_fk_to_missing_table() {
        let mut schema = TargetSchema::new();
        schema.insert(target_table(
            "orders",
            &["user_id"],
            vec![foreign_key("user_id", "users", "id")],
        ));
        let mut diags = Diagnostics::new();
        ForeignKeyResolver.resolve(&mut schema, &mut diags);

        assert!(schema.table("orders").unwrap().foreign_keys.is_empty());
        let diags = diags.into_vec();
        assert_eq!(diags[0].reason, "referenced table users does not exist");
    }
}
