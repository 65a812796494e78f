//! DDL rendering for the target schema.
//!
//! Spanner DDL is the default output. Under
//! [`TargetDialect::ExperimentalPostgres`] types use PostgreSQL spelling and
//! the primary key moves into the column list as a table constraint.

use crate::config::{DdlOptions, TargetDialect};

use super::{
    IndexKey, Length, TargetForeignKey, TargetIndex, TargetSchema, TargetTable, TargetType,
    TypeName,
};

impl TargetType {
    /// Render the type for the given dialect, e.g. `ARRAY<STRING(MAX)>`.
    pub fn print(&self, dialect: TargetDialect) -> String {
        match dialect {
            TargetDialect::Spanner => {
                let scalar = match self.name {
                    TypeName::Bool => "BOOL".to_string(),
                    TypeName::Int64 => "INT64".to_string(),
                    TypeName::Float64 => "FLOAT64".to_string(),
                    TypeName::Numeric => "NUMERIC".to_string(),
                    TypeName::String => format!("STRING({})", print_length(self.len)),
                    TypeName::Bytes => format!("BYTES({})", print_length(self.len)),
                    TypeName::Date => "DATE".to_string(),
                    TypeName::Timestamp => "TIMESTAMP".to_string(),
                };
                if self.is_array {
                    format!("ARRAY<{}>", scalar)
                } else {
                    scalar
                }
            }
            TargetDialect::ExperimentalPostgres => {
                let scalar = match (self.name, self.len) {
                    (TypeName::Bool, _) => "BOOL".to_string(),
                    (TypeName::Int64, _) => "INT8".to_string(),
                    (TypeName::Float64, _) => "FLOAT8".to_string(),
                    (TypeName::Numeric, _) => "NUMERIC".to_string(),
                    (TypeName::String, Some(Length::Limit(n))) => format!("VARCHAR({})", n),
                    (TypeName::String, _) => "VARCHAR".to_string(),
                    (TypeName::Bytes, _) => "BYTEA".to_string(),
                    (TypeName::Date, _) => "DATE".to_string(),
                    (TypeName::Timestamp, _) => "TIMESTAMPTZ".to_string(),
                };
                if self.is_array {
                    format!("{}[]", scalar)
                } else {
                    scalar
                }
            }
        }
    }
}

fn print_length(len: Option<Length>) -> String {
    match len {
        Some(Length::Limit(n)) => n.to_string(),
        Some(Length::Max) | None => "MAX".to_string(),
    }
}

fn print_keys(keys: &[IndexKey], with_desc: bool) -> String {
    keys.iter()
        .map(|k| {
            if k.desc && with_desc {
                format!("{} DESC", k.column)
            } else {
                k.column.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl TargetTable {
    /// Render a CREATE TABLE statement.
    pub fn print_create_table(&self, dialect: TargetDialect, comments: bool) -> String {
        // (comment, definition) per line inside the parentheses
        let mut entries: Vec<(Option<&str>, String)> = self
            .columns()
            .map(|col| {
                let mut def = format!("{} {}", col.name, col.ty.print(dialect));
                if col.not_null {
                    def.push_str(" NOT NULL");
                }
                (Some(col.comment.as_str()), def)
            })
            .collect();

        if dialect == TargetDialect::ExperimentalPostgres && !self.primary_keys.is_empty() {
            entries.push((
                None,
                format!("PRIMARY KEY ({})", print_keys(&self.primary_keys, false)),
            ));
        }

        let mut s = String::new();
        if comments && !self.comment.is_empty() {
            s.push_str(&format!("-- {}\n", self.comment));
        }
        s.push_str(&format!("CREATE TABLE {} (\n", self.name));
        let last = entries.len().saturating_sub(1);
        for (i, (comment, def)) in entries.iter().enumerate() {
            if let Some(c) = comment.filter(|c| comments && !c.is_empty()) {
                s.push_str(&format!("  -- {}\n", c));
            }
            s.push_str("  ");
            s.push_str(def);
            if i != last {
                s.push(',');
            }
            s.push('\n');
        }
        s.push(')');

        if dialect == TargetDialect::Spanner {
            s.push_str(&format!(
                " PRIMARY KEY ({})",
                print_keys(&self.primary_keys, true)
            ));
        }
        s
    }
}

impl TargetIndex {
    /// Render a CREATE INDEX statement.
    pub fn print_create_index(&self) -> String {
        let unique = if self.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique,
            self.name,
            self.table,
            print_keys(&self.keys, true)
        )
    }
}

impl TargetForeignKey {
    /// Render the constraint clause, e.g.
    /// `CONSTRAINT fk FOREIGN KEY (a) REFERENCES t (b)`.
    pub fn print_foreign_key(&self) -> String {
        let constraint = match &self.name {
            Some(name) => format!("CONSTRAINT {} ", name),
            None => String::new(),
        };
        format!(
            "{}FOREIGN KEY ({}) REFERENCES {} ({})",
            constraint,
            self.columns.join(", "),
            self.refer_table,
            self.refer_columns.join(", ")
        )
    }
}

impl TargetSchema {
    /// Render the whole schema as a list of DDL statements: tables sorted by
    /// name, then their indexes, then foreign keys as ALTER TABLE statements.
    pub fn print_ddl(&self, dialect: TargetDialect, options: &DdlOptions) -> Vec<String> {
        let mut statements: Vec<String> = self
            .tables()
            .map(|t| t.print_create_table(dialect, options.comments))
            .collect();

        statements.extend(
            self.tables()
                .flat_map(|t| t.indexes.iter())
                .map(TargetIndex::print_create_index),
        );

        if options.foreign_keys {
            for table in self.tables() {
                for fk in &table.foreign_keys {
                    statements.push(format!(
                        "ALTER TABLE {} ADD {}",
                        table.name,
                        fk.print_foreign_key()
                    ));
                }
            }
        }
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetColumn;
    use std::collections::BTreeMap;

    fn users_table() -> TargetTable {
        let cols = [
            ("id", TargetType::scalar(TypeName::Int64), true, "From: id bigserial"),
            ("name", TargetType::string(50), false, "From: name varchar(50)"),
            (
                "tags",
                TargetType::string_max().into_array(),
                false,
                "From: tags text[]",
            ),
        ];
        let mut col_defs = BTreeMap::new();
        let mut col_names = Vec::new();
        for (name, ty, not_null, comment) in cols {
            col_names.push(name.to_string());
            col_defs.insert(
                name.to_string(),
                TargetColumn {
                    name: name.to_string(),
                    ty,
                    not_null,
                    comment: comment.to_string(),
                },
            );
        }
        TargetTable {
            name: "users".to_string(),
            col_names,
            col_defs,
            primary_keys: vec![IndexKey {
                column: "id".to_string(),
                desc: true,
            }],
            foreign_keys: vec![],
            indexes: vec![TargetIndex {
                name: "users_by_name".to_string(),
                table: "users".to_string(),
                unique: true,
                keys: vec![IndexKey {
                    column: "name".to_string(),
                    desc: false,
                }],
            }],
            comment: "Spanner schema for source table users".to_string(),
        }
    }

    #[test]
    fn test_print_spanner_types() {
        let d = TargetDialect::Spanner;
        assert_eq!(TargetType::scalar(TypeName::Bool).print(d), "BOOL");
        assert_eq!(TargetType::scalar(TypeName::Float64).print(d), "FLOAT64");
        assert_eq!(TargetType::string(10).print(d), "STRING(10)");
        assert_eq!(TargetType::string_max().print(d), "STRING(MAX)");
        assert_eq!(TargetType::bytes_max().print(d), "BYTES(MAX)");
        assert_eq!(
            TargetType::scalar(TypeName::Int64).into_array().print(d),
            "ARRAY<INT64>"
        );
    }

    #[test]
    fn test_print_postgres_types() {
        let d = TargetDialect::ExperimentalPostgres;
        assert_eq!(TargetType::scalar(TypeName::Int64).print(d), "INT8");
        assert_eq!(TargetType::string(10).print(d), "VARCHAR(10)");
        assert_eq!(TargetType::string_max().print(d), "VARCHAR");
        assert_eq!(TargetType::bytes_max().print(d), "BYTEA");
        assert_eq!(TargetType::scalar(TypeName::Timestamp).print(d), "TIMESTAMPTZ");
    }

    #[test]
    fn test_print_create_table_spanner() {
        let ddl = users_table().print_create_table(TargetDialect::Spanner, false);
        assert_eq!(
            ddl,
            "CREATE TABLE users (\n  id INT64 NOT NULL,\n  name STRING(50),\n  tags ARRAY<STRING(MAX)>\n) PRIMARY KEY (id DESC)"
        );
    }

    #[test]
    fn test_print_create_table_with_comments() {
        let ddl = users_table().print_create_table(TargetDialect::Spanner, true);
        assert!(ddl.starts_with("-- Spanner schema for source table users\nCREATE TABLE users (\n"));
        assert!(ddl.contains("  -- From: id bigserial\n  id INT64 NOT NULL,\n"));
    }

    #[test]
    fn test_print_create_table_postgres() {
        let mut table = users_table();
        table.col_names.truncate(1);
        let ddl = table.print_create_table(TargetDialect::ExperimentalPostgres, false);
        assert_eq!(
            ddl,
            "CREATE TABLE users (\n  id INT8 NOT NULL,\n  PRIMARY KEY (id)\n)"
        );
    }

    #[test]
    fn test_print_create_index() {
        let table = users_table();
        assert_eq!(
            table.indexes[0].print_create_index(),
            "CREATE UNIQUE INDEX users_by_name ON users (name)"
        );
    }

    #[test]
    fn test_print_foreign_key() {
        let mut fk = TargetForeignKey {
            name: Some("fk_owner".to_string()),
            columns: vec!["owner_id".to_string()],
            refer_table: "users".to_string(),
            refer_columns: vec!["id".to_string()],
        };
        assert_eq!(
            fk.print_foreign_key(),
            "CONSTRAINT fk_owner FOREIGN KEY (owner_id) REFERENCES users (id)"
        );
        fk.name = None;
        assert_eq!(
            fk.print_foreign_key(),
            "FOREIGN KEY (owner_id) REFERENCES users (id)"
        );
    }

    #[test]
    fn test_print_ddl_orders_statements() {
        let mut schema = TargetSchema::new();
        let mut users = users_table();
        users.foreign_keys.push(TargetForeignKey {
            name: None,
            columns: vec!["id".to_string()],
            refer_table: "users".to_string(),
            refer_columns: vec!["id".to_string()],
        });
        schema.insert(users);

        let options = DdlOptions {
            comments: false,
            foreign_keys: true,
        };
        let stmts = schema.print_ddl(TargetDialect::Spanner, &options);
        assert_eq!(stmts.len(), 3);
        assert!(stmts[0].starts_with("CREATE TABLE users"));
        assert!(stmts[1].starts_with("CREATE UNIQUE INDEX"));
        assert_eq!(
            stmts[2],
            "ALTER TABLE users ADD FOREIGN KEY (id) REFERENCES users (id)"
        );

        let no_fks = DdlOptions {
            comments: false,
            foreign_keys: false,
        };
        assert_eq!(schema.print_ddl(TargetDialect::Spanner, &no_fks).len(), 2);
    }
}
