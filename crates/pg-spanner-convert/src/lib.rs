//! # pg-spanner-convert
//!
//! PostgreSQL to Spanner schema conversion library.
//!
//! This library translates an already-parsed PostgreSQL schema into a Spanner
//! schema, with support for:
//!
//! - **Type mapping** from PostgreSQL scalar types to the Spanner vocabulary
//! - **Shared namespace** keeping table, foreign key and index names unique
//! - **Constraint conversion** for primary keys, foreign keys and indexes
//! - **Issue tracking** for every lossy column conversion
//! - **DDL rendering** for Spanner and the PostgreSQL-interface dialect
//!
//! Conversion never fails as a whole: entities that can't be converted are
//! skipped and reported as [`Diagnostic`]s.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pg_spanner_convert::{ConvertConfig, SchemaConverter, SourceSchema};
//!
//! fn main() -> pg_spanner_convert::Result<()> {
//!     let config = ConvertConfig::load("convert.yaml")?;
//!     let source = SourceSchema::from_json(&std::fs::read_to_string("schema.json")?)?;
//!     let conversion = SchemaConverter::new(config.clone()).convert(&source);
//!     for stmt in conversion.ddl(&config) {
//!         println!("{};", stmt);
//!     }
//!     for diagnostic in &conversion.diagnostics {
//!         eprintln!("{}", diagnostic);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constraints;
pub mod core;
pub mod error;
pub mod names;
pub mod orchestrator;
pub mod target;
pub mod typemap;

// Re-exports for convenient access
pub use config::{ConvertConfig, DdlOptions, TargetDialect};
pub use crate::core::{
    ConversionIssue, Diagnostic, EntityKind, IssueRegistry, Namespace, NameResolver,
    ReferenceResolver, Severity, SourceColumn, SourceSchema, SourceTable, SourceType,
};
pub use error::{ConvertError, Result};
pub use names::NameMapper;
pub use orchestrator::{Conversion, ForeignKeyResolver, SchemaConverter};
pub use target::{TargetSchema, TargetTable, TargetType, TypeName};
pub use typemap::{map_type, PostgresToSpannerMapper, TypeMapping};
