//! Core abstractions for schema conversion.
//!
//! - [`schema`]: source table, column and constraint metadata
//! - [`identifier`]: target identifier sanitising and the shared namespace
//! - [`issues`]: conversion issues and entity diagnostics
//! - [`traits`]: collaborator seams (name and reference resolution)

pub mod identifier;
pub mod issues;
pub mod schema;
pub mod traits;

pub use identifier::{fix_name, quote_if_needed, Namespace};
pub use issues::{ConversionIssue, Diagnostic, Diagnostics, EntityKind, IssueRegistry, Severity};
pub use schema::{
    IgnoredFeatures, Key, SourceColumn, SourceForeignKey, SourceIndex, SourceSchema, SourceTable,
    SourceType,
};
pub use traits::{NameResolver, NoopResolver, ReferenceResolver};
