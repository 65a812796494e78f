//! Collaborator seams of the conversion engine.
//!
//! - [`NameResolver`]: maps source table/column names to target names
//! - [`ReferenceResolver`]: finalizes cross-table references once every
//!   table has been converted
//!
//! Default implementations live in [`crate::names::NameMapper`] and
//! [`crate::orchestrator::ForeignKeyResolver`].

use crate::error::Result;
use crate::target::TargetSchema;

use super::issues::Diagnostics;

/// Maps source identifiers to target identifiers.
///
/// Failures are not fatal to a conversion run: the engine drops the entity
/// that needed the name and records a diagnostic.
pub trait NameResolver {
    /// Target name for a source table.
    fn resolve_table(&mut self, src_table: &str) -> Result<String>;

    /// Target name for a column of a source table.
    ///
    /// `is_key_column` is set when the column is referenced from a primary
    /// key, foreign key or index; such columns must already be known to the
    /// resolver, and an unknown one is an error rather than a new mapping.
    fn resolve_column(
        &mut self,
        src_table: &str,
        src_column: &str,
        is_key_column: bool,
    ) -> Result<String>;
}

/// Resolves references left symbolic after the per-table pass.
///
/// Invoked exactly once per run, on the fully assembled target schema.
pub trait ReferenceResolver {
    /// Fix up `schema` in place, reporting anything that had to be dropped.
    fn resolve(&mut self, schema: &mut TargetSchema, diagnostics: &mut Diagnostics);
}

/// Reference resolver that leaves the schema untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl ReferenceResolver for NoopResolver {
    fn resolve(&mut self, _schema: &mut TargetSchema, _diagnostics: &mut Diagnostics) {}
}
