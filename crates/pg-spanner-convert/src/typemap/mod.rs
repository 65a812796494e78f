//! Type mapping from PostgreSQL to Spanner.
//!
//! The base mapping is a lookup table keyed by lowercase PostgreSQL type
//! identifier (synonyms share one rule), built once on first use. Unknown
//! identifiers map to `STRING(MAX)` with a
//! [`ConversionIssue::NoGoodTypeMatch`] issue instead of failing.
//!
//! After the base mapping, [`PostgresToSpannerMapper::map_column`] applies
//! the dialect post-processing rule for array dimensionality and adds issues
//! for column features the target cannot express.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::TargetDialect;
use crate::core::issues::ConversionIssue;
use crate::core::schema::{IgnoredFeatures, SourceColumn, SourceType};
use crate::target::{Length, TargetType, TypeName};

/// Result of mapping a source type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type.
    pub ty: TargetType,
    /// Issues found, in the order they were found.
    pub issues: Vec<ConversionIssue>,
}

impl TypeMapping {
    /// Create a lossless type mapping.
    pub fn lossless(ty: TargetType) -> Self {
        Self {
            ty,
            issues: Vec::new(),
        }
    }

    /// Create a type mapping with one issue.
    pub fn lossy(ty: TargetType, issue: ConversionIssue) -> Self {
        Self {
            ty,
            issues: vec![issue],
        }
    }

    /// Whether this mapping loses data, precision or behavior.
    pub fn is_lossy(&self) -> bool {
        !self.issues.is_empty()
    }

    fn push_issue(&mut self, issue: ConversionIssue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }
}

/// How the target length is derived.
#[derive(Debug, Clone, Copy)]
enum LengthRule {
    /// Type has no length.
    None,
    /// Always unbounded.
    Max,
    /// First modifier if present, otherwise the default.
    FromMods(Length),
}

/// One row of the mapping table.
#[derive(Debug, Clone, Copy)]
struct TypeRule {
    target: TypeName,
    length: LengthRule,
    issue: Option<ConversionIssue>,
}

impl TypeRule {
    const fn new(target: TypeName, length: LengthRule, issue: Option<ConversionIssue>) -> Self {
        Self {
            target,
            length,
            issue,
        }
    }

    fn apply(&self, mods: &[i64]) -> TypeMapping {
        let len = match self.length {
            LengthRule::None => None,
            LengthRule::Max => Some(Length::Max),
            LengthRule::FromMods(default) => Some(
                mods.first()
                    .map(|&n| Length::Limit(n))
                    .unwrap_or(default),
            ),
        };
        let ty = TargetType {
            name: self.target,
            len,
            is_array: false,
        };
        match self.issue {
            Some(issue) => TypeMapping::lossy(ty, issue),
            None => TypeMapping::lossless(ty),
        }
    }
}

/// PostgreSQL identifiers (with synonyms) and their rule.
const TYPE_RULES: &[(&[&str], TypeRule)] = &[
    (
        &["bool", "boolean"],
        TypeRule::new(TypeName::Bool, LengthRule::None, None),
    ),
    (
        &["bigserial"],
        TypeRule::new(TypeName::Int64, LengthRule::None, Some(ConversionIssue::Serial)),
    ),
    (
        &["serial"],
        TypeRule::new(TypeName::Int64, LengthRule::None, Some(ConversionIssue::Serial)),
    ),
    // bpchar is PostgreSQL's internal name for char; bare char means char(1)
    (
        &["char", "bpchar", "character"],
        TypeRule::new(
            TypeName::String,
            LengthRule::FromMods(Length::Limit(1)),
            None,
        ),
    ),
    (
        &["bytea"],
        TypeRule::new(TypeName::Bytes, LengthRule::Max, None),
    ),
    (
        &["date"],
        TypeRule::new(TypeName::Date, LengthRule::None, None),
    ),
    (
        &["float8", "double precision"],
        TypeRule::new(TypeName::Float64, LengthRule::None, None),
    ),
    (
        &["float4", "real"],
        TypeRule::new(TypeName::Float64, LengthRule::None, Some(ConversionIssue::Widened)),
    ),
    (
        &["int8", "bigint"],
        TypeRule::new(TypeName::Int64, LengthRule::None, None),
    ),
    (
        &["int4", "integer"],
        TypeRule::new(TypeName::Int64, LengthRule::None, Some(ConversionIssue::Widened)),
    ),
    (
        &["int2", "smallint"],
        TypeRule::new(TypeName::Int64, LengthRule::None, Some(ConversionIssue::Widened)),
    ),
    // TODO: flag precision differences; Spanner NUMERIC is fixed at (38,9)
    (
        &["numeric"],
        TypeRule::new(TypeName::Numeric, LengthRule::None, None),
    ),
    (
        &["text"],
        TypeRule::new(TypeName::String, LengthRule::Max, None),
    ),
    (
        &["timestamptz", "timestamp with time zone"],
        TypeRule::new(TypeName::Timestamp, LengthRule::None, None),
    ),
    (
        &["timestamp", "timestamp without time zone"],
        TypeRule::new(
            TypeName::Timestamp,
            LengthRule::None,
            Some(ConversionIssue::Timestamp),
        ),
    ),
    (
        &["varchar", "character varying"],
        TypeRule::new(TypeName::String, LengthRule::FromMods(Length::Max), None),
    ),
];

static TYPE_TABLE: LazyLock<HashMap<&'static str, TypeRule>> = LazyLock::new(|| {
    TYPE_RULES
        .iter()
        .flat_map(|(names, rule)| names.iter().map(move |name| (*name, *rule)))
        .collect()
});

/// Normalize a type identifier: lowercase, single spaces.
fn normalize(id: &str) -> String {
    id.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map a PostgreSQL scalar type (identifier and modifiers) to a Spanner type.
///
/// Pure and total: unknown identifiers yield `STRING(MAX)` with a
/// `NoGoodTypeMatch` issue. Array dimensionality is not considered here.
pub fn map_type(id: &str, mods: &[i64]) -> TypeMapping {
    match TYPE_TABLE.get(normalize(id).as_str()) {
        Some(rule) => rule.apply(mods),
        None => TypeMapping::lossy(TargetType::string_max(), ConversionIssue::NoGoodTypeMatch),
    }
}

/// Issues for column features that are dropped regardless of type.
pub fn ignored_feature_issues(ignored: &IgnoredFeatures) -> Vec<ConversionIssue> {
    let mut issues = Vec::new();
    if ignored.foreign_key {
        issues.push(ConversionIssue::ForeignKeyDropped);
    }
    if ignored.default {
        issues.push(ConversionIssue::DefaultValueDropped);
    }
    issues
}

/// PostgreSQL → Spanner column mapper for one target dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresToSpannerMapper {
    dialect: TargetDialect,
}

impl PostgresToSpannerMapper {
    /// Create a mapper for the given target dialect.
    pub fn new(dialect: TargetDialect) -> Self {
        Self { dialect }
    }

    /// Target dialect this mapper post-processes for.
    pub fn dialect(&self) -> TargetDialect {
        self.dialect
    }

    /// Map a source type including its array dimensionality.
    pub fn map_source_type(&self, ty: &SourceType) -> TypeMapping {
        let mapping = map_type(&ty.name, &ty.mods);
        match self.dialect {
            TargetDialect::Spanner => apply_spanner_arrays(ty, mapping),
            TargetDialect::ExperimentalPostgres => apply_experimental_overrides(ty, mapping),
        }
    }

    /// Map a source column: type, dialect rule and dropped features.
    pub fn map_column(&self, col: &SourceColumn) -> TypeMapping {
        let mut mapping = self.map_source_type(&col.ty);
        mapping.issues.extend(ignored_feature_issues(&col.ignored));
        mapping
    }
}

/// Spanner supports only one-dimensional arrays.
fn apply_spanner_arrays(ty: &SourceType, mut mapping: TypeMapping) -> TypeMapping {
    if ty.array_dims > 1 {
        mapping.ty = TargetType::string_max();
        mapping.push_issue(ConversionIssue::MultiDimensionalArray);
    } else {
        mapping.ty.is_array = ty.array_dims == 1;
    }
    mapping
}

/// The experimental variant has no NUMERIC, DATE or ARRAY support; such
/// columns are stored as strings. Never sets the array flag.
fn apply_experimental_overrides(ty: &SourceType, mut mapping: TypeMapping) -> TypeMapping {
    if matches!(mapping.ty.name, TypeName::Numeric | TypeName::Date) {
        mapping.ty = TargetType::string_max();
        mapping.push_issue(ConversionIssue::NoGoodTypeMatch);
    }
    if ty.is_array() {
        mapping.ty = TargetType::string_max();
        if ty.array_dims > 1 {
            mapping.push_issue(ConversionIssue::MultiDimensionalArray);
        } else {
            mapping.push_issue(ConversionIssue::NoGoodTypeMatch);
        }
    }
    mapping
}
