//! Target identifier handling: sanitising source names into legal Spanner
//! identifiers and allocating collision-free names in the shared namespace.
//!
//! # Namespace
//!
//! Spanner uses a single namespace for table names, foreign key constraint
//! names and index names: an index cannot share a name with a table or with
//! a foreign key. [`Namespace`] tracks every name handed out during one
//! conversion run so that each allocation is unique at the moment it is made
//! and stays unique for the rest of the run. Names are never released.
//!
//! Spanner identifiers are case-insensitive, so `Orders` and `orders`
//! collide. The namespace compares lowercased names but hands back the
//! caller's spelling.

use std::collections::HashSet;

use crate::error::{ConvertError, Result};

/// Maximum identifier length accepted by Spanner.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Set of identifiers already used by tables, foreign keys and indexes.
///
/// Create one per conversion run; never share it between runs.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    used: HashSet<String>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` (compared case-insensitively) is already taken.
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }

    /// Mark `name` as taken without deriving an alternative.
    ///
    /// Returns `false` if the name was already present. Used to pre-seed the
    /// namespace with resolved table names.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.used.insert(name.to_lowercase())
    }

    /// Resolve `candidate` to a name not yet in the namespace and record it.
    ///
    /// An unused candidate is returned unchanged. Otherwise `_2`, `_3`, ...
    /// are appended until a free name is found, shortening the candidate so
    /// the result stays within [`MAX_IDENTIFIER_LENGTH`].
    pub fn allocate(&mut self, candidate: &str) -> String {
        let mut name = candidate.to_string();
        let mut suffix = 2;
        while self.contains(&name) {
            let tail = format!("_{}", suffix);
            let room = MAX_IDENTIFIER_LENGTH.saturating_sub(tail.len());
            name = format!("{}{}", truncate_chars(candidate, room), tail);
            suffix += 1;
        }
        self.reserve(&name);
        name
    }

    /// Number of names in the namespace.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether no names have been recorded.
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

/// Longest prefix of `s` holding at most `max` characters.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Map a source identifier to a legal Spanner identifier.
///
/// Spanner identifiers must start with a letter and contain only ASCII
/// letters, digits and underscores. Other characters become `_`, a name
/// that does not start with a letter is prefixed with `A`, and overlong
/// names are cut to [`MAX_IDENTIFIER_LENGTH`].
///
/// Returns the fixed name and whether it differs from the input.
///
/// # Errors
///
/// Returns `ConvertError::InvalidIdentifier` for an empty name.
pub fn fix_name(name: &str) -> Result<(String, bool)> {
    if name.is_empty() {
        return Err(ConvertError::InvalidIdentifier(name.to_string()));
    }

    let mut fixed: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if !fixed.starts_with(|c: char| c.is_ascii_alphabetic()) {
        fixed.insert(0, 'A');
    }
    // Only ASCII remains, so byte truncation is safe.
    fixed.truncate(MAX_IDENTIFIER_LENGTH);

    let changed = fixed != name;
    Ok((fixed, changed))
}

/// Quote `s` unless every character is a letter, digit or punctuation.
///
/// Used to make source names readable in provenance comments.
pub fn quote_if_needed(s: &str) -> String {
    if s
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_ascii_punctuation())
    {
        s.to_string()
    } else {
        format!("{:?}", s)
    }
}
