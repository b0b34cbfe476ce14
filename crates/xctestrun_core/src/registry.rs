//! Shareable metadata for the vocabulary registries.
//!
//! Each registry (SDKs, test types, exit codes) is a `const` table of [`VocabInfo`] entries keyed by a
//! `Copy` identifier. Lookups go through [`lookup`] and [`find`] so every registry resolves spellings the same way.

/// Metadata entry for one vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabInfo<Id: 'static> {
    /// Stable identifier.
    pub id: Id,
    /// Canonical spelling, as accepted on the command line and written in diagnostics.
    pub canonical: &'static str,
    /// Alternate spellings accepted on input.
    pub aliases: &'static [&'static str],
    /// One-line description for help output.
    pub description: &'static str,
}

/// Resolve a spelling (canonical first, then aliases) to its identifier.
pub fn lookup<Id: Copy>(table: &'static [VocabInfo<Id>], name: &str) -> Option<Id> {
    if let Some(info) = table.iter().find(|i| i.canonical == name) {
        return Some(info.id);
    }
    table.iter().find(|i| i.aliases.contains(&name)).map(|i| i.id)
}

/// Return the metadata entry for `id`.
///
/// ## Returns
/// - `None` only if the table is missing an entry for `id`, which the registry guardrail tests rule out.
pub fn find<Id: Copy + PartialEq>(table: &'static [VocabInfo<Id>], id: Id) -> Option<&'static VocabInfo<Id>> {
    table.iter().find(|i| i.id == id)
}

/// Join the canonical spellings of a table, for "supported values are ..." messages.
pub fn canonical_list<Id>(table: &'static [VocabInfo<Id>]) -> String {
    table.iter().map(|i| i.canonical).collect::<Vec<_>>().join(", ")
}
