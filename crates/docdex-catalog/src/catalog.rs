//! Flat document catalog keyed by breadcrumb path.

use std::collections::HashMap;

/// Separator between breadcrumb segments in a catalog path.
pub const PATH_SEPARATOR: &str = " / ";

/// One indexed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Breadcrumb path (e.g. `"Language Reference / Symbols / Iota"`). Unique.
    pub path: String,
    /// Source file relative to the tree root.
    pub file: String,
    /// Extracted or breadcrumb-derived title.
    pub title: String,
    /// Space-joined search keywords, possibly empty.
    pub keywords: String,
    /// Cleaned body text.
    pub content: String,
    /// True for disambiguation pages recovered outside the navigation.
    pub excluded: bool,
}

/// Ordered collection of entries with unique paths.
///
/// Insertion order is preserved. When two entries share a path the first one
/// wins and the later one is rejected.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_path: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry unless its path is already taken.
    ///
    /// Returns `false` if the entry was dropped as a duplicate.
    pub fn insert(&mut self, entry: CatalogEntry) -> bool {
        if self.by_path.contains_key(&entry.path) {
            return false;
        }
        self.by_path.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Look up an entry by path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.by_path.get(path).map(|&idx| &self.entries[idx])
    }

    /// Check whether a path is taken.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of excluded (disambiguation) entries.
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.excluded).count()
    }

    /// Consume the catalog, returning its entries in insertion order.
    #[must_use]
    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
