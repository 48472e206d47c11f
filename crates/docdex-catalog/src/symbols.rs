//! Symbol-to-document association.
//!
//! External tools publish a list of `(symbol, url)` pairs where `url` is a
//! normalized document location such as `"language-reference-guide/symbols/iota"`.
//! [`SymbolMatcher`] resolves each pair against the catalog in two passes:
//!
//! 1. **Recovery** - locations that match nothing are looked up on disk. A
//!    document found there (typically a disambiguation page missing from every
//!    navigation tree) is added to the catalog as an excluded entry.
//! 2. **Matching** - every pair is matched against the [`PathIndex`], and the
//!    first match per symbol becomes a [`SymbolAssociation`].

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::CatalogOptions;
use crate::catalog::{Catalog, CatalogEntry, PATH_SEPARATOR};
use crate::nav::NavConfig;
use crate::normalize::normalize_document;
use crate::paths::{PathNormalizer, SiteRoots, clean_path, relative_file};

/// One record of the external symbol list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolRef {
    /// Symbol or keyword (e.g. `"⍳"`).
    pub symbol: String,
    /// Normalized document location (e.g. `"language-reference-guide/symbols/iota"`).
    pub url: String,
}

/// A symbol resolved to a catalog path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolAssociation {
    pub symbol: String,
    /// Path of an existing [`CatalogEntry`].
    pub path: String,
}

/// Symbol list loading error.
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid symbol list {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSON array of `{"symbol": ..., "url": ...}` records.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid symbol list.
pub fn load_symbol_refs(path: &Path) -> Result<Vec<SymbolRef>, SymbolError> {
    let content = fs::read_to_string(path).map_err(|source| SymbolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SymbolError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Which lookup rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Location matched exactly.
    Exact,
    /// Location matched with `/index` appended.
    Index,
    /// Location matched the tail of an indexed location.
    Suffix,
}

/// Normalized document locations mapped to catalog paths.
///
/// Ordered by location, so suffix scans resolve ties to the lexicographically
/// smallest location.
#[derive(Debug, Default)]
pub struct PathIndex {
    locations: BTreeMap<String, String>,
}

impl PathIndex {
    /// Index every catalog entry by its normalized file location.
    ///
    /// When two entries share a location, the first one is kept.
    #[must_use]
    pub fn build(catalog: &Catalog, normalizer: &PathNormalizer) -> Self {
        let mut index = Self::default();
        for entry in catalog {
            index.insert(normalizer.normalize(&entry.file), entry.path.clone());
        }
        index
    }

    /// Map `location` to a catalog path unless it is already indexed.
    ///
    /// Returns `false` if the location was taken.
    pub fn insert(&mut self, location: String, path: String) -> bool {
        match self.locations.entry(location) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(path);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Resolve a reference location to a catalog path.
    ///
    /// Tries, in order: exact location, location + `/index`, then any indexed
    /// location ending with `/` + location.
    #[must_use]
    pub fn lookup(&self, reference: &str) -> Option<(&str, MatchTier)> {
        if let Some(path) = self.locations.get(reference) {
            return Some((path, MatchTier::Exact));
        }
        if let Some(path) = self.locations.get(&format!("{reference}/index")) {
            return Some((path, MatchTier::Index));
        }

        let suffix = format!("/{reference}");
        self.locations
            .iter()
            .find(|(location, _)| location.ends_with(&suffix))
            .map(|(_, path)| (path.as_str(), MatchTier::Suffix))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Counts collected while resolving a symbol list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Records in the symbol list.
    pub parsed: usize,
    /// Disambiguation pages added to the catalog.
    pub recovered: usize,
    /// Symbols associated with a catalog entry.
    pub matched: usize,
    /// Records whose location matched nothing.
    pub unmatched: usize,
    /// Records skipped because their symbol was already associated.
    pub duplicate_symbols: usize,
    /// Pages found on disk but dropped because their catalog path was taken.
    pub path_collisions: usize,
}

/// Resolves symbol lists against a catalog.
pub struct SymbolMatcher<'a> {
    tree_root: PathBuf,
    options: &'a CatalogOptions,
    normalizer: PathNormalizer,
}

impl<'a> SymbolMatcher<'a> {
    /// Create a matcher for the tree rooted at `tree_root`.
    #[must_use]
    pub fn new(tree_root: &Path, options: &'a CatalogOptions) -> Self {
        Self {
            tree_root: clean_path(tree_root),
            options,
            normalizer: options.path_normalizer(),
        }
    }

    /// Use the document roots recorded while walking the tree.
    #[must_use]
    pub fn with_sites(self, sites: SiteRoots) -> Self {
        let normalizer = self.normalizer.with_sites(sites);
        Self { normalizer, ..self }
    }

    /// Recover missing documents, then associate every symbol.
    ///
    /// Recovered documents are appended to `catalog`.
    pub fn resolve(
        &self,
        catalog: &mut Catalog,
        refs: &[SymbolRef],
    ) -> (Vec<SymbolAssociation>, MatchReport) {
        let mut index = PathIndex::build(catalog, &self.normalizer);
        let mut report = MatchReport {
            parsed: refs.len(),
            ..MatchReport::default()
        };

        self.recover(catalog, &mut index, refs, &mut report);
        let associations = associate(&index, refs, &mut report);

        tracing::info!(
            parsed = report.parsed,
            recovered = report.recovered,
            matched = report.matched,
            unmatched = report.unmatched,
            path_collisions = report.path_collisions,
            "Symbol list resolved"
        );

        (associations, report)
    }

    /// Add on-disk documents for locations the index cannot resolve.
    ///
    /// Updates `recovered` and `path_collisions` in `report`.
    pub fn recover(
        &self,
        catalog: &mut Catalog,
        index: &mut PathIndex,
        refs: &[SymbolRef],
        report: &mut MatchReport,
    ) {
        for symbol_ref in refs {
            if index.lookup(&symbol_ref.url).is_some() {
                continue;
            }
            let Some(entry) = self.find_orphan(&symbol_ref.url) else {
                continue;
            };

            let path = entry.path.clone();
            let file = entry.file.clone();
            if !catalog.insert(entry) {
                tracing::warn!(url = %symbol_ref.url, path = %path, file = %file, "Dropping recovered page with duplicate path");
                report.path_collisions += 1;
                continue;
            }
            // The file was found from the location itself, so index it there.
            index.insert(symbol_ref.url.clone(), path);
            report.recovered += 1;
        }
    }

    /// Read the document behind a location missing from every navigation tree.
    ///
    /// The first segment names the sub-site; the rest is looked up under that
    /// sub-site's document root as `<rest>.<ext>` then `<rest>/index.<ext>`.
    fn find_orphan(&self, url: &str) -> Option<CatalogEntry> {
        let (site, rest) = url.split_once('/')?;
        if site.is_empty() || rest.is_empty() {
            return None;
        }

        let docs_dir = self.site_docs_root(site);
        let extension = &self.options.extension;
        let candidates = [
            docs_dir.join(format!("{rest}.{extension}")),
            docs_dir.join(rest).join(format!("index.{extension}")),
        ];

        candidates.iter().find_map(|candidate| {
            let candidate = clean_path(candidate);
            let raw = fs::read(&candidate).ok()?;
            let doc = normalize_document(&String::from_utf8_lossy(&raw));
            let title = if doc.title.is_empty() {
                url.rsplit('/').next().unwrap_or(url).to_owned()
            } else {
                doc.title
            };

            tracing::debug!(url, file = %candidate.display(), "Recovered disambiguation page");
            Some(CatalogEntry {
                path: breadcrumb_from_url(url),
                file: relative_file(&self.tree_root, &candidate),
                title,
                keywords: doc.keywords,
                content: doc.content,
                excluded: true,
            })
        })
    }

    /// Document root of a sub-site.
    ///
    /// Uses the root recorded during the walk, then the sub-site's own nav
    /// config, then the default `docs_dir`.
    fn site_docs_root(&self, site: &str) -> PathBuf {
        if let Some(root) = self.normalizer.sites().docs_root(site) {
            return self.tree_root.join(root);
        }
        let site_dir = self.tree_root.join(site);
        match NavConfig::load(&site_dir.join(&self.options.nav_file)) {
            Ok(config) => site_dir.join(config.docs_dir_or(&self.options.docs_dir)),
            Err(_) => site_dir.join(&self.options.docs_dir),
        }
    }
}

/// Associate each symbol with the first location that resolves.
fn associate(
    index: &PathIndex,
    refs: &[SymbolRef],
    report: &mut MatchReport,
) -> Vec<SymbolAssociation> {
    let mut associated: HashSet<&str> = HashSet::new();
    let mut associations = Vec::new();

    for symbol_ref in refs {
        if associated.contains(symbol_ref.symbol.as_str()) {
            report.duplicate_symbols += 1;
            continue;
        }
        match index.lookup(&symbol_ref.url) {
            Some((path, tier)) => {
                tracing::debug!(symbol = %symbol_ref.symbol, path, ?tier, "Symbol matched");
                associated.insert(&symbol_ref.symbol);
                associations.push(SymbolAssociation {
                    symbol: symbol_ref.symbol.clone(),
                    path: path.to_owned(),
                });
                report.matched += 1;
            }
            None => {
                tracing::debug!(symbol = %symbol_ref.symbol, url = %symbol_ref.url, "Symbol unmatched");
                report.unmatched += 1;
            }
        }
    }

    associations
}

/// Build a readable catalog path from a location.
///
/// `"language-reference-guide/symbols/iota"` -> `"Language Reference Guide / Symbols / Iota"`
fn breadcrumb_from_url(url: &str) -> String {
    url.split('/')
        .map(titlecase_from_slug)
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// Capitalize each hyphen-separated word of a slug, joined by spaces.
fn titlecase_from_slug(slug: &str) -> String {
    let mut result = String::with_capacity(slug.len());
    for word in slug.split('-').filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        capitalize_first_into(word, &mut result);
    }
    result
}

/// Capitalize the first character of a word, appending to `buf`.
fn capitalize_first_into(word: &str, buf: &mut String) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        buf.extend(first.to_uppercase());
        buf.push_str(chars.as_str());
    }
}
