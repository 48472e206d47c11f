//! Documentation catalog builder for docdex.
//!
//! Turns an mkdocs-style documentation tree (a "monorepo" of sub-sites joined
//! with `!include` directives) into a flat [`Catalog`] of documents keyed by
//! their navigation breadcrumb, and resolves external symbol lists against it.
//!
//! # Pipeline
//!
//! 1. [`build_catalog`] loads the root navigation config and runs a [`Walker`]
//!    over it, normalizing every referenced document ([`normalize_document`]).
//! 2. [`SymbolMatcher::resolve`] indexes the catalog by normalized location,
//!    recovers documents referenced by the symbol list but missing from every
//!    navigation tree, and produces [`SymbolAssociation`]s.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use docdex_catalog::{CatalogOptions, SymbolMatcher, build_catalog, load_symbol_refs};
//!
//! let root = Path::new("documentation");
//! let options = CatalogOptions::default();
//! let mut build = build_catalog(root, &options)?;
//!
//! let refs = load_symbol_refs(Path::new("symbol-urls.json"))?;
//! let (associations, _) = SymbolMatcher::new(root, &options)
//!     .with_sites(build.sites.clone())
//!     .resolve(&mut build.catalog, &refs);
//! ```

mod catalog;
mod nav;
mod normalize;
mod paths;
mod symbols;
mod walker;

use std::path::Path;

pub use catalog::{Catalog, CatalogEntry, PATH_SEPARATOR};
pub use nav::{NavConfig, NavError, NavLoader, NavNode, YamlNavLoader};
pub use normalize::{
    NormalizedDocument, clean_markup, extract_keywords, extract_title, normalize_document,
    strip_front_matter,
};
pub use paths::{PathNormalizer, SiteRoots};
pub use symbols::{
    MatchReport, MatchTier, PathIndex, SymbolAssociation, SymbolError, SymbolMatcher, SymbolRef,
    load_symbol_refs,
};
pub use walker::{Breadcrumb, WalkReport, Walker};

/// Default navigation config filename.
pub const DEFAULT_NAV_FILE: &str = "mkdocs.yml";

/// Default document root directory name.
pub const DEFAULT_DOCS_DIR: &str = "docs";

/// Default document file extension.
pub const DEFAULT_EXTENSION: &str = "md";

/// Layout conventions of the documentation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Navigation config filename at the tree root.
    pub nav_file: String,
    /// Document root used when a config does not set `docs_dir`.
    pub docs_dir: String,
    /// Document file extension, without the dot.
    pub extension: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            nav_file: DEFAULT_NAV_FILE.to_owned(),
            docs_dir: DEFAULT_DOCS_DIR.to_owned(),
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }
}

impl CatalogOptions {
    /// Check whether a navigation reference points at a local document.
    ///
    /// External links and files with other extensions are not documents.
    #[must_use]
    pub fn is_document(&self, reference: &str) -> bool {
        !reference.contains("://")
            && reference
                .strip_suffix(self.extension.as_str())
                .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
    }

    /// Path normalizer for this layout.
    #[must_use]
    pub fn path_normalizer(&self) -> PathNormalizer {
        PathNormalizer::new(&self.docs_dir, &self.extension)
    }
}

/// Catalog build error.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The root navigation config is missing or malformed.
    #[error("cannot load root navigation config: {0}")]
    RootConfig(#[from] NavError),
}

/// Result of walking a documentation tree.
#[derive(Debug)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub report: WalkReport,
    /// Document root of every site walked, for symbol matching.
    pub sites: SiteRoots,
}

/// Build the catalog of the tree rooted at `tree_root` from YAML configs on disk.
///
/// # Errors
///
/// Returns an error if the root navigation config cannot be loaded. Problems
/// with individual documents or included sites are logged and skipped.
pub fn build_catalog(tree_root: &Path, options: &CatalogOptions) -> Result<CatalogBuild, CatalogError> {
    build_catalog_with(tree_root, options, &YamlNavLoader)
}

/// Build the catalog using a custom config loader.
///
/// # Errors
///
/// Returns an error if the root navigation config cannot be loaded.
pub fn build_catalog_with(
    tree_root: &Path,
    options: &CatalogOptions,
    loader: &dyn NavLoader,
) -> Result<CatalogBuild, CatalogError> {
    let config_path = tree_root.join(&options.nav_file);
    let config = loader.load(&config_path)?;

    let mut walker = Walker::new(tree_root, options, loader);
    walker.walk_site(&config_path, &config, &Breadcrumb::new());
    let build = walker.finish();
    let report = &build.report;

    tracing::info!(
        documents = report.documents,
        ignored = report.ignored,
        unreadable = report.unreadable,
        failed_includes = report.failed_includes,
        cyclic_includes = report.cyclic_includes,
        duplicates = report.duplicates,
        sites = build.sites.len(),
        "Catalog built"
    );

    Ok(build)
}
