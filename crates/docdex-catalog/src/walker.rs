//! Navigation tree walking.
//!
//! [`Walker`] flattens a (possibly multi-site) navigation tree into a
//! [`Catalog`]. Traversal is depth-first in declared order:
//!
//! - a leaf becomes one entry, keyed by the breadcrumb of section titles above it
//! - a section extends the breadcrumb for its children
//! - an inclusion loads another site config and continues with that site's
//!   document root, keeping the current breadcrumb
//!
//! Problems local to one document or one included site are logged, counted in
//! the [`WalkReport`] and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogEntry, PATH_SEPARATOR};
use crate::nav::{NavConfig, NavLoader, NavNode};
use crate::normalize::normalize_document;
use crate::paths::{SiteRoots, clean_path, relative_file};
use crate::{CatalogBuild, CatalogOptions};

/// Ordered section titles from the root to the current node.
///
/// Extending a breadcrumb produces a new value, so sibling branches never see
/// each other's segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumb {
    segments: Vec<String>,
}

impl Breadcrumb {
    /// Empty breadcrumb (tree root).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this breadcrumb with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment.to_owned());
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Innermost segment.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Join the segments into a catalog path.
    #[must_use]
    pub fn to_path(&self) -> String {
        self.segments.join(PATH_SEPARATOR)
    }
}

/// Counts collected during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Documents added to the catalog.
    pub documents: usize,
    /// Leaves that do not reference a document (links, images).
    pub ignored: usize,
    /// Documents that could not be read.
    pub unreadable: usize,
    /// Included configs that could not be loaded.
    pub failed_includes: usize,
    /// Included configs already being expanded higher up the tree.
    pub cyclic_includes: usize,
    /// Documents dropped because their path was already taken.
    pub duplicates: usize,
}

/// Flattens navigation trees into catalog entries.
pub struct Walker<'a> {
    tree_root: PathBuf,
    options: &'a CatalogOptions,
    loader: &'a dyn NavLoader,
    catalog: Catalog,
    report: WalkReport,
    sites: SiteRoots,
    /// Configs currently being expanded, outermost first.
    include_chain: Vec<PathBuf>,
}

impl<'a> Walker<'a> {
    /// Create a walker for the tree rooted at `tree_root`.
    pub fn new(tree_root: &Path, options: &'a CatalogOptions, loader: &'a dyn NavLoader) -> Self {
        Self {
            tree_root: clean_path(tree_root),
            options,
            loader,
            catalog: Catalog::new(),
            report: WalkReport::default(),
            sites: SiteRoots::new(),
            include_chain: Vec::new(),
        }
    }

    /// Walk every node of a loaded site config.
    ///
    /// The site's document root is resolved next to `config_path`.
    pub fn walk_site(&mut self, config_path: &Path, config: &NavConfig, breadcrumb: &Breadcrumb) {
        let config_path = clean_path(config_path);
        let site_dir = config_path
            .parent()
            .map_or_else(|| self.tree_root.clone(), Path::to_path_buf);
        let docs_dir = clean_path(&site_dir.join(config.docs_dir_or(&self.options.docs_dir)));

        tracing::debug!(
            config = %config_path.display(),
            site_name = config.site_name.as_deref().unwrap_or_default(),
            docs_dir = %docs_dir.display(),
            "Walking site"
        );
        self.sites.insert(
            relative_file(&self.tree_root, &site_dir),
            relative_file(&self.tree_root, &docs_dir),
        );

        self.include_chain.push(config_path);
        for node in &config.nav {
            self.walk(node, &docs_dir, breadcrumb);
        }
        self.include_chain.pop();
    }

    /// Walk one navigation node.
    pub fn walk(&mut self, node: &NavNode, docs_dir: &Path, breadcrumb: &Breadcrumb) {
        match node {
            NavNode::Leaf(reference) => self.add_document(reference, docs_dir, breadcrumb),
            NavNode::Section { title, children } => {
                let breadcrumb = breadcrumb.child(title);
                for child in children {
                    self.walk(child, docs_dir, &breadcrumb);
                }
            }
            NavNode::Inclusion(reference) => self.include(reference, breadcrumb),
        }
    }

    /// Counts collected so far.
    #[must_use]
    pub fn report(&self) -> &WalkReport {
        &self.report
    }

    /// Finish walking, returning the catalog, counts and site document roots.
    #[must_use]
    pub fn finish(self) -> CatalogBuild {
        CatalogBuild {
            catalog: self.catalog,
            report: self.report,
            sites: self.sites,
        }
    }

    fn include(&mut self, reference: &str, breadcrumb: &Breadcrumb) {
        let config_path = clean_path(&self.tree_root.join(reference));

        if self.include_chain.contains(&config_path) {
            tracing::warn!(config = %config_path.display(), "Skipping cyclic include");
            self.report.cyclic_includes += 1;
            return;
        }

        match self.loader.load(&config_path) {
            Ok(config) => self.walk_site(&config_path, &config, breadcrumb),
            Err(e) => {
                tracing::warn!(include = reference, error = %e, "Skipping include");
                self.report.failed_includes += 1;
            }
        }
    }

    fn add_document(&mut self, reference: &str, docs_dir: &Path, breadcrumb: &Breadcrumb) {
        if !self.options.is_document(reference) {
            tracing::debug!(reference, "Ignoring non-document nav entry");
            self.report.ignored += 1;
            return;
        }

        let path = if breadcrumb.is_empty() {
            reference.to_owned()
        } else {
            breadcrumb.to_path()
        };
        let source = clean_path(&docs_dir.join(reference));
        let file = relative_file(&self.tree_root, &source);

        if self.catalog.contains(&path) {
            tracing::warn!(path = %path, file = %file, "Dropping document with duplicate path");
            self.report.duplicates += 1;
            return;
        }

        let raw = match fs::read(&source) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %source.display(), error = %e, "Failed to read document");
                self.report.unreadable += 1;
                return;
            }
        };

        let doc = normalize_document(&String::from_utf8_lossy(&raw));
        let title = if doc.title.is_empty() {
            breadcrumb.last().unwrap_or_default().to_owned()
        } else {
            doc.title
        };

        tracing::debug!(path = %path, file = %file, "Adding document");
        self.catalog.insert(CatalogEntry {
            path,
            file,
            title,
            keywords: doc.keywords,
            content: doc.content,
            excluded: false,
        });
        self.report.documents += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::nav::{NavError, YamlNavLoader};
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn leaf(file: &str) -> NavNode {
        NavNode::Leaf(file.to_owned())
    }

    fn section(title: &str, children: Vec<NavNode>) -> NavNode {
        NavNode::Section {
            title: title.to_owned(),
            children,
        }
    }

    fn site(nav: Vec<NavNode>) -> NavConfig {
        NavConfig {
            site_name: None,
            docs_dir: None,
            nav,
        }
    }

    fn walk(root: &Path, config: &NavConfig) -> (Catalog, WalkReport) {
        let options = CatalogOptions::default();
        let mut walker = Walker::new(root, &options, &YamlNavLoader);
        walker.walk_site(&root.join("mkdocs.yml"), config, &Breadcrumb::new());
        let build = walker.finish();
        (build.catalog, build.report)
    }

    fn paths(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(|e| e.path.as_str()).collect()
    }

    /// In-memory loader keyed by absolute config path.
    struct MapLoader(HashMap<PathBuf, NavConfig>);

    impl NavLoader for MapLoader {
        fn load(&self, path: &Path) -> Result<NavConfig, NavError> {
            self.0.get(path).cloned().ok_or_else(|| NavError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[test]
    fn test_breadcrumb_child_leaves_parent_untouched() {
        let root = Breadcrumb::new().child("A");
        let b = root.child("B");
        let c = root.child("C");

        assert_eq!(root.segments(), ["A"]);
        assert_eq!(b.to_path(), "A / B");
        assert_eq!(c.to_path(), "A / C");
        assert_eq!(c.last(), Some("C"));
        assert!(Breadcrumb::new().is_empty());
    }

    #[test]
    fn test_counts_existing_document_leaves() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/index.md", "# Home");
        write(root, "docs/guide.md", "# Guide");

        let config = site(vec![
            leaf("index.md"),
            section("Guide", vec![leaf("guide.md")]),
            section("Missing", vec![leaf("missing.md")]),
            section("Logo", vec![leaf("img/logo.png")]),
            section("Site", vec![leaf("https://example.com/page.md")]),
        ]);
        let (catalog, report) = walk(root, &config);

        assert_eq!(paths(&catalog), vec!["index.md", "Guide"]);
        assert_eq!(report.documents, 2);
        assert_eq!(report.unreadable, 1);
        assert_eq!(report.ignored, 2);
    }

    #[test]
    fn test_sibling_breadcrumbs_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/b.md", "no heading");
        write(root, "docs/c.md", "no heading");
        write(root, "docs/d.md", "no heading");

        let config = site(vec![section(
            "A",
            vec![
                section("B", vec![leaf("b.md")]),
                section("C", vec![leaf("c.md")]),
                leaf("d.md"),
            ],
        )]);
        let (catalog, _) = walk(root, &config);

        assert_eq!(paths(&catalog), vec!["A / B", "A / C", "A"]);
    }

    #[test]
    fn test_duplicate_paths_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/one.md", "# One");
        write(root, "docs/two.md", "# Two");

        let config = site(vec![
            section("Same", vec![leaf("one.md")]),
            section("Same", vec![leaf("two.md")]),
        ]);
        let (catalog, report) = walk(root, &config);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Same").unwrap().title, "One");
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn test_title_falls_back_to_last_segment() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/page.md", "Body without heading\n");

        let config = site(vec![section("A", vec![section("B", vec![leaf("page.md")])])]);
        let (catalog, _) = walk(root, &config);

        let entry = catalog.get("A / B").unwrap();
        assert_eq!(entry.title, "B");
        assert_eq!(entry.file, "docs/page.md");
        assert!(!entry.excluded);
    }

    #[test]
    fn test_untitled_root_leaf_keeps_empty_title() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "docs/notes/readme.md", "plain\n");

        let config = site(vec![leaf("notes/readme.md")]);
        let (catalog, _) = walk(root, &config);

        // No breadcrumb to fall back on, so the title stays empty.
        let entry = catalog.get("notes/readme.md").unwrap();
        assert_eq!(entry.title, "");
        assert_eq!(entry.file, "docs/notes/readme.md");
    }

    #[test]
    fn test_entry_fields_from_document() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "docs/iota.md",
            "<div style=\"display: none\">index generator</div>\n# Iota\n\n<strong>R</strong>\n",
        );

        let config = site(vec![section("Iota", vec![leaf("iota.md")])]);
        let (catalog, _) = walk(root, &config);

        let entry = catalog.get("Iota").unwrap();
        assert_eq!(entry.title, "Iota");
        assert_eq!(entry.keywords, "index generator");
        assert_eq!(entry.content, "# Iota\n\n**R**\n");
    }

    #[test]
    fn test_inclusion_uses_subsite_docs_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "lang/mkdocs.yml",
            "site_name: Language\nnav:\n  - Symbols:\n      - Iota: symbols/iota.md\n",
        );
        write(root, "lang/docs/symbols/iota.md", "# Iota");
        write(
            root,
            "tools/mkdocs.yml",
            "docs_dir: src\nnav:\n  - Intro: intro.md\n",
        );
        write(root, "tools/src/intro.md", "# Intro");

        let config = site(vec![
            section("Language", vec![NavNode::Inclusion("./lang/mkdocs.yml".to_owned())]),
            section("Tools", vec![NavNode::Inclusion("tools/mkdocs.yml".to_owned())]),
        ]);
        let (catalog, report) = walk(root, &config);

        assert_eq!(
            paths(&catalog),
            vec!["Language / Symbols / Iota", "Tools / Intro"]
        );
        assert_eq!(
            catalog.get("Language / Symbols / Iota").unwrap().file,
            "lang/docs/symbols/iota.md"
        );
        assert_eq!(catalog.get("Tools / Intro").unwrap().file, "tools/src/intro.md");
        assert_eq!(report.failed_includes, 0);
    }

    #[test]
    fn test_nested_inclusion() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "outer/mkdocs.yml", "nav:\n  - Inner: '!include inner/mkdocs.yml'\n");
        write(root, "inner/mkdocs.yml", "nav:\n  - Page: page.md\n");
        write(root, "inner/docs/page.md", "# Deep");

        let config = site(vec![section(
            "Outer",
            vec![NavNode::Inclusion("outer/mkdocs.yml".to_owned())],
        )]);
        let (catalog, _) = walk(root, &config);

        assert_eq!(paths(&catalog), vec!["Outer / Inner / Page"]);
    }

    #[test]
    fn test_malformed_include_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "broken/mkdocs.yml", "nav: [unclosed\n");
        write(root, "docs/after.md", "# After");

        let config = site(vec![
            section("Broken", vec![NavNode::Inclusion("broken/mkdocs.yml".to_owned())]),
            section("Gone", vec![NavNode::Inclusion("gone/mkdocs.yml".to_owned())]),
            section("After", vec![leaf("after.md")]),
        ]);
        let (catalog, report) = walk(root, &config);

        assert_eq!(paths(&catalog), vec!["After"]);
        assert_eq!(report.failed_includes, 2);
    }

    #[test]
    fn test_cyclic_include_is_skipped() {
        let root = Path::new("/virtual");
        let loop_config = site(vec![section(
            "Again",
            vec![NavNode::Inclusion("loop/mkdocs.yml".to_owned())],
        )]);
        let loader = MapLoader(HashMap::from([(
            PathBuf::from("/virtual/loop/mkdocs.yml"),
            loop_config,
        )]));
        let options = CatalogOptions::default();

        let root_config = site(vec![NavNode::Inclusion("loop/mkdocs.yml".to_owned())]);
        let mut walker = Walker::new(root, &options, &loader);
        walker.walk_site(&root.join("mkdocs.yml"), &root_config, &Breadcrumb::new());
        let build = walker.finish();

        assert!(build.catalog.is_empty());
        assert_eq!(build.report.cyclic_includes, 1);
        assert_eq!(build.report.failed_includes, 0);
    }

    #[test]
    fn test_records_site_document_roots() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "lang/mkdocs.yml", "nav:\n  - Iota: iota.md\n");
        write(root, "tools/mkdocs.yml", "docs_dir: src\nnav:\n  - Intro: intro.md\n");

        let config = site(vec![
            NavNode::Inclusion("lang/mkdocs.yml".to_owned()),
            NavNode::Inclusion("./tools/mkdocs.yml".to_owned()),
        ]);
        let options = CatalogOptions::default();
        let mut walker = Walker::new(root, &options, &YamlNavLoader);
        walker.walk_site(&root.join("mkdocs.yml"), &config, &Breadcrumb::new());
        let sites = walker.finish().sites;

        assert_eq!(sites.len(), 3);
        assert_eq!(sites.docs_root(""), Some("docs"));
        assert_eq!(sites.docs_root("lang"), Some("lang/docs"));
        assert_eq!(sites.docs_root("tools"), Some("tools/src"));
    }
}
