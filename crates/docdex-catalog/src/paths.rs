//! Path arithmetic for document locations.
//!
//! Documents are identified in two ways:
//!
//! - **file** - location relative to the tree root, `/`-separated
//!   (e.g. `"language-reference-guide/docs/symbols/iota.md"`)
//! - **normalized location** - the file with document-root segments, the
//!   extension and any trailing `index` removed
//!   (e.g. `"language-reference-guide/symbols/iota"`)
//!
//! Normalized locations are what external symbol lists refer to. Each site
//! may name its own document root, so the walker records them in [`SiteRoots`].

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Document roots of the sites found during a walk.
///
/// Keys are site directories and values are document roots, both relative to
/// the tree root (`""` is the root site).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteRoots {
    roots: BTreeMap<String, String>,
}

impl SiteRoots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the document root of a site. The first record for a site wins.
    pub fn insert(&mut self, site_dir: String, docs_root: String) {
        self.roots.entry(site_dir).or_insert(docs_root);
    }

    /// Document root of the site in `site_dir`.
    #[must_use]
    pub fn docs_root(&self, site_dir: &str) -> Option<&str> {
        self.roots.get(site_dir).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Replace the longest document root containing `file` with its site directory.
    ///
    /// `"object-reference/pages/objects/form.md"` with root
    /// `"object-reference/pages"` becomes `"object-reference/objects/form.md"`.
    fn collapse(&self, file: &str) -> Option<String> {
        self.roots
            .iter()
            .filter_map(|(site_dir, docs_root)| {
                let rest = if docs_root.is_empty() {
                    file
                } else {
                    file.strip_prefix(docs_root.as_str())?.strip_prefix('/')?
                };
                Some((docs_root.len(), site_dir, rest))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, site_dir, rest)| {
                if site_dir.is_empty() {
                    rest.to_owned()
                } else {
                    format!("{site_dir}/{rest}")
                }
            })
    }
}

/// Maps document files to normalized locations.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    /// `"/docs/"` for a document root named `docs`.
    interior: String,
    /// `"docs/"` for a document root named `docs`.
    leading: String,
    /// `".md"` for the `md` extension.
    extension: String,
    /// Per-site document roots, tried before the name-based rules.
    sites: SiteRoots,
}

impl PathNormalizer {
    /// Create a normalizer for the given document root name and extension.
    #[must_use]
    pub fn new(docs_dir: &str, extension: &str) -> Self {
        Self {
            interior: format!("/{docs_dir}/"),
            leading: format!("{docs_dir}/"),
            extension: format!(".{extension}"),
            sites: SiteRoots::default(),
        }
    }

    /// Also collapse the document roots recorded for each site.
    #[must_use]
    pub fn with_sites(mut self, sites: SiteRoots) -> Self {
        self.sites = sites;
        self
    }

    /// Recorded site document roots.
    #[must_use]
    pub fn sites(&self) -> &SiteRoots {
        &self.sites
    }

    /// Normalize a tree-relative document file.
    ///
    /// Examples (document root `docs`, extension `md`):
    /// - `"site/docs/symbols/iota.md"` -> `"site/symbols/iota"`
    /// - `"site/docs/foo/index.md"` -> `"site/foo"`
    /// - `"docs/guide.md"` -> `"guide"`
    /// - `"docs/index.md"` -> `""`
    ///
    /// A file under a recorded site root loses that root first, whatever its name.
    #[must_use]
    pub fn normalize(&self, file: &str) -> String {
        let file = self.sites.collapse(file).unwrap_or_else(|| file.to_owned());
        let collapsed = file.replace(&self.interior, "/");
        let path = collapsed
            .strip_prefix(&self.leading)
            .unwrap_or(&collapsed);
        let path = path.strip_suffix(&self.extension).unwrap_or(path);
        let path = if path == "index" {
            ""
        } else {
            path.strip_suffix("/index").unwrap_or(path)
        };
        path.to_owned()
    }
}

/// Lexically resolve `.` and `..` components.
///
/// Does not touch the filesystem, so symlinks are not followed.
pub(crate) fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Express `path` relative to `root` as a `/`-separated string.
///
/// Paths outside `root` are returned whole.
pub(crate) fn relative_file(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
