//! Navigation configuration model and loading.
//!
//! A site is described by an mkdocs-style YAML file with three keys the
//! indexer cares about:
//!
//! - `site_name` - display name of the site (optional)
//! - `docs_dir` - document root, relative to the config file (optional)
//! - `nav` - ordered navigation tree
//!
//! Every other key is ignored. The raw `nav` value is converted once, at load
//! time, into a tree of [`NavNode`] values so the walker never has to branch on
//! YAML shapes.
//!
//! # Navigation shapes
//!
//! ```yaml
//! nav:
//!   - index.md                              # Leaf
//!   - Guide: guide.md                       # Section("Guide", [Leaf])
//!   - Reference:                            # Section("Reference", [...])
//!       - api.md
//!       - Types: types.md
//!   - Language: '!include ./lang/mkdocs.yml' # Section("Language", [Inclusion])
//!   - Tools: !include ./tools/mkdocs.yml     # tagged form, same result
//! ```

use std::path::{Path, PathBuf};

use serde_yaml::Value;

/// Prefix marking a string value as a sub-site inclusion.
const INCLUDE_PREFIX: &str = "!include ";

/// YAML tag marking a scalar as a sub-site inclusion.
const INCLUDE_TAG: &str = "include";

/// One node of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    /// Reference to a document, relative to the site's document root.
    Leaf(String),
    /// Titled group. The title becomes a breadcrumb segment for every descendant.
    Section {
        title: String,
        children: Vec<NavNode>,
    },
    /// Reference to another navigation config, relative to the tree root.
    Inclusion(String),
}

/// Parsed navigation configuration for one site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavConfig {
    /// Site display name.
    pub site_name: Option<String>,
    /// Document root directory name, relative to the config file.
    pub docs_dir: Option<String>,
    /// Navigation tree in declared order.
    pub nav: Vec<NavNode>,
}

/// Navigation config loading error.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid YAML.
    #[error("invalid YAML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// Config file is valid YAML but not a navigation config.
    #[error("{}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

impl NavConfig {
    /// Load a navigation config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not hold a YAML mapping.
    pub fn load(path: &Path) -> Result<Self, NavError> {
        let content = std::fs::read_to_string(path).map_err(|source| NavError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    /// Parse a navigation config from YAML text.
    ///
    /// `path` is only used for error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not YAML or its root is not a mapping.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, NavError> {
        let root: Value = serde_yaml::from_str(content).map_err(|source| NavError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let Value::Mapping(map) = root else {
            return Err(NavError::Invalid {
                path: path.to_path_buf(),
                message: "expected a mapping at the top level".to_owned(),
            });
        };

        let mut nav = Vec::new();
        if let Some(items) = map.get("nav") {
            collect_nodes(items, &mut nav);
        }

        Ok(Self {
            site_name: map.get("site_name").and_then(scalar_text),
            docs_dir: map.get("docs_dir").and_then(scalar_text),
            nav,
        })
    }

    /// Document root name, or `default` when the config does not set one.
    #[must_use]
    pub fn docs_dir_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.docs_dir.as_deref() {
            Some(dir) if !dir.is_empty() => dir,
            _ => default,
        }
    }
}

/// Source of navigation configs.
///
/// The walker asks its loader for every config it meets, so tests can swap in
/// an in-memory implementation.
pub trait NavLoader {
    /// Load the config stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is missing or malformed.
    fn load(&self, path: &Path) -> Result<NavConfig, NavError>;
}

/// Loads navigation configs from YAML files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlNavLoader;

impl NavLoader for YamlNavLoader {
    fn load(&self, path: &Path) -> Result<NavConfig, NavError> {
        NavConfig::load(path)
    }
}

/// Convert a raw YAML navigation value into nodes, appending to `out`.
fn collect_nodes(value: &Value, out: &mut Vec<NavNode>) {
    match value {
        Value::String(s) => match include_target(s) {
            Some(target) => out.push(NavNode::Inclusion(target.to_owned())),
            None => out.push(NavNode::Leaf(s.clone())),
        },
        Value::Tagged(tagged) if is_include_tag(&tagged.tag) => {
            if let Some(target) = scalar_text(&tagged.value) {
                out.push(NavNode::Inclusion(target.trim().to_owned()));
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect_nodes(item, out);
            }
        }
        Value::Mapping(map) => {
            for (key, child) in map {
                let Some(title) = scalar_text(key) else {
                    continue;
                };
                let mut children = Vec::new();
                collect_nodes(child, &mut children);
                if !children.is_empty() {
                    out.push(NavNode::Section { title, children });
                }
            }
        }
        // Null, numbers and booleans carry no navigation
        _ => {}
    }
}

/// Return the config path of an `!include <path>` string.
fn include_target(value: &str) -> Option<&str> {
    value
        .strip_prefix(INCLUDE_PREFIX)
        .map(str::trim)
        .filter(|target| !target.is_empty())
}

fn is_include_tag(tag: &serde_yaml::value::Tag) -> bool {
    tag.to_string().trim_start_matches('!') == INCLUDE_TAG
}

/// Render a YAML scalar as text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
