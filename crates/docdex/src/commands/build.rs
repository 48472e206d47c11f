//! `docdex build` command implementation.

use std::path::PathBuf;

use clap::Args;
use docdex_catalog::{CatalogOptions, SymbolMatcher, build_catalog, load_symbol_refs};
use docdex_config::{CliSettings, Config, SourceConfig};
use docdex_store::Store;

use crate::error::CliError;
use crate::output::Output;
use crate::source::SourceTree;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover docdex.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Existing documentation tree (overrides config).
    #[arg(short, long, conflicts_with = "repo")]
    source_dir: Option<PathBuf>,

    /// Repository to clone (overrides config).
    #[arg(long, env = "DOCDEX_REPO")]
    repo: Option<String>,

    /// Branch to clone (overrides config).
    #[arg(short, long)]
    branch: Option<String>,

    /// Keep the cloned tree and print its location.
    #[arg(long)]
    keep: bool,

    /// Symbol list JSON file (overrides config).
    #[arg(long)]
    symbols: Option<PathBuf>,

    /// Output database (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be acquired, its root navigation
    /// config cannot be loaded, or the database cannot be written.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            repo: self.repo,
            branch: self.branch,
            symbols_file: self.symbols,
            database: self.database,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let location = config.source_resolved.location().ok_or_else(|| {
            CliError::Validation("no documentation source: set source.dir or source.repo".to_owned())
        })?;
        let tree = SourceTree::acquire(&location)?;
        output.source(tree.path());

        let options = catalog_options(&config.source_resolved);
        let mut build = build_catalog(tree.path(), &options)?;
        output.walk_report(&build.report);

        let mut associations = Vec::new();
        if let Some(symbols_file) = &config.symbols_file {
            match load_symbol_refs(symbols_file) {
                Ok(refs) => {
                    let (found, report) = SymbolMatcher::new(tree.path(), &options)
                        .with_sites(build.sites.clone())
                        .resolve(&mut build.catalog, &refs);
                    output.match_report(&report);
                    associations = found;
                }
                Err(e) => {
                    tracing::warn!(file = %symbols_file.display(), error = %e, "Skipping symbol matching");
                    output.symbols_skipped(&e);
                }
            }
        }

        let store = Store::create(&config.database).await?;
        store.write_catalog(&build.catalog).await?;
        store.write_associations(&associations).await?;
        store.close().await;

        if self.keep
            && let Some(kept) = tree.keep()
        {
            output.kept_clone(&kept);
        }

        output.built(build.catalog.len(), &config.database);
        Ok(())
    }
}

fn catalog_options(source: &SourceConfig) -> CatalogOptions {
    CatalogOptions {
        nav_file: source.nav_file.clone(),
        docs_dir: source.docs_dir.clone(),
        extension: source.extension.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_options_from_source_config() {
        let source = SourceConfig {
            nav_file: "site.yml".to_owned(),
            docs_dir: "pages".to_owned(),
            extension: "markdown".to_owned(),
            ..SourceConfig::default()
        };

        assert_eq!(
            catalog_options(&source),
            CatalogOptions {
                nav_file: "site.yml".to_owned(),
                docs_dir: "pages".to_owned(),
                extension: "markdown".to_owned(),
            }
        );
    }
}
