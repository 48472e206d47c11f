//! Documentation tree acquisition.

use std::path::{Path, PathBuf};
use std::process::Command;

use docdex_config::SourceLocation;
use tempfile::TempDir;

use crate::error::CliError;

/// A documentation tree ready to be walked.
pub(crate) enum SourceTree {
    /// Existing directory, left untouched.
    Local(PathBuf),
    /// Fresh clone, removed on drop.
    Cloned(TempDir),
}

impl SourceTree {
    /// Resolve a configured location, cloning remote repositories.
    pub(crate) fn acquire(location: &SourceLocation<'_>) -> Result<Self, CliError> {
        match *location {
            SourceLocation::Local(dir) => {
                if !dir.is_dir() {
                    return Err(CliError::Validation(format!(
                        "source directory not found: {}",
                        dir.display()
                    )));
                }
                Ok(Self::Local(dir.to_path_buf()))
            }
            SourceLocation::Remote { repo, branch } => {
                let dir = tempfile::Builder::new().prefix("docdex-").tempdir()?;
                clone(repo, branch, dir.path())?;
                Ok(Self::Cloned(dir))
            }
        }
    }

    /// Root of the tree.
    pub(crate) fn path(&self) -> &Path {
        match self {
            Self::Local(dir) => dir,
            Self::Cloned(dir) => dir.path(),
        }
    }

    /// Keep a cloned tree on disk after the process exits.
    ///
    /// Returns the path of the kept clone, or `None` for local trees.
    pub(crate) fn keep(self) -> Option<PathBuf> {
        match self {
            Self::Local(_) => None,
            Self::Cloned(dir) => Some(dir.keep()),
        }
    }
}

/// Build the shallow single-branch clone command.
fn clone_command(repo: &str, branch: &str, dest: &Path) -> Command {
    let mut command = Command::new("git");
    command
        .args(["clone", "--depth", "1", "--single-branch", "--branch", branch, "--quiet"])
        .arg(repo)
        .arg(dest);
    command
}

fn clone(repo: &str, branch: &str, dest: &Path) -> Result<(), CliError> {
    tracing::info!(repo, branch, dest = %dest.display(), "Cloning documentation");

    let output = clone_command(repo, branch, dest)
        .output()
        .map_err(|e| CliError::Git {
            repo: repo.to_owned(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CliError::Git {
            repo: repo.to_owned(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clone_command_args() {
        let command = clone_command("https://example.com/docs.git", "main", Path::new("/tmp/x"));
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(command.get_program(), "git");
        assert_eq!(
            args,
            vec![
                "clone",
                "--depth",
                "1",
                "--single-branch",
                "--branch",
                "main",
                "--quiet",
                "https://example.com/docs.git",
                "/tmp/x",
            ]
        );
    }

    #[test]
    fn test_acquire_local_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tree = SourceTree::acquire(&SourceLocation::Local(dir.path())).unwrap();

        assert_eq!(tree.path(), dir.path());
        assert!(tree.keep().is_none());
    }

    #[test]
    fn test_acquire_missing_local_dir() {
        let result = SourceTree::acquire(&SourceLocation::Local(Path::new("/nonexistent/docs")));
        assert!(matches!(result, Err(CliError::Validation(_))));
    }
}
