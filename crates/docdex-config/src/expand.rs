//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the config key for error messages. Bare `$VAR` is left alone.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Variable referenced without a default but missing from the environment.
struct UnsetVar {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_repo_url() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("DOCDEX_TEST_GIT_HOST", "github.com");
        }
        let result = expand_env("git@${DOCDEX_TEST_GIT_HOST}:org/docs.git", "source.repo").unwrap();
        assert_eq!(result, "git@github.com:org/docs.git");
        unsafe {
            std::env::remove_var("DOCDEX_TEST_GIT_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("DOCDEX_TEST_BRANCH_UNSET");
        }
        let result = expand_env("${DOCDEX_TEST_BRANCH_UNSET:-main}", "source.branch").unwrap();
        assert_eq!(result, "main");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("DOCDEX_TEST_MISSING");
        }
        let err = expand_env("${DOCDEX_TEST_MISSING}", "source.repo").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("DOCDEX_TEST_MISSING"));
        assert!(message.contains("source.repo"));
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(expand_env("main", "source.branch").unwrap(), "main");
        assert_eq!(expand_env("$HOME/docs", "source.repo").unwrap(), "$HOME/docs");
    }
}
