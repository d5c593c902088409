use redirect_report_logs::{RedirectRules, RuleError};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum RuleFilesError {
    #[error("invalid redirect rules glob `{pattern}`")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to read redirect rules file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("redirect rules directory {path} does not exist")]
    MissingDirectory { path: PathBuf },
    #[error("failed to load redirect rules from {path}")]
    Rules {
        path: PathBuf,
        #[source]
        source: RuleError,
    },
}

const GLOB_METACHARACTERS: &[char] = &['*', '?', '['];

/// Finds all redirect rule files matching the glob pattern, in sorted order.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>, RuleFilesError> {
    let paths = glob::glob(pattern).map_err(|source| RuleFilesError::Glob {
        pattern: pattern.into(),
        source,
    })?;

    let mut paths = paths
        .map(|entry| {
            entry.map_err(|error| RuleFilesError::Read {
                path: error.path().to_path_buf(),
                source: error.into_error(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    paths.sort();
    Ok(paths)
}

/// Loads the redirect rules of all files matching the glob pattern.
///
/// Any unreadable file or invalid rule aborts loading, since a partial rule
/// set would produce a misleading report.
#[instrument(err)]
pub async fn load_rules(pattern: &str) -> Result<RedirectRules, RuleFilesError> {
    let mut rules = RedirectRules::new();

    let paths = discover(pattern)?;
    if paths.is_empty() {
        if let Some(dir) = rules_directory(pattern).filter(|dir| !dir.is_dir()) {
            return Err(RuleFilesError::MissingDirectory { path: dir.into() });
        }

        warn!(%pattern, "No redirect rule files found");
    }

    for path in paths {
        let num_rules = load_file(&mut rules, &path).await?;
        debug!(path = %path.display(), num_rules, "Loaded redirect rules");
    }

    Ok(rules)
}

/// Returns the directory of the glob pattern, if it is a literal path.
fn rules_directory(pattern: &str) -> Option<&Path> {
    let dir = Path::new(pattern).parent()?;
    let is_literal = dir
        .to_str()
        .is_some_and(|dir| !dir.is_empty() && !dir.contains(GLOB_METACHARACTERS));

    is_literal.then_some(dir)
}

async fn load_file(rules: &mut RedirectRules, path: &Path) -> Result<usize, RuleFilesError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RuleFilesError::Read {
            path: path.into(),
            source,
        })?;

    rules.load(&contents).map_err(|source| RuleFilesError::Rules {
        path: path.into(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_matches, assert_ok};
    use std::fs;

    #[test]
    fn test_discover_sorted() {
        let dir = assert_ok!(tempfile::tempdir());
        for name in ["b-redirects.map", "a-redirects.map", "redirects.conf", "c-redirects.map"] {
            assert_ok!(fs::write(dir.path().join(name), ""));
        }

        let pattern = format!("{}/*redirects.map", dir.path().display());
        let paths = assert_ok!(discover(&pattern));

        let names = paths
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["a-redirects.map", "b-redirects.map", "c-redirects.map"]);
    }

    #[test]
    fn test_discover_invalid_glob() {
        let error = assert_err!(discover("/etc/nginx/***/redirects.map"));
        assert_matches!(error, RuleFilesError::Glob { .. });
    }

    #[tokio::test]
    async fn test_load_rules_in_file_order() {
        let dir = assert_ok!(tempfile::tempdir());
        assert_ok!(fs::write(
            dir.path().join("b-redirects.map"),
            "~^/article /b;\n~^/blog /b;\n"
        ));
        assert_ok!(fs::write(
            dir.path().join("a-redirects.map"),
            "~*^/article/?$ /a;\n"
        ));

        let pattern = format!("{}/*redirects.map", dir.path().display());
        let rules = assert_ok!(load_rules(&pattern).await);

        let patterns = rules.keys().collect::<Vec<_>>();
        assert_eq!(patterns, ["^/article/?$", "^/article", "^/blog"]);

        let rule = rules.find_match("/article/");
        assert_eq!(rule.map(|rule| rule.source()), Some("^/article/?$"));
    }

    #[tokio::test]
    async fn test_load_rules_without_files() {
        let dir = assert_ok!(tempfile::tempdir());
        let pattern = format!("{}/*redirects.map", dir.path().display());
        let rules = assert_ok!(load_rules(&pattern).await);
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn test_missing_rules_directory_is_fatal() {
        let dir = assert_ok!(tempfile::tempdir());
        let missing = dir.path().join("conf.d");
        let pattern = format!("{}/*redirects.map", missing.display());

        let error = assert_err!(load_rules(&pattern).await);
        assert_eq!(
            error.to_string(),
            format!("redirect rules directory {} does not exist", missing.display())
        );
        assert_matches!(error, RuleFilesError::MissingDirectory { .. });
    }

    #[test]
    fn test_rules_directory() {
        assert_eq!(
            rules_directory("/etc/nginx/conf.d/*redirects.map"),
            Some(Path::new("/etc/nginx/conf.d"))
        );
        assert_eq!(rules_directory("/etc/nginx/*/redirects.map"), None);
        assert_eq!(rules_directory("redirects.map"), None);
    }

    #[tokio::test]
    async fn test_invalid_rule_is_fatal() {
        let dir = assert_ok!(tempfile::tempdir());
        let path = dir.path().join("redirects.map");
        assert_ok!(fs::write(&path, "~^/fine /x;\n~^/(broken /y;\n"));

        let pattern = format!("{}/*redirects.map", dir.path().display());
        let error = assert_err!(load_rules(&pattern).await);
        assert_eq!(
            error.to_string(),
            format!("failed to load redirect rules from {}", path.display())
        );
        assert_matches!(error, RuleFilesError::Rules { .. });
    }

    #[tokio::test]
    async fn test_unreadable_rule_file_is_fatal() {
        let dir = assert_ok!(tempfile::tempdir());
        // A directory matching the glob can't be read as a file
        assert_ok!(fs::create_dir(dir.path().join("nested-redirects.map")));

        let pattern = format!("{}/*redirects.map", dir.path().display());
        let error = assert_err!(load_rules(&pattern).await);
        assert_matches!(error, RuleFilesError::Read { .. });
    }
}
