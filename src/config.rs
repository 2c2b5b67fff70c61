//! Scan configuration and the optional TOML config file.
//!
//! [`ScanConfig`] is the immutable per-run input to the scanner. [`ConfigFile`]
//! is the on-disk layer that supplies defaults for command-line options;
//! flags override it and list options are merged with [`merge_lists`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::exclude::ExclusionRule;

/// Per-project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILENAME: &str = ".sift.toml";

/// Errors from loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Immutable configuration for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Base for every record's relative path.
    pub project_root: PathBuf,
    /// Roots in scan order. Empty means the project root alone.
    pub roots: Vec<PathBuf>,
    /// Global ceiling on accepted files (0 = unlimited).
    pub max_files: usize,
    /// On-disk size ceiling per file (0 = unlimited).
    pub max_file_size_bytes: u64,
    /// Line ceiling per file (0 = unlimited).
    pub max_lines_per_file: usize,
    pub strip_comments: bool,
    pub include_hidden: bool,
    pub include_vendor_dirs: bool,
    /// Honor `.gitignore`, `.ignore` and `.siftignore` files.
    pub respect_ignore_files: bool,
    /// Scan roots concurrently.
    pub parallel_roots: bool,
    pub extra_exclude_rules: Vec<ExclusionRule>,
    /// Lowercase extensions without the dot. `None` allows everything.
    pub allowed_extensions: Option<HashSet<String>>,
}

impl ScanConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            roots: Vec::new(),
            max_files: 0,
            max_file_size_bytes: 0,
            max_lines_per_file: 0,
            strip_comments: false,
            include_hidden: false,
            include_vendor_dirs: false,
            respect_ignore_files: true,
            parallel_roots: false,
            extra_exclude_rules: Vec::new(),
            allowed_extensions: None,
        }
    }

    /// Roots to scan, falling back to the project root.
    pub fn effective_roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            vec![self.project_root.clone()]
        } else {
            self.roots.clone()
        }
    }
}

/// Normalize an extension list entry: trimmed, lowercase, no leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Build an allow-list from raw entries. Empty input means no filter.
pub fn extension_set<I, S>(extensions: I) -> Option<HashSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: HashSet<String> = extensions
        .into_iter()
        .map(|e| normalize_extension(e.as_ref()))
        .filter(|e| !e.is_empty())
        .collect();
    (!set.is_empty()).then_some(set)
}

/// Defaults for command-line options, read from TOML.
///
/// ```toml
/// max_files = 500
/// max_size_kb = 256
/// strip_comments = true
/// exclude = ["fixtures/", "*.snap"]
/// extensions = ["php", "js"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub encoding: Option<String>,
    pub max_files: Option<usize>,
    pub max_size_kb: Option<u64>,
    pub max_lines: Option<usize>,
    pub strip_comments: Option<bool>,
    pub include_hidden: Option<bool>,
    pub include_vendor: Option<bool>,
    pub respect_ignore: Option<bool>,
    pub parallel: Option<bool>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl ConfigFile {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load an explicit path, or the first discovered file. A missing
    /// discovered file is not an error; a missing explicit one is.
    pub fn resolve(
        explicit: Option<&Path>,
        project_root: &Path,
    ) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        if let Some(path) = explicit {
            return Ok(Some((path.to_path_buf(), Self::load(path)?)));
        }
        match discover(project_root) {
            Some(path) => {
                let file = Self::load(&path)?;
                Ok(Some((path, file)))
            }
            None => Ok(None),
        }
    }
}

/// First existing config file: the project file, then the user one.
pub fn discover(project_root: &Path) -> Option<PathBuf> {
    let project = project_root.join(PROJECT_CONFIG_FILENAME);
    if project.is_file() {
        return Some(project);
    }
    let user = dirs::config_dir()?.join("sift").join("config.toml");
    user.is_file().then_some(user)
}

/// Concatenate file and CLI entries, dropping duplicates and keeping
/// first-seen order.
pub fn merge_lists(file: &[String], cli: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    file.iter()
        .chain(cli)
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_effective_roots_default_to_project_root() {
        let config = ScanConfig::new("/p");
        assert_eq!(config.effective_roots(), vec![PathBuf::from("/p")]);

        let mut config = ScanConfig::new("/p");
        config.roots = vec!["/p/a".into(), "/p/b".into()];
        assert_eq!(config.effective_roots().len(), 2);
    }

    #[test]
    fn test_extension_set() {
        let set = extension_set([".PHP", "js", " ", ""]).unwrap();
        assert!(set.contains("php"));
        assert!(set.contains("js"));
        assert_eq!(set.len(), 2);
        assert!(extension_set(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_parse_config_file() {
        let text = r#"
max_files = 10
strip_comments = true
exclude = ["fixtures/"]
extensions = ["php"]
"#;
        let file = ConfigFile::parse(text, Path::new("x.toml")).unwrap();
        assert_eq!(file.max_files, Some(10));
        assert_eq!(file.strip_comments, Some(true));
        assert_eq!(file.exclude, vec!["fixtures/"]);
        assert_eq!(file.max_lines, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ConfigFile::parse("max_filez = 3", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("x.toml"));
    }

    #[test]
    fn test_resolve_project_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILENAME), "max_lines = 7\n").unwrap();

        let (path, file) = ConfigFile::resolve(None, dir.path()).unwrap().unwrap();
        assert_eq!(path, dir.path().join(PROJECT_CONFIG_FILENAME));
        assert_eq!(file.max_lines, Some(7));
    }

    #[test]
    fn test_resolve_missing_explicit_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConfigFile::resolve(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_merge_lists_dedup_keeps_order() {
        let file = vec!["a/".to_string(), "*.log".to_string()];
        let cli = vec!["*.log".to_string(), "b/".to_string()];
        assert_eq!(merge_lists(&file, &cli), vec!["a/", "*.log", "b/"]);
    }
}
