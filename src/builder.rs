//! Fluent builder API for sift.

use std::path::PathBuf;

use crate::config::{extension_set, ScanConfig};
use crate::errors::SiftError;
use crate::exclude::ExclusionRule;
use crate::scan::{ScanOrchestrator, ScanOutcome};

/// Builder for a scan.
///
/// Exclusion patterns are collected as strings and parsed when the
/// configuration is finalized, so the chain never breaks on a bad pattern.
///
/// # Examples
///
/// ```no_run
/// use sift::Sift;
///
/// let outcome = Sift::new("./project")
///     .root("src")
///     .root("config")
///     .max_files(200)
///     .max_lines(400)
///     .strip_comments(true)
///     .exclude("fixtures/")
///     .scan()
///     .unwrap();
///
/// println!("{} files", outcome.records.len());
/// ```
#[derive(Debug, Clone)]
pub struct Sift {
    config: ScanConfig,
    patterns: Vec<String>,
    extensions: Vec<String>,
}

impl Sift {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            config: ScanConfig::new(project_root),
            patterns: Vec::new(),
            extensions: Vec::new(),
        }
    }

    /// Add a scan root. Relative roots resolve against the project root.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.roots.push(root.into());
        self
    }

    pub fn roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.roots.extend(roots.into_iter().map(Into::into));
        self
    }

    /// Global ceiling on accepted files (0 = unlimited).
    pub fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// Per-file size ceiling in kilobytes (0 = unlimited).
    pub fn max_file_size_kb(mut self, kb: u64) -> Self {
        self.config.max_file_size_bytes = kb.saturating_mul(1024);
        self
    }

    pub fn max_lines(mut self, max: usize) -> Self {
        self.config.max_lines_per_file = max;
        self
    }

    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.config.strip_comments = strip;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.include_hidden = include;
        self
    }

    pub fn include_vendor_dirs(mut self, include: bool) -> Self {
        self.config.include_vendor_dirs = include;
        self
    }

    pub fn respect_ignore_files(mut self, respect: bool) -> Self {
        self.config.respect_ignore_files = respect;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel_roots = parallel;
        self
    }

    /// Add an ad-hoc exclusion pattern (see [`ExclusionRule::parse`]).
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn exclude_rule(mut self, rule: ExclusionRule) -> Self {
        self.config.extra_exclude_rules.push(rule);
        self
    }

    /// Restrict to these extensions. Repeated calls accumulate.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Finalize into a [`ScanConfig`], parsing collected patterns.
    pub fn into_config(self) -> Result<ScanConfig, SiftError> {
        let mut config = self.config;
        for pattern in &self.patterns {
            let rule = ExclusionRule::parse(pattern)?;
            if !config.extra_exclude_rules.contains(&rule) {
                config.extra_exclude_rules.push(rule);
            }
        }
        config.allowed_extensions = extension_set(&self.extensions);
        Ok(config)
    }

    pub fn orchestrator(self) -> Result<ScanOrchestrator, SiftError> {
        ScanOrchestrator::new(self.into_config()?)
    }

    /// Build and run the scan.
    pub fn scan(self) -> Result<ScanOutcome, SiftError> {
        Ok(self.orchestrator()?.run())
    }
}

/// Scan one directory with default settings.
pub fn scan_path(path: impl Into<PathBuf>) -> Result<ScanOutcome, SiftError> {
    Sift::new(path).scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_into_config() {
        let config = Sift::new("/p")
            .root("a")
            .roots(["b", "c"])
            .max_files(3)
            .max_file_size_kb(2)
            .max_lines(10)
            .strip_comments(true)
            .exclude("*.snap")
            .exclude("*.snap")
            .extensions(["PHP", ".js"])
            .into_config()
            .unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("a"), "b".into(), "c".into()]);
        assert_eq!(config.max_files, 3);
        assert_eq!(config.max_file_size_bytes, 2048);
        assert_eq!(config.max_lines_per_file, 10);
        assert!(config.strip_comments);
        assert_eq!(config.extra_exclude_rules, vec![ExclusionRule::ExtensionSuffix(".snap".into())]);
        let allowed = config.allowed_extensions.unwrap();
        assert!(allowed.contains("php") && allowed.contains("js"));
    }

    #[test]
    fn test_bad_pattern_surfaces_at_finalize() {
        let err = Sift::new("/p").exclude("").into_config().unwrap_err();
        assert!(matches!(err, SiftError::Rule(_)));
    }

    #[test]
    fn test_scan_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.php"), "<?php\n").unwrap();
        let outcome = scan_path(dir.path()).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].relative_path, "index.php");
    }
}
