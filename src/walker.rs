//! Per-root directory traversal.
//!
//! Uses the `ignore` crate to walk one scan root in sorted pre-order. The
//! [`ExclusionMatcher`] is consulted on the way down, so pruned
//! directories are never opened. With `respect_ignore_files`, `.gitignore`,
//! `.git/info/exclude`, the global gitignore, `.ignore` and `.siftignore`
//! apply on top of the exclusion rules.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ignore::WalkBuilder;
use log::{debug, info, warn};

use crate::config::ScanConfig;
use crate::exclude::ExclusionMatcher;
use crate::filter::extension_of;
use crate::record::{BuildResult, FileRecord, FileRecordBuilder, SkipReason};
use crate::scan::{FileBudget, RootStatus, ScanStats, ScanWarning};

/// Per-directory ignore file honored alongside `.gitignore`.
pub const IGNORE_FILENAME: &str = ".siftignore";

/// `path` relative to `base`, `/`-separated.
///
/// Paths outside `base` come back with `..` segments.
pub fn relative_path(path: &Path, base: &Path) -> String {
    let relative = match path.strip_prefix(base) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf()),
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// The entry a walk error is about, if the error carries one.
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}

/// Result of walking one root.
#[derive(Debug)]
pub struct RootScan {
    pub root: PathBuf,
    pub records: Vec<FileRecord>,
    pub stats: ScanStats,
    pub status: RootStatus,
    pub warnings: Vec<ScanWarning>,
}

/// Walks scan roots and builds records for the files that survive filtering.
#[derive(Debug, Clone)]
pub struct TreeScanner<'a> {
    config: &'a ScanConfig,
    matcher: Arc<ExclusionMatcher>,
    builder: FileRecordBuilder,
    project_root: &'a Path,
}

impl<'a> TreeScanner<'a> {
    pub fn new(config: &'a ScanConfig, matcher: Arc<ExclusionMatcher>, project_root: &'a Path) -> Self {
        let builder = FileRecordBuilder::new()
            .strip_comments(config.strip_comments)
            .max_lines(config.max_lines_per_file);
        Self {
            config,
            matcher,
            builder,
            project_root,
        }
    }

    fn walk_builder(&self, root: &Path, pruned: Arc<AtomicUsize>) -> WalkBuilder {
        let respect = self.config.respect_ignore_files;
        let mut builder = WalkBuilder::new(root);

        builder
            .standard_filters(false)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .ignore(respect)
            .parents(respect)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if respect {
            builder.add_custom_ignore_filename(IGNORE_FILENAME);
        }

        let matcher = Arc::clone(&self.matcher);
        let root = root.to_path_buf();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            let prune = matcher.should_prune_directory(&name)
                || matcher.covers_root_path(&relative_path(entry.path(), &root));
            if prune {
                debug!("pruned {}", entry.path().display());
                pruned.fetch_add(1, Ordering::Relaxed);
            }
            !prune
        });

        builder
    }

    /// Walk `root`, drawing accepted files from the shared `budget`.
    ///
    /// Stops as soon as a candidate file finds the budget exhausted; the
    /// returned status is then [`RootStatus::Exhausted`].
    pub fn scan_root(&self, root: &Path, budget: &FileBudget) -> RootScan {
        info!("scanning {}", root.display());

        let pruned = Arc::new(AtomicUsize::new(0));
        let walker = self.walk_builder(root, Arc::clone(&pruned)).build();

        let mut records = Vec::new();
        let mut stats = ScanStats::default();
        let mut warnings = Vec::new();
        let mut status = RootStatus::Done;

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    let warning = ScanWarning::FileError {
                        path: error_path(&err).unwrap_or(root).to_path_buf(),
                        message: err.to_string(),
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let relative = relative_path(path, self.project_root);

            if !self.config.include_hidden && entry.file_name().to_string_lossy().starts_with('.') {
                debug!("skip {relative}: hidden");
                stats.files_excluded += 1;
                continue;
            }

            let root_relative = relative_path(path, root);
            if let Some(rule) = self.matcher.matching_rule(&relative, &root_relative) {
                debug!("skip {relative}: excluded by {rule}");
                stats.files_excluded += 1;
                continue;
            }

            if let Some(allowed) = &self.config.allowed_extensions {
                if !extension_of(path).is_some_and(|ext| allowed.contains(&ext)) {
                    debug!("skip {relative}: extension not allowed");
                    stats.files_filtered += 1;
                    continue;
                }
            }

            if self.config.max_file_size_bytes > 0 {
                let size = match entry.metadata() {
                    Ok(meta) => meta.len(),
                    Err(err) => {
                        let warning = ScanWarning::FileError {
                            path: path.to_path_buf(),
                            message: err.to_string(),
                        };
                        warn!("{warning}");
                        warnings.push(warning);
                        stats.files_unreadable += 1;
                        continue;
                    }
                };
                if size > self.config.max_file_size_bytes {
                    debug!("skip {relative}: {size} bytes exceeds limit");
                    stats.files_too_large += 1;
                    continue;
                }
            }

            if budget.is_exhausted() {
                status = RootStatus::Exhausted;
                break;
            }

            match self.builder.build(path, &relative) {
                BuildResult::Accepted(record) => {
                    if !budget.try_accept() {
                        status = RootStatus::Exhausted;
                        break;
                    }
                    stats.record(&record);
                    records.push(record);
                }
                BuildResult::Skipped(SkipReason::Binary) => {
                    debug!("skip {relative}: binary content");
                    stats.files_binary += 1;
                }
                BuildResult::Skipped(SkipReason::Unreadable(message)) => {
                    let warning = ScanWarning::FileError {
                        path: path.to_path_buf(),
                        message,
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                    stats.files_unreadable += 1;
                }
            }
        }

        stats.dirs_pruned = pruned.load(Ordering::Relaxed);
        info!(
            "{}: {} files accepted{}",
            root.display(),
            stats.files_accepted,
            if status == RootStatus::Exhausted { " (file limit reached)" } else { "" }
        );

        RootScan {
            root: root.to_path_buf(),
            records,
            stats,
            status,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclude::ExclusionRule;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/main.php", "<?php echo 1;\n");
        write(dir.path(), "src/lib/util.php", "<?php // util\n");
        write(dir.path(), "vendor/pkg/a.php", "<?php\n");
        write(dir.path(), "node_modules/x/index.js", "x\n");
        write(dir.path(), ".github/ci.yml", "on: push\n");
        write(dir.path(), ".env", "SECRET=1\n");
        write(dir.path(), "composer.lock", "{}\n");
        write(dir.path(), "README.md", "# Title\n");
        dir
    }

    fn scan(config: &ScanConfig) -> RootScan {
        let root = config.project_root.canonicalize().unwrap();
        let matcher = ExclusionMatcher::new(&config.extra_exclude_rules)
            .unwrap()
            .include_hidden(config.include_hidden)
            .include_vendor_dirs(config.include_vendor_dirs);
        let scanner = TreeScanner::new(config, Arc::new(matcher), &root);
        scanner.scan_root(&root, &FileBudget::new(config.max_files))
    }

    fn paths(scan: &RootScan) -> Vec<&str> {
        scan.records.iter().map(|r| r.relative_path.as_str()).collect()
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path(Path::new("/p/src/a.php"), Path::new("/p")), "src/a.php");
        assert_eq!(relative_path(Path::new("/q/a.php"), Path::new("/p")), "../q/a.php");
        assert_eq!(relative_path(Path::new("/p"), Path::new("/p")), "");
    }

    #[test]
    fn test_error_path_finds_failing_entry() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ignore::Error::WithDepth {
            depth: 2,
            err: Box::new(ignore::Error::WithPath {
                path: PathBuf::from("/p/src/locked"),
                err: Box::new(ignore::Error::Io(io)),
            }),
        };
        assert_eq!(error_path(&err), Some(Path::new("/p/src/locked")));

        let bare = ignore::Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert_eq!(error_path(&bare), None);
    }

    #[test]
    fn test_scan_default_filters() {
        let dir = create_test_dir();
        let result = scan(&ScanConfig::new(dir.path()));

        assert_eq!(paths(&result), vec!["README.md", "src/lib/util.php", "src/main.php"]);
        assert_eq!(result.status, RootStatus::Done);
        assert!(result.stats.dirs_pruned >= 3);
    }

    #[test]
    fn test_scan_include_hidden_and_vendor() {
        let dir = create_test_dir();
        let mut config = ScanConfig::new(dir.path());
        config.include_hidden = true;
        config.include_vendor_dirs = true;
        let result = scan(&config);
        let found = paths(&result);

        assert!(found.contains(&".env"));
        assert!(found.contains(&".github/ci.yml"));
        assert!(found.contains(&"vendor/pkg/a.php"));
        assert!(found.contains(&"node_modules/x/index.js"));
        assert!(!found.contains(&"composer.lock"));
    }

    #[test]
    fn test_scan_allowed_extensions() {
        let dir = create_test_dir();
        let mut config = ScanConfig::new(dir.path());
        config.allowed_extensions = Some(["md".to_string()].into_iter().collect());
        let result = scan(&config);

        assert_eq!(paths(&result), vec!["README.md"]);
        assert_eq!(result.stats.files_filtered, 2);
    }

    #[test]
    fn test_scan_size_limit_uses_disk_size() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small.php", "<?php\n");
        write(dir.path(), "big.php", &format!("<?php\n/*{}*/\n", "x".repeat(4096)));

        let mut config = ScanConfig::new(dir.path());
        config.max_file_size_bytes = 1024;
        config.strip_comments = true;
        let result = scan(&config);

        assert_eq!(paths(&result), vec!["small.php"]);
        assert_eq!(result.stats.files_too_large, 1);
    }

    #[test]
    fn test_scan_extra_rules() {
        let dir = create_test_dir();
        let mut config = ScanConfig::new(dir.path());
        config.extra_exclude_rules = vec![
            ExclusionRule::parse("lib/").unwrap(),
            ExclusionRule::parse("*.md").unwrap(),
        ];
        let result = scan(&config);

        assert_eq!(paths(&result), vec!["src/main.php"]);
    }

    #[test]
    fn test_scan_root_only_rule_prunes() {
        let dir = create_test_dir();
        let mut config = ScanConfig::new(dir.path());
        config.extra_exclude_rules = vec![ExclusionRule::parse("src/lib/").unwrap()];
        let result = scan(&config);

        assert!(!paths(&result).contains(&"src/lib/util.php"));
    }

    #[test]
    fn test_scan_respects_siftignore() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "keep.php", "<?php\n");
        write(dir.path(), "skip.php", "<?php\n");
        write(dir.path(), IGNORE_FILENAME, "skip.php\n");

        let result = scan(&ScanConfig::new(dir.path()));
        assert_eq!(paths(&result), vec!["keep.php"]);

        let mut config = ScanConfig::new(dir.path());
        config.respect_ignore_files = false;
        let result = scan(&config);
        assert_eq!(paths(&result), vec!["keep.php", "skip.php"]);
    }

    #[test]
    fn test_scan_respects_gitignore() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "visible.php", "<?php\n");
        write(dir.path(), "generated.php", "<?php\n");
        write(dir.path(), ".gitignore", "generated.php\n");

        let result = scan(&ScanConfig::new(dir.path()));
        assert_eq!(paths(&result), vec!["visible.php"]);
    }

    #[test]
    fn test_scan_stops_when_budget_exhausted() {
        let dir = TempDir::new().unwrap();
        for name in ["a.php", "b.php", "c.php"] {
            write(dir.path(), name, "<?php\n");
        }
        let mut config = ScanConfig::new(dir.path());
        config.max_files = 2;
        let result = scan(&config);

        assert_eq!(paths(&result), vec!["a.php", "b.php"]);
        assert_eq!(result.status, RootStatus::Exhausted);
    }

    #[test]
    fn test_scan_binary_is_absent() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "text.php", "<?php\n");
        fs::write(dir.path().join("blob.php"), b"\x00\x01").unwrap();

        let result = scan(&ScanConfig::new(dir.path()));
        assert_eq!(paths(&result), vec!["text.php"]);
        assert_eq!(result.stats.files_binary, 1);
    }
}
