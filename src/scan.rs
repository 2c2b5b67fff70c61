//! Multi-root orchestration under one global file budget.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ScanConfig;
use crate::errors::SiftError;
use crate::exclude::ExclusionMatcher;
use crate::record::FileRecord;
use crate::walker::{RootScan, TreeScanner};

/// Shared global counter enforcing `max_files`.
///
/// Acceptance is check-then-increment in a single compare-and-swap, so
/// concurrent roots can never push the count past the limit.
#[derive(Debug)]
pub struct FileBudget {
    limit: usize,
    accepted: AtomicUsize,
}

impl FileBudget {
    /// A budget of `limit` files; 0 means unlimited.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            accepted: AtomicUsize::new(0),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit > 0 && self.accepted() >= self.limit
    }

    /// Claim one slot. Returns false once the limit is reached.
    pub fn try_accept(&self) -> bool {
        if self.limit == 0 {
            self.accepted.fetch_add(1, Ordering::AcqRel);
            return true;
        }
        self.accepted
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .is_ok()
    }
}

/// Lifecycle of one scan root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootStatus {
    /// Not visited, either not reached yet or cut off by the budget.
    Pending,
    Scanning,
    Done,
    /// Stopped mid-walk because the file budget ran out.
    Exhausted,
    /// Missing or not a directory.
    Invalid,
}

/// Advisory diagnostics. None of these abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    RootMissing { root: PathBuf },
    RootNotADirectory { root: PathBuf },
    FileLimitReached { limit: usize },
    FileError { path: PathBuf, message: String },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::RootMissing { root } => {
                write!(f, "root does not exist, skipping: {}", root.display())
            }
            ScanWarning::RootNotADirectory { root } => {
                write!(f, "root is not a directory, skipping: {}", root.display())
            }
            ScanWarning::FileLimitReached { limit } => {
                write!(f, "file limit of {limit} reached, stopping scan")
            }
            ScanWarning::FileError { path, message } => {
                write!(f, "{}: {message}", path.display())
            }
        }
    }
}

/// Running totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub files_accepted: usize,
    /// Sum of accepted records' `size_bytes`.
    pub bytes_accepted: u64,
    pub files_truncated: usize,
    pub dirs_pruned: usize,
    pub files_excluded: usize,
    pub files_filtered: usize,
    pub files_too_large: usize,
    pub files_binary: usize,
    pub files_unreadable: usize,
}

impl ScanStats {
    /// Count one accepted record.
    pub fn record(&mut self, record: &FileRecord) {
        self.files_accepted += 1;
        self.bytes_accepted += record.size_bytes;
        if record.truncated {
            self.files_truncated += 1;
        }
    }

    pub fn absorb(&mut self, other: &ScanStats) {
        self.files_accepted += other.files_accepted;
        self.bytes_accepted += other.bytes_accepted;
        self.files_truncated += other.files_truncated;
        self.dirs_pruned += other.dirs_pruned;
        self.files_excluded += other.files_excluded;
        self.files_filtered += other.files_filtered;
        self.files_too_large += other.files_too_large;
        self.files_binary += other.files_binary;
        self.files_unreadable += other.files_unreadable;
    }
}

/// How one root fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootSummary {
    pub root: PathBuf,
    pub status: RootStatus,
    pub files_accepted: usize,
}

/// Everything a run produces.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Records in root order, then traversal order.
    pub records: Vec<FileRecord>,
    pub stats: ScanStats,
    pub roots: Vec<RootSummary>,
    pub warnings: Vec<ScanWarning>,
}

impl ScanOutcome {
    pub fn limit_reached(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ScanWarning::FileLimitReached { .. }))
    }
}

/// Drives [`TreeScanner`] across every configured root.
#[derive(Debug)]
pub struct ScanOrchestrator {
    config: ScanConfig,
    project_root: PathBuf,
    matcher: Arc<ExclusionMatcher>,
}

impl ScanOrchestrator {
    /// Compile the exclusion rules and resolve the project root.
    pub fn new(config: ScanConfig) -> Result<Self, SiftError> {
        let project_root = config
            .project_root
            .canonicalize()
            .map_err(|_| SiftError::ProjectRootNotFound(config.project_root.clone()))?;
        if !project_root.is_dir() {
            return Err(SiftError::ProjectRootNotADirectory(config.project_root.clone()));
        }

        let matcher = ExclusionMatcher::new(&config.extra_exclude_rules)?
            .include_hidden(config.include_hidden)
            .include_vendor_dirs(config.include_vendor_dirs);

        Ok(Self {
            config,
            project_root,
            matcher: Arc::new(matcher),
        })
    }

    /// Canonical project root all relative paths are computed against.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn run(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let budget = FileBudget::new(self.config.max_files);

        // Roots are validated once, up front.
        let mut valid = Vec::new();
        for root in self.config.effective_roots() {
            let status = match validate_root(&root, &self.project_root) {
                Ok(canonical) => {
                    valid.push((outcome.roots.len(), canonical));
                    RootStatus::Pending
                }
                Err(warning) => {
                    warn!("{warning}");
                    outcome.warnings.push(warning);
                    RootStatus::Invalid
                }
            };
            outcome.roots.push(RootSummary {
                root,
                status,
                files_accepted: 0,
            });
        }

        let scanner = TreeScanner::new(&self.config, Arc::clone(&self.matcher), &self.project_root);
        let mut exhausted = false;
        let scans: Vec<(usize, RootScan)> = if self.config.parallel_roots {
            valid
                .par_iter()
                .map(|(index, root)| (*index, scanner.scan_root(root, &budget)))
                .collect()
        } else {
            let mut scans = Vec::with_capacity(valid.len());
            for (index, root) in &valid {
                // Remaining roots stay Pending once the budget is spent.
                if budget.is_exhausted() {
                    exhausted = true;
                    break;
                }
                outcome.roots[*index].status = RootStatus::Scanning;
                let scan = scanner.scan_root(root, &budget);
                let stop = scan.status == RootStatus::Exhausted;
                scans.push((*index, scan));
                if stop {
                    break;
                }
            }
            scans
        };

        for (index, scan) in scans {
            exhausted |= scan.status == RootStatus::Exhausted;
            let summary = &mut outcome.roots[index];
            summary.status = scan.status;
            summary.files_accepted = scan.records.len();
            outcome.stats.absorb(&scan.stats);
            outcome.records.extend(scan.records);
            outcome.warnings.extend(scan.warnings);
        }

        if exhausted {
            let warning = ScanWarning::FileLimitReached {
                limit: budget.limit(),
            };
            warn!("{warning}");
            outcome.warnings.push(warning);
        }

        info!(
            "scan finished: {} files, {} bytes",
            outcome.stats.files_accepted, outcome.stats.bytes_accepted
        );
        outcome
    }
}

/// Resolve a root against the project root and check it is a directory.
fn validate_root(root: &Path, project_root: &Path) -> Result<PathBuf, ScanWarning> {
    let joined = if root.is_absolute() {
        root.to_path_buf()
    } else {
        project_root.join(root)
    };
    let canonical = joined.canonicalize().map_err(|_| ScanWarning::RootMissing {
        root: root.to_path_buf(),
    })?;
    if !canonical.is_dir() {
        return Err(ScanWarning::RootNotADirectory {
            root: root.to_path_buf(),
        });
    }
    Ok(canonical)
}
