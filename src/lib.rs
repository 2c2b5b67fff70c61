//! Sift - collect source files into a single context document for LLMs.
//!
//! Sift walks one or more directory trees under a project root. Layered
//! exclusion rules prune dependency and build directories before they are
//! opened, and binary files are dropped. Surviving files can have their
//! comments stripped (string-aware, per language family) and are truncated
//! to a line budget. A global file budget caps the whole run.
//!
//! # Quick Start
//!
//! ```no_run
//! use sift::output::{format_report, ReportOptions};
//! use sift::Sift;
//!
//! let outcome = Sift::new("./my-project")
//!     .root("src")
//!     .strip_comments(true)
//!     .max_lines(300)
//!     .scan()
//!     .unwrap();
//!
//! let report = format_report(
//!     &outcome.records,
//!     &outcome.stats,
//!     &outcome.warnings,
//!     &ReportOptions::default(),
//! )
//! .unwrap();
//! println!("{report}");
//! ```
//!
//! # Modules
//!
//! - [`exclude`] - Exclusion rules and the matcher
//! - [`filter`] - Language detection and binary sniffing
//! - [`strip`] - Comment stripping
//! - [`record`] - Reading and truncating single files
//! - [`walker`] - Per-root traversal
//! - [`scan`] - Multi-root orchestration and the file budget
//! - [`config`] - Scan configuration and the TOML config file
//! - [`builder`] - Fluent API
//! - [`output`] - Markdown and JSON reports
//! - [`tree`] - File tree rendering
//! - [`tokens`] - Token estimates

pub mod builder;
pub mod config;
pub mod errors;
pub mod exclude;
pub mod filter;
pub mod output;
pub mod record;
pub mod scan;
pub mod strip;
pub mod tokens;
pub mod tree;
pub mod walker;

pub use builder::{scan_path, Sift};
pub use config::{ConfigError, ConfigFile, ScanConfig};
pub use errors::{exit_code, SiftError};
pub use exclude::{ExclusionMatcher, ExclusionRule, RuleError};
pub use filter::{CommentFamily, FilterError, Language};
pub use output::{format_report, write_report, OutputError, ReportFormat, ReportOptions};
pub use record::{BuildResult, FileRecord, FileRecordBuilder, SkipReason};
pub use scan::{FileBudget, RootStatus, ScanOrchestrator, ScanOutcome, ScanStats, ScanWarning};
pub use strip::{strip_comments, stripper_for, CommentStripper};
pub use tokens::{count_tokens, Encoding};
pub use walker::TreeScanner;
