//! Exclusion rules and the matcher that applies them during traversal.
//!
//! A rule set is the union of the built-in defaults and whatever the caller
//! adds. A path is excluded as soon as any rule matches it; there is no
//! negation and no ordering between rules.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use glob::{MatchOptions, Pattern};
use thiserror::Error;

/// Errors from parsing or compiling exclusion rules.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("empty exclusion pattern")]
    Empty,

    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// A single exclusion predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExclusionRule {
    /// A directory (or file) with this exact name, at any depth.
    DirectoryName(String),
    /// Any path ending with this suffix, e.g. `.log`.
    ExtensionSuffix(String),
    /// A path relative to the scan root, and everything below it.
    RootOnlyPath(String),
    /// `*` / `**` wildcard pattern. Without a `/` it is tried against every
    /// path segment; with one, against the whole relative path (a leading
    /// `/` only anchors it).
    GlobPattern(String),
}

fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

impl ExclusionRule {
    /// Classify an ad-hoc ignore pattern.
    ///
    /// - trailing `/` names a directory (`build/`), or a root-relative
    ///   directory path when it still contains a `/` (`docs/api/`)
    /// - `*.ext` with no further separator or wildcard is a suffix rule
    /// - any other wildcard pattern is a glob, a name glob when it has no `/`
    /// - a remaining `/` makes it a root-relative path (leading `/` optional)
    /// - anything else is a bare name matched against every path component
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::exclude::ExclusionRule;
    ///
    /// assert_eq!(
    ///     ExclusionRule::parse("*.log").unwrap(),
    ///     ExclusionRule::ExtensionSuffix(".log".into())
    /// );
    /// assert_eq!(
    ///     ExclusionRule::parse("cache/").unwrap(),
    ///     ExclusionRule::DirectoryName("cache".into())
    /// );
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, RuleError> {
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern == "/" {
            return Err(RuleError::Empty);
        }

        if let Some(dir) = pattern.strip_suffix('/') {
            let dir = normalize_root_path(dir);
            if dir.is_empty() {
                return Err(RuleError::Empty);
            }
            return Ok(if dir.contains('/') {
                ExclusionRule::RootOnlyPath(dir)
            } else {
                ExclusionRule::DirectoryName(dir)
            });
        }

        if let Some(rest) = pattern.strip_prefix("*.") {
            if !rest.is_empty() && !rest.contains('/') && !has_wildcard(rest) {
                return Ok(ExclusionRule::ExtensionSuffix(format!(".{rest}")));
            }
        }

        if has_wildcard(pattern) {
            compile_glob(pattern)?;
            return Ok(ExclusionRule::GlobPattern(pattern.to_string()));
        }

        if pattern.contains('/') {
            let path = normalize_root_path(pattern);
            if path.is_empty() {
                return Err(RuleError::Empty);
            }
            return Ok(ExclusionRule::RootOnlyPath(path));
        }

        Ok(ExclusionRule::DirectoryName(pattern.to_string()))
    }

    /// Short name of the rule kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ExclusionRule::DirectoryName(_) => "directory",
            ExclusionRule::ExtensionSuffix(_) => "suffix",
            ExclusionRule::RootOnlyPath(_) => "root-path",
            ExclusionRule::GlobPattern(_) => "glob",
        }
    }
}

/// Compile a glob rule. Returns the pattern and whether it applies per segment.
fn compile_glob(pattern: &str) -> Result<(Pattern, bool), RuleError> {
    let (body, per_segment) = match pattern.strip_prefix('/') {
        Some(anchored) => (anchored, false),
        None => (pattern, !pattern.contains('/')),
    };
    let compiled = Pattern::new(body).map_err(|source| RuleError::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok((compiled, per_segment))
}

fn normalize_root_path(path: &str) -> String {
    let path = path.trim_start_matches("./").trim_start_matches('/');
    path.trim_end_matches('/').to_string()
}

impl FromStr for ExclusionRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExclusionRule::parse(s)
    }
}

/// Renders the rule back in the pattern syntax accepted by [`ExclusionRule::parse`].
impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionRule::DirectoryName(name) => write!(f, "{name}/"),
            ExclusionRule::ExtensionSuffix(suffix) => match suffix.strip_prefix('.') {
                Some(ext) => write!(f, "*.{ext}"),
                None => write!(f, "*{suffix}"),
            },
            ExclusionRule::RootOnlyPath(path) => write!(f, "/{path}"),
            ExclusionRule::GlobPattern(pattern) => f.write_str(pattern),
        }
    }
}

/// Directory names excluded on every run.
pub const DEFAULT_DIRECTORY_NAMES: &[&str] = &[
    // VCS and IDE metadata
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    ".vs",
    // Tests
    "test",
    "tests",
    "__tests__",
    // Build output
    "build",
    "dist",
    "target",
    "coverage",
    // Caches
    ".cache",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".sass-cache",
    // Dependencies
    "bower_components",
    ".venv",
];

/// Path suffixes excluded on every run.
pub const DEFAULT_SUFFIXES: &[&str] = &[
    ".lock",
    "package-lock.json",
    ".log",
    ".min.js",
    ".min.css",
    ".map",
    ".pyc",
    ".DS_Store",
];

/// Directory names pruned unless vendored code is requested.
pub const VENDOR_DIRECTORY_NAMES: &[&str] = &["vendor", "node_modules"];

/// The built-in rule set.
pub fn default_rules() -> Vec<ExclusionRule> {
    DEFAULT_DIRECTORY_NAMES
        .iter()
        .map(|name| ExclusionRule::DirectoryName((*name).to_string()))
        .chain(
            DEFAULT_SUFFIXES
                .iter()
                .map(|suffix| ExclusionRule::ExtensionSuffix((*suffix).to_string())),
        )
        .collect()
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct CompiledGlob {
    pattern: Pattern,
    per_segment: bool,
    /// Index of the source rule in `ExclusionMatcher::rules`.
    rule: usize,
}

impl CompiledGlob {
    fn matches(&self, relative_path: &str) -> bool {
        if self.per_segment {
            path_segments(relative_path).any(|s| self.pattern.matches_with(s, GLOB_OPTIONS))
        } else {
            self.pattern.matches_with(relative_path, GLOB_OPTIONS)
        }
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// Compiled exclusion rules plus the hidden/vendor pruning toggles.
///
/// # Examples
///
/// ```
/// use sift::exclude::{ExclusionMatcher, ExclusionRule};
///
/// let matcher = ExclusionMatcher::new(&[ExclusionRule::parse("*.snap").unwrap()]).unwrap();
///
/// assert!(matcher.should_prune_directory("node_modules"));
/// assert!(matcher.should_exclude_file("src/__snapshots__/a.snap"));
/// assert!(!matcher.should_exclude_file("src/main.php"));
/// ```
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    rules: Vec<ExclusionRule>,
    directory_names: HashSet<String>,
    suffixes: Vec<String>,
    root_paths: Vec<String>,
    globs: Vec<CompiledGlob>,
    include_hidden: bool,
    include_vendor_dirs: bool,
}

impl ExclusionMatcher {
    /// Compile the default rules plus `extra`.
    pub fn new(extra: &[ExclusionRule]) -> Result<Self, RuleError> {
        Self::from_rules(default_rules().into_iter().chain(extra.iter().cloned()))
    }

    /// Compile exactly the given rules, without the defaults.
    pub fn from_rules(rules: impl IntoIterator<Item = ExclusionRule>) -> Result<Self, RuleError> {
        let mut matcher = Self {
            rules: Vec::new(),
            directory_names: HashSet::new(),
            suffixes: Vec::new(),
            root_paths: Vec::new(),
            globs: Vec::new(),
            include_hidden: false,
            include_vendor_dirs: false,
        };

        for rule in rules {
            if matcher.rules.contains(&rule) {
                continue;
            }
            match &rule {
                ExclusionRule::DirectoryName(name) => {
                    matcher.directory_names.insert(name.clone());
                }
                ExclusionRule::ExtensionSuffix(suffix) => matcher.suffixes.push(suffix.clone()),
                ExclusionRule::RootOnlyPath(path) => matcher.root_paths.push(path.clone()),
                ExclusionRule::GlobPattern(pattern) => {
                    let (pattern, per_segment) = compile_glob(pattern)?;
                    matcher.globs.push(CompiledGlob {
                        pattern,
                        per_segment,
                        rule: matcher.rules.len(),
                    });
                }
            }
            matcher.rules.push(rule);
        }

        Ok(matcher)
    }

    /// Descend into directories whose name starts with `.`.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Descend into `vendor` and `node_modules`.
    pub fn include_vendor_dirs(mut self, include: bool) -> Self {
        self.include_vendor_dirs = include;
        self
    }

    /// All active rules, defaults first.
    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    /// Whether a directory with this name should be skipped with its whole subtree.
    ///
    /// Name globs (glob rules without a `/`) prune matching directories too.
    pub fn should_prune_directory(&self, basename: &str) -> bool {
        if !self.include_hidden && basename.starts_with('.') {
            return true;
        }
        if !self.include_vendor_dirs && VENDOR_DIRECTORY_NAMES.contains(&basename) {
            return true;
        }
        self.directory_names.contains(basename)
            || self
                .globs
                .iter()
                .any(|g| g.per_segment && g.pattern.matches_with(basename, GLOB_OPTIONS))
    }

    /// Whether a directory at this scan-root-relative path is covered by a root path rule.
    pub fn covers_root_path(&self, root_relative: &str) -> bool {
        self.root_paths
            .iter()
            .any(|path| is_same_or_below(root_relative, path))
    }

    /// Whether a file at this relative path is excluded.
    ///
    /// Uses the same path for root-only rules; see [`Self::should_exclude_path`]
    /// when the project root and scan root differ.
    pub fn should_exclude_file(&self, relative_path: &str) -> bool {
        self.should_exclude_path(relative_path, relative_path)
    }

    /// Whether a file is excluded, given its project-relative path and its
    /// path relative to the scan root it was found under.
    pub fn should_exclude_path(&self, relative_path: &str, root_relative: &str) -> bool {
        self.matching_rule(relative_path, root_relative).is_some()
    }

    /// The first rule that excludes the file, if any.
    pub fn matching_rule(&self, relative_path: &str, root_relative: &str) -> Option<&ExclusionRule> {
        if let Some(suffix) = self.suffixes.iter().find(|s| relative_path.ends_with(s.as_str())) {
            return self.find_rule(|r| matches!(r, ExclusionRule::ExtensionSuffix(s) if s == suffix));
        }

        if let Some(path) = self
            .root_paths
            .iter()
            .find(|p| is_same_or_below(root_relative, p))
        {
            return self.find_rule(|r| matches!(r, ExclusionRule::RootOnlyPath(p) if p == path));
        }

        if let Some(glob) = self.globs.iter().find(|g| g.matches(relative_path)) {
            return self.rules.get(glob.rule);
        }

        let segment = path_segments(relative_path).find(|s| self.directory_names.contains(*s))?;
        self.find_rule(|r| matches!(r, ExclusionRule::DirectoryName(n) if n == segment))
    }

    fn find_rule(&self, pred: impl Fn(&ExclusionRule) -> bool) -> Option<&ExclusionRule> {
        self.rules.iter().find(|r| pred(r))
    }
}

fn is_same_or_below(path: &str, base: &str) -> bool {
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
