//! Sift CLI - collect source files into one context document for LLMs.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::info;
use serde::Serialize;
use sift::config::{merge_lists, ConfigFile};
use sift::errors::{exit_code, SiftError};
use sift::exclude::{default_rules, ExclusionRule, VENDOR_DIRECTORY_NAMES};
use sift::filter::Language;
use sift::output::{format_report, write_report, OutputError, ReportFormat, ReportOptions};
use sift::tokens::Encoding;
use sift::walker::relative_path;
use sift::Sift;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Collect source files into one context document for LLMs")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories and write a context report
    Scan(ScanArgs),

    /// Show the built-in exclusion rules
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show supported languages
    Languages {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Directories to scan, in order (default: the project root)
    roots: Vec<PathBuf>,

    /// Base directory for relative paths (default: current directory)
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Stop after this many files (0 = unlimited)
    #[arg(long)]
    max_files: Option<usize>,

    /// Skip files larger than this many kilobytes (0 = unlimited)
    #[arg(long)]
    max_size_kb: Option<u64>,

    /// Truncate files to this many lines (0 = unlimited)
    #[arg(long)]
    max_lines: Option<usize>,

    /// Remove comments from source files
    #[arg(long, overrides_with = "no_strip_comments")]
    strip_comments: bool,

    /// Keep comments even if the config file strips them
    #[arg(long, overrides_with = "strip_comments")]
    no_strip_comments: bool,

    /// Include hidden files and directories
    #[arg(long, overrides_with = "no_include_hidden")]
    include_hidden: bool,

    /// Skip hidden files even if the config file includes them
    #[arg(long, overrides_with = "include_hidden")]
    no_include_hidden: bool,

    /// Descend into vendor and node_modules
    #[arg(long, overrides_with = "no_include_vendor")]
    include_vendor: bool,

    /// Prune vendor and node_modules even if the config file includes them
    #[arg(long, overrides_with = "include_vendor")]
    no_include_vendor: bool,

    /// Ignore .gitignore, .ignore and .siftignore files
    #[arg(long, overrides_with = "respect_ignore")]
    no_ignore: bool,

    /// Honor ignore files even if the config file disables them
    #[arg(long, overrides_with = "no_ignore")]
    respect_ignore: bool,

    /// Only include these extensions
    #[arg(long, value_delimiter = ',')]
    ext: Vec<String>,

    /// Extra exclusion pattern (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Scan roots concurrently
    #[arg(long, overrides_with = "no_parallel")]
    parallel: bool,

    /// Scan roots one after another even if the config file says otherwise
    #[arg(long, overrides_with = "parallel")]
    no_parallel: bool,

    /// Token encoding for the summary
    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,

    /// Config file (default: .sift.toml, then the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EncodingArg {
    Cl100k,
    O200k,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Cl100k => Encoding::Cl100kBase,
            EncodingArg::O200k => Encoding::O200kBase,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_output = json_flag(&cli.command);

    let result = match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Rules { json } => run_rules(json),
        Commands::Languages { json } => run_languages(json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sift", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn json_flag(cmd: &Commands) -> bool {
    match cmd {
        Commands::Scan(args) => matches!(args.format, Some(FormatArg::Json)),
        Commands::Rules { json } => *json,
        Commands::Languages { json } => *json,
        Commands::Completions { .. } => false,
    }
}

// --- Scan command ---

fn run_scan(args: ScanArgs) -> Result<(), SiftError> {
    let cwd = std::env::current_dir()?;
    let project_root = cwd.join(args.project_root.as_deref().unwrap_or(Path::new(".")));

    let file = match ConfigFile::resolve(args.config.as_deref(), &project_root)? {
        Some((path, file)) => {
            info!("using config {}", path.display());
            file
        }
        None => ConfigFile::default(),
    };

    let format = match (args.format, file.format.as_deref()) {
        (Some(arg), _) => arg.into(),
        (None, Some(name)) => name.parse::<ReportFormat>()?,
        (None, None) => ReportFormat::default(),
    };
    let encoding = match (args.encoding, file.encoding.as_deref()) {
        (Some(arg), _) => arg.into(),
        (None, Some(name)) => name.parse::<Encoding>()?,
        (None, None) => Encoding::default(),
    };
    let output = args.output.or(file.output.clone()).map(|p| cwd.join(p));

    let strip_comments = toggle(args.strip_comments, args.no_strip_comments, file.strip_comments, false);
    let include_hidden = toggle(args.include_hidden, args.no_include_hidden, file.include_hidden, false);
    let include_vendor = toggle(args.include_vendor, args.no_include_vendor, file.include_vendor, false);
    let respect_ignore = toggle(args.respect_ignore, args.no_ignore, file.respect_ignore, true);
    let parallel = toggle(args.parallel, args.no_parallel, file.parallel, false);

    let mut builder = Sift::new(&project_root)
        .roots(args.roots.iter().map(|r| cwd.join(r)))
        .max_files(args.max_files.or(file.max_files).unwrap_or(0))
        .max_file_size_kb(args.max_size_kb.or(file.max_size_kb).unwrap_or(0))
        .max_lines(args.max_lines.or(file.max_lines).unwrap_or(0))
        .strip_comments(strip_comments)
        .include_hidden(include_hidden)
        .include_vendor_dirs(include_vendor)
        .respect_ignore_files(respect_ignore)
        .parallel(parallel)
        .extensions(merge_lists(&file.extensions, &args.ext));

    for pattern in merge_lists(&file.exclude, &args.exclude) {
        builder = builder.exclude(pattern);
    }
    if let Some(rule) = output.as_deref().and_then(|o| output_exclusion(o, &project_root)) {
        builder = builder.exclude_rule(rule);
    }

    let orchestrator = builder.orchestrator()?;
    let title = orchestrator
        .project_root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let outcome = orchestrator.run();

    let options = ReportOptions {
        format,
        title,
        encoding,
        ..Default::default()
    };
    let report = format_report(&outcome.records, &outcome.stats, &outcome.warnings, &options)?;

    match output {
        Some(path) => {
            write_report(&path, &report)?;
            info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            if !report.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}

/// Resolve a `--flag` / `--no-flag` pair over the config file value.
///
/// The pair overrides each other in clap, so at most one is set.
fn toggle(on: bool, off: bool, file: Option<bool>, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => file.unwrap_or(default),
    }
}

/// A literal rule for the report file when it lands inside the project.
fn output_exclusion(output: &Path, project_root: &Path) -> Option<ExclusionRule> {
    let root = project_root.canonicalize().ok()?;
    let target = canonicalize_existing_prefix(output)?;
    target.strip_prefix(&root).ok()?;
    let relative = relative_path(&target, &root);
    Some(ExclusionRule::GlobPattern(format!(
        "/{}",
        glob::Pattern::escape(&relative)
    )))
}

/// Canonicalize the longest existing ancestor and re-attach the rest.
fn canonicalize_existing_prefix(path: &Path) -> Option<PathBuf> {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(canonical) = current.canonicalize() {
            return Some(missing.iter().rev().fold(canonical, |acc, part| acc.join(part)));
        }
        missing.push(current.file_name()?);
        current = current.parent()?;
    }
}

// --- Rules command ---

#[derive(Serialize)]
struct RuleInfo {
    kind: &'static str,
    pattern: String,
}

fn run_rules(json: bool) -> Result<(), SiftError> {
    let rules: Vec<RuleInfo> = default_rules()
        .iter()
        .map(|rule| RuleInfo {
            kind: rule.kind(),
            pattern: rule.to_string(),
        })
        .collect();

    if json {
        #[derive(Serialize)]
        struct Output {
            rules: Vec<RuleInfo>,
            vendor_directories: &'static [&'static str],
        }
        let output = Output {
            rules,
            vendor_directories: VENDOR_DIRECTORY_NAMES,
        };
        let json = serde_json::to_string_pretty(&output).map_err(OutputError::from)?;
        println!("{json}");
    } else {
        println!("Default exclusion rules:");
        for rule in &rules {
            println!("  {:10} {}", rule.kind, rule.pattern);
        }
        println!(
            "\nPruned unless --include-vendor: {}",
            VENDOR_DIRECTORY_NAMES.join(", ")
        );
        println!("Hidden entries are skipped unless --include-hidden.");
    }

    Ok(())
}

// --- Languages command ---

#[derive(Serialize)]
struct LanguageInfo {
    name: String,
    extensions: Vec<String>,
    comments: String,
}

fn run_languages(json: bool) -> Result<(), SiftError> {
    let languages: Vec<LanguageInfo> = Language::all()
        .iter()
        .map(|lang| LanguageInfo {
            name: lang.to_string(),
            extensions: lang.extensions().iter().map(|e| format!(".{e}")).collect(),
            comments: lang.comment_family().to_string(),
        })
        .collect();

    if json {
        #[derive(Serialize)]
        struct Output {
            languages: Vec<LanguageInfo>,
        }
        let output = Output { languages };
        let json = serde_json::to_string_pretty(&output).map_err(OutputError::from)?;
        println!("{json}");
    } else {
        println!("Supported languages:");
        for lang in &languages {
            println!("  {:12} {:9} {}", lang.name, lang.comments, lang.extensions.join(", "));
        }
    }

    Ok(())
}
