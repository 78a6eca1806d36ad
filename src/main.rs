use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};

use faultline_core::{FaultlineConfig, OutputFormat};
use faultline_history::{CancelToken, CommitHeader, HistoryAccessor, SourceFilter};
use faultline_metrics::Accumulator;
use faultline_szz::{LinkOptions, Linker};

mod classify;
mod commits;
mod logging;
mod render;

#[derive(Parser)]
#[command(
    name = "faultline",
    version,
    about = "Change metrics and bug-inducing commits from git history",
    long_about = "faultline mines a local git history for defect-prediction data.\n\n\
                   It computes per-commit change metrics (churn, entropy, file age,\n\
                   developer experience) and links fix commits to the commits that\n\
                   introduced the lines they changed (SZZ).\n\n\
                   Examples:\n  \
                     faultline metrics --path .             Metrics for every commit on HEAD\n  \
                     faultline link --path .                Link keyword-classified fixes\n  \
                     faultline link --fixes fixes.txt       Link an explicit list of fixes\n  \
                     faultline classify --format json       Label commits by message keywords\n  \
                     faultline commits --format json        Export per-commit metadata\n  \
                     faultline init                         Write a default .faultline.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .faultline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Write results to a file instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Compute change metrics for every commit
    #[command(long_about = "Compute change metrics for every non-merge commit.\n\n\
        Walks the history oldest-first and reports lines added/deleted, files,\n\
        subsystems and directories touched, change entropy, file age, prior\n\
        changes, and author experience. Merge commits are listed as skipped.\n\n\
        Examples:\n  faultline metrics --path .\n  faultline metrics --branch main --format json -o metrics.json")]
    Metrics {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Branch to walk (default: [history] branch, then HEAD)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Link fix commits to the commits that introduced the fixed lines
    #[command(long_about = "Link fix commits to likely bug-inducing commits.\n\n\
        For every fix, the lines it removed or changed are blamed at the fix's\n\
        parent. Merge commits are never reported as bug-inducing.\n\n\
        Fixes come from --fixes (one id per line, '#' comments allowed, or a\n\
        JSON array of ids). Without it, commits whose message classifies as\n\
        corrective are used.\n\n\
        Examples:\n  faultline link --path .\n  faultline link --fixes fixes.txt --workers 8 --timeout 600")]
    Link {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Branch to walk (default: [history] branch, then HEAD)
        #[arg(long)]
        branch: Option<String>,

        /// File listing fix commit ids
        #[arg(long)]
        fixes: Option<PathBuf>,

        /// Worker threads (default: [linker] workers, then CPU count)
        #[arg(long)]
        workers: Option<usize>,

        /// Stop after this many seconds; remaining fixes are skipped
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Classify commits by message keywords
    #[command(long_about = "Classify commits by message keywords.\n\n\
        Categories, first match wins: corrective, featureAddition, preventative,\n\
        perfective, nonFunctional, none. Merge commits are not classified.\n\n\
        Example:\n  faultline classify --path . --format json")]
    Classify {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Branch to walk (default: [history] branch, then HEAD)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Export per-commit metadata
    #[command(long_about = "Export per-commit metadata.\n\n\
        Lists every commit oldest-first, merges included, with author and\n\
        committer identities and dates, parent hashes, the paths changed\n\
        against the first parent, and total lines added and deleted. The\n\
        source filter does not apply.\n\n\
        Example:\n  faultline commits --path . --format json -o commits.json")]
    Commits {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Branch to walk (default: [history] branch, then HEAD)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Create a default .faultline.toml configuration file
    #[command(long_about = "Create a default .faultline.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .faultline.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# faultline configuration

[history]
# Branch to walk instead of HEAD
# branch = "main"

[filter]
# Only matching files count toward metrics and links.
# A key left out keeps its built-in list.
# extensions = ["py", "rs", "go", "java"]
# basenames = ["Makefile", "Dockerfile"]
# patterns = ["scripts/**"]

[linker]
# workers = 8
# timeout_secs = 600
"#;

fn load_config(path: Option<&Path>) -> Result<FaultlineConfig> {
    let config = match path {
        Some(path) => FaultlineConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".faultline.toml");
            if default_path.exists() {
                FaultlineConfig::from_file(default_path)?
            } else {
                FaultlineConfig::default()
            }
        }
    };
    Ok(config)
}

fn spinner(message: &'static str) -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

fn finish(spinner: Option<indicatif::ProgressBar>, ok: bool) {
    if let Some(pb) = spinner {
        if ok {
            pb.finish_and_clear();
        } else {
            pb.finish_with_message("Failed");
        }
    }
}

/// Fix ids from a file: a JSON array, or one id per line with `#` comments.
fn read_fix_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err(format!("reading {}", path.display()))?;
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content)
            .into_diagnostic()
            .wrap_err(format!("parsing {} as a JSON array of commit ids", path.display()));
    }
    Ok(content
        .lines()
        .filter_map(|line| line.split('#').next())
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect())
}

fn headers(history: &HistoryAccessor, branch: Option<&str>) -> Result<Vec<CommitHeader>> {
    let headers = history
        .headers_of(branch)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(headers)
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .into_diagnostic()
            .wrap_err(format!("writing {}", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("faultline v{version} - change metrics and bug-inducing commits from git history\n");
    println!("Commands:");
    println!("  metrics   Per-commit churn, entropy, age, and experience metrics");
    println!("  link      Link fix commits to the commits that introduced the bug");
    println!("  classify  Label commits by message keywords");
    println!("  commits   Export per-commit metadata");
    println!("  init      Create default configuration\n");
    println!("Run 'faultline <command> --help' for details.");
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(format = %cli.format, "configuration loaded");

    let filter = Arc::new(SourceFilter::from_config(&config.filter)?);
    let output = cli.output.as_deref();

    match cli.command {
        None => print_welcome(),
        Some(Command::Metrics { ref path, branch }) => {
            let branch = branch.or_else(|| config.history.branch.clone());
            let history = HistoryAccessor::open(path)?.with_filter(Arc::clone(&filter));
            let commits = history.commits_of(branch.as_deref())?;

            let progress = spinner("Measuring commits...");
            let result = Accumulator::new(filter).run(commits, &CancelToken::new());
            finish(progress, result.is_ok());

            emit(&render::metrics(&result?, cli.format)?, output)?;
        }
        Some(Command::Link {
            ref path,
            branch,
            ref fixes,
            workers,
            timeout,
        }) => {
            let branch = branch.or_else(|| config.history.branch.clone());
            let cancel = timeout
                .or(config.linker.timeout_secs)
                .map(|secs| CancelToken::with_timeout(Duration::from_secs(secs)))
                .unwrap_or_default();

            let history = HistoryAccessor::open(path)?
                .with_filter(Arc::clone(&filter))
                .with_cancel(cancel.clone());
            let headers = headers(&history, branch.as_deref())?;
            let fixes = match fixes {
                Some(file) => read_fix_list(file)?,
                None => classify::corrective_ids(&headers),
            };
            tracing::info!(fixes = fixes.len(), commits = headers.len(), "linking fixes");

            let linker = Linker::new(
                path,
                filter,
                LinkOptions {
                    workers: workers.or(config.linker.workers),
                },
            )
            .with_cache(Arc::clone(history.cache()));

            let progress = spinner("Linking fixes...");
            let result = linker.link(headers.into_iter().map(Ok), &fixes, &cancel);
            finish(progress, result.is_ok());

            emit(&render::links(&result?, cli.format)?, output)?;
        }
        Some(Command::Classify { ref path, branch }) => {
            let branch = branch.or_else(|| config.history.branch.clone());
            let history = HistoryAccessor::open(path)?;
            let headers = headers(&history, branch.as_deref())?;
            let classified = classify::classify_all(&headers);
            emit(&render::classified(&classified, cli.format)?, output)?;
        }
        Some(Command::Commits { ref path, branch }) => {
            let branch = branch.or_else(|| config.history.branch.clone());
            let history = HistoryAccessor::open(path)?;
            let stream = history.commits_of(branch.as_deref())?;

            let progress = spinner("Reading commits...");
            let result = commits::export(stream, &CancelToken::new());
            finish(progress, result.is_ok());

            emit(&render::commits(&result?, cli.format)?, output)?;
        }
        Some(Command::Init) => {
            let path = Path::new(".faultline.toml");
            if path.exists() {
                miette::bail!(".faultline.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .faultline.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "faultline", &mut std::io::stdout());
        }
    }

    Ok(())
}
