use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use filegather::{
    split_keywords, DateRange, ExtensionFilter, GatherConfig, GatherMode, MatchStrategy,
    SearchCriteria, SearchHandle, SearchMode, SearchResult, SearchState, SizeRange,
};

/// filegather - find files by keyword across folders
#[derive(Parser, Debug)]
#[command(name = "filegather")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Batch-find files by keyword across one or more folders")]
#[command(long_about = None)]
struct Cli {
    /// Keywords; each argument is one query (`"phrase"`, `+must`, `-not`, `a|b`, `x*y`)
    #[arg(value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Folder to search (repeatable)
    #[arg(short = 'f', long = "folder", value_name = "DIR", required = true)]
    folders: Vec<PathBuf>,

    /// Read additional keywords from a file, one per line or whitespace separated
    #[arg(long, value_name = "FILE")]
    keywords_file: Option<PathBuf>,

    /// Where to match: filename, content, or both
    #[arg(short, long, default_value = "filename")]
    mode: SearchMode,

    /// Match whole file stems only; ignores --mode
    #[arg(long)]
    exact: bool,

    /// What to gather: files or folders (direct subfolders of each root)
    #[arg(long, default_value = "files")]
    gather: GatherMode,

    /// Extension category (documents, images, videos, audio, executables, archives)
    #[arg(short = 't', long = "type", value_name = "CATEGORY", conflicts_with = "ext")]
    category: Option<String>,

    /// Custom extension list, e.g. ".py;.java;cpp"
    #[arg(long, value_name = "LIST")]
    ext: Option<String>,

    /// Size filter, e.g. "<1mb", "1mb..10mb", ">10mb", "small"
    #[arg(long)]
    size: Option<String>,

    /// Modified-date filter, e.g. "today", "last7days", "2024-01-01..2024-06-30"
    #[arg(long)]
    modified: Option<String>,

    /// Only search the top level of each folder
    #[arg(long)]
    no_recurse: bool,

    /// Characters of content inspected per file
    #[arg(long)]
    budget: Option<usize>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Do not print progress to stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let criteria = build_criteria(&cli)?;

    let handle =
        SearchHandle::start(criteria, config.clone()).context("failed to start search")?;
    install_interrupt_handler(&handle);
    if !cli.quiet {
        watch_progress(&handle, config.progress_interval());
    }
    let result = handle.wait().context("search failed")?;
    if result.state == SearchState::Cancelled {
        log::info!("search cancelled records={}", result.records.len());
    }

    if cli.json {
        let output =
            serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        println!("{output}");
    } else {
        print_report(&result);
    }
    Ok(())
}

/// Ctrl-C stops the walk; whatever was found so far is still reported.
fn install_interrupt_handler(handle: &SearchHandle) {
    let token = handle.cancellation_token();
    let installed = ctrlc::set_handler(move || {
        log::warn!("interrupt received, cancelling search");
        token.cancel();
    });
    if let Err(error) = installed {
        log::warn!("interrupt handler not installed error={error}");
    }
}

fn load_config(cli: &Cli) -> Result<GatherConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            log::debug!("loading config path={}", path.display());
            GatherConfig::load(path)?
        }
        None => GatherConfig::default(),
    };
    if let Some(budget) = cli.budget {
        if budget == 0 {
            bail!("--budget must be greater than zero");
        }
        config.content_budget = budget;
    }
    Ok(config)
}

fn build_criteria(cli: &Cli) -> Result<SearchCriteria> {
    let mut builder = SearchCriteria::builder()
        .folders(cli.folders.iter().cloned())
        .keywords(cli.keywords.iter().cloned())
        .mode(cli.mode)
        .gather(cli.gather)
        .recursive(!cli.no_recurse);

    if let Some(path) = &cli.keywords_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read keywords file {}", path.display()))?;
        builder = builder.keywords(split_keywords(&text));
    }
    if cli.exact {
        builder = builder.strategy(MatchStrategy::Exact);
    }
    if let Some(category) = &cli.category {
        builder = builder.extensions(ExtensionFilter::category(category)?);
    }
    if let Some(list) = &cli.ext {
        builder = builder.extensions(ExtensionFilter::parse_custom(list)?);
    }
    if let Some(size) = &cli.size {
        builder = builder.size(SizeRange::parse(size)?);
    }
    if let Some(modified) = &cli.modified {
        builder = builder.modified(DateRange::parse(modified)?);
    }

    Ok(builder.build()?)
}

fn watch_progress(handle: &SearchHandle, interval: Duration) {
    let mut progress = handle.progress();
    let mut stderr = io::stderr();
    let tick = interval.max(Duration::from_millis(50));
    let mut printed = false;

    while !handle.is_finished() {
        std::thread::sleep(tick);
        if !progress.has_changed().unwrap_or(false) {
            continue;
        }
        let snapshot = progress.borrow_and_update().clone();
        let _ = write!(
            stderr,
            "\r\x1b[2Kscanned {} matched {} {}",
            snapshot.scanned, snapshot.matched, snapshot.current_path
        );
        let _ = stderr.flush();
        printed = true;
    }
    if printed {
        let _ = writeln!(stderr, "\r\x1b[2K");
    }
}

fn print_report(result: &SearchResult) {
    for matches in &result.keyword_matches {
        println!("== {} ({})", matches.keyword, matches.records.len());
        for record in &matches.records {
            println!(
                "  {}  {}  {}",
                record.path,
                format_size(record.size),
                record.modified
            );
        }
    }

    println!();
    println!(
        "{} unique path(s), state={}, scanned {} file(s) in {} folder(s)",
        result.records.len(),
        result.state.as_str(),
        result.stats.scanned_files,
        result.stats.scanned_folders
    );
    let errors =
        result.stats.folder_errors + result.stats.file_errors + result.stats.content_errors;
    if errors > 0 {
        println!(
            "{} error(s): folders={} files={} content={}",
            errors,
            result.stats.folder_errors,
            result.stats.file_errors,
            result.stats.content_errors
        );
    }
    if !result.unfound_keywords.is_empty() {
        println!("Unfound keywords: {}", result.unfound_keywords.join(", "));
    }
    if !result.multi_result_keywords.is_empty() {
        let listed: Vec<String> = result
            .multi_result_keywords
            .iter()
            .map(|(keyword, count)| format!("{keyword} ({count})"))
            .collect();
        println!("Keywords with multiple results: {}", listed.join(", "));
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
