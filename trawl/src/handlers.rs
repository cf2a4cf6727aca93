use clap::ArgMatches;
use clap::error::ErrorKind;
use colored::Colorize;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use trawl_scanner::crawler::DEFAULT_MAX_DEPTH;
use trawl_scanner::fetcher::DEFAULT_TIMEOUT;
use trawl_scanner::{CrawlEvent, ScanError, StatusPolicy};

// Re-export crawl types and functions from trawl-core
pub use trawl_core::crawl::{CrawlOptions, CrawlProgressCallback, describe_event, execute_crawl};
pub use trawl_core::report::{ReportFormat, generate_crawl_report};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

const DEFAULT_LOG_FILTER: &str = "error";

/// Logs go to stderr, filtered by `RUST_LOG` when set.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Help and version requests succeed; every other argument error is a failure.
pub fn exit_code_for(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}

pub fn crawl_options_from_args(args: &ArgMatches) -> CrawlOptions {
    let seed = args.get_one::<String>("URL").cloned().unwrap_or_default();
    let mut options = CrawlOptions::new(seed);

    options.max_depth = args
        .get_one::<usize>("MAX_DEPTH")
        .copied()
        .unwrap_or(DEFAULT_MAX_DEPTH);
    options.timeout = args
        .get_one::<u64>("timeout")
        .map(|secs| Duration::from_secs(*secs))
        .unwrap_or(DEFAULT_TIMEOUT);
    options.status_policy = if args.get_flag("lenient-status") {
        StatusPolicy::Lenient
    } else {
        StatusPolicy::Exact
    };

    options
}

pub fn report_format_from_args(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

fn print_event(event: &CrawlEvent) {
    let Some(line) = describe_event(event) else {
        return;
    };

    match event {
        CrawlEvent::Connecting { .. } => eprintln!("{} {}", "→".blue(), line),
        CrawlEvent::Connected { .. } => eprintln!("{} {}", "✓".green(), line),
        CrawlEvent::Rejected { .. } => eprintln!("{} {}", "⚠".yellow(), line.yellow()),
        CrawlEvent::Failed { .. } => eprintln!("{} {}", "✗".red().bold(), line.red()),
        _ => eprintln!("{}", line),
    }
}

pub async fn handle_crawl(args: &ArgMatches) -> i32 {
    let quiet = args.get_flag("quiet");
    let format = report_format_from_args(args);

    let mut options = crawl_options_from_args(args);
    options.show_progress_bars = !quiet && io::stderr().is_terminal();
    debug!("Crawl options: {:?}", options);

    let progress_callback = if quiet {
        None
    } else {
        let callback: CrawlProgressCallback = Arc::new(print_event);
        Some(callback)
    };

    let report = match execute_crawl(options, progress_callback).await {
        Ok(report) => report,
        Err(ScanError::MalformedUrl { input, .. }) => {
            eprintln!("Error: The URL {} is not valid", input);
            return EXIT_FAILURE;
        }
        Err(e) => {
            eprintln!("{} Crawl failed: {}", "✗".red().bold(), e);
            return EXIT_FAILURE;
        }
    };

    match generate_crawl_report(&report, format) {
        Ok(rendered) if rendered.ends_with('\n') => {
            print!("{}", rendered);
            EXIT_SUCCESS
        }
        Ok(rendered) => {
            println!("{}", rendered);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("{} Failed to render report: {}", "✗".red().bold(), e);
            EXIT_FAILURE
        }
    }
}
