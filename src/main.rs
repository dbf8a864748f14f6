//! relmon - Upstream release monitor CLI
//!
//! Meant to run on a schedule: each invocation performs one scan pass
//! over the configured repositories, posts an issue for every newly
//! observed dependency release, and records what has been reported so
//! repeats are not re-announced.

use clap::Parser;
use relmon::cli::CliArgs;
use relmon::config::RawFileConfigSource;
use relmon::notify::{ConsoleSink, GithubIssueSink, NotificationSink};
use relmon::output::{create_formatter, OutputConfig};
use relmon::progress::ScanProgress;
use relmon::remote::GithubClient;
use relmon::scanner::{ScanOptions, Scanner};
use relmon::store::ReferenceStore;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Route logs to stderr so the report on stdout stays clean
fn init_tracing(args: &CliArgs) {
    let default_filter = if args.verbose {
        "relmon=debug"
    } else if args.quiet {
        "relmon=error"
    } else {
        "relmon=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let token = args.resolved_token();
    if token.is_none() && !args.dry_run {
        warn!("no API token configured; issue creation will likely be rejected");
    }

    let timeout = Duration::from_secs(args.timeout);
    let github = Arc::new(GithubClient::with_endpoints(
        token.as_deref(),
        timeout,
        &args.api_url,
        &args.raw_url,
    )?);

    // An unreadable reference baseline aborts the pass outright
    let store = ReferenceStore::load(&args.refs)?;

    let config_source =
        RawFileConfigSource::new(Arc::clone(&github), &args.branch, &args.config_name);
    let sink: Box<dyn NotificationSink> = if args.dry_run {
        Box::new(ConsoleSink)
    } else {
        Box::new(GithubIssueSink::new(Arc::clone(&github)))
    };
    let options = ScanOptions {
        dry_run: args.dry_run,
        persist: !args.no_persist,
    };

    let mut scanner = Scanner::new(store, github, Box::new(config_source), sink, options)?;

    let progress = ScanProgress::new(!args.quiet && !args.json);
    let report = scanner.run(&args.repos, &progress).await;
    progress.finish();

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.has_failures() {
        // Partial success - some dependencies failed to check or notify
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
