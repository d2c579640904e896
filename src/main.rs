//! apitest - run declarative HTTP API suites.
//!
//! Usage:
//!   apitest <path>
//!
//! `<path>` is a suite file or a directory searched for `*.test.json` files.
//! Exits with 0 when every unit passed or was skipped, 1 when a unit failed or
//! the suites could not be loaded, and 2 on usage or configuration errors.

use std::process::ExitCode;

use futures_util::StreamExt;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use apitest::config::{ConfigHandle, RunnerConfig};
use apitest::models::{RunSummary, TestStatus};
use apitest::services::HttpRunner;

fn print_usage() {
    eprintln!("Usage: apitest <path>");
    eprintln!();
    eprintln!("Environment variables:");
    eprintln!("  APITEST_LOAD_CONCURRENT  Suite files loaded at once (default: CPU count, at least 2)");
    eprintln!("  APITEST_URL_PREFIX       Prefix for every suite URL");
    eprintln!("  APITEST_COOKIES          Cookies for every request (name=value; name2=value2)");
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::from(2);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    let root = match args.as_slice() {
        [path] => path.clone(),
        _ => {
            print_usage();
            return ExitCode::from(2);
        }
    };

    let config = match RunnerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let runner = match HttpRunner::http(ConfigHandle::new(config)) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Failed to create HTTP transport: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut summary = RunSummary::default();
    let mut fatal = false;
    let mut results = runner.start(&root);

    while let Some(item) = results.next().await {
        match item {
            Ok(result) => {
                match result.status {
                    TestStatus::Failed => warn!(
                        "FAIL {} > {} ({}): {}",
                        result.suite_name,
                        result.unit_name,
                        result.file_path.display(),
                        result
                            .error
                            .as_ref()
                            .map(|e| e.to_string())
                            .unwrap_or_default()
                    ),
                    status => info!(
                        "{} {} > {} ({}ms)",
                        status.as_str().to_uppercase(),
                        result.suite_name,
                        result.unit_name,
                        result.duration_ms
                    ),
                }
                summary.record(&result);
            }
            Err(e) => {
                error!("Run aborted: {}", e);
                fatal = true;
            }
        }
    }

    info!("{}", summary);

    if fatal || summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
