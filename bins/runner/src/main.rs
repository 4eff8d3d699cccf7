//! Closeflow close runner
//!
//! Runs the pipeline described by a configuration file and prints one JSON
//! step log per line on stdout.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use closeflow_core::{Runner, TableStore};
use closeflow_shared::PipelineConfig;

const USAGE: &str = "usage: closeflow <config.(yaml|json|toml)> [--csv] [--json-logs]";

/// Exit code for bad command-line usage.
const EXIT_USAGE: u8 = 64;

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: String,
    csv: bool,
    json_logs: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Option<Args> {
    let mut config = None;
    let mut csv = false;
    let mut json_logs = false;
    for arg in args {
        match arg.as_str() {
            "--csv" => csv = true,
            "--json-logs" => json_logs = true,
            flag if flag.starts_with("--") => return None,
            _ if config.is_none() => config = Some(arg),
            _ => return None,
        }
    }
    config.map(|config| Args {
        config,
        csv,
        json_logs,
    })
}

/// Process status for an error exit code; out-of-range codes become 1.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let Some(args) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(EXIT_USAGE));
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "closeflow=info,closeflow_core=info".into()),
        )
        .with(args.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!args.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = match PipelineConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.error_code(), "{e}");
            return Ok(ExitCode::from(exit_status(e.exit_code())));
        }
    };

    let tables = if args.csv {
        TableStore::delimited()
    } else {
        TableStore::detect()
    };

    let logs = match Runner::with_builtin_steps(tables).run(&config) {
        Ok(logs) => logs,
        Err(e) => {
            error!(code = e.error_code(), "{e}");
            return Ok(ExitCode::from(exit_status(e.exit_code())));
        }
    };

    for log in &logs {
        println!("{}", serde_json::to_string(log)?);
    }

    let failed = logs.iter().filter(|log| !log.is_ok()).count();
    info!(steps = logs.len(), failed, "Close run complete");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
