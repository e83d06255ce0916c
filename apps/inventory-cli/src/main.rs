use std::process::ExitCode;

use clap::Parser;
use db_infra::{ConnectionProvider, TracingOpsLogger};
use inventory_cli::{run, telemetry, Args};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let provider = ConnectionProvider::new();
    let logger = TracingOpsLogger;
    if args.command.needs_database() {
        if let Err(e) = provider.init_from_env(&logger) {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    }

    match run(&args.command, &provider, &logger).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}
