mod cli;
mod runner;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    utils::init_logging(&cli.log_level, cli.json_log);

    match runner::run(&cli) {
        Ok(Some(summary)) => {
            info!(
                "Review finished from frame {}: {} accepted, {} rejected, {} skipped",
                summary.start, summary.accepted, summary.rejected, summary.skipped
            );
            ExitCode::SUCCESS
        }
        // 操作员主动中止不算失败.
        Ok(None) => {
            utils::sep();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
