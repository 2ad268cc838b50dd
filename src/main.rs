use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use u_nrp::experiment::ExperimentDriver;

/// Runs an NRP experiment described by a JSON config file.
#[derive(Debug, Parser)]
#[command(name = "u-nrp", version, about)]
struct Cli {
    /// Experiment config file.
    config: PathBuf,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = ExperimentDriver::from_config_file(&cli.config).and_then(|mut driver| driver.run());
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(event = "experiment_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
