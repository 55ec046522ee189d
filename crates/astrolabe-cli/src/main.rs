//! Astrolabe command-line front-end.
//!
//! Usage:
//!   astrolabe list --query bar
//!   astrolabe draft simple-bar spec.json
//!   astrolabe save simple-bar spec.json
//!   astrolabe --data-dir /tmp/snippets export backup.json

use std::io;

use astrolabe_core::WorkbenchConfig;
use clap::Parser;
use env_logger::{Builder, Env};

mod cli;
mod commands;
mod renderer;

use crate::cli::Cli;
use crate::commands::{CliError, Session};

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v
    Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn load_config(cli: &Cli) -> Result<WorkbenchConfig, CliError> {
    let mut config = match (WorkbenchConfig::from_env(), &cli.data_dir) {
        (Ok(config), _) => config,
        (Err(e), Some(dir)) => {
            log::debug!("Environment config unavailable ({}), using --data-dir", e);
            WorkbenchConfig::new(dir.clone())
        }
        (Err(e), None) => return Err(astrolabe_core::WorkbenchError::from(e).into()),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    log::debug!("Using data directory {}", config.data_dir.display());

    let session = Session::open(&config)?;
    let mut stdout = io::stdout().lock();
    session.execute(cli.command, &mut stdout)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        log::debug!("{:?}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn flags_override_environment_config() {
        let cli = Cli::try_parse_from([
            "astrolabe",
            "--data-dir",
            "/tmp/astrolabe-data",
            "--log-dir",
            "/tmp/astrolabe-logs",
            "list",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();

        assert_eq!(config.data_dir, Path::new("/tmp/astrolabe-data"));
        assert_eq!(config.log_dir.as_deref(), Some(Path::new("/tmp/astrolabe-logs")));
    }
}
