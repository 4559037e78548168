mod cli_logger;

use clap::Parser;
use pprof_lens::cmd::{ProfileCommand, profile_command};
use pprof_lens::{Config, DEFAULT_CONFIG_FILE, LensError};
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;
use std::process::ExitCode;

use cli_logger::CliLogger;

#[derive(Debug, Parser)]
#[command(name = "pprof-lens", version, about = "Hotspot, diff and heap-trend reports for Go pprof profiles")]
struct Cli {
    /// Config file (defaults to ./pprof-lens.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print errors as JSON objects on stdout
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: ProfileCommand,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = CliLogger::new(cli.json, cli.no_color);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if cli.config.is_some() && !config_path.exists() {
        logger.print_warning(&format!("config {} not found, using defaults", config_path.display()));
    }
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || Config::load_optional(&config_path));
    init_tracing(&config, cli.no_color);

    match run(&config, &cli.command) {
        Ok(report) => {
            logger.print_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.downcast_ref::<LensError>().map_or("ERROR", LensError::code);
            tracing::debug!(code, "command failed");
            logger.print_error(code, &format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, command: &ProfileCommand) -> anyhow::Result<String> {
    Ok(profile_command(config, command)?)
}

/// `RUST_LOG`, then `LOG_LEVEL`, then the config's `log_level`.
fn init_tracing(config: &Config, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level_env = std::env::var("LOG_LEVEL").ok();
        EnvFilter::new(config.log_directive(level_env.as_deref()))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}
