use clap::Parser;
use finapp_sync::args::{Args, Command};
use finapp_sync::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().finapp_home();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.credentials()).await?.print(),

        Command::Auth => commands::auth(&Config::load(home).await?).await?.print(),

        Command::Dashboard(dashboard_args) => {
            commands::dashboard(Config::load(home).await?, dashboard_args.clone())
                .await?
                .print()
        }

        Command::Append(append_args) => {
            commands::append(Config::load(home).await?, append_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the default log level for this crate only.
            EnvFilter::new(format!(
                "finapp_sync={},{}={}",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
