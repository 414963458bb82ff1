//! sa-login - periodic Kubernetes service account login

use clap::Parser;

mod cli;
mod client;
mod config;
mod error;
mod runner;
mod token;

use cli::Cli;
use client::LoginClient;
use config::{ConfigLayer, Settings};
use error::Result;
use runner::ShutdownSignal;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over `--debug`
fn init_logging(debug: bool) {
    let default_filter = if debug { "info,sa_login=debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let file_layer = ConfigLayer::load_at(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.config_layer(), file_layer)?;

    log::info!("sa-login started");

    let credential = token::read_token(&settings.token_path)?;
    token::log_token_summary(&credential);

    let client = LoginClient::new(&settings)?;

    if cli.once {
        return runner::run_once(&client, &credential).await;
    }

    let shutdown = ShutdownSignal::install()?;
    log::info!(
        "Logging in to {} as role '{}' every {}s",
        client.url(),
        settings.role,
        settings.interval.as_secs()
    );

    let stopped = runner::run_loop(&client, &credential, settings.interval, shutdown.recv()).await;
    log::info!(
        "sa-login stopped after {} attempt(s): {}",
        stopped.attempts,
        stopped.reason
    );

    Ok(())
}
