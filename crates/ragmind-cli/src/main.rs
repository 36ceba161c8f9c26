//! ragmind CLI entry point.

use clap::Parser;
use ragmind_cli::{load_config, log_directive, run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal.
    let _ = ragmind_core::env::load_dotenv();

    let cli = Cli::parse();

    let configured = load_config(cli.config.as_deref())
        .map(|c| c.logging.level)
        .unwrap_or_default();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_directive(cli.verbose, configured).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli).await
}
