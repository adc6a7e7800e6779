use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;
use workshop::commands::Cli;
use workshop::libs::messages::macros::is_debug_mode;

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Messages only reach tracing in debug mode
    if is_debug_mode() {
        init_tracing().ok();
    }

    Cli::menu().await
}
