use anyhow::Result;
use tracing_subscriber::EnvFilter;

use lotto_lib::api::StubbedLotteryApi;
use lotto_lib::config;
use lotto_lib::connection::open_database;
use lotto_lib::mcp_handler::{MCPHandler, stdio};
use lotto_lib::use_cases::UseCases;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Let's roll your lottery numbers.");

    let db = open_database(&config.database_url)?;
    let api = StubbedLotteryApi::new(config.simulated_delay());
    let handler = MCPHandler::new(UseCases::new(api, db));

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
