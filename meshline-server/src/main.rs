use clap::Parser;
use meshline_server::{ServerConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    logging::init(&config.log_level);

    meshline_server::run(config).await
}
