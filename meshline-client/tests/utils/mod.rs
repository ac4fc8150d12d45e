
pub use mock_link::*;

use meshline_client::{ClientHandle, TopologySnapshot};
use meshline_server::{ServerConfig, ServerHandle};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::Level;

/// Timeout for a mesh to settle (ms).
pub const SETTLE_TIMEOUT_MS: u64 = 5000;

/// Timeout for real ICE connectivity on loopback (ms).
pub const CONNECTION_TIMEOUT_MS: u64 = 15000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn spawn_server() -> ServerHandle {
    init_tracing();
    let config = ServerConfig {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        ice_servers: vec![],
        ..ServerConfig::default()
    };
    meshline_server::spawn(config)
        .await
        .expect("Failed to spawn server")
}

/// Polls the client's topology until `check` holds.
pub async fn wait_for_topology<F>(
    client: &ClientHandle,
    timeout_ms: u64,
    check: F,
) -> anyhow::Result<TopologySnapshot>
where
    F: Fn(&TopologySnapshot) -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        let snapshot = client.snapshot().await?;
        if check(&snapshot) {
            return Ok(snapshot);
        }
        if start.elapsed() > timeout {
            anyhow::bail!("Timeout waiting for topology (last: {:?})", snapshot);
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
