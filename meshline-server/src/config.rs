use clap::Parser;
use meshline_core::IceServerConfig;
use meshline_core::utils::DEFAULT_STUN_ADDR;
use std::net::SocketAddr;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "meshline-server",
    about = "Room coordination and signaling relay for peer-to-peer mesh calls"
)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    #[arg(long, env = "MESHLINE_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// STUN/TURN urls handed to clients. Repeat or comma-separate.
    #[arg(
        long = "ice-server",
        env = "MESHLINE_ICE_SERVERS",
        value_delimiter = ',',
        default_value = DEFAULT_STUN_ADDR
    )]
    pub ice_servers: Vec<String>,

    /// Default tracing filter when RUST_LOG is unset.
    #[arg(long, env = "MESHLINE_LOG", default_value = "info")]
    pub log_level: String,

    /// Largest accepted audio/image upload.
    #[arg(long, env = "MESHLINE_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Capacity of the session coordinator's command queue.
    #[arg(long, default_value_t = 100)]
    pub session_queue: usize,
}

impl ServerConfig {
    pub fn ice_server_configs(&self) -> Vec<IceServerConfig> {
        if self.ice_servers.is_empty() {
            return Vec::new();
        }
        vec![IceServerConfig {
            urls: self.ice_servers.clone(),
            username: None,
            credential: None,
        }]
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ice_servers: vec![DEFAULT_STUN_ADDR.to_owned()],
            log_level: "info".to_owned(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_queue: 100,
        }
    }
}
