use meshline_core::IceServerConfig;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the signaling server, e.g. `ws://host:5000/ws`.
    pub server_url: String,
    /// Overrides the servers announced in `ice_config` when non-empty.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:5000/ws".to_owned(),
            ice_servers: vec![],
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    pub(crate) fn resolve_ice_servers(&self, announced: Vec<IceServerConfig>) -> Vec<IceServerConfig> {
        if self.ice_servers.is_empty() {
            announced
        } else {
            self.ice_servers.clone()
        }
    }
}
