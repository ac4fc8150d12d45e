pub mod api;
pub mod config;
pub mod logging;
pub mod registry;
pub mod server;
pub mod session;
pub mod signaling;

pub use config::ServerConfig;
pub use registry::Registry;
pub use server::{AppState, ServerHandle, app, build_router, run, spawn, start_session};
pub use session::{SessionCommand, SessionCoordinator, SessionStats};
pub use signaling::{SignalingOutput, SignalingService, ws_handler};
