mod session_command;
mod session_coordinator;

pub use session_command::*;
pub use session_coordinator::*;
