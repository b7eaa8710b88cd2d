// Library exports for deskprompt
// This allows the test suite to import modules

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod conversations;
pub mod error;
pub mod orchestrator;
pub mod pacing;
pub mod request;
pub mod server;
pub mod target;
pub mod transport;
pub mod watcher;

pub use error::{AutomationError, RequestError};
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use request::{Operation, Request};
pub use watcher::WatchOutcome;
