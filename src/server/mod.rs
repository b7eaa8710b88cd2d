// Tool server: JSON-RPC over newline-delimited stdio.
// Exposes a single tool backed by the orchestrator.

pub mod handler;
pub mod protocol;
pub mod stdio;
pub mod tool;

pub use handler::ToolHandler;
pub use protocol::{RpcRequest, RpcResponse};
pub use stdio::{serve, serve_stdio};
pub use tool::ToolOutput;
