use serde_json::{Value, json};
use tracing::{debug, warn};

use super::protocol::{RpcRequest, RpcResponse, codes};
use super::tool::{self, TOOL_NAME, ToolOutput};
use crate::clipboard::SideChannel;
use crate::orchestrator::Orchestrator;
use crate::request::{Operation, Request};
use crate::target::TargetApp;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Dispatches JSON-RPC methods to the orchestrator.
pub struct ToolHandler<T, C> {
    orchestrator: Orchestrator<T, C>,
    name: String,
    version: String,
}

impl<T, C> ToolHandler<T, C>
where
    T: TargetApp,
    C: SideChannel,
{
    pub fn new(orchestrator: Orchestrator<T, C>, version: impl Into<String>) -> Self {
        Self {
            orchestrator,
            name: env!("CARGO_PKG_NAME").to_string(),
            version: version.into(),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<T, C> {
        &self.orchestrator
    }

    /// Handles one message. Notifications never produce a response.
    pub async fn handle(&self, request: &RpcRequest) -> Option<RpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => RpcResponse::ok(id, self.handle_initialize()),
            "ping" => RpcResponse::ok(id, json!({})),
            "tools/list" => RpcResponse::ok(id, json!({ "tools": [tool::definition()] })),
            "tools/call" => self.handle_tools_call(id, &request.params).await,
            other => RpcResponse::err(
                id,
                codes::METHOD_NOT_FOUND,
                format!("unknown method: {}", other),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.name,
                "version": self.version
            }
        })
    }

    async fn handle_tools_call(&self, id: Value, params: &Value) -> RpcResponse {
        let name = params.get("name").and_then(Value::as_str);
        if name != Some(TOOL_NAME) {
            return RpcResponse::err(
                id,
                codes::INVALID_PARAMS,
                format!("unknown tool: {}", name.unwrap_or("<missing>")),
            );
        }

        let args = params.get("arguments").unwrap_or(&Value::Null);
        let output = self.call_tool(args).await;
        match serde_json::to_value(&output) {
            Ok(result) => RpcResponse::ok(id, result),
            Err(e) => RpcResponse::err(id, codes::INVALID_REQUEST, e.to_string()),
        }
    }

    /// Runs the tool with raw JSON arguments. Validation happens first, so a
    /// bad call never reaches the rate limiter or the target.
    pub async fn call_tool(&self, args: &Value) -> ToolOutput {
        let request = match Request::from_args(args) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "rejected tool call");
                return ToolOutput::error(e);
            }
        };
        self.execute(&request).await
    }

    pub async fn execute(&self, request: &Request) -> ToolOutput {
        match request.operation {
            Operation::Ask => {
                let prompt = request.prompt.as_deref().unwrap_or_default();
                match self
                    .orchestrator
                    .ask(
                        prompt,
                        request.conversation_id.as_deref(),
                        request.delay_override,
                    )
                    .await
                {
                    Ok(outcome) => ToolOutput::text(tool::format_answer(outcome.into_text())),
                    Err(e) => ToolOutput::error(e),
                }
            }
            Operation::GetConversations => match self.orchestrator.list_conversations().await {
                Ok(labels) => ToolOutput::text(tool::format_conversations(&labels)),
                Err(e) => ToolOutput::error(e),
            },
        }
    }
}
