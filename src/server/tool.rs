use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const TOOL_NAME: &str = "chatgpt";
pub const NO_RESPONSE: &str = "No response received.";
pub const NO_CONVERSATIONS: &str = "No conversations found.";

/// Tool description advertised through `tools/list`.
pub fn definition() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Ask the ChatGPT desktop app a question or list its conversations.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["ask", "get_conversations"],
                    "description": "Operation to perform: 'ask' or 'get_conversations'"
                },
                "prompt": {
                    "type": "string",
                    "description": "The prompt to send (required for ask)"
                },
                "conversation_id": {
                    "type": "string",
                    "description": "Conversation to continue (optional)"
                },
                "delay_ms": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Minimum milliseconds since the previous ask (default 120000)"
                }
            },
            "required": ["operation"]
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Result payload of a `tools/call`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            is_error: true,
            ..Self::text(format!("Error: {}", message))
        }
    }

    pub fn first_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

pub fn format_answer(text: String) -> String {
    if text.trim().is_empty() {
        NO_RESPONSE.to_string()
    } else {
        text
    }
}

pub fn format_conversations(labels: &[String]) -> String {
    match labels.len() {
        0 => NO_CONVERSATIONS.to_string(),
        1 => format!("Found 1 conversation:\n\n{}", labels[0]),
        n => format!("Found {} conversations:\n\n{}", n, labels.join("\n")),
    }
}
