use std::time::Duration;

use serde_json::Value;

use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ask,
    GetConversations,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Ask => "ask",
            Operation::GetConversations => "get_conversations",
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(Operation::Ask),
            "get_conversations" => Ok(Operation::GetConversations),
            other => Err(RequestError::UnknownOperation(other.to_string())),
        }
    }
}

/// A validated tool call. `prompt` is present and non-empty exactly when
/// the operation is `Ask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub prompt: Option<String>,
    pub conversation_id: Option<String>,
    pub delay_override: Option<Duration>,
}

impl Request {
    pub fn ask(prompt: impl Into<String>) -> Result<Self, RequestError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }
        Ok(Self {
            operation: Operation::Ask,
            prompt: Some(prompt),
            conversation_id: None,
            delay_override: None,
        })
    }

    pub fn get_conversations() -> Self {
        Self {
            operation: Operation::GetConversations,
            prompt: None,
            conversation_id: None,
            delay_override: None,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_override = Some(delay);
        self
    }

    /// Validates a tool call's JSON arguments.
    pub fn from_args(args: &Value) -> Result<Self, RequestError> {
        let operation: Operation = args
            .get("operation")
            .and_then(Value::as_str)
            .ok_or(RequestError::MissingOperation)?
            .parse()?;

        let conversation_id = args
            .get("conversation_id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from);

        let request = match operation {
            Operation::GetConversations => Self::get_conversations(),
            Operation::Ask => {
                let prompt = args
                    .get("prompt")
                    .and_then(Value::as_str)
                    .ok_or(RequestError::EmptyPrompt)?;
                let mut request = Self::ask(prompt)?;
                request.delay_override = match args.get("delay_ms") {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(Duration::from_millis(
                        value.as_u64().ok_or(RequestError::InvalidDelay)?,
                    )),
                };
                request
            }
        };

        Ok(Self {
            conversation_id,
            ..request
        })
    }
}
