use thiserror::Error;

/// Failures raised while driving the target application.
///
/// `InvalidRequest`, `UnreachableTarget` and `InputDelivery` abort a call. `Enumeration`
/// is absorbed by the conversation lister, and a response that never settles
/// is reported through `WatchOutcome`, not here.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("target application unreachable: {0}")]
    UnreachableTarget(String),

    #[error("could not deliver input: {0}")]
    InputDelivery(String),

    #[error("could not enumerate conversations: {0}")]
    Enumeration(String),

    #[error("automation script failed: {0}")]
    Script(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
}

pub type AutomationResult<T> = Result<T, AutomationError>;

/// Argument validation failures for incoming tool calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("missing required argument: operation")]
    MissingOperation,

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("prompt is required for the ask operation")]
    EmptyPrompt,

    #[error("delay_ms must be a non-negative integer")]
    InvalidDelay,
}
