// Conversation selection and listing. Both are advisory: failures degrade
// to "current conversation" or a sentinel entry, never to an error.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{AutomationError, AutomationResult};
use crate::target::TargetApp;

/// Single entry returned when the navigation surface could not be read.
pub const CONVERSATIONS_UNAVAILABLE: &str = "Unable to retrieve conversations";

/// Opens the conversation labelled `reference`, waiting `settle` afterwards.
///
/// Returns whether the switch happened. Any failure leaves the currently
/// active conversation in place.
pub async fn select<T>(target: &T, reference: &str, settle: Duration) -> bool
where
    T: TargetApp + ?Sized,
{
    match target.open_conversation(reference).await {
        Ok(true) => {
            debug!(conversation = reference, "switched conversation");
            sleep(settle).await;
            true
        }
        Ok(false) => {
            warn!(
                conversation = reference,
                "no matching conversation, using the active one"
            );
            false
        }
        Err(e) => {
            warn!(
                conversation = reference,
                error = %e,
                "conversation switch failed, using the active one"
            );
            false
        }
    }
}

/// Reads visible conversation labels, dropping the new-conversation entry.
pub async fn try_list<T>(target: &T, new_conversation_label: &str) -> AutomationResult<Vec<String>>
where
    T: TargetApp + ?Sized,
{
    target
        .activate()
        .await
        .map_err(|e| AutomationError::Enumeration(e.to_string()))?;

    let labels = target
        .conversation_labels()
        .await
        .map_err(|e| AutomationError::Enumeration(e.to_string()))?;

    Ok(labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty() && label != new_conversation_label)
        .collect())
}

/// Like `try_list`, but a failure yields `[CONVERSATIONS_UNAVAILABLE]`.
pub async fn list<T>(target: &T, new_conversation_label: &str) -> Vec<String>
where
    T: TargetApp + ?Sized,
{
    match try_list(target, new_conversation_label).await {
        Ok(labels) => labels,
        Err(e) => {
            warn!(error = %e, "conversation listing failed");
            vec![CONVERSATIONS_UNAVAILABLE.to_string()]
        }
    }
}
