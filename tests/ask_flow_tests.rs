mod common;

use std::sync::Arc;
use std::time::Duration;

use common::create_orchestrator;
use deskprompt::clipboard::{ClipboardOp, MemoryClipboard, Snapshot};
use deskprompt::conversations::CONVERSATIONS_UNAVAILABLE;
use deskprompt::target::{FakeTarget, TargetEvent};
use deskprompt::watcher::{TIMEOUT_MESSAGE, WatchOutcome};
use deskprompt::AutomationError;
use tokio::time::Instant;

/// Two asks issued back to back are dispatched at least the interval apart
#[tokio::test(start_paused = true)]
async fn test_back_to_back_asks_respect_interval() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let orch = create_orchestrator(FakeTarget::new().with_outputs(["ok"]), clipboard, 200);

    orch.ask("first", None, Some(Duration::from_millis(200)))
        .await
        .unwrap();
    let first = orch.last_dispatch().await.unwrap();
    orch.ask("second", None, Some(Duration::from_millis(200)))
        .await
        .unwrap();
    let second = orch.last_dispatch().await.unwrap();

    assert!(second - first >= Duration::from_millis(200));
}

/// The full prompt reaches the target through the clipboard and the user's
/// clipboard is put back afterwards
#[tokio::test(start_paused = true)]
async fn test_prompt_transits_clipboard_and_is_restored() {
    let prompt = "Line one with \"quotes\"\nLine two: naïve café 🚀";
    let clipboard = Arc::new(MemoryClipboard::with_content("copied earlier"));
    let orch = create_orchestrator(
        FakeTarget::new().with_outputs(["Sure"]),
        clipboard.clone(),
        200,
    );

    orch.ask(prompt, None, None).await.unwrap();

    assert!(
        orch.target()
            .events()
            .contains(&TargetEvent::Paste(Some(prompt.to_string())))
    );
    assert_eq!(
        clipboard.ops(),
        vec![
            ClipboardOp::Read,
            ClipboardOp::Write(prompt.to_string()),
            ClipboardOp::Restore(Snapshot::Text("copied earlier".to_string())),
        ]
    );
}

/// Focus failure aborts the ask but the clipboard snapshot still comes back
#[tokio::test(start_paused = true)]
async fn test_focus_failure_restores_clipboard() {
    let clipboard = Arc::new(MemoryClipboard::with_content("precious"));
    let orch = create_orchestrator(FakeTarget::new().failing_focus(), clipboard.clone(), 200);

    let err = orch.ask("hello", None, None).await.unwrap_err();

    assert!(matches!(err, AutomationError::InputDelivery(_)));
    assert_eq!(clipboard.content().as_deref(), Some("precious"));
    assert!(!orch.target().events().contains(&TargetEvent::Submit));
}

/// An ask against a target that stops growing completes with the full text
#[tokio::test(start_paused = true)]
async fn test_response_completes_after_stability() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let target =
        FakeTarget::new().with_outputs(["", "", "Rust", "Rust is a", "Rust is a language."]);
    let orch = create_orchestrator(target, clipboard, 200);

    let outcome = orch.ask("What is Rust?", None, None).await.unwrap();

    assert_eq!(outcome, WatchOutcome::Complete("Rust is a language.".to_string()));
    // one read before sending, five scripted samples, then three unchanged repeats
    assert_eq!(orch.target().read_count(), 9);
}

/// A response that keeps growing past the deadline comes back partial
#[tokio::test(start_paused = true)]
async fn test_never_settling_response_returns_partial_text() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let lengths: Vec<usize> = (1..=200).collect();
    let orch = create_orchestrator(
        FakeTarget::new().with_output_lengths(&lengths),
        clipboard,
        200,
    );

    let outcome = orch.ask("Write forever", None, None).await.unwrap();

    assert!(!outcome.is_complete());
    let text = outcome.into_text();
    assert!(!text.is_empty());
    assert_ne!(text, TIMEOUT_MESSAGE);
}

/// Nothing ever rendered means the fixed timeout message
#[tokio::test(start_paused = true)]
async fn test_silent_target_returns_timeout_message() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let orch = create_orchestrator(FakeTarget::new(), clipboard, 200);
    let start = Instant::now();

    let outcome = orch.ask("Hello?", None, None).await.unwrap();

    assert_eq!(outcome.into_text(), TIMEOUT_MESSAGE);
    assert!(start.elapsed() >= Duration::from_millis(500));
}

/// The answer already on screen from the last prompt is never mistaken for the new one
#[tokio::test(start_paused = true)]
async fn test_stale_answer_is_skipped_until_generation_starts() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let target = FakeTarget::new()
        .with_surface("Rust is a language.")
        .with_outputs([
            "Rust is a language.",
            "Rust is a language.",
            "Rust is a language.",
            "Rust is a language.",
            "What about Go?",
            "Go is",
            "Go is also a language.",
        ]);
    let orch = create_orchestrator(target, clipboard, 200);

    let outcome = orch.ask("What about Go?", None, None).await.unwrap();

    assert_eq!(outcome, WatchOutcome::Complete("Go is also a language.".to_string()));
}

/// Asking in a named conversation opens it before typing
#[tokio::test(start_paused = true)]
async fn test_ask_in_named_conversation() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let target = FakeTarget::new()
        .with_labels(["New chat", "Trip ideas"])
        .with_outputs(["Pack light."]);
    let orch = create_orchestrator(target, clipboard, 200);

    orch.ask("Tips?", Some("Trip ideas"), None).await.unwrap();

    let events = orch.target().events();
    let open = events
        .iter()
        .position(|e| *e == TargetEvent::OpenConversation("Trip ideas".to_string()))
        .unwrap();
    let focus = events
        .iter()
        .position(|e| *e == TargetEvent::FocusInput)
        .unwrap();
    assert!(open < focus);
}

/// A target that is not running gets launched before anything else
#[tokio::test(start_paused = true)]
async fn test_target_is_launched_on_demand() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let orch = create_orchestrator(
        FakeTarget::new().not_running().with_labels(["Recipes"]),
        clipboard,
        200,
    );

    let labels = orch.list_conversations().await.unwrap();

    assert_eq!(labels, vec!["Recipes"]);
    assert_eq!(orch.target().events()[0], TargetEvent::Launch);
}

/// Listing problems degrade to a single sentinel entry
#[tokio::test(start_paused = true)]
async fn test_listing_failure_returns_sentinel() {
    let clipboard = Arc::new(MemoryClipboard::new());
    let orch = create_orchestrator(FakeTarget::new().failing_listing(), clipboard, 200);

    let labels = orch.list_conversations().await.unwrap();

    assert_eq!(labels, vec![CONVERSATIONS_UNAVAILABLE.to_string()]);
}
