mod common;

use common::create_handler;
use deskprompt::server::{RpcResponse, serve};
use deskprompt::target::FakeTarget;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Feed `input` to the server and collect every response line it writes
async fn run_session(target: FakeTarget, input: &str) -> Vec<RpcResponse> {
    let handler = create_handler(target);
    let (mut client, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);

    client.write_all(input.as_bytes()).await.unwrap();
    client.shutdown().await.unwrap();

    serve(BufReader::new(server_read), server_write, &handler)
        .await
        .unwrap();

    let mut reader = BufReader::new(client);
    let mut responses = Vec::new();
    let mut line = String::new();
    while reader.read_line(&mut line).await.unwrap() > 0 {
        responses.push(serde_json::from_str(&line).unwrap());
        line.clear();
    }
    responses
}

fn lines(messages: &[Value]) -> String {
    messages
        .iter()
        .map(|m| format!("{}\n", m))
        .collect::<String>()
}

/// Handshake, discovery, and a listing call in one session
#[tokio::test(start_paused = true)]
async fn test_full_session() {
    let input = lines(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
            "name": "chatgpt",
            "arguments": {"operation": "get_conversations"}
        }}),
    ]);

    let target = FakeTarget::new().with_labels(["New chat", "Recipes"]);
    let responses = run_session(target, &input).await;

    // the notification gets no reply
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].id, json!(1));
    assert_eq!(responses[1].result.as_ref().unwrap()["tools"][0]["name"], "chatgpt");

    let call = responses[2].result.as_ref().unwrap();
    assert_eq!(call["isError"], false);
    assert_eq!(call["content"][0]["text"], "Found 1 conversation:\n\nRecipes");
}

/// Ask round trip over the wire
#[tokio::test(start_paused = true)]
async fn test_ask_over_stdio() {
    let input = lines(&[json!({"jsonrpc": "2.0", "id": "a1", "method": "tools/call", "params": {
        "name": "chatgpt",
        "arguments": {"operation": "ask", "prompt": "Capital of France?"}
    }})]);

    let responses = run_session(FakeTarget::new().with_outputs(["Paris."]), &input).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].id, json!("a1"));
    let result = responses[0].result.as_ref().unwrap();
    assert_eq!(result["content"][0]["text"], "Paris.");
    assert_eq!(result["isError"], false);
}

/// Validation errors come back as tool errors, not protocol errors
#[tokio::test(start_paused = true)]
async fn test_missing_prompt_is_tool_error() {
    let input = lines(&[json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {
        "name": "chatgpt",
        "arguments": {"operation": "ask"}
    }})]);

    let responses = run_session(FakeTarget::new(), &input).await;

    let result = responses[0].result.as_ref().unwrap();
    assert_eq!(result["isError"], true);
    assert!(
        result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Error: ")
    );
}

/// Garbage lines produce a parse error and the session keeps going
#[tokio::test(start_paused = true)]
async fn test_malformed_line_then_valid_request() {
    let input = format!(
        "not json at all\n\n{}\n",
        json!({"jsonrpc": "2.0", "id": 7, "method": "ping"})
    );

    let responses = run_session(FakeTarget::new(), &input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].id, Value::Null);
    assert_eq!(responses[0].error.as_ref().unwrap().code, -32700);
    assert_eq!(responses[1].id, json!(7));
    assert!(!responses[1].is_error());
}

/// Unreachable target surfaces as an error result with the Error prefix
#[tokio::test(start_paused = true)]
async fn test_unreachable_target_over_stdio() {
    let input = lines(&[json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call", "params": {
        "name": "chatgpt",
        "arguments": {"operation": "get_conversations"}
    }})]);

    let responses = run_session(FakeTarget::new().not_running().failing_launch(), &input).await;

    let result = responses[0].result.as_ref().unwrap();
    assert_eq!(result["isError"], true);
    assert!(
        result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("unreachable")
    );
}
