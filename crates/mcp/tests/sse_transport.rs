//! Legacy HTTP+SSE transport against an in-process server.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use futures::{Stream, StreamExt, stream};
use mcp::{Error, Session, Transport};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

#[derive(Clone, Default)]
struct TestState {
    client: Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>,
    calls: Arc<Mutex<Vec<Value>>>,
}

async fn sse_handler(
    State(state): State<TestState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    *state.client.lock().await = Some(tx);

    let endpoint = stream::once(async {
        Ok::<_, Infallible>(Event::default().event("endpoint").data("/message?sessionId=test"))
    });
    let messages = UnboundedReceiverStream::new(rx)
        .map(|data| Ok::<_, Infallible>(Event::default().event("message").data(data)));

    Sse::new(endpoint.chain(messages))
}

async fn post_handler(
    State(state): State<TestState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let method = body.get("method").and_then(Value::as_str).unwrap_or("");
    let id = body.get("id").cloned().unwrap_or(Value::Null);

    let result = match method {
        "initialize" => json!({
            "protocolVersion": "2024-11-05",
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": "test-mcp", "version": "1.0.0" }
        }),
        "tools/list" => json!({
            "tools": [
                {
                    "name": "get_time",
                    "description": "Current time",
                    "inputSchema": { "type": "object", "properties": {} }
                },
                {
                    "name": "explode",
                    "description": "Always fails",
                    "inputSchema": { "type": "object", "properties": {} }
                }
            ]
        }),
        "tools/call" => {
            let params = body.get("params").cloned().unwrap_or(Value::Null);
            state.calls.lock().await.push(params.clone());
            match params.get("name").and_then(Value::as_str) {
                Some("unreachable") => return StatusCode::INTERNAL_SERVER_ERROR,
                Some("garbled") => {
                    if let Some(client) = state.client.lock().await.as_ref() {
                        let _ = client.send("{not json".to_string());
                    }
                    return StatusCode::ACCEPTED;
                }
                Some("get_time") => json!({
                    "content": [{ "type": "text", "text": "14:32 UTC" }],
                    "isError": false
                }),
                _ => json!({
                    "content": [{ "type": "text", "text": "boom" }],
                    "isError": true
                }),
            }
        }
        // Notifications get no response.
        _ => return StatusCode::ACCEPTED,
    };

    let payload = json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string();
    if let Some(client) = state.client.lock().await.as_ref() {
        let _ = client.send(payload);
    }
    StatusCode::ACCEPTED
}

async fn spawn_server() -> (String, TestState) {
    let state = TestState::default();
    let app = Router::new()
        .route("/sse", get(sse_handler))
        .route("/message", post(post_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/sse"), state)
}

#[tokio::test]
async fn sse_session_lists_and_calls_tools() {
    let (url, state) = spawn_server().await;

    let session = Session::connect(Transport::Sse { url })
        .await
        .expect("connect over SSE");

    let tools = session.list_tools().await.expect("list tools");
    let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(names, ["get_time", "explode"]);

    let arguments = json!({ "zone": "UTC" }).as_object().cloned();
    let result = session
        .call_tool("get_time", arguments)
        .await
        .expect("call get_time");
    let text = result.content[0].as_text().expect("text content");
    assert_eq!(text.text, "14:32 UTC");

    let calls = state.calls.lock().await.clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["arguments"], json!({ "zone": "UTC" }));

    session.close().await.expect("close");
}

#[tokio::test]
async fn flagged_tool_result_is_an_error() {
    let (url, _state) = spawn_server().await;

    let session = Session::connect(Transport::Sse { url })
        .await
        .expect("connect over SSE");

    let err = session.call_tool("explode", None).await.unwrap_err();
    assert!(matches!(err, Error::ToolCallFailed(ref text) if text == "boom"));
}

#[tokio::test]
async fn missing_server_fails_to_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = Session::connect(Transport::Sse {
        url: format!("http://{addr}/sse"),
    })
    .await;
    assert!(matches!(result, Err(Error::Http(_))));
}

#[tokio::test]
async fn rejected_post_fails_the_pending_call() {
    let (url, _state) = spawn_server().await;

    let session = Session::connect(Transport::Sse { url })
        .await
        .expect("connect over SSE");

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        session.call_tool("unreachable", None),
    )
    .await
    .expect("call should fail rather than hang");
    assert!(result.is_err());
}

#[tokio::test]
async fn undecodable_message_fails_the_pending_call() {
    let (url, _state) = spawn_server().await;

    let session = Session::connect(Transport::Sse { url })
        .await
        .expect("connect over SSE");

    let result = tokio::time::timeout(Duration::from_secs(5), session.call_tool("garbled", None))
        .await
        .expect("call should fail rather than hang");
    assert!(result.is_err());
}
