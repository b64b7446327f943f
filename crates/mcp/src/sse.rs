//! Legacy HTTP+SSE transport.
//!
//! The server streams JSON-RPC messages as `message` events on a long-lived
//! GET request. Its first event, `endpoint`, names the URL the client POSTs
//! its own messages to. The two halves are bridged onto channels so rmcp can
//! drive them as a plain (Sink, Stream) pair.

use futures::channel::mpsc;
use futures::{SinkExt, Stream, StreamExt};
use reqwest::Url;
use reqwest::header::ACCEPT;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use sse_stream::{Sse, SseStream};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const EVENT_STREAM_MIME_TYPE: &str = "text/event-stream";
const CHANNEL_CAPACITY: usize = 32;

/// A connected SSE transport, ready to hand to rmcp.
///
/// Either task closes the inbound channel when it fails, so rmcp sees the
/// transport end and outstanding requests fail instead of waiting forever.
pub(crate) struct SseTransport {
    pub sink: mpsc::Sender<ClientJsonRpcMessage>,
    pub stream: mpsc::Receiver<ServerJsonRpcMessage>,
    /// Reader and writer tasks; aborted when the session goes away.
    pub tasks: Vec<AbortHandle>,
}

/// Open the event stream and wait for the server to announce its endpoint.
pub(crate) async fn connect(http: reqwest::Client, url: &str) -> Result<SseTransport> {
    let base = Url::parse(url).map_err(|e| Error::Endpoint(format!("{url}: {e}")))?;

    let response = http
        .get(base.clone())
        .header(ACCEPT, EVENT_STREAM_MIME_TYPE)
        .send()
        .await?
        .error_for_status()?;

    let mut events = SseStream::from_byte_stream(response.bytes_stream()).boxed();

    let endpoint = loop {
        match events.next().await {
            Some(Ok(event)) if event.event.as_deref() == Some("endpoint") => {
                break resolve_endpoint(&base, event.data.as_deref().unwrap_or_default())?;
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(Error::Endpoint(format!("event stream: {e}"))),
            None => {
                return Err(Error::Endpoint(
                    "stream closed before endpoint event".into(),
                ));
            }
        }
    };
    debug!(%endpoint, "SSE endpoint announced");

    let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let reader = tokio::spawn(forward_events(events, inbound_tx.clone()));
    let writer = tokio::spawn(post_messages(http, endpoint, outbound_rx, inbound_tx));

    Ok(SseTransport {
        sink: outbound_tx,
        stream: inbound_rx,
        tasks: vec![reader.abort_handle(), writer.abort_handle()],
    })
}

/// Resolve the endpoint event's data against the stream URL.
///
/// Servers usually send a path (`/messages?session_id=...`), sometimes an
/// absolute URL.
fn resolve_endpoint(base: &Url, data: &str) -> Result<Url> {
    let data = data.trim();
    if data.is_empty() {
        return Err(Error::Endpoint("empty endpoint event".into()));
    }
    base.join(data)
        .map_err(|e| Error::Endpoint(format!("{data}: {e}")))
}

async fn forward_events<S, E>(mut events: S, mut inbound: mpsc::Sender<ServerJsonRpcMessage>)
where
    S: Stream<Item = std::result::Result<Sse, E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("SSE stream error: {e}");
                break;
            }
        };

        match event.event.as_deref() {
            None | Some("message") => {}
            Some(other) => {
                debug!(event = other, "ignoring SSE event");
                continue;
            }
        }

        let Some(data) = event.data else {
            continue;
        };

        match serde_json::from_str::<ServerJsonRpcMessage>(&data) {
            Ok(message) => {
                if inbound.send(message).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("undecodable server message, closing transport: {e}");
                break;
            }
        }
    }
    debug!("SSE stream ended");
    inbound.close_channel();
}

async fn post_messages(
    http: reqwest::Client,
    endpoint: Url,
    mut outbound: mpsc::Receiver<ClientJsonRpcMessage>,
    mut inbound: mpsc::Sender<ServerJsonRpcMessage>,
) {
    while let Some(message) = outbound.next().await {
        let result = http
            .post(endpoint.clone())
            .json(&message)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        if let Err(e) = result {
            warn!("failed to post message to {endpoint}, closing transport: {e}");
            inbound.close_channel();
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_path_resolves_against_stream_url() {
        let base = Url::parse("http://localhost:8000/sse").unwrap();
        let endpoint = resolve_endpoint(&base, "/messages/?session_id=abc").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "http://localhost:8000/messages/?session_id=abc"
        );
    }

    #[test]
    fn absolute_endpoint_is_kept() {
        let base = Url::parse("http://localhost:8000/sse").unwrap();
        let endpoint = resolve_endpoint(&base, " http://other:9000/post \n").unwrap();
        assert_eq!(endpoint.as_str(), "http://other:9000/post");
    }

    #[test]
    fn empty_endpoint_is_rejected() {
        let base = Url::parse("http://localhost:8000/sse").unwrap();
        assert!(matches!(
            resolve_endpoint(&base, "  "),
            Err(Error::Endpoint(_))
        ));
    }
}
