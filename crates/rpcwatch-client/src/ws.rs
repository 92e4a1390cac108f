//! WebSocket transport over `tokio-tungstenite`.
//!
//! `open` spawns one task per socket. The task owns the stream, forwards
//! text frames as events, and writes whatever the handle queues.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::transport::{EventSink, Transport, TransportError, TransportEvent, TransportHandle};

/// Close code a browser reports when the connection dropped without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;
/// Close code a browser reports when the close frame carried no status.
pub const CLOSE_NO_STATUS: u16 = 1005;

const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Send(String),
    Close,
}

#[derive(Debug, Clone)]
pub struct WsTransport {
    close_timeout: Duration,
}

impl WsTransport {
    pub fn new() -> Self {
        Self {
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// How long to wait for the peer's close frame after we sent ours.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WsTransport {
    type Handle = WsHandle;

    fn open(&self, endpoint: &str, events: EventSink) -> Result<WsHandle, TransportError> {
        let url = url::Url::parse(endpoint)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(TransportError::UnsupportedScheme(url.scheme().to_string()));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        runtime.spawn(run_socket(url, cmd_rx, events, self.close_timeout));

        Ok(WsHandle { cmd_tx })
    }
}

/// Handle to a socket task. Dropping it closes the socket.
#[derive(Debug)]
pub struct WsHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Send(text) => write!(f, "Send({} bytes)", text.len()),
            Command::Close => f.write_str("Close"),
        }
    }
}

impl TransportHandle for WsHandle {
    fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.cmd_tx
            .send(Command::Send(text))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        let _ = self.cmd_tx.send(Command::Close);
    }
}

async fn run_socket(
    url: url::Url,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: EventSink,
    close_timeout: Duration,
) {
    let generation = events.generation();

    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            error!(%url, generation, "WebSocket connect failed: {}", e);
            events.emit(TransportEvent::Error(e.to_string()));
            events.emit(TransportEvent::Closed {
                code: CLOSE_ABNORMAL,
                reason: String::new(),
            });
            return;
        }
    };

    info!(%url, generation, "WebSocket opened");
    events.emit(TransportEvent::Opened);

    let (mut sink, mut stream) = ws.split();
    let mut close_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            cmd = commands.recv(), if close_deadline.is_none() => match cmd {
                Some(Command::Send(text)) => {
                    debug!(generation, "-> {}", text);
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        error!(generation, "WebSocket send failed: {}", e);
                        events.emit(TransportEvent::Error(e.to_string()));
                        events.emit(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: String::new(),
                        });
                        return;
                    }
                }
                // An explicit close, or the handle was dropped
                Some(Command::Close) | None => {
                    debug!(generation, "Closing WebSocket");
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: String::new().into(),
                    };
                    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                        warn!(generation, "Failed to send close frame: {}", e);
                        events.emit(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: String::new(),
                        });
                        return;
                    }
                    close_deadline = Some(Instant::now() + close_timeout);
                }
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    debug!(generation, "<- {}", text);
                    events.emit(TransportEvent::Message(text.to_string()));
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!(generation, len = data.len(), "Ignoring binary frame");
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.as_str().to_string()))
                        .unwrap_or((CLOSE_NO_STATUS, String::new()));
                    if close_deadline.is_none() {
                        // tungstenite writes the queued reply on the next read
                        let drain = async { while let Some(Ok(_)) = stream.next().await {} };
                        if tokio::time::timeout(close_timeout, drain).await.is_err() {
                            warn!(generation, "Peer did not finish closing in {:?}", close_timeout);
                        }
                    }
                    info!(generation, code, %reason, "WebSocket closed");
                    events.emit(TransportEvent::Closed { code, reason });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(generation, "WebSocket error: {}", e);
                    events.emit(TransportEvent::Error(e.to_string()));
                    events.emit(TransportEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    return;
                }
                None => {
                    info!(generation, "WebSocket stream ended without close frame");
                    events.emit(TransportEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    return;
                }
            },
            _ = tokio::time::sleep_until(close_deadline.unwrap_or_else(Instant::now)), if close_deadline.is_some() => {
                warn!(generation, "Peer did not answer close frame in {:?}", close_timeout);
                events.emit(TransportEvent::Closed {
                    code: CLOSE_ABNORMAL,
                    reason: "close handshake timed out".to_string(),
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> (EventSink, mpsc::UnboundedReceiver<(u64, TransportEvent)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink::new(1, tx), rx)
    }

    #[tokio::test]
    async fn test_open_rejects_bad_urls() {
        let transport = WsTransport::new();

        let (events, _rx) = sink();
        assert!(matches!(
            transport.open("not a url", events),
            Err(TransportError::InvalidUrl(_))
        ));

        let (events, _rx) = sink();
        assert!(matches!(
            transport.open("http://localhost:1", events),
            Err(TransportError::UnsupportedScheme(s)) if s == "http"
        ));
    }

    #[test]
    fn test_open_without_runtime() {
        let (events, _rx) = sink();
        assert!(matches!(
            WsTransport::new().open("ws://127.0.0.1:1", events),
            Err(TransportError::NoRuntime)
        ));
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_then_close() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (events, mut rx) = sink();
        let _handle = WsTransport::new()
            .open(&format!("ws://127.0.0.1:{}", port), events)
            .unwrap();

        let (_, first) = rx.recv().await.unwrap();
        assert!(matches!(first, TransportEvent::Error(_)));

        let (_, second) = rx.recv().await.unwrap();
        assert_eq!(
            second,
            TransportEvent::Closed {
                code: CLOSE_ABNORMAL,
                reason: String::new()
            }
        );
    }
}
