//! rpcwatch client library
//!
//! A JSON-RPC 2.0 client over a persistent WebSocket. It keeps a
//! human-readable transcript of everything it sends and receives, for a
//! debug console to display.
//!
//! ```no_run
//! use rpcwatch_client::{RpcConnection, WsTransport};
//!
//! # async fn example() {
//! let mut conn = RpcConnection::new(WsTransport::new());
//! conn.connect("ws://127.0.0.1:9002");
//! conn.process_next_event().await; // Opened
//! conn.send_request("getWeldDetectMethods", None);
//! conn.process_next_event().await; // the reply
//! for line in conn.transcript().lines() {
//!     println!("{}", line);
//! }
//! # }
//! ```

pub mod connection;
pub mod transport;
pub mod ws;

pub use connection::{EventOutcome, RpcConnection};
pub use rpcwatch_core::{ConnectionState, StatusLabel, Transcript, TranscriptEntry};
pub use transport::{EventSink, Transport, TransportError, TransportEvent, TransportHandle};
pub use ws::{WsHandle, WsTransport};
