//! The seam between [`RpcConnection`](crate::RpcConnection) and whatever
//! carries its text frames.

use tokio::sync::mpsc;

/// Something that happened on a transport, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed { code: u16, reason: String },
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported scheme '{0}', expected ws or wss")]
    UnsupportedScheme(String),

    #[error("No tokio runtime available")]
    NoRuntime,

    #[error("Transport closed")]
    Closed,
}

pub(crate) type EventEnvelope = (u64, TransportEvent);

/// Where a transport reports its events.
///
/// Each sink is stamped with the generation of the `open` call that produced
/// it, so events from a transport that has already been replaced can be told
/// apart and dropped.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<EventEnvelope>,
}

impl EventSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<EventEnvelope>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns false once the owning connection is gone.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx.send((self.generation, event)).is_ok()
    }
}

/// Opens transports bound to an endpoint.
///
/// `open` must not block: establishment is reported later through the sink as
/// `Opened`, or as `Error` followed by `Closed`. An `Err` return means the
/// endpoint could not even be attempted.
pub trait Transport {
    type Handle: TransportHandle;

    fn open(&self, endpoint: &str, events: EventSink) -> Result<Self::Handle, TransportError>;
}

/// A live transport owned by exactly one connection.
pub trait TransportHandle {
    fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Request closure. Completion is reported as a `Closed` event.
    fn close(&mut self);
}
