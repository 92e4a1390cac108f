//! A single JSON-RPC connection and its transcript.

use rpcwatch_core::{
    ConnectionState, InboundFrame, RequestId, RpcRequest, StatusLabel, Transcript, TranscriptEntry,
};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::transport::{EventEnvelope, EventSink, Transport, TransportEvent, TransportHandle};

/// What happened to an event taken off the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// Belonged to a transport this connection no longer owns.
    Stale,
}

/// Owns at most one transport and records everything that crosses it.
///
/// All methods take `&mut self`; transport events are queued and only take
/// effect when the owner calls [`process_next_event`](Self::process_next_event)
/// or [`drain_events`](Self::drain_events). None of the public operations
/// return errors: failures land in the transcript.
pub struct RpcConnection<T: Transport> {
    transport: T,
    endpoint: Option<String>,
    state: ConnectionState,
    status: StatusLabel,
    next_request_id: i64,
    transcript: Transcript,
    handle: Option<T::Handle>,
    generation: u64,
    events_tx: mpsc::UnboundedSender<EventEnvelope>,
    events_rx: mpsc::UnboundedReceiver<EventEnvelope>,
}

impl<T: Transport> RpcConnection<T> {
    pub fn new(transport: T) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            endpoint: None,
            state: ConnectionState::Disconnected,
            status: StatusLabel::NotConnected,
            next_request_id: 1,
            transcript: Transcript::new(),
            handle: None,
            generation: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn status_label(&self) -> StatusLabel {
        self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The id the next successful `send_request` will use.
    pub fn next_request_id(&self) -> i64 {
        self.next_request_id
    }

    /// Endpoint of the most recent `connect` that acquired a transport.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn has_transport(&self) -> bool {
        self.handle.is_some()
    }

    pub fn connect(&mut self, endpoint: &str) {
        if self.handle.is_some() {
            warn!(
                state = ?self.state,
                "connect({}) ignored: transport already active",
                endpoint
            );
            return;
        }

        self.generation += 1;
        let sink = EventSink::new(self.generation, self.events_tx.clone());

        match self.transport.open(endpoint, sink) {
            Ok(handle) => {
                info!(endpoint, generation = self.generation, "Connecting");
                self.handle = Some(handle);
                self.endpoint = Some(endpoint.to_string());
                self.state = ConnectionState::Connecting;
            }
            Err(e) => {
                error!(endpoint, "Failed to open transport: {}", e);
                self.transcript
                    .push(TranscriptEntry::transport_error(format!("无法连接到服务器 ({})", e)));
            }
        }
    }

    /// Ask the transport to close. State changes when `Closed` arrives.
    pub fn disconnect(&mut self) {
        match self.handle.as_mut() {
            Some(handle) => {
                info!(generation = self.generation, "Disconnect requested");
                handle.close();
            }
            None => warn!("disconnect() ignored: not connected"),
        }
    }

    /// Send a request if connected. Returns the id it was sent with.
    ///
    /// Ids start at 1 and are never reused on this connection, across
    /// reconnects included. A skipped or rejected send does not use one up.
    pub fn send_request(&mut self, method: &str, params: Option<Map<String, Value>>) -> Option<i64> {
        if self.state != ConnectionState::Connected {
            warn!(method, state = ?self.state, "send_request ignored: not connected");
            return None;
        }
        let Some(handle) = self.handle.as_mut() else {
            warn!(method, "send_request ignored: no transport");
            return None;
        };

        let id = self.next_request_id;
        let echo = TranscriptEntry::outgoing(method, params.as_ref());
        let request = RpcRequest::new(method, params, RequestId::Number(id));

        let text = match serde_json::to_string(&request) {
            Ok(text) => text,
            Err(e) => {
                error!(method, "Failed to serialize request: {}", e);
                return None;
            }
        };

        if let Err(e) = handle.send(text) {
            error!(method, id, "Failed to hand request to transport: {}", e);
            self.transcript
                .push(TranscriptEntry::transport_error(format!("发送失败 ({})", e)));
            return None;
        }

        debug!(method, id, "Request sent");
        self.next_request_id += 1;
        self.transcript.push(echo);
        Some(id)
    }

    /// Wait for the next transport event and apply it.
    pub async fn process_next_event(&mut self) -> EventOutcome {
        match self.events_rx.recv().await {
            Some((generation, event)) => self.apply(generation, event),
            None => EventOutcome::Stale,
        }
    }

    /// Apply every event already queued. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((generation, event)) = self.events_rx.try_recv() {
            if self.apply(generation, event) == EventOutcome::Applied {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, generation: u64, event: TransportEvent) -> EventOutcome {
        if self.handle.is_none() || generation != self.generation {
            debug!(generation, current = self.generation, ?event, "Dropping stale transport event");
            return EventOutcome::Stale;
        }

        match event {
            TransportEvent::Opened => {
                self.state = ConnectionState::Connected;
                self.status = StatusLabel::Connected;
                self.transcript.push(TranscriptEntry::connected());
            }
            TransportEvent::Message(text) => self.on_message(&text),
            TransportEvent::Closed { code, reason } => {
                self.state = ConnectionState::Disconnected;
                self.status = StatusLabel::Disconnected;
                self.handle = None;
                self.transcript.push(TranscriptEntry::closed(code, &reason));
            }
            TransportEvent::Error(info) => {
                error!(generation, "Transport error: {}", info);
                self.transcript.push(TranscriptEntry::transport_error(format!(
                    "WebSocket 连接发生错误 ({})",
                    info
                )));
            }
        }

        EventOutcome::Applied
    }

    fn on_message(&mut self, text: &str) {
        match InboundFrame::parse(text) {
            InboundFrame::Raw(raw) => self.transcript.push(TranscriptEntry::raw(&raw)),
            InboundFrame::Result { id, result } => {
                debug!(?id, "Result received");
                self.transcript.push(TranscriptEntry::result(&result));
            }
            InboundFrame::Error { id, error } => {
                debug!(?id, code = error.code, "Error response received");
                self.transcript.push(TranscriptEntry::rpc_error(&error.message));
            }
            InboundFrame::Empty { id } => {
                debug!(?id, "Response without result or error, nothing recorded");
            }
        }
    }
}

impl<T: Transport> Drop for RpcConnection<T> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            debug!(generation = self.generation, "Closing transport on drop");
            handle.close();
        }
    }
}
