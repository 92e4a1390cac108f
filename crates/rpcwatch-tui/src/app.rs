//! Application state management

use rpcwatch_client::{RpcConnection, Transport, WsTransport};
use rpcwatch_core::models::ConsoleConfig;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid params JSON: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error("Params must be a JSON object")]
    ParamsNotObject,
}

/// A request typed on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub method: String,
    pub params: Option<Map<String, Value>>,
}

/// Parse `method [json-object]`. A blank line yields `Ok(None)`.
pub fn parse_command_line(line: &str) -> Result<Option<ParsedCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (method, rest) = match line.split_once(char::is_whitespace) {
        Some((method, rest)) => (method, rest.trim()),
        None => (line, ""),
    };

    let params = if rest.is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(rest)? {
            Value::Object(map) => Some(map),
            _ => return Err(CommandError::ParamsNotObject),
        }
    };

    Ok(Some(ParsedCommand {
        method: method.to_string(),
        params,
    }))
}

pub struct App<T: Transport = WsTransport> {
    pub conn: RpcConnection<T>,
    pub config: ConsoleConfig,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub show_help: bool,
    pub should_quit: bool,
    pub status_message: String,

    pub selected_entry_index: usize,
    /// Keep the selection on the newest entry as entries arrive.
    pub follow_tail: bool,
    seen_revision: u64,
}

impl<T: Transport> App<T> {
    pub fn new(conn: RpcConnection<T>, config: ConsoleConfig) -> Self {
        Self {
            conn,
            config,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            show_help: false,
            should_quit: false,
            status_message: String::new(),
            selected_entry_index: 0,
            follow_tail: true,
            seen_revision: 0,
        }
    }

    pub fn connect(&mut self) {
        self.status_message.clear();
        if self.conn.has_transport() {
            self.status_message = "Already connected".to_string();
            return;
        }
        let endpoint = self.config.endpoint.clone();
        self.conn.connect(&endpoint);
        self.sync_scroll();
    }

    pub fn disconnect(&mut self) {
        self.status_message.clear();
        if !self.conn.has_transport() {
            self.status_message = "Not connected".to_string();
            return;
        }
        self.conn.disconnect();
    }

    pub fn send_default(&mut self) {
        let method = self.config.default_method.clone();
        self.send(&method, None);
    }

    /// Submit the command line. Blank input is ignored, like an empty send box.
    pub fn submit_input(&mut self) {
        let line = std::mem::take(&mut self.input_buffer);
        self.input_mode = InputMode::Normal;

        match parse_command_line(&line) {
            Ok(Some(command)) => self.send(&command.method, command.params),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(line = %line, "Rejected command line: {}", e);
                self.status_message = e.to_string();
                self.input_buffer = line;
                self.input_mode = InputMode::Command;
            }
        }
    }

    fn send(&mut self, method: &str, params: Option<Map<String, Value>>) {
        self.status_message = match self.conn.send_request(method, params) {
            Some(id) => format!("Sent {} (id {})", method, id),
            None => "Cannot send: not connected".to_string(),
        };
        self.sync_scroll();
    }

    /// Run after transcript changes: jump to the newest entry when following.
    pub fn sync_scroll(&mut self) {
        let transcript = self.conn.transcript();
        if transcript.revision() == self.seen_revision {
            return;
        }
        self.seen_revision = transcript.revision();

        if self.follow_tail {
            self.selected_entry_index = transcript.len().saturating_sub(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.follow_tail = false;
        self.selected_entry_index = self.selected_entry_index.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let last = self.conn.transcript().len().saturating_sub(1);
        if self.selected_entry_index < last {
            self.selected_entry_index += 1;
        }
        self.follow_tail = self.selected_entry_index == last;
    }

    pub fn scroll_top(&mut self) {
        self.follow_tail = false;
        self.selected_entry_index = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.follow_tail = true;
        self.selected_entry_index = self.conn.transcript().len().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcwatch_client::{EventSink, TransportError, TransportEvent, TransportHandle};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LoopbackTransport {
        sinks: Arc<Mutex<Vec<EventSink>>>,
    }

    struct LoopbackHandle;

    impl Transport for LoopbackTransport {
        type Handle = LoopbackHandle;

        fn open(&self, _endpoint: &str, events: EventSink) -> Result<LoopbackHandle, TransportError> {
            events.emit(TransportEvent::Opened);
            self.sinks.lock().unwrap().push(events);
            Ok(LoopbackHandle)
        }
    }

    impl TransportHandle for LoopbackHandle {
        fn send(&mut self, _text: String) -> Result<(), TransportError> {
            Ok(())
        }

        fn close(&mut self) {}
    }

    fn app() -> (App<LoopbackTransport>, LoopbackTransport) {
        let transport = LoopbackTransport::default();
        let app = App::new(
            RpcConnection::new(transport.clone()),
            ConsoleConfig::default(),
        );
        (app, transport)
    }

    fn connected_app() -> (App<LoopbackTransport>, LoopbackTransport) {
        let (mut app, transport) = app();
        app.connect();
        app.conn.drain_events();
        app.sync_scroll();
        (app, transport)
    }

    #[test]
    fn test_parse_method_only() {
        let cmd = parse_command_line("  getWeldDetectMethods ").unwrap().unwrap();
        assert_eq!(cmd.method, "getWeldDetectMethods");
        assert!(cmd.params.is_none());
    }

    #[test]
    fn test_parse_method_with_params() {
        let cmd = parse_command_line(r#"setDetect {"enable": true, "n": 3}"#)
            .unwrap()
            .unwrap();
        assert_eq!(cmd.method, "setDetect");
        let params = cmd.params.unwrap();
        assert_eq!(params["enable"], json!(true));
        assert_eq!(params["n"], json!(3));
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse_command_line("").unwrap(), None);
        assert_eq!(parse_command_line("   \t").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_params() {
        assert!(matches!(
            parse_command_line("m [1, 2]"),
            Err(CommandError::ParamsNotObject)
        ));
        assert!(matches!(
            parse_command_line("m {oops"),
            Err(CommandError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_send_while_disconnected_sets_status() {
        let (mut app, _) = app();
        app.send_default();
        assert_eq!(app.status_message, "Cannot send: not connected");
        assert!(app.conn.transcript().is_empty());
    }

    #[test]
    fn test_submit_input_sends_and_follows_tail() {
        let (mut app, _) = connected_app();
        assert_eq!(app.selected_entry_index, 0);

        app.input_mode = InputMode::Command;
        app.input_buffer = "getWeldDetectMethods".to_string();
        app.submit_input();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.input_buffer.is_empty());
        assert_eq!(app.conn.transcript().len(), 2);
        assert_eq!(app.selected_entry_index, 1);
        assert_eq!(app.status_message, "Sent getWeldDetectMethods (id 1)");
    }

    #[test]
    fn test_submit_blank_input_is_ignored() {
        let (mut app, _) = connected_app();
        app.input_buffer = "   ".to_string();
        app.submit_input();
        assert_eq!(app.conn.transcript().len(), 1);
        assert_eq!(app.conn.next_request_id(), 1);
    }

    #[test]
    fn test_submit_invalid_input_keeps_buffer() {
        let (mut app, _) = connected_app();
        app.input_mode = InputMode::Command;
        app.input_buffer = "m [1]".to_string();
        app.submit_input();

        assert_eq!(app.input_mode, InputMode::Command);
        assert_eq!(app.input_buffer, "m [1]");
        assert_eq!(app.status_message, "Params must be a JSON object");
    }

    #[test]
    fn test_scrolling_stops_following() {
        let (mut app, transport) = connected_app();
        app.send_default();
        app.send_default();
        assert_eq!(app.selected_entry_index, 2);

        app.scroll_up();
        assert!(!app.follow_tail);

        transport.sinks.lock().unwrap()[0].emit(TransportEvent::Message("x".to_string()));
        app.conn.drain_events();
        app.sync_scroll();
        assert_eq!(app.selected_entry_index, 1);

        app.scroll_bottom();
        assert!(app.follow_tail);
        assert_eq!(app.selected_entry_index, 3);
    }

    #[test]
    fn test_connect_twice_reports_status() {
        let (mut app, transport) = connected_app();
        app.connect();
        assert_eq!(app.status_message, "Already connected");
        assert_eq!(transport.sinks.lock().unwrap().len(), 1);
    }
}
