//! Append-only transcript of connection and message events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Connected,
    Closed,
    Outgoing,
    Result,
    RpcError,
    Raw,
    TransportError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub at: DateTime<Utc>,
    pub kind: EntryKind,
    /// Body without the kind prefix.
    pub text: String,
}

impl TranscriptEntry {
    fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind,
            text: text.into(),
        }
    }

    pub fn connected() -> Self {
        Self::new(EntryKind::Connected, "已连接到服务器")
    }

    pub fn closed(code: u16, reason: &str) -> Self {
        Self::new(
            EntryKind::Closed,
            format!("已断开与服务器的连接 (代码: {}, 原因: {})", code, reason),
        )
    }

    pub fn outgoing(method: &str, params: Option<&Map<String, Value>>) -> Self {
        let text = match params {
            Some(params) => format!("{} {}", method, Value::Object(params.clone())),
            None => method.to_string(),
        };
        Self::new(EntryKind::Outgoing, text)
    }

    pub fn result(result: &Value) -> Self {
        Self::new(EntryKind::Result, result.to_string())
    }

    pub fn rpc_error(message: &str) -> Self {
        Self::new(EntryKind::RpcError, message)
    }

    pub fn raw(text: &str) -> Self {
        Self::new(EntryKind::Raw, text)
    }

    pub fn transport_error(description: impl Into<String>) -> Self {
        Self::new(EntryKind::TransportError, description)
    }

    /// The line as shown to a person.
    pub fn line(&self) -> String {
        match self.kind {
            EntryKind::Connected | EntryKind::Closed | EntryKind::Raw => self.text.clone(),
            EntryKind::Outgoing => format!("你: {}", self.text),
            EntryKind::Result => format!("服务器: {}", self.text),
            EntryKind::RpcError | EntryKind::TransportError => format!("错误: {}", self.text),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, EntryKind::RpcError | EntryKind::TransportError)
    }
}

impl std::fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line())
    }
}

/// Grows for the life of its owner; nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
        self.revision += 1;
    }

    /// Bumped on every append. Readers compare it to decide whether to
    /// scroll after their next render.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranscriptEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(TranscriptEntry::line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_lines() {
        assert_eq!(TranscriptEntry::connected().line(), "已连接到服务器");
        assert_eq!(
            TranscriptEntry::closed(1000, "normal").line(),
            "已断开与服务器的连接 (代码: 1000, 原因: normal)"
        );
        assert_eq!(
            TranscriptEntry::result(&json!(["m1", "m2"])).line(),
            r#"服务器: ["m1","m2"]"#
        );
        assert_eq!(TranscriptEntry::rpc_error("boom").line(), "错误: boom");
        assert_eq!(TranscriptEntry::raw("plain text").line(), "plain text");
    }

    #[test]
    fn test_outgoing_line() {
        assert_eq!(
            TranscriptEntry::outgoing("getWeldDetectMethods", None).line(),
            "你: getWeldDetectMethods"
        );

        let mut params = Map::new();
        params.insert("enable".to_string(), json!(true));
        assert_eq!(
            TranscriptEntry::outgoing("setDetect", Some(&params)).line(),
            r#"你: setDetect {"enable":true}"#
        );
    }

    #[test]
    fn test_lines_keep_wire_key_order() {
        let result: Value = serde_json::from_str(r#"{"zeta":1,"alpha":{"y":2,"b":3}}"#).unwrap();
        assert_eq!(
            TranscriptEntry::result(&result).line(),
            r#"服务器: {"zeta":1,"alpha":{"y":2,"b":3}}"#
        );

        let mut params = Map::new();
        params.insert("zone".to_string(), json!(3));
        params.insert("axis".to_string(), json!("x"));
        assert_eq!(
            TranscriptEntry::outgoing("move", Some(&params)).line(),
            r#"你: move {"zone":3,"axis":"x"}"#
        );
    }

    #[test]
    fn test_is_error() {
        assert!(TranscriptEntry::rpc_error("x").is_error());
        assert!(TranscriptEntry::transport_error("x").is_error());
        assert!(!TranscriptEntry::raw("x").is_error());
    }

    #[test]
    fn test_transcript_append_bumps_revision() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.revision(), 0);

        transcript.push(TranscriptEntry::connected());
        transcript.push(TranscriptEntry::raw("hi"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.revision(), 2);
        assert_eq!(transcript.lines(), vec!["已连接到服务器", "hi"]);
        assert_eq!(transcript.last().map(|e| e.kind), Some(EntryKind::Raw));
    }
}
