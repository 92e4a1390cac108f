//! Connection state and the status label shown next to it

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Transport acquired, waiting for it to report open.
    Connecting,
    Connected,
}

/// Human-readable status paired with the connection state.
///
/// Unlike [`ConnectionState`] this remembers whether a connection was ever
/// made: a fresh connection reads 未连接, a closed one 已断开.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    #[default]
    NotConnected,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl StatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::NotConnected => "未连接",
            StatusLabel::Connected => "已连接",
            StatusLabel::Disconnected => "已断开",
        }
    }
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert_eq!(StatusLabel::default().as_str(), "未连接");
    }

    #[test]
    fn test_labels() {
        assert_eq!(StatusLabel::Connected.to_string(), "已连接");
        assert_eq!(StatusLabel::Disconnected.to_string(), "已断开");
    }

    #[test]
    fn test_is_connected() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
    }
}
