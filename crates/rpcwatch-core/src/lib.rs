//! rpcwatch core
//!
//! Wire types, connection state, and the transcript model shared by the
//! JSON-RPC client and the console.

pub mod error;
pub mod models;
pub mod protocol;
pub mod state;
pub mod storage;
pub mod transcript;

pub use error::{Error, Result};
pub use protocol::{InboundFrame, RequestId, RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION};
pub use state::{ConnectionState, StatusLabel};
pub use transcript::{EntryKind, Transcript, TranscriptEntry};
