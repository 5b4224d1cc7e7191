// Backend log streaming over WebSocket into a bounded in-memory buffer.

pub mod ansi;
pub mod buffer;
pub mod client;
pub mod transport;

pub use ansi::AnsiConverter;
pub use buffer::{LogBuffer, MAX_LOGS};
pub use client::{ConnectionState, LogStreamClient, LogStreamOptions, ReconnectPolicy};
pub use transport::{LogConnection, LogConnector, WsConnector};
