// Companion client for Arknights: Endfield: game-data tables and live backend logs.

pub mod config;
pub mod context;
pub mod error;
pub mod game_data;
pub mod log_stream;
pub mod metrics;

pub use context::AppContext;
pub use error::{Error, Result};
