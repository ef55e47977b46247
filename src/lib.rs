/// Shared data types (playback modes, playlist commands)
pub mod data;

/// LMS JSON-RPC client: connection, server, players and commands
pub mod lms;

/// Helper utilities, most notably the HTTP transport
pub mod helpers;

/// Connection configuration
pub mod config;

/// Process-wide logger setup
pub mod logging;

pub use data::{PlaylistCommand, RepeatMode, ShuffleMode};
pub use lms::{LmsPlayer, LmsRpcClient, LmsRpcError, LmsServer, QueryResult};
