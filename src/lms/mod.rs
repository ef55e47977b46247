/// LMS (Lyrion Music Server) client module
pub mod command;
pub mod jsonrps;
pub mod lmsplayer;
pub mod lmsserver;

// Re-export main components for easier access
pub use command::{plan_playlist_load, Command};
pub use jsonrps::{LmsRpcClient, LmsRpcError, QueryResult};
pub use lmsplayer::{LmsPlayer, SyncTarget};
pub use lmsserver::LmsServer;
