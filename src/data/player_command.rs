//! Playlist load commands that can be sent to LMS players
use serde::{Serialize, Deserialize};
use strum_macros::{Display, EnumString};

/// How a URL (or a list of URLs) is placed into a player's playlist
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlaylistCommand {
    /// Replace the playlist and start playing
    Play,
    /// Replace the playlist
    Load,
    /// Insert right after the current track
    Insert,
    /// Append to the end of the playlist
    Add,
}

impl Default for PlaylistCommand {
    fn default() -> Self {
        PlaylistCommand::Load
    }
}
