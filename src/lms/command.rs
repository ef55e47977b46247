use serde::Serialize;
use serde_json::Value;

use crate::data::{PlaylistCommand, RepeatMode, ShuffleMode};

/// Status tags requested on every player update: artist, duration,
/// artwork url, album, url
pub const PLAYER_STATUS_TAGS: &str = "adKlu";

/// Maximum number of playlist entries fetched with a player status
pub const PLAYLIST_WINDOW: u32 = 100;

/// Maximum number of players fetched with a roster query
pub const PLAYER_ROSTER_WINDOW: u32 = 99;

/// A single positional LMS command, e.g. `["mixer", "volume", 50]`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Command {
    tokens: Vec<Value>,
}

impl Command {
    /// Start a command with its verb
    pub fn new(verb: &str) -> Self {
        Command {
            tokens: vec![Value::String(verb.to_string())],
        }
    }

    /// Append a positional token
    pub fn arg(mut self, token: impl Into<Value>) -> Self {
        self.tokens.push(token.into());
        self
    }

    /// Append a tagged parameter (`tag:value`)
    pub fn tagged(self, tag: &str, value: &str) -> Self {
        self.arg(format!("{}:{}", tag, value))
    }

    pub fn tokens(&self) -> &[Value] {
        &self.tokens
    }

    /// `players 0 99`
    pub fn players() -> Self {
        Command::new("players").arg("0").arg(PLAYER_ROSTER_WINDOW.to_string())
    }

    /// `serverstatus 0 99`
    pub fn server_status() -> Self {
        Command::new("serverstatus").arg("0").arg(PLAYER_ROSTER_WINDOW.to_string())
    }

    /// Bare `status`, enough to confirm that a player exists
    pub fn status() -> Self {
        Command::new("status")
    }

    /// `status 0 100 tags:adKlu`
    pub fn player_status() -> Self {
        Command::new("status")
            .arg("0")
            .arg(PLAYLIST_WINDOW.to_string())
            .tagged("tags", PLAYER_STATUS_TAGS)
    }

    pub fn set_volume(volume: u8) -> Self {
        Command::new("mixer").arg("volume").arg(volume.min(100))
    }

    /// Relative volume change, sent as `+n` or `-n`
    pub fn step_volume(delta: i32) -> Self {
        Command::new("mixer").arg("volume").arg(format!("{:+}", delta))
    }

    pub fn set_muting(mute: bool) -> Self {
        Command::new("mixer").arg("muting").arg(if mute { "1" } else { "0" })
    }

    pub fn toggle_pause() -> Self {
        Command::new("pause")
    }

    pub fn play() -> Self {
        Command::new("play")
    }

    pub fn pause() -> Self {
        Command::new("pause").arg("1")
    }

    pub fn stop() -> Self {
        Command::new("stop")
    }

    /// Jump to an absolute playlist position
    pub fn index(index: u32) -> Self {
        Command::new("playlist").arg("index").arg(index)
    }

    /// Move forward or backward by `delta` tracks
    pub fn skip(delta: i32) -> Self {
        Command::new("playlist").arg("index").arg(format!("{:+}", delta))
    }

    /// Seek within the current track (seconds)
    pub fn time(position: f64) -> Self {
        Command::new("time").arg(position)
    }

    pub fn power(on: bool) -> Self {
        Command::new("power").arg(if on { "1" } else { "0" })
    }

    pub fn load_url(url: &str, cmd: PlaylistCommand) -> Self {
        Command::new("playlist").arg(cmd.to_string()).arg(url)
    }

    pub fn shuffle(mode: ShuffleMode) -> Self {
        Command::new("playlist").arg("shuffle").arg(mode.index())
    }

    pub fn repeat(mode: RepeatMode) -> Self {
        Command::new("playlist").arg("repeat").arg(mode.index())
    }

    pub fn clear_playlist() -> Self {
        Command::new("playlist").arg("clear")
    }

    /// Add `other_player_id` to this player's sync group
    pub fn sync(other_player_id: &str) -> Self {
        Command::new("sync").arg(other_player_id)
    }

    pub fn unsync() -> Self {
        Command::new("sync").arg("-")
    }
}

/// Expand a playlist load into individual `playlist` commands.
///
/// `insert` places each URL directly after the current track, so the URLs are
/// issued in reverse to end up in list order. `play`/`load` replace the
/// playlist with the first URL and append the rest; `add` appends everything.
pub fn plan_playlist_load(urls: &[&str], cmd: PlaylistCommand) -> Vec<Command> {
    match cmd {
        PlaylistCommand::Insert => urls
            .iter()
            .rev()
            .map(|url| Command::load_url(url, PlaylistCommand::Insert))
            .collect(),
        PlaylistCommand::Play | PlaylistCommand::Load => {
            let mut commands = Vec::with_capacity(urls.len());
            if let Some((first, rest)) = urls.split_first() {
                commands.push(Command::load_url(first, PlaylistCommand::Play));
                commands.extend(rest.iter().map(|url| Command::load_url(url, PlaylistCommand::Add)));
            }
            commands
        }
        PlaylistCommand::Add => urls
            .iter()
            .map(|url| Command::load_url(url, PlaylistCommand::Add))
            .collect(),
    }
}
