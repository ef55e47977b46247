use std::str::FromStr;
use std::sync::Arc;
use log::{debug, error, warn};
use serde_json::{Map, Value};
use url::Url;

use crate::data::{PlaylistCommand, RepeatMode, ShuffleMode};
use crate::lms::command::{plan_playlist_load, Command};
use crate::lms::jsonrps::{LmsRpcClient, LmsRpcError, QueryResult};

/// Cover art path used when nothing is queued
pub const UNKNOWN_COVER_PATH: &str = "/music/unknown/cover.jpg";

/// Another player to sync with, given either as a player or as a bare id
#[derive(Debug, Clone, Copy)]
pub enum SyncTarget<'a> {
    Player(&'a LmsPlayer),
    Id(&'a str),
}

impl<'a> SyncTarget<'a> {
    fn player_id(&self) -> &'a str {
        match *self {
            SyncTarget::Player(player) => player.player_id(),
            SyncTarget::Id(id) => id,
        }
    }
}

impl<'a> From<&'a LmsPlayer> for SyncTarget<'a> {
    fn from(player: &'a LmsPlayer) -> Self {
        SyncTarget::Player(player)
    }
}

impl<'a> From<&'a str> for SyncTarget<'a> {
    fn from(id: &'a str) -> Self {
        SyncTarget::Id(id)
    }
}

impl<'a> From<&'a String> for SyncTarget<'a> {
    fn from(id: &'a String) -> Self {
        SyncTarget::Id(id.as_str())
    }
}

/// A player attached to a Logitech Media Server.
///
/// The player keeps the last status returned by [`LmsPlayer::update`]. All
/// property accessors read from that snapshot only and return `None` when the
/// corresponding field was not part of the last status.
#[derive(Debug, Clone)]
pub struct LmsPlayer {
    /// Connection shared with the server that created this player
    client: Arc<LmsRpcClient>,

    /// Player ID (usually the MAC address)
    player_id: String,

    name: String,

    /// Last status reply, replaced as a whole on every update
    status: Map<String, Value>,
}

impl LmsPlayer {
    /// Create a new LMS player
    ///
    /// # Arguments
    /// * `client` - LMS RPC client for communication with server
    /// * `player_id` - Player ID to address
    /// * `name` - Player name as reported by the server
    pub fn new(client: Arc<LmsRpcClient>, player_id: &str, name: &str) -> Self {
        debug!("Creating LMS player object: {}, {}", name, player_id);
        LmsPlayer {
            client,
            player_id: player_id.to_string(),
            name: name.to_string(),
            status: Map::new(),
        }
    }

    /// Seed the player with an existing status snapshot
    pub fn with_status(mut self, status: Map<String, Value>) -> Self {
        self.status = status;
        self
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw status snapshot
    pub fn status(&self) -> &Map<String, Value> {
        &self.status
    }

    pub fn client(&self) -> &Arc<LmsRpcClient> {
        &self.client
    }

    /// Power state of the player
    pub fn power(&self) -> Option<bool> {
        self.status.get("power").map(|power| value_as_i64(power) == Some(1))
    }

    /// Playback mode: `play`, `pause` or `stop`
    pub fn mode(&self) -> Option<&str> {
        self.status.get("mode").and_then(Value::as_str)
    }

    /// Volume level from 0 to 100.
    ///
    /// LMS reports a muted player with a negative volume. Writing that value
    /// back would be read as a decrement, so only the magnitude is returned
    /// here and the sign is exposed through [`LmsPlayer::muting`].
    pub fn volume(&self) -> Option<u8> {
        self.status
            .get("mixer volume")
            .and_then(value_as_f64)
            .map(|volume| volume.trunc().abs().min(100.0) as u8)
    }

    /// True if the volume is muted
    pub fn muting(&self) -> Option<bool> {
        self.status.get("mixer volume").map(|volume| match volume {
            Value::String(s) => s.starts_with('-'),
            other => other.to_string().starts_with('-'),
        })
    }

    /// Title of the current media as formatted for the player. For streams
    /// this is the title of the current track.
    pub fn current_title(&self) -> Option<&str> {
        self.status.get("current_title").and_then(Value::as_str)
    }

    /// Duration of the current media in seconds
    pub fn duration(&self) -> Option<i64> {
        self.status.get("duration").and_then(value_as_f64).map(|d| d.trunc() as i64)
    }

    /// Position in the current media in seconds
    pub fn time(&self) -> Option<i64> {
        self.status.get("time").and_then(value_as_f64).map(|t| t.trunc() as i64)
    }

    /// Playlist entry of the current track, or the remote stream metadata
    /// when the playlist lookup is not possible
    pub fn current_track(&self) -> Option<&Map<String, Value>> {
        self.playlist_entry_at_current_index()
            .or_else(|| self.status.get("remoteMeta").and_then(Value::as_object))
    }

    fn playlist_entry_at_current_index(&self) -> Option<&Map<String, Value>> {
        let index = self.status.get("playlist_cur_index").and_then(value_as_i64)?;
        let index = usize::try_from(index).ok()?;
        self.status
            .get("playlist_loop")
            .and_then(Value::as_array)?
            .get(index)
            .and_then(Value::as_object)
    }

    fn current_track_field(&self, key: &str) -> Option<&str> {
        self.current_track()?.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.current_track_field("title")
    }

    pub fn artist(&self) -> Option<&str> {
        self.current_track_field("artist")
    }

    pub fn album(&self) -> Option<&str> {
        self.current_track_field("album")
    }

    /// URL of the current media
    pub fn url(&self) -> Option<&str> {
        self.current_track_field("url")
    }

    pub fn shuffle(&self) -> Option<ShuffleMode> {
        let raw = self.status.get("playlist shuffle")?;
        let mode = value_as_i64(raw).and_then(ShuffleMode::from_index);
        if mode.is_none() {
            warn!("Player {} reported unknown shuffle mode {}", self.player_id, raw);
        }
        mode
    }

    pub fn repeat(&self) -> Option<RepeatMode> {
        let raw = self.status.get("playlist repeat")?;
        let mode = value_as_i64(raw).and_then(RepeatMode::from_index);
        if mode.is_none() {
            warn!("Player {} reported unknown repeat mode {}", self.player_id, raw);
        }
        mode
    }

    /// Current playlist. Entries can be passed back to [`LmsPlayer::load_playlist`].
    pub fn playlist(&self) -> Option<&Vec<Value>> {
        self.status.get("playlist_loop").and_then(Value::as_array)
    }

    /// True if the player is part of a sync group
    pub fn synced(&self) -> Option<bool> {
        self.status.get("sync_master").map(is_truthy)
    }

    /// Player id of the sync group master
    pub fn sync_master(&self) -> Option<&str> {
        self.status.get("sync_master").and_then(Value::as_str)
    }

    /// Player id(s) of the sync group slaves, as sent by the server
    pub fn sync_slaves(&self) -> Option<&Value> {
        self.status.get("sync_slaves")
    }

    /// All players in the current sync group: this player, then the slaves
    /// value, then the master value, each exactly as sent by the server. A
    /// list of slaves stays a single list element; nothing is split, sorted
    /// or deduplicated.
    pub fn sync_group(&self) -> Vec<Value> {
        let mut group = vec![Value::String(self.player_id.clone())];
        for key in ["sync_slaves", "sync_master"] {
            if let Some(value) = self.status.get(key).filter(|value| is_truthy(value)) {
                group.push(value.clone());
            }
        }
        group
    }

    /// Cover art URL for the current media. Always available: falls back to a
    /// placeholder image when nothing is queued.
    pub fn image_url(&self) -> String {
        let path = match self.current_track() {
            Some(_) => format!("/music/current/cover.jpg?player={}", self.player_id),
            None => UNKNOWN_COVER_PATH.to_string(),
        };
        self.server_url(&path)
    }

    /// Artwork of the current track as reported by the server. Relative
    /// paths are resolved against the server, absolute URLs are kept.
    pub fn artwork_url(&self) -> Option<String> {
        let artwork = self.current_track_field("artwork_url")?;
        if artwork.contains("://") {
            Some(artwork.to_string())
        } else {
            Some(self.server_url(artwork))
        }
    }

    /// Join `path` onto the server's base URL, embedding credentials if configured
    fn server_url(&self, path: &str) -> String {
        let base = format!("http://{}:{}/", self.client.host(), self.client.port());
        let joined = Url::parse(&base).and_then(|mut url| {
            if let Some(credentials) = self.client.credentials() {
                // set_username only fails for URLs that cannot carry credentials
                let _ = url.set_username(&credentials.username);
                let _ = url.set_password(Some(&credentials.password));
            }
            url.join(path)
        });

        match joined {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!("Could not build URL for {} on {}: {}", path, base, e);
                format!("{}{}", base.trim_end_matches('/'), path)
            }
        }
    }

    /// Send a raw command to this player
    pub async fn query(&self, command: &Command) -> QueryResult {
        self.client.query(&self.player_id, command).await
    }

    /// Refresh the status snapshot from the server.
    ///
    /// # Returns
    /// `true` if the snapshot was replaced, `false` if the query failed (the
    /// previous snapshot is kept in that case)
    pub async fn update(&mut self) -> bool {
        let status = match self.query(&Command::player_status()).await {
            QueryResult::Failed => return false,
            QueryResult::Acknowledged => Map::new(),
            QueryResult::Data(Value::Object(status)) => status,
            QueryResult::Data(other) => {
                error!("Received invalid status for player {}: {}", self.player_id, other);
                return false;
            }
        };

        if let Some(name) = status.get("player_name").and_then(Value::as_str) {
            self.name = name.to_string();
        }
        self.status = status;
        true
    }

    /// Set volume level, range 0..100
    pub async fn set_volume(&self, volume: u8) -> QueryResult {
        self.query(&Command::set_volume(volume)).await
    }

    /// Change the volume relative to the current level
    pub async fn step_volume(&self, delta: i32) -> QueryResult {
        self.query(&Command::step_volume(delta)).await
    }

    /// Mute (true) or unmute (false) the player
    pub async fn set_muting(&self, mute: bool) -> QueryResult {
        self.query(&Command::set_muting(mute)).await
    }

    pub async fn toggle_pause(&self) -> QueryResult {
        self.query(&Command::toggle_pause()).await
    }

    pub async fn play(&self) -> QueryResult {
        self.query(&Command::play()).await
    }

    pub async fn pause(&self) -> QueryResult {
        self.query(&Command::pause()).await
    }

    pub async fn stop(&self) -> QueryResult {
        self.query(&Command::stop()).await
    }

    /// Jump to a position in the playlist
    pub async fn index(&self, index: u32) -> QueryResult {
        self.query(&Command::index(index)).await
    }

    /// Move forward (positive) or backward (negative) in the playlist
    pub async fn skip(&self, delta: i32) -> QueryResult {
        self.query(&Command::skip(delta)).await
    }

    /// Seek to a position (in seconds) in the current track
    pub async fn seek(&self, position: f64) -> QueryResult {
        self.query(&Command::time(position)).await
    }

    pub async fn set_power(&self, on: bool) -> QueryResult {
        self.query(&Command::power(on)).await
    }

    /// Play, load, insert or add a single track by URL
    pub async fn load_url(&self, url: &str, cmd: PlaylistCommand) -> QueryResult {
        self.query(&Command::load_url(url, cmd)).await
    }

    /// Load a playlist of the kind returned by [`LmsPlayer::playlist`].
    ///
    /// Every entry must carry a `url`. All sub-commands are sent even if some
    /// of them fail, so the playlist can end up partially loaded.
    ///
    /// # Returns
    /// `true` only if every entry was accepted by the server
    pub async fn load_playlist(&self, playlist: &[Value], cmd: PlaylistCommand) -> bool {
        let mut success = true;

        let mut urls = Vec::with_capacity(playlist.len());
        for entry in playlist {
            match entry.get("url").and_then(Value::as_str) {
                Some(url) => urls.push(url),
                None => {
                    warn!("Skipping playlist entry without url: {}", entry);
                    success = false;
                }
            }
        }

        for command in plan_playlist_load(&urls, cmd) {
            if self.query(&command).await.is_failure() {
                success = false;
            }
        }
        success
    }

    pub async fn set_shuffle(&self, mode: ShuffleMode) -> QueryResult {
        self.query(&Command::shuffle(mode)).await
    }

    /// Set shuffle by mode name (`none`, `song`, `album`).
    /// Unknown names send nothing and return `None`.
    pub async fn set_shuffle_by_name(&self, name: &str) -> Option<QueryResult> {
        match ShuffleMode::from_str(name) {
            Ok(mode) => Some(self.set_shuffle(mode).await),
            Err(_) => {
                debug!("Ignoring unknown shuffle mode '{}'", name);
                None
            }
        }
    }

    pub async fn set_repeat(&self, mode: RepeatMode) -> QueryResult {
        self.query(&Command::repeat(mode)).await
    }

    /// Set repeat by mode name (`none`, `song`, `playlist`).
    /// Unknown names send nothing and return `None`.
    pub async fn set_repeat_by_name(&self, name: &str) -> Option<QueryResult> {
        match RepeatMode::from_str(name) {
            Ok(mode) => Some(self.set_repeat(mode).await),
            Err(_) => {
                debug!("Ignoring unknown repeat mode '{}'", name);
                None
            }
        }
    }

    pub async fn clear_playlist(&self) -> QueryResult {
        self.query(&Command::clear_playlist()).await
    }

    /// Add another player to this player's sync group.
    ///
    /// If the other player is already in a sync group it leaves that group.
    ///
    /// # Errors
    /// `LmsRpcError::MissingSyncTarget` if the other player id is empty
    pub async fn sync<'a>(&self, other: impl Into<SyncTarget<'a>>) -> Result<QueryResult, LmsRpcError> {
        let target: SyncTarget<'a> = other.into();
        let other_id = target.player_id();
        if other_id.is_empty() {
            return Err(LmsRpcError::MissingSyncTarget);
        }
        Ok(self.query(&Command::sync(other_id)).await)
    }

    /// Remove this player from its sync group
    pub async fn unsync(&self) -> QueryResult {
        self.query(&Command::unsync()).await
    }
}

/// LMS sends numbers either as JSON numbers or as numeric strings
fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(list) => !list.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
