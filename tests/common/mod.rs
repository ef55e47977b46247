// Common helpers for integration tests: an in-memory LMS speaking the
// slim.request dialect over the HttpTransport trait.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use lmscontrol::helpers::{Credentials, HttpClientError, HttpResponse, HttpTransport};
use lmscontrol::LmsServer;

pub const KITCHEN: &str = "00:04:20:aa:aa:01";
pub const LIVING_ROOM: &str = "00:04:20:aa:aa:02";
pub const SERVER_UUID: &str = "5bd6a2c1-7c4e-4a5e-9c2b-2f3a0e1d9b77";

pub const TEST_URIS: [&str; 3] = [
    "file:///music/The%20Who/A%20Quick%20One/02%20Boris%20the%20Spider.mp3",
    "file:///music/The%20Beatles/Revolver/06%20Yellow%20Submarine.flac",
    "file:///music/Bob%20Marley/Catch%20A%20Fire/04%20Stop%20That%20Train.flac",
];

/// One request as seen on the wire
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub player_id: String,
    pub command: Vec<Value>,
    pub auth: Option<Credentials>,
}

#[derive(Debug, Clone)]
pub struct FakePlayer {
    pub player_id: String,
    pub name: String,
    pub power: i64,
    pub volume: i64,
    pub muted: bool,
    pub mode: String,
    pub shuffle: i64,
    pub repeat: i64,
    pub playlist: Vec<String>,
    pub cur_index: usize,
    pub sync_master: Option<String>,
    pub sync_slaves: Option<String>,
    pub remote_meta: Option<Value>,
}

impl FakePlayer {
    pub fn new(player_id: &str, name: &str) -> Self {
        FakePlayer {
            player_id: player_id.to_string(),
            name: name.to_string(),
            power: 1,
            volume: 50,
            muted: false,
            mode: "stop".to_string(),
            shuffle: 0,
            repeat: 0,
            playlist: Vec::new(),
            cur_index: 0,
            sync_master: None,
            sync_slaves: None,
            remote_meta: None,
        }
    }

    fn status(&self) -> Value {
        let mut status = Map::new();
        status.insert("player_name".into(), json!(self.name));
        status.insert("player_connected".into(), json!(1));
        status.insert("power".into(), json!(self.power));
        status.insert("mode".into(), json!(self.mode));
        let volume = if self.muted { -self.volume } else { self.volume };
        status.insert("mixer volume".into(), json!(volume));
        status.insert("playlist shuffle".into(), json!(self.shuffle));
        status.insert("playlist repeat".into(), json!(self.repeat));
        status.insert("playlist_tracks".into(), json!(self.playlist.len()));

        if !self.playlist.is_empty() {
            // LMS sends the index as a string
            status.insert("playlist_cur_index".into(), json!(self.cur_index.to_string()));
            let entries: Vec<Value> = self
                .playlist
                .iter()
                .enumerate()
                .map(|(i, url)| {
                    json!({
                        "playlist index": i,
                        "title": format!("Track {}", i + 1),
                        "artist": "Test Artist",
                        "album": "Test Album",
                        "duration": 180.5,
                        "url": url,
                    })
                })
                .collect();
            status.insert("playlist_loop".into(), Value::Array(entries));
        }
        if let Some(meta) = &self.remote_meta {
            status.insert("remoteMeta".into(), meta.clone());
        }
        if let Some(master) = &self.sync_master {
            status.insert("sync_master".into(), json!(master));
        }
        if let Some(slaves) = &self.sync_slaves {
            status.insert("sync_slaves".into(), json!(slaves));
        }
        Value::Object(status)
    }

    pub fn urls(&self) -> Vec<String> {
        self.playlist.clone()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    players: Vec<FakePlayer>,
    requests: Vec<RecordedRequest>,
    down: bool,
    http_status: Option<u16>,
}

/// In-memory LMS
#[derive(Debug, Default)]
pub struct FakeLms {
    state: Mutex<FakeState>,
}

fn token(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FakeLms {
    pub fn with_players(players: &[(&str, &str)]) -> Arc<Self> {
        let fake = FakeLms::default();
        {
            let mut state = fake.state.lock().unwrap();
            state.players = players.iter().map(|(id, name)| FakePlayer::new(id, name)).collect();
        }
        Arc::new(fake)
    }

    /// Two players, Kitchen and Living Room
    pub fn standard() -> Arc<Self> {
        Self::with_players(&[(KITCHEN, "Kitchen"), (LIVING_ROOM, "Living Room")])
    }

    /// Simulate a server that refuses connections
    pub fn set_down(&self, down: bool) {
        self.state.lock().unwrap().down = down;
    }

    /// Answer every request with this HTTP status
    pub fn set_http_status(&self, status: Option<u16>) {
        self.state.lock().unwrap().http_status = status;
    }

    pub fn player(&self, player_id: &str) -> FakePlayer {
        self.state
            .lock()
            .unwrap()
            .players
            .iter()
            .find(|p| p.player_id == player_id)
            .cloned()
            .expect("unknown fake player")
    }

    pub fn modify_player(&self, player_id: &str, change: impl FnOnce(&mut FakePlayer)) {
        let mut state = self.state.lock().unwrap();
        let player = state
            .players
            .iter_mut()
            .find(|p| p.player_id == player_id)
            .expect("unknown fake player");
        change(player);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Commands sent so far, without the status polls
    pub fn commands(&self) -> Vec<Vec<Value>> {
        self.requests()
            .into_iter()
            .map(|r| r.command)
            .filter(|c| c.first() != Some(&json!("status")))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    fn handle(state: &mut FakeState, player_id: &str, command: &[Value]) -> Option<Value> {
        let args: Vec<String> = command.iter().map(token).collect();
        let verb = args.first()?.as_str();

        if player_id.is_empty() {
            return match verb {
                "players" => {
                    let mut result = Map::new();
                    result.insert("count".into(), json!(state.players.len()));
                    if !state.players.is_empty() {
                        let roster: Vec<Value> = state
                            .players
                            .iter()
                            .map(|p| json!({"playerid": p.player_id, "name": p.name, "connected": 1, "power": p.power}))
                            .collect();
                        result.insert("players_loop".into(), Value::Array(roster));
                    }
                    Some(Value::Object(result))
                }
                "serverstatus" => Some(json!({
                    "uuid": SERVER_UUID,
                    "version": "8.3.1",
                    "player count": state.players.len(),
                })),
                _ => None,
            };
        }

        let index = state.players.iter().position(|p| p.player_id == player_id)?;
        let arg = |i: usize| args.get(i).map(String::as_str);

        match (verb, arg(1)) {
            ("status", _) => return Some(state.players[index].status()),
            ("sync", Some("-")) => {
                let player = &mut state.players[index];
                player.sync_master = None;
                player.sync_slaves = None;
            }
            ("sync", Some(other)) => {
                let other = other.to_string();
                let other_index = state.players.iter().position(|p| p.player_id == other)?;
                state.players[index].sync_slaves = Some(other);
                state.players[other_index].sync_master = Some(player_id.to_string());
            }
            _ => {
                let player = &mut state.players[index];
                match (verb, arg(1), arg(2)) {
                    ("power", Some(on), _) => player.power = on.parse().ok()?,
                    ("play", _, _) => player.mode = "play".to_string(),
                    ("stop", _, _) => player.mode = "stop".to_string(),
                    ("pause", Some("1"), _) => player.mode = "pause".to_string(),
                    ("pause", Some("0"), _) => player.mode = "play".to_string(),
                    ("pause", None, _) => {
                        player.mode = if player.mode == "play" { "pause" } else { "play" }.to_string()
                    }
                    ("time", Some(_), _) => {}
                    ("mixer", Some("volume"), Some(value)) => {
                        let number: i64 = value.trim_start_matches('+').parse().ok()?;
                        if value.starts_with('+') || value.starts_with('-') {
                            player.volume = (player.volume + number).clamp(0, 100);
                        } else {
                            player.volume = number.clamp(0, 100);
                        }
                    }
                    ("mixer", Some("muting"), Some(value)) => player.muted = value == "1",
                    ("playlist", Some("play"), Some(url)) => {
                        player.playlist = vec![url.to_string()];
                        player.cur_index = 0;
                        player.mode = "play".to_string();
                    }
                    ("playlist", Some("load"), Some(url)) => {
                        player.playlist = vec![url.to_string()];
                        player.cur_index = 0;
                    }
                    ("playlist", Some("add"), Some(url)) => player.playlist.push(url.to_string()),
                    ("playlist", Some("insert"), Some(url)) => {
                        let position = (player.cur_index + 1).min(player.playlist.len());
                        player.playlist.insert(position, url.to_string());
                    }
                    ("playlist", Some("clear"), _) => {
                        player.playlist.clear();
                        player.cur_index = 0;
                        player.mode = "stop".to_string();
                    }
                    ("playlist", Some("index"), Some(value)) => {
                        let number: i64 = value.trim_start_matches('+').parse().ok()?;
                        let target = if value.starts_with('+') || value.starts_with('-') {
                            player.cur_index as i64 + number
                        } else {
                            number
                        };
                        if target >= 0 && (target as usize) < player.playlist.len() {
                            player.cur_index = target as usize;
                        }
                    }
                    ("playlist", Some("shuffle"), Some(value)) => player.shuffle = value.parse().ok()?,
                    ("playlist", Some("repeat"), Some(value)) => player.repeat = value.parse().ok()?,
                    _ => return None,
                }
            }
        }
        Some(json!({}))
    }
}

#[async_trait]
impl HttpTransport for FakeLms {
    async fn post(
        &self,
        url: &str,
        body: &str,
        auth: Option<&Credentials>,
        _timeout: Duration,
    ) -> Result<HttpResponse, HttpClientError> {
        let request: Value = serde_json::from_str(body).expect("client sent invalid JSON");
        assert_eq!(request["id"], json!("1"));
        assert_eq!(request["method"], json!("slim.request"));

        let player_id = request["params"][0].as_str().unwrap_or_default().to_string();
        let command = request["params"][1].as_array().cloned().unwrap_or_default();

        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            url: url.to_string(),
            player_id: player_id.clone(),
            command: command.clone(),
            auth: auth.cloned(),
        });

        if state.down {
            return Err(HttpClientError::RequestError("connection refused".to_string()));
        }
        if let Some(status) = state.http_status {
            return Ok(HttpResponse::new(status, "Internal Server Error"));
        }

        // Unknown players and commands get a reply without a result field
        let mut reply = json!({"id": "1", "method": "slim.request", "params": [player_id, command]});
        if let Some(result) = FakeLms::handle(&mut state, &player_id, &command) {
            reply["result"] = result;
        }
        Ok(HttpResponse::new(200, reply.to_string()))
    }
}

/// A server talking to `fake`
pub fn server_for(fake: &Arc<FakeLms>) -> LmsServer {
    LmsServer::with_transport(fake.clone(), "lms.test", 9000)
}

pub fn urls_entries(urls: &[&str]) -> Vec<Value> {
    urls.iter().map(|url| json!({ "url": url })).collect()
}
