use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info};
use serde_json::{Map, Value};

use crate::config::LmsConfig;
use crate::helpers::http_client::HttpTransport;
use crate::lms::command::Command;
use crate::lms::jsonrps::{LmsRpcClient, QueryResult};
use crate::lms::lmsplayer::LmsPlayer;

/// A Logitech Media Server and the players attached to it
#[derive(Debug, Clone)]
pub struct LmsServer {
    /// Connection shared with every player handed out by this server
    client: Arc<LmsRpcClient>,

    /// Last `serverstatus` reply
    status: Option<Map<String, Value>>,

    uuid: Option<String>,
}

impl LmsServer {
    /// Create a server using the default reqwest transport.
    ///
    /// This is all a discovery component needs to hand over a found server.
    pub fn new(host: &str, port: u16) -> Self {
        Self::from_client(LmsRpcClient::new(host, port))
    }

    /// Create a server on top of a custom transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>, host: &str, port: u16) -> Self {
        Self::from_client(LmsRpcClient::with_transport(transport, host, port))
    }

    /// Wrap an already configured client
    pub fn from_client(client: LmsRpcClient) -> Self {
        LmsServer {
            client: Arc::new(client),
            status: None,
            uuid: None,
        }
    }

    /// Build a server from configuration, using the given transport
    pub fn from_config(config: &LmsConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let mut client = LmsRpcClient::with_transport(transport, &config.host, config.port)
            .with_timeout(Duration::from_secs(config.timeout_secs));
        if let Some(credentials) = config.credentials() {
            client = client.with_credentials(&credentials.username, &credentials.password);
        }
        Self::from_client(client)
    }

    pub fn host(&self) -> &str {
        self.client.host()
    }

    pub fn port(&self) -> u16 {
        self.client.port()
    }

    pub fn client(&self) -> &Arc<LmsRpcClient> {
        &self.client
    }

    /// Server status from the last successful [`LmsServer::update_status`]
    pub fn status(&self) -> Option<&Map<String, Value>> {
        self.status.as_ref()
    }

    /// Server uuid, known after a successful [`LmsServer::update_status`]
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Send a server-level command
    pub async fn query(&self, command: &Command) -> QueryResult {
        self.client.query("", command).await
    }

    /// Fetch the server status and remember it together with the server uuid
    ///
    /// # Returns
    /// `true` if the status was updated
    pub async fn update_status(&mut self) -> bool {
        let status = match self.query(&Command::server_status()).await {
            QueryResult::Failed => return false,
            QueryResult::Acknowledged => Map::new(),
            QueryResult::Data(Value::Object(status)) => status,
            QueryResult::Data(other) => {
                error!("Received invalid server status: {}", other);
                return false;
            }
        };

        self.uuid = status.get("uuid").and_then(Value::as_str).map(str::to_string);
        self.status = Some(status);
        true
    }

    /// Get all players connected to this server
    ///
    /// # Returns
    /// `None` if the server could not be queried, otherwise one `LmsPlayer`
    /// per roster entry (possibly none)
    pub async fn get_players(&self) -> Option<Vec<LmsPlayer>> {
        let result = self.query(&Command::players()).await;
        if result.is_failure() {
            return None;
        }

        let roster = result
            .data()
            .and_then(|data| data.get("players_loop"))
            .and_then(Value::as_array);

        let players = roster
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let player_id = entry.get("playerid").and_then(Value::as_str)?;
                        let name = entry.get("name").and_then(Value::as_str).unwrap_or_default();
                        Some(LmsPlayer::new(self.client.clone(), player_id, name))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(players)
    }

    /// Find a player by id or by name.
    ///
    /// An id that does not match any player is retried as a name, so a player
    /// name can be passed in place of the id.
    ///
    /// # Arguments
    /// * `player_id` - Player id to look up
    /// * `name` - Player name, compared case-insensitively
    pub async fn get_player(&self, player_id: Option<&str>, name: Option<&str>) -> Option<LmsPlayer> {
        if let Some(player_id) = player_id.filter(|id| !id.is_empty()) {
            if let Some(player) = self.get_player_by_id(player_id).await {
                return Some(player);
            }
            debug!("Unable to find player with id: {}", player_id);
            return self.get_player_by_name(name.unwrap_or(player_id)).await;
        }

        if let Some(name) = name.filter(|name| !name.is_empty()) {
            return self.get_player_by_name(name).await;
        }

        error!("get_player called without name or player_id");
        None
    }

    async fn get_player_by_id(&self, player_id: &str) -> Option<LmsPlayer> {
        let result = self.client.query(player_id, &Command::status()).await;
        let name = result
            .data()
            .and_then(|data| data.get("player_name"))
            .and_then(Value::as_str)?;
        Some(LmsPlayer::new(self.client.clone(), player_id, name))
    }

    async fn get_player_by_name(&self, name: &str) -> Option<LmsPlayer> {
        let players = self.get_players().await?;
        let wanted = name.to_lowercase();
        let found = players
            .into_iter()
            .find(|player| player.name().to_lowercase() == wanted);

        match &found {
            Some(player) => info!("Found player '{}' ({})", player.name(), player.player_id()),
            None => debug!("Unable to find player with name: {}", name),
        }
        found
    }
}
