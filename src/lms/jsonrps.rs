use std::sync::Arc;
use std::time::Duration;
use log::{debug, error};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::helpers::http_client::{Credentials, HttpClientError, HttpTransport, ReqwestHttpClient};
use crate::lms::command::Command;

/// The standard JSON-RPC path for Lyrion Music Server
pub const JSONRPC_PATH: &str = "/jsonrpc.js";

/// Default HTTP port of the LMS JSON-RPC API
pub const DEFAULT_PORT: u16 = 9000;

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur when interacting with the LMS JSON-RPC API
#[derive(Debug, thiserror::Error)]
pub enum LmsRpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] HttpClientError),

    #[error("HTTP error {0}")]
    HttpStatus(u16),

    #[error("Failed to serialize request: {0}")]
    SerializeError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Response has no result field")]
    MissingResult,

    #[error("sync called without another player or player id")]
    MissingSyncTarget,
}

/// Outcome of a single LMS command.
///
/// LMS answers commands that only change state with an empty result, so
/// "acknowledged" and "failed" must stay distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Command succeeded and returned data
    Data(Value),
    /// Command succeeded without returning anything
    Acknowledged,
    /// Transport or protocol failure (already logged)
    Failed,
}

impl QueryResult {
    /// Build the result from the `result` field of a response
    pub fn from_result(result: Value) -> Self {
        let empty = match &result {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(list) => list.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        };
        if empty {
            QueryResult::Acknowledged
        } else {
            QueryResult::Data(result)
        }
    }

    /// True for both `Data` and `Acknowledged`
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QueryResult::Failed)
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            QueryResult::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<Value> {
        match self {
            QueryResult::Data(value) => Some(value),
            _ => None,
        }
    }
}

/// Request structure for LMS JSON-RPC API
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    id: &'static str,
    method: &'static str,
    params: (&'a str, &'a Command),
}

/// LMS JSON-RPC connection: server address, credentials and transport.
///
/// Holds no per-call state, so one instance can be shared between players
/// and used from concurrent tasks.
#[derive(Debug, Clone)]
pub struct LmsRpcClient {
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    timeout: Duration,
    transport: Arc<dyn HttpTransport>,
}

impl LmsRpcClient {
    /// Create a new LMS JSON-RPC client using the reqwest transport
    ///
    /// # Arguments
    /// * `host` - Hostname or IP address of the LMS server
    /// * `port` - HTTP port of the LMS server (typically 9000)
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_transport(Arc::new(ReqwestHttpClient::new()), host, port)
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(transport: Arc<dyn HttpTransport>, host: &str, port: u16) -> Self {
        LmsRpcClient {
            host: host.to_string(),
            port,
            credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            transport,
        }
    }

    /// Authenticate requests with HTTP Basic auth
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Set a custom timeout for each request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the JSON-RPC endpoint
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, JSONRPC_PATH)
    }

    /// Send a command and map every failure to `QueryResult::Failed`
    ///
    /// # Arguments
    /// * `player_id` - Player to address, or "" for server-level commands
    /// * `command` - Positional command tokens
    pub async fn query(&self, player_id: &str, command: &Command) -> QueryResult {
        match self.request(player_id, command).await {
            Ok(result) => QueryResult::from_result(result),
            Err(e) => {
                error!("LMS command {:?} for player '{}' failed: {}", command.tokens(), player_id, e);
                QueryResult::Failed
            }
        }
    }

    /// Send a command and return the raw `result` field
    pub async fn request(&self, player_id: &str, command: &Command) -> Result<Value, LmsRpcError> {
        let request = JsonRpcRequest {
            id: "1",
            method: "slim.request",
            params: (player_id, command),
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| LmsRpcError::SerializeError(e.to_string()))?;

        let url = self.url();
        debug!("URL: {} Data: {}", url, body);

        let response = self.transport
            .post(&url, &body, self.credentials.as_ref(), self.timeout)
            .await?;

        if response.status != 200 {
            error!("Query failed, response code: {} Full message: {}", response.status, response.body);
            return Err(LmsRpcError::HttpStatus(response.status));
        }

        // A JSON-RPC reply is always an object; `result: null` still counts as a result
        let mut parsed: Map<String, Value> = serde_json::from_str(&response.body).map_err(|e| {
            error!("Received invalid response: {}", response.body);
            LmsRpcError::ParseError(e.to_string())
        })?;

        match parsed.remove("result") {
            Some(result) => {
                debug!("LMS response: {:?}", result);
                Ok(result)
            }
            None => {
                error!("Received response without result: {}", response.body);
                Err(LmsRpcError::MissingResult)
            }
        }
    }
}
