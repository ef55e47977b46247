use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use env_logger::{Builder, Target, WriteStyle};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};

/// Logging subsystems of lmscontrol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoggingSubsystem {
    /// Command line client and library root
    #[serde(rename = "main")]
    Main,
    /// JSON-RPC connection and command building
    #[serde(rename = "rpc")]
    Rpc,
    /// Server and player handling
    #[serde(rename = "players")]
    Players,
    /// HTTP transport
    #[serde(rename = "http")]
    Http,
    /// Configuration loading and parsing
    #[serde(rename = "config")]
    Config,
    /// Third-party dependencies
    #[serde(rename = "deps")]
    Dependencies,
}

impl LoggingSubsystem {
    /// Get the module prefix for this subsystem
    pub fn module_prefix(&self) -> &'static str {
        match self {
            LoggingSubsystem::Main => "lmscontrol",
            LoggingSubsystem::Rpc => "lmscontrol::lms::jsonrps,lmscontrol::lms::command",
            LoggingSubsystem::Players => "lmscontrol::lms::lmsserver,lmscontrol::lms::lmsplayer",
            LoggingSubsystem::Http => "lmscontrol::helpers::http_client,reqwest,hyper",
            LoggingSubsystem::Config => "lmscontrol::config",
            LoggingSubsystem::Dependencies => "hyper_util,url",
        }
    }

    /// Parse a subsystem name as used in the configuration file
    pub fn from_name(name: &str) -> Option<LoggingSubsystem> {
        match name.to_lowercase().as_str() {
            "main" => Some(LoggingSubsystem::Main),
            "rpc" => Some(LoggingSubsystem::Rpc),
            "players" => Some(LoggingSubsystem::Players),
            "http" => Some(LoggingSubsystem::Http),
            "config" => Some(LoggingSubsystem::Config),
            "deps" | "dependencies" => Some(LoggingSubsystem::Dependencies),
            _ => None,
        }
    }
}

/// Logging configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Target for log output (stdout, stderr)
    #[serde(default = "default_target")]
    pub target: String,

    /// Whether to include timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colors: bool,

    /// Subsystem-specific log levels. Unknown names are used as module paths.
    #[serde(default)]
    pub subsystems: HashMap<String, String>,

    #[serde(default)]
    pub include_module_path: bool,

    #[serde(default)]
    pub include_line_numbers: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            timestamps: true,
            colors: true,
            subsystems: HashMap::new(),
            include_module_path: false,
            include_line_numbers: false,
        }
    }
}

impl LoggingConfig {
    /// Load logging configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read logging config file: {}", e))?;
        Self::from_json(&content)
    }

    /// Load logging configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse logging config JSON: {}", e))
    }

    /// Convert string log level to LevelFilter
    fn parse_log_level(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => {
                eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
                LevelFilter::Info
            }
        }
    }

    /// Module prefixes and levels for every configured subsystem
    fn module_filters(&self) -> Vec<(String, String)> {
        let mut filters = Vec::new();
        for (subsystem_name, level) in &self.subsystems {
            match LoggingSubsystem::from_name(subsystem_name) {
                Some(subsystem) => {
                    for prefix in subsystem.module_prefix().split(',') {
                        filters.push((prefix.trim().to_string(), level.clone()));
                    }
                }
                None => filters.push((subsystem_name.clone(), level.clone())),
            }
        }
        filters.sort();
        filters
    }

    /// Build the filter string in env_logger syntax, e.g. `info,lmscontrol::config=debug`
    pub fn build_filter_string(&self) -> String {
        let mut filter_parts = vec![self.level.clone()];
        for (module, level) in self.module_filters() {
            filter_parts.push(format!("{}={}", module, level));
        }
        filter_parts.join(",")
    }

    /// Initialize the process-wide logger with this configuration
    pub fn initialize_logger(&self) -> Result<(), String> {
        let filter_string = self.build_filter_string();

        let mut builder = Builder::new();

        // Parse environment variables if they exist
        builder.parse_env("RUST_LOG");

        builder.filter(None, Self::parse_log_level(&self.level));
        for (module, level) in self.module_filters() {
            builder.filter(Some(module.as_str()), Self::parse_log_level(&level));
        }

        builder.write_style(if self.colors { WriteStyle::Auto } else { WriteStyle::Never });

        match self.target.to_lowercase().as_str() {
            "stdout" => {
                builder.target(Target::Stdout);
            }
            "stderr" => {
                builder.target(Target::Stderr);
            }
            _ => {
                return Err(format!("Unknown logging target: {}", self.target));
            }
        }

        let timestamps = self.timestamps;
        let include_module_path = self.include_module_path;
        let include_line_numbers = self.include_line_numbers;

        builder.format(move |buf, record| {
            let mut output = String::new();

            if timestamps {
                output.push_str(&format!("[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
            }

            output.push_str(&format!("[{}] ", record.level()));

            if include_module_path {
                if let Some(module) = record.module_path() {
                    output.push_str(&format!("[{}] ", module));
                }
            }

            if include_line_numbers {
                if let (Some(file), Some(line)) = (record.file(), record.line()) {
                    output.push_str(&format!("[{}:{}] ", file, line));
                }
            }

            output.push_str(&format!("{}", record.args()));

            writeln!(buf, "{}", output)
        });

        builder.try_init()
            .map_err(|e| format!("Failed to initialize logger: {}", e))?;

        debug!("Logging initialized with filter: {}", filter_string);
        Ok(())
    }
}

/// Initialize logging with default configuration
pub fn initialize_default_logging() -> Result<(), String> {
    LoggingConfig::default().initialize_logger()
}

/// Initialize logging from an optional config file, raising the global level
/// to debug when `debug` is set
pub fn initialize_logging(config_file: Option<&Path>, debug: bool) -> Result<(), String> {
    let mut config = match config_file {
        Some(path) if path.exists() => LoggingConfig::from_file(path)?,
        Some(path) => {
            eprintln!("Logging config file {:?} not found, using defaults", path);
            LoggingConfig::default()
        }
        None => LoggingConfig::default(),
    };

    if debug {
        config.level = "debug".to_string();
    }

    config.initialize_logger()?;
    if debug {
        info!("Debug mode enabled via command line");
    }
    Ok(())
}
