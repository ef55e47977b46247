use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use log::info;

use lmscontrol::config::LmsConfig;
use lmscontrol::helpers::ReqwestHttpClient;
use lmscontrol::logging::initialize_logging;
use lmscontrol::{LmsPlayer, LmsServer, PlaylistCommand, QueryResult};

/// Command line client for controlling players of a Lyrion Music Server (LMS)
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// LMS server hostname or IP address
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// LMS server port
    #[clap(short, long, default_value_t = 9000)]
    port: u16,

    /// Username for HTTP Basic auth
    #[clap(short, long)]
    username: Option<String>,

    /// Password for HTTP Basic auth
    #[clap(long)]
    password: Option<String>,

    /// JSON configuration file with an "lms" section; overrides host/port/credentials
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// JSON logging configuration file
    #[clap(long)]
    log_config: Option<PathBuf>,

    /// Player ID or name to control.
    /// If not provided, the first available player will be used
    #[clap(short = 'i', long)]
    player: Option<String>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all available LMS players
    ListPlayers,

    /// Show current player status
    Status,

    /// Show server status
    ServerStatus,

    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Toggle between play and pause
    Toggle,

    /// Stop playback
    Stop,

    /// Turn the player on or off
    Power {
        /// "on" or "off"
        state: String,
    },

    /// Set the volume
    Volume {
        /// Volume level (0-100)
        #[clap(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },

    /// Mute the player
    Mute,

    /// Unmute the player
    Unmute,

    /// Set the shuffle mode (none, song, album)
    Shuffle {
        mode: String,
    },

    /// Set the repeat mode (none, song, playlist)
    Repeat {
        mode: String,
    },

    /// Load one or more URLs into the playlist
    Load {
        /// How to load: play, load, insert or add
        #[clap(short, long, default_value = "play")]
        mode: String,

        urls: Vec<String>,
    },

    /// Clear the playlist
    Clear,

    /// Sync another player (id) to this one
    Sync {
        other: String,
    },

    /// Remove the player from its sync group
    Unsync,
}

fn build_server(cli: &Cli) -> Result<LmsServer, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => LmsConfig::from_file(path)?,
        None => {
            let mut config = LmsConfig::new(&cli.host);
            config.port = cli.port;
            config.username = cli.username.clone();
            config.password = cli.password.clone();
            config
        }
    };
    Ok(LmsServer::from_config(&config, Arc::new(ReqwestHttpClient::new())))
}

async fn select_player(server: &LmsServer, wanted: Option<&str>) -> Result<LmsPlayer, Box<dyn Error>> {
    if let Some(wanted) = wanted {
        return server
            .get_player(Some(wanted), None)
            .await
            .ok_or_else(|| format!("No player found with id or name '{}'", wanted).into());
    }

    let players = server
        .get_players()
        .await
        .ok_or("Failed to get players. Is the LMS server running?")?;
    let player = players
        .into_iter()
        .next()
        .ok_or("No players found. Is the LMS server running?")?;
    info!("Using player: {} ({})", player.name(), player.player_id());
    Ok(player)
}

fn show(value: Option<impl std::fmt::Display>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn report(result: QueryResult) -> Result<(), Box<dyn Error>> {
    match result {
        QueryResult::Failed => Err("Command failed".into()),
        QueryResult::Data(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        QueryResult::Acknowledged => {
            println!("OK");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    initialize_logging(cli.log_config.as_deref(), cli.debug)?;

    let mut server = build_server(&cli)?;

    match &cli.command {
        Commands::ListPlayers => {
            let players = server.get_players().await.ok_or("Failed to get players")?;
            println!("Available players ({}):", players.len());
            for (i, player) in players.iter().enumerate() {
                println!("{}. {} ({})", i + 1, player.name(), player.player_id());
            }
            return Ok(());
        }
        Commands::ServerStatus => {
            if !server.update_status().await {
                return Err("Failed to get server status".into());
            }
            println!("Server: {}:{}", server.host(), server.port());
            println!("UUID: {}", show(server.uuid()));
            if let Some(status) = server.status() {
                println!("{}", serde_json::to_string_pretty(status)?);
            }
            return Ok(());
        }
        _ => {}
    }

    let mut player = select_player(&server, cli.player.as_deref()).await?;

    match &cli.command {
        Commands::Status => {
            if !player.update().await {
                return Err("Failed to get player status".into());
            }
            println!("Player: {} ({})", player.name(), player.player_id());
            println!("Power: {}", show(player.power().map(|on| if on { "on" } else { "off" })));
            println!("State: {}", show(player.mode()));
            println!("Volume: {}", show(player.volume()));
            println!("Muted: {}", show(player.muting()));
            println!("Shuffle: {}", show(player.shuffle()));
            println!("Repeat: {}", show(player.repeat()));
            println!("Title: {}", show(player.title()));
            println!("Artist: {}", show(player.artist()));
            println!("Album: {}", show(player.album()));
            println!("Position: {}/{}", show(player.time()), show(player.duration()));
            println!("Cover: {}", player.image_url());
            println!("Artwork: {}", show(player.artwork_url()));
            let group: Vec<String> = player
                .sync_group()
                .iter()
                .map(|id| id.as_str().map(str::to_string).unwrap_or_else(|| id.to_string()))
                .collect();
            println!("Sync group: {}", group.join(", "));
            Ok(())
        }
        Commands::Play => report(player.play().await),
        Commands::Pause => report(player.pause().await),
        Commands::Toggle => report(player.toggle_pause().await),
        Commands::Stop => report(player.stop().await),
        Commands::Power { state } => match state.as_str() {
            "on" => report(player.set_power(true).await),
            "off" => report(player.set_power(false).await),
            other => Err(format!("Unknown power state '{}', use on or off", other).into()),
        },
        Commands::Volume { level } => report(player.set_volume(*level).await),
        Commands::Mute => report(player.set_muting(true).await),
        Commands::Unmute => report(player.set_muting(false).await),
        Commands::Shuffle { mode } => match player.set_shuffle_by_name(mode).await {
            Some(result) => report(result),
            None => Err(format!("Unknown shuffle mode '{}'", mode).into()),
        },
        Commands::Repeat { mode } => match player.set_repeat_by_name(mode).await {
            Some(result) => report(result),
            None => Err(format!("Unknown repeat mode '{}'", mode).into()),
        },
        Commands::Load { mode, urls } => {
            let cmd = PlaylistCommand::from_str(mode)
                .map_err(|_| format!("Unknown load mode '{}'", mode))?;
            let entries: Vec<serde_json::Value> = urls
                .iter()
                .map(|url| serde_json::json!({ "url": url }))
                .collect();
            if player.load_playlist(&entries, cmd).await {
                println!("OK");
                Ok(())
            } else {
                Err("Some tracks could not be loaded".into())
            }
        }
        Commands::Clear => report(player.clear_playlist().await),
        Commands::Sync { other } => report(player.sync(other).await?),
        Commands::Unsync => report(player.unsync().await),
        Commands::ListPlayers | Commands::ServerStatus => Ok(()),
    }
}
