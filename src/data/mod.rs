// Data structures shared by the LMS client

pub mod loop_mode;
pub mod player_command;

pub use loop_mode::{RepeatMode, ShuffleMode};
pub use player_command::PlaylistCommand;
