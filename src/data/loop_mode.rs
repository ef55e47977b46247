//! Repeat and shuffle modes as understood by LMS
use serde::{Serialize, Deserialize};
use strum_macros::{Display, EnumString};

/// Repeat mode. LMS encodes it as an index into `none/song/playlist`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RepeatMode {
    /// No repeat
    None = 0,
    /// Repeat the current song
    Song = 1,
    /// Repeat the whole playlist
    Playlist = 2,
}

impl RepeatMode {
    /// All modes in protocol index order
    pub const ALL: [RepeatMode; 3] = [RepeatMode::None, RepeatMode::Song, RepeatMode::Playlist];

    /// Protocol index of this mode
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a mode by protocol index
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(RepeatMode::None),
            1 => Some(RepeatMode::Song),
            2 => Some(RepeatMode::Playlist),
            _ => None,
        }
    }
}

impl Default for RepeatMode {
    fn default() -> Self {
        RepeatMode::None
    }
}

/// Shuffle mode. LMS encodes it as an index into `none/song/album`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShuffleMode {
    /// Play in order
    None = 0,
    /// Shuffle by song
    Song = 1,
    /// Shuffle by album
    Album = 2,
}

impl ShuffleMode {
    /// All modes in protocol index order
    pub const ALL: [ShuffleMode; 3] = [ShuffleMode::None, ShuffleMode::Song, ShuffleMode::Album];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(ShuffleMode::None),
            1 => Some(ShuffleMode::Song),
            2 => Some(ShuffleMode::Album),
            _ => None,
        }
    }
}

impl Default for ShuffleMode {
    fn default() -> Self {
        ShuffleMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mode_names_match_protocol_table() {
        let repeat: Vec<String> = RepeatMode::ALL.iter().map(|m| m.to_string()).collect();
        assert_eq!(repeat, vec!["none", "song", "playlist"]);

        let shuffle: Vec<String> = ShuffleMode::ALL.iter().map(|m| m.to_string()).collect();
        assert_eq!(shuffle, vec!["none", "song", "album"]);
    }

    #[test]
    fn test_index_round_trip() {
        for mode in RepeatMode::ALL {
            assert_eq!(RepeatMode::from_index(mode.index() as i64), Some(mode));
        }
        for mode in ShuffleMode::ALL {
            assert_eq!(ShuffleMode::from_index(mode.index() as i64), Some(mode));
        }
        assert_eq!(ShuffleMode::from_index(3), None);
        assert_eq!(RepeatMode::from_index(-1), None);
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(ShuffleMode::from_str("album").ok(), Some(ShuffleMode::Album));
        assert!(ShuffleMode::from_str("Album").is_err());
        assert!(ShuffleMode::from_str("playlist").is_err());
        assert_eq!(RepeatMode::from_str("playlist").ok(), Some(RepeatMode::Playlist));
        assert!(RepeatMode::from_str("album").is_err());
    }
}
