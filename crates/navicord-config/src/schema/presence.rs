//! Presence display configuration.

use serde::{Deserialize, Serialize};

/// Which field of the playing track becomes the activity name.
///
/// Serialized as a plain string: `artist`, `album`, `track`, or any other
/// text used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ActivityNameMode {
    #[default]
    Artist,
    Album,
    Track,
    Custom(String),
}

impl From<String> for ActivityNameMode {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "artist" => Self::Artist,
            "album" => Self::Album,
            "track" => Self::Track,
            _ => Self::Custom(value),
        }
    }
}

impl From<ActivityNameMode> for String {
    fn from(mode: ActivityNameMode) -> Self {
        match mode {
            ActivityNameMode::Artist => "artist".into(),
            ActivityNameMode::Album => "album".into(),
            ActivityNameMode::Track => "track".into(),
            ActivityNameMode::Custom(text) => text,
        }
    }
}

impl ActivityNameMode {
    /// Pick the activity label for a track. A missing album falls back to the artist.
    pub fn label(&self, title: &str, artist: &str, album: Option<&str>) -> String {
        match self {
            Self::Artist => artist.to_string(),
            Self::Album => album.unwrap_or(artist).to_string(),
            Self::Track => title.to_string(),
            Self::Custom(text) => text.clone(),
        }
    }
}

/// Presence frame settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub activity_name: ActivityNameMode,
    /// Status flag sent with every presence frame (online, idle, dnd, invisible).
    pub status: String,
    pub afk: bool,
    /// Activity type; 2 renders as "Listening to" (valid range: 0-5).
    pub activity_type: u8,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            activity_name: ActivityNameMode::Artist,
            status: "online".into(),
            afk: false,
            activity_type: 2,
        }
    }
}
