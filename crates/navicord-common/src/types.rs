use serde::{Deserialize, Serialize};

/// What the music server reports as currently playing.
///
/// Produced by whatever polls the server; immutable once handed to the
/// presence publisher. Timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    pub start: i64,
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub art_url: Option<String>,
    pub activity_name: String,
}

impl PresenceUpdate {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, start: i64) -> Self {
        let artist = artist.into();
        Self {
            title: title.into(),
            activity_name: artist.clone(),
            artist,
            album: None,
            start,
            end: None,
            art_url: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_art_url(mut self, url: impl Into<String>) -> Self {
        self.art_url = Some(url.into());
        self
    }

    pub fn with_activity_name(mut self, name: impl Into<String>) -> Self {
        self.activity_name = name.into();
        self
    }
}
