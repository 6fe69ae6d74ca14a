use serde::{Deserialize, Serialize};

/// Now-playing document as produced by the station update pipeline.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NowPlaying {
    pub station: String,
    #[serde(default)]
    pub now_playing: Option<CurrentSong>,
    #[serde(default)]
    pub listeners: Listeners,
    #[serde(default)]
    pub live: Live,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CurrentSong {
    pub song: Song,
    #[serde(default)]
    pub elapsed: u64,
    #[serde(default)]
    pub duration: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Song {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
}

/// Listener counts are signed on the wire; consumers reject negative values.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Listeners {
    #[serde(default)]
    pub current: i64,
    #[serde(default)]
    pub unique: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Live {
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub streamer_name: String,
}

impl NowPlaying {
    pub fn song_id(&self) -> &str {
        self.now_playing
            .as_ref()
            .map(|np| np.song.id.as_str())
            .unwrap_or_default()
    }
}
