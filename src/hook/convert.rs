use crate::station::{NowPlayingSnapshot, Station};

impl From<&Station> for api::event::Station {
    fn from(value: &Station) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
        }
    }
}

impl From<&NowPlayingSnapshot> for api::event::NowPlaying {
    fn from(value: &NowPlayingSnapshot) -> Self {
        Self {
            song_id: value.song_id.clone(),
            listeners: value.listeners,
            is_live: value.is_live,
        }
    }
}

pub fn event_body(station: &Station, snapshot: &NowPlayingSnapshot) -> api::event::EventBody {
    api::event::EventBody {
        station: station.into(),
        now_playing: snapshot.into(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}
