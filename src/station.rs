use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::result::Result;

/// Opaque per-webhook settings, handed to the connector untouched.
pub type ConnectorConfig = Map<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub webhooks: Vec<StationWebhook>,
}

/// A webhook record as stored for the station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationWebhook {
    pub r#type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Trigger names; an empty list subscribes to everything.
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub config: ConnectorConfig,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl StationWebhook {
    pub fn new<T: ToString>(r#type: T) -> Self {
        Self {
            r#type: r#type.to_string(),
            enabled: true,
            triggers: vec![],
            config: Default::default(),
            name: None,
        }
    }

    pub fn triggers<I, T>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.triggers = triggers.into_iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn config(mut self, config: ConnectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Point-in-time view of a station's broadcast state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NowPlayingSnapshot {
    pub station_id: String,
    pub song_id: String,
    pub listeners: u64,
    pub is_live: bool,
}

impl NowPlayingSnapshot {
    pub fn new<T, S>(station_id: T, song_id: S, listeners: u64, is_live: bool) -> Self
    where
        T: ToString,
        S: ToString,
    {
        Self {
            station_id: station_id.to_string(),
            song_id: song_id.to_string(),
            listeners,
            is_live,
        }
    }
}

impl TryFrom<api::now_playing::NowPlaying> for NowPlayingSnapshot {
    type Error = AppError;

    fn try_from(value: api::now_playing::NowPlaying) -> Result<Self> {
        let listeners = u64::try_from(value.listeners.current).map_err(|_| {
            AppError::invalid_snapshot_pair(format!(
                "station {} reports negative listener count {}",
                value.station, value.listeners.current
            ))
        })?;
        Ok(Self {
            song_id: value.song_id().to_string(),
            station_id: value.station,
            listeners,
            is_live: value.live.is_live,
        })
    }
}

/// Checks that `old` and `new` describe consecutive states of `station`.
pub fn validate_pair(
    station: &Station,
    old: &NowPlayingSnapshot,
    new: &NowPlayingSnapshot,
) -> Result<()> {
    if old.station_id != new.station_id {
        return Err(AppError::invalid_snapshot_pair(format!(
            "snapshots reference different stations: {} != {}",
            old.station_id, new.station_id
        )));
    }
    if new.station_id != station.id {
        return Err(AppError::invalid_snapshot_pair(format!(
            "snapshots for {} dispatched against station {}",
            new.station_id, station.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now_playing(listeners: i64) -> api::now_playing::NowPlaying {
        serde_json::from_value(serde_json::json!({
            "station": "radio",
            "now_playing": {"song": {"id": "a"}},
            "listeners": {"current": listeners},
            "live": {"is_live": true},
        }))
        .unwrap()
    }

    #[test]
    fn test_snapshot_from_now_playing() {
        let snapshot = NowPlayingSnapshot::try_from(now_playing(4)).unwrap();
        assert_eq!(snapshot, NowPlayingSnapshot::new("radio", "a", 4, true));
    }

    #[test]
    fn test_snapshot_rejects_negative_listeners() {
        let err = NowPlayingSnapshot::try_from(now_playing(-1)).unwrap_err();
        assert!(matches!(err, AppError::InvalidSnapshotPair(_)));
    }

    #[test]
    fn test_validate_pair() {
        let station = Station {
            id: "radio".to_string(),
            ..Default::default()
        };
        let a = NowPlayingSnapshot::new("radio", "a", 1, false);
        let b = NowPlayingSnapshot::new("other", "a", 1, false);
        assert!(validate_pair(&station, &a, &a).is_ok());
        assert!(matches!(
            validate_pair(&station, &a, &b),
            Err(AppError::InvalidSnapshotPair(_))
        ));
        assert!(matches!(
            validate_pair(&station, &b, &b),
            Err(AppError::InvalidSnapshotPair(_))
        ));
    }

    #[test]
    fn test_webhook_defaults() {
        let webhook: StationWebhook = serde_json::from_str(r#"{"type":"generic"}"#).unwrap();
        assert!(webhook.enabled);
        assert!(webhook.triggers.is_empty());
        assert!(webhook.config.is_empty());
    }
}
