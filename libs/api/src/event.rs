use serde::{Deserialize, Serialize};

/// Body POSTed by the generic webhook connector.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventBody {
    pub station: Station,
    pub now_playing: NowPlaying,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub song_id: String,
    pub listeners: u64,
    pub is_live: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_playing_camel_case() {
        let body = NowPlaying {
            song_id: "a".to_string(),
            listeners: 3,
            is_live: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["songId"], "a");
        assert_eq!(value["isLive"], false);
    }
}
