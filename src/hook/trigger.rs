use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::station::NowPlayingSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerId {
    All,
    SongChanged,
    ListenerGained,
    ListenerLost,
    LiveConnect,
    LiveDisconnect,
}

impl TriggerId {
    pub const SELECTABLE: [TriggerId; 5] = [
        TriggerId::SongChanged,
        TriggerId::ListenerGained,
        TriggerId::ListenerLost,
        TriggerId::LiveConnect,
        TriggerId::LiveDisconnect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerId::All => "all",
            TriggerId::SongChanged => "song_changed",
            TriggerId::ListenerGained => "listener_gained",
            TriggerId::ListenerLost => "listener_lost",
            TriggerId::LiveConnect => "live_connect",
            TriggerId::LiveDisconnect => "live_disconnect",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TriggerId::All => "Any update of the now playing data",
            TriggerId::SongChanged => "Any time the currently playing song changes",
            TriggerId::ListenerGained => "Any time the listener count increases",
            TriggerId::ListenerLost => "Any time the listener count decreases",
            TriggerId::LiveConnect => "Any time a live streamer/DJ connects to the stream",
            TriggerId::LiveDisconnect => "Any time a live streamer/DJ disconnects from the stream",
        }
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TriggerId::All),
            "song_changed" => Ok(TriggerId::SongChanged),
            "listener_gained" => Ok(TriggerId::ListenerGained),
            "listener_lost" => Ok(TriggerId::ListenerLost),
            "live_connect" => Ok(TriggerId::LiveConnect),
            "live_disconnect" => Ok(TriggerId::LiveDisconnect),
            _ => Err(format!("unknown trigger: {s}")),
        }
    }
}

/// Triggers a webhook can subscribe to, with a human readable description.
/// `all` is implicit and therefore not listed.
pub fn list_triggers() -> BTreeMap<TriggerId, &'static str> {
    TriggerId::SELECTABLE
        .iter()
        .map(|t| (*t, t.description()))
        .collect()
}

/// Triggers fired by the transition from `old` to `new`. Always contains `all`.
pub fn evaluate(old: &NowPlayingSnapshot, new: &NowPlayingSnapshot) -> BTreeSet<TriggerId> {
    let mut fired = BTreeSet::from([TriggerId::All]);

    if old.song_id != new.song_id {
        fired.insert(TriggerId::SongChanged);
    }

    if old.listeners > new.listeners {
        fired.insert(TriggerId::ListenerLost);
    } else if old.listeners < new.listeners {
        fired.insert(TriggerId::ListenerGained);
    }

    match (old.is_live, new.is_live) {
        (false, true) => {
            fired.insert(TriggerId::LiveConnect);
        }
        (true, false) => {
            fired.insert(TriggerId::LiveDisconnect);
        }
        _ => {}
    }

    fired
}

/// Whether a subscription to `subscribed` should receive an update that fired `fired`.
/// An empty subscription set, or one containing `all`, matches anything.
pub fn matches(subscribed: &BTreeSet<TriggerId>, fired: &BTreeSet<TriggerId>) -> bool {
    subscribed.is_empty()
        || subscribed.contains(&TriggerId::All)
        || subscribed.intersection(fired).next().is_some()
}
