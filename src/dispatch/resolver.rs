use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::hook::{TriggerId, LOCAL};
use crate::station::{ConnectorConfig, Station};

/// Where a subscription came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    Local,
    /// Position of the webhook in the station's stored list.
    Webhook {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

/// An effective binding of a connector to a trigger set for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub r#type: String,
    pub triggers: BTreeSet<TriggerId>,
    pub config: ConnectorConfig,
    pub origin: Origin,
}

impl Subscription {
    fn local() -> Self {
        Self {
            r#type: LOCAL.to_string(),
            triggers: BTreeSet::from([TriggerId::All]),
            config: ConnectorConfig::new(),
            origin: Origin::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Disabled,
    /// The webhook lists triggers, none of which are known.
    UnrecognizedTriggers,
}

/// A station webhook that did not become a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Excluded {
    pub r#type: String,
    pub origin: Origin,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub subscriptions: Vec<Subscription>,
    pub excluded: Vec<Excluded>,
}

/// Effective subscriptions for `station`: the local channel first, then every
/// enabled webhook in stored order.
pub fn resolve(station: &Station) -> Vec<Subscription> {
    resolve_with_exclusions(station).subscriptions
}

pub fn resolve_with_exclusions(station: &Station) -> Resolution {
    let mut resolution = Resolution {
        subscriptions: vec![Subscription::local()],
        excluded: vec![],
    };

    for (index, webhook) in station.webhooks.iter().enumerate() {
        let origin = Origin::Webhook {
            index,
            name: webhook.name.clone(),
        };

        if !webhook.enabled {
            resolution.excluded.push(Excluded {
                r#type: webhook.r#type.clone(),
                origin,
                reason: ExclusionReason::Disabled,
            });
            continue;
        }

        let mut triggers = BTreeSet::new();
        for name in webhook.triggers.iter() {
            match name.parse::<TriggerId>() {
                Ok(trigger) => {
                    triggers.insert(trigger);
                }
                Err(err) => warn!(station = station.id, index, err, "ignoring webhook trigger"),
            }
        }

        if triggers.is_empty() {
            if !webhook.triggers.is_empty() {
                warn!(
                    station = station.id,
                    index,
                    triggers = ?webhook.triggers,
                    "webhook has no recognized triggers; skipping"
                );
                resolution.excluded.push(Excluded {
                    r#type: webhook.r#type.clone(),
                    origin,
                    reason: ExclusionReason::UnrecognizedTriggers,
                });
                continue;
            }
            triggers.insert(TriggerId::All);
        }

        resolution.subscriptions.push(Subscription {
            r#type: webhook.r#type.clone(),
            triggers,
            config: webhook.config.clone(),
            origin,
        });
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationWebhook;

    fn station(webhooks: Vec<StationWebhook>) -> Station {
        Station {
            id: "radio".to_string(),
            name: None,
            webhooks,
        }
    }

    #[test]
    fn test_local_first_without_webhooks() {
        let subs = resolve(&station(vec![]));
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].r#type, LOCAL);
        assert_eq!(subs[0].origin, Origin::Local);
        assert_eq!(subs[0].triggers, BTreeSet::from([TriggerId::All]));
        assert!(subs[0].config.is_empty());
    }

    #[test]
    fn test_local_first_with_webhooks() {
        let subs = resolve(&station(vec![
            StationWebhook::new("generic"),
            StationWebhook::new(LOCAL),
        ]));
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].origin, Origin::Local);
        assert_eq!(
            subs[2].origin,
            Origin::Webhook {
                index: 1,
                name: None
            }
        );
    }

    #[test]
    fn test_disabled_excluded() {
        let resolution = resolve_with_exclusions(&station(vec![
            StationWebhook::new("slack").triggers(["song_changed"]),
            StationWebhook::new("discord").disabled(),
        ]));
        let types: Vec<&str> = resolution
            .subscriptions
            .iter()
            .map(|s| s.r#type.as_str())
            .collect();
        assert_eq!(types, vec![LOCAL, "slack"]);
        assert_eq!(resolution.excluded.len(), 1);
        assert_eq!(resolution.excluded[0].r#type, "discord");
        assert_eq!(resolution.excluded[0].reason, ExclusionReason::Disabled);
    }

    #[test]
    fn test_empty_triggers_normalized() {
        let subs = resolve(&station(vec![StationWebhook::new("generic")]));
        assert_eq!(subs[1].triggers, BTreeSet::from([TriggerId::All]));
    }

    #[test]
    fn test_no_dedup_by_type() {
        let mut a = ConnectorConfig::new();
        a.insert("webhook_url".to_string(), "http://a".into());
        let mut b = ConnectorConfig::new();
        b.insert("webhook_url".to_string(), "http://b".into());
        let subs = resolve(&station(vec![
            StationWebhook::new("generic").config(a.clone()),
            StationWebhook::new("generic").config(b.clone()),
        ]));
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[1].config, a);
        assert_eq!(subs[2].config, b);
    }

    #[test]
    fn test_unknown_trigger_names() {
        let resolution = resolve_with_exclusions(&station(vec![
            StationWebhook::new("generic").triggers(["song_changed", "bogus"]),
            StationWebhook::new("generic").triggers(["bogus"]),
        ]));
        assert_eq!(resolution.subscriptions.len(), 2);
        assert_eq!(
            resolution.subscriptions[1].triggers,
            BTreeSet::from([TriggerId::SongChanged])
        );
        assert_eq!(resolution.excluded.len(), 1);
        assert_eq!(
            resolution.excluded[0].reason,
            ExclusionReason::UnrecognizedTriggers
        );
    }
}
