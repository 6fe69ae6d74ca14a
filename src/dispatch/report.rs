use std::collections::BTreeSet;

use serde::Serialize;

use super::resolver::{Excluded, Origin};
use crate::hook::TriggerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Delivered,
    Failed { cause: String },
    TimedOut,
    /// The call was cancelled or hit its deadline before this invocation finished.
    Abandoned,
    SkippedUnknownConnector,
    SkippedNotMatched,
}

impl Status {
    /// Whether the connector was (or was about to be) invoked.
    pub fn is_invocation(&self) -> bool {
        matches!(
            self,
            Status::Delivered | Status::Failed { .. } | Status::TimedOut | Status::Abandoned
        )
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Status::SkippedUnknownConnector | Status::SkippedNotMatched
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Delivered => "delivered",
            Status::Failed { .. } => "failed",
            Status::TimedOut => "timed_out",
            Status::Abandoned => "abandoned",
            Status::SkippedUnknownConnector => "skipped_unknown_connector",
            Status::SkippedNotMatched => "skipped_not_matched",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionOutcome {
    pub r#type: String,
    pub origin: Origin,
    #[serde(flatten)]
    pub status: Status,
}

/// Result of one dispatch call. `outcomes` follows resolved subscription order,
/// so the local channel is always first unless the call was bypassed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub station: String,
    pub triggers: BTreeSet<TriggerId>,
    pub outcomes: Vec<SubscriptionOutcome>,
    pub excluded: Vec<Excluded>,
    /// Testing mode: nothing was evaluated or delivered.
    pub bypassed: bool,
    /// Cancelled or timed out as a whole; `Abandoned` entries never completed.
    pub partial: bool,
}

impl DispatchReport {
    pub fn bypassed<T: ToString>(station: T) -> Self {
        Self {
            station: station.to_string(),
            bypassed: true,
            ..Default::default()
        }
    }

    pub fn invocations(&self) -> impl Iterator<Item = &SubscriptionOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_invocation())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SubscriptionOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_skipped())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SubscriptionOutcome> {
        self.outcomes.iter().filter(|o| {
            matches!(
                o.status,
                Status::Failed { .. } | Status::TimedOut | Status::Abandoned
            )
        })
    }

    pub fn is_success(&self) -> bool {
        !self.partial && self.failures().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: Status) -> SubscriptionOutcome {
        SubscriptionOutcome {
            r#type: "generic".to_string(),
            origin: Origin::Webhook {
                index: 0,
                name: None,
            },
            status,
        }
    }

    #[test]
    fn test_report_partitions() {
        let report = DispatchReport {
            station: "radio".to_string(),
            outcomes: vec![
                outcome(Status::Delivered),
                outcome(Status::SkippedNotMatched),
                outcome(Status::Failed {
                    cause: "boom".to_string(),
                }),
                outcome(Status::SkippedUnknownConnector),
            ],
            ..Default::default()
        };
        assert_eq!(report.invocations().count(), 2);
        assert_eq!(report.skipped().count(), 2);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_report_serialize() {
        let value = serde_json::to_value(outcome(Status::Failed {
            cause: "boom".to_string(),
        }))
        .unwrap();
        assert_eq!(value["type"], "generic");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["cause"], "boom");
        assert_eq!(value["origin"]["kind"], "webhook");
    }

    #[test]
    fn test_bypassed_report() {
        let report = DispatchReport::bypassed("radio");
        assert!(report.bypassed);
        assert!(report.outcomes.is_empty());
        assert!(report.triggers.is_empty());
        assert!(report.is_success());
    }
}
