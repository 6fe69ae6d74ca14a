pub mod report;
pub mod resolver;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{self, Config};
use crate::error::AppError;
use crate::hook::trigger::matches;
use crate::hook::{evaluate, Connector, ConnectorRegistry};
use crate::metrics;
use crate::result::Result;
use crate::station::{validate_pair, ConnectorConfig, NowPlayingSnapshot, Station};

pub use report::{DispatchReport, Status, SubscriptionOutcome};
pub use resolver::{
    resolve, resolve_with_exclusions, ExclusionReason, Excluded, Origin, Subscription,
};

/// Routes now-playing changes to every subscribed connector of a station.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: ConnectorRegistry,
    config: config::Dispatch,
}

impl Dispatcher {
    pub fn new(registry: ConnectorRegistry, config: config::Dispatch) -> Self {
        Self { registry, config }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(
            ConnectorRegistry::from_config(cfg)?,
            cfg.dispatch.clone(),
        ))
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    pub async fn dispatch(
        &self,
        station: &Station,
        old: &NowPlayingSnapshot,
        new: &NowPlayingSnapshot,
    ) -> Result<DispatchReport> {
        self.dispatch_with_cancel(station, old, new, CancellationToken::new())
            .await
    }

    /// Like [`Dispatcher::dispatch`], abandoning in-flight invocations once
    /// `cancel` fires. The returned report is then marked partial.
    pub async fn dispatch_with_cancel(
        &self,
        station: &Station,
        old: &NowPlayingSnapshot,
        new: &NowPlayingSnapshot,
        cancel: CancellationToken,
    ) -> Result<DispatchReport> {
        if self.config.testing_mode {
            debug!(station = station.id, "in testing mode; no webhooks dispatched");
            metrics::DISPATCH_BYPASSED.inc();
            return Ok(DispatchReport::bypassed(&station.id));
        }

        validate_pair(station, old, new)?;
        metrics::DISPATCH.inc();

        let resolution = resolve_with_exclusions(station);
        let fired = evaluate(old, new);
        for trigger in fired.iter() {
            metrics::TRIGGER.with_label_values(&[trigger.as_str()]).inc();
        }
        debug!(station = station.id, triggers = ?fired, "triggering events");

        let mut report = DispatchReport {
            station: station.id.clone(),
            triggers: fired.clone(),
            outcomes: Vec::with_capacity(resolution.subscriptions.len()),
            excluded: resolution.excluded,
            bypassed: false,
            partial: false,
        };

        let shared_station = Arc::new(station.clone());
        let snapshot = Arc::new(new.clone());
        let semaphore = Arc::new(Semaphore::new(
            self.config.max_concurrency.clamp(1, Semaphore::MAX_PERMITS),
        ));
        let mut tasks = JoinSet::new();

        for (index, subscription) in resolution.subscriptions.into_iter().enumerate() {
            let Subscription {
                r#type,
                triggers,
                config,
                origin,
            } = subscription;

            let status = match self.registry.get(&r#type) {
                None => {
                    let err = AppError::unknown_connector_type(&r#type);
                    warn!(station = station.id, %err, "skipping subscription");
                    Status::SkippedUnknownConnector
                }
                Some(_) if !matches(&triggers, &fired) => Status::SkippedNotMatched,
                // in-process channel is delivered before any external connector starts
                Some(connector) if origin == Origin::Local => {
                    let (_, status) = invoke(
                        index,
                        connector,
                        shared_station.clone(),
                        snapshot.clone(),
                        config,
                        semaphore.clone(),
                        self.config.invoke_timeout(),
                    )
                    .await;
                    status
                }
                Some(connector) => {
                    debug!(station = station.id, connector = r#type, "dispatching connector");
                    tasks.spawn(invoke(
                        index,
                        connector,
                        shared_station.clone(),
                        snapshot.clone(),
                        config,
                        semaphore.clone(),
                        self.config.invoke_timeout(),
                    ));
                    // replaced once the invocation completes
                    Status::Abandoned
                }
            };

            report.outcomes.push(SubscriptionOutcome {
                r#type,
                origin,
                status,
            });
        }

        let deadline = self.config.dispatch_timeout().map(|d| Instant::now() + d);
        let expired = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        // once interrupted, keep joining so finished invocations keep their status
        let mut interrupted = false;
        while !tasks.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled(), if !interrupted => {
                    warn!(station = station.id, pending = tasks.len(), "dispatch cancelled");
                    report.partial = true;
                    interrupted = true;
                    tasks.abort_all();
                }
                _ = &mut expired, if !interrupted => {
                    warn!(station = station.id, pending = tasks.len(), "dispatch timed out");
                    report.partial = true;
                    interrupted = true;
                    tasks.abort_all();
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok((index, status))) => report.outcomes[index].status = status,
                    Some(Err(err)) if err.is_cancelled() => {}
                    Some(Err(err)) => {
                        error!(station = station.id, ?err, "connector task lost");
                        report.partial = true;
                    }
                    None => break,
                },
            }
        }

        for outcome in report.outcomes.iter() {
            metrics::INVOCATION
                .with_label_values(&[outcome.r#type.as_str(), outcome.status.label()])
                .inc();
            let err = match &outcome.status {
                Status::Failed { cause } => AppError::connector_dispatch_failure(cause),
                Status::TimedOut => AppError::connector_dispatch_failure("timed out"),
                _ => continue,
            };
            warn!(station = station.id, connector = outcome.r#type, %err, "connector failed");
        }
        info!(
            station = station.id,
            triggers = ?report.triggers,
            invoked = report.invocations().count(),
            skipped = report.skipped().count(),
            failed = report.failures().count(),
            partial = report.partial,
            "dispatch finished"
        );

        Ok(report)
    }
}

async fn invoke(
    index: usize,
    connector: Arc<dyn Connector>,
    station: Arc<Station>,
    snapshot: Arc<NowPlayingSnapshot>,
    config: ConnectorConfig,
    semaphore: Arc<Semaphore>,
    timeout: std::time::Duration,
) -> (usize, Status) {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return (index, Status::Abandoned),
    };

    let call = AssertUnwindSafe(connector.dispatch(&station, &snapshot, &config)).catch_unwind();
    let status = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(Ok(()))) => Status::Delivered,
        Ok(Ok(Err(err))) => Status::Failed {
            cause: err.to_string(),
        },
        Ok(Err(_)) => Status::Failed {
            cause: "connector panicked".to_string(),
        },
        Err(_) => Status::TimedOut,
    };
    (index, status)
}
