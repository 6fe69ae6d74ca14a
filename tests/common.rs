#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use stationhook::config;
use stationhook::hook::NowPlayingEvent;
use stationhook::hook::local::LocalConnector;
use stationhook::result::Result;
use stationhook::station::ConnectorConfig;
use stationhook::{AppError, Connector, ConnectorRegistry, Dispatcher, NowPlayingSnapshot, Station};

#[derive(Clone, Debug)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
    Sleep(Duration),
    Panic,
    /// Cancels the token, then succeeds.
    Cancel(CancellationToken),
    /// Succeeds only if the local channel already carries this update.
    AfterLocal(Arc<Mutex<broadcast::Receiver<NowPlayingEvent>>>),
}

/// Connector that records every call it receives.
#[derive(Clone, Debug)]
pub struct Recorder {
    pub name: &'static str,
    pub behavior: Behavior,
    pub calls: Arc<Mutex<Vec<(String, ConnectorConfig)>>>,
}

impl Recorder {
    pub fn new(name: &'static str, behavior: Behavior) -> Self {
        Self {
            name,
            behavior,
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, ConnectorConfig)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for Recorder {
    async fn dispatch(
        &self,
        station: &Station,
        snapshot: &NowPlayingSnapshot,
        config: &ConnectorConfig,
    ) -> Result<()> {
        assert_eq!(station.id, snapshot.station_id);
        self.calls
            .lock()
            .unwrap()
            .push((snapshot.song_id.clone(), config.clone()));
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(cause) => Err(AppError::throw(cause)),
            Behavior::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(())
            }
            Behavior::Panic => panic!("{} exploded", self.name),
            Behavior::Cancel(token) => {
                token.cancel();
                Ok(())
            }
            Behavior::AfterLocal(local) => match local.lock().unwrap().try_recv() {
                Ok(event) if event.snapshot == *snapshot => Ok(()),
                _ => Err(AppError::throw("local channel not delivered yet")),
            },
        }
    }
}

pub fn dispatch_config() -> config::Dispatch {
    config::Dispatch {
        testing_mode: false,
        invoke_timeout: 1_000,
        dispatch_timeout: 0,
        max_concurrency: 8,
    }
}

pub fn dispatcher(connectors: &[(&str, Recorder)], cfg: config::Dispatch) -> Dispatcher {
    let mut registry = ConnectorRegistry::new(LocalConnector::new(8));
    for (r#type, connector) in connectors {
        registry = registry.register(*r#type, Arc::new(connector.clone()));
    }
    Dispatcher::new(registry, cfg)
}

pub fn snapshot(song: &str, listeners: u64, live: bool) -> NowPlayingSnapshot {
    NowPlayingSnapshot::new("radio", song, listeners, live)
}

pub fn station(webhooks: Vec<stationhook::StationWebhook>) -> Station {
    Station {
        id: "radio".to_string(),
        name: Some("Radio".to_string()),
        webhooks,
    }
}

pub fn url_config(url: &str) -> ConnectorConfig {
    let mut config = ConnectorConfig::new();
    config.insert("webhook_url".to_string(), Value::from(url));
    config
}
