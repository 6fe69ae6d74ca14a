use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use super::{Connector, NowPlayingEvent};
use crate::error::AppError;
use crate::new_broadcast_channel;
use crate::result::Result;
use crate::station::{ConnectorConfig, NowPlayingSnapshot, Station};

/// In-process real-time channel. Always registered.
#[derive(Clone, Debug)]
pub struct LocalConnector {
    sender: broadcast::Sender<NowPlayingEvent>,
}

impl LocalConnector {
    pub fn new(capacity: usize) -> Self {
        LocalConnector {
            sender: new_broadcast_channel!(capacity.max(1)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NowPlayingEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl Connector for LocalConnector {
    async fn dispatch(
        &self,
        station: &Station,
        snapshot: &NowPlayingSnapshot,
        _config: &ConnectorConfig,
    ) -> Result<()> {
        let event = NowPlayingEvent {
            station: station.id.clone(),
            snapshot: snapshot.clone(),
        };
        let receivers = self
            .sender
            .send(event)
            .map_err(|_| AppError::throw("local channel closed"))?;
        trace!(station = station.id, receivers, "local event published");
        Ok(())
    }
}
