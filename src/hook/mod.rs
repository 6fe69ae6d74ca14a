pub mod convert;
pub mod local;
pub mod registry;
pub mod trigger;
pub mod webhook;

use async_trait::async_trait;

use std::fmt::Debug;

use crate::result::Result;
use crate::station::{ConnectorConfig, NowPlayingSnapshot, Station};

pub use registry::ConnectorRegistry;
pub use trigger::{evaluate, list_triggers, TriggerId};

/// Connector type key of the built-in in-process channel.
pub const LOCAL: &str = "local";
/// Connector type key of the HTTP JSON webhook.
pub const GENERIC: &str = "generic";

/// Published on the local channel for every dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct NowPlayingEvent {
    pub station: String,
    pub snapshot: NowPlayingSnapshot,
}

/// A delivery mechanism for now-playing updates.
///
/// Implementations receive the station, the new snapshot and the
/// subscription's config verbatim; they own their wire protocol.
#[async_trait]
pub trait Connector: Debug + Send + Sync {
    async fn dispatch(
        &self,
        station: &Station,
        snapshot: &NowPlayingSnapshot,
        config: &ConnectorConfig,
    ) -> Result<()>;
}
