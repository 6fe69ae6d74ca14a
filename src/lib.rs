pub mod config;
pub mod dispatch;
pub mod error;
pub mod hook;
pub mod metrics;
pub mod result;
pub mod station;

mod r#macro;

pub use dispatch::{DispatchReport, Dispatcher};
pub use error::AppError;
pub use hook::{list_triggers, Connector, ConnectorRegistry, TriggerId};
pub use station::{NowPlayingSnapshot, Station, StationWebhook};
