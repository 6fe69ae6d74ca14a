use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::local::LocalConnector;
use super::webhook::WebHook;
use super::{Connector, GENERIC, LOCAL};
use crate::config::Config;
use crate::result::Result;

/// Connector instances keyed by connector type. Built once at startup.
#[derive(Clone, Debug)]
pub struct ConnectorRegistry {
    local: LocalConnector,
    connectors: HashMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    /// Registry holding only the local connector.
    pub fn new(local: LocalConnector) -> Self {
        let mut connectors: HashMap<String, Arc<dyn Connector>> = HashMap::new();
        connectors.insert(LOCAL.to_string(), Arc::new(local.clone()));
        Self { local, connectors }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let mut registry = Self::new(LocalConnector::new(cfg.local.capacity));
        if cfg.connectors.is_disabled(GENERIC) {
            warn!(connector = GENERIC, "connector disabled by config");
        } else {
            registry = registry.register(GENERIC, Arc::new(WebHook::new(&cfg.webhook)?));
        }
        info!(connectors = ?registry.types(), "connector registry ready");
        Ok(registry)
    }

    /// Adds or replaces a connector. The local connector cannot be replaced.
    pub fn register<T: ToString>(mut self, r#type: T, connector: Arc<dyn Connector>) -> Self {
        let r#type = r#type.to_string();
        if r#type == LOCAL {
            warn!("refusing to replace the local connector");
            return self;
        }
        self.connectors.insert(r#type, connector);
        self
    }

    pub fn get(&self, r#type: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(r#type).cloned()
    }

    pub fn local(&self) -> &LocalConnector {
        &self.local
    }

    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.connectors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}
