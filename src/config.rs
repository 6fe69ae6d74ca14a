use std::{env, fs, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub dispatch: Dispatch,
    #[serde(default)]
    pub local: Local,
    #[serde(default)]
    pub webhook: Webhook,
    #[serde(default)]
    pub connectors: Connectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    /// Skip all deliveries; for non-production environments.
    #[serde(default = "default_testing_mode")]
    pub testing_mode: bool,
    /// Milliseconds allowed for a single connector invocation.
    #[serde(default = "default_invoke_timeout")]
    pub invoke_timeout: u64,
    /// Milliseconds allowed for a whole dispatch call. 0 disables.
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Local {
    #[serde(default = "default_local_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    /// Milliseconds.
    #[serde(default = "default_webhook_connect_timeout")]
    pub connect_timeout: u64,
    /// Milliseconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Connectors {
    /// Connector types left out of the registry. `local` cannot be disabled.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Connectors {
    pub fn is_disabled(&self, r#type: &str) -> bool {
        self.disabled.iter().any(|t| t == r#type)
    }
}

fn default_log_level() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    })
}

fn default_testing_mode() -> bool {
    env::var("APP_TESTING_MODE")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn default_invoke_timeout() -> u64 {
    5_000
}

fn default_dispatch_timeout() -> u64 {
    15_000
}

fn default_max_concurrency() -> usize {
    8
}

fn default_local_capacity() -> usize {
    16
}

fn default_webhook_connect_timeout() -> u64 {
    300
}

fn default_webhook_timeout() -> u64 {
    2_000
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Self {
            testing_mode: default_testing_mode(),
            invoke_timeout: default_invoke_timeout(),
            dispatch_timeout: default_dispatch_timeout(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for Local {
    fn default() -> Self {
        Self {
            capacity: default_local_capacity(),
        }
    }
}

impl Default for Webhook {
    fn default() -> Self {
        Self {
            connect_timeout: default_webhook_connect_timeout(),
            timeout: default_webhook_timeout(),
        }
    }
}

impl Dispatch {
    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_millis(self.invoke_timeout)
    }

    pub fn dispatch_timeout(&self) -> Option<Duration> {
        (self.dispatch_timeout > 0).then(|| Duration::from_millis(self.dispatch_timeout))
    }
}

impl Config {
    pub fn parse(path: Option<String>) -> anyhow::Result<Self> {
        let result = match path {
            Some(path) => {
                fs::read_to_string(&path).with_context(|| format!("read config {path}"))?
            }
            None => fs::read_to_string("stationhook.toml")
                .or(fs::read_to_string("/etc/stationhook/config.toml"))
                .unwrap_or_default(),
        };
        let cfg: Self = toml::from_str(result.as_str()).context("config parse error")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dispatch.invoke_timeout == 0 {
            anyhow::bail!("dispatch.invoke_timeout must be greater than 0");
        }
        if self.dispatch.max_concurrency == 0 {
            anyhow::bail!("dispatch.max_concurrency must be greater than 0");
        }
        if self.dispatch.max_concurrency > tokio::sync::Semaphore::MAX_PERMITS {
            anyhow::bail!(
                "dispatch.max_concurrency must not exceed {}",
                tokio::sync::Semaphore::MAX_PERMITS
            );
        }
        if self.local.capacity == 0 {
            anyhow::bail!("local.capacity must be greater than 0");
        }
        if self.connectors.is_disabled(crate::hook::LOCAL) {
            anyhow::bail!("the local connector cannot be disabled");
        }
        Ok(())
    }
}
