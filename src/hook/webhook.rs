use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::convert::event_body;
use super::Connector;
use crate::error::AppError;
use crate::result::Result;
use crate::station::{ConnectorConfig, NowPlayingSnapshot, Station};

/// Per-webhook settings of the generic connector.
#[derive(Debug, Clone, Deserialize)]
struct WebHookConfig {
    webhook_url: String,
    #[serde(default)]
    basic_auth_username: Option<String>,
    #[serde(default)]
    basic_auth_password: Option<String>,
    /// Seconds; overrides the client default when set.
    #[serde(default)]
    timeout: Option<u64>,
}

/// POSTs the now-playing state as JSON to `webhook_url`.
#[derive(Clone, Debug)]
pub struct WebHook {
    client: Client,
}

impl WebHook {
    pub fn new(cfg: &crate::config::Webhook) -> Result<Self> {
        Ok(WebHook {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_millis(cfg.connect_timeout))
                .timeout(Duration::from_millis(cfg.timeout))
                .build()?,
        })
    }
}

#[async_trait]
impl Connector for WebHook {
    async fn dispatch(
        &self,
        station: &Station,
        snapshot: &NowPlayingSnapshot,
        config: &ConnectorConfig,
    ) -> Result<()> {
        let cfg: WebHookConfig = serde_json::from_value(Value::Object(config.clone()))
            .map_err(|e| AppError::throw(format!("webhook config error: {e}")))?;
        if cfg.webhook_url.trim().is_empty() {
            return Err(AppError::throw("webhook config error: empty webhook_url"));
        }

        let req_body = serde_json::to_string(&event_body(station, snapshot))?;
        let mut request = self
            .client
            .post(cfg.webhook_url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(req_body.clone());
        if let Some(username) = cfg.basic_auth_username.filter(|u| !u.is_empty()) {
            request = request.basic_auth(username, cfg.basic_auth_password);
        }
        if let Some(timeout) = cfg.timeout.filter(|t| *t > 0) {
            request = request.timeout(Duration::from_secs(timeout));
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let success = status.is_success();
                let res_body = response.text().await?;
                if success {
                    debug!(
                        url = cfg.webhook_url,
                        ?status,
                        req_body,
                        res_body,
                        "event webhook success"
                    );
                    Ok(())
                } else {
                    warn!(
                        url = cfg.webhook_url,
                        ?status,
                        req_body,
                        res_body,
                        "event webhook error"
                    );
                    Err(AppError::throw(format!("{status}: {res_body}")))
                }
            }
            Err(err) => {
                warn!(url = cfg.webhook_url, req_body, ?err, "event webhook error");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url() {
        let webhook = WebHook::new(&Default::default()).unwrap();
        let err = webhook
            .dispatch(
                &Station::default(),
                &NowPlayingSnapshot::default(),
                &Default::default(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("webhook_url"));
    }

    #[tokio::test]
    async fn test_empty_url() {
        let webhook = WebHook::new(&Default::default()).unwrap();
        let mut config = ConnectorConfig::new();
        config.insert("webhook_url".to_string(), Value::from(" "));
        let err = webhook
            .dispatch(&Station::default(), &NowPlayingSnapshot::default(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Throw(_)));
    }
}
