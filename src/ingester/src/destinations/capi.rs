use async_trait::async_trait;
use common::config;
use common::error::CommonError;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::destination::Destination;
use crate::error::IngesterError;
use crate::error::Result;
use crate::Payload;

const NAME: &str = "capi";

/// Conversions API over HTTPS. Any 2xx is a success, everything else is an error.
pub struct Capi {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl Capi {
    pub fn try_new(cfg: &config::Capi) -> Result<Self> {
        let endpoint = cfg.events_url()?;
        let access_token = cfg
            .access_token
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CommonError::InvalidConfig("access token is not set".to_string()))?;
        let client = Client::builder().timeout(cfg.timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            access_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Destination for Capi {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn send(&self, payload: &Payload) -> Result<()> {
        debug!(
            "sending {} event {:?} to {}",
            payload.event_name(),
            payload.event_id(),
            self.endpoint
        );
        let resp = self
            .client
            .post(self.endpoint.clone())
            .query(&[("access_token", self.access_token.as_str())])
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IngesterError::Status {
                destination: NAME,
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
