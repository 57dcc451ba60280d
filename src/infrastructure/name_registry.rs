//! Name registry adapter
//!
//! Sets the target of a name record hosted by a registry process. Controller
//! or owner rights of the signer are only checked remotely.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::{Signer, Tag};
use crate::error::RegistryError;
use crate::infrastructure::auth::sign_request;

/// Requested state of a name record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    pub undername: String,
    pub transaction_id: String,
    pub ttl_seconds: u64,
    pub tags: Vec<Tag>,
}

#[async_trait]
pub trait NameRegistry: Send + Sync {
    async fn set_record(
        &self,
        process_id: &str,
        update: &RecordUpdate,
        signer: &Signer,
    ) -> Result<(), RegistryError>;
}

/// Client for the HTTP registry service
pub struct HttpNameRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNameRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("perma-deploy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NameRegistry for HttpNameRegistry {
    async fn set_record(
        &self,
        process_id: &str,
        update: &RecordUpdate,
        signer: &Signer,
    ) -> Result<(), RegistryError> {
        let url = format!("{}/v1/processes/{}/records", self.base_url, process_id);
        let body = serde_json::to_vec(update)?;

        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let request = sign_request(request, signer, &[&body])?;

        debug!("POST {} ({} → {})", url, update.undername, update.transaction_id);
        let response = request.body(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
