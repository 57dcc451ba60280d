//! Object upload service adapters
//!
//! `HttpObjectStore` talks to the upload service; `DryRunStore` stands in for
//! it when planning a deployment and never touches the network.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::domain::{Signer, Tag};
use crate::error::UploadError;
use crate::infrastructure::auth::sign_request;

pub const HEADER_TAGS: &str = "x-tags";
pub const DRY_RUN_PREFIX: &str = "fake-";

/// Content-addressed object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` and return its object id
    async fn upload(&self, data: Vec<u8>, tags: &[Tag], signer: &Signer)
        -> Result<String, UploadError>;

    /// Whether uploads reach the network
    fn is_dry_run(&self) -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
struct UploadReceipt {
    id: String,
}

/// Client for the HTTP upload service
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
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
impl ObjectStore for HttpObjectStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        tags: &[Tag],
        signer: &Signer,
    ) -> Result<String, UploadError> {
        let url = format!(
            "{}/v1/tx/{}",
            self.base_url,
            signer.network().upload_token()
        );
        let tags_json = serde_json::to_vec(tags)?;

        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(HEADER_TAGS, URL_SAFE_NO_PAD.encode(&tags_json));
        let request = sign_request(request, signer, &[&data, &tags_json])?;

        debug!("POST {} ({} bytes)", url, data.len());
        let response = request.body(data).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: UploadReceipt = response.json().await?;
        Ok(receipt.id)
    }
}

/// Synthesizes ids without any network call
#[derive(Debug, Default)]
pub struct DryRunStore {
    uploads: AtomicUsize,
}

impl DryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploads simulated so far
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn fake_id() -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!("{}{}", DRY_RUN_PREFIX, &random[..9])
    }
}

#[async_trait]
impl ObjectStore for DryRunStore {
    async fn upload(
        &self,
        _data: Vec<u8>,
        _tags: &[Tag],
        _signer: &Signer,
    ) -> Result<String, UploadError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(Self::fake_id())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
