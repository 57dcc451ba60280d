//! Name record updates
//!
//! Points a friendly name at a freshly published manifest. Failures are
//! reported as an outcome, never as an error: the content is already stored.

use tracing::{info, warn};

use crate::domain::{NameRecordOutcome, Signer, Tag};
use crate::infrastructure::{NameRegistry, RecordUpdate};

pub const RECORD_TTL_SECONDS: u64 = 3600;
pub const UNKNOWN_COMMIT: &str = "unknown";

/// Provenance tags attached to every record update
pub fn provenance_tags(commit_hash: Option<&str>) -> Vec<Tag> {
    vec![
        Tag::new("GIT-HASH", commit_hash.unwrap_or(UNKNOWN_COMMIT)),
        Tag::app_name(),
        Tag::new("anchor", chrono::Utc::now().to_rfc3339()),
    ]
}

pub struct NameRecordUpdater<'a> {
    registry: &'a dyn NameRegistry,
    signer: &'a Signer,
    commit_hash: Option<String>,
}

impl<'a> NameRecordUpdater<'a> {
    pub fn new(registry: &'a dyn NameRegistry, signer: &'a Signer) -> Self {
        Self {
            registry,
            signer,
            commit_hash: None,
        }
    }

    /// Builder: commit recorded in the `GIT-HASH` tag
    pub fn with_commit(mut self, commit_hash: Option<String>) -> Self {
        self.commit_hash = commit_hash;
        self
    }

    /// Point `sub_name` at `manifest_id`. `extra_tags` follow the provenance tags.
    pub async fn publish(
        &self,
        process_id: &str,
        sub_name: &str,
        manifest_id: &str,
        extra_tags: Vec<Tag>,
    ) -> NameRecordOutcome {
        let mut tags = provenance_tags(self.commit_hash.as_deref());
        tags.extend(extra_tags);

        let update = RecordUpdate {
            undername: sub_name.to_string(),
            transaction_id: manifest_id.to_string(),
            ttl_seconds: RECORD_TTL_SECONDS,
            tags,
        };

        match self.registry.set_record(process_id, &update, self.signer).await {
            Ok(()) => {
                info!(
                    "🏷️  Name record '{}' on {} now points to {}",
                    sub_name, process_id, manifest_id
                );
                NameRecordOutcome::Updated
            }
            Err(e) => {
                warn!("⚠️  Name record update failed (non-fatal): {}", e);
                NameRecordOutcome::Failed(e.to_string())
            }
        }
    }
}
