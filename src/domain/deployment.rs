//! Deployment domain types
//!
//! Defines the deployment workflow as a state machine with explicit phases.

use std::time::Duration;

use crate::domain::manifest::ObjectId;

/// Phases of a deployment, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    /// Resolve signer from key material
    Init,
    /// Compare current git branch with the deploy branch
    BranchCheck,
    /// Run the configured build command
    Build,
    /// Upload every file of the deploy folder
    Upload,
    /// Build and upload the path manifest
    Manifest,
    /// Point the name record at the manifest
    NameUpdate,
    Done,
}

impl DeployPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::BranchCheck => "Branch Check",
            Self::Build => "Build",
            Self::Upload => "Upload",
            Self::Manifest => "Manifest",
            Self::NameUpdate => "Name Update",
            Self::Done => "Done",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Init => "🔑",
            Self::BranchCheck => "🌿",
            Self::Build => "🔨",
            Self::Upload => "📤",
            Self::Manifest => "🗺️",
            Self::NameUpdate => "🏷️",
            Self::Done => "✅",
        }
    }
}

/// How a phase ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseStatus {
    Completed,
    /// Finished, but with degradations worth reporting
    Degraded(String),
    Skipped(String),
}

/// Result of a deployment phase execution
#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub phase: DeployPhase,
    pub status: PhaseStatus,
    pub duration: Duration,
}

impl PhaseResult {
    pub fn completed(phase: DeployPhase, duration: Duration) -> Self {
        Self {
            phase,
            status: PhaseStatus::Completed,
            duration,
        }
    }

    pub fn degraded(phase: DeployPhase, duration: Duration, message: impl Into<String>) -> Self {
        Self {
            phase,
            status: PhaseStatus::Degraded(message.into()),
            duration,
        }
    }

    pub fn skipped(phase: DeployPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            status: PhaseStatus::Skipped(message.into()),
            duration: Duration::ZERO,
        }
    }
}

/// Outcome of the manifest upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome {
    Published(String),
    Failed(String),
}

impl ManifestOutcome {
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Published(id) => ObjectId::Stored(id.clone()),
            Self::Failed(_) => ObjectId::Failed,
        }
    }
}

/// Outcome of the name record update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRecordOutcome {
    Updated,
    Failed(String),
    /// No registry process configured, manifest missing, or dry run
    NotAttempted(String),
}

/// Everything a finished deployment reports
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub manifest_id: ObjectId,
    pub manifest: ManifestOutcome,
    pub name_record: NameRecordOutcome,
    pub file_count: usize,
    pub failed_files: Vec<String>,
    pub view_url: String,
    pub friendly_url: Option<String>,
    pub dry_run: bool,
    pub phases: Vec<PhaseResult>,
}

impl DeploymentReport {
    /// Whether every step succeeded without degradation
    pub fn is_clean(&self) -> bool {
        self.failed_files.is_empty()
            && matches!(self.manifest, ManifestOutcome::Published(_))
            && !matches!(self.name_record, NameRecordOutcome::Failed(_))
    }
}

/// Terminal state of a deployment run. Fatal errors are returned as `Err`.
#[derive(Debug, Clone)]
pub enum DeployOutcome {
    /// Current branch is not the deploy branch
    Skipped { current: String, expected: String },
    Done(DeploymentReport),
}

/// Friendly URL for a name record. `@` is the root record.
pub fn friendly_url(gateway: &str, arns_name: &str, sub_name: &str) -> String {
    if sub_name.is_empty() || sub_name == "@" {
        format!("https://{}.{}", arns_name, gateway)
    } else {
        format!("https://{}_{}.{}", sub_name, arns_name, gateway)
    }
}

pub fn view_url(gateway: &str, id: &ObjectId) -> String {
    format!("https://{}/{}", gateway, id)
}
