//! # Deployment Configuration
//!
//! One resolution step produces the immutable [`DeploymentConfig`] for a run:
//! CLI flags → project config file → defaults.
//!
//! ## Sources
//!
//! 1. **Flags / environment** (`perma-deploy deploy --...`, `DEPLOY_KEY`)
//! 2. **Project file** (`.perma-deploy/config.json`, written by `perma-deploy init`)
//! 3. **Defaults** (constants below)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let file = ProjectConfig::load(&default_config_path(&root))?;
//! let config = DeploymentConfig::resolve(file, overrides, &root)?;
//! println!("Deploying {}", config.deploy_folder.display());
//! ```

mod project;

pub use project::{default_config_path, ProjectConfig};

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::Network;
use crate::error::DeployError;

pub const DEFAULT_BUILD_COMMAND: &str = "npm run build";
pub const DEFAULT_DEPLOY_BRANCH: &str = "main";
pub const DEFAULT_DEPLOY_FOLDER: &str = "dist";
pub const DEFAULT_GATEWAY: &str = "arweave.net";
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.ardrive.io";
pub const DEFAULT_REGISTRY_URL: &str = "https://ant.ar.io";
/// Root name record
pub const ROOT_SUB_NAME: &str = "@";
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 1;

/// Secret key material. Never printed.
#[derive(Clone)]
pub struct KeySecret(String);

impl KeySecret {
    pub fn new(material: impl Into<String>) -> Self {
        Self(material.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeySecret([REDACTED])")
    }
}

/// Values given on the command line (or through their env vars)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub deploy_folder: Option<String>,
    pub dry_run: bool,
    pub registry_process_id: Option<String>,
    pub sub_name: Option<String>,
    pub network: Option<Network>,
    pub key_material: Option<KeySecret>,
    pub gateway: Option<String>,
    pub upload_url: Option<String>,
    pub registry_url: Option<String>,
    pub upload_timeout: Option<Duration>,
    pub upload_concurrency: Option<usize>,
}

/// Resolved configuration, immutable for the run
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub project_name: String,
    pub build_command: String,
    pub deploy_branch: String,
    pub deploy_folder: PathBuf,
    pub key_material: KeySecret,
    pub network: Option<Network>,
    pub registry_process_id: Option<String>,
    pub sub_name: String,
    pub arns_name: Option<String>,
    pub gateway: String,
    pub upload_url: String,
    pub registry_url: String,
    pub upload_timeout: Duration,
    pub upload_concurrency: usize,
    pub dry_run: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl DeploymentConfig {
    /// Merge flags over the project file over defaults
    pub fn resolve(
        file: ProjectConfig,
        overrides: ConfigOverrides,
        project_root: &Path,
    ) -> Result<Self> {
        let key_material = match overrides.key_material {
            Some(secret) if !secret.expose().trim().is_empty() => secret,
            _ => load_key_file(file.wallet_path.as_deref())?,
        };

        let deploy_folder = non_empty(overrides.deploy_folder)
            .or(non_empty(file.deploy_folder))
            .unwrap_or_else(|| DEFAULT_DEPLOY_FOLDER.to_string());

        let project_name = if file.project_name.is_empty() {
            project_root
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("site")
                .to_string()
        } else {
            file.project_name
        };

        Ok(Self {
            project_name,
            // An explicitly empty build command means "nothing to build"
            build_command: file
                .build_command
                .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string()),
            deploy_branch: non_empty(file.deploy_branch)
                .unwrap_or_else(|| DEFAULT_DEPLOY_BRANCH.to_string()),
            deploy_folder: project_root.join(deploy_folder),
            key_material,
            network: overrides.network.or(file.network),
            registry_process_id: non_empty(overrides.registry_process_id)
                .or(non_empty(file.registry_process_id)),
            sub_name: non_empty(overrides.sub_name)
                .or(non_empty(file.sub_name))
                .unwrap_or_else(|| ROOT_SUB_NAME.to_string()),
            arns_name: non_empty(file.arns_name),
            gateway: non_empty(overrides.gateway)
                .or(non_empty(file.gateway))
                .unwrap_or_else(|| DEFAULT_GATEWAY.to_string()),
            upload_url: non_empty(overrides.upload_url)
                .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string()),
            registry_url: non_empty(overrides.registry_url)
                .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
            upload_timeout: overrides.upload_timeout.unwrap_or(DEFAULT_UPLOAD_TIMEOUT),
            upload_concurrency: overrides
                .upload_concurrency
                .unwrap_or(DEFAULT_UPLOAD_CONCURRENCY)
                .max(1),
            dry_run: overrides.dry_run,
        })
    }
}

/// Read key material from the wallet file recorded by `init`
fn load_key_file(path: Option<&Path>) -> Result<KeySecret> {
    let path = path.ok_or(DeployError::KeyMissing)?;
    if !path.exists() {
        return Err(DeployError::KeyMissing)
            .with_context(|| format!("Wallet file {} does not exist", path.display()));
    }
    let material = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read wallet file {}", path.display()))?;
    Ok(KeySecret::new(material))
}
