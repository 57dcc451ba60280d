//! Project configuration file (`.perma-deploy/config.json`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::Network;
use crate::error::DeployError;

/// Directory holding the project config, relative to the project root
pub const CONFIG_DIR: &str = ".perma-deploy";
pub const CONFIG_FILE: &str = "config.json";

pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// On-disk project configuration, written by `init` and read by `deploy`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub project_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_folder: Option<String>,

    /// Wallet file used when DEPLOY_KEY is not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arns_name: Option<String>,

    #[serde(default, alias = "undername", skip_serializing_if = "Option::is_none")]
    pub sub_name: Option<String>,

    #[serde(default, alias = "antProcess", skip_serializing_if = "Option::is_none")]
    pub registry_process_id: Option<String>,

    #[serde(default)]
    pub auto_deploy: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

impl ProjectConfig {
    /// Load the project config, failing with `ConfigMissing` when absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DeployError::ConfigMissing {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}
