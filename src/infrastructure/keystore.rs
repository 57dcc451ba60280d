//! Per-project wallet files under `~/.permaweb/<project>/wallet.json`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const KEYSTORE_DIR: &str = ".permaweb";
pub const WALLET_FILE: &str = "wallet.json";

pub struct KeyStore {
    root: PathBuf,
}

impl KeyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Key store in the current user's home directory
    pub fn in_home() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        Ok(Self::new(home.join(KEYSTORE_DIR)))
    }

    /// Wallet location for a project. The name must stay a single directory
    /// below the key store root.
    pub fn wallet_path(&self, project_name: &str) -> Result<PathBuf> {
        validate_project_name(project_name)?;
        Ok(self.root.join(project_name).join(WALLET_FILE))
    }

    /// Write key material for a project, readable by the owner only
    pub fn save(&self, project_name: &str, material: &str) -> Result<PathBuf> {
        let path = self.wallet_path(project_name)?;
        let dir = path
            .parent()
            .context("Wallet path has no parent directory")?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        std::fs::write(&path, material)
            .with_context(|| format!("Failed to write wallet to {}", path.display()))?;
        restrict_permissions(&path)?;
        Ok(path)
    }
}

fn validate_project_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        anyhow::bail!(
            "Invalid project name '{}': must not be empty or contain path separators or '..'",
            name
        );
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
