use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indicatif::{ProgressBar, ProgressStyle};
use rand_core::{OsRng, RngCore};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{default_config_path, ProjectConfig};
use crate::domain::signer::{ArweaveSigner, EvmSigner, Jwk, WALLET_BITS};
use crate::domain::Network;
use crate::error::DeployError;
use crate::infrastructure::hooks::{add_package_scripts, install_pre_commit};
use crate::infrastructure::{GitClient, KeyStore};
use crate::ui;

/// Arguments of `perma-deploy init`
#[derive(Clone)]
pub struct InitArgs {
    pub project_name: Option<String>,
    pub build: String,
    pub branch: String,
    pub arns: Option<String>,
    pub undername: String,
    pub ant_process: Option<String>,
    pub signer: Network,
    pub deploy_folder: String,
    pub auto_deploy: bool,
    pub seed: Option<String>,
    pub no_scripts: bool,
}

/// What `init` wrote
#[derive(Debug, Clone)]
pub struct InitSummary {
    pub address: String,
    pub wallet_path: PathBuf,
    pub config_path: PathBuf,
    pub hook_path: Option<PathBuf>,
    pub scripts_added: Vec<String>,
}

/// Decode a base64 seed that must hold exactly 32 bytes
pub fn validate_seed(seed: &str) -> Result<[u8; 32], DeployError> {
    let bytes = STANDARD
        .decode(seed.trim())
        .map_err(|e| DeployError::InvalidSeed(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| DeployError::InvalidSeed(format!("Seed must be 32 bytes, got {len}")))
}

pub async fn execute(args: InitArgs) -> Result<()> {
    let project_root = std::env::current_dir().context("Failed to determine current directory")?;
    let keystore = KeyStore::in_home()?;

    ui::print_header("perma-deploy init");
    let summary = run(args, &project_root, &keystore, WALLET_BITS).await?;

    ui::print_success("Project initialized");
    ui::print_field("Wallet address", &summary.address);
    ui::print_field("Wallet file", &summary.wallet_path.display().to_string());
    ui::print_field("Config", &summary.config_path.display().to_string());
    if let Some(hook) = &summary.hook_path {
        ui::print_field("Pre-commit hook", &hook.display().to_string());
    }
    if !summary.scripts_added.is_empty() {
        ui::print_field("package.json scripts", &summary.scripts_added.join(", "));
    }
    ui::print_info("Fund the wallet, then run `perma-deploy deploy`");

    Ok(())
}

/// Initialize `project_root`, storing the key in `keystore`.
///
/// The seed is validated before anything is written.
pub async fn run(
    args: InitArgs,
    project_root: &Path,
    keystore: &KeyStore,
    rsa_bits: usize,
) -> Result<InitSummary> {
    let seed = args.seed.as_deref().map(validate_seed).transpose()?;
    if args.signer == Network::Arweave && seed.is_none() {
        anyhow::bail!("--seed is required for the arweave signer");
    }

    let project_name = args
        .project_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| {
            project_root
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
        })
        .context("Could not determine a project name, pass --project-name")?;
    keystore.wallet_path(&project_name)?;

    let (material, address) = derive_key(args.signer, seed, rsa_bits).await?;
    let wallet_path = keystore.save(&project_name, &material)?;
    info!("🔑 Wallet written to {}", wallet_path.display());

    let config = ProjectConfig {
        project_name,
        build_command: Some(args.build),
        deploy_branch: Some(args.branch),
        deploy_folder: Some(args.deploy_folder),
        wallet_path: Some(wallet_path.clone()),
        wallet_address: Some(address.clone()),
        network: Some(args.signer),
        arns_name: args.arns,
        sub_name: Some(args.undername),
        registry_process_id: args.ant_process,
        auto_deploy: args.auto_deploy,
        gateway: None,
    };
    let config_path = default_config_path(project_root);
    config.save(&config_path)?;
    info!("📝 Config written to {}", config_path.display());

    let hook_path = if args.auto_deploy {
        install_hook(project_root).await?
    } else {
        None
    };

    let package_json = project_root.join("package.json");
    let scripts_added = if args.no_scripts || !package_json.exists() {
        Vec::new()
    } else {
        match add_package_scripts(&package_json) {
            Ok(added) => added,
            Err(e) => {
                warn!("⚠️  Could not update package.json (non-fatal): {:#}", e);
                Vec::new()
            }
        }
    };

    Ok(InitSummary {
        address,
        wallet_path,
        config_path,
        hook_path,
        scripts_added,
    })
}

/// Key material to store and the address it signs as
async fn derive_key(network: Network, seed: Option<[u8; 32]>, rsa_bits: usize) -> Result<(String, String)> {
    match network {
        Network::Arweave => {
            let seed = seed.context("--seed is required for the arweave signer")?;

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(format!("Generating {rsa_bits}-bit RSA wallet..."));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let generated = tokio::task::spawn_blocking(move || Jwk::from_seed(seed, rsa_bits))
                .await
                .context("Key generation task failed")?;
            spinner.finish_and_clear();

            let jwk = generated.map_err(DeployError::InvalidKeyMaterial)?;
            let material = serde_json::to_string(&jwk).context("Failed to serialize wallet")?;
            let address = ArweaveSigner::new(jwk)
                .address()
                .map_err(DeployError::InvalidKeyMaterial)?;
            Ok((material, address))
        }
        Network::Ethereum | Network::Polygon => {
            let secret = seed.unwrap_or_else(|| {
                let mut secret = [0u8; 32];
                OsRng.fill_bytes(&mut secret);
                secret
            });
            let signer =
                EvmSigner::from_secret(&secret, network).map_err(DeployError::InvalidKeyMaterial)?;
            Ok((format!("0x{}", hex::encode(secret)), signer.address()))
        }
    }
}

async fn install_hook(project_root: &Path) -> Result<Option<PathBuf>> {
    if !project_root.join(".git").exists() {
        warn!("⚠️  No .git directory found, skipping pre-commit hook");
        return Ok(None);
    }

    let hooks_dir = GitClient::in_dir(project_root)
        .hooks_dir()
        .await
        .unwrap_or_else(|| project_root.join(".git").join("hooks"));
    let path = install_pre_commit(&hooks_dir)?;
    info!("🪝 Pre-commit hook installed at {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Signer;
    use tempfile::TempDir;

    const SEED: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

    fn args(signer: Network) -> InitArgs {
        InitArgs {
            project_name: Some("site".into()),
            build: "npm run build".into(),
            branch: "main".into(),
            arns: Some("myapp".into()),
            undername: "@".into(),
            ant_process: Some("proc-1".into()),
            signer,
            deploy_folder: "dist".into(),
            auto_deploy: false,
            seed: Some(SEED.into()),
            no_scripts: false,
        }
    }

    #[test]
    fn test_validate_seed() {
        let seed = validate_seed(SEED).unwrap();
        assert_eq!(seed[0], 0);
        assert_eq!(seed[31], 31);

        let short = validate_seed("AAECAwQFBgcICQoLDA0ODw==").unwrap_err();
        assert_eq!(
            short.to_string(),
            "Invalid base64 seed - Seed must be 32 bytes, got 16"
        );
        assert!(matches!(
            validate_seed("not base64!!"),
            Err(DeployError::InvalidSeed(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_seed_writes_nothing() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let keystore = KeyStore::new(home.path().join(".permaweb"));

        let mut bad = args(Network::Arweave);
        bad.seed = Some("AAECAwQFBgcICQoLDA0ODw==".into());
        let err = run(bad, project.path(), &keystore, 1024).await.unwrap_err();

        assert!(err.to_string().starts_with("Invalid base64 seed"));
        assert!(!home.path().join(".permaweb").exists());
        assert!(!default_config_path(project.path()).exists());
    }

    #[tokio::test]
    async fn test_unsafe_project_name_writes_nothing() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let keystore = KeyStore::new(home.path().join(".permaweb"));

        let mut escaping = args(Network::Polygon);
        escaping.project_name = Some("../x".into());
        let err = run(escaping, project.path(), &keystore, 1024).await.unwrap_err();

        assert!(err.to_string().contains("Invalid project name"));
        assert!(!home.path().join("x").exists());
        assert!(!home.path().join(".permaweb").exists());
        assert!(!default_config_path(project.path()).exists());
    }

    #[tokio::test]
    async fn test_evm_init_writes_config_and_wallet() {
        let project = TempDir::new().unwrap();
        std::fs::write(project.path().join("package.json"), r#"{"name":"site"}"#).unwrap();
        let home = TempDir::new().unwrap();
        let keystore = KeyStore::new(home.path());

        let summary = run(args(Network::Polygon), project.path(), &keystore, 1024)
            .await
            .unwrap();

        let material = std::fs::read_to_string(&summary.wallet_path).unwrap();
        assert_eq!(
            material,
            "0x000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
        );
        let signer = Signer::resolve(&material, Some(Network::Polygon)).unwrap();
        assert_eq!(signer.address().unwrap(), summary.address);

        let config = ProjectConfig::load(&summary.config_path).unwrap();
        assert_eq!(config.network, Some(Network::Polygon));
        assert_eq!(config.registry_process_id.as_deref(), Some("proc-1"));
        assert_eq!(config.wallet_path.as_deref(), Some(summary.wallet_path.as_path()));
        assert_eq!(summary.scripts_added, vec!["deploy", "deploy:dry-run"]);
        assert!(summary.hook_path.is_none());
    }

    #[tokio::test]
    async fn test_evm_without_seed_generates_key() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let mut init = args(Network::Ethereum);
        init.seed = None;
        init.no_scripts = true;

        let summary = run(init, project.path(), &KeyStore::new(home.path()), 1024)
            .await
            .unwrap();
        assert!(summary.address.starts_with("0x"));
        assert_eq!(summary.address.len(), 42);
    }

    #[tokio::test]
    async fn test_arweave_requires_seed() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let mut init = args(Network::Arweave);
        init.seed = None;
        tokio_test::assert_err!(run(init, project.path(), &KeyStore::new(home.path()), 1024).await);
        assert!(!default_config_path(project.path()).exists());
    }

    #[tokio::test]
    async fn test_arweave_wallet_is_seed_deterministic() {
        let home = TempDir::new().unwrap();
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let a = run(args(Network::Arweave), first.path(), &KeyStore::new(home.path().join("a")), 1024)
            .await
            .unwrap();
        let b = run(args(Network::Arweave), second.path(), &KeyStore::new(home.path().join("b")), 1024)
            .await
            .unwrap();

        assert_eq!(a.address, b.address);
        let material = std::fs::read_to_string(&a.wallet_path).unwrap();
        assert!(matches!(
            Signer::resolve(&material, None).unwrap(),
            Signer::Arweave(_)
        ));
    }

    #[tokio::test]
    async fn test_auto_deploy_without_git_warns() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let mut init = args(Network::Ethereum);
        init.auto_deploy = true;

        let summary = run(init, project.path(), &KeyStore::new(home.path()), 1024)
            .await
            .unwrap();
        assert!(summary.hook_path.is_none());
        assert!(ProjectConfig::load(&summary.config_path).unwrap().auto_deploy);
    }

    #[tokio::test]
    async fn test_auto_deploy_installs_hook() {
        let project = TempDir::new().unwrap();
        std::fs::create_dir_all(project.path().join(".git")).unwrap();
        let home = TempDir::new().unwrap();
        let mut init = args(Network::Ethereum);
        init.auto_deploy = true;

        let summary = run(init, project.path(), &KeyStore::new(home.path()), 1024)
            .await
            .unwrap();
        let hook = summary.hook_path.unwrap();
        assert!(hook.ends_with("pre-commit"));
        assert!(std::fs::read_to_string(hook).unwrap().contains("perma-deploy deploy"));
    }
}
