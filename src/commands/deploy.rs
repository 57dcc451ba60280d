use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::config::{ConfigOverrides, DeploymentConfig, KeySecret, ProjectConfig};
use crate::domain::{DeployOutcome, Network};
use crate::services::DeployService;
use crate::ui;

/// Arguments of `perma-deploy deploy`
#[derive(Clone, Default)]
pub struct DeployArgs {
    pub deploy_folder: Option<String>,
    pub dry_run: bool,
    pub ant_process: Option<String>,
    pub undername: Option<String>,
    pub network: Option<Network>,
    pub config: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub deploy_key: Option<String>,
    pub upload_url: Option<String>,
    pub registry_url: Option<String>,
    pub gateway: Option<String>,
}

impl DeployArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            deploy_folder: self.deploy_folder.clone(),
            dry_run: self.dry_run,
            registry_process_id: self.ant_process.clone(),
            sub_name: self.undername.clone(),
            network: self.network,
            key_material: self.deploy_key.clone().map(KeySecret::new),
            gateway: self.gateway.clone(),
            upload_url: self.upload_url.clone(),
            registry_url: self.registry_url.clone(),
            upload_timeout: Some(self.timeout),
            upload_concurrency: Some(self.concurrency),
        }
    }
}

pub async fn execute(args: DeployArgs) -> Result<()> {
    let project_root = std::env::current_dir().context("Failed to determine current directory")?;
    let outcome = run(&args, &project_root).await?;

    match outcome {
        DeployOutcome::Skipped { current, expected } => {
            ui::print_info(&format!(
                "Not on deployment branch ({expected}), currently on {current}. Nothing deployed."
            ));
        }
        DeployOutcome::Done(report) if report.dry_run => {
            ui::print_success("Dry run finished, nothing was uploaded");
        }
        DeployOutcome::Done(report) if report.is_clean() => {
            ui::print_success(&format!("Deployed {}", report.view_url));
        }
        DeployOutcome::Done(report) => {
            ui::print_warning(&format!(
                "Deployment finished with warnings. Content is reachable at {}",
                report.view_url
            ));
        }
    }

    Ok(())
}

/// Resolve configuration for `project_root` and run the deployment
pub async fn run(args: &DeployArgs, project_root: &Path) -> Result<DeployOutcome> {
    let config_path = if args.config.is_absolute() {
        args.config.clone()
    } else {
        project_root.join(&args.config)
    };
    info!("Loading config from {}", config_path.display());

    let file = ProjectConfig::load(&config_path)?;
    let config = DeploymentConfig::resolve(file, args.overrides(), project_root)?;
    let service = DeployService::for_project(&config, project_root)
        .context("Failed to set up service clients")?;

    service.execute(&config).await
}
