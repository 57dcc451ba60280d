//! Deploy service - orchestrates the deployment workflow
//!
//! Init → BranchCheck → Build → Upload → Manifest → NameUpdate → Done.
//! Precondition failures abort with an error; upload and naming failures
//! degrade the report and the run still completes.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::DeploymentConfig;
use crate::domain::deployment::{friendly_url, view_url};
use crate::domain::{
    DeployOutcome, DeployPhase, DeploymentReport, ManifestOutcome, NameRecordOutcome, PhaseResult,
    PhaseStatus, Signer,
};
use crate::error::DeployError;
use crate::infrastructure::{
    BuildRunner, DryRunStore, GitClient, HttpNameRegistry, HttpObjectStore, NameRegistry,
    ObjectStore, SourceControl,
};
use crate::services::{ContentUploader, NameRecordUpdater};
use crate::ui;

pub const REGISTRY_TIMEOUT: Duration = Duration::from_secs(30);

/// Service for orchestrating deployments
pub struct DeployService {
    source_control: Box<dyn SourceControl>,
    store: Box<dyn ObjectStore>,
    registry: Box<dyn NameRegistry>,
    build: BuildRunner,
}

impl DeployService {
    pub fn new(
        source_control: Box<dyn SourceControl>,
        store: Box<dyn ObjectStore>,
        registry: Box<dyn NameRegistry>,
        build: BuildRunner,
    ) -> Self {
        Self {
            source_control,
            store,
            registry,
            build,
        }
    }

    /// Service wired to git and the HTTP services named in `config`
    pub fn for_project(config: &DeploymentConfig, project_root: &Path) -> Result<Self> {
        let store = HttpObjectStore::new(config.upload_url.clone(), config.upload_timeout)?;
        let registry = HttpNameRegistry::new(config.registry_url.clone(), REGISTRY_TIMEOUT)?;
        Ok(Self::new(
            Box::new(GitClient::in_dir(project_root)),
            Box::new(store),
            Box::new(registry),
            BuildRunner::new(project_root),
        ))
    }

    /// Execute a full deployment
    pub async fn execute(&self, config: &DeploymentConfig) -> Result<DeployOutcome> {
        let mut phases = Vec::new();

        // Init
        let start = Instant::now();
        let signer = Signer::resolve(config.key_material.expose(), config.network)
            .map_err(DeployError::InvalidKeyMaterial)?;
        let address = signer.address().map_err(DeployError::InvalidKeyMaterial)?;
        self.print_header(config, &signer, &address);
        phases.push(PhaseResult::completed(DeployPhase::Init, start.elapsed()));

        // Branch check
        log_phase(DeployPhase::BranchCheck);
        match self.source_control.current_branch().await {
            None => {
                warn!("⚠️  No commits found. Skipping branch check.");
                phases.push(PhaseResult::skipped(DeployPhase::BranchCheck, "no commits"));
            }
            Some(current) if current != config.deploy_branch => {
                info!(
                    "Not on deployment branch ({}), current branch is {}. Skipping deployment.",
                    config.deploy_branch, current
                );
                return Ok(DeployOutcome::Skipped {
                    current,
                    expected: config.deploy_branch.clone(),
                });
            }
            Some(_) => phases.push(PhaseResult::completed(DeployPhase::BranchCheck, Duration::ZERO)),
        }

        // Build
        if config.build_command.trim().is_empty() {
            info!("No build command configured, skipping build");
            phases.push(PhaseResult::skipped(DeployPhase::Build, "no build command"));
        } else {
            log_phase(DeployPhase::Build);
            let start = Instant::now();
            self.build.run(&config.build_command).await?;
            phases.push(PhaseResult::completed(DeployPhase::Build, start.elapsed()));
        }

        // Upload
        ensure_deploy_folder(&config.deploy_folder)?;
        let dry_run_store = DryRunStore::new();
        let store: &dyn ObjectStore = if config.dry_run {
            info!("[DRY RUN] Uploads are simulated, no network calls will be made");
            &dry_run_store
        } else {
            self.store.as_ref()
        };
        let uploader = ContentUploader::new(store, &signer)
            .with_timeout(config.upload_timeout)
            .with_concurrency(config.upload_concurrency);

        log_phase(DeployPhase::Upload);
        let start = Instant::now();
        let objects = uploader.upload_tree(&config.deploy_folder).await?;
        let failed_files: Vec<String> = objects
            .values()
            .filter(|object| !object.id.is_stored())
            .map(|object| object.relative_path.clone())
            .collect();
        phases.push(if failed_files.is_empty() {
            PhaseResult::completed(DeployPhase::Upload, start.elapsed())
        } else {
            PhaseResult::degraded(
                DeployPhase::Upload,
                start.elapsed(),
                format!("{} of {} files failed", failed_files.len(), objects.len()),
            )
        });

        // Manifest
        log_phase(DeployPhase::Manifest);
        let start = Instant::now();
        let (_, manifest) = uploader
            .publish_manifest(&config.deploy_folder, &objects)
            .await;
        phases.push(match &manifest {
            ManifestOutcome::Published(_) => {
                PhaseResult::completed(DeployPhase::Manifest, start.elapsed())
            }
            ManifestOutcome::Failed(reason) => {
                PhaseResult::degraded(DeployPhase::Manifest, start.elapsed(), reason.clone())
            }
        });

        if config.dry_run {
            info!(
                "[DRY RUN] Simulated {} uploads, nothing was sent",
                dry_run_store.upload_count()
            );
        }

        // Name update
        let name_record = match (&manifest, &config.registry_process_id) {
            (ManifestOutcome::Published(manifest_id), Some(process_id)) if config.dry_run => {
                info!(
                    "[DRY RUN] Would update name record {} on {} → {}",
                    config.sub_name, process_id, manifest_id
                );
                NameRecordOutcome::NotAttempted(format!(
                    "dry run, would point {} on {} at {}",
                    config.sub_name, process_id, manifest_id
                ))
            }
            _ if config.dry_run => NameRecordOutcome::NotAttempted("dry run".into()),
            (ManifestOutcome::Failed(_), _) => {
                warn!("⚠️  Manifest was not published; the name record was not updated");
                NameRecordOutcome::NotAttempted("manifest upload failed".into())
            }
            (_, None) => NameRecordOutcome::NotAttempted("no registry process configured".into()),
            (ManifestOutcome::Published(manifest_id), Some(process_id)) => {
                log_phase(DeployPhase::NameUpdate);
                let start = Instant::now();
                let commit = self.source_control.commit_hash().await;
                let outcome = NameRecordUpdater::new(self.registry.as_ref(), &signer)
                    .with_commit(commit)
                    .publish(process_id, &config.sub_name, manifest_id, Vec::new())
                    .await;
                if let NameRecordOutcome::Failed(reason) = &outcome {
                    phases.push(PhaseResult::degraded(
                        DeployPhase::NameUpdate,
                        start.elapsed(),
                        reason.clone(),
                    ));
                } else {
                    phases.push(PhaseResult::completed(DeployPhase::NameUpdate, start.elapsed()));
                }
                outcome
            }
        };
        if let NameRecordOutcome::NotAttempted(reason) = &name_record {
            phases.push(PhaseResult::skipped(DeployPhase::NameUpdate, reason.clone()));
        }

        phases.push(PhaseResult::completed(DeployPhase::Done, Duration::ZERO));

        let manifest_id = manifest.id();
        let friendly = match (&config.arns_name, &name_record) {
            (Some(arns), NameRecordOutcome::Updated) => {
                Some(friendly_url(&config.gateway, arns, &config.sub_name))
            }
            _ => None,
        };

        let report = DeploymentReport {
            view_url: view_url(&config.gateway, &manifest_id),
            manifest_id,
            manifest,
            name_record,
            file_count: objects.len(),
            failed_files,
            friendly_url: friendly,
            dry_run: config.dry_run,
            phases,
        };
        self.print_summary(&report);

        Ok(DeployOutcome::Done(report))
    }

    fn print_header(&self, config: &DeploymentConfig, signer: &Signer, address: &str) {
        ui::print_header(&format!("Deploy: {}", config.project_name));
        info!("Signer: {} ({})", address, signer.network());
        info!("Deploy folder: {}", config.deploy_folder.display());
        if config.dry_run {
            info!("Mode: dry run");
        }
        println!();
    }

    fn print_summary(&self, report: &DeploymentReport) {
        println!();
        println!(
            "{}",
            "════════════════════════════════════════════════════════════".bright_blue()
        );

        if report.dry_run {
            println!("{}", "✅ Dry run completed".bright_green().bold());
        } else if report.is_clean() {
            println!("{}", "✅ Deployment completed".bright_green().bold());
        } else {
            println!("{}", "⚠️  Deployment completed with warnings".bright_yellow().bold());
        }

        println!();
        for result in &report.phases {
            match &result.status {
                PhaseStatus::Completed => println!(
                    "   ✅ {} ({:.1}s)",
                    result.phase.name(),
                    result.duration.as_secs_f64()
                ),
                PhaseStatus::Degraded(reason) => println!(
                    "   ⚠️  {} ({:.1}s): {}",
                    result.phase.name(),
                    result.duration.as_secs_f64(),
                    reason.yellow()
                ),
                PhaseStatus::Skipped(reason) => {
                    println!("   ⏭️  {} skipped: {}", result.phase.name(), reason.dimmed())
                }
            }
        }
        for path in &report.failed_files {
            println!("      {} {}", "upload-failed:".yellow(), path);
        }

        println!();
        ui::print_field("Files", &report.file_count.to_string());
        ui::print_field("Manifest", report.manifest_id.as_str());
        ui::print_field("View", &report.view_url);
        if let Some(url) = &report.friendly_url {
            ui::print_field("Friendly URL", url);
        }
        println!();
    }
}

fn log_phase(phase: DeployPhase) {
    info!("{} {}", phase.emoji(), phase.name());
}

/// The deploy folder must exist and hold at least one entry
fn ensure_deploy_folder(folder: &Path) -> Result<(), DeployError> {
    let has_entries = std::fs::read_dir(folder)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if has_entries {
        Ok(())
    } else {
        Err(DeployError::EmptyDeployFolder {
            path: folder.display().to_string(),
        })
    }
}
