//! CLI definitions for perma-deploy
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::Network;

#[derive(Parser)]
#[command(
    name = "perma-deploy",
    version,
    about = "Deploy static sites to permanent storage",
    long_about = "Uploads every file of a build folder to content-addressed storage, publishes a path manifest\nand points a friendly name record at it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up a project: wallet, config file, hook and package scripts
    Init {
        /// Project name (defaults to the current directory name)
        #[arg(long)]
        project_name: Option<String>,

        /// Build command run before every deployment
        #[arg(long, default_value = "npm run build")]
        build: String,

        /// Only deployments from this branch go through
        #[arg(long, default_value = "main")]
        branch: String,

        /// Friendly name whose record points at the deployment
        #[arg(long)]
        arns: Option<String>,

        /// Sub-name under the friendly name
        #[arg(long, default_value = "@")]
        undername: String,

        /// Registry process id hosting the name record
        #[arg(long)]
        ant_process: Option<String>,

        /// Signer type
        #[arg(long, value_enum, default_value_t = Network::Arweave)]
        signer: Network,

        /// Folder holding the built site
        #[arg(long, default_value = "dist")]
        deploy_folder: String,

        /// Install a git pre-commit hook that deploys
        #[arg(long)]
        auto_deploy: bool,

        /// Base64 32-byte seed for key derivation
        #[arg(long)]
        seed: Option<String>,

        /// Do not add deploy scripts to package.json
        #[arg(long)]
        no_scripts: bool,
    },

    /// Build, upload and publish the project
    Deploy {
        /// Folder to deploy (overrides the config file)
        #[arg(long)]
        deploy_folder: Option<String>,

        /// Simulate uploads without any network call
        #[arg(long)]
        dry_run: bool,

        /// Registry process id (overrides the config file)
        #[arg(long)]
        ant_process: Option<String>,

        /// Sub-name to update (overrides the config file)
        #[arg(long)]
        undername: Option<String>,

        /// Network for hex keys
        #[arg(long, value_enum)]
        network: Option<Network>,

        /// Path to the project config file
        #[arg(long, default_value = ".perma-deploy/config.json")]
        config: PathBuf,

        /// Number of uploads in flight at once
        #[arg(long, default_value = "1")]
        concurrency: usize,

        /// Timeout for each upload
        #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
        timeout: Duration,

        /// Key material (JWK JSON or hex private key)
        #[arg(long, env = "DEPLOY_KEY", hide_env_values = true)]
        deploy_key: Option<String>,

        /// Upload service base URL
        #[arg(long, env = "PERMA_DEPLOY_UPLOAD_URL")]
        upload_url: Option<String>,

        /// Name registry service base URL
        #[arg(long, env = "PERMA_DEPLOY_REGISTRY_URL")]
        registry_url: Option<String>,

        /// Gateway host used for view URLs
        #[arg(long, env = "PERMA_DEPLOY_GATEWAY")]
        gateway: Option<String>,
    },
}
