use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;
mod tools;
mod ui;

use cli::{Cli, Commands};
use commands::deploy::{self, DeployArgs};
use commands::init::{self, InitArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Init {
            project_name,
            build,
            branch,
            arns,
            undername,
            ant_process,
            signer,
            deploy_folder,
            auto_deploy,
            seed,
            no_scripts,
        } => {
            init::execute(InitArgs {
                project_name,
                build,
                branch,
                arns,
                undername,
                ant_process,
                signer,
                deploy_folder,
                auto_deploy,
                seed,
                no_scripts,
            })
            .await
        }
        Commands::Deploy {
            deploy_folder,
            dry_run,
            ant_process,
            undername,
            network,
            config,
            concurrency,
            timeout,
            deploy_key,
            upload_url,
            registry_url,
            gateway,
        } => {
            deploy::execute(DeployArgs {
                deploy_folder,
                dry_run,
                ant_process,
                undername,
                network,
                config,
                concurrency,
                timeout,
                deploy_key,
                upload_url,
                registry_url,
                gateway,
            })
            .await
        }
    };

    // Fatal errors exit 1; degraded deployments already returned Ok
    if let Err(e) = result {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
