use anyhow::Result;
use clap::{Parser, Subcommand};
use homelab_deploy::cli::{CommandError, DeployContext};
use homelab_deploy::exec::RunnerEngine;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "homelab-deploy")]
#[command(about = "Dependency-aware deployment planner and orchestrator for homelab modules")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct HomelabDeployCli {
    /// Module catalog directory
    #[arg(long, default_value = "Modules")]
    catalog: PathBuf,

    /// Module selection file
    #[arg(long, default_value = "selection.yaml")]
    selection: PathBuf,

    /// Configuration document
    #[arg(long, default_value = "configuration.yaml")]
    configuration: PathBuf,

    /// Generated dynamic inventory used for non-localhost plays
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: DeployCommand,
}

#[derive(Subcommand)]
enum DeployCommand {
    /// List catalog modules into the selection file
    Modules,
    /// Check the selection file against the catalog, annotating bad entries
    ValidateSelection,
    /// Write a configuration template for the selected modules
    ConfigTemplate,
    /// Check the configuration document, annotating bad entries
    ValidateConfig,
    /// Deploy the selected modules in dependency order
    Deploy {
        /// Deploy a single module instead of the whole selection
        #[arg(long)]
        module: Option<String>,

        /// Automation engine executable (defaults to ansible-runner on PATH)
        #[arg(long)]
        engine: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = HomelabDeployCli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    std::process::exit(run(cli).await);
}

async fn run(cli: HomelabDeployCli) -> i32 {
    let context = match DeployContext::load(
        cli.catalog,
        cli.selection,
        cli.configuration,
        cli.inventory,
    ) {
        Ok(context) => context,
        Err(err) => {
            error!("{err}");
            return 1;
        }
    };

    let outcome = match cli.command {
        DeployCommand::Modules => context.gather_available_modules().map(|selection| {
            for module in &selection.available_modules {
                println!("{}: {}", module.name, module.description);
            }
            true
        }),
        DeployCommand::ValidateSelection => context.validate_selection(),
        DeployCommand::ConfigTemplate => context.build_configuration_template().map(|_| true),
        DeployCommand::ValidateConfig => context.validate_configuration(),
        DeployCommand::Deploy { module, engine } => {
            deploy(&context, module.as_deref(), engine).await
        }
    };

    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            error!("{err}");
            err.exit_code()
        }
    }
}

async fn deploy(
    context: &DeployContext,
    module: Option<&str>,
    engine: Option<PathBuf>,
) -> Result<bool, CommandError> {
    let engine = match engine {
        Some(program) => RunnerEngine::new(program),
        None => RunnerEngine::discover().map_err(homelab_deploy::exec::ExecutionError::from)?,
    };
    context.deploy(&engine, module).await?;
    Ok(true)
}
