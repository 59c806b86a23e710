//! pxf-cli: PXF fleet administration
//!
//! Runs `pxf` lifecycle commands on every host of a Greenplum cluster from the
//! coordinator, and validates PXF deployment files.
//!
//! ## Configuration
//! - `pxf-cli.yaml`, `--config <path>` or `PXF_CLI_CONFIG`: YAML config file
//! - `PXF_CLI__*`: overrides for individual keys (e.g. `PXF_CLI__EXECUTOR__CONCURRENCY`)
//! - `PXF_LOGDIR`, `PXF_LOG_LEVEL`: audit log location and level
//! - `PXF_CLI_LOG`: full tracing filter directive
//! - `GPHOME`, `PXF_HOME`, `PXF_BASE`, `JAVA_HOME`, `PXF_CONF`: per-command inputs

use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use pxf_cli::command::{BuildOptions, CommandName, ProcessEnvironment};
use pxf_cli::config::CliConfig;
use pxf_cli::deployment::parse_deployment;
use pxf_cli::dispatch::ShellExecutor;
use pxf_cli::report::Console;
use pxf_cli::topology::source::FileTopologySource;
use pxf_cli::utils::bootstrap::init_logging;
use pxf_cli::{exit_code, ClusterRunner};

const PROGRAM: &str = "pxf-cli";

#[derive(Debug, Parser)]
#[command(name = "pxf", about = "PXF command-line tools", disable_version_flag = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the PXF version and exit
    #[arg(short = 'v', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Perform <command> on each segment host in the cluster
    #[command(subcommand)]
    Cluster(ClusterCommand),

    /// Inspect PXF deployment configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ClusterCommand {
    /// (deprecated) Install PXF extension under $GPHOME on coordinator, standby coordinator, and all segment hosts
    Init,
    /// Start the PXF server instances on coordinator, standby coordinator, and all segment hosts
    Start,
    /// Stop the PXF server instances on coordinator, standby coordinator, and all segment hosts
    Stop,
    /// Get status of PXF servers on coordinator, standby coordinator, and all segment hosts
    Status,
    /// Sync PXF configs from coordinator to standby coordinator and all segment hosts
    Sync {
        /// Delete extraneous files on remote host
        #[arg(short = 'd', long)]
        delete: bool,
    },
    /// (deprecated) Reset PXF (undo initialization) on coordinator, standby coordinator, and all segment hosts
    Reset,
    /// Install PXF extension under $GPHOME on coordinator, standby coordinator, and all segment hosts
    Register,
    /// Restart the PXF server on coordinator, standby coordinator, and all segment hosts
    Restart,
    /// Prepares a new base directory specified by the $PXF_BASE environment variable
    Prepare,
    /// Migrates configurations from older installations of PXF
    Migrate,
}

impl ClusterCommand {
    fn name(&self) -> CommandName {
        match self {
            ClusterCommand::Init => CommandName::Init,
            ClusterCommand::Start => CommandName::Start,
            ClusterCommand::Stop => CommandName::Stop,
            ClusterCommand::Status => CommandName::Status,
            ClusterCommand::Sync { .. } => CommandName::Sync,
            ClusterCommand::Reset => CommandName::Reset,
            ClusterCommand::Register => CommandName::Register,
            ClusterCommand::Restart => CommandName::Restart,
            ClusterCommand::Prepare => CommandName::Prepare,
            ClusterCommand::Migrate => CommandName::Migrate,
        }
    }

    fn options(&self) -> BuildOptions {
        BuildOptions {
            delete_on_sync: matches!(self, ClusterCommand::Sync { delete: true }),
        }
    }
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Check a deployment file against the deployment rules
    Validate {
        /// Deployment file to check
        file: PathBuf,
    },
}

fn setup(config_path: Option<&std::path::Path>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::load(config_path)?;
    config.apply_legacy_env(&ProcessEnvironment);
    let log_file = init_logging(PROGRAM, &config.logging)?;
    info!(log_file = %log_file.display(), "Starting {}", PROGRAM);
    Ok(config)
}

async fn run_cluster(config: &CliConfig, command: ClusterCommand) -> u8 {
    let topology_file = match config.topology_file(&ProcessEnvironment) {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            eprintln!("ERROR: {}", e);
            return 1;
        }
    };

    let runner = ClusterRunner::new(
        Arc::new(ProcessEnvironment),
        Arc::new(FileTopologySource::new(topology_file)),
        Arc::new(ShellExecutor::from_config(&config.executor)),
    );

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let mut input = BufReader::new(std::io::stdin());
    let mut console = Console::new(&mut stdout, &mut stderr);

    let result = runner
        .run(
            command.name().definition(),
            command.options(),
            &mut input,
            &mut console,
        )
        .await;
    exit_code(&result)
}

async fn validate_deployment(file: PathBuf) -> u8 {
    let text = match tokio::fs::read_to_string(&file).await {
        Ok(text) => text,
        Err(e) => {
            error!(file = %file.display(), error = %e, "Cannot read deployment file");
            eprintln!("ERROR: cannot read {}: {}", file.display(), e);
            return 1;
        }
    };

    let outcome = parse_deployment(&text)
        .map_err(|e| e.to_string())
        .and_then(|deployment| deployment.validate().map_err(|e| e.to_string()));
    match outcome {
        Ok(warnings) => {
            for warning in warnings {
                println!("WARNING: {}", warning);
            }
            info!(file = %file.display(), "Deployment file is valid");
            println!("{} is valid", file.display());
            0
        }
        Err(e) => {
            error!(file = %file.display(), "{}", e);
            eprintln!("ERROR: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("PXF version {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    let Some(command) = cli.command else {
        eprintln!("ERROR: no command given; see --help");
        return ExitCode::FAILURE;
    };

    let config = match setup(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = match command {
        Commands::Cluster(command) => run_cluster(&config, command).await,
        Commands::Config(ConfigCommand::Validate { file }) => validate_deployment(file).await,
    };
    ExitCode::from(code)
}
