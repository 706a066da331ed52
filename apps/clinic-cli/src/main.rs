use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clinic_client::error::ClientError;
use clinic_client::infra::events::TracingPublisher;
use clinic_client::infra::storage::FileSessionStorage;
use clinic_client::model::Role;
use clinic_client::{ClientConfig, ClinicClient};
use runtime::{AppConfig, CliArgs};

mod commands;
mod output;

use commands::{AppointmentsCmd, HistoryCmd, PatientsCmd};

/// Consultorio - gynecology clinic administration client
#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Consultorio - gynecology clinic administration client")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Origin of the clinic API (overrides config), e.g. http://localhost:8080
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(short, long)]
        username: String,
        /// Falls back to CLINIC_PASSWORD
        #[arg(short, long, env = "CLINIC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create a staff account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        /// MEDICO, ADMIN or RECEPCIONISTA
        #[arg(short, long)]
        role: Role,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Check configuration
    Check,
    /// Totals, upcoming appointments and recent patients
    Dashboard,
    /// Patient records
    #[command(subcommand)]
    Patients(PatientsCmd),
    /// Appointment scheduling
    #[command(subcommand)]
    Appointments(AppointmentsCmd),
    /// Clinical history
    #[command(subcommand)]
    History(HistoryCmd),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

async fn run(cli: Cli) -> Result<()> {
    // CLI args passed down to config
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        api_url: cli.api_url.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (api url / verbosity)
    config.apply_cli_overrides(&args)?;

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.session.home_dir));
    tracing::debug!(api = %config.api.base_url, "clinic starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    dispatch(&config, command).await
}

async fn dispatch(config: &AppConfig, command: Commands) -> Result<()> {
    let client = || build_client(config);
    match command {
        Commands::Check => check_config(config),
        Commands::Login { username, password } => {
            commands::login(&client()?, &username, password.as_deref()).await
        }
        Commands::Register {
            username,
            password,
            role,
        } => commands::register(&client()?, &username, &password, role).await,
        Commands::Logout => commands::logout(&client()?),
        Commands::Whoami => commands::whoami(&client()?),
        Commands::Dashboard => commands::dashboard(&client()?).await,
        Commands::Patients(cmd) => commands::patients(&client()?, cmd).await,
        Commands::Appointments(cmd) => commands::appointments(&client()?, cmd).await,
        Commands::History(cmd) => commands::history(&client()?, cmd).await,
    }
}

fn build_client(config: &AppConfig) -> Result<ClinicClient> {
    let storage = Arc::new(FileSessionStorage::new(config.session_file()));
    let client_config = ClientConfig {
        base_url: config.api.base_url.clone(),
        timeout_sec: config.api.timeout_sec,
    };
    ClinicClient::new(&client_config, storage, Arc::new(TracingPublisher))
        .context("Failed to initialize clinic client")
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // AppConfig::load_* already validated the origin and created home_dir
    println!("Configuration check passed");
    println!("Session file: {}", config.session_file().display());
    println!("{}", config.to_yaml()?);
    Ok(())
}

/// Single top-level handler: map the failure to a message and exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::SessionExpired) => {
            eprintln!("Not signed in or the session expired. Run `clinic login` to continue.");
            ExitCode::from(2)
        }
        _ => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
