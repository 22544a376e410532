use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, error, info, LevelFilter};
use serde::Serialize;
use std::fmt::Debug;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use mbrew::config::{self, Config};
use mbrew::{Device, DeviceSummary, MinibrewClient, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(name = "mbrew")]
#[command(about = "A CLI for reading information from the MiniBrew Pro Portal")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Set the logging level
    #[arg(
        long,
        global = true,
        value_enum,
        ignore_case = true,
        default_value = "info"
    )]
    logging_level: LogLevel,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    output: OutputFormat,

    /// Configuration file with default credentials (defaults to ~/.mbrew.yml)
    #[arg(long, global = true, env = "MBREW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// The username for authentication
    #[arg(long, env = "MBREW_USERNAME")]
    username: Option<String>,

    /// The password for authentication (optional, will prompt if not provided)
    #[arg(long, env = "MBREW_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// The base URL for the API
    #[arg(long, env = "MBREW_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and display the token
    GetToken(ConnectionArgs),
    /// Fetch and display the brewery overview
    GetBreweryOverview(ConnectionArgs),
    /// Fetch and display session information
    GetSessionInfo {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// The session ID to fetch information for
        #[arg(long)]
        sessionid: i64,
    },
    /// Fetch and display fermenting devices
    GetFermenting(ConnectionArgs),
    /// Fetch and display serving devices
    GetServing(ConnectionArgs),
    /// Fetch and display brew clean idle devices
    GetBrewCleanIdle(ConnectionArgs),
    /// Fetch and display brew acid clean idle devices
    GetBrewAcidCleanIdle(ConnectionArgs),
    /// Fetch and display every device once
    GetMinibrewDevices(ConnectionArgs),
}

impl Commands {
    fn connection(&self) -> &ConnectionArgs {
        match self {
            Commands::GetToken(connection)
            | Commands::GetBreweryOverview(connection)
            | Commands::GetSessionInfo { connection, .. }
            | Commands::GetFermenting(connection)
            | Commands::GetServing(connection)
            | Commands::GetBrewCleanIdle(connection)
            | Commands::GetBrewAcidCleanIdle(connection)
            | Commands::GetMinibrewDevices(connection) => connection,
        }
    }

    /// What the command does, for log lines and error messages
    fn action(&self) -> &'static str {
        match self {
            Commands::GetToken(_) => "fetching token",
            Commands::GetBreweryOverview(_) => "fetching brewery overview",
            Commands::GetSessionInfo { .. } => "fetching session info",
            Commands::GetFermenting(_) => "fetching fermenting devices",
            Commands::GetServing(_) => "fetching serving devices",
            Commands::GetBrewCleanIdle(_) => "fetching brew clean idle devices",
            Commands::GetBrewAcidCleanIdle(_) => "fetching brew acid clean idle devices",
            Commands::GetMinibrewDevices(_) => "fetching all devices",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
    Critical,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => LevelFilter::Error,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial Number")]
    serial_number: String,
    #[tabled(rename = "Nickname")]
    title: String,
    #[tabled(rename = "Version")]
    software_version: String,
    #[tabled(rename = "Is online")]
    online: String,
    #[tabled(rename = "Stage")]
    stage: String,
}

impl From<&DeviceSummary> for DeviceRow {
    fn from(summary: &DeviceSummary) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        Self {
            serial_number: text(&summary.serial_number),
            title: text(&summary.title),
            software_version: text(&summary.software_version),
            online: match summary.online {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => "-".to_string(),
            },
            stage: text(&summary.stage),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.logging_level.into())
        .init();

    let action = cli.command.action();
    if let Err(e) = run(cli).await {
        error!("Error {}: {:#}", action, e);
        eprintln!("Error {}: {:#}", action, e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    info!("{}...", capitalize(cli.command.action()));
    let mut client = build_client(cli.command.connection(), &config)?;
    let format = cli.output;

    match cli.command {
        Commands::GetToken(_) => {
            let token = client.fetch_token().await?;
            print_output(&token, format)?;
        }
        Commands::GetBreweryOverview(_) => {
            let overview = client.get_brewery_overview().await?;
            print_output(&overview, format)?;
        }
        Commands::GetSessionInfo { sessionid, .. } => {
            debug!("Session ID: {}", sessionid);
            let session = client.get_session_info(sessionid).await?;
            print_output(&session, format)?;
        }
        Commands::GetFermenting(_) => {
            let overview = client.get_brewery_overview().await?;
            print_output(&overview.fermenting, format)?;
        }
        Commands::GetServing(_) => {
            let overview = client.get_brewery_overview().await?;
            print_output(&overview.serving, format)?;
        }
        Commands::GetBrewCleanIdle(_) => {
            let overview = client.get_brewery_overview().await?;
            print_output(&overview.brew_clean_idle, format)?;
        }
        Commands::GetBrewAcidCleanIdle(_) => {
            let overview = client.get_brewery_overview().await?;
            print_output(&overview.brew_acid_clean_idle, format)?;
        }
        Commands::GetMinibrewDevices(_) => {
            let overview = client.get_brewery_overview().await?;
            print_devices(&overview.unique_devices(), format)?;
        }
    }

    Ok(())
}

/// Build a client from command-line/environment values, falling back to the config file
fn build_client(connection: &ConnectionArgs, config: &Config) -> Result<MinibrewClient> {
    let username = connection
        .username
        .clone()
        .or_else(|| config.username.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Username is required. Provide via --username, MBREW_USERNAME or the config file."
            )
        })?;

    let password = match connection
        .password
        .clone()
        .or_else(|| config.password.clone())
    {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let base_url = connection
        .base_url
        .clone()
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    debug!("Using base URL {}", base_url);

    Ok(MinibrewClient::new_with_base_url(
        username, password, base_url,
    ))
}

fn print_output<T: Serialize + Debug>(data: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Pretty => println!("{:#?}", data),
    }
    Ok(())
}

fn print_devices(devices: &[&Device], format: OutputFormat) -> Result<()> {
    let summaries: Vec<DeviceSummary> = devices.iter().map(|d| DeviceSummary::from(*d)).collect();

    match format {
        OutputFormat::Json => print_output(&summaries, format),
        OutputFormat::Pretty => {
            if summaries.is_empty() {
                println!("No devices found for this account.");
                return Ok(());
            }
            let rows: Vec<DeviceRow> = summaries.iter().map(DeviceRow::from).collect();
            println!("{}", Table::new(&rows));
            Ok(())
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
