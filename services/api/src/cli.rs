use crate::infra::{ConfiguredRegistry, InMemoryAllocationLedger};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fund_allocator::allocation::{Application, FundAllocationService, GeoPoint};
use fund_allocator::config::AppConfig;
use fund_allocator::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "Fund Allocator",
    about = "Route funding applications to the fund account whose catchment area contains them",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Select a fund account for a single application and print the outcome
    Select(SelectArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override FUND_ACCOUNTS_PATH with a JSON fund account registry
    #[arg(long)]
    pub(crate) accounts: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SelectArgs {
    /// JSON fund account registry (defaults to FUND_ACCOUNTS_PATH)
    #[arg(long)]
    pub(crate) accounts: Option<PathBuf>,
    /// Application identifier reported in the outcome
    #[arg(long, default_value = "cli-application")]
    pub(crate) id: String,
    /// Free-text address used for region matching
    #[arg(long)]
    pub(crate) address: Option<String>,
    /// Latitude of the application's location hint
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the application's location hint
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub(crate) lon: Option<f64>,
    /// Report the selected fund without recording an allocation
    #[arg(long)]
    pub(crate) preview: bool,
}

impl SelectArgs {
    fn application(&self) -> Application {
        let mut application = Application::new(self.id.clone());
        if let Some(address) = &self.address {
            application = application.with_address(address.clone());
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            application = application.with_latlong(GeoPoint::new(lat, lon));
        }
        application
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Select(args) => run_select(args),
    }
}

fn run_select(args: SelectArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let accounts_path = args.accounts.clone().or(config.registry.accounts_path);
    let registry = ConfiguredRegistry::from_path(accounts_path);
    let ledger = Arc::new(InMemoryAllocationLedger::default());
    let service = FundAllocationService::new(
        Arc::new(registry),
        ledger.clone(),
        config.selection.selector(),
    );

    let application = args.application();
    let outcome = if args.preview {
        service.preview(&application)?
    } else {
        service.process_application_created(&application)?
    };

    let rendered = serde_json::to_string_pretty(&outcome).map_err(std::io::Error::from)?;
    println!("{rendered}");
    println!("{}", outcome.summary());
    if !args.preview {
        println!("allocations recorded: {}", ledger.records().len());
    }
    Ok(())
}
