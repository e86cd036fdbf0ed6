use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use cms_provider_sync::catalog::CatalogHttpClient;
use cms_provider_sync::config::{ConfigLoader, ResolvedConfig};
use cms_provider_sync::dataset::DatasetHttpClient;
use cms_provider_sync::error::SyncError;
use cms_provider_sync::output::JsonOutput;
use cms_provider_sync::pipeline::Pipeline;
use cms_provider_sync::store::Store;

#[derive(Parser)]
#[command(name = "cms-sync")]
#[command(about = "Mirror CMS provider-data hospital datasets with normalized column headers")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch the catalog and download changed datasets")]
    Run(RunArgs),
    #[command(about = "Show the cached modification stamps")]
    Status(StatusArgs),
}

#[derive(Args, Clone, Default)]
struct RunArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    output_dir: Option<String>,

    #[arg(long)]
    catalog_url: Option<String>,

    #[arg(long)]
    theme: Option<String>,

    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Args)]
struct StatusArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    output_dir: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(sync) = report.downcast_ref::<SyncError>() {
            return ExitCode::from(map_exit_code(sync));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SyncError) -> u8 {
    match error {
        SyncError::ConfigRead(_) | SyncError::ConfigParse(_) => 2,
        SyncError::CatalogHttp(_)
        | SyncError::CatalogStatus { .. }
        | SyncError::CatalogParse(_)
        | SyncError::DatasetHttp(_)
        | SyncError::DatasetStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run(args)) => run_sync(args),
        Some(Commands::Status(args)) => run_status(args),
        None => run_sync(RunArgs::default()),
    }
}

fn run_sync(args: RunArgs) -> miette::Result<()> {
    let resolved = resolve_with_overrides(
        args.config.as_deref(),
        args.output_dir,
        args.catalog_url,
        args.theme,
        args.workers,
    )?;

    let store = Store::new(resolved.output_dir.clone());
    let catalog = CatalogHttpClient::new(resolved.catalog_url.clone()).into_diagnostic()?;
    let datasets = DatasetHttpClient::new().into_diagnostic()?;
    let pipeline = Pipeline::new(store, catalog, datasets, resolved.theme, resolved.workers);

    let report = pipeline.run().into_diagnostic()?;
    JsonOutput::print_run(&report).into_diagnostic()?;
    Ok(())
}

fn run_status(args: StatusArgs) -> miette::Result<()> {
    let resolved = resolve_with_overrides(args.config.as_deref(), args.output_dir, None, None, None)?;
    let store = Store::new(resolved.output_dir);
    let snapshot = store.load_snapshot().into_diagnostic()?;
    JsonOutput::print_status(&snapshot).into_diagnostic()?;
    Ok(())
}

fn resolve_with_overrides(
    config: Option<&str>,
    output_dir: Option<String>,
    catalog_url: Option<String>,
    theme: Option<String>,
    workers: Option<usize>,
) -> miette::Result<ResolvedConfig> {
    let mut resolved = ConfigLoader::resolve(config).into_diagnostic()?;
    if let Some(dir) = output_dir {
        resolved.output_dir = dir.into();
    }
    if let Some(url) = catalog_url {
        resolved.catalog_url = url;
    }
    if let Some(theme) = theme {
        resolved.theme = theme;
    }
    if let Some(workers) = workers {
        resolved.workers = workers.max(1);
    }
    Ok(resolved)
}
