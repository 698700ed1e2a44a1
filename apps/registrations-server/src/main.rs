use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use registrations::config::{RegistrationsConfig, StoreConfig};
use registrations::Registrations;
use registrations_server::{ingress, shutdown};
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "registrations";

/// Registrations Server - REST API over the registration store
#[derive(Parser)]
#[command(name = "registrations-server")]
#[command(about = "Registrations Server - REST API over the registration store")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use a throwaway in-memory store
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration and store connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // home_dir is normalized and created while loading
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Registrations Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args).await,
    }
}

/// Module config with `--mock` and relative SQLite directories applied.
fn registrations_config(config: &AppConfig, args: &CliArgs) -> Result<RegistrationsConfig> {
    let mut cfg: RegistrationsConfig = config.module_config(MODULE_NAME)?;

    if args.mock {
        tracing::info!("--mock: using an in-memory registration store");
        cfg.store = StoreConfig {
            collection_name: cfg.store.collection_name,
            ..StoreConfig::in_memory()
        };
    } else if let Some(conn) = cfg.store.connection_string.as_deref() {
        let base_dir = Path::new(&config.server.home_dir);
        cfg.store.connection_string = Some(absolutize_sqlite_dir(conn, base_dir));
    }

    Ok(cfg)
}

/// Resolve a relative `sqlite://<dir>` against the home directory so the
/// store does not depend on the working directory. Other DSNs pass through.
fn absolutize_sqlite_dir(conn: &str, base_dir: &Path) -> String {
    let Some(rest) = conn.strip_prefix("sqlite://") else {
        return conn.to_owned();
    };
    let (dir, query) = rest
        .split_once('?')
        .map_or((rest, None), |(dir, query)| (dir, Some(query)));
    if dir.is_empty() || dir == ":memory:" || Path::new(dir).is_absolute() {
        return conn.to_owned();
    }

    let resolved = base_dir.join(dir).to_string_lossy().replace('\\', "/");
    match query {
        Some(query) => format!("sqlite://{resolved}?{query}"),
        None => format!("sqlite://{resolved}"),
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let module_cfg = registrations_config(&config, &args)?;

    // fails fast when the store is missing or unreachable
    let module = Registrations::init(module_cfg).await?;

    let ingress_cfg = ingress::IngressConfig::from(&config.server);
    let router = ingress::build_router(module.router(), module.client(), &ingress_cfg);

    let bind = (config.server.host.as_str(), config.server.port);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind.0, bind.1))?;
    tracing::info!(
        api_prefix = %module.api_prefix(),
        "Registrations API ready"
    );

    ingress::serve(listener, router, async {
        if let Err(e) = shutdown::wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handling failed, shutting down");
        }
    })
    .await
}

async fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let module_cfg = registrations_config(&config, &args)?;
    let module = Registrations::init(module_cfg).await?;
    module.client().check_store().await?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
