//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::cache::CacheService;
use crate::data::types::SeedParams;
use crate::data::{AnalyticsRepository, DuckdbService};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub duckdb: Arc<DuckdbService>,
    pub cache: Arc<CacheService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => {
                return Self::handle_system_command(&cli_config, system_cmd).await;
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;

        let cache = Arc::new(CacheService::new(&config.cache));
        tracing::debug!(enabled = cache.is_enabled(), "Cache initialized");

        let duckdb = Arc::new(
            DuckdbService::init(&storage, config.query.timeout())
                .await
                .context("Failed to initialize DuckDB")?,
        );
        let shutdown = ShutdownService::new(duckdb.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            duckdb,
            cache,
        })
    }

    async fn handle_system_command(cli: &CliConfig, cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Seed {
                countries,
                users,
                blogs,
                views,
                yes,
            } => {
                let params = SeedParams {
                    countries,
                    users,
                    blogs,
                    views,
                };
                Self::seed_data(cli, params, yes).await
            }
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    async fn seed_data(cli: &CliConfig, params: SeedParams, skip_confirm: bool) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;

        println!("This will add generated data to:");
        println!("  {}", storage.data_dir().display());
        println!();
        println!(
            "  {} countries, {} users, {} blogs, {} views",
            params.countries, params.users, params.blogs, params.views
        );
        println!();
        println!("Make sure the server is not running; the database file is locked while it is.");

        if !skip_confirm && !confirm()? {
            println!("Aborted.");
            return Ok(());
        }

        let duckdb = Arc::new(
            DuckdbService::init(&storage, config.query.timeout())
                .await
                .context("Failed to open DuckDB")?,
        );
        let summary = duckdb.seed(params).await?;
        duckdb.close().await?;

        tracing::info!(
            countries = summary.countries,
            users = summary.users,
            blogs = summary.blogs,
            views = summary.views,
            "Seeding complete"
        );
        println!(
            "Seeded: {} countries, {} users, {} blogs, {} views",
            summary.countries, summary.users, summary.blogs, summary.views
        );
        Ok(())
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete the local data directory:");
        println!("  {}", data_dir.display());
        println!();
        println!(
            "Make sure the server is not running. \
             Deleting data while the server is running will cause data corruption."
        );

        if !skip_confirm && !confirm()? {
            println!("Aborted.");
            return Ok(());
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.shutdown
            .register(app.duckdb.start_checkpoint_task(app.shutdown.subscribe()))
            .await;

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.storage.data_dir().display().to_string(),
            app.config.debug,
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}

/// Ask for a y/N confirmation on stdin
fn confirm() -> Result<bool> {
    print!("\nContinue? [y/N] ");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
