use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    DEFAULT_SEED_BLOGS, DEFAULT_SEED_COUNTRIES, DEFAULT_SEED_USERS, DEFAULT_SEED_VIEWS,
    ENV_CACHE_ENABLED, ENV_CACHE_MAX_ENTRIES, ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_PORT,
    ENV_QUERY_TIMEOUT_SECS,
};

#[derive(Parser)]
#[command(name = "blogscope")]
#[command(version, about = "Blog analytics reporting server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (records compiled report queries to the debug folder)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Report query timeout in seconds
    #[arg(long, global = true, env = ENV_QUERY_TIMEOUT_SECS)]
    pub query_timeout: Option<u64>,

    /// Enable or disable the report cache
    #[arg(long, global = true, env = ENV_CACHE_ENABLED)]
    pub cache_enabled: Option<bool>,

    /// Maximum number of cached report responses
    #[arg(long, global = true, env = ENV_CACHE_MAX_ENTRIES)]
    pub cache_max_entries: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Populate the database with dummy countries, users, blogs and views
    Seed {
        /// Number of countries
        #[arg(long, default_value_t = DEFAULT_SEED_COUNTRIES)]
        countries: usize,
        /// Number of users
        #[arg(long, default_value_t = DEFAULT_SEED_USERS)]
        users: usize,
        /// Number of blogs
        #[arg(long, default_value_t = DEFAULT_SEED_BLOGS)]
        blogs: usize,
        /// Number of blog views
        #[arg(long, default_value_t = DEFAULT_SEED_VIEWS)]
        views: usize,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete local data directory (database and debug files). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub query_timeout: Option<u64>,
    pub cache_enabled: Option<bool>,
    pub cache_max_entries: Option<u64>,
}

impl From<Cli> for (CliConfig, Option<Commands>) {
    fn from(cli: Cli) -> Self {
        let config = CliConfig {
            host: cli.host,
            port: cli.port,
            debug: cli.debug,
            config: cli.config,
            query_timeout: cli.query_timeout,
            cache_enabled: cli.cache_enabled,
            cache_max_entries: cli.cache_max_entries,
        };
        (config, cli.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().into()
}
