use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::Environment;
use super::constants::{
    ENV_API_ENV, ENV_API_TOKEN, ENV_AUTH_API_URL, ENV_CLIENT_ID, ENV_CONFIG, ENV_DEBUG,
    ENV_FALLBACK_ENABLED, ENV_FALLBACK_URL, ENV_HOST, ENV_JWT_SECRET, ENV_PORT, ENV_REDIRECT_URI,
};

#[derive(Parser)]
#[command(name = "kush-gateway")]
#[command(version, about = "Kush.Observer authentication gateway", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (verbose request logging)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Deployment environment (development, staging, production)
    #[arg(long = "env", global = true, env = ENV_API_ENV, value_parser = parse_environment)]
    pub environment: Option<Environment>,

    /// Identity provider base URL
    #[arg(long, global = true, env = ENV_AUTH_API_URL)]
    pub auth_api_url: Option<String>,

    /// OAuth client identifier
    #[arg(long, global = true, env = ENV_CLIENT_ID)]
    pub client_id: Option<String>,

    /// OAuth redirect URI registered with the provider
    #[arg(long, global = true, env = ENV_REDIRECT_URI)]
    pub redirect_uri: Option<String>,

    /// Legacy fallback endpoint URL
    #[arg(long, global = true, env = ENV_FALLBACK_URL)]
    pub fallback_url: Option<String>,

    /// Enable or disable the emergency fallback
    #[arg(long = "fallback", global = true, env = ENV_FALLBACK_ENABLED)]
    pub fallback_enabled: Option<bool>,

    /// Client credential for the provider token endpoint (env only)
    #[arg(long, global = true, env = ENV_API_TOKEN, hide = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// OAuth state signing key (env only)
    #[arg(long, global = true, env = ENV_JWT_SECRET, hide = true, hide_env_values = true)]
    pub jwt_secret: Option<String>,
}

/// Parse deployment environment from CLI/env string
fn parse_environment(s: &str) -> Result<Environment, String> {
    Environment::parse(s).ok_or_else(|| {
        format!(
            "Invalid environment '{}'. Valid options: development, staging, production",
            s
        )
    })
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the gateway (default command)
    Start,
    /// Worker variable setup
    Vars {
        #[command(subcommand)]
        command: VarsCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum VarsCommands {
    /// Report which worker variables are set (secrets masked)
    Check,
    /// Write a .env template with every worker variable
    Template {
        /// Output path (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub environment: Option<Environment>,
    pub auth_api_url: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub fallback_url: Option<String>,
    pub fallback_enabled: Option<bool>,
    pub api_token: Option<String>,
    pub jwt_secret: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        environment: cli.environment,
        auth_api_url: cli.auth_api_url,
        client_id: cli.client_id,
        redirect_uri: cli.redirect_uri,
        fallback_url: cli.fallback_url,
        fallback_enabled: cli.fallback_enabled,
        api_token: cli.api_token.filter(|t| !t.is_empty()),
        jwt_secret: cli.jwt_secret.filter(|s| !s.is_empty()),
    };
    (config, cli.command)
}
