//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use kush_observer::{IdentityProvider, ProviderClient};

use crate::api::ApiServer;
use crate::api::fallback::FallbackClient;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands, VarsCommands};
use crate::core::config::{self, AppConfig, Environment, FileConfig};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::vars;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub provider: Arc<dyn IdentityProvider>,
    /// Present only when the emergency fallback is enabled
    pub fallback: Option<Arc<FallbackClient>>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();

        // Config files are read first so a file-only environment picks the log format
        let file_config = FileConfig::discover(&cli_config);
        let environment = config::resolve_environment(&cli_config, file_config.as_ref().ok());
        Self::init_logging(
            environment,
            config::resolve_debug(&cli_config, file_config.as_ref().ok()),
        );

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Vars { command: vars_cmd }) => {
                return Self::handle_vars_command(vars_cmd, environment);
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config, file_config?)?;
        Self::start_server(app).await
    }

    fn init(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let config = AppConfig::load(cli, file_config)?;

        let provider = ProviderClient::new(config.provider.client_config())
            .context("Failed to initialize identity provider client")?;
        let fallback = FallbackClient::from_config(&config.fallback)
            .context("Failed to initialize fallback client")?
            .map(Arc::new);

        tracing::debug!(
            provider = %config.provider.url,
            fallback = fallback.is_some(),
            environment = %config.environment,
            "Gateway initialized"
        );

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            provider: Arc::new(provider),
            fallback,
        })
    }

    fn handle_vars_command(cmd: VarsCommands, environment: Environment) -> Result<()> {
        match cmd {
            VarsCommands::Check => vars::check(environment),
            VarsCommands::Template { output, force } => {
                vars::write_template(output.as_deref(), force)
            }
        }
    }

    /// Compact output in development and staging, JSON lines in production
    fn init_logging(environment: Environment, debug: bool) {
        let level = if debug { "debug" } else { "info" };
        let default_filter = format!("{},{}={},tower_http={}", level, APP_NAME_LOWER, level, level);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        let builder = tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_env_filter(filter);

        if environment.is_production() {
            builder.json().with_current_span(true).init();
        } else {
            builder.with_ansi(true).compact().init();
        }
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config);

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown();

        Ok(())
    }
}
