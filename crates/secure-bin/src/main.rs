use std::path::{Path, PathBuf};

use brushline_common::TokenMaterial;
use brushline_secure_lib::{
    auth::generate_secure_id,
    config::{self, Settings},
    error::SecureError,
    storage::FlatFileBackend,
    token, SecureCore,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Local session tooling for the Brushline ordering client.
#[derive(Parser)]
#[command(name = "brushline-secure", version)]
struct Cli {
    /// Explicit config file (TOML); otherwise config.toml/yaml/json
    /// and BRUSHLINE_* environment variables are consulted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current session state and stored keys
    Status,
    /// Open a session from a bearer token
    Login {
        /// Bearer token for the session
        token: String,
        /// Identifier the rate limiter keys on (email or phone)
        #[arg(short, long, default_value = "local-user")]
        identifier: String,
    },
    /// Close the session and purge the stored record
    Logout,
    /// Remove every entry the secure store tracks
    Purge,
    /// Check a token's structure without touching the session
    ValidateToken {
        /// Token to inspect
        token: String,
    },
    /// Generate a secure random identifier
    GenId,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Explicit config wins; otherwise the default discovery chain,
    // falling back to the packaged defaults.
    let settings: Settings = match &cli.config {
        Some(path) => config::load_settings_from(path)?,
        None => config::load_settings()
            .or_else(|_| config::load_settings_from(Path::new("config/default.toml")))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let backend = FlatFileBackend::new(&settings.data_dir)?;
    let mut core = SecureCore::new(backend, settings)?;

    core.bootstrap().await;
    if core.session.state().is_logged_in {
        tracing::info!("restored a prior session from storage");
    }

    match cli.command {
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(core.session.state())?);
            let keys = core.session.store().keys().await;
            if keys.is_empty() {
                println!("stored keys: none");
            } else {
                println!("stored keys: {}", keys.join(", "));
            }
        },
        Command::Login { token, identifier } => {
            if !core.login_limiter.can_proceed(&identifier) {
                eprintln!("{}", SecureError::RateLimited.sanitized_message());
                std::process::exit(1);
            }

            let material = TokenMaterial {
                token_type: Some("Bearer".to_string()),
                access_token: Some(token),
                ..TokenMaterial::default()
            };

            if core.session.login(material).await {
                core.login_limiter.reset(&identifier);
                println!("session opened");
            } else {
                eprintln!("login rejected: token failed the structural check");
                std::process::exit(1);
            }
        },
        Command::Logout => {
            core.session.clear_user().await;
            core.otp.clear();
            println!("session closed and stored record purged");
        },
        Command::Purge => {
            core.session.store().clear().await?;
            println!("secure store cleared");
        },
        Command::ValidateToken { token } => {
            if token::is_structurally_valid(&token) {
                println!("token structure: ok (signature not verified)");
            } else {
                eprintln!("token structure: invalid");
                std::process::exit(1);
            }
        },
        Command::GenId => {
            println!("{}", generate_secure_id());
        },
    }

    Ok(())
}
