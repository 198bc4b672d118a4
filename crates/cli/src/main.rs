//! Home service CLI - book home services from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (signs it in)
//! hs-cli register -n "Ada Lovelace" -e ada@example.com -p 555-0100
//!
//! # Book a service
//! hs-cli book -s "Plumbing - Leak Repair" --province ON --at "2026-05-01 10:00"
//!
//! # List your bookings, or everyone's
//! hs-cli bookings
//! hs-cli bookings --all
//! ```
//!
//! Commands that need a password read it from stdin (see
//! `commands::secret`).
//!
//! State lives wherever `HOMESERVICE_DATA_DIR` points (see
//! `homeservice_app::config`). It is loaded before each command and flushed
//! before the process exits.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homeservice_app::{AppConfig, AppState};

use commands::secret::SecretReader;

mod commands;

#[derive(Parser)]
#[command(name = "hs-cli")]
#[command(version, about = "Home service booking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(short, long, default_value = "")]
        phone: String,
    },
    /// Sign in to an existing account
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Update name and phone of the signed-in account
    Profile {
        /// New full name
        #[arg(short, long)]
        name: Option<String>,

        /// New phone number
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Change the email of the signed-in account
    ChangeEmail {
        /// New email address
        new_email: String,
    },
    /// Change the password of the signed-in account (current, then new, on stdin)
    ChangePassword,
    /// Book a service
    Book {
        /// Service label, e.g. "Plumbing - Leak Repair"
        #[arg(short, long)]
        service: String,

        /// Province name or two-letter code
        #[arg(long)]
        province: String,

        /// Date and time, RFC 3339 or "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long)]
        at: String,

        /// Notes for the provider
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Cancel a booking
    Cancel {
        /// Booking ID
        id: String,
    },
    /// List bookings
    Bookings {
        /// Include bookings of every account
        #[arg(long)]
        all: bool,
    },
    /// List notifications
    Notifications,
    /// List service categories
    Categories,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "homeservice_app=info,homeservice_cli=info";

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let cli = Cli::parse();

    let state = AppState::from_config(&config);
    state.load().await;

    let result = run(&state, cli).await;

    // Every mutation queues its writes; wait for them before exiting
    state.flush().await;

    if let Err(e) = result {
        e.report();
        commands::output::failure(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(state: &AppState, cli: Cli) -> homeservice_app::Result<()> {
    match cli.command {
        Commands::Register { name, email, phone } => {
            let password = SecretReader::stdin().read("Password")?;
            commands::account::register(state, &name, &email, &phone, &password).await
        }
        Commands::Login { email } => {
            let password = SecretReader::stdin().read("Password")?;
            commands::account::login(state, &email, &password).await
        }
        Commands::Logout => commands::account::logout(state).await,
        Commands::Whoami => commands::account::whoami(state).await,
        Commands::Profile { name, phone } => {
            commands::account::update_profile(state, name, phone).await
        }
        Commands::ChangeEmail { new_email } => {
            commands::account::change_email(state, &new_email).await
        }
        Commands::ChangePassword => {
            let (current, new) = {
                let mut reader = SecretReader::stdin();
                (reader.read("Current password")?, reader.read("New password")?)
            };
            commands::account::change_password(state, &current, &new).await
        }
        Commands::Book {
            service,
            province,
            at,
            notes,
        } => commands::booking::book(state, &service, &province, &at, notes).await,
        Commands::Cancel { id } => commands::booking::cancel(state, &id).await,
        Commands::Bookings { all } => commands::booking::list(state, all).await,
        Commands::Notifications => commands::booking::notifications(state).await,
        Commands::Categories => commands::booking::categories(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_targets_app_and_cli_crates() {
        let filter = tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("homeservice_app=info"));
        assert!(rendered.contains("homeservice_cli=info"));
    }

    #[test]
    fn test_password_flags_are_rejected() {
        let parsed = Cli::try_parse_from(["hs-cli", "login", "-e", "ada@example.com", "--password", "x"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["hs-cli", "login", "-e", "ada@example.com"]);
        assert!(parsed.is_ok());
    }
}
