//! Zentinel OpenID Session Tool
//!
//! Operator CLI for the OpenID relay session store: inspect, write and
//! delete sessions, build cookie values, and run the expiry sweeper.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use zentinel_openid_session::cookie::make_cookie_value;
use zentinel_openid_session::session::{new_session_id, spawn_cleanup_task, SessionLookup};
use zentinel_openid_session::{SessionConfig, SessionConfigJson, SessionStore};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "zentinel-openid-session")]
#[command(about = "Session store tool for the Zentinel OpenID relay")]
struct Args {
    /// JSON config file (kebab-case keys)
    #[arg(long, env = "OPENID_SESSION_CONFIG")]
    config: Option<PathBuf>,

    /// Session store path (overrides config)
    #[arg(long, env = "OPENID_SESSION_STORE_PATH")]
    store: Option<PathBuf>,

    /// Session TTL in seconds (overrides config)
    #[arg(long, env = "OPENID_SESSION_TTL")]
    ttl: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, env = "OPENID_SESSION_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the session stored for a token
    Get { session_id: String },

    /// Store a session (a new token is generated when --id is omitted)
    Put {
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value = "/")]
        path: String,
        #[arg(long, default_value = "")]
        identity: String,
        #[arg(long)]
        server: String,
    },

    /// Delete the session for a token
    Delete { session_id: String },

    /// Print the number of stored sessions
    Count,

    /// Evict expired sessions once
    Sweep,

    /// Print the Set-Cookie value for a token
    Cookie { session_id: String },

    /// Run the expiry sweeper until interrupted
    Serve,
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = SessionConfig::default();

    if let Some(ref file) = args.config {
        let raw = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read config file: {:?}", file))?;
        let overlay: SessionConfigJson = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {:?}", file))?;
        overlay.apply_to(&mut config);
    }
    if let Some(ref store) = args.store {
        config.store_path = store.display().to_string();
    }
    if let Some(ttl) = args.ttl {
        config.session_ttl_secs = ttl;
    }

    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn open_store(config: &SessionConfig) -> Result<SessionStore> {
    SessionStore::open(&config.store_path, config.session_ttl_secs).map_err(|e| {
        warn!(error = %e, path = %config.store_path, "Failed to open session store");
        anyhow!(e)
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = load_config(&args)?;

    if let Command::Cookie { ref session_id } = args.command {
        println!(
            "{}",
            make_cookie_value(
                &config.cookie_name,
                session_id,
                &config.cookie_path,
                config.cookie_lifespan_secs
            )
        );
        return Ok(());
    }

    let store = open_store(&config)?;

    match args.command {
        Command::Get { session_id } => match store.lookup(&session_id)? {
            SessionLookup::Active(record) => print_json(&record)?,
            SessionLookup::Expired(record) => {
                warn!(session_id = %session_id, expires_on = %record.expires_on, "Session expired");
                print_json(&record)?;
            }
            SessionLookup::Absent => {
                store.close();
                return Err(anyhow!("No session for {}", session_id));
            }
        },
        Command::Put {
            id,
            path,
            identity,
            server,
        } => {
            let session_id = id.unwrap_or_else(new_session_id);
            let record = store
                .put(&session_id, &path, &identity, &server)
                .context("Session not persisted")?;
            print_json(&record)?;
        }
        Command::Delete { session_id } => {
            let removed = store.delete(&session_id)?;
            info!(session_id = %session_id, removed, "Delete finished");
        }
        Command::Count => println!("{}", store.session_count()?),
        Command::Sweep => {
            let evicted = store.evict_expired()?;
            info!(evicted, "Sweep finished");
        }
        Command::Serve => {
            let store = Arc::new(store);
            info!(
                path = %config.store_path,
                interval_secs = config.cleanup_interval_secs,
                "Starting session cleanup task"
            );
            let handle = spawn_cleanup_task(Arc::clone(&store), config.cleanup_interval_secs);

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            handle.abort();
            let _ = handle.await;

            match Arc::try_unwrap(store) {
                Ok(store) => store.close(),
                Err(_) => warn!("Session store still shared at shutdown"),
            }
            return Ok(());
        }
        Command::Cookie { .. } => unreachable!("handled before opening the store"),
    }

    store.close();
    Ok(())
}
