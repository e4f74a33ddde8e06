//! Sockden - Standalone SOCKS5 Proxy Server
//!
//! This is the main entry point for the Sockden application.

use anyhow::Result;
use clap::Parser;
use sockden::config::{load_config, Config};
use sockden::{AuthMethod, Socks5Server};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Sockden - standalone SOCKS5 proxy server
#[derive(Parser, Debug)]
#[command(name = "sockden")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address override, e.g. 0.0.0.0:1080
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    // Load configuration
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    config.validate()?;

    info!("Sockden v{}", sockden::VERSION);
    if let Some(path) = &args.config {
        info!("Configuration loaded from: {:?}", path);
    }
    info!("Bind address: {}", config.server.bind_addr);

    let mut server = Socks5Server::new(config.server.clone());
    if config.server.auth == AuthMethod::Password {
        server = server.with_password_checker(config.password_checker());
    }

    // Serve until a fatal error or a termination signal
    tokio::select! {
        result = server.run() => {
            result?;
            Ok(())
        }
        _ = shutdown_signal() => {
            info!("Shutting down...");
            Ok(())
        }
    }
}

/// Wait for Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
        }
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C");
    }
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
