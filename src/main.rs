//! # Amon Link
//!
//! Command-line front-end for the Amon link protocol engine.
//!
//! ```bash
//! amon-link ports
//! amon-link --port /dev/ttyUSB0 ping
//! amon-link --config config/default.toml pair
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use amon_link::config::Config;
use amon_link::journal::FrameJournal;
use amon_link::serial::TokioSerialConnector;
use amon_link::session::{LinkSession, SessionConfig};

/// Amon link host tool
#[derive(Parser, Debug)]
#[command(name = "amon-link")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults are used when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port, overriding the configuration
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate, overriding the configuration
    #[arg(short, long)]
    baud: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available serial ports
    Ports,
    /// Ping the drone
    Ping,
    /// Run the pairing handshake
    Pair,
}

fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("amon_link={}", config.logging.level)));

    match &config.logging.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "amon-link.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(port) = &cli.port {
        config.serial.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let _guard = init_logging(&config);

    info!("Amon Link v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut session = LinkSession::new(TokioSerialConnector::new(), SessionConfig::from(&config));
    if let Some(path) = &config.logging.journal_path {
        let journal = FrameJournal::open(path)
            .with_context(|| format!("failed to open journal {}", path.display()))?;
        session = session.with_journal(journal);
    }

    if let Command::Ports = cli.command {
        for port in session.list_ports()? {
            println!("{}", port);
        }
        return Ok(());
    }

    session.connect(&config.serial.port, config.serial.baud_rate)?;

    let outcome = match cli.command {
        Command::Ping => session.ping().await.map(|reply| {
            println!("pong (ack: {})", reply.ack);
        }),
        Command::Pair => session.pair().await.map(|()| {
            println!("paired");
        }),
        Command::Ports => Ok(()),
    };

    session.disconnect();

    if let Err(e) = outcome {
        error!("{:?}: {}", e.kind(), e);
        return Err(e.into());
    }
    Ok(())
}
