//! rosterlink - record lookup desk with exclusive account binding
//!
//! `serve` reads chat messages from stdin, one per line, as
//! `<requester_id> <text>`, and writes replies to stdout prefixed with the
//! recipient. `exec` runs a single message and exits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rosterlink_cli::ChatHandler;
use rosterlink_core::{RequesterId, RosterConfig};
use rosterlink_effects::ProductionEffects;
use rosterlink_registry::{RegistryService, ServiceSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rosterlink")]
#[command(about = "Record lookup desk with exclusive account binding", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "rosterlink.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve chat messages read from stdin
    Serve,

    /// Handle one chat message and exit
    Exec {
        /// Sender of the message; defaults to the bootstrap admin
        #[arg(long = "as")]
        requester: Option<i64>,

        /// Message text, e.g. `/stats`
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RosterConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let effects = Arc::new(ProductionEffects::from_config(&config));
    let service = RegistryService::initialize(
        effects,
        config.bootstrap_admin,
        ServiceSettings::from_config(&config),
    )
    .await
    .context("loading registry state")?;
    let handler = ChatHandler::new(Arc::new(service));

    match cli.command {
        Commands::Serve => serve(&handler).await?,
        Commands::Exec { requester, text } => {
            let from = requester.map_or(config.bootstrap_admin, RequesterId::new);
            handler.respond(from, &text.join(" ")).await;
        }
    }

    Ok(())
}

async fn serve(handler: &ChatHandler<ProductionEffects>) -> Result<()> {
    tracing::info!("rosterlink serving on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            tracing::info!("stdin closed, shutting down");
            break;
        };

        match parse_line(&line) {
            Some((from, text)) => handler.respond(from, text).await,
            None if line.trim().is_empty() => {}
            None => tracing::warn!(line = %line, "expected `<requester_id> <text>`"),
        }
    }
    Ok(())
}

fn parse_line(line: &str) -> Option<(RequesterId, &str)> {
    let (id, text) = line.trim().split_once(char::is_whitespace)?;
    Some((id.parse().ok()?, text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_lines_split_sender_from_text() {
        assert_eq!(
            parse_line("  42 /result 1001 "),
            Some((RequesterId::new(42), "/result 1001"))
        );
        assert_eq!(parse_line("bob hello"), None);
        assert_eq!(parse_line("42"), None);
    }
}
