//! `brainstorm-buddy` binary: HTTP API, one-shot generation, and a terminal UI.

mod clipboard;
mod generate;
mod interactive;
mod provider;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use brainstorm_buddy::config::BuddyConfig;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "brainstorm-buddy")]
#[command(version)]
#[command(about = "Turn a startup idea into a GTM strategy, feature roadmap, and SWOT analysis", long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to ./brainstorm-buddy.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Generate a strategy once and print it
    #[clap(visible_alias = "g")]
    Generate(generate::GenerateArgs),
    /// Interactive terminal session
    #[clap(visible_alias = "i")]
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = BuddyConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    brainstorm_buddy::telemetry::init(&config.telemetry.filter)?;

    let actions = provider::build_actions(&config)?;
    info!(provider = %config.provider.kind, "brainstorm buddy starting");

    match cli.command {
        Commands::Serve { bind } => {
            server::serve(bind.unwrap_or(config.server.bind), Arc::new(actions)).await
        }
        Commands::Generate(args) => generate::run(&actions, args).await,
        Commands::Interactive => interactive::run(&actions).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_bind_override() {
        let cli = Cli::try_parse_from(["brainstorm-buddy", "serve", "--bind", "0.0.0.0:8080"])
            .unwrap();
        match cli.command {
            Commands::Serve { bind } => {
                assert_eq!(bind, Some("0.0.0.0:8080".parse().unwrap()));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "brainstorm-buddy",
            "interactive",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Interactive));
    }
}
