//! RustedRAG CLI: the main entry point.
//!
//! Commands:
//! - `ask`: Answer one question and exit
//! - `stream`: Answer one question, printing the answer as it arrives
//! - `chat`: Interactive multi-turn chat with memory
//! - `config`: Show, locate or initialize the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rustedrag",
    about = "RustedRAG — retrieval-augmented chat over a vector store",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ~/.rustedrag/config.toml)
    #[arg(long, global = true, env = "RUSTEDRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        #[arg(short, long)]
        message: String,
    },

    /// Answer a single question, streaming the answer
    Stream {
        /// The question to answer
        #[arg(short, long)]
        message: String,
    },

    /// Start an interactive chat session
    Chat,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (credential redacted)
    Show,
    /// Print the config file path
    Path,
    /// Write an example config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Ask { message } => commands::ask::run(config_path, &message).await?,
        Commands::Stream { message } => commands::stream::run(config_path, &message).await?,
        Commands::Chat => commands::chat::run(config_path).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(config_path).await?,
            ConfigAction::Init { force } => commands::config_cmd::init(config_path, force).await?,
        },
    }

    Ok(())
}
