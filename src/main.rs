use folio_assist::cli;
use folio_assist::config::Config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Portfolio backend with an AI assistant")]
struct Cli {
    /// Path to configuration file (default: ./config.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Send a single message to the assistant and print the reply
    Chat {
        /// Message to send
        message: String,
    },
    /// Ask the assistant for project suggestions
    Suggest {
        /// Free-text project description
        description: String,
    },
    /// List Gemini models that support generateContent
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    folio_assist::logs::init()?;

    let cli = Cli::parse();
    let cfg = Config::resolve(cli.config.as_deref()).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve(&cfg).await,
        Command::Chat { message } => cli::chat(&cfg, &message).await,
        Command::Suggest { description } => cli::suggest(&cfg, &description).await,
        Command::Models => cli::models(&cfg).await,
    }
}
