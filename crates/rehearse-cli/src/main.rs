//! Rehearse - mock interview practice from your terminal

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rehearse_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rehearse",
    version,
    about = "Mock interview practice from your terminal"
)]
struct Cli {
    /// Backend base URL (overrides config file and environment)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream an answer to one interview question
    Chat {
        /// The question to ask
        question: String,
        /// Attach an image (png, jpeg, gif or webp)
        #[arg(long)]
        image: Option<PathBuf>,
        /// Milliseconds between displayed words
        #[arg(long)]
        word_delay_ms: Option<u64>,
    },
    /// List the practice question bank
    Questions,
    /// Grade a written answer to a question
    Grade {
        /// The question that was asked
        question: String,
        /// Your answer
        #[arg(long)]
        answer: String,
    },
    /// Run a resume-driven practice interview
    Practice {
        /// Resume to interview against (pdf, doc or docx)
        #[arg(long)]
        resume: PathBuf,
    },
    /// Ask one question over the voice endpoint
    Voice {
        /// The question to ask
        question: String,
        /// Write the synthesized audio to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    match cli.command {
        Command::Chat {
            question,
            image,
            word_delay_ms,
        } => commands::chat::run(config, question, image, word_delay_ms).await,
        Command::Questions => commands::questions::run(&config).await,
        Command::Grade { question, answer } => {
            commands::grade::run(&config, &question, &answer).await
        }
        Command::Practice { resume } => commands::practice::run(&config, &resume).await,
        Command::Voice { question, save } => commands::voice::run(&config, question, save).await,
    }
}
