//! Voice Q&A

use std::path::PathBuf;

use anyhow::{Context, Result};
use rehearse_core::api::{ApiClient, VoicePrompt};
use rehearse_core::Config;

pub async fn run(config: &Config, question: String, save: Option<PathBuf>) -> Result<()> {
    let client = ApiClient::new(config)?;
    let reply = client
        .ask_voice(VoicePrompt::Question(question))
        .await
        .context("voice request failed")?;

    println!("{}", reply.answer);
    match (reply.audio, save) {
        (Some(audio), Some(path)) => {
            tokio::fs::write(&path, &audio.bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved {} audio to {}", audio.mime_type, path.display());
        }
        (Some(audio), None) => {
            eprintln!(
                "(synthesized {} audio available; pass --save to keep it)",
                audio.mime_type
            );
        }
        (None, Some(_)) => eprintln!("No audio in the reply."),
        (None, None) => {}
    }
    Ok(())
}
