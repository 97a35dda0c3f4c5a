//! Practice question listing

use anyhow::{Context, Result};
use rehearse_core::api::ApiClient;
use rehearse_core::Config;

pub async fn run(config: &Config) -> Result<()> {
    let client = ApiClient::new(config)?;
    let questions = client
        .list_questions()
        .await
        .context("failed to fetch questions")?;

    if questions.is_empty() {
        println!("No practice questions available.");
        return Ok(());
    }
    println!("Choose a question:");
    for (index, question) in questions.iter().enumerate() {
        println!("{:>3}. {}", index + 1, question);
    }
    Ok(())
}
