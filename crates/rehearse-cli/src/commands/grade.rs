//! One-shot answer grading

use anyhow::{Context, Result};
use rehearse_core::api::ApiClient;
use rehearse_core::Config;

pub async fn run(config: &Config, question: &str, answer: &str) -> Result<()> {
    let client = ApiClient::new(config)?;
    let feedback = client
        .grade_answer(question, answer)
        .await
        .context("failed to grade answer")?;
    println!("{}", question);
    super::print_feedback(&feedback);
    Ok(())
}
