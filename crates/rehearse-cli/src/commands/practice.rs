//! Interactive resume-driven interview
//!
//! Uploads the resume, then walks the backend's interview loop over stdin
//! until the interviewer ends it or the user types `/end`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rehearse_core::api::{ApiClient, InterviewTurn};
use rehearse_core::Config;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config: &Config, resume: &Path) -> Result<()> {
    let client = ApiClient::new(config)?;

    println!("Analyzing your resume...");
    client
        .upload_resume(resume)
        .await
        .context("failed to upload resume")?;

    let opening = client
        .start_interview()
        .await
        .context("failed to start interview")?;
    print_question(&opening.question, &opening.docs);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break; // EOF ends the interview
        };
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        if answer == "/end" {
            break;
        }

        match client
            .submit_answer(answer)
            .await
            .context("failed to submit answer")?
        {
            InterviewTurn::NextQuestion { question, docs } => {
                if let Some(question) = question {
                    print_question(&question, &docs);
                } else {
                    print_docs(&docs);
                }
            }
            InterviewTurn::Feedback { feedback } => {
                println!("Interview ended. See feedback below.");
                super::print_feedback(&feedback);
                return Ok(());
            }
        }
    }

    let feedback = client
        .end_interview()
        .await
        .context("failed to end interview")?;
    println!("Interview ended. See feedback below.");
    super::print_feedback(&feedback);
    Ok(())
}

fn print_question(question: &str, docs: &[String]) {
    println!();
    println!("Interviewer: {}", question);
    print_docs(docs);
}

fn print_docs(docs: &[String]) {
    if docs.is_empty() {
        return;
    }
    println!("Related info:");
    for doc in docs {
        println!("  {}", doc);
    }
}
