//! Subcommand implementations, one per page of the product

pub mod chat;
pub mod grade;
pub mod practice;
pub mod questions;
pub mod voice;

use rehearse_core::api::Feedback;

/// Render a feedback card
pub fn print_feedback(feedback: &Feedback) {
    println!();
    println!("Confidence:      {}/10", feedback.confidence);
    println!("Grammar:         {}", feedback.grammar);
    println!("Content quality: {}", feedback.content_quality);
    if !feedback.improvement_suggestions.is_empty() {
        println!("Suggestions:");
        for suggestion in &feedback.improvement_suggestions {
            println!("  - {}", suggestion);
        }
    }
}
