//! One-shot answer grading

use tracing::debug;

use super::client::ApiClient;
use super::types::{Feedback, GradeReply};
use crate::error::ApiError;

impl ApiClient {
    /// Submit an answer to a question and get graded feedback
    pub async fn grade_answer(&self, question: &str, answer: &str) -> Result<Feedback, ApiError> {
        let body = serde_json::json!({
            "question": question,
            "answer": answer,
        });
        debug!("Grading answer ({} chars)", answer.len());
        let response = self.post("/api/feedback").json(&body).send().await?;
        let response = self.handle_error_response(response)?;
        let reply: GradeReply = response.json().await?;
        Ok(reply.reply)
    }
}
