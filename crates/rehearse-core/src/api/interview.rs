//! Resume-driven interview flow
//!
//! The backend keeps the interview state; the client just walks
//! `/new/search/start` -> `/new/search/answer`* -> `/new/search/end`.
//! All three require a bearer token.

use tracing::info;

use super::client::ApiClient;
use super::types::{EndWire, Feedback, InterviewOpening, InterviewTurn, OpeningWire};
use crate::error::ApiError;

impl ApiClient {
    /// Open an interview against the previously uploaded resume
    pub async fn start_interview(&self) -> Result<InterviewOpening, ApiError> {
        let request = self.authed(self.post("/new/search/start")).await?;
        let response = request.json(&serde_json::json!({})).send().await?;
        let response = self.handle_error_response(response)?;
        let wire: OpeningWire = response.json().await?;
        info!("Interview started");
        Ok(InterviewOpening {
            question: wire.question.map(|q| q.question).unwrap_or_default(),
            docs: wire.docs,
        })
    }

    /// Send one answer; the backend replies with a follow-up or the grade
    pub async fn submit_answer(&self, answer: &str) -> Result<InterviewTurn, ApiError> {
        let body = serde_json::json!({ "answer": answer });
        let request = self.authed(self.post("/new/search/answer")).await?;
        let response = request.json(&body).send().await?;
        let response = self.handle_error_response(response)?;
        Ok(response.json().await?)
    }

    /// End the interview early and collect the grade so far
    pub async fn end_interview(&self) -> Result<Feedback, ApiError> {
        let request = self.authed(self.post("/new/search/end")).await?;
        let response = request.send().await?;
        let response = self.handle_error_response(response)?;
        let wire: EndWire = response.json().await?;
        info!("Interview ended");
        Ok(wire.feedback)
    }
}
