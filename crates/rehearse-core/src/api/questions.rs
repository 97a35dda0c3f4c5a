//! Practice question bank

use super::client::ApiClient;
use super::types::QuestionsReply;
use crate::error::ApiError;

impl ApiClient {
    /// Fetch the list of practice questions
    pub async fn list_questions(&self) -> Result<Vec<String>, ApiError> {
        let response = self.get("/api/questions").send().await?;
        let response = self.handle_error_response(response)?;
        let reply: QuestionsReply = response.json().await?;
        Ok(reply.questions)
    }
}
