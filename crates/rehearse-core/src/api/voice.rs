//! Voice Q&A
//!
//! One question (typed or recorded) in, one answer out, optionally with
//! synthesized speech. Unlike the streaming endpoint, an `error` field here
//! rides on a plain 200 reply.

use base64::Engine;

use super::client::ApiClient;
use super::types::{VoiceAudio, VoicePrompt, VoiceReply, VoiceWire};
use crate::error::ApiError;

impl ApiClient {
    /// Ask a question over the voice endpoint
    pub async fn ask_voice(&self, prompt: VoicePrompt) -> Result<VoiceReply, ApiError> {
        let body = match prompt {
            VoicePrompt::Question(question) => serde_json::json!({ "question": question }),
            VoicePrompt::Audio {
                base64data,
                mime_type,
            } => serde_json::json!({
                "base64data": base64data,
                "mimeType": mime_type,
            }),
        };
        let response = self.post("/voice/getVoice").json(&body).send().await?;
        let response = self.handle_error_response(response)?;
        let wire: VoiceWire = response.json().await?;

        if let Some(message) = wire.error {
            return Err(ApiError::Backend(message));
        }
        let audio = match (wire.audio_base64, wire.mime_type) {
            (Some(encoded), Some(mime_type)) => Some(VoiceAudio {
                bytes: base64::engine::general_purpose::STANDARD.decode(encoded.as_bytes())?,
                mime_type,
            }),
            _ => None,
        };
        Ok(VoiceReply {
            answer: wire.answer,
            audio,
        })
    }
}
