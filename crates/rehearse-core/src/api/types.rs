//! Reply and request shapes for the plain endpoints
//!
//! These mirror what the backend actually sends; the schemas are owned by
//! the backend, not by this crate.

use serde::{Deserialize, Serialize};

/// Graded feedback on an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    /// Confidence rating out of 10
    pub confidence: f64,
    pub grammar: String,
    pub content_quality: String,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
}

/// Wire shape of `POST /api/feedback`
#[derive(Debug, Deserialize)]
pub(crate) struct GradeReply {
    pub reply: Feedback,
}

/// Wire shape of `GET /api/questions`
#[derive(Debug, Deserialize)]
pub(crate) struct QuestionsReply {
    #[serde(default)]
    pub questions: Vec<String>,
}

/// First question of a resume-driven interview
#[derive(Debug, Clone)]
pub struct InterviewOpening {
    pub question: String,
    /// Resume excerpts the question was drawn from
    pub docs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpeningWire {
    pub question: Option<OpeningQuestion>,
    #[serde(default)]
    pub docs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpeningQuestion {
    pub question: String,
}

/// One turn of the interview loop (`POST /new/search/answer`)
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum InterviewTurn {
    /// The interviewer follows up with another question
    #[serde(rename = "next_question")]
    NextQuestion {
        question: Option<String>,
        #[serde(default)]
        docs: Vec<String>,
    },
    /// The interview ended and the grade is in
    #[serde(rename = "feedback")]
    Feedback {
        #[serde(flatten)]
        feedback: Feedback,
    },
}

/// Wire shape of `POST /new/search/end`
#[derive(Debug, Deserialize)]
pub(crate) struct EndWire {
    pub feedback: Feedback,
}

/// Input for the voice Q&A endpoint: a typed question or recorded audio
#[derive(Debug, Clone)]
pub enum VoicePrompt {
    Question(String),
    Audio {
        base64data: String,
        mime_type: String,
    },
}

/// Decoded reply from the voice Q&A endpoint
#[derive(Debug, Clone)]
pub struct VoiceReply {
    pub answer: String,
    pub audio: Option<VoiceAudio>,
}

/// Synthesized speech for the answer
#[derive(Debug, Clone)]
pub struct VoiceAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoiceWire {
    #[serde(default)]
    pub answer: String,
    pub audio_base64: Option<String>,
    pub mime_type: Option<String>,
    pub error: Option<String>,
}
