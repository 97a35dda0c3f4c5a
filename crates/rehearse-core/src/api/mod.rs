//! Typed clients for the plain request/response endpoints
//!
//! Question listing, answer grading, the resume-driven interview flow,
//! resume upload and voice Q&A. These are opaque collaborators: plain JSON
//! or multipart, no special framing, no retries.

mod client;
mod feedback;
mod interview;
mod questions;
mod resume;
mod types;
mod voice;

pub use client::ApiClient;
pub use types::{
    Feedback, InterviewOpening, InterviewTurn, VoiceAudio, VoicePrompt, VoiceReply,
};
