//! AI enrichment of ideas: prompt, upstream call, parsing, persistence and background jobs.

pub mod comment;
pub mod gemini;
pub mod jobs;
pub mod parse;
pub mod prompt;
pub mod service;

use std::future::Future;

use crate::errors::AppError;

/// A text-generation backend. The production implementation is [`gemini::GeminiClient`].
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the raw response text.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

pub use gemini::GeminiClient;
pub use jobs::{AnalysisJobs, JobState};
pub use service::analyze_idea;
