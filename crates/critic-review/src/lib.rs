//! Commit review orchestration.
//!
//! Provides the review pipeline: GitHub client, Vertex AI client, prompt and
//! comment construction, and the sequential per-file review driver.

pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
