//! Core types, configuration, and error handling for critic.
//!
//! This crate provides the shared foundation used by the review crate and the binary:
//! - [`CriticError`]: unified error type using `thiserror`
//! - [`CriticConfig`]: configuration read from environment variables
//! - Shared types: [`RepoRef`], [`CommitFileRef`], [`ReviewEntry`]

mod config;
mod error;
mod types;

pub use config::{CriticConfig, GitHubConfig, ReviewLimits, VertexConfig};
pub use error::CriticError;
pub use types::{CommitFileRef, RepoRef, ReviewEntry};

/// A convenience `Result` type for critic operations.
pub type Result<T> = std::result::Result<T, CriticError>;
