/// Errors that can occur while reviewing a commit.
///
/// Every network-calling function returns this type; the pipeline inspects it
/// and decides whether to skip a step or degrade the output.
///
/// # Examples
///
/// ```
/// use critic_core::CriticError;
///
/// let err = CriticError::Config("GCP_PROJECT_ID not set".into());
/// assert!(err.to_string().contains("GCP_PROJECT_ID"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CriticError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// GitHub API returned an unexpected status or payload.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// An HTTP endpoint answered with a status other than the expected one.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// Status line returned by the server.
        status: reqwest::StatusCode,
        /// Response body, or the requested URL when the body is not useful.
        body: String,
    },

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generative model API or response error.
    #[error("model error: {0}")]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
