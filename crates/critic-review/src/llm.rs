use std::time::Duration;

use critic_core::{CriticError, VertexConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Vertex AI `generateContent` request body.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Client for Vertex AI publisher models (Gemini).
///
/// Authenticates with a bearer token taken from the configuration or, when
/// none is configured, from the GCE metadata server. A metadata token is
/// requested once per client and reused for every file of the run.
///
/// # Examples
///
/// ```
/// use critic_core::VertexConfig;
/// use critic_review::llm::VertexClient;
///
/// let client = VertexClient::new(&VertexConfig::default()).unwrap();
/// assert_eq!(client.model(), "gemini-2.5-flash");
/// ```
pub struct VertexClient {
    client: reqwest::Client,
    config: VertexConfig,
    metadata_url: String,
    metadata_token: OnceCell<String>,
}

impl VertexClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &VertexConfig) -> Result<Self, CriticError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CriticError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            metadata_url: METADATA_TOKEN_URL.to_string(),
            metadata_token: OnceCell::new(),
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn generate_url(&self, project: &str) -> String {
        format!(
            "{}/v1/projects/{project}/locations/{}/publishers/google/models/{}:generateContent",
            self.config.base_url(),
            self.config.location,
            self.config.model
        )
    }

    async fn access_token(&self) -> Result<String, CriticError> {
        if let Some(token) = &self.config.access_token {
            return Ok(token.clone());
        }
        self.metadata_token
            .get_or_try_init(|| self.fetch_metadata_token())
            .await
            .cloned()
    }

    async fn fetch_metadata_token(&self) -> Result<String, CriticError> {
        let response = self
            .client
            .get(&self.metadata_url)
            .header("Metadata-Flavor", "Google")
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| {
                CriticError::Config(format!(
                    "no GCP_ACCESS_TOKEN and metadata server unreachable: {e}"
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CriticError::Config(format!(
                "metadata server returned {status} for access token"
            )));
        }

        let token: MetadataToken = response.json().await?;
        Ok(token.access_token)
    }

    /// Send a single-turn prompt and return the model's text.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] when the project or credentials are
    /// missing, and [`CriticError::Llm`] on HTTP errors or bad responses.
    pub async fn generate(&self, prompt: &str) -> Result<String, CriticError> {
        let project = self
            .config
            .project_id
            .as_deref()
            .ok_or_else(|| CriticError::Config("GCP_PROJECT_ID not set".into()))?;
        let token = self.access_token().await?;

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url(project))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CriticError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CriticError::Llm(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(CriticError::Llm(format!("Vertex AI API error {status}: {text}")));
        }

        extract_text(&text)
    }
}

/// Join the text parts of the first candidate; fall back to the raw body.
fn extract_text(body: &str) -> Result<String, CriticError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CriticError::Llm(format!("failed to parse response: {e}")))?;

    let joined: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if joined.is_empty() {
        Ok(body.to_string())
    } else {
        Ok(joined)
    }
}
