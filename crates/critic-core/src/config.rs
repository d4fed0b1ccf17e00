use serde::Deserialize;

/// Top-level configuration, read once from the environment at process start.
///
/// Also deserializable from JSON or any other serde format; omitted
/// fields take the same defaults as unset environment variables.
///
/// # Examples
///
/// ```
/// use critic_core::CriticConfig;
///
/// let config = CriticConfig::from_lookup(|key| match key {
///     "GITHUB_REPOSITORY" => Some("octocat/hello-world".into()),
///     _ => None,
/// });
/// assert_eq!(config.github.repository.as_deref(), Some("octocat/hello-world"));
/// assert_eq!(config.vertex.location, "us-central1");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriticConfig {
    /// GitHub access and commit selection.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Vertex AI model settings.
    #[serde(default)]
    pub vertex: VertexConfig,
    /// Truncation thresholds.
    #[serde(default)]
    pub limits: ReviewLimits,
}

impl CriticConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github = GitHubConfig {
            token: var("GITHUB_TOKEN"),
            repository: var("GITHUB_REPOSITORY"),
            sha: var("GITHUB_SHA").or_else(|| var("COMMIT_SHA")),
            api_url: var("GITHUB_API_URL").unwrap_or_else(default_api_url),
            raw_url: var("GITHUB_RAW_URL").unwrap_or_else(default_raw_url),
        };

        let vertex = VertexConfig {
            project_id: var("GCP_PROJECT_ID"),
            location: var("GCP_LOCATION").unwrap_or_else(default_location),
            model: var("GCP_MODEL").unwrap_or_else(default_model),
            endpoint: var("GCP_API_ENDPOINT"),
            access_token: var("GCP_ACCESS_TOKEN"),
        };

        Self {
            github,
            vertex,
            limits: ReviewLimits::default(),
        }
    }
}

/// GitHub connection settings and the commit under review.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// Token sent as `Authorization: token <value>` when present.
    pub token: Option<String>,
    /// Repository identifier in `owner/repo` form.
    pub repository: Option<String>,
    /// Commit to review; the default branch head is used when absent.
    pub sha: Option<String>,
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base URL for the raw-content fallback.
    #[serde(default = "default_raw_url")]
    pub raw_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

fn default_raw_url() -> String {
    "https://raw.githubusercontent.com".into()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            sha: None,
            api_url: default_api_url(),
            raw_url: default_raw_url(),
        }
    }
}

/// Vertex AI generative model configuration.
///
/// # Examples
///
/// ```
/// use critic_core::VertexConfig;
///
/// let config = VertexConfig::default();
/// assert_eq!(config.model, "gemini-2.5-flash");
/// assert_eq!(config.base_url(), "https://us-central1-aiplatform.googleapis.com");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct VertexConfig {
    /// Google Cloud project that owns the Vertex AI quota.
    pub project_id: Option<String>,
    /// Vertex AI region.
    #[serde(default = "default_location")]
    pub location: String,
    /// Publisher model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Custom API endpoint, overriding the regional default.
    pub endpoint: Option<String>,
    /// OAuth bearer token. Falls back to the GCE metadata server when unset.
    pub access_token: Option<String>,
}

fn default_location() -> String {
    "us-central1".into()
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

impl VertexConfig {
    /// Base URL of the Vertex AI API for the configured location.
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None if self.location == "global" => "https://aiplatform.googleapis.com".into(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        }
    }
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: default_location(),
            model: default_model(),
            endpoint: None,
            access_token: None,
        }
    }
}

/// Character limits applied before review and before posting.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewLimits;
///
/// let limits = ReviewLimits::default();
/// assert_eq!(limits.max_file_chars, 25_000);
/// assert_eq!(limits.max_comment_chars, 64_000);
/// ```
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReviewLimits {
    /// File content is cut to this many characters before it reaches the model.
    #[serde(default = "default_max_file_chars")]
    pub max_file_chars: usize,
    /// The aggregated comment body is cut to this many characters.
    #[serde(default = "default_max_comment_chars")]
    pub max_comment_chars: usize,
}

fn default_max_file_chars() -> usize {
    25_000
}

fn default_max_comment_chars() -> usize {
    64_000
}

impl Default for ReviewLimits {
    fn default() -> Self {
        Self {
            max_file_chars: default_max_file_chars(),
            max_comment_chars: default_max_comment_chars(),
        }
    }
}
