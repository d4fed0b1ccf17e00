use std::time::Duration;

use critic_core::{CommitFileRef, CriticError, GitHubConfig, RepoRef};
use octocrab::service::middleware::retry::RetryConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

/// Timeout applied to every informational read (API lookups and raw content).
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub client for resolving commits, fetching changed files, and posting
/// commit comments.
///
/// Reads go through a plain HTTP client with a 30 second timeout; the comment
/// post goes through octocrab with no timeout and retries disabled.
///
/// # Examples
///
/// ```no_run
/// use critic_core::GitHubConfig;
/// use critic_review::github::GitHubClient;
///
/// # async fn example() {
/// let client = GitHubClient::new(&GitHubConfig::default()).unwrap();
/// # }
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: Option<String>,
    api_url: String,
    raw_url: String,
}

#[derive(Deserialize)]
struct RepositoryResponse {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: Option<String>,
    #[serde(default)]
    files: Vec<CommitFileEntry>,
}

#[derive(Deserialize)]
struct CommitFileEntry {
    filename: Option<String>,
    raw_url: Option<String>,
    blob_url: Option<String>,
    contents_url: Option<String>,
}

impl CommitFileEntry {
    fn into_file_ref(self) -> Option<CommitFileRef> {
        let non_empty = |s: Option<String>| s.filter(|v| !v.is_empty());
        let filename = non_empty(self.filename)?;
        let raw_url = non_empty(self.raw_url)
            .or_else(|| non_empty(self.blob_url))
            .or_else(|| non_empty(self.contents_url));
        Some(CommitFileRef { filename, raw_url })
    }
}

impl GitHubClient {
    /// Create a client from the GitHub section of the configuration.
    ///
    /// A missing token is allowed; requests are then sent unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] if the API URL is invalid or either
    /// underlying client cannot be built.
    pub fn new(config: &GitHubConfig) -> Result<Self, CriticError> {
        let mut builder = octocrab::Octocrab::builder()
            .base_uri(config.api_url.as_str())
            .map_err(|e| CriticError::Config(format!("invalid GitHub API URL: {e}")))?
            .add_retry_config(RetryConfig::None);
        if let Some(token) = &config.token {
            builder = builder.personal_token(token.clone());
        }
        let octocrab = builder
            .build()
            .map_err(|e| CriticError::Config(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent("critic")
            .timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| CriticError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            octocrab,
            http,
            token: config.token.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            raw_url: config.raw_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
            None => request,
        }
    }

    /// GET an API resource, treating anything but 200 as a failure.
    async fn get_api<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CriticError> {
        let response = self
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(CriticError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET a raw file body, treating anything but 200 as a failure.
    async fn get_text(&self, url: &str) -> Result<String, CriticError> {
        let response = self.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(CriticError::Status {
                status,
                body: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Look up the repository's default branch.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Status`] on a non-200 status, or
    /// [`CriticError::GitHub`] when the response names no default branch.
    pub async fn default_branch(&self, repo: &RepoRef) -> Result<String, CriticError> {
        let url = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.repo);
        let info: RepositoryResponse = self.get_api(&url).await?;
        info.default_branch
            .filter(|b| !b.is_empty())
            .ok_or_else(|| CriticError::GitHub(format!("{repo} reports no default branch")))
    }

    /// Look up the sha of the latest commit on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Status`] on a non-200 status, or
    /// [`CriticError::GitHub`] on a missing sha.
    pub async fn branch_head_sha(
        &self,
        repo: &RepoRef,
        branch: &str,
    ) -> Result<String, CriticError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{branch}",
            self.api_url, repo.owner, repo.repo
        );
        let commit: CommitResponse = self.get_api(&url).await?;
        commit
            .sha
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CriticError::GitHub(format!("no sha for {repo}@{branch}")))
    }

    /// Return `explicit` if given, otherwise the head of the default branch.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the two lookups.
    pub async fn resolve_commit(
        &self,
        repo: &RepoRef,
        explicit: Option<&str>,
    ) -> Result<String, CriticError> {
        if let Some(sha) = explicit {
            return Ok(sha.to_string());
        }
        tracing::info!("GITHUB_SHA not set. Try to get latest commit of default branch");
        let branch = self.default_branch(repo).await?;
        debug!(%repo, %branch, "resolved default branch");
        self.branch_head_sha(repo, &branch).await
    }

    /// List the files changed by commit `sha`, in API order.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Status`] with status and body on a non-200
    /// response, or a transport/decoding error.
    pub async fn list_commit_files(
        &self,
        repo: &RepoRef,
        sha: &str,
    ) -> Result<Vec<CommitFileRef>, CriticError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{sha}",
            self.api_url, repo.owner, repo.repo
        );
        let commit: CommitResponse = self.get_api(&url).await?;
        Ok(commit
            .files
            .into_iter()
            .filter_map(CommitFileEntry::into_file_ref)
            .collect())
    }

    /// Raw-content URL used when the listed locator cannot be fetched.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use critic_core::{GitHubConfig, RepoRef};
    /// use critic_review::github::GitHubClient;
    ///
    /// let client = GitHubClient::new(&GitHubConfig::default()).unwrap();
    /// let repo: RepoRef = "o/r".parse().unwrap();
    /// assert_eq!(
    ///     client.fallback_raw_url(&repo, "abc", "src/lib.rs"),
    ///     "https://raw.githubusercontent.com/o/r/abc/src/lib.rs"
    /// );
    /// ```
    pub fn fallback_raw_url(&self, repo: &RepoRef, sha: &str, path: &str) -> String {
        format!("{}/{}/{}/{sha}/{path}", self.raw_url, repo.owner, repo.repo)
    }

    /// Fetch the content of `file` at commit `sha`.
    ///
    /// Tries the listed locator first when it is an http(s) URL, then the
    /// templated raw-content URL.
    ///
    /// # Errors
    ///
    /// Returns the fallback attempt's error when both attempts fail.
    pub async fn fetch_file_content(
        &self,
        repo: &RepoRef,
        sha: &str,
        file: &CommitFileRef,
    ) -> Result<String, CriticError> {
        if let Some(url) = file.raw_url.as_deref().filter(|u| u.starts_with("http")) {
            match self.get_text(url).await {
                Ok(text) => return Ok(text),
                Err(e) => warn!(%url, error = %e, "Failed to fetch from raw_url"),
            }
        }

        let fallback = self.fallback_raw_url(repo, sha, &file.filename);
        self.get_text(&fallback).await.inspect_err(|e| {
            warn!(path = %file.filename, error = %e, "Fallback raw fetch failed");
        })
    }

    /// Post `body` as a comment on commit `sha`.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::GitHub`] on any API error. Never retried.
    pub async fn post_commit_comment(
        &self,
        repo: &RepoRef,
        sha: &str,
        body: &str,
    ) -> Result<(), CriticError> {
        let route = format!("/repos/{}/{}/commits/{sha}/comments", repo.owner, repo.repo);
        let payload = serde_json::json!({ "body": body });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| CriticError::GitHub(format!("failed to post comment: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(raw: Option<&str>, blob: Option<&str>, contents: Option<&str>) -> CommitFileEntry {
        CommitFileEntry {
            filename: Some("src/lib.rs".into()),
            raw_url: raw.map(Into::into),
            blob_url: blob.map(Into::into),
            contents_url: contents.map(Into::into),
        }
    }

    #[test]
    fn raw_url_is_preferred() {
        let file = entry(Some("https://raw"), Some("https://blob"), Some("https://contents"))
            .into_file_ref()
            .unwrap();
        assert_eq!(file.raw_url.as_deref(), Some("https://raw"));
    }

    #[test]
    fn blob_url_used_without_raw_url() {
        let file = entry(None, Some("https://blob"), Some("https://contents"))
            .into_file_ref()
            .unwrap();
        assert_eq!(file.raw_url.as_deref(), Some("https://blob"));
    }

    #[test]
    fn contents_url_is_last_resort() {
        let file = entry(Some(""), None, Some("https://contents"))
            .into_file_ref()
            .unwrap();
        assert_eq!(file.raw_url.as_deref(), Some("https://contents"));
    }

    #[test]
    fn no_locator_at_all() {
        let file = entry(None, None, None).into_file_ref().unwrap();
        assert_eq!(file.filename, "src/lib.rs");
        assert!(file.raw_url.is_none());
    }

    #[test]
    fn entry_without_filename_is_dropped() {
        let mut e = entry(Some("https://raw"), None, None);
        e.filename = None;
        assert!(e.into_file_ref().is_none());
    }

    #[test]
    fn commit_response_tolerates_missing_files() {
        let commit: CommitResponse = serde_json::from_str(r#"{"sha":"abc"}"#).unwrap();
        assert_eq!(commit.sha.as_deref(), Some("abc"));
        assert!(commit.files.is_empty());
    }

    #[tokio::test]
    async fn fallback_url_template() {
        let config = GitHubConfig {
            raw_url: "https://raw.example.com/".into(),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::new(&config).unwrap();
        let repo: RepoRef = "octo/cat".parse().unwrap();
        assert_eq!(
            client.fallback_raw_url(&repo, "deadbeef", "dir/file.py"),
            "https://raw.example.com/octo/cat/deadbeef/dir/file.py"
        );
    }
}
