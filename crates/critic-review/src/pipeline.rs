use critic_core::{CommitFileRef, CriticConfig, CriticError, RepoRef, ReviewEntry, ReviewLimits};
use tracing::{info, warn};

use crate::github::GitHubClient;
use crate::llm::VertexClient;
use crate::prompt;

/// How a review run ended.
///
/// Every variant is a normal termination; none of them is surfaced as a
/// process failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// `GITHUB_REPOSITORY` was missing or malformed.
    NoRepository,
    /// A client could not be constructed.
    SetupFailed {
        /// Why construction failed.
        reason: String,
    },
    /// No commit sha was configured and none could be resolved.
    NoCommit,
    /// The commit listing failed or listed no files.
    NoFiles,
    /// Files were listed but none could be fetched.
    NoReviews,
    /// A comment was posted.
    Posted {
        /// Number of per-file reviews in the comment.
        reviews: usize,
    },
    /// The comment post was rejected.
    PostFailed {
        /// Error reported by the GitHub API.
        reason: String,
    },
}

/// Text recorded in place of a review when the model call fails.
///
/// # Examples
///
/// ```
/// use critic_core::CriticError;
/// use critic_review::pipeline::model_failure_text;
///
/// let err = CriticError::Llm("quota exceeded".into());
/// assert_eq!(model_failure_text(&err), "GenAI model call failed: model error: quota exceeded");
/// ```
pub fn model_failure_text(err: &CriticError) -> String {
    format!("GenAI model call failed: {err}")
}

/// `<status> <body>` for a rejected request, the error's display otherwise.
fn status_and_body(err: &CriticError) -> String {
    match err {
        CriticError::Status { status, body } => format!("{status} {body}"),
        other => other.to_string(),
    }
}

/// Reviews a single commit: fetch, review file by file, post one comment.
pub struct CommitReviewer {
    github: GitHubClient,
    model: VertexClient,
    limits: ReviewLimits,
}

impl CommitReviewer {
    /// Create a reviewer from already-built clients.
    pub fn new(github: GitHubClient, model: VertexClient, limits: ReviewLimits) -> Self {
        Self {
            github,
            model,
            limits,
        }
    }

    /// Build both clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] or [`CriticError::Llm`] if a client
    /// cannot be created.
    pub fn from_config(config: &CriticConfig) -> Result<Self, CriticError> {
        let github = GitHubClient::new(&config.github)?;
        let model = VertexClient::new(&config.vertex)?;
        Ok(Self::new(github, model, config.limits))
    }

    /// Fetch and review one file.
    ///
    /// Returns `None` when no content could be obtained. A model failure is
    /// folded into the entry's text instead.
    pub async fn review_file(
        &self,
        repo: &RepoRef,
        sha: &str,
        file: &CommitFileRef,
    ) -> Option<ReviewEntry> {
        let content = match self.github.fetch_file_content(repo, sha, file).await {
            Ok(content) if !content.is_empty() => content,
            _ => {
                info!("Cannot fetch content for {}", file.filename);
                return None;
            }
        };
        let content = prompt::truncate_with_marker(content, self.limits.max_file_chars);

        let review_prompt = prompt::build_review_prompt(&file.filename, &content);
        let review_text = match self.model.generate(&review_prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %file.filename, error = %e, "model call failed");
                model_failure_text(&e)
            }
        };

        Some(ReviewEntry {
            filename: file.filename.clone(),
            review_text,
        })
    }

    /// Review every file of commit `sha` in listed order and post the result.
    pub async fn review_commit(&self, repo: &RepoRef, sha: &str) -> ReviewOutcome {
        let files = match self.github.list_commit_files(repo, sha).await {
            Ok(files) => files,
            Err(e) => {
                info!("Failed to fetch commit info: {}", status_and_body(&e));
                Vec::new()
            }
        };
        if files.is_empty() {
            info!("No files found in commit to review");
            return ReviewOutcome::NoFiles;
        }

        let mut reviews = Vec::new();
        for file in &files {
            if let Some(entry) = self.review_file(repo, sha, file).await {
                reviews.push(entry);
            }
        }
        if reviews.is_empty() {
            info!("No reviews generated.");
            return ReviewOutcome::NoReviews;
        }

        let body = prompt::build_comment_body(sha, &reviews, self.limits.max_comment_chars);
        match self.github.post_commit_comment(repo, sha, &body).await {
            Ok(()) => {
                info!("Comment posted to commit");
                ReviewOutcome::Posted {
                    reviews: reviews.len(),
                }
            }
            Err(e) => {
                info!("Failed to post comment to commit: {e}");
                ReviewOutcome::PostFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Resolve the repository named by `GITHUB_REPOSITORY`, logging why it failed.
pub fn resolve_repository(identifier: Option<&str>) -> Option<RepoRef> {
    let Some(identifier) = identifier else {
        info!("GITHUB_REPOSITORY missing");
        return None;
    };
    match identifier.parse() {
        Ok(repo) => Some(repo),
        Err(_) => {
            info!("GITHUB_REPOSITORY is malformed: {identifier}");
            None
        }
    }
}

/// Run the whole pipeline from configuration.
///
/// Resolves the repository and commit, then hands off to
/// [`CommitReviewer::review_commit`].
pub async fn run(config: &CriticConfig) -> ReviewOutcome {
    let Some(repo) = resolve_repository(config.github.repository.as_deref()) else {
        info!("No repository info — exiting");
        return ReviewOutcome::NoRepository;
    };

    let reviewer = match CommitReviewer::from_config(config) {
        Ok(reviewer) => reviewer,
        Err(e) => {
            warn!(error = %e, "failed to set up clients");
            return ReviewOutcome::SetupFailed {
                reason: e.to_string(),
            };
        }
    };

    let sha = match reviewer
        .github
        .resolve_commit(&repo, config.github.sha.as_deref())
        .await
    {
        Ok(sha) => sha,
        Err(e) => {
            warn!(error = %e, "commit lookup failed");
            info!("Could not determine commit SHA. Set GITHUB_SHA or run in Actions.");
            return ReviewOutcome::NoCommit;
        }
    };

    info!(%repo, %sha, model = reviewer.model.model(), "reviewing commit");
    reviewer.review_commit(&repo, &sha).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_repository_resolves_to_none() {
        assert!(resolve_repository(None).is_none());
    }

    #[test]
    fn malformed_repository_resolves_to_none() {
        assert!(resolve_repository(Some("just-a-name")).is_none());
    }

    #[test]
    fn valid_repository_resolves() {
        let repo = resolve_repository(Some("octo/cat")).unwrap();
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.repo, "cat");
    }

    #[test]
    fn rejected_listing_reports_status_and_body() {
        let err = CriticError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "Not Found".into(),
        };
        assert_eq!(status_and_body(&err), "404 Not Found Not Found");
    }

    #[test]
    fn other_errors_keep_their_display() {
        let err = CriticError::GitHub("no sha for o/r@main".into());
        assert_eq!(status_and_body(&err), "GitHub error: no sha for o/r@main");
    }

    #[test]
    fn failure_text_embeds_error_message() {
        let err = CriticError::Config("GCP_PROJECT_ID not set".into());
        assert_eq!(
            model_failure_text(&err),
            "GenAI model call failed: configuration error: GCP_PROJECT_ID not set"
        );
    }
}
