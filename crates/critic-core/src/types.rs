use std::fmt;
use std::str::FromStr;

use crate::error::CriticError;

/// A GitHub repository, parsed from `owner/repo`.
///
/// # Examples
///
/// ```
/// use critic_core::RepoRef;
///
/// let repo: RepoRef = "rust-lang/rust".parse().unwrap();
/// assert_eq!(repo.owner, "rust-lang");
/// assert_eq!(repo.repo, "rust");
/// assert!("no-separator".parse::<RepoRef>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Owning user or organization.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl FromStr for RepoRef {
    type Err = CriticError;

    /// Split on the first `/`; everything after it belongs to the repo name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(CriticError::Config(format!(
                "invalid repository '{s}', expected owner/repo"
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A file changed by a commit, as listed by the commit API.
///
/// # Examples
///
/// ```
/// use critic_core::CommitFileRef;
///
/// let file = CommitFileRef {
///     filename: "src/lib.rs".into(),
///     raw_url: Some("https://github.com/o/r/raw/abc/src/lib.rs".into()),
/// };
/// assert_eq!(file.filename, "src/lib.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFileRef {
    /// Path of the file relative to the repository root.
    pub filename: String,
    /// Preferred locator for the file's content at the commit.
    pub raw_url: Option<String>,
}

/// The model's review of one file.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewEntry;
///
/// let entry = ReviewEntry {
///     filename: "main.py".into(),
///     review_text: "Looks fine.".into(),
/// };
/// assert_eq!(entry.to_string(), "**File:** `main.py`\nLooks fine.\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    /// File the review is about.
    pub filename: String,
    /// Generated critique, or an inline error message if generation failed.
    pub review_text: String,
}

impl fmt::Display for ReviewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**File:** `{}`", self.filename)?;
        writeln!(f, "{}", self.review_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_repository() {
        let repo: RepoRef = "octocat/hello-world".parse().unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.repo, "hello-world");
        assert_eq!(repo.to_string(), "octocat/hello-world");
    }

    #[test]
    fn parse_splits_on_first_separator_only() {
        let repo: RepoRef = "owner/repo/extra".parse().unwrap();
        assert_eq!(repo.owner, "owner");
        assert_eq!(repo.repo, "repo/extra");
    }

    #[test]
    fn parse_without_separator_fails() {
        assert!("owner-repo".parse::<RepoRef>().is_err());
    }

    #[test]
    fn parse_with_empty_half_fails() {
        assert!("/repo".parse::<RepoRef>().is_err());
        assert!("owner/".parse::<RepoRef>().is_err());
    }

    #[test]
    fn review_entry_renders_markdown_section() {
        let entry = ReviewEntry {
            filename: "a.rs".into(),
            review_text: "line one\nline two".into(),
        };
        assert_eq!(entry.to_string(), "**File:** `a.rs`\nline one\nline two\n");
    }
}
