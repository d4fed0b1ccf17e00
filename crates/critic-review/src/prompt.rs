use critic_core::ReviewEntry;

/// Appended whenever text is cut to a character limit.
pub const TRUNCATION_MARKER: &str = "\n\n...truncated...";

/// Build the review prompt for one file.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::build_review_prompt;
///
/// let prompt = build_review_prompt("src/main.rs", "fn main() {}");
/// assert!(prompt.contains("`src/main.rs`"));
/// assert!(prompt.ends_with("```fn main() {}```"));
/// ```
pub fn build_review_prompt(path: &str, content: &str) -> String {
    format!(
        "You are a senior software engineer reviewing code. \
         Provide concise, actionable review comments for `{path}`. \
         Highlight bugs, security issues, and style improvements.\n\n\
         ```{content}```"
    )
}

/// Cut `text` to `max_chars` characters and append [`TRUNCATION_MARKER`].
///
/// Text at or under the limit is returned unchanged. Limits count Unicode
/// scalar values, not bytes.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::{truncate_with_marker, TRUNCATION_MARKER};
///
/// assert_eq!(truncate_with_marker("abc".into(), 3), "abc");
/// assert_eq!(truncate_with_marker("abcd".into(), 3), format!("abc{TRUNCATION_MARKER}"));
/// ```
pub fn truncate_with_marker(mut text: String, max_chars: usize) -> String {
    if let Some((cut, _)) = text.char_indices().nth(max_chars) {
        text.truncate(cut);
        text.push_str(TRUNCATION_MARKER);
    }
    text
}

/// Assemble the commit comment from per-file reviews.
///
/// The header names the commit, entries are separated by horizontal rules,
/// and the whole body is cut to `max_chars`.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewEntry;
/// use critic_review::prompt::build_comment_body;
///
/// let entries = vec![ReviewEntry { filename: "a.rs".into(), review_text: "ok".into() }];
/// let body = build_comment_body("abc123", &entries, 64_000);
/// assert!(body.starts_with("## Vertex AI — Automated Code Review for commit `abc123`"));
/// ```
pub fn build_comment_body(sha: &str, entries: &[ReviewEntry], max_chars: usize) -> String {
    let sections: Vec<String> = entries.iter().map(ToString::to_string).collect();
    let body = format!(
        "## Vertex AI — Automated Code Review for commit `{sha}`\n\n{}",
        sections.join("\n---\n")
    );
    truncate_with_marker(body, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, text: &str) -> ReviewEntry {
        ReviewEntry {
            filename: name.into(),
            review_text: text.into(),
        }
    }

    #[test]
    fn prompt_matches_template() {
        let prompt = build_review_prompt("app.py", "print(1)");
        assert_eq!(
            prompt,
            "You are a senior software engineer reviewing code. Provide concise, actionable \
             review comments for `app.py`. Highlight bugs, security issues, and style \
             improvements.\n\n```print(1)```"
        );
    }

    #[test]
    fn file_content_over_limit_is_cut_to_exact_length() {
        let content = "x".repeat(30_000);
        let truncated = truncate_with_marker(content, 25_000);
        assert_eq!(truncated.len(), 25_000 + TRUNCATION_MARKER.len());
        assert!(truncated.starts_with(&"x".repeat(25_000)));
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn content_at_limit_is_untouched() {
        let content = "y".repeat(25_000);
        assert_eq!(truncate_with_marker(content.clone(), 25_000), content);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let content = "é".repeat(10);
        let truncated = truncate_with_marker(content, 4);
        assert_eq!(truncated, format!("éééé{TRUNCATION_MARKER}"));
    }

    #[test]
    fn body_joins_entries_with_rules() {
        let body = build_comment_body("abc", &[entry("a.rs", "A"), entry("b.rs", "B")], 64_000);
        assert_eq!(
            body,
            "## Vertex AI — Automated Code Review for commit `abc`\n\n\
             **File:** `a.rs`\nA\n\n---\n**File:** `b.rs`\nB\n"
        );
    }

    #[test]
    fn long_body_is_cut_to_exact_length() {
        let entries: Vec<ReviewEntry> = (0..20)
            .map(|i| entry(&format!("f{i}.rs"), &"r".repeat(5_000)))
            .collect();
        let body = build_comment_body("abc", &entries, 64_000);
        assert_eq!(body.chars().count(), 64_000 + TRUNCATION_MARKER.chars().count());
        assert!(body.ends_with(TRUNCATION_MARKER));
    }
}
