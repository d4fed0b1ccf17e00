use std::future::Future;
use std::io::IsTerminal;

use critic_core::CriticConfig;
use critic_review::pipeline::{self, ReviewOutcome};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(std::io::stdout)
        .init();
}

/// Run the review as its own task so a panic is reported instead of
/// changing the exit status.
async fn run_guarded<F>(review: F) -> Option<ReviewOutcome>
where
    F: Future<Output = ReviewOutcome> + Send + 'static,
{
    match tokio::spawn(review).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::error!(error = %e, "review aborted");
            None
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    human_panic::setup_panic!();

    // A missing .env is the normal case in CI.
    let dotenv = dotenvy::dotenv();
    init_logging();
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let config = CriticConfig::from_env();
    let outcome = run_guarded(async move { pipeline::run(&config).await }).await;
    tracing::debug!(?outcome, "review finished");

    if let Some(ReviewOutcome::PostFailed { reason }) = &outcome {
        tracing::warn!(%reason, "review was generated but not posted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_review_passes_outcome_through() {
        let outcome = run_guarded(async { ReviewOutcome::NoFiles }).await;
        assert_eq!(outcome, Some(ReviewOutcome::NoFiles));
    }

    async fn exploding_review() -> ReviewOutcome {
        panic!("unexpected response shape");
    }

    #[tokio::test]
    async fn panicking_review_is_contained() {
        let outcome = run_guarded(exploding_review()).await;
        assert_eq!(outcome, None);
    }
}
