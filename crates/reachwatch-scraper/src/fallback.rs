//! Ordered fetch strategies for a single platform.

use futures::future::BoxFuture;
use reachwatch_core::ProfileStats;

use crate::error::FetchError;

/// One way of obtaining a profile's stats.
pub trait FetchStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn fetch<'a>(&'a self, target: &'a str) -> BoxFuture<'a, Result<ProfileStats, FetchError>>;
}

/// Tries each strategy in order until one succeeds.
///
/// Strategies never run concurrently: a later strategy starts only after the
/// previous one failed. When every strategy fails, the chain reports the
/// first temporary block it saw, or the last failure if nothing was blocked.
pub struct FallbackChain {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl FallbackChain {
    #[must_use]
    pub fn new(primary: Box<dyn FetchStrategy>) -> Self {
        Self {
            strategies: vec![primary],
        }
    }

    /// Appends a strategy tried after all earlier ones have failed.
    #[must_use]
    pub fn then(mut self, fallback: Box<dyn FetchStrategy>) -> Self {
        self.strategies.push(fallback);
        self
    }

    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the chain for `target`.
    ///
    /// # Errors
    ///
    /// Returns the folded failure when no strategy succeeds: the first
    /// [`FetchError::Blocked`] if any strategy was blocked, otherwise the
    /// last strategy's error.
    pub async fn run(&self, target: &str) -> Result<ProfileStats, FetchError> {
        let mut first_block: Option<FetchError> = None;
        let mut last_error: Option<FetchError> = None;
        let total = self.strategies.len();

        for (index, strategy) in self.strategies.iter().enumerate() {
            if index > 0 {
                tracing::info!(
                    profile = target,
                    strategy = strategy.name(),
                    "trying fallback strategy after earlier failure"
                );
            }

            match strategy.fetch(target).await {
                Ok(stats) => return Ok(stats),
                Err(err) => {
                    let remaining = total - index - 1;
                    if err.is_temporary_block() {
                        tracing::warn!(
                            profile = target,
                            strategy = strategy.name(),
                            remaining,
                            error = %err,
                            "strategy temporarily blocked"
                        );
                    } else {
                        tracing::warn!(
                            profile = target,
                            strategy = strategy.name(),
                            remaining,
                            error = %err,
                            "strategy failed"
                        );
                    }

                    if err.is_temporary_block() && first_block.is_none() {
                        first_block = Some(err);
                    } else {
                        last_error = Some(err);
                    }
                }
            }
        }

        tracing::error!(profile = target, strategies = total, "every fetch strategy failed");
        match (first_block, last_error) {
            (Some(blocked), _) => Err(blocked),
            (None, Some(err)) => Err(err),
            (None, None) => Err(FetchError::Parse(
                "no fetch strategy produced a result".to_string(),
            )),
        }
    }
}
