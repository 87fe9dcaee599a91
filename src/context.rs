use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::{Clock, TokioClock};
use crate::errors::LocateError;
use crate::locator::Locator;
use crate::options::{ResolvedOptions, SessionConfig};
use crate::poller::poll_satisfied;
use crate::provider::DocumentProvider;
use crate::strategies;

/// Orchestrates the poller, options resolver, visibility filter and a
/// document provider into the retrying search operations.
///
/// Each context owns its own [`SessionConfig`], so independent executions
/// polling concurrently never observe each other's timing defaults. A poll
/// blocks its own logical thread of control between ticks; the only
/// suspension points are the inter-tick pauses.
pub struct SearchContext<P: DocumentProvider> {
    provider: P,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl<P: DocumentProvider> SearchContext<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, SessionConfig::default())
    }

    pub fn with_config(provider: P, config: SessionConfig) -> Self {
        Self {
            provider,
            config,
            clock: Arc::new(TokioClock::new()),
        }
    }

    /// Swap in a different time source (deterministic tests).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Poll for the first element matching `locator`. On timeout, a
    /// throw-on-fail locator raises [`LocateError::NotFound`]; a safe one
    /// returns `None`.
    pub async fn find(&self, locator: &Locator) -> Result<Option<P::Handle>, LocateError> {
        self.find_in(None, locator).await
    }

    /// [`SearchContext::find`] evaluated relative to a scope element.
    pub async fn find_in(
        &self,
        scope: Option<&P::Handle>,
        locator: &Locator,
    ) -> Result<Option<P::Handle>, LocateError> {
        let options = self.config.resolve(locator.options());
        debug!(locator = %locator.describe(), ?options, "find");

        let found = poll_satisfied(
            self.clock.as_ref(),
            options.timeout,
            options.retry_interval,
            || strategies::evaluate(&self.provider, scope, locator, &options, &self.config),
        )
        .await?;

        match found {
            Some(handles) => Ok(handles.into_iter().next()),
            None if options.throw_on_fail => {
                warn!(locator = %locator.describe(), timeout = ?options.timeout, "element not found");
                Err(LocateError::NotFound {
                    description: locator.describe(),
                    timeout: options.timeout,
                })
            }
            None => Ok(None),
        }
    }

    /// Poll for all elements matching `locator`. Listing is safe by
    /// construction: a timeout yields an empty set, never an error.
    pub async fn find_all(&self, locator: &Locator) -> Result<Vec<P::Handle>, LocateError> {
        self.find_all_in(None, locator).await
    }

    pub async fn find_all_in(
        &self,
        scope: Option<&P::Handle>,
        locator: &Locator,
    ) -> Result<Vec<P::Handle>, LocateError> {
        let options = self.config.resolve(locator.options());
        debug!(locator = %locator.describe(), ?options, "find_all");

        let found = poll_satisfied(
            self.clock.as_ref(),
            options.timeout,
            options.retry_interval,
            || strategies::evaluate(&self.provider, scope, locator, &options, &self.config),
        )
        .await?;
        Ok(found.unwrap_or_default())
    }

    /// Whether the locator currently resolves to an element. Never raises
    /// `NotFound`.
    pub async fn exists(&self, locator: &Locator) -> Result<bool, LocateError> {
        Ok(self.find(&locator.safe()).await?.is_some())
    }

    /// Poll until no element matches the locator, honoring its visibility
    /// rule. On timeout, a throw-on-fail locator raises
    /// [`LocateError::StillPresent`]; a safe one returns `false`.
    pub async fn missing(&self, locator: &Locator) -> Result<bool, LocateError> {
        let options = self.config.resolve(locator.options());
        debug!(locator = %locator.describe(), ?options, "missing");

        let gone = poll_satisfied(
            self.clock.as_ref(),
            options.timeout,
            options.retry_interval,
            || self.tick_missing(locator, &options),
        )
        .await?;

        match gone {
            Some(true) => Ok(true),
            _ if options.throw_on_fail => {
                warn!(locator = %locator.describe(), timeout = ?options.timeout, "still present");
                Err(LocateError::StillPresent {
                    description: locator.describe(),
                    timeout: options.timeout,
                })
            }
            _ => Ok(false),
        }
    }

    /// Poll until every locator is absent *at the same tick*.
    ///
    /// The working set holds locators not yet confirmed absent. Once it
    /// drains, locators confirmed in strictly earlier ticks are re-checked:
    /// any that reappeared must go missing again before the call succeeds,
    /// so the final acceptance instant is one at which all watched locators
    /// are simultaneously absent even when individual locators flicker. A
    /// disappear-and-reappear within a single tick stays below the
    /// re-check's resolution; that boundary is deliberate.
    pub async fn missing_all(&self, locators: &[Locator]) -> Result<bool, LocateError> {
        if locators.is_empty() {
            return Ok(true);
        }
        let resolved: Vec<ResolvedOptions> = locators
            .iter()
            .map(|locator| self.config.resolve(locator.options()))
            .collect();
        // One poll budget for the whole set: the widest timeout, the densest
        // interval. Each locator's own visibility rule governs its tick.
        let timeout = resolved
            .iter()
            .map(|options| options.timeout)
            .max()
            .unwrap_or(self.config.timeout);
        let interval = resolved
            .iter()
            .map(|options| options.retry_interval)
            .min()
            .unwrap_or(self.config.retry_interval);

        let all: BTreeSet<usize> = (0..locators.len()).collect();
        let mut remaining = all.clone();
        let deadline = self.clock.now() + timeout;

        loop {
            let current = remaining.clone();
            for &i in &current {
                if self.tick_missing(&locators[i], &resolved[i]).await? {
                    remaining.remove(&i);
                }
            }

            if remaining.is_empty() {
                let mut reappeared = BTreeSet::new();
                for &i in all.difference(&current) {
                    if !self.tick_missing(&locators[i], &resolved[i]).await? {
                        debug!(locator = %locators[i].describe(), "reappeared, watching again");
                        reappeared.insert(i);
                    }
                }
                if reappeared.is_empty() {
                    return Ok(true);
                }
                remaining = reappeared;
            }

            if self.clock.now() >= deadline {
                break;
            }
            self.clock.pause(interval).await;
        }

        if resolved.iter().any(|options| options.throw_on_fail) {
            let culprit = remaining
                .iter()
                .next()
                .map(|&i| locators[i].describe())
                .unwrap_or_default();
            warn!(locator = %culprit, ?timeout, "still present after missing_all");
            return Err(LocateError::StillPresent {
                description: culprit,
                timeout,
            });
        }
        Ok(false)
    }

    /// Poll an arbitrary condition. A timeout of exactly zero bypasses
    /// polling and evaluates once, so immediate no-retry checks behave
    /// identically to retried ones with zero wait.
    pub async fn until<F, Fut>(
        &self,
        mut condition: F,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<bool, LocateError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool, LocateError>>,
    {
        if timeout.is_zero() {
            return condition().await;
        }
        let met = poll_satisfied(self.clock.as_ref(), timeout, retry_interval, condition).await?;
        Ok(met.unwrap_or(false))
    }

    /// One absence check. The evaluation itself runs in safe mode — whether
    /// absence failure is an error is decided at the timeout, not per tick —
    /// and a retryable race counts as "not yet confirmed absent".
    async fn tick_missing(
        &self,
        locator: &Locator,
        options: &ResolvedOptions,
    ) -> Result<bool, LocateError> {
        let tick_options = ResolvedOptions {
            throw_on_fail: false,
            ..*options
        };
        match strategies::evaluate(&self.provider, None, locator, &tick_options, &self.config).await
        {
            Ok(handles) => Ok(handles.is_empty()),
            Err(err) if err.is_retryable() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
