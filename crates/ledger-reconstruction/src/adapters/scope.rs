//! # Store Scope
//!
//! A request-bound handle on the store. The scope's deadline is the earlier
//! of the caller's deadline and `now + statement_timeout`; every store call
//! made through it is cut off at that deadline.
//!
//! The scope is counted in the active scope gauge while alive and released on
//! drop, whatever path the request leaves by.

use mirror_telemetry::{ACTIVE_STORE_SCOPES, STORE_TIMEOUTS};
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::warn;

use crate::ports::inbound::RequestContext;
use crate::ports::outbound::StoreError;

pub struct StoreScope<'a, S: ?Sized> {
    store: &'a S,
    deadline: Instant,
}

impl<'a, S: ?Sized> StoreScope<'a, S> {
    pub fn open(store: &'a S, ctx: &RequestContext, statement_timeout: Duration) -> Self {
        // A budget past the clock's range leaves only the caller's deadline.
        let budget = Instant::now().checked_add(statement_timeout);
        let deadline = match (ctx.deadline(), budget) {
            (Some(deadline), Some(budget)) => deadline.min(budget),
            (Some(deadline), None) => deadline,
            (None, Some(budget)) => budget,
            (None, None) => far_future(),
        };
        ACTIVE_STORE_SCOPES.inc();
        Self { store, deadline }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Await one store call within the scope's deadline.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match timeout_at(self.deadline, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(operation, error = %err, "Store call failed");
                Err(err)
            }
            Err(_) => {
                STORE_TIMEOUTS.inc();
                warn!(operation, "Store call exceeded request deadline");
                Err(StoreError::Timeout { operation })
            }
        }
    }
}

/// Latest deadline the clock can represent without overflow.
fn far_future() -> Instant {
    let now = Instant::now();
    [Duration::from_secs(86_400 * 365 * 30), Duration::from_secs(86_400)]
        .into_iter()
        .find_map(|ahead| now.checked_add(ahead))
        .unwrap_or(now)
}

impl<S: ?Sized> Drop for StoreScope<'_, S> {
    fn drop(&mut self) {
        ACTIVE_STORE_SCOPES.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoStore;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_min_of_context_and_budget() {
        let short = RequestContext::with_timeout(Duration::from_secs(1));
        let scope = StoreScope::open(&NoStore, &short, Duration::from_secs(20));
        assert_eq!(scope.deadline() - Instant::now(), Duration::from_secs(1));

        let long = RequestContext::with_timeout(Duration::from_secs(60));
        let scope = StoreScope::open(&NoStore, &long, Duration::from_secs(20));
        assert_eq!(scope.deadline() - Instant::now(), Duration::from_secs(20));

        let scope = StoreScope::open(&NoStore, &RequestContext::background(), Duration::from_secs(5));
        assert_eq!(scope.deadline() - Instant::now(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_budget_does_not_overflow() {
        let short = RequestContext::with_timeout(Duration::from_secs(2));
        let scope = StoreScope::open(&NoStore, &short, Duration::MAX);
        assert_eq!(scope.deadline() - Instant::now(), Duration::from_secs(2));

        let scope = StoreScope::open(&NoStore, &RequestContext::background(), Duration::MAX);
        assert!(scope.deadline() > Instant::now());
        let value = scope.run("fast", async { Ok(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let scope = StoreScope::open(&NoStore, &RequestContext::background(), Duration::from_secs(1));
        let result: Result<(), StoreError> = scope
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(StoreError::Timeout { operation: "slow" }));
    }
}
