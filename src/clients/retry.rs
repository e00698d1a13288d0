//! Exponential backoff around any [`OrderService`].
//!
//! Only failures for which [`OrderError::is_transient`] holds are retried. A rejected
//! transition or a missing order is returned straight away.

use crate::clients::OrderService;
use crate::model::{Order, OrderId};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded exponential backoff: `initial_interval * multiplier^n`, capped at `max_interval`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of calls, first one included.
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_interval: Duration::from_millis(1000),
            multiplier: 10.0,
            max_interval: Duration::from_millis(100_000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `interval` has already been waited once.
    ///
    /// A product that is not a valid duration (negative, say) falls back to `max_interval`.
    pub fn next_interval(&self, interval: Duration) -> Duration {
        let next = interval.as_secs_f64() * self.multiplier;
        Duration::try_from_secs_f64(next.min(self.max_interval.as_secs_f64())).unwrap_or(self.max_interval)
    }
}

/// Decorates an [`OrderService`] with a [`RetryPolicy`].
pub struct RetryingOrderService<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: OrderService> RetryingOrderService<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn with_retry<'a, F, Fut>(&'a self, operation: &'static str, mut call: F) -> Result<Order, OrderError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<Order, OrderError>> + Send + 'a,
    {
        let mut attempt = 1;
        let mut interval = self.policy.initial_interval.min(self.policy.max_interval);
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    warn!(
                        operation,
                        attempt,
                        delay_ms = interval.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(interval).await;
                    interval = self.policy.next_interval(interval);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl<S: OrderService> OrderService for RetryingOrderService<S> {
    async fn create(&self, candidate_id: OrderId) -> Result<Order, OrderError> {
        self.with_retry("create", || self.inner.create(candidate_id))
            .await
    }

    async fn assign_order(&self, order_id: OrderId, store_id: u32) -> Result<Order, OrderError> {
        self.with_retry("assign_order", || self.inner.assign_order(order_id, store_id))
            .await
    }

    async fn prepare_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.with_retry("prepare_order", || self.inner.prepare_order(order_id))
            .await
    }

    async fn order_ready(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.with_retry("order_ready", || self.inner.order_ready(order_id))
            .await
    }

    async fn start_delivery(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.with_retry("start_delivery", || self.inner.start_delivery(order_id))
            .await
    }

    async fn deliver(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.with_retry("deliver", || self.inner.deliver(order_id))
            .await
    }
}
