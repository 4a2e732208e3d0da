// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue abstraction over named FIFO channels
//!
//! Envelopes are JSON strings. Delivery is at-least-once: workers are
//! expected to be deterministic over a given envelope, and step outputs
//! are idempotently overwritten on the storage path.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from the queue backend
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Push/blocking-pop of JSON envelopes on named channels.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Append an envelope to the tail of a channel.
    async fn push(&self, channel: &str, payload: &str) -> Result<(), QueueError>;

    /// Pop the head of a channel, blocking up to `timeout`.
    ///
    /// Returns `None` on timeout; the caller loops.
    async fn pop(&self, channel: &str, timeout: Duration) -> Result<Option<String>, QueueError>;
}

/// Queue backed by Redis lists (RPUSH / BLPOP).
#[derive(Clone)]
pub struct RedisQueue {
    manager: redis::aio::ConnectionManager,
}

impl RedisQueue {
    /// Connect to a Redis endpoint.
    ///
    /// The connection manager reconnects transparently, so transient
    /// broker restarts surface as retriable errors rather than a dead
    /// client.
    pub async fn connect(host: &str, port: u16) -> Result<Self, QueueError> {
        let client = redis::Client::open(format!("redis://{host}:{port}"))?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl Queue for RedisQueue {
    async fn push(&self, channel: &str, payload: &str) -> Result<(), QueueError> {
        use redis::AsyncCommands;
        let mut conn = self.manager.clone();
        let _: () = conn.rpush(channel, payload).await?;
        Ok(())
    }

    async fn pop(&self, channel: &str, timeout: Duration) -> Result<Option<String>, QueueError> {
        use redis::AsyncCommands;
        let mut conn = self.manager.clone();
        let popped: Option<(String, String)> = conn.blpop(channel, timeout.as_secs_f64()).await?;
        Ok(popped.map(|(_channel, payload)| payload))
    }
}

/// In-process queue for tests and embedded use.
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryQueue;

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use super::{Queue, QueueError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// FIFO channels backed by process-local memory.
    ///
    /// Matches the blocking-pop contract of the Redis queue so scenario
    /// tests can stand in for a real broker.
    #[derive(Default)]
    pub struct MemoryQueue {
        channels: Mutex<HashMap<String, VecDeque<String>>>,
        notify: Notify,
    }

    impl MemoryQueue {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of envelopes waiting on a channel.
        pub fn len(&self, channel: &str) -> usize {
            self.channels
                .lock()
                .get(channel)
                .map(VecDeque::len)
                .unwrap_or(0)
        }

        pub fn is_empty(&self, channel: &str) -> bool {
            self.len(channel) == 0
        }

        /// Drain every envelope currently on a channel without blocking.
        pub fn drain(&self, channel: &str) -> Vec<String> {
            self.channels
                .lock()
                .get_mut(channel)
                .map(|queue| queue.drain(..).collect())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Queue for MemoryQueue {
        async fn push(&self, channel: &str, payload: &str) -> Result<(), QueueError> {
            self.channels
                .lock()
                .entry(channel.to_string())
                .or_default()
                .push_back(payload.to_string());
            self.notify.notify_waiters();
            Ok(())
        }

        async fn pop(
            &self,
            channel: &str,
            timeout: Duration,
        ) -> Result<Option<String>, QueueError> {
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                // Register for wake-ups before checking, so a push between
                // the check and the await cannot be missed
                let notified = self.notify.notified();

                if let Some(payload) = self
                    .channels
                    .lock()
                    .get_mut(channel)
                    .and_then(VecDeque::pop_front)
                {
                    return Ok(Some(payload));
                }

                tokio::select! {
                    _ = notified => {}
                    _ = tokio::time::sleep_until(deadline) => return Ok(None),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
