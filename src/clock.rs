//! Presentation clock
//!
//! Cosmetic minimum-dwell delays (scan result presentation, pairing step
//! pacing) go through this trait so tests can inject a zero-delay clock
//! without touching cancellation semantics — session lifecycle validity is
//! governed by generation counters, never by these delays.

use std::time::Duration;

use async_trait::async_trait;

/// Clock controlling cosmetic minimum-dwell delays
#[async_trait]
pub trait PresentationClock: Send + Sync {
    /// Wait out a presentation delay
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the Tokio timer
pub struct TokioClock;

#[async_trait]
impl PresentationClock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Zero-delay clock for tests
pub struct InstantClock;

#[async_trait]
impl PresentationClock for InstantClock {
    async fn sleep(&self, _duration: Duration) {}
}
