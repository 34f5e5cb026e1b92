use chrono::{DateTime, Duration, Utc};
use sqlx::prelude::FromRow;

use crate::api::error;

/// Requests a sender created inside the current window.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct SentWindow {
    pub count: i64,
    pub oldest: Option<DateTime<Utc>>,
}

/// Sliding-window send limit: at most `max_requests` created at or after `now - window`,
/// measured from each call's `now` rather than fixed buckets.
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindow {
    max_requests: u32,
    window: Duration,
}

impl SlidingWindow {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self { max_requests, window: Duration::seconds(window_secs as i64) }
    }

    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    pub fn check(&self, now: DateTime<Utc>, sent: &SentWindow) -> Result<(), error::SystemError> {
        if sent.count < i64::from(self.max_requests) {
            return Ok(());
        }

        let retry_after = sent
            .oldest
            .map(|oldest| {
                let wait = oldest + self.window - now;
                (wait.num_milliseconds() + 999) / 1000
            })
            .unwrap_or(self.window.num_seconds())
            .max(1) as u64;

        Err(error::SystemError::RateLimited {
            message: format!(
                "You can only send up to {} friend requests per {} seconds",
                self.max_requests,
                self.window.num_seconds()
            )
            .into(),
            retry_after,
        })
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(3, 60)
    }
}
