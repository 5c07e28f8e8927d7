//! Client configuration
//!
//! Defaults mirror the registry's stock deployment: the API on
//! `localhost:8080` and listings of four rows per page.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_POSTAL_LOOKUP_URL: &str = "https://viacep.com.br/ws";
pub const DEFAULT_PAGE_SIZE: u32 = 4;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Shown when a listing has no records
pub const EMPTY_LISTING_MESSAGE: &str = "Nenhum registro encontrado.";

/// Report status polling policy
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay between status checks while the job is pending
    pub interval: Duration,
    /// Upper bound for the backed-off delay after failed checks
    pub max_interval: Duration,
    /// Consecutive failed checks tolerated before giving up
    pub max_consecutive_failures: u32,
    /// Total time to wait for a job before giving up
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_interval: Duration::from_secs(30),
            max_consecutive_failures: 5,
            max_wait: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    /// Delay before the next check after `failures` consecutive failed checks.
    ///
    /// Doubles per failure, capped at `max_interval`.
    pub fn next_delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures);
        self.interval
            .checked_mul(factor)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }
}

/// Client configuration shared by the adapters and controllers
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the registry API
    pub base_url: String,
    /// Base URL of the postal code lookup service
    pub postal_lookup_url: String,
    /// Rows per listing page
    pub page_size: u32,
    /// Quiet period before a listing query is sent
    pub debounce: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    pub poll: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            postal_lookup_url: DEFAULT_POSTAL_LOOKUP_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: Duration::from_secs(30),
            poll: PollPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_postal_lookup_url(mut self, url: impl Into<String>) -> Self {
        self.postal_lookup_url = url.into();
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = PollPolicy::default();
        assert_eq!(policy.next_delay(0), Duration::from_secs(2));
        assert_eq!(policy.next_delay(1), Duration::from_secs(4));
        assert_eq!(policy.next_delay(3), Duration::from_secs(16));
        assert_eq!(policy.next_delay(4), Duration::from_secs(30));
        assert_eq!(policy.next_delay(40), Duration::from_secs(30));
    }

    #[test]
    fn test_page_size_never_zero() {
        assert_eq!(ClientConfig::default().with_page_size(0).page_size, 1);
    }
}
