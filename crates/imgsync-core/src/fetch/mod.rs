//! Resilient image fetch.
//!
//! Every GET runs inside the transport retry loop (`crate::retry`). On top of
//! that, the client walks an ordered list of request profiles (TLS verification
//! on/off, timeouts) and only gives up once every profile has failed.

mod get;

use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use std::time::Duration;

/// One entry of the fallback sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProfile {
    /// Verify the server certificate and host name.
    pub verify_tls: bool,
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Anything that can turn a URL into the response body.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking fetch client: retry policy per profile, profile fallback across attempts.
#[derive(Debug, Clone)]
pub struct FetchClient {
    policy: RetryPolicy,
    profiles: Vec<FetchProfile>,
    fallback_pause: Duration,
}

impl FetchClient {
    pub fn new(policy: RetryPolicy, profiles: Vec<FetchProfile>, fallback_pause: Duration) -> Self {
        Self {
            policy,
            profiles,
            fallback_pause,
        }
    }

    pub fn from_config(cfg: &crate::config::ImgsyncConfig) -> anyhow::Result<Self> {
        Ok(Self::new(cfg.retry_policy()?, cfg.fetch_profiles(), cfg.fallback_pause()))
    }

    pub fn profiles(&self) -> &[FetchProfile] {
        &self.profiles
    }
}

impl Fetch for FetchClient {
    /// Tries each profile in order, pausing between profiles.
    /// Returns the last profile's error when all fail.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let total = self.profiles.len();
        let mut last_err = None;

        for (i, profile) in self.profiles.iter().enumerate() {
            if i > 0 {
                std::thread::sleep(self.fallback_pause);
            }
            tracing::info!(
                url,
                profile = i + 1,
                total,
                verify_tls = profile.verify_tls,
                timeout_secs = profile.timeout.as_secs(),
                "fetch attempt"
            );
            let result = run_with_retry(&self.policy, |attempt| {
                let r = get::get_once(url, profile);
                if let Err(e) = &r {
                    tracing::debug!(url, profile = i + 1, attempt, "GET failed: {}", e);
                }
                r
            });
            match result {
                Ok(body) => {
                    tracing::info!(url, profile = i + 1, bytes = body.len(), "fetch ok");
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!(url, profile = i + 1, total, "profile failed: {}", e);
                    last_err = Some(e);
                }
            }
        }

        // An empty profile list never reaches the network; report it as a curl usage error.
        Err(last_err.unwrap_or_else(|| FetchError::Curl(curl::Error::new(3))))
    }
}
