//! Pipeline configuration.
//!
//! Settings are loaded from the deployment's configuration source and
//! handed to the components at construction time; nothing here is read
//! from ambient/global state.

use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default DNS-over-HTTPS provider, used when the deployment does not
/// configure one.
pub const DEFAULT_DOH_ENDPOINT: &str = "https://cloudflare-dns.com/dns-query";

/// Per-lookup bound. A lookup that has not answered by then is aborted
/// and contributes no answer.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 1000;

/// Configuration for the DNS-over-HTTPS target resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// The dns-json endpoint queried with `?name=<target>&type=<A|AAAA>`.
    pub endpoint: Url,
    /// Per-lookup timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ResolverConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        // The default endpoint is a known-valid constant.
        let endpoint = Url::parse(DEFAULT_DOH_ENDPOINT).expect("default DoH endpoint parses");
        Self::new(endpoint)
    }
}

/// Configuration for the form controller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// When set, submission is refused until the session's greeting has
    /// been acknowledged.
    pub greeting_required: bool,
}
