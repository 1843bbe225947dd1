//! API provider detection
//!
//! Maps an outbound request URL to the external API provider it targets by
//! substring-matching the URL against a fixed ordered table of known
//! hostnames. Detection is pure and deterministic; a miss is a valid,
//! silent outcome, not an error.

use crate::taxonomy::names;

/// External API providers the service calls out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiProvider {
    /// Dune Sim API (`api.sim.dune.com`)
    Sim,
    /// Covalent unified blockchain API (`api.covalenthq.com`)
    Covalent,
    /// Moralis deep-index API (`deep-index.moralis.io`)
    Moralis,
    /// Google Gemini generative-language API (`generativelanguage.googleapis.com`)
    Gemini,
}

impl ApiProvider {
    /// Short provider tag used as the `api.provider` attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiProvider::Sim => "sim",
            ApiProvider::Covalent => "covalent",
            ApiProvider::Moralis => "moralis",
            ApiProvider::Gemini => "gemini",
        }
    }

    /// Span name used for calls to this provider.
    pub fn span_name(&self) -> &'static str {
        match self {
            ApiProvider::Sim => names::SIM_API_CALL,
            ApiProvider::Covalent => names::COVALENT_API_CALL,
            ApiProvider::Moralis => names::MORALIS_API_CALL,
            ApiProvider::Gemini => names::GEMINI_API_CALL,
        }
    }
}

impl std::fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known provider hostnames, checked in order (first match wins).
pub const PROVIDER_HOSTS: &[(&str, ApiProvider)] = &[
    ("api.sim.dune.com", ApiProvider::Sim),
    ("api.covalenthq.com", ApiProvider::Covalent),
    ("deep-index.moralis.io", ApiProvider::Moralis),
    ("generativelanguage.googleapis.com", ApiProvider::Gemini),
];

/// Detect the API provider a URL targets.
///
/// Substring match against [`PROVIDER_HOSTS`], first match wins.
/// Returns `None` when no known host appears in the URL.
///
/// # Example
///
/// ```
/// use chaintrace::provider::{detect_provider, ApiProvider};
///
/// let provider = detect_provider("https://api.covalenthq.com/v1/1/address/0xabc/balances_v2/");
/// assert_eq!(provider, Some(ApiProvider::Covalent));
/// assert_eq!(detect_provider("https://example.com/rpc"), None);
/// ```
pub fn detect_provider(url: &str) -> Option<ApiProvider> {
    PROVIDER_HOSTS
        .iter()
        .find(|(host, _)| url.contains(host))
        .map(|(_, provider)| *provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_each_provider() {
        assert_eq!(
            detect_provider("https://api.sim.dune.com/v1/evm/balances"),
            Some(ApiProvider::Sim)
        );
        assert_eq!(
            detect_provider("https://api.covalenthq.com/v1/chains/"),
            Some(ApiProvider::Covalent)
        );
        assert_eq!(
            detect_provider("https://deep-index.moralis.io/api/v2.2/wallets"),
            Some(ApiProvider::Moralis)
        );
        assert_eq!(
            detect_provider("https://generativelanguage.googleapis.com/v1beta/models"),
            Some(ApiProvider::Gemini)
        );
    }

    #[test]
    fn test_unknown_host_yields_none() {
        assert_eq!(detect_provider("https://etherscan.io/api"), None);
        assert_eq!(detect_provider(""), None);
    }

    #[test]
    fn test_first_match_wins() {
        // A URL mentioning two known hosts resolves to the earlier table entry
        let url = "https://api.sim.dune.com/proxy?target=api.covalenthq.com";
        assert_eq!(detect_provider(url), Some(ApiProvider::Sim));
    }

    #[test]
    fn test_tag_and_span_name_pairing() {
        for (_, provider) in PROVIDER_HOSTS {
            assert!(provider.span_name().starts_with(provider.as_str()));
        }
    }
}
