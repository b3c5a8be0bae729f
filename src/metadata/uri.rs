//! URI template substitution and URL validation.

use primitive_types::U256;
use url::Url;

/// Placeholder replaced by the token id in ERC1155 metadata URIs.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Replace the first `{id}` in `template` with the decimal token id.
///
/// Templates without the placeholder are returned unchanged.
pub fn substitute_token_id(template: &str, token_id: U256) -> String {
    template.replacen(ID_PLACEHOLDER, &token_id.to_string(), 1)
}

/// How a prepared URL can be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// The substituted string is not a URL.
    Invalid,
    /// A URL with a scheme this resolver does not fetch (`ipfs:`, `ar:`, `data:`...).
    NotHttp,
    /// `http:` or `https:`.
    Http,
}

/// A URI template with the token id substituted, parsed as a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedUrl {
    resolved_url: String,
    parsed: Result<Url, url::ParseError>,
}

impl PreparedUrl {
    pub fn prepare(template: &str, token_id: U256) -> Self {
        let resolved_url = substitute_token_id(template, token_id);
        let parsed = Url::parse(&resolved_url);
        Self {
            resolved_url,
            parsed,
        }
    }

    /// The substituted string, whether or not it parsed.
    pub fn resolved_url(&self) -> &str {
        &self.resolved_url
    }

    pub fn is_valid_url(&self) -> bool {
        self.parsed.is_ok()
    }

    /// Only meaningful when the URL is valid.
    pub fn is_http(&self) -> bool {
        self.parsed
            .as_ref()
            .is_ok_and(|url| url.scheme().contains("http"))
    }

    pub fn url(&self) -> Option<&Url> {
        self.parsed.as_ref().ok()
    }

    pub fn parse_error(&self) -> Option<url::ParseError> {
        self.parsed.as_ref().err().copied()
    }

    pub fn kind(&self) -> UrlKind {
        match &self.parsed {
            Err(_) => UrlKind::Invalid,
            Ok(_) if self.is_http() => UrlKind::Http,
            Ok(_) => UrlKind::NotHttp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_placeholder() {
        let prepared = PreparedUrl::prepare(
            "https://api.example.com/meta/{id}.json",
            U256::from(42u64),
        );
        assert_eq!(prepared.resolved_url(), "https://api.example.com/meta/42.json");
        assert_eq!(prepared.kind(), UrlKind::Http);
        assert!(prepared.is_valid_url());
        assert!(prepared.is_http());
        assert!(prepared.parse_error().is_none());
    }

    #[test]
    fn test_substitutes_first_occurrence_only() {
        assert_eq!(
            substitute_token_id("https://x/{id}/{id}.json", U256::from(7u64)),
            "https://x/7/{id}.json"
        );
    }

    #[test]
    fn test_template_without_placeholder_is_untouched() {
        let prepared = PreparedUrl::prepare("https://x/static.json", U256::from(7u64));
        assert_eq!(prepared.resolved_url(), "https://x/static.json");
        assert_eq!(prepared.kind(), UrlKind::Http);
    }

    #[test]
    fn test_large_token_id_is_rendered_in_full() {
        let prepared = PreparedUrl::prepare("https://x/{id}", U256::MAX);
        assert_eq!(
            prepared.resolved_url(),
            "https://x/115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn test_non_http_schemes() {
        for template in ["ipfs://{id}", "ar://abc/{id}", "data:application/json,{}"] {
            let prepared = PreparedUrl::prepare(template, U256::from(5u64));
            assert!(prepared.is_valid_url(), "{template}");
            assert!(!prepared.is_http(), "{template}");
            assert_eq!(prepared.kind(), UrlKind::NotHttp);
        }
        assert_eq!(
            PreparedUrl::prepare("ipfs://{id}", U256::from(5u64)).resolved_url(),
            "ipfs://5"
        );
    }

    #[test]
    fn test_invalid_url() {
        let prepared = PreparedUrl::prepare("not-a-url", U256::from(1u64));
        assert!(!prepared.is_valid_url());
        assert!(!prepared.is_http());
        assert_eq!(prepared.kind(), UrlKind::Invalid);
        assert_eq!(
            prepared.parse_error(),
            Some(url::ParseError::RelativeUrlWithoutBase)
        );
        assert_eq!(prepared.resolved_url(), "not-a-url");
    }
}
