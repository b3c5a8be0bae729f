//! Resolution states and the published result.

use serde::{Serialize, Serializer};

use super::document::TokenMetadataDocument;
use super::fetch::FetchOutcome;
use super::uri::{PreparedUrl, UrlKind};
use crate::error::MetadataError;

/// Default gateway used to turn `ipfs://` URIs into fetchable URLs.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io";

/// Where a metadata resolution stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    /// No URI template or no token id: nothing to resolve.
    Idle,
    /// A network request is in flight.
    Fetching,
    /// HTTP URL, fetched and parsed as JSON.
    Success,
    /// Valid URL with a scheme that must be resolved out-of-band.
    NotHttp,
    /// HTTP URL whose fetch failed or returned a non-2xx status.
    HttpNetworkError,
    /// The URI could not be parsed.
    Errored,
}

impl ResolutionState {
    /// Every state except `Fetching` is final for its key.
    pub fn is_terminal(self) -> bool {
        self != ResolutionState::Fetching
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            ResolutionState::HttpNetworkError | ResolutionState::Errored
        )
    }

    /// Message shown to the user next to the raw URL.
    pub fn feedback_message(self) -> Option<&'static str> {
        match self {
            ResolutionState::HttpNetworkError => Some("We could not fetch the metadata."),
            ResolutionState::NotHttp => {
                Some("The URI is valid, but it is not an HTTP protocol.")
            }
            ResolutionState::Errored => {
                Some("Something is wrong with the URI returned by the contract.")
            }
            ResolutionState::Idle | ResolutionState::Fetching | ResolutionState::Success => None,
        }
    }
}

impl std::fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResolutionState::Idle => "idle",
            ResolutionState::Fetching => "fetching",
            ResolutionState::Success => "success",
            ResolutionState::NotHttp => "not_http",
            ResolutionState::HttpNetworkError => "http_network_error",
            ResolutionState::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Classify a resolution from its URL preparation and fetch outcome.
///
/// `fetch` is None when no request was issued, or while it is pending.
pub fn classify(prepared: &PreparedUrl, fetch: Option<&FetchOutcome>) -> ResolutionState {
    match (prepared.kind(), fetch) {
        (UrlKind::Http, Some(Ok(_))) => ResolutionState::Success,
        (UrlKind::Http, Some(Err(_))) => ResolutionState::HttpNetworkError,
        (UrlKind::Http, None) => ResolutionState::Fetching,
        (UrlKind::NotHttp, _) => ResolutionState::NotHttp,
        (UrlKind::Invalid, _) => ResolutionState::Errored,
    }
}

/// The value published to the rendering layer each time the resolver advances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataResult {
    pub state: ResolutionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_http: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<MetadataError>,
}

fn serialize_error<S: Serializer>(
    error: &Option<MetadataError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_str(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl MetadataResult {
    pub fn idle() -> Self {
        Self::with_state(ResolutionState::Idle)
    }

    pub fn fetching() -> Self {
        Self::with_state(ResolutionState::Fetching)
    }

    fn with_state(state: ResolutionState) -> Self {
        Self {
            state,
            is_http: None,
            url: None,
            data: None,
            error: None,
        }
    }

    /// Build the terminal result for a prepared URL and its fetch outcome.
    pub fn from_outcome(prepared: &PreparedUrl, fetch: Option<FetchOutcome>) -> Self {
        let state = classify(prepared, fetch.as_ref());
        let is_http = prepared.is_valid_url().then(|| prepared.is_http());

        let (data, error) = match fetch {
            Some(Ok(document)) => (Some(document), None),
            Some(Err(e)) => (None, Some(e)),
            None => (
                None,
                prepared
                    .parse_error()
                    .map(|source| MetadataError::InvalidUrl {
                        url: prepared.resolved_url().to_string(),
                        source,
                    }),
            ),
        };

        Self {
            state,
            is_http,
            url: Some(prepared.resolved_url().to_string()),
            data,
            error,
        }
    }

    /// `errored` result for a prepared URL that could not be processed.
    pub fn errored(prepared: &PreparedUrl, error: MetadataError) -> Self {
        Self {
            state: ResolutionState::Errored,
            is_http: prepared.is_valid_url().then(|| prepared.is_http()),
            url: Some(prepared.resolved_url().to_string()),
            data: None,
            error: Some(error),
        }
    }

    /// Typed view of the fetched document.
    pub fn document(&self) -> Option<TokenMetadataDocument> {
        self.data.as_ref().map(TokenMetadataDocument::from_value)
    }

    /// Gateway URL for an `ipfs://` result, e.g. `https://ipfs.io/ipfs/<cid>`.
    pub fn ipfs_gateway_url(&self, gateway: &str) -> Option<String> {
        let url = self.url.as_deref()?;
        let path = url.strip_prefix("ipfs://")?;
        let path = path.strip_prefix("ipfs/").unwrap_or(path);
        Some(format!("{}/ipfs/{}", gateway.trim_end_matches('/'), path))
    }

    /// Document embedded in a `data:` URI result.
    pub fn inline_document(&self) -> Option<serde_json::Value> {
        if self.state != ResolutionState::NotHttp {
            return None;
        }
        cartesiscan_common::data_uri::decode_json_data_uri(self.url.as_deref()?)
    }
}
