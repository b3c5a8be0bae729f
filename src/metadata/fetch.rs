//! HTTP capability used to download metadata documents.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::MetadataError;

/// Parsed document, or the reason it could not be obtained.
pub type FetchOutcome = Result<serde_json::Value, MetadataError>;

const DEFAULT_USER_AGENT: &str = concat!("cartesiscan/", env!("CARGO_PKG_VERSION"));

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// `Err` holds the reason the body could not be read.
    pub body: Result<String, String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network fetch capability.
///
/// Implementations must stop the underlying request when the returned future
/// is dropped; the resolver relies on this to cancel superseded fetches.
#[async_trait]
pub trait MetadataHttp: Send + Sync + 'static {
    /// Issue a GET request. Only transport failures (DNS, connection...) are
    /// errors; any status code is a response.
    async fn get(&self, url: &Url) -> Result<HttpResponse, MetadataError>;
}

/// [`MetadataHttp`] backed by a reqwest client.
#[derive(Clone)]
pub struct ReqwestMetadataHttp {
    client: reqwest::Client,
}

impl ReqwestMetadataHttp {
    pub fn new() -> Result<Self, MetadataError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataHttp for ReqwestMetadataHttp {
    async fn get(&self, url: &Url) -> Result<HttpResponse, MetadataError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string());
        Ok(HttpResponse { status, body })
    }
}

/// Turn an HTTP response into a fetch outcome.
///
/// - 2xx: the body parsed as JSON
/// - anything else: an error carrying the body text, or the status code
///   when the body itself could not be read
pub fn interpret_response(response: HttpResponse, lenient_json: bool) -> FetchOutcome {
    let status = response.status;

    if !response.is_success() {
        let message = response
            .body
            .unwrap_or_else(|_| format!("Request failed with status code {status}"));
        return Err(MetadataError::HttpStatus { status, message });
    }

    let body = response.body.map_err(MetadataError::Transport)?;
    let parsed = if lenient_json {
        cartesiscan_common::json::parse_lenient(&body)
    } else {
        serde_json::from_str(&body)
    };
    parsed.map_err(|e| MetadataError::InvalidJson(e.to_string()))
}

/// Fetch and interpret `url`, giving up as soon as `cancel` fires.
///
/// Returns None when cancelled; the pending request is dropped.
pub async fn fetch_metadata<H: MetadataHttp + ?Sized>(
    http: &H,
    url: &Url,
    cancel: &CancellationToken,
    lenient_json: bool,
) -> Option<FetchOutcome> {
    let response = tokio::select! {
        biased;
        () = cancel.cancelled() => return None,
        response = http.get(url) => response,
    };

    Some(response.and_then(|response| interpret_response(response, lenient_json)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: Ok(body.to_string()),
        }
    }

    #[test]
    fn test_success_parses_json() {
        let outcome = interpret_response(response(200, r#"{"name":"X"}"#), false);
        assert_eq!(outcome, Ok(json!({ "name": "X" })));
    }

    #[test]
    fn test_error_status_uses_body() {
        let outcome = interpret_response(response(404, "token does not exist"), false);
        assert_eq!(
            outcome,
            Err(MetadataError::HttpStatus {
                status: 404,
                message: "token does not exist".into(),
            })
        );
    }

    #[test]
    fn test_error_status_with_unreadable_body() {
        let outcome = interpret_response(
            HttpResponse {
                status: 500,
                body: Err("connection reset".into()),
            },
            false,
        );
        let err = outcome.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_invalid_json() {
        let outcome = interpret_response(response(200, "<html></html>"), false);
        assert!(matches!(outcome, Err(MetadataError::InvalidJson(_))));
    }

    #[test]
    fn test_lenient_json() {
        let body = r#"{"name":""Rage Shout" DireWolf"}"#;
        assert!(interpret_response(response(200, body), false).is_err());
        let value = interpret_response(response(200, body), true).unwrap();
        assert_eq!(value["name"], "\"Rage Shout\" DireWolf");
    }

    struct NeverHttp;

    #[async_trait]
    impl MetadataHttp for NeverHttp {
        async fn get(&self, _url: &Url) -> Result<HttpResponse, MetadataError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_fetch_metadata_observes_cancellation() {
        let url = Url::parse("https://x/1").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(fetch_metadata(&NeverHttp, &url, &cancel, false).await, None);
    }
}
