//! Verification gateway: checks the candidate token against the remote resource.
//!
//! Verification is a single GET of `<base-url>/<token>` with a bounded timeout.
//! There is no retry. Every result, including network failure, is reported
//! as a [`VerificationOutcome`] rather than an error.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Maximum number of response body characters kept for the report.
pub const BODY_PREVIEW_CHARS: usize = 600;

/// Classified result of one verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// The endpoint answered with a 2xx status.
    Granted {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body_preview: String,
    },
    /// The endpoint answered with a non-success status.
    Rejected {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// No HTTP response was received.
    Unreachable {
        /// The requested URL.
        url: String,
        /// Why the request failed.
        reason: String,
    },
}

impl VerificationOutcome {
    /// Whether access was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// The requested URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Granted { url, .. } | Self::Rejected { url, .. } | Self::Unreachable { url, .. } => url,
        }
    }
}

/// Something that can check a candidate token.
#[async_trait::async_trait]
pub trait VerificationGateway: Send + Sync {
    /// Verify a non-empty token with one request.
    async fn verify(&self, token: &str) -> VerificationOutcome;
}

/// HTTP implementation of the verification gateway.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or cannot take path
    /// segments, or if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The URL requested for a token: the token is the last path segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for tokens that URL normalization would
    /// drop (`.` and `..`).
    pub fn endpoint(&self, token: &str) -> Result<Url> {
        append_segment(&self.base_url, token)
    }

    fn describe_failure(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("timed out after {}s", self.timeout.as_secs_f64())
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        }
    }
}

#[async_trait::async_trait]
impl VerificationGateway for HttpGateway {
    async fn verify(&self, token: &str) -> VerificationOutcome {
        let url = match self.endpoint(token) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Token cannot be sent as a path segment");
                return VerificationOutcome::Unreachable {
                    url: format!("{}/{token}", self.base_url.as_str().trim_end_matches('/')),
                    reason: e.to_string(),
                };
            }
        };
        info!("Probing endpoint {url}");

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = self.describe_failure(&e);
                warn!(%url, reason = %reason, "Endpoint unreachable");
                return VerificationOutcome::Unreachable {
                    url: url.to_string(),
                    reason,
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!(error = %e, "Failed to read response body");
                String::new()
            });
            info!(status = status.as_u16(), "Access granted");
            VerificationOutcome::Granted {
                url: url.to_string(),
                status: status.as_u16(),
                body_preview: body.chars().take(BODY_PREVIEW_CHARS).collect(),
            }
        } else {
            info!(status = status.as_u16(), "Token rejected");
            VerificationOutcome::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
            }
        }
    }
}

/// Parse a base URL that can have path segments appended.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the URL does not parse or cannot be a base.
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url).map_err(|e| Error::invalid_url(base_url, e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(Error::invalid_url(base_url, "URL cannot take path segments"));
    }
    Ok(url)
}

/// Append one percent-encoded path segment, ignoring a trailing slash on the base.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] for an empty segment or a dot segment, which
/// URL normalization would drop or resolve against the base.
pub(crate) fn append_segment(base: &Url, segment: &str) -> Result<Url> {
    if matches!(segment, "" | "." | "..") {
        return Err(Error::invalid_url(
            format!("{}/{segment}", base.as_str().trim_end_matches('/')),
            "segment would be dropped from the path",
        ));
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::invalid_url(base.as_str(), "URL cannot take path segments"))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port, serve_responses, silent_listener};

    #[test]
    fn test_endpoint_appends_token() {
        let gateway = HttpGateway::new("http://localhost:7373/api/v1", Duration::from_secs(5)).unwrap();
        assert_eq!(
            gateway.endpoint("SHADOWX").unwrap().as_str(),
            "http://localhost:7373/api/v1/SHADOWX"
        );
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let gateway = HttpGateway::new("http://localhost:7373/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            gateway.endpoint("AB12").unwrap().as_str(),
            "http://localhost:7373/api/v1/AB12"
        );
    }

    #[test]
    fn test_endpoint_encodes_reserved_characters() {
        let gateway = HttpGateway::new("http://localhost/api", Duration::from_secs(5)).unwrap();
        assert_eq!(
            gateway.endpoint("a/b?c").unwrap().as_str(),
            "http://localhost/api/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_endpoint_rejects_dot_segments() {
        let gateway = HttpGateway::new("http://localhost:7373/api/v1", Duration::from_secs(5)).unwrap();
        assert!(matches!(gateway.endpoint("."), Err(Error::InvalidUrl { .. })));
        assert!(matches!(gateway.endpoint(".."), Err(Error::InvalidUrl { .. })));
        assert_eq!(
            gateway.endpoint("...").unwrap().as_str(),
            "http://localhost:7373/api/v1/..."
        );
        assert_eq!(
            gateway.endpoint(".A").unwrap().as_str(),
            "http://localhost:7373/api/v1/.A"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base() {
        let err = HttpGateway::new("no scheme here", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));

        let err = HttpGateway::new("data:text/plain,hello", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_outcome_accessors() {
        let granted = VerificationOutcome::Granted {
            url: "http://x/T".to_string(),
            status: 200,
            body_preview: String::new(),
        };
        let rejected = VerificationOutcome::Rejected {
            url: "http://x/T".to_string(),
            status: 404,
        };
        assert!(granted.is_granted());
        assert!(!rejected.is_granted());
        assert_eq!(rejected.url(), "http://x/T");
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = VerificationOutcome::Unreachable {
            url: "http://x/T".to_string(),
            reason: "connection failed".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "unreachable");
        assert_eq!(json["reason"], "connection failed");
    }

    #[tokio::test]
    async fn test_verify_granted() {
        let (addr, mut requests) = serve_responses(vec![(200, r#"{"message":"welcome"}"#.to_string())]).await;
        let gateway = HttpGateway::new(&format!("http://{addr}/api/v1"), Duration::from_secs(5)).unwrap();

        let outcome = gateway.verify("SHADOW").await;
        match outcome {
            VerificationOutcome::Granted { status, body_preview, .. } => {
                assert_eq!(status, 200);
                assert!(body_preview.contains("welcome"));
            }
            other => panic!("Expected Granted, got {other:?}"),
        }
        assert_eq!(requests.recv().await.unwrap(), "GET /api/v1/SHADOW HTTP/1.1");
    }

    #[tokio::test]
    async fn test_verify_any_2xx_is_granted() {
        let (addr, _requests) = serve_responses(vec![(204, String::new())]).await;
        let gateway = HttpGateway::new(&format!("http://{addr}/api/v1"), Duration::from_secs(5)).unwrap();

        assert!(gateway.verify("T").await.is_granted());
    }

    #[tokio::test]
    async fn test_verify_body_preview_is_truncated() {
        let body = "x".repeat(BODY_PREVIEW_CHARS + 100);
        let (addr, _requests) = serve_responses(vec![(200, body)]).await;
        let gateway = HttpGateway::new(&format!("http://{addr}/api/v1"), Duration::from_secs(5)).unwrap();

        match gateway.verify("T").await {
            VerificationOutcome::Granted { body_preview, .. } => {
                assert_eq!(body_preview.len(), BODY_PREVIEW_CHARS);
            }
            other => panic!("Expected Granted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_verify_rejected() {
        let (addr, _requests) = serve_responses(vec![(404, r#"{"detail":"Not Found"}"#.to_string())]).await;
        let gateway = HttpGateway::new(&format!("http://{addr}/api/v1"), Duration::from_secs(5)).unwrap();

        let outcome = gateway.verify("WRONG").await;
        assert_eq!(
            outcome,
            VerificationOutcome::Rejected {
                url: format!("http://{addr}/api/v1/WRONG"),
                status: 404,
            }
        );
    }

    #[tokio::test]
    async fn test_verify_dot_token_never_hits_base() {
        let (addr, mut requests) = serve_responses(vec![(200, "base".to_string())]).await;
        let gateway = HttpGateway::new(&format!("http://{addr}/api/v1"), Duration::from_secs(5)).unwrap();

        let outcome = gateway.verify("..").await;
        assert!(!outcome.is_granted());
        assert_eq!(outcome.url(), format!("http://{addr}/api/v1/.."));
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_verify_timeout_is_unreachable() {
        let addr = silent_listener().await;
        let gateway =
            HttpGateway::new(&format!("http://{addr}/api/v1"), Duration::from_millis(300)).unwrap();

        let started = std::time::Instant::now();
        let outcome = gateway.verify("T").await;
        match outcome {
            VerificationOutcome::Unreachable { reason, .. } => {
                assert!(reason.contains("timed out"), "unexpected reason: {reason}");
            }
            other => panic!("Expected Unreachable, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_verify_unreachable() {
        let addr = closed_port().await;
        let gateway = HttpGateway::new(&format!("http://{addr}/api/v1"), Duration::from_secs(2)).unwrap();

        let outcome = gateway.verify("T").await;
        assert!(matches!(outcome, VerificationOutcome::Unreachable { .. }));
        assert_eq!(outcome.url(), format!("http://{addr}/api/v1/T"));
    }
}
