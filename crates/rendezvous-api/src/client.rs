// Backend HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining, bearer-token
// attachment and status/error-body mapping. Endpoint groups (session,
// books, stats) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{AuthStrategy, TokenStore};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Error bodies are `{"error": "..."}` or `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Raw HTTP client for the Books Rendezvous backend.
///
/// Cheap to clone: the underlying `reqwest::Client` and token store are
/// both reference-counted. The bearer token is read from the token store
/// on every request, so a token persisted by one clone is immediately
/// visible to all others.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl BackendClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the backend expects cookies on every request).
    pub fn new(
        base_url: Url,
        tokens: Arc<dyn TokenStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token store bearer tokens are read from.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the base URL. Segments are
    /// percent-encoded; an empty final segment yields a trailing slash.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Start a request, attaching the bearer token for `Bearer` calls.
    ///
    /// A missing token is not an error here: the request goes out
    /// without an `Authorization` header and the backend answers 400/401.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        auth: AuthStrategy,
    ) -> Result<reqwest::RequestBuilder, Error> {
        debug!("{method} {url}");
        let builder = self.http.request(method, url);
        match auth {
            AuthStrategy::Anonymous => Ok(builder),
            AuthStrategy::Bearer => match self.tokens.load()? {
                Some(token) => Ok(builder.bearer_auth(token.expose_secret())),
                None => {
                    trace!("no access token persisted, sending without bearer");
                    Ok(builder)
                }
            },
        }
    }

    /// Send a request and decode a JSON success body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let resp = builder.send().await.map_err(Error::Transport)?;
        let body = Self::check_status(resp).await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    /// Send a request, ignoring the success body.
    pub(crate) async fn send_empty(&self, builder: reqwest::RequestBuilder) -> Result<(), Error> {
        let resp = builder.send().await.map_err(Error::Transport)?;
        Self::check_status(resp).await.map(drop)
    }

    /// Map non-success statuses into typed errors; return the body text
    /// on success.
    async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if status.is_success() {
            return resp.text().await.map_err(Error::Transport);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        trace!(status = status.as_u16(), %message, "request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => Error::Authentication { message },
            // The JWT middleware answers 400 for a missing or malformed token.
            StatusCode::BAD_REQUEST if message.contains("JWT") => {
                Error::Authentication { message }
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => Error::NotFound { message },
            _ => Error::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), String::from)
        })
}
