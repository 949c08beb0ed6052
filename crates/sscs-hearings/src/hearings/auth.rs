//! Service-to-service authorisation for the endpoints the hearings platform
//! calls.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::debug;

pub const SERVICE_AUTHORIZATION: &str = "serviceauthorization";

#[derive(Debug, thiserror::Error)]
pub enum ServiceAuthError {
    #[error("missing ServiceAuthorization header")]
    Missing,
    #[error("service token rejected: {0}")]
    Rejected(String),
    #[error("service auth provider unavailable: {0}")]
    Unavailable(String),
}

/// Checks a caller's service token and returns the calling service's name.
#[async_trait]
pub trait ServiceAuthValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<String, ServiceAuthError>;
}

/// Pulls the bearer token out of the `ServiceAuthorization` header. A bare
/// token without the `Bearer` prefix is accepted too.
pub fn service_token(headers: &HeaderMap) -> Result<&str, ServiceAuthError> {
    let value = headers
        .get(SERVICE_AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ServiceAuthError::Missing)?;

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    if token.is_empty() {
        return Err(ServiceAuthError::Missing);
    }
    Ok(token)
}

/// Validates tokens against the S2S provider's `/details` endpoint.
#[derive(Debug, Clone)]
pub struct S2sServiceAuth {
    base_url: String,
    authorised: HashSet<String>,
    http: Client,
}

impl S2sServiceAuth {
    pub fn new(
        base_url: impl Into<String>,
        authorised: impl IntoIterator<Item = String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(base_url, authorised, http))
    }

    pub fn with_http_client(
        base_url: impl Into<String>,
        authorised: impl IntoIterator<Item = String>,
        http: Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorised: authorised.into_iter().collect(),
            http,
        }
    }
}

#[async_trait]
impl ServiceAuthValidator for S2sServiceAuth {
    async fn validate(&self, token: &str) -> Result<String, ServiceAuthError> {
        let response = self
            .http
            .get(format!("{}/details", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| ServiceAuthError::Unavailable(err.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ServiceAuthError::Rejected("invalid service token".to_string()));
            }
            status => {
                return Err(ServiceAuthError::Unavailable(format!(
                    "details endpoint responded {status}"
                )));
            }
        }

        let service = response
            .text()
            .await
            .map_err(|err| ServiceAuthError::Unavailable(err.to_string()))?
            .trim()
            .trim_matches('"')
            .to_string();
        if !self.authorised.contains(&service) {
            return Err(ServiceAuthError::Rejected(format!(
                "service `{service}` is not authorised"
            )));
        }
        debug!(%service, "service token accepted");
        Ok(service)
    }
}

/// Accepts a fixed set of tokens. For local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticServiceAuth {
    tokens: HashSet<String>,
}

impl StaticServiceAuth {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ServiceAuthValidator for StaticServiceAuth {
    async fn validate(&self, token: &str) -> Result<String, ServiceAuthError> {
        if self.tokens.contains(token) {
            Ok("static".to_string())
        } else {
            Err(ServiceAuthError::Rejected("unknown service token".to_string()))
        }
    }
}
