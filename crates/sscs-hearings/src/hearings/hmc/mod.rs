//! Hearings management platform: wire schema and REST client.

pub mod schema;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::domain::HearingId;
pub use schema::{
    CaseCategory, CaseDetails, CategoryType, GetRequestDetails, HearingCancelRequest,
    HearingChannel, HearingDaySchedule, HearingDetails, HearingGetResponse, HearingLocation,
    HearingPriority, HearingRequestPayload, HearingResponse, HearingWindow, HmcUpdateResponse,
    IndividualDetails, OrganisationDetails, PanelPreference, PanelRequirements, PartyDetails,
    PartyType, RequestDetails, UnavailabilityRange,
};

/// Hearing operations offered by the platform's `/hearing` resource.
#[async_trait]
pub trait HmcHearingApi: Send + Sync {
    async fn create_hearing(
        &self,
        payload: &HearingRequestPayload,
    ) -> Result<HmcUpdateResponse, HmcError>;

    async fn update_hearing(
        &self,
        hearing_id: &HearingId,
        payload: &HearingRequestPayload,
    ) -> Result<HmcUpdateResponse, HmcError>;

    async fn cancel_hearing(
        &self,
        hearing_id: &HearingId,
        request: &HearingCancelRequest,
    ) -> Result<HmcUpdateResponse, HmcError>;

    async fn get_hearing(&self, hearing_id: &HearingId) -> Result<HearingGetResponse, HmcError>;
}

#[derive(Debug, thiserror::Error)]
pub enum HmcError {
    /// Any non-success status; the code is passed through to HTTP callers.
    #[error("hearings platform responded {status}: {body}")]
    ResponseStatus { status: u16, body: String },
    #[error("hearings platform unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected hearings platform response: {0}")]
    Decode(String),
}

/// Credentials and routing headers attached to every platform call.
#[derive(Debug, Clone, Default)]
pub struct HmcCredentials {
    pub idam_token: Option<String>,
    pub s2s_token: Option<String>,
    pub deployment_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpHmcClient {
    base_url: String,
    credentials: HmcCredentials,
    http: Client,
}

impl HttpHmcClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: HmcCredentials,
        timeout: Duration,
    ) -> Result<Self, HmcError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(base_url, credentials, http))
    }

    pub fn with_http_client(
        base_url: impl Into<String>,
        credentials: HmcCredentials,
        http: Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            http,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.credentials.idam_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(token) = &self.credentials.s2s_token {
            builder = builder.header("ServiceAuthorization", format!("Bearer {token}"));
        }
        if let Some(deployment) = &self.credentials.deployment_id {
            builder = builder.header("hmctsDeploymentId", deployment);
        }
        builder
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, HmcError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "hearings platform call");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HmcError::ResponseStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| HmcError::Decode(err.to_string()))
    }
}

fn hearing_path(hearing_id: &HearingId) -> String {
    format!("/hearing/{}", urlencoding::encode(&hearing_id.0))
}

#[async_trait]
impl HmcHearingApi for HttpHmcClient {
    async fn create_hearing(
        &self,
        payload: &HearingRequestPayload,
    ) -> Result<HmcUpdateResponse, HmcError> {
        self.send(Method::POST, "/hearing", Some(payload)).await
    }

    async fn update_hearing(
        &self,
        hearing_id: &HearingId,
        payload: &HearingRequestPayload,
    ) -> Result<HmcUpdateResponse, HmcError> {
        self.send(Method::PUT, &hearing_path(hearing_id), Some(payload))
            .await
    }

    async fn cancel_hearing(
        &self,
        hearing_id: &HearingId,
        request: &HearingCancelRequest,
    ) -> Result<HmcUpdateResponse, HmcError> {
        self.send(Method::DELETE, &hearing_path(hearing_id), Some(request))
            .await
    }

    async fn get_hearing(&self, hearing_id: &HearingId) -> Result<HearingGetResponse, HmcError> {
        self.send::<_, ()>(Method::GET, &hearing_path(hearing_id), None)
            .await
    }
}
