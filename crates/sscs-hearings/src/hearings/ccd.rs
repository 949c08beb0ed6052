use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{CaseId, SscsCaseData, SscsCaseDetails};
use super::status::CcdEvent;

/// Case store owned by CCD.
#[async_trait]
pub trait CcdCaseService: Send + Sync {
    /// Returns `None` when CCD has no case with this id.
    async fn get_case(&self, case_id: CaseId) -> Result<Option<SscsCaseDetails>, CcdError>;

    /// Submits the whole case, state included, as a single event.
    async fn update_case(&self, case: &SscsCaseDetails, event: CcdEvent) -> Result<(), CcdError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CcdError {
    #[error("case data store responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("case data store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected case data store response: {0}")]
    Decode(String),
}

/// Credentials attached to every CCD call.
#[derive(Debug, Clone, Default)]
pub struct CcdCredentials {
    pub idam_token: Option<String>,
    pub s2s_token: Option<String>,
}

/// reqwest-backed CCD data-store client.
#[derive(Debug, Clone)]
pub struct HttpCcdClient {
    base_url: String,
    credentials: CcdCredentials,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct StartEventResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct CaseDataContent<'a> {
    data: &'a SscsCaseData,
    state: &'a str,
    event: EventPayload<'a>,
    event_token: String,
    ignore_warning: bool,
}

#[derive(Debug, Serialize)]
struct EventPayload<'a> {
    id: &'a str,
    summary: &'a str,
    description: &'a str,
}

impl HttpCcdClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: CcdCredentials,
        timeout: Duration,
    ) -> Result<Self, CcdError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(base_url, credentials, http))
    }

    pub fn with_http_client(
        base_url: impl Into<String>,
        credentials: CcdCredentials,
        http: Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            credentials,
            http,
        }
    }

    fn authorise(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder.header("experimental", "true");
        if let Some(token) = &self.credentials.idam_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(token) = &self.credentials.s2s_token {
            builder = builder.header("ServiceAuthorization", format!("Bearer {token}"));
        }
        builder
    }

    async fn start_event(&self, case_id: CaseId, event_id: &str) -> Result<String, CcdError> {
        let url = format!(
            "{}/cases/{case_id}/event-triggers/{}",
            self.base_url,
            urlencoding::encode(event_id)
        );
        let response = self.authorise(self.http.get(&url)).send().await?;
        let response = ensure_success(response).await?;
        let started: StartEventResponse = response
            .json()
            .await
            .map_err(|err| CcdError::Decode(err.to_string()))?;
        Ok(started.token)
    }
}

#[async_trait]
impl CcdCaseService for HttpCcdClient {
    async fn get_case(&self, case_id: CaseId) -> Result<Option<SscsCaseDetails>, CcdError> {
        let url = format!("{}/cases/{case_id}", self.base_url);
        let response = self.authorise(self.http.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%case_id, "case not found in data store");
            return Ok(None);
        }

        let response = ensure_success(response).await?;
        let details = response
            .json::<SscsCaseDetails>()
            .await
            .map_err(|err| CcdError::Decode(err.to_string()))?;
        Ok(Some(details))
    }

    async fn update_case(&self, case: &SscsCaseDetails, event: CcdEvent) -> Result<(), CcdError> {
        let event_id = event.event_type.ccd_id();
        let event_token = self.start_event(case.id, event_id).await?;

        let body = CaseDataContent {
            data: &case.data,
            state: &case.state,
            event: EventPayload {
                id: event_id,
                summary: event.summary,
                description: event.description,
            },
            event_token,
            ignore_warning: false,
        };

        let url = format!("{}/cases/{}/events", self.base_url, case.id);
        let response = self.authorise(self.http.post(&url)).json(&body).send().await?;
        ensure_success(response).await?;
        debug!(case_id = %case.id, event = event_id, "case event submitted");
        Ok(())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CcdError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CcdError::Status {
        status: status.as_u16(),
        body,
    })
}
