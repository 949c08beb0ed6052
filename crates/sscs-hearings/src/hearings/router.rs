use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};

use super::auth::{service_token, ServiceAuthValidator};
use super::ccd::CcdCaseService;
use super::error::HearingsError;
use super::hmc::HmcError;
use super::values::{
    ServiceHearingRequest, ServiceHearingValues, ServiceHearingValuesService, ServiceLinkedCase,
};
use crate::error::AppError;

/// Shared state of the service hearing endpoints.
pub struct ServiceHearingsState<C, A> {
    pub values: Arc<ServiceHearingValuesService<C>>,
    pub auth: Arc<A>,
}

impl<C, A> Clone for ServiceHearingsState<C, A> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
            auth: Arc::clone(&self.auth),
        }
    }
}

/// Router builder exposing the endpoints the hearings platform calls back on.
pub fn service_hearings_router<C, A>(
    values: Arc<ServiceHearingValuesService<C>>,
    auth: Arc<A>,
) -> Router
where
    C: CcdCaseService + 'static,
    A: ServiceAuthValidator + 'static,
{
    Router::new()
        .route("/serviceHearingValues", post(values_handler::<C, A>))
        .route("/serviceLinkedCases", post(linked_cases_handler::<C, A>))
        .with_state(ServiceHearingsState { values, auth })
}

pub(crate) async fn values_handler<C, A>(
    State(state): State<ServiceHearingsState<C, A>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ServiceHearingValues>, AppError>
where
    C: CcdCaseService + 'static,
    A: ServiceAuthValidator + 'static,
{
    let request = authorised_request(&headers, state.auth.as_ref(), &body).await?;
    let values = state.values.values(&request.case_reference).await?;
    Ok(Json(values))
}

pub(crate) async fn linked_cases_handler<C, A>(
    State(state): State<ServiceHearingsState<C, A>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<ServiceLinkedCase>>, AppError>
where
    C: CcdCaseService + 'static,
    A: ServiceAuthValidator + 'static,
{
    let request = authorised_request(&headers, state.auth.as_ref(), &body).await?;
    let linked = state.values.linked_cases(&request.case_reference).await?;
    Ok(Json(linked))
}

/// Checks the caller's service token, then reads the body.
async fn authorised_request<A: ServiceAuthValidator>(
    headers: &HeaderMap,
    auth: &A,
    body: &[u8],
) -> Result<ServiceHearingRequest, AppError> {
    let token = service_token(headers)?;
    auth.validate(token).await?;
    Ok(serde_json::from_slice(body)?)
}

pub(crate) fn hearings_error_status(error: &HearingsError) -> StatusCode {
    match error {
        HearingsError::InvalidCaseId(_) => StatusCode::BAD_REQUEST,
        HearingsError::CaseNotFound(_) => StatusCode::NOT_FOUND,
        HearingsError::Hmc(HmcError::ResponseStatus { status, .. }) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        other if other.is_mapping() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
