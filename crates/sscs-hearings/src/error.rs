use crate::config::ConfigError;
use crate::hearings::auth::ServiceAuthError;
use crate::hearings::listener::ListenerError;
use crate::hearings::venues::VenueError;
use crate::hearings::HearingsError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Http(reqwest::Error),
    Venues(VenueError),
    Listener(ListenerError),
    Hearings(HearingsError),
    Message(serde_json::Error),
    ServiceAuth(ServiceAuthError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Http(err) => write!(f, "http client error: {}", err),
            AppError::Venues(err) => write!(f, "venue reference data error: {}", err),
            AppError::Listener(err) => write!(f, "listener error: {}", err),
            AppError::Hearings(err) => write!(f, "hearings error: {}", err),
            AppError::Message(err) => write!(f, "invalid message: {}", err),
            AppError::ServiceAuth(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Http(err) => Some(err),
            AppError::Venues(err) => Some(err),
            AppError::Listener(err) => Some(err),
            AppError::Hearings(err) => Some(err),
            AppError::Message(err) => Some(err),
            AppError::ServiceAuth(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Message(_) => StatusCode::BAD_REQUEST,
            AppError::Hearings(err) => crate::hearings::router::hearings_error_status(err),
            AppError::ServiceAuth(ServiceAuthError::Missing) => StatusCode::UNAUTHORIZED,
            AppError::ServiceAuth(ServiceAuthError::Rejected(_)) => StatusCode::FORBIDDEN,
            AppError::ServiceAuth(ServiceAuthError::Unavailable(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Http(_)
            | AppError::Venues(_)
            | AppError::Listener(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() || matches!(self, AppError::ServiceAuth(_)) {
            warn!(error = %self, status = status.as_u16(), "request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ServiceAuthError> for AppError {
    fn from(value: ServiceAuthError) -> Self {
        Self::ServiceAuth(value)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<VenueError> for AppError {
    fn from(value: VenueError) -> Self {
        Self::Venues(value)
    }
}

impl From<ListenerError> for AppError {
    fn from(value: ListenerError) -> Self {
        Self::Listener(value)
    }
}

impl From<HearingsError> for AppError {
    fn from(value: HearingsError) -> Self {
        Self::Hearings(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hearings::CaseId;

    #[test]
    fn hearings_errors_keep_their_http_status() {
        let response = AppError::from(HearingsError::CaseNotFound(CaseId(1))).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response =
            AppError::from(HearingsError::InvalidCaseId("abc".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_auth_errors_map_to_auth_statuses() {
        let cases = [
            (ServiceAuthError::Missing, StatusCode::UNAUTHORIZED),
            (
                ServiceAuthError::Rejected("unknown".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceAuthError::Unavailable("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(AppError::from(error).into_response().status(), expected);
        }
    }
}
