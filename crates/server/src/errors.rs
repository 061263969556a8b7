use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::{error, warn};

/// Error response body: `{"error": <title>, "detail": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.title, "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let (status, title) = match &e {
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ServiceError::DependencyUnreachable { .. } => (StatusCode::BAD_GATEWAY, "Dependency Unreachable"),
            ServiceError::DependencyTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "Dependency Timeout"),
            ServiceError::DependencyRejected { .. } => (StatusCode::BAD_GATEWAY, "Dependency Rejected"),
            ServiceError::MalformedResponse { .. } => (StatusCode::BAD_GATEWAY, "Malformed Dependency Response"),
            ServiceError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Storage Error"),
            ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), err = %e, "request failed");
        } else {
            warn!(status = status.as_u16(), err = %e, "request rejected");
        }
        Self::new(status, title, Some(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("city must not be blank".into()), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("owner", 9999), StatusCode::NOT_FOUND),
            (
                ServiceError::DependencyUnreachable { service: "people-service".into(), message: "refused".into() },
                StatusCode::BAD_GATEWAY,
            ),
            (
                ServiceError::DependencyTimeout { service: "pets-service".into(), message: "5s".into() },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (ServiceError::DependencyRejected { service: "pets-service".into(), status: 500 }, StatusCode::BAD_GATEWAY),
            (
                ServiceError::MalformedResponse { service: "pets-service".into(), message: "eof".into() },
                StatusCode::BAD_GATEWAY,
            ),
            (ServiceError::Db("connection reset".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }
}
