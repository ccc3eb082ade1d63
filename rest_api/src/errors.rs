// rest_api/src/errors.rs

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde_json::json;
use thiserror::Error;

use models::AllocationError;

#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Path(#[from] PathRejection),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),
}

impl RestApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestApiError::Allocation(e) => match e {
                AllocationError::InvalidTransition { .. }
                | AllocationError::InvalidCoordinates { .. }
                | AllocationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AllocationError::NotFound { .. }
                | AllocationError::UnknownSpecialty(_)
                | AllocationError::NoCapacityAvailable(_) => StatusCode::NOT_FOUND,
                AllocationError::AlreadyExists(_) | AllocationError::Conflict(_) => {
                    StatusCode::CONFLICT
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RestApiError::Body(rejection) => rejection.status(),
            RestApiError::Path(rejection) => rejection.status(),
            RestApiError::Query(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            RestApiError::Allocation(AllocationError::NoCapacityAvailable(code)) => {
                format!("No hospital with an available bed for specialty {}", code)
            }
            RestApiError::Allocation(e) if e.is_infrastructure() => {
                error!("[RestApi] internal error: {}", e);
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}
