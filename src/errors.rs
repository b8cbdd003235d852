use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::{logger::Masked, uploads::UploadError, JsonResponse};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    NotAuthorized,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("Internal server error")]
    ServerError(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJson {
    pub error: String,
}

impl RequestErrorJson {
    pub fn new(error: &str) -> RequestErrorJson {
        RequestErrorJson {
            error: error.to_string(),
        }
    }
}

impl RequestError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn permission_denied() -> Self {
        Self::Forbidden("Permission denied")
    }

    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJson> {
        let (status_code, json) = match self {
            RequestError::Validation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJson::new(message),
            ),
            RequestError::NotAuthorized => (
                StatusCode::UNAUTHORIZED,
                RequestErrorJson::new("Unauthorized"),
            ),
            RequestError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, RequestErrorJson::new(message))
            }
            RequestError::NotFound(message) => {
                (StatusCode::NOT_FOUND, RequestErrorJson::new(message))
            }
            RequestError::Conflict(message) => {
                (StatusCode::CONFLICT, RequestErrorJson::new(message))
            }
            RequestError::Upload(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJson::new(&e.to_string()),
            ),
            RequestError::ServerError(e) => {
                tracing::error!(error = %Masked(format!("{e:#}")), "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJson::new("Internal server error"),
                )
            }
            RequestError::DatabaseError(e) => {
                tracing::error!(error = %Masked(e), "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJson::new("Internal server error"),
                )
            }
        };
        (status_code, Json(json))
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_kind() {
        let cases = [
            (RequestError::validation("Title and content are required"), StatusCode::UNPROCESSABLE_ENTITY),
            (RequestError::NotAuthorized, StatusCode::UNAUTHORIZED),
            (RequestError::permission_denied(), StatusCode::FORBIDDEN),
            (RequestError::NotFound("Article not found"), StatusCode::NOT_FOUND),
            (RequestError::Conflict("taken".into()), StatusCode::CONFLICT),
            (RequestError::Upload(UploadError::Empty), StatusCode::UNPROCESSABLE_ENTITY),
            (RequestError::ServerError(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
            (RequestError::DatabaseError(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(error.to_json_response().0, expected, "{error:?}");
        }
    }

    #[test]
    fn internal_errors_are_not_leaked_to_the_client() {
        let (_, Json(body)) =
            RequestError::ServerError(anyhow::anyhow!("password=hunter2")).to_json_response();
        assert_eq!(body.error, "Internal server error");
    }
}
