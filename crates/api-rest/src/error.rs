use api_shared::ErrorRes;
use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use screening_core::ScreeningError;

/// An error response rendered as `{"ok": false, "error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ScreeningError> for ApiError {
    fn from(err: ScreeningError) -> Self {
        match err {
            ScreeningError::UnknownDisease(_) => Self::not_found(err.to_string()),
            ScreeningError::MalformedInput { .. } => Self::bad_request(err.to_string()),
            other => {
                tracing::error!("screening request failed: {}", other);
                Self::internal(other)
            }
        }
    }
}

/// Extractor rejections keep axum's status code but use the JSON error body.
macro_rules! from_rejection {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

from_rejection!(FormRejection, JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorRes {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screening_errors_map_to_status_codes() {
        let unknown = ApiError::from(ScreeningError::UnknownDisease("flu".into()));
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let malformed = ApiError::from(ScreeningError::MalformedInput {
            fields: vec!["Glucose".into()],
        });
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert!(malformed.message.contains("Glucose"));

        let write = ApiError::from(ScreeningError::StorageWrite(std::io::Error::other("disk full")));
        assert_eq!(write.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn query_rejection_keeps_its_status() {
        #[derive(Debug, serde::Deserialize)]
        struct Paging {
            #[allow(dead_code)]
            page: u32,
        }

        let uri: axum::http::Uri = "/results?page=first".parse().unwrap();
        let rejection = axum::extract::Query::<Paging>::try_from_uri(&uri).unwrap_err();
        let err = ApiError::from(rejection);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!err.message.is_empty());
    }
}
