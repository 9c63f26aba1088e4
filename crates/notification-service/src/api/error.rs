//! API 错误响应

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parcel_shared::error::ParcelError;
use serde_json::json;

use crate::error::NotificationError;

/// 接口层错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("请求体无效: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Notification(e) => match e {
                NotificationError::Scheduling(_) => StatusCode::BAD_GATEWAY,
                NotificationError::Shared(ParcelError::Validation(_)) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "VALIDATION_ERROR",
            Self::Notification(e) => e.code(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "请求处理失败");
        }

        let body = json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_shared::events::NotificationTrigger;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (
                ApiError::InvalidBody("missing field".into()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                ApiError::from(NotificationError::Configuration {
                    trigger: NotificationTrigger::Delivered,
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
            ),
            (
                ApiError::from(NotificationError::Scheduling("queue offline".into())),
                StatusCode::BAD_GATEWAY,
                "SCHEDULING_ERROR",
            ),
            (
                ApiError::from(NotificationError::Shared(ParcelError::Validation(
                    "bad".into(),
                ))),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status_code(), status);
            assert_eq!(error.error_code(), code);
            assert_eq!(error.into_response().status(), status);
        }
    }
}
