//! 出勤服务错误类型定义
//!
//! 只有整批失败的情况才是错误；批次内单个成员的失败体现为 `failed` 结果。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::models::EventRef;
use crate::validation::ValidationReport;

/// 出勤服务错误
#[derive(Debug, Error)]
pub enum PresenceError {
    /// 请求体结构校验失败，携带全部违规项
    #[error("参数验证失败: {0}")]
    Validation(ValidationReport),

    #[error("参数验证失败: {0}")]
    InvalidParameter(String),

    #[error("事件不存在: {0}")]
    EventNotFound(EventRef),

    #[error("成员不存在: {0}")]
    MemberNotFound(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl PresenceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidParameter(_) => "VALIDATION_ERROR",
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::Database(_) => "STORAGE_FAILURE",
            Self::Migration(_) => "MIGRATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否可重试
    ///
    /// 存储层的瞬时错误可由调用方重试；本层不做自动重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) | Self::MemberNotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Migration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PresenceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 存储与内部错误的细节只写日志
        let (message, data) = match &self {
            Self::Validation(report) => (
                "参数验证失败".to_string(),
                json!({ "violations": report.violations }),
            ),
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                ("存储服务暂不可用，请稍后重试".to_string(), serde_json::Value::Null)
            }
            Self::Migration(e) => {
                tracing::error!(error = %e, "数据库迁移失败");
                ("服务内部错误".to_string(), serde_json::Value::Null)
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                ("服务内部错误".to_string(), serde_json::Value::Null)
            }
            other => (other.to_string(), serde_json::Value::Null),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": data
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationReport> for PresenceError {
    fn from(report: ValidationReport) -> Self {
        Self::Validation(report)
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for PresenceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidParameter(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PresenceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use crate::validation::validate_batch;
    use axum::body::to_bytes;

    fn validation_error() -> PresenceError {
        let report = validate_batch(&json!({ "eventId": "" }), EventKind::CellMeeting)
            .expect_err("payload must be rejected");
        PresenceError::Validation(report)
    }

    #[test]
    fn test_status_and_code_mapping() {
        let cases = vec![
            (validation_error(), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (
                PresenceError::InvalidParameter("month".into()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                PresenceError::EventNotFound(EventRef::cell_meeting("r1")),
                StatusCode::NOT_FOUND,
                "EVENT_NOT_FOUND",
            ),
            (
                PresenceError::MemberNotFound("m1".into()),
                StatusCode::NOT_FOUND,
                "MEMBER_NOT_FOUND",
            ),
            (
                PresenceError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_FAILURE",
            ),
            (
                PresenceError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status_code(), status, "{error}");
            assert_eq!(error.error_code(), code, "{error}");
        }
    }

    #[test]
    fn test_only_storage_errors_are_retryable() {
        assert!(PresenceError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!validation_error().is_retryable());
        assert!(!PresenceError::EventNotFound(EventRef::weekly_service("e")).is_retryable());
    }

    #[test]
    fn test_event_not_found_message() {
        let error = PresenceError::EventNotFound(EventRef::weekly_service("culto-1"));
        assert_eq!(error.to_string(), "事件不存在: WEEKLY_SERVICE culto-1");
    }

    #[tokio::test]
    async fn test_validation_response_lists_violations() {
        let response = validation_error().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let violations = body["data"]["violations"].as_array().unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0]["kind"], "INVALID_REFERENCE");
        assert_eq!(violations[1]["kind"], "EMPTY_BATCH");
    }

    #[tokio::test]
    async fn test_database_error_details_are_hidden() {
        let response = PresenceError::Database(sqlx::Error::Protocol("secret detail".into()))
            .into_response();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("secret detail"));
        assert!(text.contains("STORAGE_FAILURE"));
    }
}
