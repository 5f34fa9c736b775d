use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct SimpleApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SimpleApiError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimpleApiError {
    pub code: String,
    pub message: String,
}

impl<T> SimpleApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message),
        }
    }

    pub fn error(message: &str) -> SimpleApiResponse<()> {
        SimpleApiResponse::<()>::error_with_code("ERROR", message)
    }

    pub fn error_with_code(code: &str, message: &str) -> SimpleApiResponse<()> {
        SimpleApiResponse {
            success: false,
            data: None,
            error: Some(SimpleApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
            message: None,
        }
    }
}

/// Stable error codes with their HTTP status mapping
#[derive(Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &'static str, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    pub fn validation(message: &str) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal(message: &str) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.code {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "ALREADY_USED" => StatusCode::CONFLICT,
            "CAMPAIGN_ENDED" | "EXPIRED" => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = SimpleApiResponse::<()>::error_with_code(self.code, &self.message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::new("ALREADY_USED", "").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::new("CAMPAIGN_ENDED", "").status(), StatusCode::GONE);
        assert_eq!(ApiError::new("NOT_FOUND", "").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::internal("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_skips_absent_fields() {
        let ok = SimpleApiResponse::success(serde_json::json!({"x": 1}));
        let json = serde_json::to_string(&ok).unwrap();
        assert!(!json.contains("error"));
        assert!(!json.contains("message"));

        let err = SimpleApiResponse::<()>::error_with_code("NOT_FOUND", "nope");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("NOT_FOUND"));
        assert!(!json.contains("data"));
    }
}
