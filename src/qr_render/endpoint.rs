//! # 边界适配层
//!
//! ## 设计思路
//!
//! 仅做“结果 → 传输层响应”的翻译，不承载业务逻辑，宿主 HTTP 框架直接把
//! `RenderResponse` 的字段写回即可。
//!
//! - 成功：按输出类型给出 `Content-Type`，并附带长期不可变缓存头
//! - 失败：统一为 `ErrorBody { code, stage, message }`；内部错误只返回通用文案，细节写服务端日志

use serde::Serialize;

use super::source::RenderOutput;
use super::{QrService, RenderError};

pub const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";
const INTERNAL_ERROR_MESSAGE: &str = "二维码生成失败，请稍后重试";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<&RenderError> for ErrorBody {
    fn from(error: &RenderError) -> Self {
        let message = match error {
            RenderError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        };

        Self {
            code: error.code(),
            stage: error.stage(),
            message,
        }
    }
}

/// 传输层响应。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub cache_control: Option<&'static str>,
    pub body: Vec<u8>,
}

impl RenderResponse {
    pub fn ok(output: RenderOutput) -> Self {
        Self {
            status: 200,
            content_type: output.content_type(),
            cache_control: Some(CACHE_CONTROL_IMMUTABLE),
            body: output.into_bytes(),
        }
    }

    pub fn error(error: &RenderError) -> Self {
        match error {
            RenderError::Internal(detail) => log::error!("❌ 二维码渲染内部错误：{}", detail),
            other => log::debug!("请求被拒绝 - code={} {}", other.code(), other),
        }

        let body = serde_json::to_vec(&ErrorBody::from(error)).unwrap_or_default();
        Self {
            status: error.status(),
            content_type: "application/json; charset=utf-8",
            cache_control: None,
            body,
        }
    }

    pub fn from_result(result: Result<RenderOutput, RenderError>) -> Self {
        match result {
            Ok(output) => Self::ok(output),
            Err(error) => Self::error(&error),
        }
    }
}

/// `GET ?query` 入口。
pub async fn handle_query(service: &QrService, query: &str) -> RenderResponse {
    RenderResponse::from_result(service.render_query(query).await)
}

/// `POST` JSON 入口。
pub async fn handle_json(service: &QrService, body: &str) -> RenderResponse {
    RenderResponse::from_result(service.render_json(body).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn svg_response_carries_immutable_cache_header() {
        let response = handle_query(&QrService::new(), "value=Hello%20World&format=svg").await;

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "image/svg+xml");
        assert_eq!(response.cache_control, Some(CACHE_CONTROL_IMMUTABLE));
        assert!(String::from_utf8_lossy(&response.body).contains("<svg"));
    }

    #[tokio::test]
    async fn validation_error_is_400_json() {
        let response = handle_json(&QrService::new(), r#"{"value":"x","size":10}"#).await;

        assert_eq!(response.status, 400);
        assert_eq!(response.cache_control, None);

        let body: serde_json::Value = serde_json::from_slice(&response.body).expect("json body");
        assert_eq!(body["code"], "invalid_parameter");
        assert_eq!(body["stage"], "validate");
        assert!(body["message"].as_str().unwrap_or_default().contains("size"));
    }

    #[tokio::test]
    async fn encoding_failure_is_422() {
        let query = format!("value={}&errorCorrectionLevel=H", "9".repeat(4000));
        let response = handle_query(&QrService::new(), &query).await;

        assert_eq!(response.status, 422);
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let response = RenderResponse::error(&RenderError::Internal("lock poisoned at 0xdeadbeef".into()));
        let body: ErrorBody = ErrorBody::from(&RenderError::Internal("secret".into()));

        assert_eq!(response.status, 500);
        assert!(!String::from_utf8_lossy(&response.body).contains("0xdeadbeef"));
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
    }
}
