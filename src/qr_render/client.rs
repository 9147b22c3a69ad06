//! # 托管 API 客户端
//!
//! 不在本地渲染，直接请求托管的二维码接口，把返回的 PNG 包装成 Data URL。
//! 参数沿用 `RenderParams`，地址拼接复用 `build_api_url`。

use std::time::Duration;

use serde::Deserialize;

use super::loader::{ensure_within_limit, map_reqwest_error, redact_url_for_log};
use super::output::to_data_url;
use super::request::{build_api_url, RenderParams};
use super::{RenderConfig, RenderError};

/// 托管接口默认地址。
pub const DEFAULT_API_BASE_URL: &str = "https://qr-generator.dev/api/qrcode";

/// 接口失败时返回的 JSON 错误体，兼容 `error` 与 `message` 两种字段。
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// 请求托管接口，返回 `data:image/png;base64,...`。
///
/// 未指定 `format` 时按 `png` 请求；整个请求受 `fetch_timeout_ms` 约束。
pub async fn fetch_qrcode_from_api(
    base_url: &str,
    params: &RenderParams,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let mut params = params.clone();
    if params.format.is_none() {
        params.format = Some("png".to_string());
    }
    let url = build_api_url(base_url, &params);
    log::info!("🌐 请求托管二维码接口 - {}", redact_url_for_log(&url));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.fetch_timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .build()
        .map_err(|e| RenderError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| map_reqwest_error(e, &url, config))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.error.or(parsed.message))
            .unwrap_or_else(|| format!("请求失败：HTTP {}", status.as_u16()));
        return Err(RenderError::Network(detail));
    }

    if let Some(len) = response.content_length() {
        ensure_within_limit(len, config.max_file_size, "接口返回体积过大")?;
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_reqwest_error(e, &url, config))?;
    ensure_within_limit(bytes.len() as u64, config.max_file_size, "接口返回体积过大")?;

    if !infer::image::is_png(&bytes) {
        return Err(RenderError::InvalidFormat("接口返回的不是 PNG 图片".to_string()));
    }

    log::debug!("✅ 托管接口返回 {} bytes", bytes.len());
    Ok(to_data_url(&bytes))
}
