//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! `QrService` 是宿主（HTTP 服务、CLI、测试）持有的唯一入口，替代全局单例函数。
//! 好处：
//! 1. 生命周期清晰（由宿主统一管理）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 查询字符串与 JSON 两个入口在这里汇合到同一个校验函数
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `render_query` / `render_json` / `render_params`：参数 → 校验 → 渲染
//! - `render_data_url` / `render_content`：前端常用的 Data URL 便捷入口
//! - `set_overlay_quality` / `settings` / `apply_settings`：运行时配置

use super::content::{build_content, ContentInput};
use super::request::{validate, OutputFormat, RenderParams, RenderRequest};
use super::source::RenderOutput;
use super::{OverlayQuality, QrRenderer, RenderConfig, RenderError, RenderSettings};

/// 二维码渲染服务。
pub struct QrService {
    renderer: QrRenderer,
}

impl Default for QrService {
    fn default() -> Self {
        Self::new()
    }
}

impl QrService {
    /// 使用默认配置创建服务。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use qr_generator::qr_render::QrService;
    ///
    /// let service = QrService::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    /// 使用自定义配置创建服务。
    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            renderer: QrRenderer::new(config),
        }
    }

    /// 渲染一个已校验的请求。
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        self.renderer.render(request).await
    }

    /// 校验原始参数并渲染。
    pub async fn render_params(&self, params: &RenderParams) -> Result<RenderOutput, RenderError> {
        let request = validate(params)?;
        self.render(&request).await
    }

    /// 查询字符串入口。
    pub async fn render_query(&self, query: &str) -> Result<RenderOutput, RenderError> {
        self.render_params(&RenderParams::from_query(query)).await
    }

    /// JSON 请求体入口。
    pub async fn render_json(&self, body: &str) -> Result<RenderOutput, RenderError> {
        self.render_params(&RenderParams::from_json(body)?).await
    }

    /// 渲染并返回 `data:image/png;base64,...`，忽略参数里的 `format`。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use qr_generator::qr_render::{QrService, RenderParams};
    ///
    /// # async fn demo() -> Result<(), qr_generator::qr_render::RenderError> {
    /// let service = QrService::new();
    /// let data_url = service.render_data_url(&RenderParams::with_value("Hello World")).await?;
    /// assert!(data_url.starts_with("data:image/png;base64,"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn render_data_url(&self, params: &RenderParams) -> Result<String, RenderError> {
        let mut params = params.clone();
        params.format = Some(OutputFormat::Blob.as_str().to_string());

        match self.render_params(&params).await? {
            RenderOutput::DataUrl(url) => Ok(url),
            other => Err(RenderError::Internal(format!(
                "Data URL 渲染返回了意外格式：{}",
                other.format().as_str()
            ))),
        }
    }

    /// 由结构化内容（网址、邮件、名片等）生成载荷，再渲染为 Data URL。
    pub async fn render_content(
        &self,
        content: &ContentInput,
        style: &RenderParams,
    ) -> Result<String, RenderError> {
        let mut params = style.clone();
        params.value = Some(build_content(content));
        self.render_data_url(&params).await
    }

    /// 设置中心图标缩放档位。
    pub fn set_overlay_quality(&self, quality: OverlayQuality) -> Result<(), RenderError> {
        self.renderer.update_config(|cfg| {
            cfg.overlay_quality = quality;
            Ok(())
        })?;
        log::info!("⚙️ 中心图标缩放档位已切换为 {}", quality.as_str());
        Ok(())
    }

    /// 读取当前中心图标缩放档位。
    pub fn overlay_quality(&self) -> Result<OverlayQuality, RenderError> {
        Ok(self.renderer.config_snapshot()?.overlay_quality)
    }

    /// 读取可持久化的配置子集。
    pub fn settings(&self) -> Result<RenderSettings, RenderError> {
        Ok(self.renderer.config_snapshot()?.settings())
    }

    /// 应用配置子集；任一字段非法时整体不生效。
    pub fn apply_settings(&self, settings: &RenderSettings) -> Result<(), RenderError> {
        self.renderer.update_config(|cfg| cfg.apply_settings(settings))?;
        log::info!(
            "⚙️ 渲染配置已更新 - fetch={}ms connect={}ms max_file={} quality={} strict={} backend={:?}",
            settings.fetch_timeout_ms,
            settings.connect_timeout_ms,
            settings.max_file_size,
            settings.overlay_quality,
            settings.strict_overlay,
            settings.backend
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_and_json_entry_points_render_identically() {
        let service = QrService::new();

        let from_query = service
            .render_query("value=same&size=128&margin=1")
            .await
            .expect("query render failed");
        let from_json = service
            .render_json(r#"{"value":"same","size":128,"margin":1}"#)
            .await
            .expect("json render failed");

        assert_eq!(from_query, from_json);
    }

    #[tokio::test]
    async fn validation_errors_name_the_field() {
        let service = QrService::new();

        let err = service
            .render_query("value=x&overlayScale=0.9")
            .await
            .expect_err("scale out of range");

        assert_eq!(err.code(), "invalid_parameter");
        assert!(err.to_string().contains("overlayScale"));
    }

    #[tokio::test]
    async fn data_url_ignores_requested_format() {
        let service = QrService::new();
        let mut params = RenderParams::with_value("Hello World");
        params.format = Some("svg".into());
        params.size = Some("96".into());

        let url = service.render_data_url(&params).await.expect("render failed");

        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn content_is_rendered_as_data_url() {
        let service = QrService::new();
        let content = ContentInput::Url {
            url: "example.com".into(),
        };

        let url = service
            .render_content(&content, &RenderParams::default())
            .await
            .expect("render failed");

        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let service = QrService::new();
        let content = ContentInput::Text { text: "   ".into() };

        let err = service
            .render_content(&content, &RenderParams::default())
            .await
            .expect_err("empty content");

        assert!(matches!(err, RenderError::Validation { field: "value", .. }));
    }

    #[test]
    fn overlay_quality_can_be_switched() {
        let service = QrService::new();

        service
            .set_overlay_quality(OverlayQuality::Speed)
            .expect("set quality failed");

        assert_eq!(service.overlay_quality().expect("get quality failed"), OverlayQuality::Speed);
    }

    #[test]
    fn invalid_settings_leave_config_untouched() {
        let service = QrService::new();
        let before = service.settings().expect("settings failed");

        let mut settings = before.clone();
        settings.fetch_timeout_ms = 10;
        settings.strict_overlay = true;

        assert!(service.apply_settings(&settings).is_err());
        assert_eq!(service.settings().expect("settings failed"), before);
    }
}
