//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `QrRenderer` 只负责流程编排与配置管理，不关心参数从哪里来。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 编码模块矩阵（失败即终止）
//! 3. 实色 + 无图标 + SVG：直接输出矢量图
//! 4. 否则异步加载中心图标字节
//! 5. 在阻塞线程池中完成 遮罩 → 着色 → 铺底 →（叠加）→ PNG 编码
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<RenderConfig>>` 支持运行时调整。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 中心图标失败默认降级为无图标输出，`strict_overlay` 打开时直接返回错误。
//! - 记录 `encode/load/compose/total` 阶段耗时，便于性能诊断。

use image::RgbaImage;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::backend::{backend_for, RenderBackend};
use super::color::resolve_fill;
use super::compose::compose_base;
use super::loader::load_center_image;
use super::matrix::QrMatrix;
use super::output::{encode_png, render_svg, to_data_url};
use super::overlay::{compose_overlay, OverlayStyle};
use super::pipeline::decode_center_image;
use super::request::{OutputFormat, RenderRequest, RenderRoute};
use super::source::{RawImageData, RenderOutput};
use super::{RenderConfig, RenderError};

/// 二维码渲染器。
///
/// 封装了配置状态，并编排各子模块实现完整流程。
pub struct QrRenderer {
    pub(super) config: Arc<RwLock<RenderConfig>>,
}

impl QrRenderer {
    /// 根据初始配置创建渲染器。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use qr_generator::qr_render::{QrRenderer, RenderConfig};
    ///
    /// let renderer = QrRenderer::new(RenderConfig::default());
    /// ```
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub(super) fn config_snapshot(&self) -> Result<RenderConfig, RenderError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| RenderError::Internal("配置读取锁已中毒".to_string()))
    }

    /// 在写锁内修改配置；修改失败时配置保持原样。
    pub(super) fn update_config<F>(&self, apply: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut RenderConfig) -> Result<(), RenderError>,
    {
        let mut guard = self
            .config
            .write()
            .map_err(|_| RenderError::Internal("配置写入锁已中毒".to_string()))?;

        let mut next = guard.clone();
        apply(&mut next)?;
        *guard = next;
        Ok(())
    }

    /// 渲染一个已校验的请求。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use qr_generator::qr_render::{QrRenderer, RenderConfig, RenderRequest};
    ///
    /// # async fn demo() -> Result<(), qr_generator::qr_render::RenderError> {
    /// let renderer = QrRenderer::new(RenderConfig::default());
    /// let output = renderer.render(&RenderRequest::new("Hello World")?).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let encode_start = Instant::now();
        let matrix = QrMatrix::encode(&request.value, request.error_correction)?;
        let encode_elapsed = encode_start.elapsed();

        if request.route() == RenderRoute::Vector {
            let svg = render_svg(
                &matrix,
                request.size,
                request.margin,
                request.foreground,
                request.background,
            );
            log::info!(
                "✅ SVG 渲染完成 - modules={} encode={}ms total={}ms",
                matrix.width(),
                encode_elapsed.as_millis(),
                total_start.elapsed().as_millis()
            );
            return Ok(RenderOutput::Svg(svg));
        }

        let load_start = Instant::now();
        let raw = match &request.center_image {
            Some(source) => match load_center_image(source, &config).await {
                Ok(raw) => Some(raw),
                Err(err) if config.strict_overlay => return Err(err),
                Err(err) => {
                    log::warn!(
                        "⚠️ 中心图标加载失败，跳过叠加 - 来源: {} 原因: {}",
                        source.kind(),
                        err
                    );
                    None
                }
            },
            None => None,
        };
        let load_elapsed = load_start.elapsed();

        let compose_start = Instant::now();
        let task_request = request.clone();
        let task_config = config.clone();
        let png = tokio::task::spawn_blocking(move || {
            let image = compose_request(&task_request, &matrix, raw.as_ref(), &task_config)?;
            encode_png(&image)
        })
        .await
        .map_err(|e| RenderError::Internal(format!("合成任务异常退出：{}", e)))??;
        let compose_elapsed = compose_start.elapsed();

        log::info!(
            "✅ PNG 渲染完成 - size={} backend={:?} encode={}ms load={}ms compose={}ms total={}ms",
            request.size,
            config.backend,
            encode_elapsed.as_millis(),
            load_elapsed.as_millis(),
            compose_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(match request.effective_format() {
            OutputFormat::Blob => RenderOutput::DataUrl(to_data_url(&png)),
            _ => RenderOutput::Png(png),
        })
    }
}

/// 同步完成光栅路径：遮罩 → 着色 → 铺底 →（叠加）。
///
/// 叠加阶段的任何失败默认回退为未叠加的基础图；`strict_overlay` 时向上返回。
pub(crate) fn compose_request(
    request: &RenderRequest,
    matrix: &QrMatrix,
    raw: Option<&RawImageData>,
    config: &RenderConfig,
) -> Result<RgbaImage, RenderError> {
    let backend = backend_for(config.backend);
    let fill = resolve_fill(request);
    let base = compose_base(
        backend.as_ref(),
        matrix,
        request.size,
        request.margin,
        &fill,
        request.background,
    )?;

    let Some(raw) = raw else {
        return Ok(base);
    };

    match overlay_onto(backend.as_ref(), &base, raw, request, config) {
        Ok(composed) => Ok(composed),
        Err(err) if config.strict_overlay => Err(err),
        Err(err) => {
            log::warn!("⚠️ 中心图标叠加失败，返回无图标结果：{}", err);
            Ok(base)
        }
    }
}

fn overlay_onto(
    backend: &dyn RenderBackend,
    base: &RgbaImage,
    raw: &RawImageData,
    request: &RenderRequest,
    config: &RenderConfig,
) -> Result<RgbaImage, RenderError> {
    let logo = decode_center_image(raw, config)?;
    compose_overlay(
        backend,
        base,
        &logo,
        &OverlayStyle::from_request(request),
        config.overlay_quality,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr_render::config::BackendKind;
    use crate::qr_render::request::{validate, RenderParams};
    use crate::qr_render::source::CenterImageSource;
    use base64::{Engine as _, engine::general_purpose};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 255) as u8, 200, (y * 5 % 255) as u8, 255])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png failed");
        bytes
    }

    fn request(query: &str) -> RenderRequest {
        validate(&RenderParams::from_query(query)).expect("valid request")
    }

    fn decode(output: RenderOutput) -> RgbaImage {
        match output {
            RenderOutput::Png(bytes) => image::load_from_memory(&bytes).expect("decode png failed").to_rgba8(),
            other => panic!("expected png, got {:?}", other.format()),
        }
    }

    #[tokio::test]
    async fn svg_fast_path_skips_raster() {
        let renderer = QrRenderer::new(RenderConfig::default());
        let output = renderer
            .render(&request("value=Hello%20World&format=svg"))
            .await
            .expect("render failed");

        assert!(matches!(output, RenderOutput::Svg(ref svg) if svg.contains("<svg")));
    }

    #[tokio::test]
    async fn blob_is_png_data_url() {
        let renderer = QrRenderer::new(RenderConfig::default());
        let output = renderer
            .render(&request("value=blob&format=blob&size=128"))
            .await
            .expect("render failed");

        match output {
            RenderOutput::DataUrl(url) => {
                let png = general_purpose::STANDARD
                    .decode(url.trim_start_matches("data:image/png;base64,"))
                    .expect("base64 decode failed");
                assert_eq!(&png[..4], &[137, 80, 78, 71]);
            }
            other => panic!("expected data url, got {:?}", other.format()),
        }
    }

    #[tokio::test]
    async fn broken_overlay_is_skipped_by_default() {
        let renderer = QrRenderer::new(RenderConfig::default());
        let plain = decode(renderer.render(&request("value=logo&size=200")).await.expect("render failed"));

        let mut with_logo = request("value=logo&size=200");
        with_logo.center_image = Some(CenterImageSource::Bytes(b"not an image".to_vec()));
        let degraded = decode(renderer.render(&with_logo).await.expect("render failed"));

        assert_eq!(plain, degraded);
    }

    #[tokio::test]
    async fn strict_mode_surfaces_overlay_failure() {
        let renderer = QrRenderer::new(RenderConfig {
            strict_overlay: true,
            ..RenderConfig::default()
        });

        let mut with_logo = request("value=logo&size=200");
        with_logo.center_image = Some(CenterImageSource::Bytes(b"not an image".to_vec()));

        let err = renderer.render(&with_logo).await.expect_err("strict overlay must fail");
        assert!(err.is_overlay_failure());
    }

    #[tokio::test]
    async fn overlay_changes_only_the_centre() {
        let renderer = QrRenderer::new(RenderConfig::default());
        let plain = decode(renderer.render(&request("value=logo&size=200")).await.expect("render failed"));

        let mut with_logo = request("value=logo&size=200&overlayScale=0.3&overlayRadius=0");
        with_logo.center_image = Some(CenterImageSource::Bytes(png_bytes(32, 32)));
        let composed = decode(renderer.render(&with_logo).await.expect("render failed"));

        // 60×60 的图标区域位于 [70, 130)
        for (x, y, pixel) in composed.enumerate_pixels() {
            let inside = (70..130).contains(&x) && (70..130).contains(&y);
            if !inside {
                assert_eq!(pixel, plain.get_pixel(x, y), "({x}, {y})");
            }
        }
        assert!((195..=205).contains(&composed.get_pixel(100, 100)[1]));
    }

    #[test]
    fn software_and_canvas_compose_the_same_solid_image() {
        let request = request("value=backend&size=160&margin=1&foregroundColor=%23224466");
        let matrix = QrMatrix::encode(&request.value, request.error_correction).expect("encode failed");

        let software = compose_request(&request, &matrix, None, &RenderConfig::default()).expect("compose failed");
        let canvas = compose_request(
            &request,
            &matrix,
            None,
            &RenderConfig {
                backend: BackendKind::Canvas,
                ..RenderConfig::default()
            },
        )
        .expect("compose failed");

        for (a, b) in software.pixels().zip(canvas.pixels()) {
            assert!(a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= 1));
        }
    }

    #[test]
    fn config_update_is_atomic() {
        let renderer = QrRenderer::new(RenderConfig::default());

        let result = renderer.update_config(|cfg| {
            cfg.strict_overlay = true;
            Err(RenderError::validation("fetchTimeoutMs", "out of range"))
        });

        assert!(result.is_err());
        assert!(!renderer.config_snapshot().expect("snapshot failed").strict_overlay);
    }
}
