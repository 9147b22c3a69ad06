//! # 中心图标叠加
//!
//! ## 设计思路
//!
//! 图标总是居中：`overlay_size = floor(size * scale)`，`offset = floor((size - overlay_size) / 2)`。
//! 先铺一块圆角底板，再盖上按同样圆角裁剪过的图标，底板只在圆角处露出来形成描边。
//!
//! ## 实现思路
//!
//! 1. cover 适配：按短边居中裁成正方形，再缩放到 `overlay_size`
//! 2. 圆角遮罩 destination-in 裁剪图标
//! 3. 生成同尺寸、填充 `overlay_background` 的圆角底板
//! 4. 依次 source-over：底板 → 图标
//!
//! 缩放优先走 `fast_image_resize`，失败时回退 `image::resize_to_fill`。

use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage};

use super::backend::RenderBackend;
use super::color::HexColor;
use super::config::OverlayQuality;
use super::request::RenderRequest;
use super::RenderError;

/// 叠加区域（相对基础图的像素坐标）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub overlay_size: u32,
    pub offset: u32,
}

impl OverlayLayout {
    pub fn compute(size: u32, scale: f64) -> Self {
        let overlay_size = ((size as f64 * scale).floor().max(0.0) as u32).min(size);
        let offset = (size - overlay_size) / 2;
        Self {
            overlay_size,
            offset,
        }
    }
}

/// 叠加样式。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub scale: f64,
    pub radius: u32,
    pub background: HexColor,
}

impl OverlayStyle {
    pub fn from_request(request: &RenderRequest) -> Self {
        Self {
            scale: request.overlay_scale,
            radius: request.overlay_radius,
            background: request.overlay_background,
        }
    }
}

/// 在基础图上叠加中心图标，返回新图；`base` 不会被修改。
pub fn compose_overlay<B>(
    backend: &B,
    base: &RgbaImage,
    logo: &DynamicImage,
    style: &OverlayStyle,
    quality: OverlayQuality,
) -> Result<RgbaImage, RenderError>
where
    B: RenderBackend + ?Sized,
{
    let (size, _) = base.dimensions();
    let layout = OverlayLayout::compute(size, style.scale);
    if layout.overlay_size == 0 {
        return Ok(base.clone());
    }

    let side = layout.overlay_size;
    let mut icon = cover_fit(logo, side, quality)?;
    let clip = backend.rounded_rect(side, style.radius, Rgba([0, 0, 0, 255]))?;
    backend.mask_in(&mut icon, &clip)?;

    let plate = backend.rounded_rect(side, style.radius, style.background.to_rgba())?;

    let mut composed = base.clone();
    let at = layout.offset as i64;
    backend.composite_over(&mut composed, &plate, at, at)?;
    backend.composite_over(&mut composed, &icon, at, at)?;

    log::debug!(
        "🎯 中心图标已叠加 - size={} offset={} radius={} backend={}",
        side,
        layout.offset,
        style.radius,
        backend.name()
    );

    Ok(composed)
}

/// cover 适配：保持宽高比，居中裁剪后缩放到 `side × side`。
pub fn cover_fit(image: &DynamicImage, side: u32, quality: OverlayQuality) -> Result<RgbaImage, RenderError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || side == 0 {
        return Err(RenderError::Decode(format!(
            "无法缩放图标：{}x{} -> {}",
            width, height, side
        )));
    }

    match resize_with_fast_image_resize(image, side, quality) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_to_fill：{}", err);
            Ok(image.resize_to_fill(side, side, quality.filter()).to_rgba8())
        }
    }
}

/// 居中正方形裁剪区域 `(left, top, edge)`。
fn centre_crop(width: u32, height: u32) -> (f64, f64, f64) {
    let edge = width.min(height) as f64;
    let left = (width as f64 - edge) / 2.0;
    let top = (height as f64 - edge) / 2.0;
    (left, top, edge)
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    side: u32,
    quality: OverlayQuality,
) -> Result<RgbaImage, RenderError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image = fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
        .map_err(|e| RenderError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(side, side, fr::PixelType::U8x4);

    let (left, top, edge) = centre_crop(src_width, src_height);
    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(quality.filter())))
        .crop(left, top, edge, edge);

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| RenderError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(side, side, dst_image.into_vec())
        .ok_or_else(|| RenderError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
    match filter {
        image::imageops::FilterType::Nearest => fr::FilterType::Box,
        image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
        image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
        image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
        image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
