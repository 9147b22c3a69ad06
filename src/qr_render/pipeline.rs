//! # 中心图标解码
//!
//! ## 设计思路
//!
//! 中心图标来自不受信任的输入，先读 header 尺寸并按像素上限快速拒绝，再做完整解码，
//! 避免一张“小文件、大画布”的图片把内存打满。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 解码后再次校验实际尺寸

use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

use super::source::RawImageData;
use super::{RenderConfig, RenderError};

/// 将原始字节解码为图像。
pub(crate) fn decode_center_image(
    raw: &RawImageData,
    config: &RenderConfig,
) -> Result<DynamicImage, RenderError> {
    let (header_width, header_height) = inspect_dimensions_from_memory(&raw.bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|e| RenderError::Decode(format!("中心图标解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    validate_pixel_limits(config, width, height)?;
    if width == 0 || height == 0 {
        return Err(RenderError::Decode("中心图标尺寸为 0".to_string()));
    }

    log::debug!(
        "🖼️ 中心图标解码成功 - 来源: {} 尺寸: {}x{}",
        raw.source_hint,
        width,
        height
    );

    Ok(decoded)
}

/// 仅通过内存中的图片头信息读取宽高。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), RenderError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RenderError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    if reader.format().is_none() {
        return Err(RenderError::InvalidFormat("无法识别图片格式".to_string()));
    }

    reader
        .into_dimensions()
        .map_err(|e| RenderError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

/// 校验像素数量是否超过配置上限。
fn validate_pixel_limits(config: &RenderConfig, width: u32, height: u32) -> Result<(), RenderError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| RenderError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(RenderError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}
