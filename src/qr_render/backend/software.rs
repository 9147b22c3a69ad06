//! 逐像素软件后端：直接在 `image` 缓冲区上计算，不依赖任何绘图表面。

use image::{ImageBuffer, Rgba, RgbaImage};

use super::{clamp_radius, ensure_same_size, RenderBackend};
use crate::qr_render::color::Fill;
use crate::qr_render::RenderError;

/// 每个像素在每个方向上的采样数（圆角抗锯齿）。
const SUBSAMPLES: u32 = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareBackend;

impl SoftwareBackend {
    /// 非预乘 source-over。
    fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
        match src[3] {
            255 => return src,
            0 => return dst,
            _ => {}
        }

        let sa = src[3] as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= f32::EPSILON {
            return Rgba([0, 0, 0, 0]);
        }

        let channel = |i: usize| {
            let value = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };

        Rgba([
            channel(0),
            channel(1),
            channel(2),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ])
    }

    /// 圆角矩形对像素 `(x, y)` 的覆盖率（0..=1）。
    fn coverage(x: u32, y: u32, side: f32, radius: f32) -> f32 {
        if radius <= 0.0 {
            return 1.0;
        }

        let mut inside = 0;
        for sy in 0..SUBSAMPLES {
            for sx in 0..SUBSAMPLES {
                let px = x as f32 + (sx as f32 + 0.5) / SUBSAMPLES as f32;
                let py = y as f32 + (sy as f32 + 0.5) / SUBSAMPLES as f32;
                let cx = px.clamp(radius, side - radius);
                let cy = py.clamp(radius, side - radius);
                let (dx, dy) = (px - cx, py - cy);
                if dx * dx + dy * dy <= radius * radius {
                    inside += 1;
                }
            }
        }

        inside as f32 / (SUBSAMPLES * SUBSAMPLES) as f32
    }
}

impl RenderBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "software"
    }

    fn fill_layer(&self, fill: &Fill, size: u32) -> Result<RgbaImage, RenderError> {
        Ok(ImageBuffer::from_fn(size, size, |x, y| {
            fill.color_at(x, y, size).to_rgba()
        }))
    }

    fn mask_in(&self, layer: &mut RgbaImage, mask: &RgbaImage) -> Result<(), RenderError> {
        ensure_same_size(layer, mask)?;

        for (pixel, gate) in layer.pixels_mut().zip(mask.pixels()) {
            let alpha = (pixel[3] as u32 * gate[3] as u32 + 127) / 255;
            pixel[3] = alpha as u8;
        }

        Ok(())
    }

    fn composite_over(
        &self,
        base: &mut RgbaImage,
        layer: &RgbaImage,
        x: i64,
        y: i64,
    ) -> Result<(), RenderError> {
        let (base_w, base_h) = base.dimensions();

        for (lx, ly, src) in layer.enumerate_pixels() {
            let bx = x + lx as i64;
            let by = y + ly as i64;
            if bx < 0 || by < 0 || bx >= base_w as i64 || by >= base_h as i64 {
                continue;
            }

            let dst = base.get_pixel_mut(bx as u32, by as u32);
            *dst = Self::blend_over(*dst, *src);
        }

        Ok(())
    }

    fn rounded_rect(&self, side: u32, radius: u32, color: Rgba<u8>) -> Result<RgbaImage, RenderError> {
        let radius = clamp_radius(side, radius);
        let side_f = side as f32;

        Ok(ImageBuffer::from_fn(side, side, |x, y| {
            let coverage = Self::coverage(x, y, side_f, radius);
            let alpha = (color[3] as f32 * coverage).round() as u8;
            Rgba([color[0], color[1], color[2], alpha])
        }))
    }
}
