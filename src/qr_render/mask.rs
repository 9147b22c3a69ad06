//! # 遮罩生成
//!
//! ## 设计思路
//!
//! 遮罩只承载 alpha：深色模块不透明、浅色模块完全透明（而不是白色）。
//! 这样同一张遮罩可以套在任意填充上，与最终颜色无关。
//!
//! ## 实现思路
//!
//! 模块边长 `scale = size / (width + 2 * margin)` 允许为小数，保证“矩阵 + 静区”
//! 恰好铺满 `size × size`；像素 `p` 落在模块 `floor(p / scale) - margin`。

use image::{ImageBuffer, Rgba, RgbaImage};

use super::matrix::QrMatrix;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// 模块边长（像素，可为小数）。
pub fn module_scale(matrix: &QrMatrix, size: u32, margin: u32) -> f64 {
    size as f64 / (matrix.width() as f64 + 2.0 * margin as f64)
}

/// 像素坐标对应的模块坐标；落在静区时返回 `None`。
fn module_at(pixel: u32, scale: f64, margin: u32, width: usize) -> Option<usize> {
    let index = (pixel as f64 / scale).floor() as i64 - margin as i64;
    if index < 0 || index >= width as i64 {
        None
    } else {
        Some(index as usize)
    }
}

/// 将模块矩阵栅格化为 `size × size` 的 alpha 遮罩。
pub fn build_alpha_mask(matrix: &QrMatrix, size: u32, margin: u32) -> RgbaImage {
    let scale = module_scale(matrix, size, margin);
    let width = matrix.width();

    // 行列映射只算一次，逐像素查表
    let columns: Vec<Option<usize>> = (0..size)
        .map(|p| module_at(p, scale, margin, width))
        .collect();

    ImageBuffer::from_fn(size, size, |x, y| {
        match (columns[x as usize], columns[y as usize]) {
            (Some(mx), Some(my)) if matrix.is_dark(mx, my) => INK,
            _ => CLEAR,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr_render::request::ErrorCorrectionLevel;

    fn matrix() -> QrMatrix {
        QrMatrix::encode("Hello World", ErrorCorrectionLevel::M).expect("encode failed")
    }

    #[test]
    fn mask_is_binary_alpha() {
        let mask = build_alpha_mask(&matrix(), 200, 2);

        assert_eq!(mask.dimensions(), (200, 200));
        assert!(mask.pixels().all(|p| *p == INK || *p == CLEAR));
    }

    #[test]
    fn quiet_zone_is_transparent() {
        let matrix = matrix();
        let size = 290;
        let margin = 4;
        let mask = build_alpha_mask(&matrix, size, margin);
        let quiet = (module_scale(&matrix, size, margin) * margin as f64).floor() as u32;

        for i in 0..size {
            for q in 0..quiet {
                assert_eq!(mask.get_pixel(i, q)[3], 0);
                assert_eq!(mask.get_pixel(q, i)[3], 0);
                assert_eq!(mask.get_pixel(i, size - 1 - q)[3], 0);
            }
        }
    }

    #[test]
    fn matrix_fills_the_canvas_without_margin() {
        let matrix = matrix();
        let mask = build_alpha_mask(&matrix, 210, 0);

        // 定位图案左上角紧贴画布边缘
        assert_eq!(mask.get_pixel(0, 0)[3], 255);
        assert_eq!(mask.get_pixel(209, 0)[3], 255);
        assert_eq!(mask.get_pixel(0, 209)[3], 255);
    }

    #[test]
    fn each_module_maps_to_its_pixel_block() {
        let matrix = matrix();
        let margin = 2;
        let size = ((matrix.width() + 2 * margin as usize) * 10) as u32;
        let mask = build_alpha_mask(&matrix, size, margin);

        for my in 0..matrix.width() {
            for mx in 0..matrix.width() {
                let px = (mx as u32 + margin) * 10 + 5;
                let py = (my as u32 + margin) * 10 + 5;
                let opaque = mask.get_pixel(px, py)[3] == 255;
                assert_eq!(opaque, matrix.is_dark(mx, my), "module ({mx}, {my})");
            }
        }
    }
}
