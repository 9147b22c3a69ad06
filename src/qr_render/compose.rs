//! # 前景着色与背景合成
//!
//! 遮罩 → 着色 → 铺底，三步都只通过 `RenderBackend` 原语完成，
//! 因此软件后端与 Canvas 后端产出同一张基础图。

use image::RgbaImage;

use super::backend::RenderBackend;
use super::color::{Fill, HexColor};
use super::mask::build_alpha_mask;
use super::matrix::QrMatrix;
use super::RenderError;

/// 用遮罩 alpha 裁剪填充层，得到“已着色”的前景：模块处为填充色，其余透明。
pub fn ink<B>(backend: &B, fill: &Fill, mask: &RgbaImage) -> Result<RgbaImage, RenderError>
where
    B: RenderBackend + ?Sized,
{
    let (size, _) = mask.dimensions();
    let mut layer = backend.fill_layer(fill, size)?;
    backend.mask_in(&mut layer, mask)?;
    Ok(layer)
}

/// 先铺背景色，再把前景 source-over 叠上去；结果完全不透明。
pub fn flatten<B>(backend: &B, inked: &RgbaImage, background: HexColor) -> Result<RgbaImage, RenderError>
where
    B: RenderBackend + ?Sized,
{
    let (size, _) = inked.dimensions();
    let mut base = backend.fill_layer(&Fill::Solid(background), size)?;
    backend.composite_over(&mut base, inked, 0, 0)?;
    Ok(base)
}

/// 从模块矩阵直接生成无叠加的基础图。
pub fn compose_base<B>(
    backend: &B,
    matrix: &QrMatrix,
    size: u32,
    margin: u32,
    fill: &Fill,
    background: HexColor,
) -> Result<RgbaImage, RenderError>
where
    B: RenderBackend + ?Sized,
{
    let mask = build_alpha_mask(matrix, size, margin);
    let inked = ink(backend, fill, &mask)?;
    flatten(backend, &inked, background)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr_render::backend::{CanvasBackend, SoftwareBackend};
    use crate::qr_render::request::{ErrorCorrectionLevel, GradientDirection};
    use std::collections::HashSet;

    fn matrix() -> QrMatrix {
        QrMatrix::encode("Hello World", ErrorCorrectionLevel::H).expect("encode failed")
    }

    #[test]
    fn inked_layer_is_transparent_outside_modules() {
        let matrix = matrix();
        let mask = build_alpha_mask(&matrix, 128, 2);
        let inked = ink(&SoftwareBackend, &Fill::Solid(HexColor::new(200, 0, 0)), &mask)
            .expect("ink failed");

        for (pixel, gate) in inked.pixels().zip(mask.pixels()) {
            assert_eq!(pixel[3], gate[3]);
        }
    }

    #[test]
    fn solid_base_has_exactly_two_colours() {
        let fg = HexColor::new(0x1E, 0x40, 0xAF);
        let bg = HexColor::new(0xF8, 0xF0, 0xE0);

        let base = compose_base(&SoftwareBackend, &matrix(), 320, 2, &Fill::Solid(fg), bg)
            .expect("compose failed");
        let colours: HashSet<[u8; 4]> = base.pixels().map(|p| p.0).collect();

        assert_eq!(colours.len(), 2);
        assert!(colours.contains(&fg.to_rgba().0));
        assert!(colours.contains(&bg.to_rgba().0));
    }

    #[test]
    fn backends_agree_on_solid_output() {
        let matrix = matrix();
        let fill = Fill::Solid(HexColor::new(0x2F, 0x85, 0x5A));

        let software = compose_base(&SoftwareBackend, &matrix, 160, 1, &fill, HexColor::WHITE)
            .expect("software compose failed");
        let canvas = compose_base(&CanvasBackend, &matrix, 160, 1, &fill, HexColor::WHITE)
            .expect("canvas compose failed");

        for (a, b) in software.pixels().zip(canvas.pixels()) {
            assert!(a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= 1));
        }
    }

    #[test]
    fn gradient_base_keeps_background_in_quiet_zone() {
        let fill = Fill::Gradient {
            start: HexColor::new(0x8B, 0x5A, 0x3C),
            end: HexColor::new(0xF8, 0xBB, 0xD9),
            direction: GradientDirection::DiagonalDown,
        };

        let base = compose_base(&SoftwareBackend, &matrix(), 200, 4, &fill, HexColor::WHITE)
            .expect("compose failed");

        assert_eq!(*base.get_pixel(0, 0), HexColor::WHITE.to_rgba());
        assert_eq!(*base.get_pixel(199, 199), HexColor::WHITE.to_rgba());
        assert!(base.pixels().all(|p| p[3] == 255));
    }
}
