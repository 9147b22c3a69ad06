//! # Canvas 后端
//!
//! 在 `tiny-skia` 绘图表面上按 Canvas 2D 的方式合成：
//! 渐变用 `LinearGradient` 着色器，遮罩用 `destination-in`，叠加用默认的 `source-over`。
//! 绘图表面内部是预乘 RGBA，进出时分别做预乘 / 反预乘。

use image::{Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, Color, ColorU8, FillRule, GradientStop, LinearGradient, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Point, Rect, SpreadMode, Transform,
};

use super::{clamp_radius, ensure_same_size, RenderBackend};
use crate::qr_render::color::{Fill, HexColor};
use crate::qr_render::RenderError;

/// 四分之一圆弧的三次贝塞尔控制点系数。
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasBackend;

impl CanvasBackend {
    fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, RenderError> {
        Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Internal(format!("无法创建绘图表面：{}x{}", width, height)))
    }

    fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, RenderError> {
        let (width, height) = image.dimensions();
        let mut pixmap = Self::new_pixmap(width, height)?;

        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }

        Ok(pixmap)
    }

    fn to_image(pixmap: &Pixmap) -> RgbaImage {
        let mut image = RgbaImage::new(pixmap.width(), pixmap.height());

        for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
            let color = src.demultiply();
            *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
        }

        image
    }

    fn color(color: HexColor) -> Color {
        Color::from_rgba8(color.r, color.g, color.b, 255)
    }

    fn rounded_rect_path(side: f32, radius: f32) -> Option<Path> {
        if radius <= 0.0 {
            return Some(PathBuilder::from_rect(Rect::from_xywh(0.0, 0.0, side, side)?));
        }

        let r = radius;
        let k = r * KAPPA;
        let mut pb = PathBuilder::new();
        pb.move_to(r, 0.0);
        pb.line_to(side - r, 0.0);
        pb.cubic_to(side - r + k, 0.0, side, r - k, side, r);
        pb.line_to(side, side - r);
        pb.cubic_to(side, side - r + k, side - r + k, side, side - r, side);
        pb.line_to(r, side);
        pb.cubic_to(r - k, side, 0.0, side - r + k, 0.0, side - r);
        pb.line_to(0.0, r);
        pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
        pb.close();
        pb.finish()
    }
}

impl RenderBackend for CanvasBackend {
    fn name(&self) -> &'static str {
        "canvas"
    }

    fn fill_layer(&self, fill: &Fill, size: u32) -> Result<RgbaImage, RenderError> {
        let mut pixmap = Self::new_pixmap(size, size)?;

        match *fill {
            Fill::Solid(color) => pixmap.fill(Self::color(color)),
            Fill::Gradient {
                start,
                end,
                direction,
            } => {
                let ((x0, y0), (x1, y1)) = direction.endpoints(size as f32);
                let shader = LinearGradient::new(
                    Point::from_xy(x0, y0),
                    Point::from_xy(x1, y1),
                    vec![
                        GradientStop::new(0.0, Self::color(start)),
                        GradientStop::new(1.0, Self::color(end)),
                    ],
                    SpreadMode::Pad,
                    Transform::identity(),
                )
                .ok_or_else(|| RenderError::Internal("无法创建线性渐变".to_string()))?;

                let mut paint = Paint::default();
                paint.shader = shader;
                paint.anti_alias = false;

                let rect = Rect::from_xywh(0.0, 0.0, size as f32, size as f32)
                    .ok_or_else(|| RenderError::Internal(format!("填充区域无效：{}", size)))?;
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }

        Ok(Self::to_image(&pixmap))
    }

    fn mask_in(&self, layer: &mut RgbaImage, mask: &RgbaImage) -> Result<(), RenderError> {
        ensure_same_size(layer, mask)?;

        let mut target = Self::to_pixmap(layer)?;
        let gate = Self::to_pixmap(mask)?;

        let mut paint = PixmapPaint::default();
        paint.blend_mode = BlendMode::DestinationIn;
        target.draw_pixmap(0, 0, gate.as_ref(), &paint, Transform::identity(), None);

        *layer = Self::to_image(&target);
        Ok(())
    }

    fn composite_over(
        &self,
        base: &mut RgbaImage,
        layer: &RgbaImage,
        x: i64,
        y: i64,
    ) -> Result<(), RenderError> {
        let x = i32::try_from(x).map_err(|_| RenderError::Internal(format!("叠加横坐标越界：{}", x)))?;
        let y = i32::try_from(y).map_err(|_| RenderError::Internal(format!("叠加纵坐标越界：{}", y)))?;

        let mut target = Self::to_pixmap(base)?;
        let source = Self::to_pixmap(layer)?;
        target.draw_pixmap(x, y, source.as_ref(), &PixmapPaint::default(), Transform::identity(), None);

        *base = Self::to_image(&target);
        Ok(())
    }

    fn rounded_rect(&self, side: u32, radius: u32, color: Rgba<u8>) -> Result<RgbaImage, RenderError> {
        let mut pixmap = Self::new_pixmap(side, side)?;
        let path = Self::rounded_rect_path(side as f32, clamp_radius(side, radius))
            .ok_or_else(|| RenderError::Internal(format!("无法构建圆角矩形路径：{}", side)))?;

        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

        Ok(Self::to_image(&pixmap))
    }
}
