//! # 合成后端
//!
//! ## 设计思路
//!
//! 填充、遮罩、叠加三类操作抽象为 `RenderBackend`，流水线只依赖这组原语：
//! - `SoftwareBackend`：逐像素操作 `image` 缓冲区，服务端默认
//! - `CanvasBackend`：基于 `tiny-skia` 绘图表面，按 Canvas 2D 合成语义绘制
//!
//! ## 实现思路
//!
//! 两个后端以非预乘 `RgbaImage` 作为交换格式，保证同一组属性测试可以原样跑在两者之上。

mod canvas;
mod software;

use image::{Rgba, RgbaImage};

use super::color::Fill;
use super::config::BackendKind;
use super::RenderError;

pub use canvas::CanvasBackend;
pub use software::SoftwareBackend;

/// 合成原语。
pub trait RenderBackend: Send + Sync {
    /// 后端名称（用于日志）。
    fn name(&self) -> &'static str;

    /// 生成 `size × size` 的完全不透明填充层。
    fn fill_layer(&self, fill: &Fill, size: u32) -> Result<RgbaImage, RenderError>;

    /// destination-in：保留 `layer` 的颜色，alpha 乘以 `mask` 的 alpha。
    fn mask_in(&self, layer: &mut RgbaImage, mask: &RgbaImage) -> Result<(), RenderError>;

    /// source-over：把 `layer` 叠加到 `base` 的 `(x, y)` 处，超出边界的部分裁掉。
    fn composite_over(
        &self,
        base: &mut RgbaImage,
        layer: &RgbaImage,
        x: i64,
        y: i64,
    ) -> Result<(), RenderError>;

    /// 边长 `side`、圆角 `radius` 的圆角矩形，矩形外完全透明，边缘抗锯齿。
    fn rounded_rect(&self, side: u32, radius: u32, color: Rgba<u8>) -> Result<RgbaImage, RenderError>;
}

/// 按配置选择后端。
pub fn backend_for(kind: BackendKind) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Software => Box::new(SoftwareBackend),
        BackendKind::Canvas => Box::new(CanvasBackend),
    }
}

pub(crate) fn ensure_same_size(layer: &RgbaImage, mask: &RgbaImage) -> Result<(), RenderError> {
    if layer.dimensions() != mask.dimensions() {
        return Err(RenderError::Internal(format!(
            "遮罩尺寸不匹配：图层 {:?}，遮罩 {:?}",
            layer.dimensions(),
            mask.dimensions()
        )));
    }
    Ok(())
}

/// 圆角半径不超过边长的一半。
pub(crate) fn clamp_radius(side: u32, radius: u32) -> f32 {
    radius.min(side / 2) as f32
}
