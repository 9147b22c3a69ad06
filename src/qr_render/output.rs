//! # 输出编码
//!
//! - PNG：把合成结果编码为 PNG 字节；`blob` 是同一份字节的 base64 Data URL。
//! - SVG：实色且无中心图标时直接由模块矩阵生成矢量图，完全绕过光栅流水线。

use base64::{Engine as _, engine::general_purpose};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use super::color::HexColor;
use super::matrix::QrMatrix;
use super::RenderError;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// 编码为 PNG 字节。
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| RenderError::Internal(format!("PNG 编码失败：{}", e)))?;
    Ok(bytes)
}

/// `data:image/png;base64,...`
pub fn to_data_url(png: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URL_PREFIX, general_purpose::STANDARD.encode(png))
}

/// 由模块矩阵生成 SVG。
///
/// 坐标系以模块为单位（含静区），`width/height` 为请求的像素尺寸；
/// 深色模块按行合并成水平条带写进同一个 `path`，体积与矩阵宽度近似线性。
pub fn render_svg(
    matrix: &QrMatrix,
    size: u32,
    margin: u32,
    foreground: HexColor,
    background: HexColor,
) -> String {
    let total = matrix.width() + 2 * margin as usize;
    let margin = margin as usize;

    let mut path = String::new();
    for y in 0..matrix.width() {
        let mut x = 0;
        while x < matrix.width() {
            if !matrix.is_dark(x, y) {
                x += 1;
                continue;
            }

            let run_start = x;
            while x < matrix.width() && matrix.is_dark(x, y) {
                x += 1;
            }
            let len = x - run_start;
            path.push_str(&format!("M{} {}h{}v1h-{}z", run_start + margin, y + margin, len, len));
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            "\n",
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {total} {total}" shape-rendering="crispEdges">"#,
            r#"<rect width="{total}" height="{total}" fill="{bg}"/>"#,
            r#"<path fill="{fg}" d="{path}"/>"#,
            "</svg>\n"
        ),
        size = size,
        total = total,
        bg = background.to_hex(),
        fg = foreground.to_hex(),
        path = path,
    )
}
