//! # 颜色解析模块（Color Resolver）
//!
//! ## 设计思路
//!
//! 把用户给出的“颜色模式 + 颜色字符串”解析成一个具体的 `Fill`，
//! 之后整条流水线只认 `Fill`，不再关心原始参数。
//!
//! ## 实现思路
//!
//! - 十六进制颜色用预编译正则校验，`#RGB` 按 CSS 规则逐位展开为 `#RRGGBB`。
//! - 渐变的起止点由方向决定，采样按像素中心投影到起止线段上再线性插值。
//! - 颜色预设是只读表，首次访问时构建。

use image::Rgba;
use once_cell::sync::Lazy;
use regex::Regex;

use super::request::{ColorMode, GradientDirection, RenderParams, RenderRequest};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color regex"));

/// 不透明 RGB 颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 解析 `#RGB` / `#RRGGBB`，格式不符时返回 `None`。
    pub fn parse(text: &str) -> Option<Self> {
        if !HEX_COLOR.is_match(text) {
            return None;
        }

        let digits = &text[1..];
        let expanded: String = if digits.len() == 3 {
            digits.chars().flat_map(|c| [c, c]).collect()
        } else {
            digits.to_string()
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn is_valid(text: &str) -> bool {
        HEX_COLOR.is_match(text)
    }

    /// 输出 `#RRGGBB`（大写）。
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    /// 两色线性插值，`t` 会被夹到 `[0, 1]`。
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// 前景填充。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(HexColor),
    Gradient {
        start: HexColor,
        end: HexColor,
        direction: GradientDirection,
    },
}

impl Fill {
    /// 像素 `(x, y)` 中心处的填充颜色。
    pub fn color_at(&self, x: u32, y: u32, size: u32) -> HexColor {
        match *self {
            Fill::Solid(color) => color,
            Fill::Gradient {
                start,
                end,
                direction,
            } => {
                let t = direction.position(x as f32 + 0.5, y as f32 + 0.5, size as f32);
                start.lerp(end, t)
            }
        }
    }
}

impl GradientDirection {
    /// 渐变线段的起止点（像素坐标）。
    pub fn endpoints(self, size: f32) -> ((f32, f32), (f32, f32)) {
        match self {
            GradientDirection::Horizontal => ((0.0, 0.0), (size, 0.0)),
            GradientDirection::Vertical => ((0.0, 0.0), (0.0, size)),
            GradientDirection::DiagonalDown => ((0.0, 0.0), (size, size)),
            GradientDirection::DiagonalUp => ((0.0, size), (size, 0.0)),
        }
    }

    /// 点 `(px, py)` 在渐变线段上的归一化位置。
    pub fn position(self, px: f32, py: f32, size: f32) -> f32 {
        let ((x0, y0), (x1, y1)) = self.endpoints(size);
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f32::EPSILON {
            return 0.0;
        }
        (((px - x0) * dx + (py - y0) * dy) / len_sq).clamp(0.0, 1.0)
    }
}

/// 由已校验的请求解析出填充。
pub fn resolve_fill(request: &RenderRequest) -> Fill {
    match request.color_mode {
        ColorMode::Solid => Fill::Solid(request.foreground),
        ColorMode::Gradient => Fill::Gradient {
            start: request.gradient_start,
            end: request.gradient_end,
            direction: request.gradient_direction,
        },
    }
}

/// 颜色预设。
#[derive(Debug, Clone)]
pub enum ColorPreset {
    Solid {
        name: &'static str,
        foreground: &'static str,
        background: &'static str,
    },
    Gradient {
        name: &'static str,
        start: &'static str,
        end: &'static str,
        direction: GradientDirection,
    },
}

pub static COLOR_PRESETS: Lazy<Vec<ColorPreset>> = Lazy::new(|| {
    use GradientDirection::*;

    let solid = |name, foreground, background| ColorPreset::Solid {
        name,
        foreground,
        background,
    };
    let gradient = |name, start, end, direction| ColorPreset::Gradient {
        name,
        start,
        end,
        direction,
    };

    vec![
        solid("Classic Black", "#000000", "#FFFFFF"),
        solid("Navy Blue", "#1e3a8a", "#FFFFFF"),
        solid("Forest Green", "#166534", "#FFFFFF"),
        solid("Deep Purple", "#6b21a8", "#FFFFFF"),
        solid("Crimson Red", "#dc2626", "#FFFFFF"),
        gradient("Burgundy Rose", "#8B5A3C", "#F8BBD9", DiagonalDown),
        gradient("Ocean Blue", "#1e40af", "#06b6d4", DiagonalDown),
        gradient("Sunset Orange", "#ea580c", "#fbbf24", Horizontal),
        gradient("Forest Mint", "#166534", "#10b981", Vertical),
        gradient("Purple Dream", "#7c3aed", "#ec4899", DiagonalUp),
    ]
});

impl ColorPreset {
    pub fn name(&self) -> &'static str {
        match self {
            ColorPreset::Solid { name, .. } | ColorPreset::Gradient { name, .. } => name,
        }
    }

    /// `"Ocean Blue"` → `"ocean-blue"`。
    pub fn slug(&self) -> String {
        self.name().to_lowercase().replace(' ', "-")
    }

    /// 把预设写入原始参数；实色预设会切回 solid 模式。
    pub fn apply(&self, params: &mut RenderParams) {
        match self {
            ColorPreset::Solid {
                foreground,
                background,
                ..
            } => {
                params.color_mode = Some(ColorMode::Solid.as_str().to_string());
                params.foreground_color = Some(foreground.to_string());
                params.background_color = Some(background.to_string());
            }
            ColorPreset::Gradient {
                start,
                end,
                direction,
                ..
            } => {
                params.color_mode = Some(ColorMode::Gradient.as_str().to_string());
                params.gradient_start = Some(start.to_string());
                params.gradient_end = Some(end.to_string());
                params.gradient_direction = Some(direction.as_str().to_string());
            }
        }
    }
}

/// 按 slug 查找预设。
pub fn find_preset(slug: &str) -> Option<&'static ColorPreset> {
    let slug = slug.trim().to_lowercase();
    COLOR_PRESETS.iter().find(|preset| preset.slug() == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_expands_short_form() {
        assert_eq!(HexColor::parse("#abc"), Some(HexColor::new(0xaa, 0xbb, 0xcc)));
        assert_eq!(HexColor::parse("#8B5A3C"), Some(HexColor::new(0x8b, 0x5a, 0x3c)));
    }

    #[test]
    fn parse_rejects_malformed_colors() {
        for bad in ["000000", "#12345", "#GGGGGG", "#1234567", "", "#", "red"] {
            assert_eq!(HexColor::parse(bad), None, "{bad}");
        }
    }

    #[test]
    fn to_hex_is_uppercase_six_digits() {
        assert_eq!(HexColor::parse("#f8bbd9").map(HexColor::to_hex).as_deref(), Some("#F8BBD9"));
    }

    #[test]
    fn gradient_position_follows_direction() {
        let size = 100.0;
        assert!(GradientDirection::Horizontal.position(0.0, 50.0, size) < 0.01);
        assert!(GradientDirection::Horizontal.position(100.0, 50.0, size) > 0.99);
        assert!(GradientDirection::Vertical.position(50.0, 100.0, size) > 0.99);
        assert!(GradientDirection::DiagonalDown.position(0.0, 0.0, size) < 0.01);
        assert!(GradientDirection::DiagonalDown.position(100.0, 100.0, size) > 0.99);
        assert!(GradientDirection::DiagonalUp.position(0.0, 100.0, size) < 0.01);
        assert!(GradientDirection::DiagonalUp.position(100.0, 0.0, size) > 0.99);
        assert!((GradientDirection::DiagonalUp.position(0.0, 0.0, size) - 0.5).abs() < 0.01);
    }

    #[test]
    fn solid_fill_is_uniform() {
        let fill = Fill::Solid(HexColor::new(1, 2, 3));
        assert_eq!(fill.color_at(0, 0, 64), fill.color_at(63, 63, 64));
    }

    #[test]
    fn presets_are_found_by_slug() {
        assert!(matches!(find_preset("ocean-blue"), Some(ColorPreset::Gradient { .. })));
        assert!(matches!(find_preset("Navy-Blue"), Some(ColorPreset::Solid { .. })));
        assert!(find_preset("unknown").is_none());
        assert_eq!(COLOR_PRESETS.len(), 10);
        assert!(COLOR_PRESETS.iter().all(|preset| match preset {
            ColorPreset::Solid { foreground, background, .. } => {
                HexColor::is_valid(foreground) && HexColor::is_valid(background)
            }
            ColorPreset::Gradient { start, end, .. } => {
                HexColor::is_valid(start) && HexColor::is_valid(end)
            }
        }));
    }

    #[test]
    fn gradient_preset_switches_mode() {
        let mut params = RenderParams::with_value("preset");
        find_preset("sunset-orange").expect("preset").apply(&mut params);

        assert_eq!(params.color_mode.as_deref(), Some("gradient"));
        assert_eq!(params.gradient_direction.as_deref(), Some("horizontal"));
        assert_eq!(params.gradient_start.as_deref(), Some("#ea580c"));
    }
}
