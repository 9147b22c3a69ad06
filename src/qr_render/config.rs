//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `RenderConfig`，保证运行时行为可观测、可调整、可测试。
//! 请求参数默认值（尺寸、边距、颜色等）是纯数据，放在只读的 `DEFAULTS` 表中，
//! 首次访问时构建，之后全程只读，不存在进程级可变单例。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `OverlayQuality` 负责档位字符串解析与反向输出，并映射到缩放滤镜。
//! - `RenderSettings` 是可序列化的配置子集，可从 JSON 文件加载后应用。

use image::imageops::FilterType;
use once_cell::sync::Lazy;

use super::RenderError;

/// 请求参数默认值表。
#[derive(Debug, Clone)]
pub struct RenderDefaults {
    pub size: u32,
    pub margin: u32,
    pub error_correction: &'static str,
    pub color_mode: &'static str,
    pub foreground: &'static str,
    pub background: &'static str,
    pub gradient_start: &'static str,
    pub gradient_end: &'static str,
    pub gradient_direction: &'static str,
    pub format: &'static str,
    pub overlay_background: &'static str,
    pub overlay_radius: u32,
    pub overlay_scale: f64,
}

pub static DEFAULTS: Lazy<RenderDefaults> = Lazy::new(|| RenderDefaults {
    size: 320,
    margin: 2,
    error_correction: "H",
    color_mode: "solid",
    foreground: "#000000",
    background: "#FFFFFF",
    gradient_start: "#8B5A3C",
    gradient_end: "#F8BBD9",
    gradient_direction: "diagonal-down",
    format: "png",
    overlay_background: "#FFFFFF",
    overlay_radius: 8,
    overlay_scale: 0.24,
});

/// 合成后端选择。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 逐像素软件缓冲区（服务端默认）。
    Software,
    /// tiny-skia 绘图表面，按 Canvas 2D 的合成语义绘制。
    Canvas,
}

/// 渲染配置。
///
/// 字段覆盖了中心图标下载、解码、缩放与失败策略四个方面。
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// 中心图标允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 下载总超时时间（毫秒）。
    pub fetch_timeout_ms: u64,
    /// 建立连接（TCP/TLS）超时时间（毫秒）。
    pub connect_timeout_ms: u64,
    /// 下载首包超时时间（毫秒）。
    pub stream_first_byte_timeout_ms: u64,
    /// 下载分块读取超时时间（毫秒）。
    pub stream_chunk_timeout_ms: u64,
    /// 最大重定向次数。
    pub max_redirects: usize,
    /// 是否允许访问内网或本地地址（默认关闭，防 SSRF）。
    pub allow_private_network: bool,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 中心图标缩放档位。
    pub overlay_quality: OverlayQuality,
    /// 严格模式：中心图标失败时直接报错，而不是静默跳过叠加。
    pub strict_overlay: bool,
    /// 合成后端。
    pub backend: BackendKind,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            fetch_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            stream_first_byte_timeout_ms: 5_000,
            stream_chunk_timeout_ms: 5_000,
            max_redirects: 5,
            allow_private_network: false,
            max_decoded_pixels: 40_000_000,
            overlay_quality: OverlayQuality::Balanced,
            strict_overlay: false,
            backend: BackendKind::Software,
        }
    }
}

/// 中心图标缩放档位（面向产品/用户语义）。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayQuality {
    Quality,
    Balanced,
    Speed,
}

impl OverlayQuality {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use qr_generator::qr_render::OverlayQuality;
    ///
    /// let q = OverlayQuality::from_str("balanced")?;
    /// assert_eq!(q.as_str(), "balanced");
    /// # Ok::<(), qr_generator::qr_render::RenderError>(())
    /// ```
    pub fn from_str(profile: &str) -> Result<Self, RenderError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(RenderError::validation(
                "overlayQuality",
                format!("未知缩放档位：{}（可选：quality / balanced / speed）", other),
            )),
        }
    }

    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }

    /// 档位对应的缩放滤镜。
    pub fn filter(self) -> FilterType {
        match self {
            Self::Quality => FilterType::Lanczos3,
            Self::Balanced => FilterType::CatmullRom,
            Self::Speed => FilterType::Triangle,
        }
    }
}

/// 可序列化的配置子集，用于从 JSON 文件加载或对外展示。
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSettings {
    pub fetch_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub max_file_size: u64,
    pub allow_private_network: bool,
    pub overlay_quality: String,
    pub strict_overlay: bool,
    pub backend: BackendKind,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderConfig::default().settings()
    }
}

impl RenderConfig {
    /// 导出可序列化的配置快照。
    pub fn settings(&self) -> RenderSettings {
        RenderSettings {
            fetch_timeout_ms: self.fetch_timeout_ms,
            connect_timeout_ms: self.connect_timeout_ms,
            max_file_size: self.max_file_size,
            allow_private_network: self.allow_private_network,
            overlay_quality: self.overlay_quality.as_str().to_string(),
            strict_overlay: self.strict_overlay,
            backend: self.backend,
        }
    }

    /// 校验并应用外部配置。
    pub fn apply_settings(&mut self, settings: &RenderSettings) -> Result<(), RenderError> {
        if !(500..=120_000).contains(&settings.fetch_timeout_ms) {
            return Err(RenderError::validation(
                "fetchTimeoutMs",
                "必须在 500~120000 毫秒之间",
            ));
        }
        if !(100..=60_000).contains(&settings.connect_timeout_ms) {
            return Err(RenderError::validation(
                "connectTimeoutMs",
                "必须在 100~60000 毫秒之间",
            ));
        }
        if settings.max_file_size < 1024 {
            return Err(RenderError::validation("maxFileSize", "不能小于 1KB"));
        }

        let quality = OverlayQuality::from_str(&settings.overlay_quality)?;

        self.fetch_timeout_ms = settings.fetch_timeout_ms;
        self.connect_timeout_ms = settings.connect_timeout_ms;
        self.max_file_size = settings.max_file_size;
        self.allow_private_network = settings.allow_private_network;
        self.overlay_quality = quality;
        self.strict_overlay = settings.strict_overlay;
        self.backend = settings.backend;

        Ok(())
    }
}
