//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `CenterImageSource` 表示中心图标的来源语义
//! - `RawImageData` 表示已加载但未解码的字节
//! - `RenderOutput` 表示最终交付给调用方的编码结果

use super::request::OutputFormat;

/// 中心图标来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CenterImageSource {
    /// 网络地址来源。
    Url(String),
    /// 调用方已持有的原始图片字节。
    Bytes(Vec<u8>),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
}

impl CenterImageSource {
    /// 来源标识（用于日志与诊断）。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Bytes(_) => "bytes",
            Self::Base64(_) => "base64",
        }
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 渲染结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    /// PNG 字节。
    Png(Vec<u8>),
    /// SVG 文本。
    Svg(String),
    /// `data:image/png;base64,...`。
    DataUrl(String),
}

impl RenderOutput {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png(_) => "image/png",
            Self::Svg(_) => "image/svg+xml",
            Self::DataUrl(_) => "text/plain; charset=utf-8",
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Png(_) => OutputFormat::Png,
            Self::Svg(_) => OutputFormat::Svg,
            Self::DataUrl(_) => OutputFormat::Blob,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Png(bytes) => bytes,
            Self::Svg(text) | Self::DataUrl(text) => text.into_bytes(),
        }
    }
}
