//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError`，把渲染错误、文件读写与配置解析错误收拢到一个类型里，
//! 避免入口处散落 `.map_err(|e| e.to_string())`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `RenderError`、`std::io::Error`、`serde_json::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于宿主直接回传。

use serde::Serialize;

use crate::qr_render::RenderError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 渲染流水线错误（校验 / 编码 / 中心图标 / 合成）
    #[error("{0}")]
    Render(#[from] RenderError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置或请求文件解析失败
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 命令行用法错误
    #[error("用法错误: {0}")]
    Usage(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
