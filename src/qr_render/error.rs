//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载渲染链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! ## 分类
//!
//! - `Validation`：参数非法，边界层直接返回 4xx，不重试
//! - `Encoding`：内容超出二维码容量，终止本次请求
//! - `Network/Timeout/InvalidFormat/Decode/ResourceLimit`：中心图标获取失败，
//!   默认在流水线内部吞掉（跳过叠加），严格模式下才向上抛出
//! - `Internal`：合成过程中的意外错误，对外只给通用文案

/// 渲染链路统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("参数错误（{field}）：{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("编码错误：{0}")]
    Encoding(String),

    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("内部错误：{0}")]
    Internal(String),
}

impl RenderError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// 稳定的机器可读错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "invalid_parameter",
            Self::Encoding(_) => "encoding_failed",
            Self::Network(_) => "overlay_network",
            Self::Timeout(_) => "overlay_timeout",
            Self::InvalidFormat(_) => "overlay_invalid_format",
            Self::Decode(_) => "overlay_decode",
            Self::ResourceLimit(_) => "overlay_resource_limit",
            Self::Internal(_) => "internal",
        }
    }

    /// 出错所在的流水线阶段，用于日志与前端提示。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validate",
            Self::Encoding(_) => "mask",
            Self::Network(_) | Self::Timeout(_) => "fetch",
            Self::InvalidFormat(_) | Self::Decode(_) | Self::ResourceLimit(_) => "overlay",
            Self::Internal(_) => "compose",
        }
    }

    /// 对应的传输层状态码。
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Encoding(_) => 422,
            Self::Network(_) | Self::Timeout(_) => 502,
            Self::InvalidFormat(_) | Self::Decode(_) | Self::ResourceLimit(_) => 422,
            Self::Internal(_) => 500,
        }
    }

    /// 是否属于中心图标阶段的可降级错误。
    pub fn is_overlay_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Timeout(_)
                | Self::InvalidFormat(_)
                | Self::Decode(_)
                | Self::ResourceLimit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = RenderError::validation("overlayScale", "必须在 0.1 到 0.5 之间");

        assert!(err.to_string().contains("overlayScale"));
        assert_eq!(err.status(), 400);
        assert!(!err.is_overlay_failure());
    }

    #[test]
    fn overlay_failures_are_recoverable_kinds() {
        assert!(RenderError::Network("HTTP 404".into()).is_overlay_failure());
        assert!(RenderError::Timeout("首包超时".into()).is_overlay_failure());
        assert!(RenderError::Decode("坏数据".into()).is_overlay_failure());
        assert!(!RenderError::Encoding("太长".into()).is_overlay_failure());
        assert!(!RenderError::Internal("缓冲区".into()).is_overlay_failure());
    }
}
