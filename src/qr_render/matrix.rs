//! # 模块矩阵
//!
//! 对 `qrcode` 的薄封装：只暴露流水线需要的宽度与逐模块明暗查询，
//! 编码失败统一映射为 `RenderError::Encoding`。

use qrcode::{Color, EcLevel, QrCode};

use super::request::ErrorCorrectionLevel;
use super::RenderError;

impl From<ErrorCorrectionLevel> for EcLevel {
    fn from(level: ErrorCorrectionLevel) -> Self {
        match level {
            ErrorCorrectionLevel::L => EcLevel::L,
            ErrorCorrectionLevel::M => EcLevel::M,
            ErrorCorrectionLevel::Q => EcLevel::Q,
            ErrorCorrectionLevel::H => EcLevel::H,
        }
    }
}

/// 正方形模块矩阵，`true` 为深色模块。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// 以指定纠错等级编码内容，自动选择能容纳内容的最小版本。
    pub fn encode(value: &str, level: ErrorCorrectionLevel) -> Result<Self, RenderError> {
        let code = QrCode::with_error_correction_level(value.as_bytes(), level.into())
            .map_err(|e| {
                RenderError::Encoding(format!(
                    "内容无法编码（{} 字节，纠错等级 {}）：{}",
                    value.len(),
                    level.as_str(),
                    e
                ))
            })?;

        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        Ok(Self { width, modules })
    }

    /// 每边模块数（不含静区）。
    pub fn width(&self) -> usize {
        self.width
    }

    /// 模块 `(x, y)` 是否为深色；越界视为浅色。
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.width {
            return false;
        }
        self.modules[y * self.width + x]
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|dark| **dark).count()
    }
}
