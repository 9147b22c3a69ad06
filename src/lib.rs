//! # 二维码生成器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            宿主（HTTP 路由 / CLI / 测试）                 │
//! │                                                          │
//! │   ?query  ──┐                                            │
//! │   JSON   ───┼──→ endpoint ──→ QrService                  │
//! │   CLI    ───┘                    │                       │
//! └──────────────────────────────────┼───────────────────────┘
//!                                    ↕ Result<RenderOutput, RenderError>
//! ┌──────────────────────────────────┼───────────────────────┐
//! │                 qr_render        ↕                       │
//! │                                                          │
//! │  request ── validate（唯一校验入口）                      │
//! │     ↓                                                    │
//! │  color ── matrix ── mask ── compose ── overlay ── output │
//! │                       │        │          │              │
//! │                     backend（Software / Canvas）          │
//! │                                           │              │
//! │                              loader ── pipeline           │
//! │                     （下载 + SSRF 校验）（解码 + 像素上限） │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 应用级错误 `AppError`，CLI 与宿主统一使用 |
//! | [`qr_render`] | 参数校验、遮罩、着色、铺底、中心图标叠加与编码输出 |

pub mod error;
pub mod qr_render;
