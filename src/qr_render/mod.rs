//! # 二维码渲染模块（qr_render）
//!
//! ## 设计思路
//!
//! 该模块将“参数校验 → 颜色解析 → 遮罩 → 着色 → 铺底 → 中心图标 → 编码输出”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `endpoint`：仅做 结果 → 传输层响应 的翻译（薄封装）
//! - `service`：承载可注入状态（`QrService`），汇合查询串与 JSON 两个入口
//! - `handler`：编排整条渲染流水线
//! - `request`：原始参数、强类型请求与唯一的校验函数
//! - `color`：颜色解析、渐变采样、颜色预设
//! - `matrix/mask`：模块矩阵与 alpha 遮罩
//! - `backend/compose`：合成原语（软件 / Canvas）与基础图合成
//! - `loader/pipeline/overlay`：中心图标加载、解码与叠加
//! - `output`：PNG / SVG / Data URL
//! - `client`：直接调用托管接口取图（不走本地渲染）
//! - `config/error/source/content`：配置、错误、中间数据模型、内容构建
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! HTTP 查询串 / JSON / CLI
//!    ↓
//! endpoint.rs（响应适配）
//!    ↓
//! service.rs（入口汇合）→ request.rs（校验）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ matrix.rs（编码；SVG 快速路径直接走 output.rs）
//!    ├─ loader.rs（中心图标加载 + URL/体积安全校验）
//!    └─ spawn_blocking
//!         ├─ mask.rs → compose.rs（遮罩 → 着色 → 铺底）
//!         ├─ pipeline.rs → overlay.rs（解码 → 裁剪 → 叠加）
//!         └─ output.rs（PNG 编码）
//!    ↓
//! RenderResponse 返回宿主
//! ```
//!
//! ## 分层职责建议
//!
//! - 参数名、默认值、取值范围变更优先改 `request.rs` 与 `config.rs`
//! - 颜色与渐变效果变更优先改 `color.rs`
//! - 合成语义变更需要同时改两个后端，并跑 `backend` 的共享属性测试
//! - 中心图标下载策略（超时、重定向、SSRF）优先看 `loader.rs`

pub mod backend;
mod client;
pub mod color;
pub mod compose;
pub mod config;
pub mod content;
pub mod endpoint;
mod error;
mod handler;
mod loader;
pub mod mask;
pub mod matrix;
pub mod output;
pub mod overlay;
mod pipeline;
pub mod request;
mod service;
mod source;

pub use backend::{CanvasBackend, RenderBackend, SoftwareBackend};
pub use client::{fetch_qrcode_from_api, DEFAULT_API_BASE_URL};
pub use color::{find_preset, resolve_fill, ColorPreset, Fill, HexColor, COLOR_PRESETS};
pub use config::{BackendKind, OverlayQuality, RenderConfig, RenderSettings, DEFAULTS};
pub use content::{build_content, ContactCard, ContentInput};
pub use endpoint::{handle_json, handle_query, ErrorBody, RenderResponse, CACHE_CONTROL_IMMUTABLE};
pub use error::RenderError;
pub use handler::QrRenderer;
pub use matrix::QrMatrix;
pub use request::{
    build_api_url, validate, ColorMode, ErrorCorrectionLevel, GradientDirection, OutputFormat, RenderParams,
    RenderRequest, RenderRoute,
};
pub use service::QrService;
pub use source::{CenterImageSource, RenderOutput};
