//! # 请求模型与参数校验
//!
//! ## 设计思路
//!
//! 边界层（查询字符串 / JSON 请求体）传进来的是一包松散的字符串，
//! 这里把它一次性校验成强类型的 `RenderRequest`，之后的流水线不再做任何参数检查。
//! 两个入口共用同一个 `validate`，避免同一套规则维护两份。
//!
//! ## 实现思路
//!
//! - `RenderParams`：原始参数，字段名与 HTTP 约定一致（camelCase），全部可选。
//! - `validate`：按固定顺序逐项校验，首个错误即返回，错误信息带上字段名。
//! - `RenderRequest::route`：决定走 SVG 快速路径还是完整光栅路径。

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Deserializer, Serialize};

use super::color::HexColor;
use super::config::DEFAULTS;
use super::source::CenterImageSource;
use super::RenderError;

const SIZE_RANGE: std::ops::RangeInclusive<i64> = 64..=2048;
const MARGIN_RANGE: std::ops::RangeInclusive<i64> = 0..=10;
const OVERLAY_RADIUS_RANGE: std::ops::RangeInclusive<i64> = 0..=50;
const OVERLAY_SCALE_MIN: f64 = 0.1;
const OVERLAY_SCALE_MAX: f64 = 0.5;

/// 纠错等级。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCorrectionLevel {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrectionLevel {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }
}

/// 颜色模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Solid,
    Gradient,
}

impl ColorMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "solid" => Some(Self::Solid),
            "gradient" => Some(Self::Gradient),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
        }
    }
}

/// 渐变方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    Horizontal,
    Vertical,
    DiagonalDown,
    DiagonalUp,
}

impl GradientDirection {
    pub const ALL: [Self; 4] = [
        Self::Horizontal,
        Self::Vertical,
        Self::DiagonalDown,
        Self::DiagonalUp,
    ];

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            "diagonal-down" => Some(Self::DiagonalDown),
            "diagonal-up" => Some(Self::DiagonalUp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::DiagonalDown => "diagonal-down",
            Self::DiagonalUp => "diagonal-up",
        }
    }
}

/// 输出格式；`Blob` 是以 base64 Data URL 传输的 PNG。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
    Blob,
}

impl OutputFormat {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "blob" => Some(Self::Blob),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Blob => "blob",
        }
    }
}

/// 渲染路径。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRoute {
    /// 实色、无中心图标、请求 SVG：直接由矩阵输出矢量图。
    Vector,
    /// 遮罩 → 填充 → 背景 →（叠加）→ PNG。
    Raster,
}

/// 原始请求参数。
///
/// 数值字段在 JSON 中既可以是数字也可以是字符串，统一按字符串保存，由 `validate` 解析。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderParams {
    #[serde(deserialize_with = "scalar_as_string")]
    pub value: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub size: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub margin: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub error_correction_level: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub color_mode: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub foreground_color: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub background_color: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub gradient_start: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub gradient_end: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub gradient_direction: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub format: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub center_image_url: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub center_image_base64: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub overlay_background: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub overlay_radius: Option<String>,
    #[serde(deserialize_with = "scalar_as_string")]
    pub overlay_scale: Option<String>,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number_to_param(&number)),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// JSON 数字转参数文本；`256.0` 这类整值浮点数按整数处理。
fn number_to_param(number: &serde_json::Number) -> String {
    if number.is_f64() {
        if let Some(float) = number.as_f64() {
            if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e15 {
                return format!("{}", float as i64);
            }
        }
    }
    number.to_string()
}

impl RenderParams {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// 解析查询字符串（可带前导 `?`），未知参数忽略。
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.trim().trim_start_matches('?');

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "value" => params.value = value,
                "size" => params.size = value,
                "margin" => params.margin = value,
                "errorCorrectionLevel" => params.error_correction_level = value,
                "colorMode" => params.color_mode = value,
                "foregroundColor" => params.foreground_color = value,
                "backgroundColor" => params.background_color = value,
                "gradientStart" => params.gradient_start = value,
                "gradientEnd" => params.gradient_end = value,
                "gradientDirection" => params.gradient_direction = value,
                "format" => params.format = value,
                "centerImageUrl" => params.center_image_url = value,
                "centerImageBase64" => params.center_image_base64 = value,
                "overlayBackground" => params.overlay_background = value,
                "overlayRadius" => params.overlay_radius = value,
                "overlayScale" => params.overlay_scale = value,
                other => log::debug!("忽略未知查询参数：{}", other),
            }
        }

        params
    }

    /// 解析 JSON 请求体。
    pub fn from_json(body: &str) -> Result<Self, RenderError> {
        serde_json::from_str(body)
            .map_err(|e| RenderError::validation("body", format!("JSON 解析失败：{}", e)))
    }

    /// 生成查询字符串，只包含已设置的字段。
    pub fn to_query_string(&self) -> String {
        let fields: [(&str, &Option<String>); 16] = [
            ("value", &self.value),
            ("size", &self.size),
            ("margin", &self.margin),
            ("errorCorrectionLevel", &self.error_correction_level),
            ("colorMode", &self.color_mode),
            ("foregroundColor", &self.foreground_color),
            ("backgroundColor", &self.background_color),
            ("gradientStart", &self.gradient_start),
            ("gradientEnd", &self.gradient_end),
            ("gradientDirection", &self.gradient_direction),
            ("format", &self.format),
            ("centerImageUrl", &self.center_image_url),
            ("centerImageBase64", &self.center_image_base64),
            ("overlayBackground", &self.overlay_background),
            ("overlayRadius", &self.overlay_radius),
            ("overlayScale", &self.overlay_scale),
        ];

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in fields {
            if let Some(value) = value {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

/// 拼接托管 API 的请求地址。
pub fn build_api_url(base_url: &str, params: &RenderParams) -> String {
    format!("{}?{}", base_url, params.to_query_string())
}

/// 已校验的渲染请求。
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub value: String,
    pub size: u32,
    pub margin: u32,
    pub error_correction: ErrorCorrectionLevel,
    pub color_mode: ColorMode,
    pub foreground: HexColor,
    pub background: HexColor,
    pub gradient_start: HexColor,
    pub gradient_end: HexColor,
    pub gradient_direction: GradientDirection,
    pub center_image: Option<CenterImageSource>,
    pub overlay_background: HexColor,
    pub overlay_radius: u32,
    pub overlay_scale: f64,
    pub format: OutputFormat,
}

impl RenderRequest {
    /// 使用默认参数构造请求。
    pub fn new(value: impl Into<String>) -> Result<Self, RenderError> {
        validate(&RenderParams::with_value(value))
    }

    pub fn route(&self) -> RenderRoute {
        if self.format == OutputFormat::Svg
            && self.color_mode == ColorMode::Solid
            && self.center_image.is_none()
        {
            RenderRoute::Vector
        } else {
            RenderRoute::Raster
        }
    }

    /// 还原为原始参数；原始字节形式的中心图标按 base64 写回。
    pub fn to_params(&self) -> RenderParams {
        let (center_image_url, center_image_base64) = match &self.center_image {
            Some(CenterImageSource::Url(url)) => (Some(url.clone()), None),
            Some(CenterImageSource::Base64(data)) => (None, Some(data.clone())),
            Some(CenterImageSource::Bytes(bytes)) => {
                (None, Some(general_purpose::STANDARD.encode(bytes)))
            }
            None => (None, None),
        };

        RenderParams {
            value: Some(self.value.clone()),
            size: Some(self.size.to_string()),
            margin: Some(self.margin.to_string()),
            error_correction_level: Some(self.error_correction.as_str().to_string()),
            color_mode: Some(self.color_mode.as_str().to_string()),
            foreground_color: Some(self.foreground.to_hex()),
            background_color: Some(self.background.to_hex()),
            gradient_start: Some(self.gradient_start.to_hex()),
            gradient_end: Some(self.gradient_end.to_hex()),
            gradient_direction: Some(self.gradient_direction.as_str().to_string()),
            format: Some(self.format.as_str().to_string()),
            center_image_url,
            center_image_base64,
            overlay_background: Some(self.overlay_background.to_hex()),
            overlay_radius: Some(self.overlay_radius.to_string()),
            overlay_scale: Some(self.overlay_scale.to_string()),
        }
    }

    /// 托管 API 的查询字符串，与查询字符串入口互逆。
    pub fn to_query_string(&self) -> String {
        self.to_params().to_query_string()
    }

    /// 实际输出格式：无法走矢量路径的 SVG 请求静默回退为 PNG。
    pub fn effective_format(&self) -> OutputFormat {
        match (self.format, self.route()) {
            (OutputFormat::Svg, RenderRoute::Raster) => OutputFormat::Png,
            (format, _) => format,
        }
    }
}

fn param<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().unwrap_or(default)
}

fn parse_int(field: &'static str, text: &str) -> Result<i64, RenderError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| RenderError::validation(field, format!("必须是整数，收到：{}", text)))
}

fn parse_color(field: &'static str, text: &str) -> Result<HexColor, RenderError> {
    HexColor::parse(text).ok_or_else(|| {
        RenderError::validation(field, format!("颜色格式无效：{}（示例：#000000）", text))
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

/// 校验原始参数并生成强类型请求。查询字符串与 JSON 两个入口共用。
pub fn validate(params: &RenderParams) -> Result<RenderRequest, RenderError> {
    let value = match params.value.as_deref() {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => return Err(RenderError::validation("value", "缺少参数或内容为空")),
    };

    let size = match &params.size {
        Some(text) => parse_int("size", text)?,
        None => DEFAULTS.size as i64,
    };
    if !SIZE_RANGE.contains(&size) {
        return Err(RenderError::validation("size", "必须在 64 到 2048 之间"));
    }

    let margin = match &params.margin {
        Some(text) => parse_int("margin", text)?,
        None => DEFAULTS.margin as i64,
    };
    if !MARGIN_RANGE.contains(&margin) {
        return Err(RenderError::validation("margin", "必须在 0 到 10 之间"));
    }

    let error_correction = ErrorCorrectionLevel::parse(param(
        &params.error_correction_level,
        DEFAULTS.error_correction,
    ))
    .ok_or_else(|| RenderError::validation("errorCorrectionLevel", "必须是 L、M、Q 或 H"))?;

    let color_mode = ColorMode::parse(param(&params.color_mode, DEFAULTS.color_mode))
        .ok_or_else(|| RenderError::validation("colorMode", "必须是 solid 或 gradient"))?;

    let gradient_direction = GradientDirection::parse(param(
        &params.gradient_direction,
        DEFAULTS.gradient_direction,
    ))
    .ok_or_else(|| {
        RenderError::validation(
            "gradientDirection",
            "必须是 horizontal、vertical、diagonal-down 或 diagonal-up",
        )
    })?;

    let format = OutputFormat::parse(param(&params.format, DEFAULTS.format))
        .ok_or_else(|| RenderError::validation("format", "必须是 png、svg 或 blob"))?;

    let overlay_scale = match &params.overlay_scale {
        Some(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|scale| scale.is_finite())
            .ok_or_else(|| {
                RenderError::validation("overlayScale", format!("必须是数字，收到：{}", text))
            })?,
        None => DEFAULTS.overlay_scale,
    };
    if !(OVERLAY_SCALE_MIN..=OVERLAY_SCALE_MAX).contains(&overlay_scale) {
        return Err(RenderError::validation("overlayScale", "必须在 0.1 到 0.5 之间"));
    }

    let overlay_radius = match &params.overlay_radius {
        Some(text) => parse_int("overlayRadius", text)?,
        None => DEFAULTS.overlay_radius as i64,
    };
    if !OVERLAY_RADIUS_RANGE.contains(&overlay_radius) {
        return Err(RenderError::validation("overlayRadius", "必须在 0 到 50 之间"));
    }

    let foreground = parse_color(
        "foregroundColor",
        param(&params.foreground_color, DEFAULTS.foreground),
    )?;
    let background = parse_color(
        "backgroundColor",
        param(&params.background_color, DEFAULTS.background),
    )?;

    let start_text = param(&params.gradient_start, DEFAULTS.gradient_start);
    let end_text = param(&params.gradient_end, DEFAULTS.gradient_end);
    let (gradient_start, gradient_end) = match color_mode {
        ColorMode::Gradient => (
            parse_color("gradientStart", start_text)?,
            parse_color("gradientEnd", end_text)?,
        ),
        // 实色模式下渐变颜色不参与渲染，格式错误时退回默认值
        ColorMode::Solid => (
            HexColor::parse(start_text)
                .or_else(|| HexColor::parse(DEFAULTS.gradient_start))
                .unwrap_or(HexColor::BLACK),
            HexColor::parse(end_text)
                .or_else(|| HexColor::parse(DEFAULTS.gradient_end))
                .unwrap_or(HexColor::WHITE),
        ),
    };

    let overlay_background = parse_color(
        "overlayBackground",
        param(&params.overlay_background, DEFAULTS.overlay_background),
    )?;

    let center_image = if let Some(url) = non_empty(&params.center_image_url) {
        Some(CenterImageSource::Url(url.to_string()))
    } else {
        non_empty(&params.center_image_base64)
            .map(|data| CenterImageSource::Base64(data.to_string()))
    };

    Ok(RenderRequest {
        value,
        size: size as u32,
        margin: margin as u32,
        error_correction,
        color_mode,
        foreground,
        background,
        gradient_start,
        gradient_end,
        gradient_direction,
        center_image,
        overlay_background,
        overlay_radius: overlay_radius as u32,
        overlay_scale,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<RenderRequest, RenderError>) -> &'static str {
        match result {
            Err(RenderError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {:?}", other.map(|r| r.value)),
        }
    }

    #[test]
    fn defaults_are_applied() {
        let request = RenderRequest::new("Hello World").expect("valid request");

        assert_eq!(request.size, 320);
        assert_eq!(request.margin, 2);
        assert_eq!(request.error_correction, ErrorCorrectionLevel::H);
        assert_eq!(request.color_mode, ColorMode::Solid);
        assert_eq!(request.foreground, HexColor::BLACK);
        assert_eq!(request.background, HexColor::WHITE);
        assert_eq!(request.gradient_direction, GradientDirection::DiagonalDown);
        assert_eq!(request.overlay_radius, 8);
        assert_eq!(request.format, OutputFormat::Png);
        assert!(request.center_image.is_none());
    }

    #[test]
    fn blank_value_is_rejected() {
        assert_eq!(field_of(validate(&RenderParams::with_value("   "))), "value");
        assert_eq!(field_of(validate(&RenderParams::default())), "value");
    }

    #[test]
    fn numeric_ranges_are_enforced() {
        let cases = [
            ("size=63", "size"),
            ("size=2049", "size"),
            ("size=abc", "size"),
            ("margin=11", "margin"),
            ("margin=-1", "margin"),
            ("overlayRadius=51", "overlayRadius"),
            ("overlayScale=0.09", "overlayScale"),
            ("overlayScale=0.51", "overlayScale"),
            ("overlayScale=NaN", "overlayScale"),
        ];

        for (query, field) in cases {
            let params = RenderParams::from_query(&format!("value=x&{query}"));
            assert_eq!(field_of(validate(&params)), field, "{query}");
        }
    }

    #[test]
    fn boundary_values_are_accepted() {
        for query in [
            "overlayScale=0.1&overlayRadius=0&size=64&margin=0",
            "overlayScale=0.5&overlayRadius=50&size=2048&margin=10",
        ] {
            let params = RenderParams::from_query(&format!("value=x&{query}"));
            assert!(validate(&params).is_ok(), "{query}");
        }
    }

    #[test]
    fn enum_fields_are_case_sensitive() {
        let cases = [
            ("errorCorrectionLevel=h", "errorCorrectionLevel"),
            ("colorMode=preset", "colorMode"),
            ("gradientDirection=diagonal", "gradientDirection"),
            ("format=jpeg", "format"),
        ];
        for (query, field) in cases {
            let params = RenderParams::from_query(&format!("value=x&{query}"));
            assert_eq!(field_of(validate(&params)), field, "{query}");
        }
    }

    #[test]
    fn gradient_colors_only_checked_in_gradient_mode() {
        let solid = RenderParams::from_query("value=x&gradientStart=nope");
        assert!(validate(&solid).is_ok());

        let gradient = RenderParams::from_query("value=x&colorMode=gradient&gradientStart=nope");
        assert_eq!(field_of(validate(&gradient)), "gradientStart");
    }

    #[test]
    fn query_and_json_produce_the_same_request() {
        let query = RenderParams::from_query(
            "?value=Hello%20World&size=256&margin=4&colorMode=gradient&gradientDirection=vertical&overlayScale=0.3",
        );
        let json = RenderParams::from_json(
            r#"{"value":"Hello World","size":256,"margin":"4","colorMode":"gradient","gradientDirection":"vertical","overlayScale":0.3}"#,
        )
        .expect("json params");

        assert_eq!(query, json);

        let request = validate(&json).expect("valid request");
        assert_eq!(request.size, 256);
        assert_eq!(request.margin, 4);
        assert_eq!(request.gradient_direction, GradientDirection::Vertical);
    }

    #[test]
    fn json_integral_floats_are_accepted_as_integers() {
        let params = RenderParams::from_json(
            r#"{"value":"x","size":256.0,"margin":0.0,"overlayRadius":12.0,"overlayScale":0.25}"#,
        )
        .expect("json params");

        assert_eq!(params.size.as_deref(), Some("256"));
        assert_eq!(params.overlay_scale.as_deref(), Some("0.25"));

        let request = validate(&params).expect("valid request");
        assert_eq!(request.size, 256);
        assert_eq!(request.margin, 0);
        assert_eq!(request.overlay_radius, 12);

        let fractional = RenderParams::from_json(r#"{"value":"x","size":256.5}"#).expect("json params");
        assert_eq!(field_of(validate(&fractional)), "size");
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        assert!(matches!(
            RenderParams::from_json("{not json"),
            Err(RenderError::Validation { field: "body", .. })
        ));
    }

    #[test]
    fn svg_falls_back_to_png_when_raster_is_required() {
        let solid = validate(&RenderParams::from_query("value=x&format=svg")).expect("valid");
        assert_eq!(solid.route(), RenderRoute::Vector);
        assert_eq!(solid.effective_format(), OutputFormat::Svg);

        let gradient =
            validate(&RenderParams::from_query("value=x&format=svg&colorMode=gradient")).expect("valid");
        assert_eq!(gradient.route(), RenderRoute::Raster);
        assert_eq!(gradient.effective_format(), OutputFormat::Png);

        let logo = validate(&RenderParams::from_query(
            "value=x&format=svg&centerImageUrl=https%3A%2F%2Fexample.com%2Flogo.png",
        ))
        .expect("valid");
        assert_eq!(logo.route(), RenderRoute::Raster);
    }

    #[test]
    fn empty_center_image_url_means_no_overlay() {
        let request = validate(&RenderParams::from_query("value=x&centerImageUrl=")).expect("valid");
        assert!(request.center_image.is_none());
    }

    #[test]
    fn validated_request_round_trips_through_query_string() {
        let request = validate(&RenderParams::from_query(
            "value=Round%20Trip&size=512&colorMode=gradient&gradientDirection=diagonal-up&overlayScale=0.26&centerImageUrl=https%3A%2F%2Fexample.com%2Flogo.png",
        ))
        .expect("valid");

        let again = validate(&RenderParams::from_query(&request.to_query_string())).expect("valid");

        assert_eq!(again.value, "Round Trip");
        assert_eq!(again.size, 512);
        assert_eq!(again.color_mode, ColorMode::Gradient);
        assert_eq!(again.gradient_direction, GradientDirection::DiagonalUp);
        assert!((again.overlay_scale - 0.26).abs() < 1e-9);
        assert_eq!(again.center_image, request.center_image);
    }

    #[test]
    fn api_url_round_trips_through_query_parser() {
        let mut params = RenderParams::with_value("a&b=c");
        params.size = Some("512".into());
        params.gradient_start = Some("#1e40af".into());

        let url = build_api_url("https://qr-generator.dev/api/qrcode", &params);
        let (_, query) = url.split_once('?').expect("query part");

        assert_eq!(RenderParams::from_query(query), params);
    }
}
