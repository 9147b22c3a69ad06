//! # 中心图标加载与校验
//!
//! ## 设计思路
//!
//! 统一处理不同来源（URL / Base64 / 原始字节）的中心图标加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗；下载必须有上限时间，不能拖住整个请求。
//!
//! ## 实现思路
//!
//! - URL：协议 + 主机安全 + 状态码 + 内容类型 + 体积校验 + 流式下载（首包/分块超时）。
//! - 重定向手动跟随，每一跳都重新做主机安全校验；`fetch_timeout_ms` 约束整条下载链路。
//! - Base64：格式解析 + 解码前体积估算 + 解码后体积限制。
//! - 字节：体积限制。
//! - 所有来源最后都做文件签名（magic bytes）校验。

use base64::{Engine as _, engine::general_purpose};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::lookup_host;

use super::source::{CenterImageSource, RawImageData};
use super::{RenderConfig, RenderError};

const STREAM_SIGNATURE_PROBE_BYTES: usize = 4096;
const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;

/// 按来源加载中心图标原始字节。
pub(crate) async fn load_center_image(
    source: &CenterImageSource,
    config: &RenderConfig,
) -> Result<RawImageData, RenderError> {
    match source {
        CenterImageSource::Url(url) => load_from_url(url, config).await,
        CenterImageSource::Base64(data) => load_from_base64(data, config),
        CenterImageSource::Bytes(bytes) => load_from_bytes(bytes, config),
    }
}

/// 从 URL 加载图片原始字节。
pub(crate) async fn load_from_url(url: &str, config: &RenderConfig) -> Result<RawImageData, RenderError> {
    log::info!("🌐 开始下载中心图标 - URL: {}", redact_url_for_log(url));

    // 总时限覆盖 DNS 解析与全部重定向跳转，单跳超时无法约束整条链路
    let bytes = tokio::time::timeout(
        Duration::from_millis(config.fetch_timeout_ms),
        download_with_validation(url, config),
    )
    .await
    .map_err(|_| RenderError::Timeout(format!("下载总耗时超过 {}ms", config.fetch_timeout_ms)))??;
    validate_image_signature(&bytes)?;

    Ok(RawImageData {
        bytes,
        source_hint: "url",
    })
}

/// 从 Base64 字符串加载图片原始字节。
pub(crate) fn load_from_base64(data: &str, config: &RenderConfig) -> Result<RawImageData, RenderError> {
    log::debug!("📝 开始处理 base64 中心图标");

    let bytes = parse_base64_with_limit(data, config.max_file_size)?;
    ensure_within_limit(bytes.len() as u64, config.max_file_size, "Base64 解码后体积过大")?;
    validate_image_signature(&bytes)?;

    Ok(RawImageData {
        bytes,
        source_hint: "base64",
    })
}

/// 调用方直接提供的图片字节。
pub(crate) fn load_from_bytes(bytes: &[u8], config: &RenderConfig) -> Result<RawImageData, RenderError> {
    ensure_within_limit(bytes.len() as u64, config.max_file_size, "图片体积过大")?;
    validate_image_signature(bytes)?;

    Ok(RawImageData {
        bytes: bytes.to_vec(),
        source_hint: "bytes",
    })
}

pub(crate) fn ensure_within_limit(len: u64, limit: u64, what: &str) -> Result<(), RenderError> {
    if len > limit {
        return Err(RenderError::ResourceLimit(format!(
            "{}：{:.2} MB（限制：{:.2} MB）",
            what,
            len as f64 / 1024.0 / 1024.0,
            limit as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

/// 执行带校验的网络下载，手动跟随重定向。
///
/// 使用流式读取，避免一次性读入导致内存峰值过高。
async fn download_with_validation(url: &str, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let mut current_url = reqwest::Url::parse(url)
        .map_err(|e| RenderError::InvalidFormat(format!("URL 格式错误：{}", e)))?;

    for redirect_count in 0..=config.max_redirects {
        let pinned = validate_url_safety(&current_url, config).await?;
        let client = build_http_client(&current_url, &pinned, config)?;

        log::debug!("📡 发送 HTTP 请求 - {}", redact_url_for_log(current_url.as_str()));
        let response = client
            .get(current_url.clone())
            .header(reqwest::header::ACCEPT, "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, current_url.as_str(), config))?;

        if response.status().is_redirection() {
            if redirect_count >= config.max_redirects {
                return Err(RenderError::Network(format!(
                    "重定向次数超过限制（{}）",
                    config.max_redirects
                )));
            }

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .ok_or_else(|| RenderError::Network("重定向响应缺少 Location 头".to_string()))?;

            let location_str = location
                .to_str()
                .map_err(|e| RenderError::InvalidFormat(format!("重定向地址无效：{}", e)))?;

            let next_url = current_url
                .join(location_str)
                .map_err(|e| RenderError::InvalidFormat(format!("重定向 URL 解析失败：{}", e)))?;

            log::debug!("↪️ 跳转到: {}", redact_url_for_log(next_url.as_str()));
            current_url = next_url;
            continue;
        }

        if !response.status().is_success() {
            return Err(RenderError::Network(format!(
                "HTTP {}: {}",
                response.status().as_u16(),
                status_message(response.status().as_u16())
            )));
        }

        if let Some(ct) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            if let Ok(ct_str) = ct.to_str() {
                if !is_image_content_type(ct_str) {
                    return Err(RenderError::InvalidFormat(format!("不是图片类型：{}", ct_str)));
                }
            }
        }

        let total_len = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|cl| cl.to_str().ok())
            .and_then(|cl| cl.parse::<u64>().ok());

        if let Some(size) = total_len {
            ensure_within_limit(size, config.max_file_size, "文件过大")?;
        }

        return read_body(response, total_len, config).await;
    }

    Err(RenderError::Network("下载流程异常结束".to_string()))
}

/// 分块读取响应体：首包与后续分块分别受超时约束，累计体积受上限约束。
async fn read_body(
    mut response: reqwest::Response,
    total_len: Option<u64>,
    config: &RenderConfig,
) -> Result<Vec<u8>, RenderError> {
    let initial_capacity = total_len
        .map(|len| len.min(config.max_file_size).min(usize::MAX as u64) as usize)
        .filter(|len| *len > 0)
        .unwrap_or(BUFFER_INITIAL_CAPACITY);
    let mut buffer = Vec::with_capacity(initial_capacity);
    let mut total: u64 = 0;
    let mut signature_validated = false;
    let mut received_first_chunk = false;

    loop {
        let read_timeout = if received_first_chunk {
            Duration::from_millis(config.stream_chunk_timeout_ms)
        } else {
            Duration::from_millis(config.stream_first_byte_timeout_ms)
        };

        let next_chunk_result = tokio::time::timeout(read_timeout, response.chunk())
            .await
            .map_err(|_| {
                if received_first_chunk {
                    RenderError::Timeout("下载数据流读取超时".to_string())
                } else {
                    RenderError::Timeout("下载首包超时".to_string())
                }
            })?;

        let Some(chunk) = next_chunk_result.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout(format!("下载超时（{}ms）", config.fetch_timeout_ms))
            } else {
                RenderError::Network(format!("下载失败：{}", e))
            }
        })?
        else {
            break;
        };

        received_first_chunk = true;

        total = total.saturating_add(chunk.len() as u64);
        if total > config.max_file_size {
            return Err(RenderError::ResourceLimit("下载后文件超过大小限制".to_string()));
        }
        buffer.extend_from_slice(&chunk);

        if !signature_validated {
            signature_validated = validate_stream_signature_probe(&buffer, STREAM_SIGNATURE_PROBE_BYTES)?;
        }
    }

    log::debug!("✅ 下载完成 - {} bytes", total);
    Ok(buffer)
}

fn build_http_client(
    url: &reqwest::Url,
    pinned: &[SocketAddr],
    config: &RenderConfig,
) -> Result<reqwest::Client, RenderError> {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.fetch_timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(reqwest::redirect::Policy::none());

    // 固定到校验过的地址，防止校验与连接之间 DNS 结果被换掉
    if let Some(host) = url.host_str() {
        if !pinned.is_empty() {
            builder = builder.resolve_to_addrs(host, pinned);
        }
    }

    builder
        .build()
        .map_err(|e| RenderError::Network(format!("无法创建 HTTP 客户端：{}", e)))
}

/// 校验 URL 安全性，返回已解析并确认为公网的地址（允许内网或主机为 IP 字面量时为空）。
///
/// 默认阻止本地/内网目标，防止 SSRF 风险。
async fn validate_url_safety(
    url: &reqwest::Url,
    config: &RenderConfig,
) -> Result<Vec<SocketAddr>, RenderError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(RenderError::InvalidFormat("仅支持 HTTP/HTTPS".to_string()));
    }

    if config.allow_private_network {
        return Ok(Vec::new());
    }

    let host = url
        .host_str()
        .ok_or_else(|| RenderError::InvalidFormat("URL 缺少主机地址".to_string()))?;

    if is_local_hostname(host) {
        return Err(RenderError::InvalidFormat(format!("禁止访问本地网络地址：{}", host)));
    }

    let literal = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = literal.parse::<IpAddr>() {
        if is_private_or_local_ip(ip) {
            return Err(RenderError::InvalidFormat(format!("禁止访问内网 IP：{}", ip)));
        }
        return Ok(Vec::new());
    }

    let port = url
        .port_or_known_default()
        .ok_or_else(|| RenderError::InvalidFormat("URL 缺少端口信息".to_string()))?;

    let addrs = resolve_public_socket_addrs(host, port).await?;
    if addrs.is_empty() {
        return Err(RenderError::InvalidFormat("URL 未解析到有效地址".to_string()));
    }

    Ok(addrs)
}

async fn resolve_public_socket_addrs(host: &str, port: u16) -> Result<Vec<SocketAddr>, RenderError> {
    let addrs = lookup_host((host, port))
        .await
        .map_err(|e| RenderError::Network(format!("URL 主机解析失败：{}", e)))?;

    let mut result = Vec::new();
    for addr in addrs {
        if is_private_or_local_ip(addr.ip()) {
            return Err(RenderError::InvalidFormat(format!(
                "URL 解析结果命中内网地址：{}",
                addr.ip()
            )));
        }
        result.push(addr);
    }

    Ok(result)
}

/// 判断主机名是否指向本地地址。
fn is_local_hostname(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost") || host.eq_ignore_ascii_case("localhost.") || host.ends_with(".local")
}

/// 判断 IP 是否属于本地/内网/链路本地等受限范围。
fn is_private_or_local_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            if v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.is_unspecified()
                || v4.is_multicast()
            {
                return true;
            }

            let octets = v4.octets();
            octets[0] == 0 || (octets[0] == 100 && (octets[1] & 0b1100_0000) == 0b0100_0000)
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_or_local_ip(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_unique_local()
                || v6.is_unicast_link_local()
                || v6.is_multicast()
        }
    }
}

fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|base| {
            let base = base.trim().to_ascii_lowercase();
            base.starts_with("image/") || base == "application/octet-stream"
        })
        .unwrap_or(false)
}

/// 去掉查询串与片段，避免把签名 token 之类写进日志。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}

fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, RenderError> {
    let len = base64_data.trim().len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| RenderError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| RenderError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

/// 解析 Base64 输入（支持 Data URL / 纯 Base64）。
fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, RenderError> {
    let normalized = data.trim();

    let payload = if normalized.starts_with("data:") {
        let base64_start = normalized
            .find(";base64,")
            .ok_or_else(|| RenderError::InvalidFormat("缺少 base64 标记".to_string()))?;
        &normalized[base64_start + 8..]
    } else {
        normalized
    };

    let estimated_len = estimate_base64_decoded_upper_bound_len(payload)?;
    if estimated_len > max_file_size {
        return Err(RenderError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| RenderError::Decode(format!("Base64 解码失败：{}", e)))
}

/// 统一映射 reqwest 错误到业务错误。
pub(crate) fn map_reqwest_error(e: reqwest::Error, url: &str, config: &RenderConfig) -> RenderError {
    let err_msg = e.to_string().replace(url, &redact_url_for_log(url));

    if e.is_timeout() {
        RenderError::Timeout(format!("下载超时（{}ms）", config.fetch_timeout_ms))
    } else if e.is_connect() {
        RenderError::Network(format!("无法连接：{}", err_msg))
    } else {
        RenderError::Network(format!("请求失败：{}", err_msg))
    }
}

/// 常见 HTTP 状态码本地化文案。
fn status_message(code: u16) -> &'static str {
    match code {
        404 => "未找到",
        403 => "访问被拒绝",
        500..=599 => "服务器错误",
        _ => "请求失败",
    }
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
fn validate_image_signature(bytes: &[u8]) -> Result<(), RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes).ok_or_else(|| RenderError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(RenderError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}

/// 流式下载阶段的签名探测：尽早识别并拒绝非图片内容。
///
/// 返回值：
/// - `Ok(true)`：已识别为图片，可视为完成签名校验
/// - `Ok(false)`：当前字节不足以判断，继续下载
/// - `Err(...)`：已识别为非图片，或达到探测上限仍无法识别
fn validate_stream_signature_probe(bytes: &[u8], probe_limit: usize) -> Result<bool, RenderError> {
    if bytes.is_empty() {
        return Ok(false);
    }

    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(RenderError::InvalidFormat(format!(
                "下载内容不是图片类型：{}",
                kind.mime_type()
            )));
        }
        return Ok(true);
    }

    if bytes.len() >= probe_limit {
        return Err(RenderError::InvalidFormat(format!(
            "下载前 {} 字节内无法识别图片类型",
            probe_limit
        )));
    }

    Ok(false)
}
