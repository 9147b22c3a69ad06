//! # 内容构建
//!
//! 把结构化输入（网址、邮件、名片）拼成二维码载荷字符串。
//! 空输入返回空串，交给参数校验统一报 `value` 缺失。

use serde::{Deserialize, Serialize};

/// 结构化内容输入，JSON 中以 `type` 字段区分。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentInput {
    Raw {
        #[serde(default)]
        value: String,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    Url {
        #[serde(default)]
        url: String,
    },
    Email {
        #[serde(default)]
        email: String,
        #[serde(default)]
        subject: Option<String>,
        #[serde(default)]
        body: Option<String>,
    },
    Contact(ContactCard),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactCard {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub organization: String,
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// 生成二维码载荷。
pub fn build_content(input: &ContentInput) -> String {
    match input {
        ContentInput::Raw { value } => value.trim().to_string(),
        ContentInput::Text { text } => text.trim().to_string(),
        ContentInput::Url { url } => {
            let url = url.trim();
            if url.is_empty() {
                String::new()
            } else if has_http_scheme(url) {
                url.to_string()
            } else {
                format!("https://{}", url)
            }
        }
        ContentInput::Email {
            email,
            subject,
            body,
        } => {
            let email = email.trim();
            if email.is_empty() {
                return String::new();
            }

            let mut query = url::form_urlencoded::Serializer::new(String::new());
            let mut has_query = false;
            for (key, value) in [("subject", trimmed(subject)), ("body", trimmed(body))] {
                if let Some(value) = value {
                    query.append_pair(key, value);
                    has_query = true;
                }
            }

            if has_query {
                format!("mailto:{}?{}", email, query.finish())
            } else {
                format!("mailto:{}", email)
            }
        }
        ContentInput::Contact(card) => build_vcard(card),
    }
}

/// vCard 3.0，行间以 CRLF 分隔。
fn build_vcard(card: &ContactCard) -> String {
    let first = card.first_name.trim();
    let last = card.last_name.trim();
    let full_name = [first, last]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};{};;;", last, first),
        format!("FN:{}", full_name),
    ];

    let optional = [
        ("ORG", card.organization.trim()),
        ("TEL;TYPE=CELL", card.phone.trim()),
        ("EMAIL", card.email.trim()),
    ];
    for (key, value) in optional {
        if !value.is_empty() {
            lines.push(format!("{}:{}", key, value));
        }
    }

    lines.push("END:VCARD".to_string());
    lines.join("\r\n")
}
