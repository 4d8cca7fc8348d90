//! 目标 URL 校验
//!
//! 只接受带主机名的 http/https 地址

use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    Empty,
    DangerousScheme(String),
    UnsupportedScheme(String),
    Malformed(String),
    MissingHost,
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Please enter a URL to shorten"),
            Self::DangerousScheme(scheme) => write!(f, "URL scheme '{}' is not allowed", scheme),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "Unsupported scheme '{}'. Please enter a valid URL including http:// or https://",
                scheme
            ),
            Self::Malformed(msg) => write!(f, "Invalid URL: {}", msg),
            Self::MissingHost => write!(f, "URL must include a host name"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

const DANGEROUS_SCHEMES: &[&str] = &["javascript", "data", "file", "vbscript", "about", "blob"];

pub fn validate_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    // 先按前缀判断危险协议，避免 Url::parse 对它们的宽松解析
    let lower = raw.to_ascii_lowercase();
    if let Some(scheme) = DANGEROUS_SCHEMES
        .iter()
        .find(|s| lower.starts_with(&format!("{}:", s)))
    {
        return Err(UrlValidationError::DangerousScheme((*scheme).to_string()));
    }

    let parsed = Url::parse(raw).map_err(|e| UrlValidationError::Malformed(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    if parsed.host_str().is_none_or(|h| h.is_empty()) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(parsed)
}
