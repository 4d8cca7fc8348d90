pub mod password;
pub mod time_parser;
pub mod url_validator;

/// 短码字符集（62 个字母数字）
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// 自定义短码最大长度
pub const MAX_SHORT_CODE_LENGTH: usize = 64;

/// 与路由冲突的保留短码
const RESERVED_SHORT_CODES: &[&str] = &[
    "api",
    "health",
    "login",
    "register",
    "dashboard",
    "r",
    "favicon.ico",
];

pub fn generate_random_code(length: usize) -> String {
    std::iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// 短码只允许字母、数字、下划线和连字符
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

pub fn is_reserved_short_code(code: &str) -> bool {
    RESERVED_SHORT_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}

/// 截断过长的 URL 用于展示
///
/// 能解析时保留域名并截断路径，否则直接截断。
pub fn format_url_for_display(url: &str, max_length: usize) -> String {
    if url.chars().count() <= max_length {
        return url.to_string();
    }

    let truncate = |s: &str, n: usize| s.chars().take(n).collect::<String>();

    match url::Url::parse(url) {
        Ok(parsed) => {
            let domain = parsed.host_str().unwrap_or_default();
            let path = parsed.path();
            let domain_len = domain.chars().count();

            if domain_len + 10 >= max_length {
                return format!("{}...", truncate(domain, max_length.saturating_sub(3)));
            }

            let available = max_length.saturating_sub(domain_len + 6);
            format!("{}{}...", domain, truncate(path, available))
        }
        Err(_) => format!("{}...", truncate(url, max_length.saturating_sub(3))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code_length_and_alphabet() {
        for _ in 0..100 {
            let code = generate_random_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
        assert_eq!(generate_random_code(12).len(), 12);
        assert!(generate_random_code(0).is_empty());
    }

    #[test]
    fn test_is_valid_short_code() {
        assert!(is_valid_short_code("abc123"));
        assert!(is_valid_short_code("my-link_2"));
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("has space"));
        assert!(!is_valid_short_code("slash/code"));
        assert!(!is_valid_short_code("dot.code"));
        assert!(!is_valid_short_code(&"a".repeat(MAX_SHORT_CODE_LENGTH + 1)));
    }

    #[test]
    fn test_is_reserved_short_code() {
        assert!(is_reserved_short_code("api"));
        assert!(is_reserved_short_code("Dashboard"));
        assert!(is_reserved_short_code("r"));
        assert!(!is_reserved_short_code("rr"));
        assert!(!is_reserved_short_code("abc123"));
    }

    #[test]
    fn test_format_url_for_display_short_url_unchanged() {
        assert_eq!(
            format_url_for_display("https://example.com/a", 50),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_format_url_for_display_truncates_path() {
        let url = format!("https://example.com/{}", "x".repeat(100));
        let shown = format_url_for_display(&url, 30);
        assert!(shown.starts_with("example.com/"));
        assert!(shown.ends_with("..."));
        // domain(11) + path(30 - 11 - 6 = 13) + "..."
        assert_eq!(shown.chars().count(), 11 + 13 + 3);
    }

    #[test]
    fn test_format_url_for_display_long_domain() {
        let url = format!("https://{}.com/path", "d".repeat(40));
        let shown = format_url_for_display(&url, 20);
        assert_eq!(shown.chars().count(), 20);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_format_url_for_display_unparseable() {
        let raw = "n".repeat(60);
        let shown = format_url_for_display(&raw, 20);
        assert_eq!(shown, format!("{}...", "n".repeat(17)));
    }
}
