use chrono::{DateTime, Duration, Utc};

/// 解析过期时间
///
/// 支持 RFC3339（`2030-01-01T00:00:00Z`）和相对时长（`30m`、`1d`、`2w`、`1d12h`）。
/// 月按 30 天、年按 365 天计。
pub fn parse_expire_time(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Expiration time is empty".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let total = parse_relative_duration(input)?;
    Utc::now()
        .checked_add_signed(total)
        .ok_or_else(|| format!("Expiration time '{}' is out of range", input))
}

fn parse_relative_duration(input: &str) -> Result<Duration, String> {
    let mut total = Duration::zero();
    let mut rest = input;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(format!("Invalid time format: '{}'", input));
        }
        let amount: i64 = rest[..digits_end]
            .parse()
            .map_err(|_| format!("Invalid number in '{}'", input))?;
        rest = &rest[digits_end..];

        let unit_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if unit_end == 0 {
            return Err(format!("Missing unit after '{}'", amount));
        }
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let step = match unit.to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Duration::try_seconds(amount),
            "m" | "min" | "minute" | "minutes" => Duration::try_minutes(amount),
            "h" | "hour" | "hours" => Duration::try_hours(amount),
            "d" | "day" | "days" => Duration::try_days(amount),
            "w" | "week" | "weeks" => Duration::try_weeks(amount),
            "mo" | "month" | "months" => amount.checked_mul(30).and_then(Duration::try_days),
            "y" | "year" | "years" => amount.checked_mul(365).and_then(Duration::try_days),
            _ => return Err(format!("Unsupported time unit: '{}'", unit)),
        }
        .ok_or_else(|| format!("Duration '{}' is too large", input))?;

        total = total
            .checked_add(&step)
            .ok_or_else(|| format!("Duration '{}' is too large", input))?;
    }

    if total.is_zero() {
        return Err("Duration must be greater than zero".to_string());
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_units() {
        let now = Utc::now();

        assert_eq!((parse_expire_time("1d").unwrap() - now).num_days(), 1);
        assert_eq!((parse_expire_time("2w").unwrap() - now).num_days(), 14);
        assert_eq!((parse_expire_time("1mo").unwrap() - now).num_days(), 30);

        let combined = (parse_expire_time("1d2h30m").unwrap() - now).num_seconds();
        assert!((combined - (24 * 3600 + 2 * 3600 + 30 * 60)).abs() < 5);
    }

    #[test]
    fn test_rfc3339() {
        let dt = parse_expire_time("2030-01-01T00:00:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_expire_time("").is_err());
        assert!(parse_expire_time("soon").is_err());
        assert!(parse_expire_time("5x").is_err());
        assert!(parse_expire_time("10").is_err());
        assert!(parse_expire_time("0d").is_err());
    }
}
