use chrono::Duration;
use regex::Regex;

/// Parses a giveaway duration like `10m`, `2h` or `3d` into a duration.
/// Exactly one `<positive integer><unit>` pair is accepted, with unit one
/// of s/m/h/d/w (case-insensitive). Anything else yields `None`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let re = Regex::new(r"(?i)^(\d+)([smhdw])$").unwrap();
    let caps = re.captures(s.trim())?;

    let value: i64 = caps[1].parse().ok()?;
    if value == 0 {
        return None;
    }

    let multiplier = match caps[2].to_ascii_lowercase().as_str() {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 604_800_000,
        _ => return None,
    };

    value
        .checked_mul(multiplier)
        .map(Duration::milliseconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("45s"), Some(Duration::milliseconds(45_000)));
        assert_eq!(parse_duration("10m"), Some(Duration::milliseconds(600_000)));
        assert_eq!(parse_duration("2h"), Some(Duration::milliseconds(7_200_000)));
        assert_eq!(parse_duration("3d"), Some(Duration::milliseconds(259_200_000)));
        assert_eq!(parse_duration("1w"), Some(Duration::milliseconds(604_800_000)));
    }

    #[test]
    fn unit_is_case_insensitive_and_input_trimmed() {
        assert_eq!(parse_duration("2H"), Some(Duration::milliseconds(7_200_000)));
        assert_eq!(parse_duration(" 10m "), Some(Duration::milliseconds(600_000)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("m"), None);
        assert_eq!(parse_duration("10x"), None);
        assert_eq!(parse_duration("-5m"), None);
        assert_eq!(parse_duration("10m30s"), None);
        assert_eq!(parse_duration("ten minutes"), None);
    }

    #[test]
    fn rejects_zero_and_overflow() {
        assert_eq!(parse_duration("0m"), None);
        assert_eq!(parse_duration("0s"), None);
        assert_eq!(parse_duration("99999999999999999999s"), None);
        assert_eq!(parse_duration("9223372036854775807w"), None);
    }
}
