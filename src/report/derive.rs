use crate::report::Report;

/// Value to auto-fill into `present`, if the rule applies.
///
/// Applies only while `present` is exactly empty (any typed text, whitespace
/// included, counts as a value), both inputs are non-empty and both
/// parse, and `total - absent` is non-negative.
pub fn derive_present(report: &Report) -> Option<String> {
    if !report.present.is_empty() || report.total.is_empty() || report.absent.is_empty() {
        return None;
    }

    let total = parse_leading_int(&report.total)?;
    let absent = parse_leading_int(&report.absent)?;

    total
        .checked_sub(absent)
        .filter(|present| *present >= 0)
        .map(|present| present.to_string())
}

pub fn apply_derivation(report: Report) -> Report {
    match derive_present(&report) {
        Some(present) => Report { present, ..report },
        None => report,
    }
}

/// Integer prefix of `raw`: leading whitespace, an optional sign, then at
/// least one decimal digit. Trailing text is ignored ("30 pupils" is 30).
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = rest[..digits_len].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
