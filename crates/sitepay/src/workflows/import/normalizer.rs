use chrono::NaiveDate;

pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    collapsed.replace('-', "_").to_lowercase()
}

/// Accepts `150,000`, `150000원` and `₩150,000`.
pub(crate) fn parse_amount(value: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .trim_start_matches('₩')
        .trim_end_matches('원')
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

pub(crate) fn parse_hours(value: &str) -> Option<f32> {
    let trimmed = value.trim().trim_end_matches("시간").trim_end_matches('h').trim();
    let hours: f32 = trimmed.parse().ok()?;
    (hours.is_finite() && hours >= 0.0).then_some(hours)
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_header(value)
}
