use chrono::NaiveDate;

const ELLIPSIS: &str = "...";

/// Shorten `s` to at most `max_len` characters, ending in "..." when cut.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let Some((cut, _)) = s.char_indices().nth(max_len) else {
        return s.to_string();
    };
    if max_len <= ELLIPSIS.len() {
        return s[..cut].to_string();
    }
    let keep = s
        .char_indices()
        .nth(max_len - ELLIPSIS.len())
        .map_or(cut, |(i, _)| i);
    format!("{}{}", &s[..keep], ELLIPSIS)
}

/// Format an ISO release date as e.g. "July 16, 2008".
/// Empty dates are "Unknown"; unparseable ones are returned as given.
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return "Unknown".to_string();
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// "1 favorite", "3 favorites"
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
