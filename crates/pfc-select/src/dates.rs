use chrono::NaiveDate;
use pfc_core::*;
use pfc_records::Rule;

/// Formats accepted by the permissive date parser, tried in order.
const DATE_FORMATS: [&str; 10] = [
    "%Y.%m.%d", "%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y", "%d/%m/%Y", "%d %b %Y",
    "%d %B %Y", "%b %d %Y", "%B %d %Y",
];

/// Parse a date permissively and serialise it as `YYYY.MM.DD`, the form
/// the game date index holds.
pub fn normalise_date(text: &str) -> Outcome<String> {
    let trimmed = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.format("%Y.%m.%d").to_string());
        }
    }
    refused(format!("cannot interpret '{trimmed}' as a date"))
}

/// Normalise both rule dates in place; both present or both absent.
pub fn normalise_rule_dates(rule: &mut Rule) -> Outcome<()> {
    if rule.from_date.is_some() != rule.to_date.is_some() {
        return refused("rule dates must both be present or both be absent");
    }
    if let Some(from) = rule.from_date.as_deref() {
        rule.from_date = Some(normalise_date(from)?);
    }
    if let Some(to) = rule.to_date.as_deref() {
        rule.to_date = Some(normalise_date(to)?);
    }
    Ok(())
}
