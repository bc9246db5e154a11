use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// "January 20 2009", "Jan 20 2009", "20 January 2009" once punctuation is gone.
const TEXT_FORMATS: &[&str] = &["%B %d %Y", "%b %d %Y", "%d %B %Y", "%d %b %Y"];
// Two-digit years first: chrono happily reads "09" as the year 9 under %Y.
const NUMERIC_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"];

static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("ordinal regex"));

static MONTH_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(st|nd|rd|th)?,?\s+\d{4}\b",
    )
    .expect("month-first regex")
});

static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d{1,2}(st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?,?\s+\d{4}\b",
    )
    .expect("day-first regex")
});

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b").expect("numeric regex")
});

/// Parse a free-form table header into a calendar date.
///
/// The whole header is tried first; failing that, the first date-looking
/// substring is used, so "Denied on Tuesday, January 20th, 2009" parses.
pub fn parse_header_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.replace('\u{a0}', " ");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    parse_exact(s).or_else(|| {
        [&*MONTH_FIRST, &*DAY_FIRST, &*NUMERIC]
            .iter()
            .find_map(|re| re.find(s).and_then(|m| parse_exact(m.as_str())))
    })
}

fn parse_exact(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(d) = NUMERIC_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(d);
    }

    let cleaned = clean_text_date(s);
    TEXT_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&cleaned, f).ok())
}

/// Strip ordinals, commas and abbreviation dots; fold "Sept" to "Sep".
fn clean_text_date(s: &str) -> String {
    let s = ORDINAL.replace_all(s, "$1");
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let w = w.trim_end_matches('.');
            if w.eq_ignore_ascii_case("sept") {
                "Sep"
            } else {
                w
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
