use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Timex;

const MONTHS: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static ISO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})(?:-(\d{1,2}))?(?:T|\b)").unwrap());

static SLASH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").unwrap());

static DAY_FIRST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{MONTHS}\b\.?(?:,?\s+(\d{{4}}))?"
    ))
    .unwrap()
});

static MONTH_FIRST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTHS}\b\.?(?:\s+(\d{{1,2}})(?:st|nd|rd|th)?\b)?(?:,?\s+(\d{{4}})\b)?"
    ))
    .unwrap()
});

static RELATIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(today|tomorrow|day after tomorrow)\b").unwrap());

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

pub fn recognize_date(text: &str, today: NaiveDate) -> Option<Timex> {
    let mut best: Option<Timex> = None;
    for candidate in candidates(text, today).into_iter().flatten() {
        if best.map_or(true, |b| candidate.known_parts() > b.known_parts()) {
            best = Some(candidate);
        }
    }
    best
}

// Every expression found in `text`, in pattern order. A bare year only counts
// when nothing more specific matched, even if that match was not a real day.
fn candidates(text: &str, today: NaiveDate) -> Vec<Option<Timex>> {
    let mut found = Vec::new();

    for caps in ISO_PATTERN.captures_iter(text) {
        found.push(build(
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
            caps.get(3).and_then(|m| m.as_str().parse().ok()),
        ));
    }

    for caps in SLASH_PATTERN.captures_iter(text) {
        let year = caps.get(3).and_then(|m| {
            let y: i32 = m.as_str().parse().ok()?;
            Some(if m.as_str().len() == 2 { 2000 + y } else { y })
        });
        found.push(build(
            year,
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        ));
    }

    for caps in DAY_FIRST_PATTERN.captures_iter(text) {
        found.push(build(
            caps.get(3).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| month_number(m.as_str())),
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
        ));
    }

    for caps in MONTH_FIRST_PATTERN.captures_iter(text) {
        let (day, year) = (caps.get(2), caps.get(3));
        // "may" on its own is the verb.
        if day.is_none() && year.is_none() && caps[1].eq_ignore_ascii_case("may") {
            continue;
        }
        found.push(build(
            year.and_then(|m| m.as_str().parse().ok()),
            month_number(&caps[1]),
            day.and_then(|m| m.as_str().parse().ok()),
        ));
    }

    for caps in RELATIVE_PATTERN.captures_iter(text) {
        let offset = match caps[1].to_lowercase().as_str() {
            "today" => 0,
            "tomorrow" => 1,
            _ => 2,
        };
        found.push(today.checked_add_days(Days::new(offset)).map(Timex::from_date));
    }

    if found.is_empty() {
        found.extend(
            YEAR_PATTERN
                .captures_iter(text)
                .map(|caps| caps[1].parse().ok().map(Timex::year)),
        );
    }

    found
}

fn build(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Option<Timex> {
    let mut expr = match year {
        Some(y) => format!("{y:04}"),
        None => "XXXX".to_string(),
    };
    if let Some(m) = month {
        expr.push_str(&format!("-{m:02}"));
    }
    if let Some(d) = day {
        expr.push_str(&format!("-{d:02}"));
    }
    expr.parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let n = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}
