use chrono::NaiveDate;

use super::NluRecognizer;
use crate::models::{BookingRequest, EntityValue, Intent, RecognizerResult, Timex};
use crate::services::recognizers::recognize_date;

pub async fn execute_query(
    recognizer: &dyn NluRecognizer,
    utterance: &str,
    today: NaiveDate,
) -> (Option<Intent>, Option<BookingRequest>) {
    match recognizer.recognize(utterance).await {
        Ok(result) => extract_booking(&result, today),
        Err(e) => {
            tracing::warn!(error = %e, "NLU recognition failed, continuing without entities");
            (None, None)
        }
    }
}

pub fn extract_booking(
    result: &RecognizerResult,
    today: NaiveDate,
) -> (Option<Intent>, Option<BookingRequest>) {
    let Some((label, score)) = result.top_intent() else {
        return (None, None);
    };
    let intent = Intent::from_label(label);
    tracing::debug!(intent = ?intent, score, "top intent");

    if intent != Intent::BookFlight {
        return (Some(intent), None);
    }

    let candidate_dates = candidate_dates(result);

    let request = BookingRequest {
        destination: first_text(result, "dst_city").map(capitalize),
        origin: first_text(result, "or_city").map(capitalize),
        start_date: labelled_date(result, "str_date", today)
            .or_else(|| candidate_dates.iter().min().copied()),
        end_date: labelled_date(result, "end_date", today)
            .or_else(|| candidate_dates.iter().max().copied()),
        budget: result.entity("budget").first().and_then(|v| match v {
            EntityValue::Number(n) => Some(format_number(*n)),
            other => other.as_text().map(|s| s.trim().to_string()),
        }),
        candidate_cities: dedup(
            result
                .entity("geographyV2")
                .iter()
                .filter_map(EntityValue::as_text)
                .map(capitalize),
        ),
        candidate_numbers: dedup(result.entity("number").iter().filter_map(|v| match v {
            EntityValue::Number(n) => Some(format_number(*n)),
            _ => None,
        })),
    };

    (Some(intent), Some(request))
}

fn first_text<'a>(result: &'a RecognizerResult, entity: &str) -> Option<&'a str> {
    result
        .entity(entity)
        .first()
        .and_then(EntityValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn labelled_date(result: &RecognizerResult, entity: &str, today: NaiveDate) -> Option<Timex> {
    match result.entity(entity).first()? {
        EntityValue::Dated(dated) => dated.values.iter().find_map(|v| v.timex.parse().ok()),
        other => recognize_date(other.as_text()?, today),
    }
}

fn candidate_dates(result: &RecognizerResult) -> Vec<Timex> {
    result
        .entity("datetimeV2")
        .iter()
        .filter_map(|v| match v {
            EntityValue::Dated(dated) => Some(dated),
            _ => None,
        })
        .flat_map(|dated| dated.values.iter())
        .flat_map(|v| timex_candidates(&v.timex))
        .collect()
}

/// Date ranges arrive as `(start,end,duration)`; both ends are candidates.
fn timex_candidates(timex: &str) -> Vec<Timex> {
    let inner = timex
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'));
    match inner {
        Some(range) => range.split(',').filter_map(|part| part.parse().ok()).collect(),
        None => timex.parse().ok().into_iter().collect(),
    }
}

fn capitalize(city: &str) -> String {
    city.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

fn dedup(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
