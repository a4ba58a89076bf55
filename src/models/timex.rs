use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A partial calendar date: `2023`, `2023-01`, `2023-01-15` or `XXXX-01-15`.
///
/// Only a full year-month-day that names a real calendar day is definite.
/// Ordering compares year, then month, then day, with unknown parts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timex {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date expression: {0}")]
pub struct TimexParseError(String);

impl Timex {
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            month: None,
            day: None,
        }
    }

    pub fn year_month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: None,
        }
    }

    pub fn month_day(month: u32, day: u32) -> Self {
        Self {
            year: None,
            month: Some(month),
            day: Some(day),
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: Some(date.year()),
            month: Some(date.month()),
            day: Some(date.day()),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match (self.year, self.month, self.day) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        }
    }

    pub fn is_definite(&self) -> bool {
        self.as_date().is_some()
    }

    pub fn known_parts(&self) -> usize {
        [self.year.is_some(), self.month.is_some(), self.day.is_some()]
            .into_iter()
            .filter(|known| *known)
            .count()
    }
}

impl FromStr for Timex {
    type Err = TimexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimexParseError(s.to_string());

        // Time-of-day suffixes ("2023-01-15T10") are dropped.
        let date_part = s.trim().split('T').next().unwrap_or_default();
        let mut parts = date_part.split('-');

        let year = match parts.next() {
            Some("XXXX") => None,
            Some(y) if y.len() == 4 => Some(y.parse::<i32>().map_err(|_| err())?),
            _ => return Err(err()),
        };

        let mut component = |max: u32| -> Result<Option<u32>, TimexParseError> {
            match parts.next() {
                None => Ok(None),
                Some(p) if p.len() == 2 => match p.parse::<u32>() {
                    Ok(v) if (1..=max).contains(&v) => Ok(Some(v)),
                    _ => Err(err()),
                },
                Some(_) => Err(err()),
            }
        };
        let month = component(12)?;
        let day = component(31)?;

        if parts.next().is_some() || (year.is_none() && month.is_none()) {
            return Err(err());
        }
        if day.is_some() && month.is_none() {
            return Err(err());
        }

        Ok(Self { year, month, day })
    }
}

impl TryFrom<String> for Timex {
    type Error = TimexParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timex> for String {
    fn from(value: Timex) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Timex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(y) => write!(f, "{y:04}")?,
            None => f.write_str("XXXX")?,
        }
        if let Some(m) = self.month {
            write!(f, "-{m:02}")?;
        }
        if let Some(d) = self.day {
            write!(f, "-{d:02}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_granularities() {
        assert_eq!("2023".parse::<Timex>().unwrap(), Timex::year(2023));
        assert_eq!("2023-01".parse::<Timex>().unwrap(), Timex::year_month(2023, 1));
        assert_eq!("XXXX-01-15".parse::<Timex>().unwrap(), Timex::month_day(1, 15));
        assert!("2023-01-15".parse::<Timex>().unwrap().is_definite());
    }

    #[test]
    fn test_time_suffix_dropped() {
        let t: Timex = "2023-01-15T10".parse().unwrap();
        assert_eq!(t.to_string(), "2023-01-15");
    }

    #[test]
    fn test_ambiguous_dates_are_not_definite() {
        assert!(!Timex::year(2023).is_definite());
        assert!(!Timex::year_month(2023, 1).is_definite());
        assert!(!Timex::month_day(1, 15).is_definite());
        // February 30th never exists
        assert!(!"2023-02-30".parse::<Timex>().unwrap().is_definite());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("tomorrow".parse::<Timex>().is_err());
        assert!("2023-13".parse::<Timex>().is_err());
        assert!("2023-1-5".parse::<Timex>().is_err());
        assert!("XXXX".parse::<Timex>().is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a: Timex = "2022-12-31".parse().unwrap();
        let b: Timex = "2023-01-01".parse().unwrap();
        let c: Timex = "2023-02-01".parse().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_serde_as_string() {
        let t: Timex = "2023-01-15".parse().unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"2023-01-15\"");
        let back: Timex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
