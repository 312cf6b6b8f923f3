use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::LedgerError;

/// Canonical `YYYY-MM` identifier for a calendar-month bucket.
///
/// Serializes as the string form so bucket maps stay readable JSON objects
/// keyed by `"2025-03"` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(self.year, 1, 1).expect("valid year"))
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        let day = days_in_month(self.year, self.month);
        NaiveDate::from_ymd_opt(self.year, self.month, day).expect("valid month end")
    }

    /// The following calendar month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Every period key whose month overlaps the given window, in order.
    pub fn keys_in(window: DateWindow) -> Vec<PeriodKey> {
        let mut keys = Vec::new();
        let mut current = PeriodKey::from_date(window.start);
        let last = PeriodKey::from_date(window.end);
        while current <= last {
            keys.push(current);
            current = current.next();
        }
        keys
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidInput(format!("invalid period key `{}`", s));
        let (year_part, month_part) = s.split_once('-').ok_or_else(invalid)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        PeriodKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Granularity used to turn a reference date into a concrete date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
    Year,
    YearToDate,
}

impl TimeRange {
    /// Resolves the window containing `reference`, inclusive of both ends.
    ///
    /// Weeks are Sunday-anchored; month, quarter, and year follow calendar
    /// boundaries; year-to-date runs from January 1 through the reference
    /// date itself.
    pub fn window(&self, reference: NaiveDate) -> DateWindow {
        match self {
            TimeRange::Week => {
                let offset = reference.weekday().num_days_from_sunday() as i64;
                let start = reference - Duration::days(offset);
                DateWindow {
                    start,
                    end: start + Duration::days(6),
                }
            }
            TimeRange::Month => {
                let key = PeriodKey::from_date(reference);
                DateWindow {
                    start: key.first_day(),
                    end: key.last_day(),
                }
            }
            TimeRange::Quarter => {
                let quarter_start_month = ((reference.month() - 1) / 3) * 3 + 1;
                let start_key = PeriodKey::new(reference.year(), quarter_start_month)
                    .expect("quarter start month in range");
                let end_key = start_key.next().next();
                DateWindow {
                    start: start_key.first_day(),
                    end: end_key.last_day(),
                }
            }
            TimeRange::Year => DateWindow {
                start: NaiveDate::from_ymd_opt(reference.year(), 1, 1).expect("year start"),
                end: NaiveDate::from_ymd_opt(reference.year(), 12, 31).expect("year end"),
            },
            TimeRange::YearToDate => DateWindow {
                start: NaiveDate::from_ymd_opt(reference.year(), 1, 1).expect("year start"),
                end: reference,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
            TimeRange::Year => "year",
            TimeRange::YearToDate => "ytd",
        }
    }
}

impl FromStr for TimeRange {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            "ytd" | "year-to-date" => Ok(TimeRange::YearToDate),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown time range `{}` (expected week, month, quarter, year, or ytd)",
                other
            ))),
        }
    }
}

/// A concrete calendar interval, inclusive of both boundary dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerError> {
        if end < start {
            return Err(LedgerError::InvalidInput(
                "window end must not precede start".into(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).expect("fallback date"));
    (first_next - Duration::days(1)).day()
}
