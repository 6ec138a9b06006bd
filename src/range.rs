use std::fmt::Display;

use chrono::{Days, Local, NaiveDate};

use crate::error::{ContribError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the window used when `--from` is not given.
pub const DEFAULT_WINDOW_DAYS: u64 = 5;

/// Inclusive `from..=to` span of calendar days, always `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(ContribError::InvalidRange { from, to });
        }
        Ok(DateRange { from, to })
    }

    /// Builds the range from optional `YYYY-MM-DD` flags. Missing bounds
    /// default to `today` and `today - 5 days`.
    pub fn resolve(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<Self> {
        let from = match from {
            Some(value) => parse_date("from", value)?,
            None => today
                .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
                .unwrap_or(NaiveDate::MIN),
        };
        let to = match to {
            Some(value) => parse_date("to", value)?,
            None => today,
        };
        Self::new(from, to)
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

// chrono accepts "2024-1-2" for %m/%d, only the zero padded form is allowed here
fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let invalid = || ContribError::InvalidDateFormat {
        field,
        value: value.to_string(),
    };
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    if date.format(DATE_FORMAT).to_string() != value {
        return Err(invalid());
    }
    Ok(date)
}
