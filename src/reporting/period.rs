use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A year-month token in `YYYY-MM` form, the granularity reports are filed
/// at. Stored as the validated token so serialization matches the wire
/// format exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ReportPeriod(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("report period must use the YYYY-MM format")]
pub struct ParsePeriodError;

impl ReportPeriod {
    /// The period containing today's date.
    pub fn current() -> Self {
        let now = Utc::now();
        Self(format!("{:04}-{:02}", now.year(), now.month()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ReportPeriod {
    type Err = ParsePeriodError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded months, so the shape check keeps the token
        // aligned with the wire format before the month range is validated.
        if token.len() != 7 || token.as_bytes()[4] != b'-' {
            return Err(ParsePeriodError);
        }
        // chrono has no year-month parser; anchoring to the first of the
        // month validates both components.
        let anchored = format!("{token}-01");
        NaiveDate::parse_from_str(&anchored, "%Y-%m-%d").map_err(|_| ParsePeriodError)?;
        Ok(Self(token.to_string()))
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
