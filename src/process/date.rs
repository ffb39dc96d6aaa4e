use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PipelineError, Result};

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})-(\d{2})-(\d{2})").expect("date token pattern should parse"));

/// The day/month/year tokens embedded in a report filename, kept verbatim.
///
/// B3 names the daily file `IBOVDia_DD-MM-YY.csv`. The tokens are not
/// checked against the calendar; a month of `13` passes through unchanged
/// and surfaces as a nonsense partition rather than an error here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDate {
    day: String,
    month: String,
    year: String,
}

impl ReportDate {
    /// Locate the first `DD-MM-YY` token in `file_name`.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let caps = DATE_TOKEN
            .captures(file_name)
            .ok_or_else(|| PipelineError::DateNotFound {
                file_name: file_name.to_string(),
            })?;

        Ok(Self {
            day: caps[1].to_string(),
            month: caps[2].to_string(),
            year: caps[3].to_string(),
        })
    }

    /// ISO `YYYY-MM-DD` form. The century is hardcoded to `20`, so dates
    /// outside 2000-2099 come out wrong; the upstream feed made the same
    /// assumption and no pivot rule exists to improve on it.
    pub fn iso(&self) -> String {
        format!("20{}-{}-{}", self.year, self.month, self.day)
    }
}
