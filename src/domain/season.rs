//! Season rules
//!
//! An NBA season rolls over on October 1st. A date in October or later belongs
//! to the season starting that year, anything earlier to the season that
//! started the previous year.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Month in which a new season starts
const ROLLOVER_MONTH: u32 = 10;

/// Start year of the season a date falls in
pub fn season_year(date: NaiveDate) -> i32 {
    if date.month() >= ROLLOVER_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Season label such as `2024-25` for a date
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use courtsync::domain::season::season_label;
///
/// let date = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
/// assert_eq!(season_label(date), "2024-25");
/// ```
pub fn season_label(date: NaiveDate) -> String {
    label_for_year(season_year(date))
}

/// Season label for a game start timestamp, using its UTC date
pub fn season_label_at(start: DateTime<Utc>) -> String {
    season_label(start.date_naive())
}

/// Season label for a season start year
pub fn label_for_year(year: i32) -> String {
    format!("{}-{:02}", year, (year + 1).rem_euclid(100))
}

/// Half-open date range `[year-10-01, year+1-10-01)` covering one season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub season_year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeasonWindow {
    pub fn for_year(season_year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(season_year, ROLLOVER_MONTH, 1)?;
        let end = NaiveDate::from_ymd_opt(season_year + 1, ROLLOVER_MONTH, 1)?;
        Some(Self {
            season_year,
            start,
            end,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn label(&self) -> String {
        label_for_year(self.season_year)
    }
}
