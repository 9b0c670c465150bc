//! Leaderboard windows and their cutoff timestamps.
//!
//! Calendar-based windows (today, yesterday, month) start at local midnight
//! in the configured offset; the week window is a rolling seven days.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductWindow {
    #[default]
    Today,
    Yesterday,
    Week,
    Month,
}

impl ProductWindow {
    /// Home page order.
    pub const ALL: [ProductWindow; 4] = [Self::Today, Self::Yesterday, Self::Week, Self::Month];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Today => "Today's Top Products",
            Self::Yesterday => "Yesterday's Top Products",
            Self::Week => "This Week's Top Products",
            Self::Month => "This Month's Top Products",
        }
    }

    /// Unknown names fall back to `Today`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Earliest `created_at` a product may have to appear in this window.
    pub fn cutoff(self, now: DateTime<FixedOffset>) -> DateTime<Utc> {
        let offset = *now.offset();
        let today = now.date_naive();
        match self {
            Self::Today => local_midnight(today, offset),
            Self::Yesterday => local_midnight(today.pred_opt().unwrap_or(today), offset),
            Self::Week => now.with_timezone(&Utc) - Duration::days(7),
            Self::Month => local_midnight(
                today.checked_sub_months(Months::new(1)).unwrap_or(today),
                offset,
            ),
        }
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

impl FromStr for ProductWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.slug() == s)
            .ok_or_else(|| format!("unknown window '{s}'"))
    }
}

impl fmt::Display for ProductWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
