use crate::storage::records::Session;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session volume over the trailing day and week, plus the mean dwell time
/// across the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub last_24h: u64,
    pub last_7d: u64,
    /// Whole seconds, rounded; 0 when there are no sessions.
    pub average_time_on_page: i64,
}

pub fn compute_trends(sessions: &[Session], now: DateTime<Utc>) -> Trends {
    let day_ago = now - Duration::hours(24);
    let week_ago = now - Duration::days(7);

    let last_24h = sessions.iter().filter(|s| s.start_time > day_ago).count() as u64;
    let last_7d = sessions.iter().filter(|s| s.start_time > week_ago).count() as u64;

    let total: i64 = sessions.iter().map(|s| s.total_time_on_page).sum();
    let count = i64::try_from(sessions.len()).unwrap_or(0);
    let average_time_on_page = if count > 0 { (total + count / 2) / count } else { 0 };

    Trends {
        last_24h,
        last_7d,
        average_time_on_page,
    }
}
