use crate::storage::records::{Counters, Session};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline audience numbers for the dashboard.
///
/// `total_views` and `unique_users` come straight from the persisted
/// counters; the new/returning split is derived from the session records
/// relative to the report time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    pub total_views: u64,
    pub unique_users: u64,
    pub new_users: u64,
    pub returning_users: u64,
}

/// Classify each IP active in the last 24 hours as new or returning.
///
/// Sessions are grouped by IP. An IP with activity in the window counts as
/// new when its earliest session also started inside the window, and as
/// returning when it was seen before the window or more than once. IPs with
/// no recent activity count as neither.
pub fn compute_view_stats(sessions: &[Session], counters: &Counters, now: DateTime<Utc>) -> ViewStats {
    let cutoff = now - Duration::hours(24);

    let mut visits_by_ip: BTreeMap<&str, Visits> = BTreeMap::new();
    for session in sessions {
        let entry = visits_by_ip
            .entry(session.ip.as_str())
            .or_insert_with(|| Visits {
                first_visit: session.start_time,
                all: Vec::new(),
            });
        entry.all.push(session.start_time);
        if session.start_time < entry.first_visit {
            entry.first_visit = session.start_time;
        }
    }

    let mut new_users = 0;
    let mut returning_users = 0;
    for visits in visits_by_ip.values() {
        let recent = visits.all.iter().filter(|t| **t > cutoff).count();
        if recent == 0 {
            continue;
        }
        if visits.first_visit > cutoff {
            new_users += 1;
        } else if recent > 1 || visits.all.len() > 1 {
            returning_users += 1;
        }
    }

    ViewStats {
        total_views: counters.page_views,
        unique_users: counters.unique_visitors.len() as u64,
        new_users,
        returning_users,
    }
}

struct Visits {
    first_visit: DateTime<Utc>,
    all: Vec<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::{GeoInfo, SessionInfo, TrafficSource};

    fn make_session(ip: &str, start: DateTime<Utc>) -> Session {
        Session {
            session_id: format!("s-{ip}-{}", start.timestamp()),
            ip: ip.to_string(),
            user_agent: String::new(),
            page_type: "index".to_string(),
            location: GeoInfo::default(),
            start_time: start,
            last_update: start,
            total_time_on_page: 0,
            session_info: SessionInfo {
                last_active: start,
                tab_focused: true,
                browser_info: None,
            },
            traffic_source: TrafficSource::default(),
            events: Vec::new(),
            clicks: Vec::new(),
        }
    }

    #[test]
    fn test_empty_input_yields_zeroes() {
        let stats = compute_view_stats(&[], &Counters::default(), Utc::now());
        assert_eq!(stats, ViewStats::default());
    }

    #[test]
    fn test_totals_come_from_counters() {
        let mut counters = Counters::default();
        counters.record_page_view("1.1.1.1");
        counters.record_page_view("1.1.1.1");
        counters.record_page_view("2.2.2.2");

        let stats = compute_view_stats(&[], &counters, Utc::now());
        assert_eq!(stats.total_views, 3);
        assert_eq!(stats.unique_users, 2);
    }

    #[test]
    fn test_recent_first_timer_is_new() {
        let now = Utc::now();
        let sessions = vec![make_session("1.1.1.1", now - Duration::hours(1))];

        let stats = compute_view_stats(&sessions, &Counters::default(), now);
        assert_eq!(stats.new_users, 1);
        assert_eq!(stats.returning_users, 0);
    }

    #[test]
    fn test_old_visitor_back_again_is_returning() {
        let now = Utc::now();
        let sessions = vec![
            make_session("1.1.1.1", now - Duration::days(3)),
            make_session("1.1.1.1", now - Duration::hours(1)),
        ];

        let stats = compute_view_stats(&sessions, &Counters::default(), now);
        assert_eq!(stats.new_users, 0);
        assert_eq!(stats.returning_users, 1);
    }

    #[test]
    fn test_stale_visitor_counts_as_neither() {
        let now = Utc::now();
        let sessions = vec![make_session("1.1.1.1", now - Duration::hours(25))];

        let stats = compute_view_stats(&sessions, &Counters::default(), now);
        assert_eq!(stats.new_users, 0);
        assert_eq!(stats.returning_users, 0);
    }

    #[test]
    fn test_multiple_recent_visits_inside_window_still_new() {
        let now = Utc::now();
        // First contact was inside the window, so the repeat does not make
        // the visitor returning.
        let sessions = vec![
            make_session("1.1.1.1", now - Duration::hours(20)),
            make_session("1.1.1.1", now - Duration::hours(1)),
        ];

        let stats = compute_view_stats(&sessions, &Counters::default(), now);
        assert_eq!(stats.new_users, 1);
        assert_eq!(stats.returning_users, 0);
    }

    #[test]
    fn test_mixed_population() {
        let now = Utc::now();
        let sessions = vec![
            make_session("1.1.1.1", now - Duration::hours(2)),
            make_session("2.2.2.2", now - Duration::days(5)),
            make_session("2.2.2.2", now - Duration::minutes(30)),
            make_session("3.3.3.3", now - Duration::days(2)),
        ];

        let stats = compute_view_stats(&sessions, &Counters::default(), now);
        assert_eq!(stats.new_users, 1);
        assert_eq!(stats.returning_users, 1);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(ViewStats::default()).unwrap();
        assert!(json.get("totalViews").is_some());
        assert!(json.get("uniqueUsers").is_some());
        assert!(json.get("newUsers").is_some());
        assert!(json.get("returningUsers").is_some());
    }
}
