use crate::storage::records::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribution frequency tables: how often each source, medium, and
/// campaign appears across the session collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficStats {
    pub sources: BTreeMap<String, u64>,
    pub mediums: BTreeMap<String, u64>,
    pub campaigns: BTreeMap<String, u64>,
}

/// One tally per session in each table. Sessions carry normalized
/// attribution ("Direct"/"None" sentinels), so untagged traffic shows up
/// under those keys rather than vanishing.
pub fn compute_traffic_stats(sessions: &[Session]) -> TrafficStats {
    let mut stats = TrafficStats::default();

    for session in sessions {
        let ts = &session.traffic_source;
        *stats.sources.entry(ts.source.clone()).or_insert(0) += 1;
        *stats.mediums.entry(ts.medium.clone()).or_insert(0) += 1;
        *stats.campaigns.entry(ts.campaign.clone()).or_insert(0) += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::{GeoInfo, SessionInfo, TrafficSource};
    use chrono::Utc;

    fn make_session(source: &str, medium: &str, campaign: &str) -> Session {
        let now = Utc::now();
        Session {
            session_id: format!("s-{source}-{medium}-{campaign}"),
            ip: "1.1.1.1".to_string(),
            user_agent: String::new(),
            page_type: "index".to_string(),
            location: GeoInfo::default(),
            start_time: now,
            last_update: now,
            total_time_on_page: 0,
            session_info: SessionInfo {
                last_active: now,
                tab_focused: true,
                browser_info: None,
            },
            traffic_source: TrafficSource {
                referrer: "Direct".to_string(),
                source: source.to_string(),
                medium: medium.to_string(),
                campaign: campaign.to_string(),
            },
            events: Vec::new(),
            clicks: Vec::new(),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_tables() {
        let stats = compute_traffic_stats(&[]);
        assert!(stats.sources.is_empty());
        assert!(stats.mediums.is_empty());
        assert!(stats.campaigns.is_empty());
    }

    #[test]
    fn test_counts_per_table() {
        let sessions = vec![
            make_session("google", "cpc", "winter"),
            make_session("google", "organic", "None"),
            make_session("Direct", "None", "None"),
        ];

        let stats = compute_traffic_stats(&sessions);
        assert_eq!(stats.sources["google"], 2);
        assert_eq!(stats.sources["Direct"], 1);
        assert_eq!(stats.mediums["cpc"], 1);
        assert_eq!(stats.mediums["organic"], 1);
        assert_eq!(stats.mediums["None"], 1);
        assert_eq!(stats.campaigns["winter"], 1);
        assert_eq!(stats.campaigns["None"], 2);
    }

    #[test]
    fn test_untagged_traffic_keeps_sentinel_keys() {
        let sessions = vec![make_session("Direct", "None", "None")];

        let json = serde_json::to_value(compute_traffic_stats(&sessions)).unwrap();
        assert_eq!(json["sources"]["Direct"], 1);
        assert_eq!(json["mediums"]["None"], 1);
        assert_eq!(json["campaigns"]["None"], 1);
    }
}
