use crate::storage::records::Session;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-country rollup. The dashboard's report keys are Portuguese and are
/// part of the wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryStats {
    pub sessoes: u64,
    pub tempo_total: i64,
    pub cliques_total: u64,
    pub usuarios: u64,
}

/// Group sessions by resolved country code. Unresolved locations land in
/// the "Unknown" bucket; `usuarios` counts distinct IPs per country.
pub fn compute_country_stats(sessions: &[Session]) -> BTreeMap<String, CountryStats> {
    let mut by_country: BTreeMap<&str, Accum> = BTreeMap::new();

    for session in sessions {
        let acc = by_country.entry(session.location.country.as_str()).or_default();
        acc.sessoes += 1;
        acc.tempo_total += session.total_time_on_page;
        acc.cliques_total += session.clicks.len() as u64;
        acc.usuarios.insert(session.ip.as_str());
    }

    by_country
        .into_iter()
        .map(|(country, acc)| {
            (
                country.to_string(),
                CountryStats {
                    sessoes: acc.sessoes,
                    tempo_total: acc.tempo_total,
                    cliques_total: acc.cliques_total,
                    usuarios: acc.usuarios.len() as u64,
                },
            )
        })
        .collect()
}

#[derive(Default)]
struct Accum<'a> {
    sessoes: u64,
    tempo_total: i64,
    cliques_total: u64,
    usuarios: BTreeSet<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::{GeoInfo, SessionInfo, TrafficSource};
    use chrono::Utc;

    fn make_session(country: &str, ip: &str, time_on_page: i64, clicks: usize) -> Session {
        let now = Utc::now();
        Session {
            session_id: format!("s-{ip}-{time_on_page}"),
            ip: ip.to_string(),
            user_agent: String::new(),
            page_type: "index".to_string(),
            location: GeoInfo {
                country: country.to_string(),
                ..GeoInfo::default()
            },
            start_time: now,
            last_update: now,
            total_time_on_page: time_on_page,
            session_info: SessionInfo {
                last_active: now,
                tab_focused: true,
                browser_info: None,
            },
            traffic_source: TrafficSource::default(),
            events: Vec::new(),
            clicks: vec![serde_json::json!({}); clicks],
        }
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(compute_country_stats(&[]).is_empty());
    }

    #[test]
    fn test_groups_by_country() {
        let sessions = vec![
            make_session("US", "1.1.1.1", 10, 0),
            make_session("US", "2.2.2.2", 20, 0),
            make_session("BR", "3.3.3.3", 5, 0),
        ];

        let stats = compute_country_stats(&sessions);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["US"].sessoes, 2);
        assert_eq!(stats["US"].tempo_total, 30);
        assert_eq!(stats["BR"].sessoes, 1);
        assert_eq!(stats["BR"].tempo_total, 5);
    }

    #[test]
    fn test_distinct_users_per_country() {
        let sessions = vec![
            make_session("US", "1.1.1.1", 0, 0),
            make_session("US", "1.1.1.1", 10, 0),
            make_session("US", "2.2.2.2", 0, 0),
        ];

        let stats = compute_country_stats(&sessions);
        assert_eq!(stats["US"].sessoes, 3);
        assert_eq!(stats["US"].usuarios, 2);
    }

    #[test]
    fn test_click_totals() {
        let sessions = vec![
            make_session("DE", "1.1.1.1", 0, 3),
            make_session("DE", "2.2.2.2", 0, 2),
        ];

        let stats = compute_country_stats(&sessions);
        assert_eq!(stats["DE"].cliques_total, 5);
    }

    #[test]
    fn test_unresolved_locations_bucket_together() {
        let sessions = vec![
            make_session("Unknown", "1.1.1.1", 0, 0),
            make_session("Unknown", "2.2.2.2", 0, 0),
        ];

        let stats = compute_country_stats(&sessions);
        assert_eq!(stats["Unknown"].sessoes, 2);
    }

    #[test]
    fn test_wire_format() {
        let sessions = vec![make_session("US", "1.1.1.1", 12, 1)];
        let json = serde_json::to_value(compute_country_stats(&sessions)).unwrap();

        assert_eq!(json["US"]["sessoes"], 1);
        assert_eq!(json["US"]["tempoTotal"], 12);
        assert_eq!(json["US"]["cliquesTotal"], 1);
        assert_eq!(json["US"]["usuarios"], 1);
    }
}
