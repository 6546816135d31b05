pub mod countries;
pub mod devices;
pub mod hours;
pub mod traffic;
pub mod trends;
pub mod visitors;

use crate::storage::records::{Counters, Session};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use countries::CountryStats;
pub use devices::DeviceStats;
pub use hours::HourStats;
pub use traffic::TrafficStats;
pub use trends::Trends;
pub use visitors::ViewStats;

/// The full dashboard report, recomputed from scratch on every request.
/// No aggregate state is cached between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub view_stats: ViewStats,
    pub trends: Trends,
    pub paises: BTreeMap<String, CountryStats>,
    pub horas_atividade: BTreeMap<u32, HourStats>,
    pub trafego: TrafficStats,
    pub dispositivos: DeviceStats,
}

/// Run all six aggregation passes over one snapshot of the store.
///
/// Pure: the same snapshot, report time, and offset always produce the same
/// report, and an empty snapshot produces a fully zeroed one.
pub fn aggregate(
    sessions: &[Session],
    counters: &Counters,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> StatsReport {
    StatsReport {
        view_stats: visitors::compute_view_stats(sessions, counters, now),
        trends: trends::compute_trends(sessions, now),
        paises: countries::compute_country_stats(sessions),
        horas_atividade: hours::compute_hour_stats(sessions, offset),
        trafego: traffic::compute_traffic_stats(sessions),
        dispositivos: devices::compute_device_stats(sessions),
    }
}
