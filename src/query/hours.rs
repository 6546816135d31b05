use crate::storage::records::Session;
use chrono::{FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Activity rollup for one hour of the day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourStats {
    pub sessoes: u64,
    /// Mean dwell time in whole seconds, rounded; 0 for an empty bucket.
    pub tempo_medio: i64,
    pub usuarios: u64,
}

/// Bucket sessions by their start hour in the configured display offset.
///
/// The report always carries all 24 buckets, keyed "0" through "23" in
/// numeric order, so the dashboard can draw a full clock face without
/// filling gaps itself.
pub fn compute_hour_stats(sessions: &[Session], offset: FixedOffset) -> BTreeMap<u32, HourStats> {
    let mut buckets: BTreeMap<u32, Accum> = (0..24).map(|h| (h, Accum::default())).collect();

    for session in sessions {
        let hour = session.start_time.with_timezone(&offset).hour();
        let Some(acc) = buckets.get_mut(&hour) else {
            continue;
        };
        acc.sessoes += 1;
        acc.tempo_total += session.total_time_on_page;
        acc.usuarios.insert(session.ip.as_str());
    }

    buckets
        .into_iter()
        .map(|(hour, acc)| {
            let count = i64::try_from(acc.sessoes).unwrap_or(0);
            let tempo_medio = if count > 0 {
                (acc.tempo_total + count / 2) / count
            } else {
                0
            };
            (
                hour,
                HourStats {
                    sessoes: acc.sessoes,
                    tempo_medio,
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
    usuarios: BTreeSet<&'a str>,
}
