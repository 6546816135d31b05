use crate::storage::records::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Device-class and environment breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStats {
    pub mobile: u64,
    pub desktop: u64,
    pub tablet: u64,
    pub browsers: BTreeMap<String, u64>,
    pub os: BTreeMap<String, u64>,
}

/// Count each session once per table, driven by its stored browser info.
///
/// The class tally checks mobile, then tablet, then desktop, so a record
/// carrying contradictory flags still lands in exactly one class. Sessions
/// without browser info are skipped entirely.
pub fn compute_device_stats(sessions: &[Session]) -> DeviceStats {
    let mut stats = DeviceStats::default();

    for session in sessions {
        let Some(info) = &session.session_info.browser_info else {
            continue;
        };

        if info.is_mobile {
            stats.mobile += 1;
        } else if info.is_tablet {
            stats.tablet += 1;
        } else if info.is_desktop {
            stats.desktop += 1;
        }

        let browser = if info.name.is_empty() { "Unknown" } else { &info.name };
        let os = if info.os.is_empty() { "Unknown" } else { &info.os };
        *stats.browsers.entry(browser.to_string()).or_insert(0) += 1;
        *stats.os.entry(os.to_string()).or_insert(0) += 1;
    }

    stats
}
