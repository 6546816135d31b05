use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Browser and device details derived from the User-Agent header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserInfo {
    pub name: String,
    pub version: String,
    pub os: String,
    pub platform: String,
    pub is_mobile: bool,
    pub is_tablet: bool,
    pub is_desktop: bool,
}

impl Default for BrowserInfo {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            version: "Unknown".to_string(),
            os: "Unknown".to_string(),
            platform: "desktop".to_string(),
            is_mobile: false,
            is_tablet: false,
            is_desktop: true,
        }
    }
}

/// Geolocation resolved from the client IP.
///
/// Every field carries a sentinel when resolution fails, so the record is
/// always fully populated. `ll` is `[latitude, longitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub country: String,
    pub region: String,
    pub city: String,
    pub timezone: String,
    pub ll: [f64; 2],
}

impl Default for GeoInfo {
    fn default() -> Self {
        Self {
            country: "Unknown".to_string(),
            region: "Unknown".to_string(),
            city: "Unknown".to_string(),
            timezone: "Unknown".to_string(),
            ll: [0.0, 0.0],
        }
    }
}

/// Attribution fields sent by the tracking snippet. Missing fields resolve
/// to the "Direct"/"None" sentinels at deserialization, never to null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSource {
    #[serde(default = "direct")]
    pub referrer: String,
    #[serde(default = "direct")]
    pub source: String,
    #[serde(default = "none")]
    pub medium: String,
    #[serde(default = "none")]
    pub campaign: String,
}

fn direct() -> String {
    "Direct".to_string()
}

fn none() -> String {
    "None".to_string()
}

impl Default for TrafficSource {
    fn default() -> Self {
        Self {
            referrer: direct(),
            source: direct(),
            medium: none(),
            campaign: none(),
        }
    }
}

/// One discrete client action appended to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "empty_object")]
    pub data: Value,
}

pub(crate) fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Per-request activity details refreshed on every event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub last_active: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub tab_focused: bool,
    #[serde(default)]
    pub browser_info: Option<BrowserInfo>,
}

const fn default_true() -> bool {
    true
}

/// One merged, evolving record of a single visitor's activity.
///
/// Created on the first event from a visitor with no matching session;
/// every later matched event updates the record in place and appends one
/// entry to `events`. Records are never deleted.
///
/// Invariants: `total_time_on_page >= 0` and `last_update >= start_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub ip: String,
    pub user_agent: String,
    #[serde(default = "default_page_type")]
    pub page_type: String,
    pub location: GeoInfo,
    pub start_time: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    /// Whole seconds between `start_time` and `last_update`, rounded.
    pub total_time_on_page: i64,
    pub session_info: SessionInfo,
    #[serde(default)]
    pub traffic_source: TrafficSource,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    #[serde(default)]
    pub clicks: Vec<Value>,
}

pub(crate) fn default_page_type() -> String {
    "unknown".to_string()
}

/// Process-wide running totals, persisted separately from the sessions.
///
/// `page_views` only grows and `unique_visitors` is union-only; neither is
/// ever reset by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    #[serde(default)]
    pub page_views: u64,
    #[serde(default)]
    pub unique_visitors: BTreeSet<String>,
}

impl Counters {
    /// Record one landing-page view: bump the total and remember the
    /// visitor. Re-inserting a known IP is a no-op on the set.
    pub fn record_page_view(&mut self, ip: &str) {
        self.page_views += 1;
        self.unique_visitors.insert(ip.to_string());
    }
}
