use crate::ingest::handler::EventPayload;
use crate::ingest::useragent;
use crate::storage::records::{self, GeoInfo, Session, SessionEvent, SessionInfo, TrafficSource};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// How an incoming event is matched to a stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Match on session id first, then fall back to the client IP. One
    /// shared IP (office NAT, CGNAT) therefore folds into one session.
    #[default]
    SessionIdOrIp,
    /// Match on session id only.
    SessionId,
    /// Match on client IP only.
    Ip,
}

impl std::str::FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session-id-or-ip" => Ok(Self::SessionIdOrIp),
            "session-id" => Ok(Self::SessionId),
            "ip" => Ok(Self::Ip),
            other => Err(format!("unknown match strategy: {other}")),
        }
    }
}

/// Request-scoped identity resolved once at the ingestion boundary: the
/// session id (client-sent or freshly generated), the client IP, the raw
/// User-Agent header, and the location resolved from the IP.
#[derive(Debug, Clone)]
pub struct Identity {
    pub session_id: String,
    pub ip: String,
    pub user_agent: String,
    pub geo: GeoInfo,
}

/// Find the stored session an incoming event belongs to.
///
/// Scans in insertion order and returns the first hit, so when both keys
/// match different sessions the older one wins.
pub fn find_match(sessions: &[Session], identity: &Identity, strategy: MatchStrategy) -> Option<usize> {
    sessions.iter().position(|s| match strategy {
        MatchStrategy::SessionIdOrIp => {
            s.session_id == identity.session_id || s.ip == identity.ip
        }
        MatchStrategy::SessionId => s.session_id == identity.session_id,
        MatchStrategy::Ip => s.ip == identity.ip,
    })
}

/// Fold one incoming event into a session record.
///
/// With no existing session this starts a new one carrying a single
/// `session_start` event. With an existing session the incoming values win
/// field by field, except `start_time` which always survives from the first
/// event; `total_time_on_page` is recomputed from that original start and
/// one event entry is appended. Stored clicks are only replaced when the
/// payload carries a clicks array of its own.
pub fn merge(
    existing: Option<&Session>,
    payload: &EventPayload,
    identity: &Identity,
    now: DateTime<Utc>,
) -> Session {
    let session_info = SessionInfo {
        last_active: now,
        tab_focused: payload.session_info.tab_focused.unwrap_or(true),
        browser_info: Some(useragent::parse(&identity.user_agent)),
    };
    let traffic_source = normalize_traffic(payload.traffic_source.clone().unwrap_or_default());

    match existing {
        Some(existing) => {
            let elapsed_ms = (now - existing.start_time).num_milliseconds();
            let total_time_on_page = ((elapsed_ms + 500) / 1000).max(0);

            let mut events = existing.events.clone();
            events.push(SessionEvent {
                event_type: payload
                    .event_type
                    .clone()
                    .unwrap_or_else(|| "update".to_string()),
                timestamp: now,
                data: event_data(payload),
            });

            Session {
                session_id: identity.session_id.clone(),
                ip: identity.ip.clone(),
                user_agent: identity.user_agent.clone(),
                page_type: payload
                    .page_type
                    .clone()
                    .unwrap_or_else(|| existing.page_type.clone()),
                location: identity.geo.clone(),
                start_time: existing.start_time,
                last_update: now,
                total_time_on_page,
                session_info,
                traffic_source,
                events,
                clicks: payload
                    .clicks
                    .clone()
                    .unwrap_or_else(|| existing.clicks.clone()),
            }
        }
        None => Session {
            session_id: identity.session_id.clone(),
            ip: identity.ip.clone(),
            user_agent: identity.user_agent.clone(),
            page_type: payload
                .page_type
                .clone()
                .unwrap_or_else(records::default_page_type),
            location: identity.geo.clone(),
            start_time: now,
            last_update: now,
            total_time_on_page: 0,
            session_info,
            traffic_source,
            events: vec![SessionEvent {
                event_type: "session_start".to_string(),
                timestamp: now,
                data: records::empty_object(),
            }],
            clicks: payload.clicks.clone().unwrap_or_default(),
        },
    }
}

/// Empty attribution strings count as absent and take their sentinels.
fn normalize_traffic(mut ts: TrafficSource) -> TrafficSource {
    if ts.referrer.is_empty() {
        ts.referrer = "Direct".to_string();
    }
    if ts.source.is_empty() {
        ts.source = "Direct".to_string();
    }
    if ts.medium.is_empty() {
        ts.medium = "None".to_string();
    }
    if ts.campaign.is_empty() {
        ts.campaign = "None".to_string();
    }
    ts
}

/// A null or absent `eventData` becomes the empty object, never null.
fn event_data(payload: &EventPayload) -> Value {
    match &payload.event_data {
        Some(value) if !value.is_null() => value.clone(),
        _ => records::empty_object(),
    }
}
