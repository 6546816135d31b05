use crate::storage::records::GeoInfo;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// Thread-safe wrapper around the MaxMind GeoLite2 database reader.
/// When the database is not available, all lookups return the "Unknown"
/// sentinel record, so sessions are always stored with a location.
pub struct GeoResolver {
    reader: Option<Arc<maxminddb::Reader<Vec<u8>>>>,
}

impl GeoResolver {
    /// Open a MaxMind .mmdb database file.
    ///
    /// Degrades gracefully: if the path is `None`, the file doesn't exist,
    /// or it fails to open, the resolver stays usable and every lookup
    /// yields the sentinel record.
    pub fn open(path: Option<&Path>) -> Self {
        let reader = path.and_then(|p| {
            if !p.exists() {
                tracing::warn!(path = %p.display(), "GeoIP database not found, geolocation disabled");
                return None;
            }
            match maxminddb::Reader::open_readfile(p) {
                Ok(r) => {
                    tracing::info!(path = %p.display(), "GeoIP database loaded");
                    Some(Arc::new(r))
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "Failed to open GeoIP database, geolocation disabled");
                    None
                }
            }
        });
        Self { reader }
    }

    /// Returns `true` if a GeoIP database is loaded.
    pub const fn is_loaded(&self) -> bool {
        self.reader.is_some()
    }

    /// Resolve the location for an IP address.
    ///
    /// Never fails: an unparseable address, a miss in the database, or a
    /// missing database all yield the sentinel record. Fields the database
    /// does carry override their sentinels individually.
    pub fn lookup(&self, ip: &str) -> GeoInfo {
        let Some(reader) = &self.reader else {
            return GeoInfo::default();
        };

        let Ok(addr) = ip.parse::<IpAddr>() else {
            return GeoInfo::default();
        };

        let Ok(lookup_result) = reader.lookup(addr) else {
            return GeoInfo::default();
        };

        let Ok(Some(city)) = lookup_result.decode::<maxminddb::geoip2::City>() else {
            return GeoInfo::default();
        };

        let mut info = GeoInfo::default();

        if let Some(code) = city.country.iso_code {
            info.country = code.to_string();
        }
        if let Some(region) = city.subdivisions.first().and_then(|s| s.names.english) {
            info.region = region.to_string();
        }
        if let Some(name) = city.city.names.english {
            info.city = name.to_string();
        }
        if let Some(tz) = city.location.time_zone {
            info.timezone = tz.to_string();
        }
        if let (Some(lat), Some(lon)) = (city.location.latitude, city.location.longitude) {
            info.ll = [lat, lon];
        }

        info
    }
}
