use crate::storage::records::BrowserInfo;

/// Minimal User-Agent parser for browser, OS, and device-class detection.
///
/// Simple substring matching covers the major engines; anything it cannot
/// place falls back to the "Unknown" sentinels on a desktop platform, so the
/// stored record is always fully populated.
pub fn parse(ua: &str) -> BrowserInfo {
    let platform = detect_platform(ua);
    BrowserInfo {
        name: detect_browser(ua).unwrap_or_else(|| "Unknown".to_string()),
        version: detect_browser_version(ua).unwrap_or_else(|| "Unknown".to_string()),
        os: detect_os(ua).unwrap_or_else(|| "Unknown".to_string()),
        is_mobile: platform == "mobile",
        is_tablet: platform == "tablet",
        is_desktop: platform == "desktop",
        platform: platform.to_string(),
    }
}

fn detect_browser(ua: &str) -> Option<String> {
    // Order matters: check more specific patterns first
    if ua.contains("Edg/") || ua.contains("Edge/") {
        Some("Edge".to_string())
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        Some("Opera".to_string())
    } else if ua.contains("Chrome/") && !ua.contains("Chromium/") {
        Some("Chrome".to_string())
    } else if ua.contains("Safari/") && !ua.contains("Chrome/") {
        Some("Safari".to_string())
    } else if ua.contains("Firefox/") {
        Some("Firefox".to_string())
    } else {
        None
    }
}

fn detect_browser_version(ua: &str) -> Option<String> {
    let patterns = [
        ("Edg/", "Edg/"),
        ("Edge/", "Edge/"),
        ("OPR/", "OPR/"),
        ("Chrome/", "Chrome/"),
        ("Firefox/", "Firefox/"),
        ("Version/", "Version/"),
    ];

    for (check, prefix) in &patterns {
        if ua.contains(*check) {
            if let Some(pos) = ua.find(prefix) {
                let version_start = pos + prefix.len();
                let version: String = ua[version_start..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                if !version.is_empty() {
                    return Some(version);
                }
            }
        }
    }
    None
}

fn detect_os(ua: &str) -> Option<String> {
    if ua.contains("Windows") {
        Some("Windows".to_string())
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
        // Check iOS before macOS since iPhone UAs contain "Mac OS X"
        Some("iOS".to_string())
    } else if ua.contains("Mac OS X") || ua.contains("macOS") {
        Some("macOS".to_string())
    } else if ua.contains("Android") {
        Some("Android".to_string())
    } else if ua.contains("CrOS") {
        Some("Chrome OS".to_string())
    } else if ua.contains("Linux") {
        Some("Linux".to_string())
    } else {
        None
    }
}

fn detect_platform(ua: &str) -> &'static str {
    // Android tablets carry "Android" without the "Mobile" token
    if ua.contains("iPad") || ua.contains("Tablet") || (ua.contains("Android") && !ua.contains("Mobile")) {
        "tablet"
    } else if ua.contains("iPhone") || ua.contains("Mobile") {
        "mobile"
    } else {
        "desktop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chrome_windows() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.130 Safari/537.36";
        let parsed = parse(ua);
        assert_eq!(parsed.name, "Chrome");
        assert_eq!(parsed.version, "120.0.6099.130");
        assert_eq!(parsed.os, "Windows");
        assert_eq!(parsed.platform, "desktop");
        assert!(parsed.is_desktop);
        assert!(!parsed.is_mobile);
        assert!(!parsed.is_tablet);
    }

    #[test]
    fn test_parse_firefox_linux() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
        let parsed = parse(ua);
        assert_eq!(parsed.name, "Firefox");
        assert_eq!(parsed.version, "121.0");
        assert_eq!(parsed.os, "Linux");
        assert!(parsed.is_desktop);
    }

    #[test]
    fn test_parse_safari_macos() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15";
        let parsed = parse(ua);
        assert_eq!(parsed.name, "Safari");
        assert_eq!(parsed.os, "macOS");
        assert!(parsed.is_desktop);
    }

    #[test]
    fn test_parse_edge() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
        let parsed = parse(ua);
        assert_eq!(parsed.name, "Edge");
        assert_eq!(parsed.version, "120.0.2210.91");
    }

    #[test]
    fn test_parse_android_phone() {
        let ua = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36";
        let parsed = parse(ua);
        assert_eq!(parsed.name, "Chrome");
        assert_eq!(parsed.os, "Android");
        assert_eq!(parsed.platform, "mobile");
        assert!(parsed.is_mobile);
        assert!(!parsed.is_tablet);
        assert!(!parsed.is_desktop);
    }

    #[test]
    fn test_parse_android_tablet() {
        let ua = "Mozilla/5.0 (Linux; Android 13; SM-X510) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Safari/537.36";
        let parsed = parse(ua);
        assert_eq!(parsed.os, "Android");
        assert_eq!(parsed.platform, "tablet");
        assert!(parsed.is_tablet);
        assert!(!parsed.is_mobile);
    }

    #[test]
    fn test_parse_iphone() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";
        let parsed = parse(ua);
        assert_eq!(parsed.name, "Safari");
        assert_eq!(parsed.os, "iOS");
        assert_eq!(parsed.platform, "mobile");
        assert!(parsed.is_mobile);
    }

    #[test]
    fn test_parse_ipad() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";
        let parsed = parse(ua);
        assert_eq!(parsed.os, "iOS");
        assert_eq!(parsed.platform, "tablet");
        assert!(parsed.is_tablet);
        assert!(!parsed.is_mobile);
    }

    #[test]
    fn test_parse_empty_ua() {
        let parsed = parse("");
        assert_eq!(parsed.name, "Unknown");
        assert_eq!(parsed.version, "Unknown");
        assert_eq!(parsed.os, "Unknown");
        assert_eq!(parsed.platform, "desktop");
        assert!(parsed.is_desktop);
    }

    #[test]
    fn test_parse_unknown_ua() {
        let parsed = parse("SomeBot/1.0");
        assert_eq!(parsed.name, "Unknown");
        assert_eq!(parsed.os, "Unknown");
        assert!(parsed.is_desktop);
    }

    #[test]
    fn test_flags_are_mutually_exclusive() {
        for ua in [
            "",
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1 like Mac OS X) Version/17.2 Mobile/15E148 Safari/604.1",
            "Mozilla/5.0 (iPad; CPU OS 17_2 like Mac OS X) Version/17.2 Mobile/15E148 Safari/604.1",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0 Safari/537.36",
        ] {
            let parsed = parse(ua);
            let flags = [parsed.is_mobile, parsed.is_tablet, parsed.is_desktop];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "ua: {ua}");
        }
    }
}
