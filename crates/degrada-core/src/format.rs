//! Human-readable formatting of media metadata.

/// Placeholder for missing or unusable values.
pub const UNKNOWN: &str = "未知";

/// `h:mm:ss`, or `m:ss` under an hour.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s > 0.0) else {
        return UNKNOWN.to_owned();
    };
    let total = seconds.floor() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Bits per second with a decimal (SI) prefix.
#[must_use]
pub fn bitrate(bits_per_second: Option<f64>) -> String {
    match bits_per_second.filter(|b| b.is_finite() && *b > 0.0) {
        None => UNKNOWN.to_owned(),
        Some(b) if b >= 1_000_000.0 => format!("{:.2} Mbps", b / 1_000_000.0),
        Some(b) if b >= 1_000.0 => format!("{:.2} Kbps", b / 1_000.0),
        Some(b) => format!("{b} bps"),
    }
}

/// Byte count with a binary prefix, trailing zeros trimmed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bytes(count: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if count == 0 {
        return "0 Bytes".to_owned();
    }
    let mut value = count as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Frames per second with two decimals.
#[must_use]
pub fn fps(fps: Option<f64>) -> String {
    fps.filter(|f| f.is_finite() && *f > 0.0)
        .map_or_else(|| UNKNOWN.to_owned(), |f| format!("{f:.2} fps"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(duration(Some(59.9)), "0:59");
        assert_eq!(duration(Some(125.0)), "2:05");
        assert_eq!(duration(Some(3725.0)), "1:02:05");
        assert_eq!(duration(None), UNKNOWN);
        assert_eq!(duration(Some(f64::NAN)), UNKNOWN);
    }

    #[test]
    fn bitrates() {
        assert_eq!(bitrate(Some(2_500_000.0)), "2.50 Mbps");
        assert_eq!(bitrate(Some(128_000.0)), "128.00 Kbps");
        assert_eq!(bitrate(Some(800.0)), "800 bps");
        assert_eq!(bitrate(Some(0.0)), UNKNOWN);
    }

    #[test]
    fn byte_counts() {
        assert_eq!(bytes(0), "0 Bytes");
        assert_eq!(bytes(512), "512 Bytes");
        assert_eq!(bytes(1536), "1.5 KB");
        assert_eq!(bytes(1024 * 1024), "1 MB");
        assert_eq!(bytes(3 * 1024 * 1024 * 1024 + 1024 * 1024 * 256), "3.25 GB");
    }

    #[test]
    fn frame_rates() {
        assert_eq!(fps(Some(29.97)), "29.97 fps");
        assert_eq!(fps(None), UNKNOWN);
    }
}
