//! Trailer quality scoring.
//!
//! The score is bits per pixel weighted by codec efficiency, so trailers of
//! different resolutions and bitrates compare on fidelity rather than size.

use crate::models::trailer::TrailerRecord;
use std::cmp::Ordering;

/// Relative compression efficiency of known codecs. Unknown codecs weigh 1.0.
const CODEC_WEIGHTS: &[(&str, f64)] = &[
    ("mpeg4", 0.6),
    ("h263", 0.6),
    ("h264", 1.0),
    ("h265", 1.5),
    ("hevc", 1.5),
    ("vp8", 0.9),
    ("vp9", 1.3),
    ("av1", 1.7),
];

/// Weight of a codec identifier.
pub fn codec_weight(codec: Option<&str>) -> f64 {
    codec
        .map(|c| c.to_lowercase())
        .and_then(|c| {
            CODEC_WEIGHTS
                .iter()
                .find(|(name, _)| *name == c)
                .map(|(_, weight)| *weight)
        })
        .unwrap_or(1.0)
}

/// Quality score of a record; 0.0 when it cannot be scored.
pub fn quality_score(record: &TrailerRecord) -> f64 {
    let details = &record.details;
    let (Some(height), Some(width), Some(duration), Some(bitrate)) =
        (details.height, details.width, details.duration, details.bitrate)
    else {
        return 0.0;
    };

    if duration <= 0.0 || !duration.is_finite() {
        return 0.0;
    }

    let total_pixels = f64::from(height) * f64::from(width) * duration;
    let total_bits = bitrate as f64 * duration;
    if total_pixels <= 0.0 || total_bits <= 0.0 {
        return 0.0;
    }

    (total_bits / total_pixels) * codec_weight(details.codec.as_deref())
}

/// Frames per second; 0.0 when frames or duration are unknown.
pub fn frame_rate(record: &TrailerRecord) -> f64 {
    match (record.details.frames, record.details.duration) {
        (Some(frames), Some(duration)) if frames > 0 && duration > 0.0 => frames as f64 / duration,
        _ => 0.0,
    }
}

/// Ranking order: `Less` means `a` is preferred over `b`.
///
/// Non-broken beats broken, forced beats non-forced, then the higher score
/// wins. Equal records compare `Equal` so a stable sort keeps their order.
pub fn compare(a: &TrailerRecord, b: &TrailerRecord) -> Ordering {
    a.details
        .broken
        .cmp(&b.details.broken)
        .then_with(|| b.forced.cmp(&a.forced))
        .then_with(|| {
            quality_score(b)
                .partial_cmp(&quality_score(a))
                .unwrap_or(Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::MediaDetails;
    use crate::models::trailer::SourceVideo;

    fn record(codec: Option<&str>, bitrate: Option<u64>) -> TrailerRecord {
        TrailerRecord::new(
            SourceVideo {
                tmdb_id: 1,
                url: "u".to_string(),
                language: "en".to_string(),
                region: "US".to_string(),
                name: "Trailer".to_string(),
                kind: "Trailer".to_string(),
                official: true,
            },
            MediaDetails {
                broken: false,
                hash: "h".to_string(),
                height: Some(1080),
                width: Some(1920),
                duration: Some(120.0),
                frames: Some(2880),
                bitrate,
                codec: codec.map(str::to_string),
            },
        )
    }

    #[test]
    fn test_missing_fields_score_zero() {
        assert_eq!(quality_score(&record(Some("h264"), None)), 0.0);

        let mut rec = record(Some("h264"), Some(1_000_000));
        rec.details.height = None;
        assert_eq!(quality_score(&rec), 0.0);

        let mut rec = record(Some("h264"), Some(1_000_000));
        rec.details.width = None;
        assert_eq!(quality_score(&rec), 0.0);

        let mut rec = record(Some("h264"), Some(1_000_000));
        rec.details.duration = None;
        assert_eq!(quality_score(&rec), 0.0);

        let mut rec = record(Some("h264"), Some(1_000_000));
        rec.details.duration = Some(0.0);
        assert_eq!(quality_score(&rec), 0.0);
    }

    #[test]
    fn test_bits_per_pixel() {
        let score = quality_score(&record(Some("h264"), Some(2_073_600)));
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_doubling_bitrate_doubles_score() {
        let base = quality_score(&record(Some("vp9"), Some(3_000_000)));
        let doubled = quality_score(&record(Some("vp9"), Some(6_000_000)));
        assert!(base > 0.0);
        assert!((doubled - 2.0 * base).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_codec_weighs_like_h264() {
        let unknown = quality_score(&record(Some("prores"), Some(5_000_000)));
        let missing = quality_score(&record(None, Some(5_000_000)));
        let h264 = quality_score(&record(Some("h264"), Some(5_000_000)));
        assert_eq!(unknown, h264);
        assert_eq!(missing, h264);
    }

    #[test]
    fn test_codec_weight() {
        assert_eq!(codec_weight(Some("AV1")), 1.7);
        assert_eq!(codec_weight(Some("hevc")), codec_weight(Some("h265")));
        assert_eq!(codec_weight(Some("mpeg4")), 0.6);
    }

    #[test]
    fn test_frame_rate() {
        let rec = record(Some("h264"), Some(1));
        assert!((frame_rate(&rec) - 24.0).abs() < 1e-9);

        let mut rec = rec;
        rec.details.frames = None;
        assert_eq!(frame_rate(&rec), 0.0);
    }

    #[test]
    fn test_compare() {
        let good = record(Some("h264"), Some(8_000_000));
        let mut broken = record(Some("av1"), Some(9_000_000));
        broken.details.broken = true;
        let mut forced = record(Some("h264"), Some(1_000_000));
        forced.forced = true;

        assert_eq!(compare(&good, &broken), Ordering::Less);
        assert_eq!(compare(&forced, &good), Ordering::Less);
        assert_eq!(compare(&good, &good.clone()), Ordering::Equal);
    }
}
