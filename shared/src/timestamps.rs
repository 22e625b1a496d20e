use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::scrub::{ScrubWindow, WindowBounds};

/// Wire format for window bounds sent back to the telemetry API.
///
/// Local wall-clock time, microsecond precision, no UTC offset. The API
/// compares against naive datetimes, so an offset suffix would be rejected
/// or silently shift the window.
const LOCAL_NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unrecognised timestamp '{raw}'")]
pub struct TimestampParseError {
    pub raw: String,
}

/// A single sample time of a recorded track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackTimestamp(NaiveDateTime);

impl TrackTimestamp {
    pub fn new(naive: NaiveDateTime) -> Self {
        Self(naive)
    }

    /// Parse an ISO-8601 timestamp as produced by the telemetry API.
    ///
    /// Naive strings are taken as local wall-clock time. Strings carrying an
    /// offset (or `Z`) are converted to local time first.
    pub fn parse(raw: &str) -> Result<Self, TimestampParseError> {
        let trimmed = raw.trim();
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self(naive));
            }
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|aware| Self(aware.with_timezone(&Local).naive_local()))
            .map_err(|_| TimestampParseError {
                raw: raw.to_string(),
            })
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Query-parameter form, e.g. `2024-06-01T14:03:07.250000`.
    pub fn local_naive(&self) -> String {
        self.0.format(LOCAL_NAIVE_FORMAT).to_string()
    }

    /// Human-readable form used for the slider labels.
    pub fn display_label(&self) -> String {
        self.0.format(DISPLAY_FORMAT).to_string()
    }

    /// Seconds since the Unix epoch, treating the naive time as UTC.
    /// Only used for relative placement on the plot's time axis.
    pub fn epoch_seconds(&self) -> f64 {
        let utc = self.0.and_utc();
        utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_micros()) / 1_000_000.0
    }
}

impl fmt::Display for TrackTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_label())
    }
}

/// The full, ordered list of sample times of the loaded track.
///
/// Immutable once built. Cloning shares the underlying storage, so the
/// sequence can sit inside actor state without copying every sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimestampSequence {
    stamps: Arc<Vec<TrackTimestamp>>,
}

impl TimestampSequence {
    pub fn new(stamps: Vec<TrackTimestamp>) -> Self {
        Self {
            stamps: Arc::new(stamps),
        }
    }

    /// Parse every raw timestamp; a single bad entry rejects the whole list.
    pub fn from_raw<S: AsRef<str>>(raw: &[S]) -> Result<Self, TimestampParseError> {
        let stamps = raw
            .iter()
            .map(|value| TrackTimestamp::parse(value.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(stamps))
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TrackTimestamp> {
        self.stamps.get(index).copied()
    }

    /// Window spanning every sample, `None` for an empty track.
    pub fn full_window(&self) -> Option<ScrubWindow> {
        ScrubWindow::new(0, self.len().checked_sub(1)?, self.len())
    }

    pub fn bounds(&self, window: ScrubWindow) -> Option<WindowBounds> {
        Some(WindowBounds {
            start: self.get(window.start())?,
            end: self.get(window.end())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minute_sequence(count: usize) -> TimestampSequence {
        let raw: Vec<String> = (0..count)
            .map(|minute| format!("2024-06-01T10:{:02}:00", minute))
            .collect();
        TimestampSequence::from_raw(&raw).unwrap()
    }

    #[test]
    fn parses_python_isoformat_variants() {
        let plain = TrackTimestamp::parse("2024-06-01T14:03:07").unwrap();
        assert_eq!(plain.display_label(), "2024-06-01 14:03:07");

        let micros = TrackTimestamp::parse("2024-06-01T14:03:07.250000").unwrap();
        assert_eq!(micros.local_naive(), "2024-06-01T14:03:07.250000");

        let spaced = TrackTimestamp::parse("2024-06-01 14:03:07.5").unwrap();
        assert_eq!(spaced.local_naive(), "2024-06-01T14:03:07.500000");
    }

    #[test]
    fn local_naive_has_no_offset_suffix() {
        let stamp = TrackTimestamp::parse("2024-06-01T14:03:07").unwrap();
        let encoded = stamp.local_naive();
        assert!(!encoded.ends_with('Z'));
        assert!(!encoded.contains('+'));
        assert_eq!(TrackTimestamp::parse(&encoded).unwrap(), stamp);
    }

    #[test]
    fn rejects_garbage() {
        let error = TrackTimestamp::parse("yesterday at noon").unwrap_err();
        assert_eq!(error.raw, "yesterday at noon");
        assert!(TimestampSequence::from_raw(&["2024-06-01T10:00:00", "nope"]).is_err());
    }

    #[test]
    fn full_window_spans_every_sample() {
        let sequence = minute_sequence(5);
        let window = sequence.full_window().unwrap();
        assert_eq!((window.start(), window.end()), (0, 4));
        assert!(TimestampSequence::default().full_window().is_none());
    }

    #[test]
    fn bounds_match_labels_at_indices() {
        let sequence = minute_sequence(30);
        for (start, end) in [(0, 0), (3, 17), (29, 29), (0, 29)] {
            let window = ScrubWindow::new(start, end, sequence.len()).unwrap();
            let bounds = sequence.bounds(window).unwrap();
            let (start_label, end_label) = bounds.labels();
            assert_eq!(start_label, sequence.get(start).unwrap().display_label());
            assert_eq!(end_label, sequence.get(end).unwrap().display_label());
        }
    }

    #[test]
    fn clones_share_storage() {
        let sequence = minute_sequence(3);
        let copy = sequence.clone();
        assert!(Arc::ptr_eq(&sequence.stamps, &copy.stamps));
    }
}
