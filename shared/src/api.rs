//! Data contract of the telemetry HTTP API consumed by the dashboard.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::geo::{GeoPoint, GpsFix, ZoomRange};
use crate::scrub::{Stride, WindowBounds};
use crate::sequence::RequestTicket;
use crate::timestamps::{TimestampParseError, TimestampSequence};

pub const TRACK_LIST_PATH: &str = "/api/track_list";
pub const LOAD_TRACK_PATH: &str = "/api/load_track";
pub const PLOT_DATA_PATH: &str = "/api/track_plot_data";
pub const GPS_INFO_PATH: &str = "/api/gps_info";
pub const TRACK_WINDOW_PATH: &str = "/api/gps_track_window";
pub const SCRUB_WINDOW_PATH: &str = "/api/scrub_window";

// ===== RESPONSES =====

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TrackListEntry {
    pub filename: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl TrackListEntry {
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.filename)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackLoadError {
    #[error("response has no 'total_points'")]
    MissingTotalPoints,
    #[error("'timestamps' is not a list")]
    TimestampsNotSequence,
    #[error(transparent)]
    BadTimestamp(#[from] TimestampParseError),
}

/// Validate a `/api/load_track/{filename}` body.
///
/// The whole body is rejected on the first problem so that no partially
/// valid track ever reaches the session.
pub fn parse_load_track(body: &Value) -> Result<TimestampSequence, TrackLoadError> {
    body.get("total_points")
        .filter(|total| total.is_u64())
        .ok_or(TrackLoadError::MissingTotalPoints)?;
    let raw = body
        .get("timestamps")
        .and_then(Value::as_array)
        .ok_or(TrackLoadError::TimestampsNotSequence)?;
    let raw = raw
        .iter()
        .map(|value| match value {
            Value::String(text) => Ok(text.clone()),
            other => Err(TimestampParseError {
                raw: other.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TimestampSequence::from_raw(&raw)?)
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PlotDataResponse {
    #[serde(default)]
    pub timestamps: Vec<String>,
    /// Series keyed by variable, in the order the backend listed them.
    #[serde(default)]
    pub vars: IndexMap<String, Vec<Option<f64>>>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawPosition {
    #[serde(default)]
    pub lat: Value,
    #[serde(default)]
    pub lon: Value,
    #[serde(default)]
    pub speed: Value,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawZoom {
    #[serde(default)]
    pub min: Option<u8>,
    #[serde(default)]
    pub max: Option<u8>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GpsInfoResponse {
    #[serde(default)]
    pub gps_available: Option<bool>,
    #[serde(default)]
    pub latest_position: Option<RawPosition>,
    #[serde(default)]
    pub zoom: Option<RawZoom>,
}

impl GpsInfoResponse {
    /// The reported fix, if the backend has one with numeric coordinates.
    pub fn latest_fix(&self) -> Option<GpsFix> {
        if self.gps_available == Some(false) {
            return None;
        }
        let position = self.latest_position.as_ref()?;
        let point = GeoPoint::new(position.lat.as_f64()?, position.lon.as_f64()?)?;
        Some(GpsFix {
            position: point,
            speed_kmh: position.speed.as_f64().filter(|speed| speed.is_finite()),
        })
    }

    /// Zoom levels available in the tile cache, when both ends are known.
    pub fn zoom_range(&self) -> Option<ZoomRange> {
        let zoom = self.zoom.as_ref()?;
        Some(ZoomRange::new(zoom.min?, zoom.max?))
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TrackPoint {
    #[serde(default)]
    pub lat: Value,
    #[serde(default)]
    pub lon: Value,
    #[serde(default)]
    pub val: Value,
}

impl TrackPoint {
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.lat.as_f64()?, self.lon.as_f64()?)
    }

    pub fn value(&self) -> Option<f64> {
        self.val.as_f64()
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TrackWindowResponse {
    #[serde(default)]
    pub track: Vec<TrackPoint>,
    #[serde(default)]
    pub thresholds: Vec<f64>,
    #[serde(default, alias = "colors")]
    pub colours: Vec<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub color_var: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
}

// ===== REQUESTS =====

/// Why a plot-data request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotPurpose {
    /// Discover every variable of a freshly loaded track.
    Catalog,
    /// Draw the checked variables over the current window.
    Render,
}

/// A request the session wants sent to the telemetry API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    ScrubWindow {
        bounds: WindowBounds,
    },
    GpsInfo {
        ticket: RequestTicket,
    },
    PlotData {
        ticket: RequestTicket,
        purpose: PlotPurpose,
        bounds: WindowBounds,
        /// Empty means "every variable".
        vars: Vec<String>,
    },
    TrackWindow {
        ticket: RequestTicket,
        bounds: WindowBounds,
        stride: Stride,
        color_var: Option<String>,
    },
}

impl ApiRequest {
    /// Path plus percent-encoded query string, relative to the API base.
    pub fn path_and_query(&self) -> String {
        match self {
            ApiRequest::ScrubWindow { bounds } => {
                let (start, end) = bounds.query_values();
                with_query(SCRUB_WINDOW_PATH, &[("start", start), ("end", end)])
            }
            ApiRequest::GpsInfo { .. } => GPS_INFO_PATH.to_string(),
            ApiRequest::PlotData { bounds, vars, .. } => {
                let (start, end) = bounds.query_values();
                let mut params = vec![("start", start), ("end", end)];
                if !vars.is_empty() {
                    params.push(("vars", vars.join(",")));
                }
                with_query(PLOT_DATA_PATH, &params)
            }
            ApiRequest::TrackWindow {
                bounds,
                stride,
                color_var,
                ..
            } => {
                let (start, end) = bounds.query_values();
                let mut params = vec![("start", start), ("end", end), ("stride", stride.to_string())];
                if let Some(color_var) = color_var {
                    params.push(("color_var", color_var.clone()));
                }
                with_query(TRACK_WINDOW_PATH, &params)
            }
        }
    }
}

pub fn load_track_path(filename: &str) -> String {
    format!("{}/{}", LOAD_TRACK_PATH, urlencoding::encode(filename))
}

/// Join an API base (`""` for same origin) and a path.
pub fn api_url(base: &str, path_and_query: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}

fn with_query(path: &str, params: &[(&str, String)]) -> String {
    let query = params
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::RequestSequencer;
    use crate::timestamps::TrackTimestamp;
    use serde_json::json;

    fn bounds() -> WindowBounds {
        WindowBounds {
            start: TrackTimestamp::parse("2024-06-01T10:00:00").unwrap(),
            end: TrackTimestamp::parse("2024-06-01T10:05:30.5").unwrap(),
        }
    }

    #[test]
    fn load_track_accepts_valid_body() {
        let body = json!({
            "status": "ok",
            "total_points": 2,
            "timestamps": ["2024-06-01T10:00:00", "2024-06-01T10:00:01"]
        });
        let sequence = parse_load_track(&body).unwrap();
        assert_eq!(sequence.len(), 2);
    }

    #[test]
    fn load_track_accepts_empty_track() {
        let body = json!({ "total_points": 0, "timestamps": [] });
        assert!(parse_load_track(&body).unwrap().is_empty());
    }

    #[test]
    fn load_track_rejects_malformed_bodies() {
        assert_eq!(
            parse_load_track(&json!({ "timestamps": [] })),
            Err(TrackLoadError::MissingTotalPoints)
        );
        assert_eq!(
            parse_load_track(&json!({ "error": "Track not found" })),
            Err(TrackLoadError::MissingTotalPoints)
        );
        assert_eq!(
            parse_load_track(&json!({ "total_points": 1, "timestamps": "2024-06-01" })),
            Err(TrackLoadError::TimestampsNotSequence)
        );
        assert!(matches!(
            parse_load_track(&json!({ "total_points": 1, "timestamps": [42] })),
            Err(TrackLoadError::BadTimestamp(_))
        ));
    }

    #[test]
    fn gps_fix_requires_numeric_coordinates() {
        let valid: GpsInfoResponse = serde_json::from_value(json!({
            "gps_available": true,
            "latest_position": { "lat": 43.7, "lon": 10.4, "speed": 12.0 },
            "zoom": { "min": 12, "max": 16 }
        }))
        .unwrap();
        let fix = valid.latest_fix().unwrap();
        assert_eq!(fix.position, GeoPoint::new(43.7, 10.4).unwrap());
        assert_eq!(fix.speed_kmh, Some(12.0));
        assert_eq!(valid.zoom_range(), Some(ZoomRange::new(12, 16)));

        let no_fix: GpsInfoResponse =
            serde_json::from_value(json!({ "latest_position": null })).unwrap();
        assert!(no_fix.latest_fix().is_none());

        let text_lat: GpsInfoResponse = serde_json::from_value(json!({
            "latest_position": { "lat": "NaN", "lon": 10.4 }
        }))
        .unwrap();
        assert!(text_lat.latest_fix().is_none());

        let unavailable: GpsInfoResponse = serde_json::from_value(json!({
            "gps_available": false,
            "latest_position": { "lat": 43.7, "lon": 10.4 }
        }))
        .unwrap();
        assert!(unavailable.latest_fix().is_none());
        assert!(unavailable.zoom_range().is_none());
    }

    #[test]
    fn track_window_accepts_either_colour_spelling() {
        let body: TrackWindowResponse = serde_json::from_value(json!({
            "track": [{ "lat": 43.7, "lon": 10.4, "val": 3.5 }, { "lat": 43.71, "lon": 10.41, "val": null }],
            "thresholds": [1, 5, 15],
            "colors": ["a", "b", "c", "d"],
            "units": ""
        }))
        .unwrap();
        assert_eq!(body.colours.len(), 4);
        assert_eq!(body.track[0].value(), Some(3.5));
        assert_eq!(body.track[1].value(), None);
        assert!(body.track[1].position().is_some());
    }

    #[test]
    fn plot_data_keeps_variable_order() {
        let body: PlotDataResponse = serde_json::from_str(
            r#"{"timestamps":["2024-06-01T10:00:00"],"vars":{"z/last":[1.0],"a/first":[null]}}"#,
        )
        .unwrap();
        let keys: Vec<&String> = body.vars.keys().collect();
        assert_eq!(keys, vec!["z/last", "a/first"]);
        assert_eq!(body.vars["a/first"], vec![None]);
    }

    #[test]
    fn plot_data_from_json_value_keeps_variable_order() {
        let body: PlotDataResponse = serde_json::from_value(json!({
            "vars": { "rm1/gps/speed": [], "rm1/env/air_temp": [], "rm1/gps/lat": [] }
        }))
        .unwrap();
        let keys: Vec<&str> = body.vars.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["rm1/gps/speed", "rm1/env/air_temp", "rm1/gps/lat"]);
    }

    #[test]
    fn request_urls_are_encoded() {
        let mut sequencer = RequestSequencer::new();
        let plot = ApiRequest::PlotData {
            ticket: sequencer.issue(),
            purpose: PlotPurpose::Render,
            bounds: bounds(),
            vars: vec!["rm1/gps/speed".to_string(), "rm1/imu/heel".to_string()],
        };
        assert_eq!(
            plot.path_and_query(),
            "/api/track_plot_data?start=2024-06-01T10%3A00%3A00.000000\
             &end=2024-06-01T10%3A05%3A30.500000\
             &vars=rm1%2Fgps%2Fspeed%2Crm1%2Fimu%2Fheel"
        );

        let catalog = ApiRequest::PlotData {
            ticket: sequencer.issue(),
            purpose: PlotPurpose::Catalog,
            bounds: bounds(),
            vars: Vec::new(),
        };
        assert!(!catalog.path_and_query().contains("vars="));

        let track = ApiRequest::TrackWindow {
            ticket: sequencer.issue(),
            bounds: bounds(),
            stride: Stride::Every10,
            color_var: Some("rm1/gps/speed".to_string()),
        };
        let url = track.path_and_query();
        assert!(url.starts_with("/api/gps_track_window?start="));
        assert!(url.ends_with("&stride=10&color_var=rm1%2Fgps%2Fspeed"));
    }

    #[test]
    fn urls_join_base() {
        assert_eq!(api_url("", TRACK_LIST_PATH), "/api/track_list");
        assert_eq!(
            api_url("http://boat.local:5000/", &load_track_path("regatta 2024.json")),
            "http://boat.local:5000/api/load_track/regatta%202024.json"
        );
    }

    #[test]
    fn track_list_label_falls_back_to_filename() {
        let entries: Vec<TrackListEntry> = serde_json::from_value(json!([
            { "filename": "a.json", "label": "2024-06-01 10:00" },
            { "filename": "b.json", "label": "" },
            { "filename": "c.json" }
        ]))
        .unwrap();
        let labels: Vec<&str> = entries.iter().map(TrackListEntry::display_label).collect();
        assert_eq!(labels, vec!["2024-06-01 10:00", "b.json", "c.json"]);
    }
}
