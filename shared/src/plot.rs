use crate::api::PlotDataResponse;
use crate::timestamps::TrackTimestamp;
use crate::units::UnitPreferences;
use crate::variables::{VariableCatalog, VariableCategory};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    /// Seconds since the epoch of the sample's wall-clock time.
    pub time: f64,
    /// Converted value; `None` is drawn as a gap.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub key: String,
    pub label: String,
    pub category: VariableCategory,
    pub points: Vec<PlotPoint>,
}

/// Everything the chart needs to draw one plot-data response.
///
/// Units and theme are captured when the frame is built, so a later
/// preference change only shows up with the next refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotFrame {
    pub series: Vec<PlotSeries>,
    pub dark_mode: bool,
    pub time_range: Option<(f64, f64)>,
    pub value_range: Option<(f64, f64)>,
    pub start_label: Option<String>,
    pub end_label: Option<String>,
}

impl PlotFrame {
    pub fn build(
        response: &PlotDataResponse,
        catalog: &VariableCatalog,
        units: UnitPreferences,
        dark_mode: bool,
    ) -> Self {
        let times: Vec<Option<TrackTimestamp>> = response
            .timestamps
            .iter()
            .map(|raw| TrackTimestamp::parse(raw).ok())
            .collect();

        let series: Vec<PlotSeries> = response
            .vars
            .iter()
            .map(|(key, values)| {
                let category = catalog
                    .get(key)
                    .map(|info| info.category)
                    .unwrap_or_else(|| VariableCategory::classify(key));
                let points = times
                    .iter()
                    .zip(values)
                    .filter_map(|(time, value)| {
                        Some(PlotPoint {
                            time: time.as_ref()?.epoch_seconds(),
                            value: value
                                .filter(|value| value.is_finite())
                                .map(|value| units.convert(category, value)),
                        })
                    })
                    .collect();
                PlotSeries {
                    key: key.clone(),
                    label: series_label(key, response, catalog, units, category),
                    category,
                    points,
                }
            })
            .collect();

        let time_range = min_max(series.iter().flat_map(|s| s.points.iter().map(|p| p.time)));
        let value_range = min_max(
            series
                .iter()
                .flat_map(|s| s.points.iter().filter_map(|p| p.value)),
        );
        let start_label = times.iter().flatten().next().map(TrackTimestamp::display_label);
        let end_label = times.iter().flatten().last().map(TrackTimestamp::display_label);

        Self {
            series,
            dark_mode,
            time_range,
            value_range,
            start_label,
            end_label,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|series| series.points.is_empty())
    }
}

fn series_label(
    key: &str,
    response: &PlotDataResponse,
    catalog: &VariableCatalog,
    units: UnitPreferences,
    category: VariableCategory,
) -> String {
    let name = response
        .aliases
        .get(key)
        .filter(|alias| !alias.is_empty())
        .map(String::as_str)
        .unwrap_or_else(|| catalog.label(key));
    match units.symbol(category) {
        Some(symbol) => format!("{} ({})", name, symbol),
        None => name.to_string(),
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |range, value| match range {
        None => Some((value, value)),
        Some((low, high)) => Some((low.min(value), high.max(value))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{SpeedUnit, TemperatureUnit};
    use serde_json::json;
    use std::collections::HashMap;

    fn response() -> PlotDataResponse {
        serde_json::from_value(json!({
            "timestamps": ["2024-06-01T10:00:00", "2024-06-01T10:00:01", "2024-06-01T10:00:02"],
            "vars": {
                "rm1/gps/speed": [10.0, null, 20.0],
                "rm1/env/air_temp": [293.15, 294.15, 295.15],
                "rm1/imu/heel": [1.0, 2.0, 3.0]
            },
            "aliases": { "rm1/gps/speed": "Boat speed" }
        }))
        .unwrap()
    }

    #[test]
    fn converts_and_labels_by_category() {
        let response = response();
        let catalog = VariableCatalog::from_keys(response.vars.keys(), &HashMap::new());
        let units = UnitPreferences {
            speed: SpeedUnit::Knots,
            temperature: TemperatureUnit::Celsius,
        };
        let frame = PlotFrame::build(&response, &catalog, units, true);

        let labels: Vec<&str> = frame.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Boat speed (kn)", "rm1/env/air_temp (°C)", "rm1/imu/heel"]);

        let speed = &frame.series[0];
        assert!((speed.points[0].value.unwrap() - 5.39957).abs() < 1e-9);
        assert_eq!(speed.points[1].value, None);
        assert!((frame.series[1].points[0].value.unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(frame.series[2].points[2].value, Some(3.0));
        assert!(frame.dark_mode);
    }

    #[test]
    fn ranges_and_labels_follow_samples() {
        let response = response();
        let catalog = VariableCatalog::default();
        let frame = PlotFrame::build(&response, &catalog, UnitPreferences::default(), false);
        let (start, end) = frame.time_range.unwrap();
        assert!((end - start - 2.0).abs() < 1e-9);
        assert_eq!(frame.start_label.as_deref(), Some("2024-06-01 10:00:00"));
        assert_eq!(frame.end_label.as_deref(), Some("2024-06-01 10:00:02"));
        let (low, high) = frame.value_range.unwrap();
        assert!((low - 1.0).abs() < 1e-9);
        assert!((high - 22.0).abs() < 1e-9);
    }

    #[test]
    fn empty_response_has_no_ranges() {
        let frame = PlotFrame::build(
            &PlotDataResponse::default(),
            &VariableCatalog::default(),
            UnitPreferences::default(),
            false,
        );
        assert!(frame.is_empty());
        assert_eq!(frame.time_range, None);
        assert_eq!(frame.value_range, None);
    }
}
