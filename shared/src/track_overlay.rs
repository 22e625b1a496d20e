use crate::api::TrackWindowResponse;
use crate::color_scale::{ColorScale, ColorScaleError, LegendEntry, DEFAULT_TRACK_COLOR};
use crate::geo::GeoPoint;
use crate::variables::VariableCatalog;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSegment {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

/// The coloured track line and its legend, rebuilt from scratch for every
/// track-window response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackOverlay {
    pub segments: Vec<TrackSegment>,
    pub legend: Option<Legend>,
    /// Set when the response carried an unusable colour scale.
    pub scale_error: Option<ColorScaleError>,
}

impl TrackOverlay {
    pub fn build(
        response: &TrackWindowResponse,
        color_var: Option<&str>,
        catalog: &VariableCatalog,
    ) -> Self {
        let scale = ColorScale::new(response.thresholds.clone(), response.colours.clone());
        let points: Vec<(GeoPoint, Option<f64>)> = response
            .track
            .iter()
            .filter_map(|point| Some((point.position()?, point.value())))
            .collect();

        // Segment i -> i+1 takes the colour of point i.
        let segments = points
            .windows(2)
            .map(|pair| TrackSegment {
                from: pair[0].0,
                to: pair[1].0,
                color: match &scale {
                    Ok(scale) => scale.color_for(pair[0].1).to_string(),
                    Err(_) => DEFAULT_TRACK_COLOR.to_string(),
                },
            })
            .collect();

        let legend = match (&scale, color_var) {
            (Ok(scale), Some(key)) => Some(Legend {
                title: legend_title(key, response, catalog),
                entries: scale.legend(),
            }),
            _ => None,
        };

        Self {
            segments,
            legend,
            scale_error: scale.err(),
        }
    }
}

fn legend_title(key: &str, response: &TrackWindowResponse, catalog: &VariableCatalog) -> String {
    let name = response
        .aliases
        .get(key)
        .filter(|alias| !alias.is_empty())
        .map(String::as_str)
        .unwrap_or_else(|| catalog.label(key));
    match response.units.as_deref().filter(|units| !units.is_empty()) {
        Some(units) => format!("{} ({})", name, units),
        None => name.to_string(),
    }
}
