use serde::{Deserialize, Serialize};

/// Colour used for track segments when no usable scale is available.
pub const DEFAULT_TRACK_COLOR: &str = "#3388ff";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorScaleError {
    #[error("{colors} colours for {thresholds} thresholds, expected {}", .thresholds + 1)]
    ColorCountMismatch { thresholds: usize, colors: usize },
    #[error("thresholds must be finite and ascending, found {0:?}")]
    UnorderedThresholds(Vec<f64>),
}

/// Threshold buckets mapping a value to a display colour.
///
/// `N` ascending thresholds split the value axis into `N + 1` half-open
/// buckets; bucket `i` covers `[t(i-1), t(i))` and the last bucket is
/// open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    thresholds: Vec<f64>,
    colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}

impl ColorScale {
    pub fn new(thresholds: Vec<f64>, colors: Vec<String>) -> Result<Self, ColorScaleError> {
        if colors.len() != thresholds.len() + 1 {
            return Err(ColorScaleError::ColorCountMismatch {
                thresholds: thresholds.len(),
                colors: colors.len(),
            });
        }
        let ordered = thresholds.iter().all(|value| value.is_finite())
            && thresholds.windows(2).all(|pair| pair[0] < pair[1]);
        if !ordered {
            return Err(ColorScaleError::UnorderedThresholds(thresholds));
        }
        Ok(Self { thresholds, colors })
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Colour for a sample value. Missing values take the first colour.
    pub fn color_for(&self, value: Option<f64>) -> &str {
        let Some(value) = value.filter(|value| !value.is_nan()) else {
            return &self.colors[0];
        };
        let bucket = self
            .thresholds
            .iter()
            .position(|threshold| value < *threshold)
            .unwrap_or(self.thresholds.len());
        &self.colors[bucket]
    }

    /// One legend row per bucket, lowest first.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let Some(last) = self.thresholds.last() else {
            return vec![LegendEntry {
                color: self.colors[0].clone(),
                label: "all values".to_string(),
            }];
        };
        let mut entries = Vec::with_capacity(self.colors.len());
        entries.push(LegendEntry {
            color: self.colors[0].clone(),
            label: format!("< {}", format_threshold(self.thresholds[0])),
        });
        for (index, pair) in self.thresholds.windows(2).enumerate() {
            entries.push(LegendEntry {
                color: self.colors[index + 1].clone(),
                label: format!(
                    "{}–{}",
                    format_threshold(pair[0]),
                    format_threshold(pair[1])
                ),
            });
        }
        entries.push(LegendEntry {
            color: self.colors[self.thresholds.len()].clone(),
            label: format!("≥ {}", format_threshold(*last)),
        });
        entries
    }
}

/// Shortest readable form: `5`, `2.5`, `0.125`.
/// Shortest text that reads back as the same number, so distinct
/// thresholds never print alike.
pub fn format_threshold(value: f64) -> String {
    format!("{}", value)
}
