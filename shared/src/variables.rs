use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// How many variables are pre-checked when a track's catalog arrives.
pub const DEFAULT_SELECTION_SIZE: usize = 3;

const GPS_SEGMENT: &str = "/gps/";

/// Measurement category of a telemetry variable.
///
/// Resolved once from the variable key when the catalog is built; plot and
/// map code dispatch on this tag instead of inspecting key strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableCategory {
    Speed,
    Temperature,
    Latitude,
    Longitude,
    Other,
}

impl VariableCategory {
    pub fn classify(key: &str) -> Self {
        let key = key.to_ascii_lowercase();
        if key.ends_with("/gps/lat") {
            VariableCategory::Latitude
        } else if key.ends_with("/gps/long") || key.ends_with("/gps/lon") {
            VariableCategory::Longitude
        } else if key.contains("speed") {
            VariableCategory::Speed
        } else if key.contains("temp") {
            VariableCategory::Temperature
        } else {
            VariableCategory::Other
        }
    }

    pub fn is_coordinate(self) -> bool {
        matches!(self, VariableCategory::Latitude | VariableCategory::Longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub key: String,
    pub alias: Option<String>,
    pub category: VariableCategory,
}

impl VariableInfo {
    pub fn new(key: impl Into<String>, alias: Option<String>) -> Self {
        let key = key.into();
        let category = VariableCategory::classify(&key);
        // An alias equal to the key carries no information.
        let alias = alias.filter(|alias| !alias.is_empty() && *alias != key);
        Self {
            key,
            alias,
            category,
        }
    }

    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.key)
    }

    pub fn is_gps_adjacent(&self) -> bool {
        self.key.contains(GPS_SEGMENT)
    }

    pub fn is_color_candidate(&self) -> bool {
        self.is_gps_adjacent() && !self.category.is_coordinate()
    }
}

/// Variables discovered for the loaded track, in backend listing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableCatalog {
    variables: IndexMap<String, VariableInfo>,
}

impl VariableCatalog {
    pub fn from_keys<'a>(
        keys: impl IntoIterator<Item = &'a String>,
        aliases: &HashMap<String, String>,
    ) -> Self {
        let variables = keys
            .into_iter()
            .map(|key| {
                let info = VariableInfo::new(key.clone(), aliases.get(key).cloned());
                (key.clone(), info)
            })
            .collect();
        Self { variables }
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn get(&self, key: &str) -> Option<&VariableInfo> {
        self.variables.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableInfo> {
        self.variables.values()
    }

    /// Display label for a key; unknown keys fall back to the key itself.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map(VariableInfo::label).unwrap_or(key)
    }

    pub fn default_selection(&self) -> IndexSet<String> {
        self.variables
            .keys()
            .take(DEFAULT_SELECTION_SIZE)
            .cloned()
            .collect()
    }

    /// Variables offered in the colour-by dropdown.
    pub fn color_candidates(&self) -> impl Iterator<Item = &VariableInfo> {
        self.iter().filter(|info| info.is_color_candidate())
    }

    pub fn is_color_candidate(&self, key: &str) -> bool {
        self.get(key).is_some_and(VariableInfo::is_color_candidate)
    }
}
