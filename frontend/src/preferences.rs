//! Display preferences kept in the browser's local storage.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::UnitPreferences;

pub const UNIT_PREFERENCES_KEY: &str = "telemetry.unit_preferences";
pub const DARK_MODE_KEY: &str = "telemetry.dark_mode";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = local_storage()?.get_item(key).ok().flatten()?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            zoon::println!("Ignoring stored '{}': {}", key, error);
            None
        }
    }
}

fn store<T: Serialize>(key: &str, value: &T) {
    let Some(storage) = local_storage() else {
        zoon::println!("Local storage unavailable, '{}' not saved", key);
        return;
    };
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(error) => {
            zoon::println!("Failed to serialize '{}': {}", key, error);
            return;
        }
    };
    if let Err(error) = storage.set_item(key, &raw) {
        zoon::println!("Failed to save '{}': {:?}", key, error);
    }
}

pub fn load_unit_preferences() -> UnitPreferences {
    load(UNIT_PREFERENCES_KEY).unwrap_or_default()
}

pub fn save_unit_preferences(preferences: &UnitPreferences) {
    store(UNIT_PREFERENCES_KEY, preferences);
}

pub fn load_dark_mode() -> bool {
    load(DARK_MODE_KEY).unwrap_or(false)
}

pub fn save_dark_mode(dark_mode: bool) {
    store(DARK_MODE_KEY, &dark_mode);
}
