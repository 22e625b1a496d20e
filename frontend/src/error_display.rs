use crate::api_client::{FetchError, TrackLoadFailure};

/// A failure prepared for logging and, for track loads, for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorAlert {
    pub title: String,
    pub message: String,
    /// Full error text for the console.
    pub technical_error: String,
}

impl ErrorAlert {
    pub fn new_track_load_error(filename: &str, error: &TrackLoadFailure) -> Self {
        Self {
            title: "Track Loading Error".to_string(),
            message: format!("Failed to load track '{}'.", filename),
            technical_error: format!("Error loading track {}: {}", filename, error),
        }
    }

    pub fn new_fetch_error(context: &str, error: &FetchError) -> Self {
        Self {
            title: "Telemetry Request Error".to_string(),
            message: make_error_user_friendly(&error.to_string()),
            technical_error: format!("{}: {}", context, error),
        }
    }

    pub fn new_config_error(error: String) -> Self {
        Self {
            title: "Configuration Error".to_string(),
            message: make_error_user_friendly(&error),
            technical_error: format!("Dashboard config error: {}", error),
        }
    }
}

pub fn make_error_user_friendly(error: &str) -> String {
    let error_lower = error.to_lowercase();
    if error_lower.contains("http 404") {
        "The requested telemetry data was not found.".to_string()
    } else if error_lower.contains("http 5") {
        "The telemetry server reported an error.".to_string()
    } else if error_lower.contains("failed to fetch") || error_lower.contains("network") {
        "Connection error. Please check that the telemetry server is reachable.".to_string()
    } else if error_lower.contains("unexpected response body") {
        "The telemetry server sent data the dashboard cannot read.".to_string()
    } else {
        error.trim().to_string()
    }
}

/// Log to the browser console only. Used for background refreshes.
pub fn log_error_console_only(alert: ErrorAlert) {
    zoon::println!("Error: {}", alert.technical_error);
}

/// Log and interrupt the user with a modal browser notice.
pub fn show_blocking_alert(alert: ErrorAlert) {
    zoon::println!("Error: {}", alert.technical_error);
    let Some(window) = web_sys::window() else {
        return;
    };
    let text = format!("{}\n\n{}", alert.title, alert.message);
    if let Err(error) = window.alert_with_message(&text) {
        zoon::println!("Failed to show alert: {:?}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_get_plain_messages() {
        let error = FetchError::Status {
            url: "/api/load_track/x.json".to_string(),
            status: 404,
        };
        let alert = ErrorAlert::new_fetch_error("load track", &error);
        assert_eq!(alert.message, "The requested telemetry data was not found.");
        assert!(alert.technical_error.contains("HTTP 404"));
    }

    #[test]
    fn track_alert_names_the_track() {
        let failure = TrackLoadFailure::Invalid(shared::TrackLoadError::MissingTotalPoints);
        let alert = ErrorAlert::new_track_load_error("regatta_2024.json", &failure);
        assert_eq!(alert.message, "Failed to load track 'regatta_2024.json'.");
        assert!(alert.technical_error.ends_with("response has no 'total_points'"));
    }

    #[test]
    fn unknown_errors_pass_through_trimmed() {
        assert_eq!(make_error_user_friendly("  odd failure \n"), "odd failure");
    }
}
