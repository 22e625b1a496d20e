//! Telemetry Dashboard Main Entry Point

use std::sync::OnceLock;
use zoon::*;

/// Stores the main application task handle to prevent it from being dropped.
static MAIN_TASK: OnceLock<TaskHandle> = OnceLock::new();

/// Keeps the app's actors running for the lifetime of the page.
static APP: OnceLock<app::DashboardApp> = OnceLock::new();

mod api_client;
mod app;
mod colors;
mod connection;
mod controller;
mod controls;
mod dataflow;
mod error_display;
mod legend_panel;
mod map_view;
mod plot_canvas;
mod preferences;
mod scrub_slider;
mod settings;

pub fn main() {
    let handle = Task::start_droppable(async {
        let app = crate::app::DashboardApp::new().await;
        let app = APP.get_or_init(|| app);
        zoon::println!(
            "Dashboard starting ({} map)",
            if app.config.online { "online" } else { "offline" }
        );
        let root_element = app.root();
        start_app("app", move || root_element);
    });
    let _ = MAIN_TASK.set(handle);
}
