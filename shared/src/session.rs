//! State of one dashboard page: the loaded track, the scrub window, the
//! variable selection and the latest data applied to each view.
//!
//! The session never performs IO. Every mutation returns the API requests
//! it wants sent, and every response is handed back together with the
//! ticket it was requested under. Responses that are no longer the newest
//! for their view are rejected with [`StaleResponse`].

use std::fmt;

use indexmap::IndexSet;

use crate::api::{ApiRequest, GpsInfoResponse, PlotDataResponse, PlotPurpose, TrackWindowResponse};
use crate::geo::{GeoPoint, GpsFix, ZoomRange};
use crate::plot::PlotFrame;
use crate::scrub::{ScrubWindow, Stride, WindowBounds};
use crate::sequence::{RequestSequencer, RequestTicket};
use crate::timestamps::TimestampSequence;
use crate::track_overlay::TrackOverlay;
use crate::units::UnitPreferences;
use crate::variables::VariableCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Plot,
    Map,
    Gps,
    Catalog,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Plot => "plot",
            View::Map => "map track",
            View::Gps => "gps",
            View::Catalog => "variable catalog",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("discarded stale {view} response (ticket {ticket})")]
pub struct StaleResponse {
    pub view: View,
    pub ticket: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GpsStatus {
    /// No GPS response applied yet.
    #[default]
    Unknown,
    Unavailable,
    Fix(GpsFix),
}

/// The single map of the page. Created by the first valid fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapState {
    pub center: GeoPoint,
    pub zoom: u8,
    pub zoom_range: ZoomRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpsOutcome {
    Unavailable,
    MapCreated(GpsFix),
    Panned(GpsFix),
}

#[derive(Debug, Clone, Default)]
pub struct DashboardSession {
    track: Option<String>,
    timestamps: TimestampSequence,
    window: Option<ScrubWindow>,
    slider_generation: u64,
    catalog: VariableCatalog,
    selected: IndexSet<String>,
    color_var: Option<String>,
    stride: Stride,
    units: UnitPreferences,
    dark_mode: bool,
    default_zoom: u8,
    plot_requests: RequestSequencer,
    map_requests: RequestSequencer,
    gps_requests: RequestSequencer,
    catalog_requests: RequestSequencer,
    plot: Option<PlotFrame>,
    overlay: Option<TrackOverlay>,
    gps: GpsStatus,
    map: Option<MapState>,
}

impl DashboardSession {
    pub fn new(units: UnitPreferences, dark_mode: bool, default_zoom: u8) -> Self {
        Self {
            units,
            dark_mode,
            default_zoom,
            ..Self::default()
        }
    }

    // ===== READ ACCESS =====

    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    pub fn timestamps(&self) -> &TimestampSequence {
        &self.timestamps
    }

    pub fn window(&self) -> Option<ScrubWindow> {
        self.window
    }

    pub fn window_bounds(&self) -> Option<WindowBounds> {
        self.timestamps.bounds(self.window?)
    }

    /// Start and end labels shown next to the slider.
    pub fn window_labels(&self) -> Option<(String, String)> {
        self.window_bounds().map(|bounds| bounds.labels())
    }

    /// Changes every time the timestamp sequence is replaced; the slider is
    /// rebuilt whenever it changes.
    pub fn slider_generation(&self) -> u64 {
        self.slider_generation
    }

    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    pub fn selected(&self) -> &IndexSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    pub fn color_var(&self) -> Option<&str> {
        self.color_var.as_deref()
    }

    pub fn stride(&self) -> Stride {
        self.stride
    }

    pub fn units(&self) -> UnitPreferences {
        self.units
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn plot(&self) -> Option<&PlotFrame> {
        self.plot.as_ref()
    }

    pub fn overlay(&self) -> Option<&TrackOverlay> {
        self.overlay.as_ref()
    }

    pub fn gps_status(&self) -> GpsStatus {
        self.gps
    }

    pub fn gps_unavailable(&self) -> bool {
        self.gps == GpsStatus::Unavailable
    }

    pub fn map(&self) -> Option<MapState> {
        self.map
    }

    // ===== USER ACTIONS =====

    /// Replace the loaded track.
    ///
    /// A non-empty track resets the window to its full range and starts a
    /// full scrub pass plus a catalog query. An empty track clears every
    /// view and only refreshes the GPS status.
    pub fn track_loaded(
        &mut self,
        filename: impl Into<String>,
        timestamps: TimestampSequence,
    ) -> Vec<ApiRequest> {
        self.track = Some(filename.into());
        self.timestamps = timestamps;
        self.slider_generation += 1;
        self.window = self.timestamps.full_window();
        // Variables are listed again by the catalog query of the new track.
        self.catalog = VariableCatalog::default();
        self.selected.clear();

        let Some(bounds) = self.window_bounds() else {
            self.color_var = None;
            self.clear_plot();
            self.clear_overlay();
            self.catalog_requests.invalidate();
            return vec![self.gps_refresh()];
        };

        let mut requests = self.scrub_pass(bounds);
        requests.push(ApiRequest::PlotData {
            ticket: self.catalog_requests.issue(),
            purpose: PlotPurpose::Catalog,
            bounds,
            vars: Vec::new(),
        });
        requests
    }

    /// Move the slider handles. Indices are clamped onto the loaded track.
    pub fn move_window(&mut self, start: usize, end: usize) -> Vec<ApiRequest> {
        let Some(window) = ScrubWindow::new(start, end, self.timestamps.len()) else {
            return Vec::new();
        };
        self.window = Some(window);
        match self.window_bounds() {
            Some(bounds) => self.scrub_pass(bounds),
            None => Vec::new(),
        }
    }

    pub fn set_variable_selected(&mut self, key: &str, selected: bool) -> Vec<ApiRequest> {
        let changed = if selected {
            self.selected.insert(key.to_string())
        } else {
            self.selected.shift_remove(key)
        };
        if !changed {
            return Vec::new();
        }
        self.view_refreshes()
    }

    pub fn set_stride(&mut self, stride: Stride) -> Vec<ApiRequest> {
        if self.stride == stride {
            return Vec::new();
        }
        self.stride = stride;
        self.map_refresh().into_iter().collect()
    }

    /// Pick the colour-by variable. Keys that are not colour candidates of
    /// the current catalog clear the choice.
    pub fn set_color_var(&mut self, key: Option<&str>) -> Vec<ApiRequest> {
        let color_var = key
            .filter(|key| self.catalog.is_color_candidate(key))
            .map(str::to_string);
        if self.color_var == color_var {
            return Vec::new();
        }
        self.color_var = color_var;
        self.map_refresh().into_iter().collect()
    }

    /// New unit preferences apply from the next plot refresh on.
    pub fn set_units(&mut self, units: UnitPreferences) -> Vec<ApiRequest> {
        if self.units == units {
            return Vec::new();
        }
        self.units = units;
        self.plot_refresh().into_iter().collect()
    }

    /// Theme applies from the next plot refresh on.
    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
    }

    pub fn set_map_zoom(&mut self, zoom: u8) {
        if let Some(map) = &mut self.map {
            map.zoom = map.zoom_range.clamp(zoom);
        }
    }

    /// Zoom in (positive) or out (negative) by whole levels.
    pub fn step_map_zoom(&mut self, step: i8) {
        if let Some(map) = self.map {
            self.set_map_zoom(map.zoom.saturating_add_signed(step));
        }
    }

    // ===== RESPONSES =====

    /// Fill the checklist and colour-by choices from a full-window query.
    pub fn apply_catalog(
        &mut self,
        ticket: RequestTicket,
        response: &PlotDataResponse,
    ) -> Result<Vec<ApiRequest>, StaleResponse> {
        check(&self.catalog_requests, View::Catalog, ticket)?;
        self.catalog = VariableCatalog::from_keys(response.vars.keys(), &response.aliases);
        self.selected = self.catalog.default_selection();
        if let Some(current) = self.color_var.as_deref() {
            if !self.catalog.is_color_candidate(current) {
                self.color_var = None;
            }
        }
        Ok(self.view_refreshes())
    }

    pub fn apply_plot(
        &mut self,
        ticket: RequestTicket,
        response: &PlotDataResponse,
    ) -> Result<(), StaleResponse> {
        check(&self.plot_requests, View::Plot, ticket)?;
        self.plot = Some(PlotFrame::build(
            response,
            &self.catalog,
            self.units,
            self.dark_mode,
        ));
        Ok(())
    }

    pub fn apply_track(
        &mut self,
        ticket: RequestTicket,
        response: &TrackWindowResponse,
    ) -> Result<&TrackOverlay, StaleResponse> {
        check(&self.map_requests, View::Map, ticket)?;
        let overlay = TrackOverlay::build(response, self.color_var.as_deref(), &self.catalog);
        let overlay: &TrackOverlay = self.overlay.insert(overlay);
        Ok(overlay)
    }

    /// Apply a GPS status response. `None` stands for a body that could not
    /// be decoded and counts as "no fix".
    pub fn apply_gps(
        &mut self,
        ticket: RequestTicket,
        response: Option<&GpsInfoResponse>,
    ) -> Result<GpsOutcome, StaleResponse> {
        check(&self.gps_requests, View::Gps, ticket)?;
        let zoom_range = response.and_then(GpsInfoResponse::zoom_range);
        let Some(fix) = response.and_then(GpsInfoResponse::latest_fix) else {
            self.gps = GpsStatus::Unavailable;
            return Ok(GpsOutcome::Unavailable);
        };
        self.gps = GpsStatus::Fix(fix);

        if let Some(map) = self.map.as_mut() {
            map.center = fix.position;
            if let Some(range) = zoom_range {
                map.zoom_range = range;
                map.zoom = range.clamp(map.zoom);
            }
            return Ok(GpsOutcome::Panned(fix));
        }

        let zoom_range = zoom_range.unwrap_or_default();
        self.map = Some(MapState {
            center: fix.position,
            zoom: zoom_range.clamp(self.default_zoom),
            zoom_range,
        });
        Ok(GpsOutcome::MapCreated(fix))
    }

    // ===== REQUEST BUILDING =====

    fn scrub_pass(&mut self, bounds: WindowBounds) -> Vec<ApiRequest> {
        let mut requests = vec![ApiRequest::ScrubWindow { bounds }, self.gps_refresh()];
        requests.extend(self.view_refreshes());
        requests
    }

    fn view_refreshes(&mut self) -> Vec<ApiRequest> {
        self.plot_refresh().into_iter().chain(self.map_refresh()).collect()
    }

    fn gps_refresh(&mut self) -> ApiRequest {
        ApiRequest::GpsInfo {
            ticket: self.gps_requests.issue(),
        }
    }

    /// An empty selection clears the plot without asking the API.
    fn plot_refresh(&mut self) -> Option<ApiRequest> {
        if self.selected.is_empty() {
            self.clear_plot();
            return None;
        }
        let bounds = self.window_bounds()?;
        Some(ApiRequest::PlotData {
            ticket: self.plot_requests.issue(),
            purpose: PlotPurpose::Render,
            bounds,
            vars: self.selected.iter().cloned().collect(),
        })
    }

    fn map_refresh(&mut self) -> Option<ApiRequest> {
        let bounds = self.window_bounds()?;
        Some(ApiRequest::TrackWindow {
            ticket: self.map_requests.issue(),
            bounds,
            stride: self.stride,
            color_var: self.color_var.clone(),
        })
    }

    fn clear_plot(&mut self) {
        self.plot = None;
        self.plot_requests.invalidate();
    }

    fn clear_overlay(&mut self) {
        self.overlay = None;
        self.map_requests.invalidate();
    }
}

fn check(sequencer: &RequestSequencer, view: View, ticket: RequestTicket) -> Result<(), StaleResponse> {
    if sequencer.is_latest(ticket) {
        Ok(())
    } else {
        Err(StaleResponse {
            view,
            ticket: ticket.value(),
        })
    }
}
