//! Track Scrub & Visualization Controller.
//!
//! One actor owns the [`DashboardSession`]. UI events and API responses
//! reach it through relays; every request the session asks for is started as
//! its own task, so slow responses never block the event loop.

use futures::{select, StreamExt};
use zoon::{Mutable, Task};

use crate::api_client::{ApiClient, FetchError, TrackLoadFailure};
use crate::dataflow::{relay, Actor, Relay};
use crate::error_display::{log_error_console_only, show_blocking_alert, ErrorAlert};
use crate::preferences;
use shared::{
    ApiRequest, ClientConfig, DashboardSession, GpsInfoResponse, GpsOutcome, PlotDataResponse,
    PlotPurpose, RequestSequencer, RequestTicket, Stride, TileSource, TimestampSequence,
    TrackListEntry, TrackWindowResponse, UnitPreferences,
};

type TrackFetched = (RequestTicket, String, Result<TimestampSequence, TrackLoadFailure>);
type PlotFetched = (RequestTicket, PlotPurpose, Result<PlotDataResponse, FetchError>);
type TrackWindowFetched = (RequestTicket, Result<TrackWindowResponse, FetchError>);
type GpsFetched = (RequestTicket, Result<GpsInfoResponse, FetchError>);

#[derive(Clone)]
pub struct TelemetryController {
    pub session: Actor<DashboardSession>,
    pub track_list: Actor<Vec<TrackListEntry>>,
    pub tile_source: TileSource,

    pub track_selected_relay: Relay<String>,
    pub slider_moved_relay: Relay<(usize, usize)>,
    pub variable_toggled_relay: Relay<(String, bool)>,
    pub stride_selected_relay: Relay<Stride>,
    pub color_var_selected_relay: Relay<Option<String>>,
    pub units_saved_relay: Relay<UnitPreferences>,
    pub dark_mode_toggled_relay: Relay<bool>,
    pub map_zoom_stepped_relay: Relay<i8>,
}

/// Relays through which request tasks report back to the session actor.
#[derive(Clone)]
struct ResponseRelays {
    track_fetched_relay: Relay<TrackFetched>,
    plot_fetched_relay: Relay<PlotFetched>,
    track_window_fetched_relay: Relay<TrackWindowFetched>,
    gps_fetched_relay: Relay<GpsFetched>,
}

impl TelemetryController {
    pub fn new(config: &ClientConfig) -> Self {
        let client = ApiClient::new(config.api_base_url.clone());

        let (track_selected_relay, mut track_selected_stream) = relay();
        let (slider_moved_relay, mut slider_moved_stream) = relay();
        let (variable_toggled_relay, mut variable_toggled_stream) = relay();
        let (stride_selected_relay, mut stride_selected_stream) = relay();
        let (color_var_selected_relay, mut color_var_selected_stream) = relay();
        let (units_saved_relay, mut units_saved_stream) = relay();
        let (dark_mode_toggled_relay, mut dark_mode_toggled_stream) = relay();
        let (map_zoom_stepped_relay, mut map_zoom_stepped_stream) = relay();

        let (track_fetched_relay, mut track_fetched_stream) = relay::<TrackFetched>();
        let (plot_fetched_relay, mut plot_fetched_stream) = relay::<PlotFetched>();
        let (track_window_fetched_relay, mut track_window_fetched_stream) =
            relay::<TrackWindowFetched>();
        let (gps_fetched_relay, mut gps_fetched_stream) = relay::<GpsFetched>();
        let responses = ResponseRelays {
            track_fetched_relay,
            plot_fetched_relay,
            track_window_fetched_relay,
            gps_fetched_relay,
        };

        let initial = DashboardSession::new(
            preferences::load_unit_preferences(),
            preferences::load_dark_mode(),
            config.default_zoom,
        );

        let session = Actor::new(initial, {
            let client = client.clone();
            async move |state| {
                let mut track_loads = RequestSequencer::new();
                loop {
                    select! {
                        Some(filename) = track_selected_stream.next() => {
                            zoon::println!("Loading track '{}'", filename);
                            let ticket = track_loads.issue();
                            spawn_track_load(&client, &responses, ticket, filename);
                        }
                        Some((ticket, filename, result)) = track_fetched_stream.next() => {
                            if track_loads.is_latest(ticket) {
                                apply_track_load(&state, &client, &responses, filename, result);
                            } else {
                                zoon::println!("Discarded superseded load of '{}'", filename);
                            }
                        }
                        Some((start, end)) = slider_moved_stream.next() => {
                            let requests = state.lock_mut().move_window(start, end);
                            dispatch(&client, &responses, requests);
                        }
                        Some((key, selected)) = variable_toggled_stream.next() => {
                            let requests = state.lock_mut().set_variable_selected(&key, selected);
                            dispatch(&client, &responses, requests);
                        }
                        Some(stride) = stride_selected_stream.next() => {
                            let requests = state.lock_mut().set_stride(stride);
                            dispatch(&client, &responses, requests);
                        }
                        Some(color_var) = color_var_selected_stream.next() => {
                            let requests = state.lock_mut().set_color_var(color_var.as_deref());
                            dispatch(&client, &responses, requests);
                        }
                        Some(units) = units_saved_stream.next() => {
                            preferences::save_unit_preferences(&units);
                            let requests = state.lock_mut().set_units(units);
                            dispatch(&client, &responses, requests);
                        }
                        Some(dark_mode) = dark_mode_toggled_stream.next() => {
                            preferences::save_dark_mode(dark_mode);
                            state.lock_mut().set_dark_mode(dark_mode);
                        }
                        Some(step) = map_zoom_stepped_stream.next() => {
                            state.lock_mut().step_map_zoom(step);
                        }
                        Some((ticket, purpose, result)) = plot_fetched_stream.next() => {
                            apply_plot_result(&state, &client, &responses, ticket, purpose, result);
                        }
                        Some((ticket, result)) = track_window_fetched_stream.next() => {
                            apply_track_window_result(&state, ticket, result);
                        }
                        Some((ticket, result)) = gps_fetched_stream.next() => {
                            apply_gps_result(&state, ticket, result);
                        }
                    }
                }
            }
        });

        let (track_list_loaded_relay, mut track_list_loaded_stream) = relay();
        let track_list = Actor::new(Vec::new(), async move |state| {
            while let Some(entries) = track_list_loaded_stream.next().await {
                state.set(entries);
            }
        });
        Task::start(async move {
            match client.track_list().await {
                Ok(entries) => {
                    zoon::println!("{} tracks available", entries.len());
                    track_list_loaded_relay.send(entries);
                }
                Err(error) => {
                    log_error_console_only(ErrorAlert::new_fetch_error("track list", &error))
                }
            }
        });

        Self {
            session,
            track_list,
            tile_source: config.tile_source(),
            track_selected_relay,
            slider_moved_relay,
            variable_toggled_relay,
            stride_selected_relay,
            color_var_selected_relay,
            units_saved_relay,
            dark_mode_toggled_relay,
            map_zoom_stepped_relay,
        }
    }
}

// ===== RESPONSE HANDLING =====

fn apply_track_load(
    state: &Mutable<DashboardSession>,
    client: &ApiClient,
    responses: &ResponseRelays,
    filename: String,
    result: Result<TimestampSequence, TrackLoadFailure>,
) {
    match result {
        Ok(timestamps) => {
            zoon::println!("Track '{}' loaded with {} points", filename, timestamps.len());
            let requests = state.lock_mut().track_loaded(filename, timestamps);
            dispatch(client, responses, requests);
        }
        Err(error) => show_blocking_alert(ErrorAlert::new_track_load_error(&filename, &error)),
    }
}

fn apply_plot_result(
    state: &Mutable<DashboardSession>,
    client: &ApiClient,
    responses: &ResponseRelays,
    ticket: RequestTicket,
    purpose: PlotPurpose,
    result: Result<PlotDataResponse, FetchError>,
) {
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            log_error_console_only(ErrorAlert::new_fetch_error("plot data", &error));
            return;
        }
    };
    let applied = match purpose {
        PlotPurpose::Catalog => state
            .lock_mut()
            .apply_catalog(ticket, &response)
            .map(|requests| dispatch(client, responses, requests)),
        PlotPurpose::Render => state.lock_mut().apply_plot(ticket, &response),
    };
    if let Err(stale) = applied {
        zoon::println!("{}", stale);
    }
}

fn apply_track_window_result(
    state: &Mutable<DashboardSession>,
    ticket: RequestTicket,
    result: Result<TrackWindowResponse, FetchError>,
) {
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            log_error_console_only(ErrorAlert::new_fetch_error("map track", &error));
            return;
        }
    };
    match state.lock_mut().apply_track(ticket, &response) {
        Ok(overlay) => {
            if let Some(error) = &overlay.scale_error {
                zoon::println!("Track colour scale ignored: {}", error);
            }
        }
        Err(stale) => zoon::println!("{}", stale),
    }
}

/// Undecodable bodies count as "no fix"; transport failures keep the last
/// known GPS state.
fn apply_gps_result(
    state: &Mutable<DashboardSession>,
    ticket: RequestTicket,
    result: Result<GpsInfoResponse, FetchError>,
) {
    let response = match result {
        Ok(response) => Some(response),
        Err(error @ FetchError::Decode { .. }) => {
            zoon::println!("GPS status unreadable, treating as no fix: {}", error);
            None
        }
        Err(error) => {
            log_error_console_only(ErrorAlert::new_fetch_error("gps info", &error));
            return;
        }
    };
    match state.lock_mut().apply_gps(ticket, response.as_ref()) {
        Ok(GpsOutcome::MapCreated(fix)) => zoon::println!(
            "Map created at {:.5}, {:.5}",
            fix.position.lat,
            fix.position.lon
        ),
        Ok(GpsOutcome::Panned(_)) => {}
        Ok(GpsOutcome::Unavailable) => zoon::println!("GPS unavailable"),
        Err(stale) => zoon::println!("{}", stale),
    }
}

// ===== REQUEST EXECUTION =====

fn spawn_track_load(
    client: &ApiClient,
    responses: &ResponseRelays,
    ticket: RequestTicket,
    filename: String,
) {
    let client = client.clone();
    let responses = responses.clone();
    Task::start(async move {
        let result = client.load_track(&filename).await;
        responses.track_fetched_relay.send((ticket, filename, result));
    });
}

fn dispatch(client: &ApiClient, responses: &ResponseRelays, requests: Vec<ApiRequest>) {
    for request in requests {
        let client = client.clone();
        let responses = responses.clone();
        Task::start(execute(client, responses, request));
    }
}

async fn execute(client: ApiClient, responses: ResponseRelays, request: ApiRequest) {
    match &request {
        ApiRequest::ScrubWindow { .. } => {
            if let Err(error) = client.notify(&request).await {
                log_error_console_only(ErrorAlert::new_fetch_error("scrub window", &error));
            }
        }
        ApiRequest::GpsInfo { ticket } => {
            let result = client.fetch(&request).await;
            responses.gps_fetched_relay.send((*ticket, result));
        }
        ApiRequest::PlotData {
            ticket, purpose, ..
        } => {
            let result = client.fetch(&request).await;
            responses
                .plot_fetched_relay
                .send((*ticket, *purpose, result));
        }
        ApiRequest::TrackWindow { ticket, .. } => {
            let result = client.fetch(&request).await;
            responses.track_window_fetched_relay.send((*ticket, result));
        }
    }
}
