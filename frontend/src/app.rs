//! DashboardApp - owns the controller and lays out the views.

use futures::StreamExt;
use zoon::*;

use crate::colors::theme;
use crate::connection::load_client_config;
use crate::controller::TelemetryController;
use crate::controls::controls_panel;
use crate::dataflow::{relay, Actor, Relay};
use crate::map_view::map_panel;
use crate::plot_canvas::plot_panel;
use crate::scrub_slider::scrub_slider;
use crate::settings::settings_panel;
use shared::ClientConfig;

const SIDEBAR_WIDTH: u32 = 300;

pub struct DashboardApp {
    pub config: ClientConfig,
    pub controller: TelemetryController,

    /// Whether the settings section is expanded in the sidebar.
    pub settings_visible: Actor<bool>,
    pub settings_toggle_requested_relay: Relay<()>,
}

impl DashboardApp {
    /// Fetch the session config from the server, then start the controller.
    pub async fn new() -> Self {
        let config = load_client_config().await;
        let controller = TelemetryController::new(&config);

        let (settings_toggle_requested_relay, mut settings_toggle_requested_stream) = relay();
        let settings_visible = Actor::new(false, async move |state| {
            while settings_toggle_requested_stream.next().await.is_some() {
                let visible = !state.get();
                state.set(visible);
            }
        });

        Self {
            config,
            controller,
            settings_visible,
            settings_toggle_requested_relay,
        }
    }

    pub fn root(&self) -> impl Element + use<> {
        let session = &self.controller.session;
        Stack::new()
            .s(Height::screen())
            .s(Width::fill())
            .s(Background::new().color_signal(
                session.signal_ref(|session| theme(session.dark_mode()).page),
            ))
            .s(Font::new()
                .family([
                    FontFamily::new("Inter"),
                    FontFamily::new("system-ui"),
                    FontFamily::new("Segoe UI"),
                    FontFamily::new("Arial"),
                    FontFamily::SansSerif,
                ])
                .color_signal(session.signal_ref(|session| theme(session.dark_mode()).text)))
            .layer(
                Column::new()
                    .s(Width::fill())
                    .s(Height::fill())
                    .item(self.header())
                    .item(
                        Row::new()
                            .s(Width::fill())
                            .s(Height::fill())
                            .s(Align::new().top())
                            .item(self.sidebar())
                            .item(self.main_panel()),
                    ),
            )
    }

    fn header(&self) -> impl Element + use<> {
        let session = &self.controller.session;
        let settings_toggle_requested_relay = self.settings_toggle_requested_relay.clone();
        Row::new()
            .s(Width::fill())
            .s(Padding::new().x(16).y(10))
            .s(Gap::new().x(12))
            .s(Background::new().color_signal(
                session.signal_ref(|session| theme(session.dark_mode()).panel),
            ))
            .item(
                El::new()
                    .s(Font::new().size(18).weight(FontWeight::SemiBold))
                    .child("Telemetry Dashboard"),
            )
            .item(
                El::new()
                    .s(Font::new().size(14).color_signal(
                        session.signal_ref(|session| theme(session.dark_mode()).muted_text),
                    ))
                    .child(Text::with_signal(session.signal_ref(|session| {
                        session.track().map(str::to_string).unwrap_or_default()
                    }))),
            )
            .item(El::new().s(Width::fill()))
            .item(
                El::new()
                    .s(Font::new().size(12))
                    .child(if self.config.online { "Online map" } else { "Offline map" }),
            )
            .item(
                Button::new()
                    .s(Padding::new().x(10).y(4))
                    .s(RoundedCorners::all(4))
                    .s(Borders::all(Border::new().color("rgb(173, 181, 189)")))
                    .label_signal(
                        self.settings_visible
                            .signal()
                            .map(|visible| if visible { "Close settings" } else { "Settings" }),
                    )
                    .on_press(move || settings_toggle_requested_relay.send(())),
            )
    }

    fn sidebar(&self) -> impl Element + use<> {
        let controller = self.controller.clone();
        Column::new()
            .s(Width::exact(SIDEBAR_WIDTH))
            .s(Height::fill())
            .s(Padding::all(16))
            .s(Gap::new().y(24))
            .s(Scrollbars::y_and_clip_x())
            .item_signal(
                self.settings_visible
                    .signal()
                    .map_true(move || settings_panel(&controller)),
            )
            .item(controls_panel(&self.controller))
    }

    fn main_panel(&self) -> impl Element + use<> {
        Column::new()
            .s(Width::fill())
            .s(Height::fill())
            .s(Padding::all(16))
            .s(Gap::new().y(16))
            .s(Scrollbars::y_and_clip_x())
            .item(scrub_slider(&self.controller))
            .item(plot_panel(&self.controller))
            .item(map_panel(&self.controller))
    }
}
