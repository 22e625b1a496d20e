//! Dual-handle index slider over the loaded track.
//!
//! The handles are rebuilt from scratch whenever a new timestamp sequence is
//! loaded, so their range always matches the current track.

use zoon::*;

use crate::colors::theme;
use crate::controller::TelemetryController;
use crate::dataflow::Relay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handle {
    Start,
    End,
}

pub fn scrub_slider(controller: &TelemetryController) -> impl Element + use<> {
    let session = controller.session.clone();
    let slider_moved_relay = controller.slider_moved_relay.clone();
    Column::new()
        .s(Width::fill())
        .s(Gap::new().y(6))
        .item_signal(
            session
                .signal_ref(|session| (session.slider_generation(), session.timestamps().len()))
                .dedupe()
                .map(move |(_, len)| {
                    (len > 0).then(|| slider_handles(len - 1, slider_moved_relay.clone()))
                }),
        )
        .item(window_labels(controller))
}

fn slider_handles(last: usize, slider_moved_relay: Relay<(usize, usize)>) -> impl Element {
    // Mirrors the DOM handles synchronously so a drag can be clamped before
    // the window is sent.
    let handles = Mutable::new((0, last));
    Column::new()
        .s(Width::fill())
        .s(Gap::new().y(2))
        .item(range_input(Handle::Start, last, handles.clone(), slider_moved_relay.clone()))
        .item(range_input(Handle::End, last, handles, slider_moved_relay))
}

fn range_input(
    handle: Handle,
    last: usize,
    handles: Mutable<(usize, usize)>,
    slider_moved_relay: Relay<(usize, usize)>,
) -> impl Element {
    let label = match handle {
        Handle::Start => "Window start",
        Handle::End => "Window end",
    };
    RawHtmlEl::new("input")
        .attr("type", "range")
        .attr("min", "0")
        .attr("max", &last.to_string())
        .attr("step", "1")
        .attr("aria-label", label)
        .style("width", "100%")
        .prop_signal(
            "value",
            handles.signal().map(move |(start, end)| match handle {
                Handle::Start => start.to_string(),
                Handle::End => end.to_string(),
            }),
        )
        .event_handler(move |event: events::Input| {
            let Some(input) = event.dyn_target::<web_sys::HtmlInputElement>() else {
                return;
            };
            let Ok(value) = input.value().parse::<usize>() else {
                return;
            };
            move_handle(&handles, &slider_moved_relay, handle, value);
        })
}

/// A handle never passes the other one.
fn move_handle(
    handles: &Mutable<(usize, usize)>,
    slider_moved_relay: &Relay<(usize, usize)>,
    handle: Handle,
    value: usize,
) {
    let window = {
        let mut handles = handles.lock_mut();
        match handle {
            Handle::Start => handles.0 = value.min(handles.1),
            Handle::End => handles.1 = value.max(handles.0),
        }
        *handles
    };
    slider_moved_relay.send(window);
}

fn window_labels(controller: &TelemetryController) -> impl Element + use<> {
    let session = &controller.session;
    Row::new()
        .s(Width::fill())
        .s(Font::new().size(13).color_signal(
            session.signal_ref(|session| theme(session.dark_mode()).muted_text),
        ))
        .item(Text::with_signal(session.signal_ref(|session| {
            session
                .window_labels()
                .map(|(start, _)| start)
                .unwrap_or_else(|| "No track loaded".to_string())
        })))
        .item(El::new().s(Width::fill()))
        .item(Text::with_signal(session.signal_ref(|session| {
            session
                .window_labels()
                .map(|(_, end)| end)
                .unwrap_or_default()
        })))
}
