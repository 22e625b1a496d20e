//! Sidebar inputs: track picker, variable checklist, stride and colour-by.

use zoon::*;

use crate::colors::theme;
use crate::controller::TelemetryController;
use crate::dataflow::{Actor, Relay};
use shared::{DashboardSession, Stride, TrackListEntry};

/// One `<option>`; rebuilt together with its `selected` flag so the DOM
/// never shows a choice the session does not hold.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

pub fn controls_panel(controller: &TelemetryController) -> impl Element + use<> {
    let session = &controller.session;
    Column::new()
        .s(Width::fill())
        .s(Gap::new().y(16))
        .item(section(session, "Track", track_select(controller)))
        .item(section(session, "Variables", variable_checklist(controller)))
        .item(section(session, "Map stride", stride_select(controller)))
        .item(section(session, "Colour track by", color_var_select(controller)))
}

pub fn section<E: Element>(
    session: &Actor<DashboardSession>,
    title: &str,
    content: E,
) -> impl Element + use<E> {
    Column::new()
        .s(Width::fill())
        .s(Gap::new().y(6))
        .item(
            El::new()
                .s(Font::new().size(13).weight(FontWeight::SemiBold).color_signal(
                    session.signal_ref(|session| theme(session.dark_mode()).muted_text),
                ))
                .child(title.to_uppercase()),
        )
        .item(content)
}

pub fn select_input(
    aria_label: &'static str,
    options: impl Signal<Item = Vec<SelectOption>> + 'static,
    mut on_change: impl FnMut(String) + 'static,
) -> impl Element {
    RawHtmlEl::new("select")
        .attr("aria-label", aria_label)
        .style("width", "100%")
        .style("padding", "4px")
        .children_signal_vec(options.to_signal_vec().map(|option| {
            RawHtmlEl::new("option")
                .attr("value", &option.value)
                .prop("selected", if option.selected { "true" } else { "" })
                .child(option.label)
        }))
        .event_handler(move |event: events::Change| {
            if let Some(select) = event.dyn_target::<web_sys::HtmlSelectElement>() {
                on_change(select.value());
            }
        })
}

// ===== TRACK =====

fn track_options(entries: &[TrackListEntry], current: Option<&str>) -> Vec<SelectOption> {
    let mut options = vec![SelectOption::new("", "Select a track…", current.is_none())];
    options.extend(entries.iter().map(|entry| {
        SelectOption::new(
            entry.filename.clone(),
            entry.display_label(),
            current == Some(entry.filename.as_str()),
        )
    }));
    options
}

fn track_select(controller: &TelemetryController) -> impl Element + use<> {
    let options = map_ref! {
        let entries = controller.track_list.signal(),
        let current = controller.session.signal_ref(|session| session.track().map(str::to_string)) =>
        track_options(entries, current.as_deref())
    };
    let track_selected_relay = controller.track_selected_relay.clone();
    select_input("Track", options, move |filename| {
        if !filename.is_empty() {
            track_selected_relay.send(filename);
        }
    })
}

// ===== VARIABLES =====

#[derive(Debug, Clone, PartialEq)]
struct VariableRow {
    key: String,
    label: String,
    checked: bool,
}

fn variable_rows(session: &DashboardSession) -> Vec<VariableRow> {
    session
        .catalog()
        .iter()
        .map(|info| VariableRow {
            key: info.key.clone(),
            label: info.label().to_string(),
            checked: session.is_selected(&info.key),
        })
        .collect()
}

fn variable_checklist(controller: &TelemetryController) -> impl Element + use<> {
    let variable_toggled_relay = controller.variable_toggled_relay.clone();
    let session = &controller.session;
    Column::new()
        .s(Width::fill())
        .s(Gap::new().y(4))
        .s(Font::new().size(14).color_signal(
            session.signal_ref(|session| theme(session.dark_mode()).text),
        ))
        .items_signal_vec(
            session
                .signal_ref(variable_rows)
                .to_signal_vec()
                .map(move |row| variable_row(row, variable_toggled_relay.clone())),
        )
        .item_signal(
            session
                .signal_ref(|session| session.catalog().is_empty())
                .dedupe()
                .map_true(|| Text::new("Load a track to list its variables")),
        )
}

fn variable_row(row: VariableRow, variable_toggled_relay: Relay<(String, bool)>) -> impl Element {
    let key = row.key.clone();
    RawHtmlEl::new("label")
        .style("display", "flex")
        .style("gap", "6px")
        .style("align-items", "center")
        .attr("title", &row.key)
        .child(
            RawHtmlEl::new("input")
                .attr("type", "checkbox")
                .prop("checked", if row.checked { "true" } else { "" })
                .event_handler(move |event: events::Change| {
                    if let Some(input) = event.dyn_target::<web_sys::HtmlInputElement>() {
                        variable_toggled_relay.send((key.clone(), input.checked()));
                    }
                }),
        )
        .child(row.label)
}

// ===== MAP OPTIONS =====

fn stride_options(current: Stride) -> Vec<SelectOption> {
    Stride::ALL
        .into_iter()
        .map(|stride| {
            let label = match stride {
                Stride::Every1 => "Every point".to_string(),
                stride => format!("1 in {}", stride),
            };
            SelectOption::new(stride.to_string(), label, stride == current)
        })
        .collect()
}

fn stride_select(controller: &TelemetryController) -> impl Element + use<> {
    let stride_selected_relay = controller.stride_selected_relay.clone();
    select_input(
        "Map stride",
        controller
            .session
            .signal_ref(|session| stride_options(session.stride())),
        move |value| match value.parse::<u32>().map(Stride::try_from) {
            Ok(Ok(stride)) => stride_selected_relay.send(stride),
            _ => zoon::println!("Ignoring unknown stride '{}'", value),
        },
    )
}

fn color_var_options(session: &DashboardSession) -> Vec<SelectOption> {
    let current = session.color_var();
    let mut options = vec![SelectOption::new("", "None", current.is_none())];
    options.extend(session.catalog().color_candidates().map(|info| {
        SelectOption::new(
            info.key.clone(),
            info.label(),
            current == Some(info.key.as_str()),
        )
    }));
    options
}

fn color_var_select(controller: &TelemetryController) -> impl Element + use<> {
    let color_var_selected_relay = controller.color_var_selected_relay.clone();
    select_input(
        "Colour track by",
        controller.session.signal_ref(color_var_options),
        move |key| color_var_selected_relay.send((!key.is_empty()).then_some(key)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{PlotDataResponse, UnitPreferences};

    fn entry(filename: &str, label: Option<&str>) -> TrackListEntry {
        TrackListEntry {
            filename: filename.to_string(),
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn track_options_mark_the_loaded_track() {
        let entries = [entry("regatta_2024.json", Some("Regatta 2024")), entry("trial.json", None)];
        let options = track_options(&entries, None);
        assert_eq!(options.len(), 3);
        assert!(options[0].selected);
        assert_eq!(options[2].label, "trial.json");

        let options = track_options(&entries, Some("regatta_2024.json"));
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].label, "Regatta 2024");
    }

    #[test]
    fn stride_options_cover_every_allowed_factor() {
        let options = stride_options(Stride::Every25);
        let values: Vec<&str> = options.iter().map(|option| option.value.as_str()).collect();
        assert_eq!(values, ["1", "2", "5", "10", "25", "100", "1000"]);
        assert_eq!(options.iter().filter(|option| option.selected).count(), 1);
        assert!(options[4].selected);
    }

    #[test]
    fn colour_choices_skip_raw_coordinates() {
        let mut session = DashboardSession::new(UnitPreferences::default(), false, 15);
        let requests = session.track_loaded(
            "regatta_2024.json",
            shared::TimestampSequence::from_raw(
                ["2024-06-01T10:00:00", "2024-06-01T10:00:01"].as_slice(),
            )
            .unwrap(),
        );
        let ticket = requests
            .iter()
            .find_map(|request| match request {
                shared::ApiRequest::PlotData { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .unwrap();
        let response: PlotDataResponse = serde_json::from_value(serde_json::json!({
            "vars": {
                "rm1/gps/lat": [],
                "rm1/gps/long": [],
                "rm1/gps/speed": [],
                "rm1/imu/heel": []
            },
            "aliases": { "rm1/gps/speed": "Boat speed" }
        }))
        .unwrap();
        session.apply_catalog(ticket, &response).unwrap();

        let options = color_var_options(&session);
        let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
        assert_eq!(labels, ["None", "Boat speed"]);
        assert!(options[0].selected);

        let rows = variable_rows(&session);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.iter().filter(|row| row.checked).count(), 3);
    }
}
