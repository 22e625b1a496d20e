use zoon::*;

use crate::colors::theme;
use crate::controller::TelemetryController;
use crate::controls::{section, select_input, SelectOption};
use crate::preferences;
use shared::{SpeedUnit, TemperatureUnit};

fn speed_label(unit: SpeedUnit) -> &'static str {
    match unit {
        SpeedUnit::KilometersPerHour => "Kilometres per hour",
        SpeedUnit::Knots => "Knots",
        SpeedUnit::MetersPerSecond => "Metres per second",
    }
}

fn temperature_label(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "Celsius",
        TemperatureUnit::Fahrenheit => "Fahrenheit",
        TemperatureUnit::Kelvin => "Kelvin",
    }
}

fn speed_options(current: SpeedUnit) -> Vec<SelectOption> {
    SpeedUnit::ALL
        .into_iter()
        .map(|unit| SelectOption {
            value: unit.symbol().to_string(),
            label: format!("{} ({})", speed_label(unit), unit.symbol()),
            selected: unit == current,
        })
        .collect()
}

fn temperature_options(current: TemperatureUnit) -> Vec<SelectOption> {
    TemperatureUnit::ALL
        .into_iter()
        .map(|unit| SelectOption {
            value: unit.symbol().to_string(),
            label: format!("{} ({})", temperature_label(unit), unit.symbol()),
            selected: unit == current,
        })
        .collect()
}

fn parse_speed(symbol: &str) -> Option<SpeedUnit> {
    SpeedUnit::ALL.into_iter().find(|unit| unit.symbol() == symbol)
}

fn parse_temperature(symbol: &str) -> Option<TemperatureUnit> {
    TemperatureUnit::ALL
        .into_iter()
        .find(|unit| unit.symbol() == symbol)
}

/// Unit form and theme switch. Units apply on save; the theme applies to
/// the page at once and to the chart from its next refresh.
pub fn settings_panel(controller: &TelemetryController) -> impl Element + use<> {
    let session = &controller.session;
    // Edited copy, committed by the save button.
    let draft = Mutable::new(preferences::load_unit_preferences());

    let units_saved_relay = controller.units_saved_relay.clone();
    let save_button = Button::new()
        .s(Padding::new().x(12).y(6))
        .s(RoundedCorners::all(4))
        .s(Background::new().color("rgb(13, 110, 253)"))
        .s(Font::new().size(14).color("white"))
        .label("Save units")
        .on_press({
            let draft = draft.clone();
            move || units_saved_relay.send(draft.get())
        });

    let speed_select = select_input("Speed unit", draft.signal().map(|units| speed_options(units.speed)), {
        let draft = draft.clone();
        move |symbol| match parse_speed(&symbol) {
            Some(speed) => draft.lock_mut().speed = speed,
            None => zoon::println!("Ignoring unknown speed unit '{}'", symbol),
        }
    });
    let temperature_select = select_input(
        "Temperature unit",
        draft
            .signal()
            .map(|units| temperature_options(units.temperature)),
        move |symbol| match parse_temperature(&symbol) {
            Some(temperature) => draft.lock_mut().temperature = temperature,
            None => zoon::println!("Ignoring unknown temperature unit '{}'", symbol),
        },
    );

    let dark_mode_toggled_relay = controller.dark_mode_toggled_relay.clone();
    let dark_mode_toggle = RawHtmlEl::new("label")
        .style("display", "flex")
        .style("gap", "6px")
        .style("align-items", "center")
        .child(
            RawHtmlEl::new("input")
                .attr("type", "checkbox")
                .prop_signal(
                    "checked",
                    session
                        .signal_ref(|session| session.dark_mode())
                        .map(|dark_mode| if dark_mode { "true" } else { "" }),
                )
                .event_handler(move |event: events::Change| {
                    if let Some(input) = event.dyn_target::<web_sys::HtmlInputElement>() {
                        dark_mode_toggled_relay.send(input.checked());
                    }
                }),
        )
        .child("Dark mode");

    Column::new()
        .s(Width::fill())
        .s(Gap::new().y(8))
        .s(Font::new().size(14).color_signal(
            session.signal_ref(|session| theme(session.dark_mode()).text),
        ))
        .item(section(
            session,
            "Display units",
            Column::new()
                .s(Gap::new().y(6))
                .item(speed_select)
                .item(temperature_select)
                .item(save_button),
        ))
        .item(section(session, "Theme", dark_mode_toggle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_options_round_trip_through_symbols() {
        for option in speed_options(SpeedUnit::Knots) {
            let unit = parse_speed(&option.value).unwrap();
            assert_eq!(option.selected, unit == SpeedUnit::Knots);
        }
        for option in temperature_options(TemperatureUnit::Kelvin) {
            let unit = parse_temperature(&option.value).unwrap();
            assert_eq!(option.selected, unit == TemperatureUnit::Kelvin);
        }
        assert_eq!(parse_speed("mph"), None);
    }

    #[test]
    fn option_labels_name_the_unit() {
        let labels: Vec<String> = speed_options(SpeedUnit::default())
            .into_iter()
            .map(|option| option.label)
            .collect();
        assert_eq!(
            labels,
            ["Kilometres per hour (km/h)", "Knots (kn)", "Metres per second (m/s)"]
        );
    }
}
