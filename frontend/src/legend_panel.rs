use zoon::*;

use crate::colors::theme;
use crate::dataflow::Actor;
use shared::{DashboardSession, Legend, LegendEntry};

/// Colour-bucket legend for the map track. Hidden while no colour
/// variable is active or the last scale was unusable.
pub fn legend_panel(session: &Actor<DashboardSession>) -> impl Element + use<> {
    El::new()
        .s(Align::new().top().right())
        .s(Padding::all(8))
        .child_signal(
            session
                .signal_ref(|session| session.overlay().and_then(|overlay| overlay.legend.clone()))
                .map(|legend| legend.map(legend_box)),
        )
}

fn legend_box(legend: Legend) -> impl Element {
    // Sits on top of map tiles, so it keeps the light palette in both themes.
    let colors = theme(false);
    Column::new()
        .s(Padding::new().x(10).y(8))
        .s(Gap::new().y(4))
        .s(RoundedCorners::all(4))
        .s(Background::new().color(colors.panel))
        .s(Borders::all(Border::new().color(colors.border)))
        .s(Font::new().size(12).color(colors.text))
        .item(El::new().s(Font::new().weight(FontWeight::SemiBold)).child(legend.title))
        .items(legend.entries.into_iter().map(legend_row))
}

fn legend_row(entry: LegendEntry) -> impl Element {
    Row::new()
        .s(Gap::new().x(6))
        .item(
            El::new()
                .s(Width::exact(14))
                .s(Height::exact(10))
                .s(Background::new().color(entry.color)),
        )
        .item(Text::new(entry.label))
}
