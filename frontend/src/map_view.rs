//! Track map: raster tiles below a fast2d overlay with the coloured track
//! line and the latest GPS fix.
//!
//! Tile placement and projection come from `shared::geo`; this module only
//! turns them into DOM nodes and canvas shapes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use zoon::*;

use crate::colors::{parse_hex_or, theme, Rgba, DEFAULT_TRACK_RGBA, MARKER_OUTLINE_RGBA, MARKER_RGBA};
use crate::controller::TelemetryController;
use crate::dataflow::{Actor, Atom, Relay};
use crate::legend_panel::legend_panel;
use shared::geo::{PlacedTile, TILE_SIZE};
use shared::{
    DashboardSession, GpsStatus, MapState, MapViewport, TileSource, TrackOverlay, UnitPreferences,
};

const TRACK_WIDTH: f32 = 3.0;
const MARKER_RADIUS: f32 = 7.0;
const MARKER_OUTLINE: f32 = 2.0;

/// What the overlay canvas draws, captured together so one change redraws once.
type OverlayState = (Option<MapState>, Option<TrackOverlay>, GpsStatus);

pub fn map_panel(controller: &TelemetryController) -> impl Element + use<> {
    let session = controller.session.clone();
    Stack::new()
        .s(Width::fill())
        .s(Height::exact(420))
        .s(Clip::both())
        .s(Background::new().color_signal(
            session.signal_ref(|session| theme(session.dark_mode()).panel),
        ))
        .layer_signal(session.signal_ref(|session| session.map().is_some()).dedupe().map({
            let session = session.clone();
            let tile_source = controller.tile_source.clone();
            move |has_map| has_map.then(|| tile_layer(session.clone(), tile_source.clone()))
        }))
        .layer(
            El::new()
                .s(Width::fill())
                .s(Height::fill())
                .child_signal(overlay_canvas(session.clone()).into_signal_option()),
        )
        .layer(waiting_for_fix(&session))
        .layer(gps_unavailable_flag(&session))
        .layer(legend_panel(&session))
        .layer(speed_badge(&session))
        .layer(zoom_buttons(controller.map_zoom_stepped_relay.clone()))
        .layer(attribution(&controller.tile_source))
}

// ===== TILES =====

fn tile_layer(session: Actor<DashboardSession>, tile_source: TileSource) -> impl Element {
    let size: Atom<(u32, u32)> = Atom::default();
    let tiles = map_ref! {
        let map = session.signal_ref(|session| session.map()),
        let size = size.signal() => {
            map.map(|map| viewport(map, *size).visible_tiles()).unwrap_or_default()
        }
    };
    RawHtmlEl::new("div")
        .style("position", "relative")
        .style("overflow", "hidden")
        .style("width", "100%")
        .style("height", "100%")
        .on_resize(move |width, height| size.set((width, height)))
        .children_signal_vec(
            tiles
                .to_signal_vec()
                .map(move |tile| tile_image(&tile_source, tile)),
        )
}

fn tile_image(tile_source: &TileSource, tile: PlacedTile) -> RawHtmlEl<web_sys::HtmlElement> {
    RawHtmlEl::new("img")
        .attr("src", &tile_source.url(tile.coord))
        .attr("alt", "")
        .attr("draggable", "false")
        .style("position", "absolute")
        .style("left", &format!("{}px", tile.left.round()))
        .style("top", &format!("{}px", tile.top.round()))
        .style("width", &format!("{}px", TILE_SIZE))
        .style("height", &format!("{}px", TILE_SIZE))
}

fn viewport(map: MapState, (width, height): (u32, u32)) -> MapViewport {
    MapViewport {
        center: map.center,
        zoom: map.zoom,
        width: f64::from(width),
        height: f64::from(height),
    }
}

// ===== OVERLAY =====

async fn overlay_canvas(session: Actor<DashboardSession>) -> impl Element {
    let mut zoon_canvas = Canvas::new()
        .width(0)
        .height(0)
        .s(Width::fill())
        .s(Height::fill());

    let dom_canvas = zoon_canvas.raw_el_mut().dom_element();
    let canvas_wrapper = Rc::new(RefCell::new(
        fast2d::CanvasWrapper::new_with_canvas(dom_canvas).await,
    ));
    let latest: Rc<RefCell<OverlayState>> =
        Rc::new(RefCell::new((None, None, GpsStatus::Unknown)));
    let size = Rc::new(Cell::new((0_u32, 0_u32)));

    let redraw = {
        let canvas_wrapper = canvas_wrapper.clone();
        let latest = latest.clone();
        let size = size.clone();
        move || {
            let objects = {
                let (map, overlay, gps) = &*latest.borrow();
                match map {
                    Some(map) => overlay_objects(viewport(*map, size.get()), overlay.as_ref(), *gps),
                    None => Vec::new(),
                }
            };
            canvas_wrapper
                .borrow_mut()
                .update_objects(move |canvas_objects| *canvas_objects = objects);
        }
    };

    let overlay_updates = Task::start_droppable({
        let redraw = redraw.clone();
        session
            .signal_ref(|session| (session.map(), session.overlay().cloned(), session.gps_status()))
            .for_each(move |state| {
                *latest.borrow_mut() = state;
                redraw();
                async {}
            })
    });

    zoon_canvas.update_raw_el(move |raw_el| {
        raw_el
            .after_remove(move |_| drop(overlay_updates))
            .on_resize(move |width, height| {
                canvas_wrapper.borrow_mut().resized(width, height);
                size.set((width, height));
                redraw();
            })
    })
}

/// Track segments first, then the marker on top.
fn overlay_objects(
    viewport: MapViewport,
    overlay: Option<&TrackOverlay>,
    gps: GpsStatus,
) -> Vec<fast2d::Object2d> {
    let mut objects = Vec::new();
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return objects;
    }
    if let Some(overlay) = overlay {
        for segment in &overlay.segments {
            let (r, g, b, a) = parse_hex_or(&segment.color, DEFAULT_TRACK_RGBA);
            let (x1, y1) = viewport.to_screen(segment.from);
            let (x2, y2) = viewport.to_screen(segment.to);
            objects.push(
                fast2d::Line::new()
                    .points(&[(x1 as f32, y1 as f32), (x2 as f32, y2 as f32)])
                    .color(r, g, b, a)
                    .width(TRACK_WIDTH)
                    .into(),
            );
        }
    }
    if let GpsStatus::Fix(fix) = gps {
        let (x, y) = viewport.to_screen(fix.position);
        objects.push(circle(x as f32, y as f32, MARKER_RADIUS + MARKER_OUTLINE, MARKER_OUTLINE_RGBA));
        objects.push(circle(x as f32, y as f32, MARKER_RADIUS, MARKER_RGBA));
    }
    objects
}

fn circle(x: f32, y: f32, radius: f32, (r, g, b, a): Rgba) -> fast2d::Object2d {
    fast2d::Circle::new()
        .center(x, y)
        .radius(radius)
        .color(r, g, b, a)
        .into()
}

// ===== CONTROLS =====

fn waiting_for_fix(session: &Actor<DashboardSession>) -> impl Element + use<> {
    El::new()
        .s(Align::center())
        .s(Font::new().size(14).color_signal(
            session.signal_ref(|session| theme(session.dark_mode()).muted_text),
        ))
        .child_signal(session.signal_ref(|session| session.map().is_none()).dedupe().map_true(
            || Text::new("Waiting for a GPS fix"),
        ))
}

fn gps_unavailable_flag(session: &Actor<DashboardSession>) -> impl Element + use<> {
    El::new()
        .s(Align::new().top().left())
        .s(Padding::all(8))
        .child_signal(session.signal_ref(|session| session.gps_unavailable()).dedupe().map_true(
            || {
                El::new()
                    .s(Padding::new().x(10).y(4))
                    .s(RoundedCorners::all(4))
                    .s(Background::new().color("rgb(220, 53, 69)"))
                    .s(Font::new().size(13).color("white").weight(FontWeight::SemiBold))
                    .child("GPS unavailable")
            },
        ))
}

fn speed_badge(session: &Actor<DashboardSession>) -> impl Element + use<> {
    El::new()
        .s(Align::new().bottom().left())
        .s(Padding::all(8))
        .child_signal(
            session
                .signal_ref(|session| speed_text(session.gps_status(), session.units()))
                .map(|text| {
                    text.map(|text| {
                        El::new()
                            .s(Padding::new().x(8).y(3))
                            .s(RoundedCorners::all(4))
                            .s(Background::new().color("rgba(255, 255, 255, 0.85)"))
                            .s(Font::new().size(13).color("rgb(33, 37, 41)"))
                            .child(text)
                    })
                }),
        )
}

/// Marker label: the reported speed in the preferred unit.
fn speed_text(gps: GpsStatus, units: UnitPreferences) -> Option<String> {
    let GpsStatus::Fix(fix) = gps else {
        return None;
    };
    let kmh = fix.speed_kmh?;
    Some(format!(
        "Speed {:.1} {}",
        units.speed.from_kmh(kmh),
        units.speed.symbol()
    ))
}

fn zoom_buttons(map_zoom_stepped_relay: Relay<i8>) -> impl Element {
    Column::new()
        .s(Align::new().top().left())
        .s(Padding::new().top(44).left(8))
        .s(Gap::new().y(2))
        .item(zoom_button("+", 1, map_zoom_stepped_relay.clone()))
        .item(zoom_button("−", -1, map_zoom_stepped_relay))
}

fn zoom_button(label: &'static str, step: i8, map_zoom_stepped_relay: Relay<i8>) -> impl Element {
    Button::new()
        .s(Width::exact(28))
        .s(Height::exact(28))
        .s(RoundedCorners::all(4))
        .s(Background::new().color("white"))
        .s(Borders::all(Border::new().color("rgb(173, 181, 189)")))
        .s(Font::new().size(16).color("rgb(33, 37, 41)").center())
        .label(label)
        .on_press(move || map_zoom_stepped_relay.send(step))
}

fn attribution(tile_source: &TileSource) -> impl Element + use<> {
    El::new()
        .s(Align::new().bottom().right())
        .s(Padding::new().x(6).y(2))
        .s(Background::new().color("rgba(255, 255, 255, 0.7)"))
        .s(Font::new().size(11).color("rgb(33, 37, 41)"))
        .child(tile_source.attribution())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{GeoPoint, GpsFix, SpeedUnit, TrackSegment, ZoomRange};

    fn map_at(lat: f64, lon: f64) -> MapState {
        MapState {
            center: GeoPoint::new(lat, lon).unwrap(),
            zoom: 12,
            zoom_range: ZoomRange::default(),
        }
    }

    #[test]
    fn marker_is_drawn_at_the_viewport_centre() {
        let view = viewport(map_at(43.7, 10.4), (400, 300));
        let fix = GpsFix {
            position: GeoPoint::new(43.7, 10.4).unwrap(),
            speed_kmh: None,
        };
        let (x, y) = view.to_screen(fix.position);
        assert!((x - 200.0).abs() < 1e-6 && (y - 150.0).abs() < 1e-6);
        assert_eq!(overlay_objects(view, None, GpsStatus::Fix(fix)).len(), 2);
    }

    #[test]
    fn draws_one_line_per_segment() {
        let view = viewport(map_at(43.7, 10.4), (400, 300));
        let a = GeoPoint::new(43.7, 10.4).unwrap();
        let b = GeoPoint::new(43.71, 10.41).unwrap();
        let overlay = TrackOverlay {
            segments: vec![
                TrackSegment { from: a, to: b, color: "#ff0000".to_string() },
                TrackSegment { from: b, to: a, color: "bogus".to_string() },
            ],
            legend: None,
            scale_error: None,
        };
        assert_eq!(overlay_objects(view, Some(&overlay), GpsStatus::Unavailable).len(), 2);
    }

    #[test]
    fn nothing_is_drawn_before_layout() {
        let view = viewport(map_at(43.7, 10.4), (0, 0));
        assert!(overlay_objects(view, None, GpsStatus::Unknown).is_empty());
    }

    #[test]
    fn speed_label_uses_preferred_unit() {
        let fix = GpsFix {
            position: GeoPoint::new(43.7, 10.4).unwrap(),
            speed_kmh: Some(18.52),
        };
        let knots = UnitPreferences {
            speed: SpeedUnit::Knots,
            ..UnitPreferences::default()
        };
        assert_eq!(speed_text(GpsStatus::Fix(fix), knots).as_deref(), Some("Speed 10.0 kn"));
        assert_eq!(speed_text(GpsStatus::Unavailable, knots), None);
        let no_speed = GpsFix { speed_kmh: None, ..fix };
        assert_eq!(speed_text(GpsStatus::Fix(no_speed), knots), None);
    }
}
