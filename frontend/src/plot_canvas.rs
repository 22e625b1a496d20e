//! Time-series chart drawn with fast2d.
//!
//! Lines and markers go to the canvas; titles, axis values and the series
//! legend are regular elements layered above it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use zoon::*;

use crate::colors::{css, series_color, theme, Rgba};
use crate::controller::TelemetryController;
use crate::dataflow::Actor;
use shared::{DashboardSession, PlotFrame};

const PADDING_LEFT: f32 = 12.0;
const PADDING_RIGHT: f32 = 12.0;
const PADDING_TOP: f32 = 28.0;
const PADDING_BOTTOM: f32 = 24.0;
const GRID_LINES: usize = 4;
const LINE_WIDTH: f32 = 2.0;
const MARKER_RADIUS: f32 = 2.5;
/// Above this many points per series only the line is drawn.
const MAX_MARKERS: usize = 300;

type PlotState = (Option<PlotFrame>, bool);

fn plot_state_signal(session: &Actor<DashboardSession>) -> impl Signal<Item = PlotState> + use<> {
    session.signal_ref(|session| (session.plot().cloned(), session.dark_mode()))
}

pub fn plot_panel(controller: &TelemetryController) -> impl Element + use<> {
    let session = controller.session.clone();
    Stack::new()
        .s(Width::fill())
        .s(Height::exact(320))
        .layer(
            El::new()
                .s(Width::fill())
                .s(Height::fill())
                .child_signal(canvas_element(session.clone()).into_signal_option()),
        )
        .layer(plot_annotations(&session))
}

async fn canvas_element(session: Actor<DashboardSession>) -> impl Element {
    let mut zoon_canvas = Canvas::new()
        .width(0)
        .height(0)
        .s(Width::fill())
        .s(Height::fill());

    let dom_canvas = zoon_canvas.raw_el_mut().dom_element();
    let canvas_wrapper = Rc::new(RefCell::new(
        fast2d::CanvasWrapper::new_with_canvas(dom_canvas).await,
    ));
    let latest: Rc<RefCell<PlotState>> = Rc::new(RefCell::new((None, false)));
    let size = Rc::new(Cell::new((0.0_f32, 0.0_f32)));

    let redraw = {
        let canvas_wrapper = canvas_wrapper.clone();
        let latest = latest.clone();
        let size = size.clone();
        move || {
            let (width, height) = size.get();
            let objects = {
                let (frame, dark_mode) = &*latest.borrow();
                plot_objects(frame.as_ref(), *dark_mode, width, height)
            };
            canvas_wrapper
                .borrow_mut()
                .update_objects(move |canvas_objects| *canvas_objects = objects);
        }
    };

    let plot_updates = Task::start_droppable({
        let redraw = redraw.clone();
        plot_state_signal(&session).for_each(move |state| {
            *latest.borrow_mut() = state;
            redraw();
            async {}
        })
    });

    zoon_canvas.update_raw_el(move |raw_el| {
        raw_el
            .after_remove(move |_| drop(plot_updates))
            .on_resize(move |width, height| {
                canvas_wrapper.borrow_mut().resized(width, height);
                size.set((width as f32, height as f32));
                redraw();
            })
    })
}

fn plot_objects(
    frame: Option<&PlotFrame>,
    dark_mode: bool,
    width: f32,
    height: f32,
) -> Vec<fast2d::Object2d> {
    // A frame carries the theme it was rendered with.
    let colors = theme(frame.map_or(dark_mode, |frame| frame.dark_mode));
    let (r, g, b, a) = colors.plot_background;
    let mut objects: Vec<fast2d::Object2d> = vec![
        fast2d::Rectangle::new()
            .position(0.0, 0.0)
            .size(width, height)
            .color(r, g, b, a)
            .into(),
    ];

    let area = PlotArea::new(width, height);
    if area.width <= 0.0 || area.height <= 0.0 {
        return objects;
    }
    let (r, g, b, a) = colors.plot_grid;
    for step in 0..=GRID_LINES {
        let y = area.top + area.height * step as f32 / GRID_LINES as f32;
        objects.push(
            fast2d::Rectangle::new()
                .position(area.left, y)
                .size(area.width, 1.0)
                .color(r, g, b, a)
                .into(),
        );
    }

    let Some(frame) = frame else {
        return objects;
    };
    let (Some(time_range), Some(value_range)) = (frame.time_range, frame.value_range) else {
        return objects;
    };

    for (index, series) in frame.series.iter().enumerate() {
        let color = series_color(index);
        let points: Vec<Option<(f32, f32)>> = series
            .points
            .iter()
            .map(|point| {
                point
                    .value
                    .map(|value| area.to_screen(point.time, value, time_range, value_range))
            })
            .collect();
        for run in points.split(Option::is_none) {
            let run: Vec<(f32, f32)> = run.iter().flatten().copied().collect();
            push_run(&mut objects, &run, color);
        }
        if series.points.len() <= MAX_MARKERS {
            for (x, y) in points.iter().flatten() {
                objects.push(circle(*x, *y, MARKER_RADIUS, color));
            }
        }
    }
    objects
}

/// A gap-free stretch of samples. Single samples still show up as a dot.
fn push_run(objects: &mut Vec<fast2d::Object2d>, run: &[(f32, f32)], color: Rgba) {
    let (r, g, b, a) = color;
    match run {
        [] => {}
        [(x, y)] => objects.push(circle(*x, *y, LINE_WIDTH, color)),
        _ => objects.push(
            fast2d::Line::new()
                .points(run)
                .color(r, g, b, a)
                .width(LINE_WIDTH)
                .into(),
        ),
    }
}

fn circle(x: f32, y: f32, radius: f32, (r, g, b, a): Rgba) -> fast2d::Object2d {
    fast2d::Circle::new()
        .center(x, y)
        .radius(radius)
        .color(r, g, b, a)
        .into()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotArea {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl PlotArea {
    fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            left: PADDING_LEFT,
            top: PADDING_TOP,
            width: canvas_width - PADDING_LEFT - PADDING_RIGHT,
            height: canvas_height - PADDING_TOP - PADDING_BOTTOM,
        }
    }

    /// Degenerate ranges put every sample on the centre line.
    fn to_screen(
        &self,
        time: f64,
        value: f64,
        (time_min, time_max): (f64, f64),
        (value_min, value_max): (f64, f64),
    ) -> (f32, f32) {
        let fraction = |v: f64, min: f64, max: f64| {
            if max > min { ((v - min) / (max - min)) as f32 } else { 0.5 }
        };
        let x = self.left + fraction(time, time_min, time_max) * self.width;
        let y = self.top + (1.0 - fraction(value, value_min, value_max)) * self.height;
        (x, y)
    }
}

fn plot_annotations(session: &Actor<DashboardSession>) -> impl Element + use<> {
    Column::new()
        .s(Width::fill())
        .s(Height::fill())
        .s(Padding::new().x(PADDING_LEFT as u32).y(4))
        .s(Font::new().size(12).color_signal(session.signal_ref(|session| {
            let dark_mode = session.plot().map_or(session.dark_mode(), |frame| frame.dark_mode);
            theme(dark_mode).muted_text
        })))
        .item(series_legend(session))
        .item(El::new().s(Height::fill()).child_signal(session.signal_ref(|session| {
            let empty = session.plot().is_none_or(PlotFrame::is_empty);
            empty.then(|| {
                El::new()
                    .s(Align::center())
                    .child("Select variables to plot")
            })
        })))
        .item(
            Row::new()
                .s(Width::fill())
                .item(Text::with_signal(session.signal_ref(|session| {
                    frame_text(session, |frame| {
                        let start = frame.start_label.clone().unwrap_or_default();
                        let range = frame
                            .value_range
                            .map(|(min, max)| format!("  ({} to {})", format_value(min), format_value(max)))
                            .unwrap_or_default();
                        format!("{}{}", start, range)
                    })
                })))
                .item(El::new().s(Width::fill()))
                .item(Text::with_signal(session.signal_ref(|session| {
                    frame_text(session, |frame| frame.end_label.clone().unwrap_or_default())
                }))),
        )
}

fn series_legend(session: &Actor<DashboardSession>) -> impl Element + use<> {
    Row::new()
        .s(Gap::new().x(12))
        .multiline()
        .items_signal_vec(
            session
                .signal_ref(|session| {
                    session
                        .plot()
                        .map(|frame| {
                            frame
                                .series
                                .iter()
                                .map(|series| series.label.clone())
                                .collect::<Vec<_>>()
                        })
                        .unwrap_or_default()
                })
                .map(|labels| labels.into_iter().enumerate().collect::<Vec<_>>())
                .to_signal_vec()
                .map(|(index, label)| {
                    Row::new()
                        .s(Gap::new().x(4))
                        .item(
                            El::new()
                                .s(Width::exact(10))
                                .s(Height::exact(10))
                                .s(RoundedCorners::all(2))
                                .s(Background::new().color(css(series_color(index)))),
                        )
                        .item(Text::new(label))
                }),
        )
}

fn frame_text(session: &DashboardSession, text: impl Fn(&PlotFrame) -> String) -> String {
    session
        .plot()
        .filter(|frame| !frame.is_empty())
        .map(text)
        .unwrap_or_default()
}

fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}
