use serde::{Deserialize, Serialize};

pub mod api;
pub mod color_scale;
pub mod config;
pub mod geo;
pub mod plot;
pub mod scrub;
pub mod sequence;
pub mod session;
pub mod timestamps;
pub mod track_overlay;
pub mod units;
pub mod variables;

pub use api::{
    ApiRequest, GpsInfoResponse, PlotDataResponse, PlotPurpose, TrackListEntry, TrackLoadError,
    TrackWindowResponse,
};
pub use color_scale::{ColorScale, ColorScaleError, LegendEntry, DEFAULT_TRACK_COLOR};
pub use config::{ClientConfig, ConfigError, DashboardConfig, MapMode};
pub use geo::{GeoPoint, GpsFix, MapViewport, TileSource, ZoomRange};
pub use plot::{PlotFrame, PlotPoint, PlotSeries};
pub use scrub::{ScrubWindow, Stride, WindowBounds};
pub use sequence::{RequestSequencer, RequestTicket};
pub use session::{DashboardSession, GpsOutcome, GpsStatus, MapState, StaleResponse, View};
pub use timestamps::{TimestampParseError, TimestampSequence, TrackTimestamp};
pub use track_overlay::{Legend, TrackOverlay, TrackSegment};
pub use units::{SpeedUnit, TemperatureUnit, UnitPreferences};
pub use variables::{VariableCatalog, VariableCategory, VariableInfo};

// ===== MESSAGE TYPES =====

#[derive(Serialize, Deserialize, Debug)]
pub enum UpMsg {
    LoadDashboardConfig,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum DownMsg {
    DashboardConfigLoaded(ClientConfig),
    ConfigError(String),
}
