//! Web-Mercator tile math for the track map.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub const TILE_SIZE: f64 = 256.0;
/// Latitude limit of the square Web-Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_78;
pub const DEFAULT_ZOOM: u8 = 15;

const ONLINE_TILE_URL: &str = "https://tile.openstreetmap.org";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// `None` unless both coordinates are finite and on the globe.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    /// Position in world pixels at `zoom`.
    pub fn project(&self, zoom: u8) -> (f64, f64) {
        let world = world_size(zoom);
        let lat = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (self.lon + 180.0) / 360.0 * world;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
        (x, y)
    }
}

/// A valid position fix reported by the telemetry API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub position: GeoPoint,
    /// Speed over ground in km/h, if reported.
    pub speed_kmh: Option<f64>,
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom.min(30))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0, max: 19 }
    }
}

impl ZoomRange {
    /// Builds a range from possibly swapped or out-of-bounds levels.
    pub fn new(min: u8, max: u8) -> Self {
        let (min, max) = (min.min(max), min.max(max));
        Self {
            min: min.min(19),
            max: max.min(19),
        }
    }

    pub fn clamp(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min, self.max)
    }
}

/// Where map tiles are loaded from. Chosen once when the page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    Online,
    /// Tile cache served by the telemetry server, laid out as
    /// `{cache_path}/{z}/{x}/{y}.png`.
    Offline { cache_path: String },
}

impl TileSource {
    pub fn url(&self, tile: TileCoord) -> String {
        let base = match self {
            TileSource::Online => ONLINE_TILE_URL,
            TileSource::Offline { cache_path } => cache_path.trim_end_matches('/'),
        };
        format!("{}/{}/{}/{}.png", base, tile.z, tile.x, tile.y)
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            TileSource::Online => "© OpenStreetMap contributors",
            TileSource::Offline { .. } => "© OpenStreetMap contributors (offline cache)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile and the screen offset of its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub coord: TileCoord,
    pub left: f64,
    pub top: f64,
}

/// The visible part of the map: a centre, a zoom level and a pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: GeoPoint,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl MapViewport {
    fn origin(&self) -> (f64, f64) {
        let (cx, cy) = self.center.project(self.zoom);
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    pub fn to_screen(&self, point: GeoPoint) -> (f64, f64) {
        let (ox, oy) = self.origin();
        let (x, y) = point.project(self.zoom);
        (x - ox, y - oy)
    }

    /// Tiles covering the viewport, row by row.
    ///
    /// Columns wrap around the antimeridian; rows outside the world are
    /// skipped.
    pub fn visible_tiles(&self) -> Vec<PlacedTile> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec::new();
        }
        let (ox, oy) = self.origin();
        let tiles_per_side = 1i64 << self.zoom.min(30);
        let first_col = (ox / TILE_SIZE).floor() as i64;
        let last_col = ((ox + self.width) / TILE_SIZE).ceil() as i64 - 1;
        let first_row = ((oy / TILE_SIZE).floor() as i64).max(0);
        let last_row = (((oy + self.height) / TILE_SIZE).ceil() as i64 - 1).min(tiles_per_side - 1);

        let mut tiles = Vec::new();
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                tiles.push(PlacedTile {
                    coord: TileCoord {
                        z: self.zoom,
                        x: col.rem_euclid(tiles_per_side) as u32,
                        y: row as u32,
                    },
                    left: col as f64 * TILE_SIZE - ox,
                    top: row as f64 * TILE_SIZE - oy,
                });
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_coordinates() {
        assert!(GeoPoint::new(f64::NAN, 10.0).is_none());
        assert!(GeoPoint::new(45.0, f64::INFINITY).is_none());
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(43.7, 10.4).is_some());
    }

    #[test]
    fn projection_matches_tile_numbers() {
        // Same tile maths as the offline tile downloader: (43.7, 10.4) at z=12.
        let point = GeoPoint::new(43.7, 10.4).unwrap();
        let (x, y) = point.project(12);
        assert_eq!((x / TILE_SIZE) as u32, 2166);
        assert_eq!((y / TILE_SIZE) as u32, 1494);

        let origin = GeoPoint::new(0.0, 0.0).unwrap().project(0);
        assert!((origin.0 - 128.0).abs() < 1e-9);
        assert!((origin.1 - 128.0).abs() < 1e-9);
    }

    #[test]
    fn tile_urls() {
        let tile = TileCoord { z: 3, x: 4, y: 2 };
        assert_eq!(
            TileSource::Online.url(tile),
            "https://tile.openstreetmap.org/3/4/2.png"
        );
        let offline = TileSource::Offline {
            cache_path: "http://boat.local:5000/tiles/".to_string(),
        };
        assert_eq!(offline.url(tile), "http://boat.local:5000/tiles/3/4/2.png");
    }

    #[test]
    fn center_projects_to_middle_of_viewport() {
        let center = GeoPoint::new(43.7, 10.4).unwrap();
        let viewport = MapViewport {
            center,
            zoom: 14,
            width: 800.0,
            height: 600.0,
        };
        let (x, y) = viewport.to_screen(center);
        assert!((x - 400.0).abs() < 1e-6);
        assert!((y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn visible_tiles_cover_viewport() {
        let viewport = MapViewport {
            center: GeoPoint::new(43.7, 10.4).unwrap(),
            zoom: 14,
            width: 800.0,
            height: 600.0,
        };
        let tiles = viewport.visible_tiles();
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|tile| tile.left > -TILE_SIZE && tile.left < 800.0));
        assert!(tiles.iter().all(|tile| tile.top > -TILE_SIZE && tile.top < 600.0));
        let min_left = tiles.iter().map(|tile| tile.left).fold(f64::MAX, f64::min);
        let min_top = tiles.iter().map(|tile| tile.top).fold(f64::MAX, f64::min);
        assert!(min_left <= 0.0 && min_top <= 0.0);
    }

    #[test]
    fn whole_world_at_zoom_zero() {
        let viewport = MapViewport {
            center: GeoPoint::new(0.0, 0.0).unwrap(),
            zoom: 0,
            width: 256.0,
            height: 256.0,
        };
        let tiles = viewport.visible_tiles();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].coord, TileCoord { z: 0, x: 0, y: 0 });
        assert_eq!((tiles[0].left, tiles[0].top), (0.0, 0.0));
    }

    #[test]
    fn zoom_range_clamps() {
        let range = ZoomRange::new(16, 12);
        assert_eq!(range, ZoomRange { min: 12, max: 16 });
        assert_eq!(range.clamp(DEFAULT_ZOOM), 15);
        assert_eq!(range.clamp(18), 16);
        assert_eq!(range.clamp(3), 12);
    }
}
