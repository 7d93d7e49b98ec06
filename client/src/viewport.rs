use vdma_shared::LatLng;
use vdma_shared::geo::{self, MAX_LATITUDE, TILE_SIZE};

use crate::config::{MAX_ZOOM, MIN_ZOOM};

/// One raster tile addressed in the slippy-map scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile to draw and where its top-left corner lands on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    pub screen_x: f64,
    pub screen_y: f64,
}

/// Pan/zoom state of a Web Mercator map drawn into a `width` x `height` box.
/// Zoom stays on integer levels so tiles are always drawn 1:1.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewport {
    pub center: LatLng,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl MapViewport {
    pub fn new(center: LatLng, zoom: u8, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    fn center_px(&self) -> (f64, f64) {
        geo::project(self.center, self.zoom as f64)
    }

    /// Lat/lng to screen pixels relative to the top-left of the box.
    pub fn project(&self, pos: LatLng) -> (f64, f64) {
        let (cx, cy) = self.center_px();
        let (px, py) = geo::project(pos, self.zoom as f64);
        (
            px - cx + self.width / 2.0,
            py - cy + self.height / 2.0,
        )
    }

    pub fn unproject(&self, sx: f64, sy: f64) -> LatLng {
        let (cx, cy) = self.center_px();
        geo::unproject(
            cx + sx - self.width / 2.0,
            cy + sy - self.height / 2.0,
            self.zoom as f64,
        )
    }

    /// Moves the map so content follows a pointer drag of `(dx, dy)`.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.center_px();
        let size = geo::world_size(self.zoom as f64);
        let next = geo::unproject(cx - dx, (cy - dy).clamp(0.0, size), self.zoom as f64);
        self.center = LatLng::new(
            next.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            wrap_longitude(next.lng),
        );
    }

    /// Steps the zoom by `delta` levels keeping the point under `(sx, sy)` fixed.
    /// Returns false when the zoom is already at its bound.
    pub fn zoom_at(&mut self, delta: i32, sx: f64, sy: f64) -> bool {
        let target = (self.zoom as i32 + delta).clamp(MIN_ZOOM as i32, MAX_ZOOM as i32) as u8;
        if target == self.zoom {
            return false;
        }
        let anchor = self.unproject(sx, sy);
        let (ax, ay) = geo::project(anchor, target as f64);
        let cx = ax - (sx - self.width / 2.0);
        let cy = ay - (sy - self.height / 2.0);
        let size = geo::world_size(target as f64);
        let next = geo::unproject(cx, cy.clamp(0.0, size), target as f64);
        self.zoom = target;
        self.center = LatLng::new(
            next.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            wrap_longitude(next.lng),
        );
        true
    }

    pub fn meters_to_pixels(&self, meters: f64, lat: f64) -> f64 {
        meters / geo::meters_per_pixel(lat, self.zoom as f64)
    }

    /// Tiles covering the box. Columns wrap around the antimeridian; rows
    /// outside the world are skipped.
    pub fn visible_tiles(&self) -> Vec<VisibleTile> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec::new();
        }
        let (cx, cy) = self.center_px();
        let left = cx - self.width / 2.0;
        let top = cy - self.height / 2.0;
        let n = 1i64 << self.zoom;

        let x0 = (left / TILE_SIZE).floor() as i64;
        let x1 = ((left + self.width) / TILE_SIZE).ceil() as i64 - 1;
        let y0 = ((top / TILE_SIZE).floor() as i64).max(0);
        let y1 = (((top + self.height) / TILE_SIZE).ceil() as i64 - 1).min(n - 1);

        let mut tiles = Vec::new();
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                tiles.push(VisibleTile {
                    coord: TileCoord {
                        z: self.zoom,
                        x: tx.rem_euclid(n) as u32,
                        y: ty as u32,
                    },
                    screen_x: tx as f64 * TILE_SIZE - left,
                    screen_y: ty as f64 * TILE_SIZE - top,
                });
            }
        }

        // Center-out so the middle of the view fills first.
        let (mid_x, mid_y) = (self.width / 2.0, self.height / 2.0);
        tiles.sort_by(|a, b| {
            let da = tile_center_distance_sq(a, mid_x, mid_y);
            let db = tile_center_distance_sq(b, mid_x, mid_y);
            da.total_cmp(&db)
        });
        tiles
    }
}

fn tile_center_distance_sq(tile: &VisibleTile, x: f64, y: f64) -> f64 {
    let dx = tile.screen_x + TILE_SIZE / 2.0 - x;
    let dy = tile.screen_y + TILE_SIZE / 2.0 - y;
    dx * dx + dy * dy
}

fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{INITIAL_CENTER, INITIAL_ZOOM};

    fn view() -> MapViewport {
        MapViewport::new(INITIAL_CENTER, INITIAL_ZOOM, 800.0, 600.0)
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn center_projects_to_middle_of_box() {
        let vp = view();
        let (x, y) = vp.project(INITIAL_CENTER);
        assert_close(x, 400.0, 1e-6);
        assert_close(y, 300.0, 1e-6);
    }

    #[test]
    fn unproject_inverts_project() {
        let vp = view();
        let pos = LatLng::new(28.6328, 77.2197);
        let (x, y) = vp.project(pos);
        let back = vp.unproject(x, y);
        assert_close(back.lat, pos.lat, 1e-9);
        assert_close(back.lng, pos.lng, 1e-9);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut vp = view();
        let pos = LatLng::new(28.62, 77.23);
        let (x0, y0) = vp.project(pos);
        vp.pan(40.0, -25.0);
        let (x1, y1) = vp.project(pos);
        assert_close(x1 - x0, 40.0, 1e-6);
        assert_close(y1 - y0, -25.0, 1e-6);
    }

    #[test]
    fn zoom_keeps_anchor_under_cursor() {
        let mut vp = view();
        let anchor = vp.unproject(620.0, 140.0);
        assert!(vp.zoom_at(1, 620.0, 140.0));
        assert_eq!(vp.zoom, 14);
        let (x, y) = vp.project(anchor);
        assert_close(x, 620.0, 1e-6);
        assert_close(y, 140.0, 1e-6);
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let mut vp = MapViewport::new(INITIAL_CENTER, MAX_ZOOM, 800.0, 600.0);
        assert!(!vp.zoom_at(1, 0.0, 0.0));
        assert_eq!(vp.zoom, MAX_ZOOM);

        let mut vp = MapViewport::new(INITIAL_CENTER, MIN_ZOOM, 800.0, 600.0);
        assert!(!vp.zoom_at(-1, 0.0, 0.0));
        assert_eq!(vp.zoom, MIN_ZOOM);

        assert_eq!(MapViewport::new(INITIAL_CENTER, 40, 1.0, 1.0).zoom, MAX_ZOOM);
    }

    #[test]
    fn radius_scales_with_zoom() {
        let mut vp = view();
        let r13 = vp.meters_to_pixels(800.0, 28.6139);
        vp.zoom_at(1, 400.0, 300.0);
        let r14 = vp.meters_to_pixels(800.0, 28.6139);
        assert_close(r14 / r13, 2.0, 1e-9);
        // ~17 m/px at z13 near Delhi
        assert!(r13 > 40.0 && r13 < 60.0, "radius {r13}");
    }

    #[test]
    fn visible_tiles_cover_the_box() {
        let vp = view();
        let tiles = vp.visible_tiles();
        // 800x600 spans 4-5 columns and 3-4 rows of 256px tiles.
        assert!(tiles.len() >= 12 && tiles.len() <= 20, "{} tiles", tiles.len());
        assert!(tiles.iter().all(|t| t.coord.z == INITIAL_ZOOM));
        let min_x = tiles.iter().map(|t| t.screen_x).fold(f64::MAX, f64::min);
        let min_y = tiles.iter().map(|t| t.screen_y).fold(f64::MAX, f64::min);
        assert!(min_x <= 0.0 && min_x > -TILE_SIZE);
        assert!(min_y <= 0.0 && min_y > -TILE_SIZE);
        // The tile under the center comes first.
        let first = tiles[0];
        assert_eq!((first.coord.x, first.coord.y), (5852, 3415));
    }

    #[test]
    fn tiles_wrap_columns_and_drop_rows_outside_world() {
        let vp = MapViewport::new(LatLng::new(84.0, 179.9), MIN_ZOOM, 1024.0, 1024.0);
        let tiles = vp.visible_tiles();
        let n = 1u32 << MIN_ZOOM;
        assert!(tiles.iter().all(|t| t.coord.x < n && t.coord.y < n));
        assert!(tiles.iter().any(|t| t.coord.x == 0));
        assert!(tiles.iter().any(|t| t.coord.x == n - 1));
    }

    #[test]
    fn empty_box_has_no_tiles() {
        let mut vp = view();
        vp.resize(0.0, 0.0);
        assert!(vp.visible_tiles().is_empty());
    }

    #[test]
    fn longitude_wraps_into_range() {
        assert_close(wrap_longitude(190.0), -170.0, 1e-9);
        assert_close(wrap_longitude(-190.0), 170.0, 1e-9);
        assert_close(wrap_longitude(77.2), 77.2, 1e-9);
    }
}
