use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Edge length of one raster tile in pixels.
pub const TILE_SIZE: f64 = 256.0;
/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
/// Ground resolution at the equator for zoom 0, in meters per pixel.
const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.033_928_041;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Width of the whole world in pixels at `zoom`.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Web Mercator projection to absolute world pixels at `zoom`.
pub fn project(pos: LatLng, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = pos.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (pos.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng { lat, lng }
}

pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
    EQUATOR_METERS_PER_PIXEL * lat.to_radians().cos() / 2f64.powf(zoom)
}
