use vdma_shared::LatLng;

pub const INITIAL_CENTER: LatLng = LatLng::new(28.6139, 77.2090);
pub const INITIAL_ZOOM: u8 = 13;
pub const MIN_ZOOM: u8 = 3;
pub const MAX_ZOOM: u8 = 20;

pub const DEFAULT_TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png";
pub const TILE_SUBDOMAINS: &str = "abcd";
pub const TILE_ATTRIBUTION: &str = "\u{a9} OpenStreetMap contributors \u{a9} CARTO";
pub const MAX_TILES_IN_FLIGHT: usize = 6;
/// Finished tiles kept around for panning back.
pub const MAX_CACHED_TILES: usize = 300;

/// Half the 24px marker.
pub const PIN_HIT_RADIUS_PX: f64 = 12.0;
/// Pointer travel below which a press/release pair counts as a click.
pub const CLICK_SLOP_PX: f64 = 5.0;
/// Minimum spacing between wheel zoom steps.
pub const WHEEL_STEP_INTERVAL_MS: f64 = 120.0;

/// Tile URL template, overridable at build time with `VDMA_TILE_URL`.
pub fn tile_url_template() -> &'static str {
    option_env!("VDMA_TILE_URL")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_TILE_URL)
}
