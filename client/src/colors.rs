/// CSS `rgba()` string for canvas fills and inline styles. Alpha is clamped to `[0, 1]`.
pub fn rgba_css(r: u8, g: u8, b: u8, alpha: f64) -> String {
    format!("rgba({r},{g},{b},{})", alpha.clamp(0.0, 1.0))
}

/// Scales each channel by `factor`, saturating at 255. Hovered markers use this.
pub fn brighten(r: u8, g: u8, b: u8, factor: f64) -> (u8, u8, u8) {
    let scale = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
    (scale(r), scale(g), scale(b))
}
