use tiling_core::LayoutResult;
use tiling_core::constants::CM_PER_M;
use wasm_bindgen::JsValue;

use crate::state::State;

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

/// Ensure the canvas backing store matches the CSS size and device pixel ratio
/// to keep tile edges crisp. Returns the ratio used.
pub fn sync_canvas_size(state: &State, css_w: f64, css_h: f64) -> f64 {
    let dpr = state.window.device_pixel_ratio().max(1.0);
    let target_w = (css_w * dpr).round().clamp(1.0, 10000.0) as u32;
    let target_h = (css_h * dpr).round().clamp(1.0, 10000.0) as u32;
    if state.canvas.width() != target_w {
        state.canvas.set_width(target_w);
    }
    if state.canvas.height() != target_h {
        state.canvas.set_height(target_h);
    }
    dpr
}

/// Parse a form value that must be a finite number greater than zero.
pub fn parse_positive(raw: &str) -> Option<f64> {
    let v: f64 = raw.trim().replace(',', ".").parse().ok()?;
    (v.is_finite() && v > 0.0).then_some(v)
}

/// The form takes meters; the catalog is in centimeters.
pub fn meters_to_cm(m: f64) -> f64 {
    m * CM_PER_M
}

pub fn summary_html(layout: &LayoutResult) -> String {
    format!(
        "<strong>Tiles needed:</strong> {} pcs ({:.2} m&sup2;), {} cut<br>\
         <strong>Best layout:</strong> {}<br>\
         <strong>Tile size:</strong> {}x{} cm",
        layout.total_tiles,
        layout.total_area,
        layout.partial_tiles(),
        layout.orientation_label(),
        layout.tile_width,
        layout.tile_height
    )
}

/// Simple query string parser used at start-up.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_encoding::percent_decode_str(&s)
        .decode_utf8_lossy()
        .to_string()
}
