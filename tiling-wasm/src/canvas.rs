use preview_core::PreviewBox;
use tiling_core::{LayoutResult, tile_color};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

use crate::constants::TILE_LINE_PX;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(color),
    );
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(color),
    );
}

/// Paint every tile of the layout, scaled into `fit`, with the area outline
/// drawn last.
pub fn draw_tiles(ctx: &CanvasRenderingContext2d, layout: &LayoutResult, fit: &PreviewBox) {
    ctx.set_line_width(TILE_LINE_PX);
    set_stroke_style(ctx, "#333");
    for t in &layout.tiles {
        let (x, y) = (t.x * fit.scale, t.y * fit.scale);
        let (w, h) = (t.width * fit.scale, t.height * fit.scale);
        set_fill_style(ctx, &tile_color(t.color_index));
        ctx.fill_rect(x, y, w, h);
        ctx.stroke_rect(x, y, w, h);
    }
    ctx.set_line_width(2.0 * TILE_LINE_PX);
    set_stroke_style(ctx, "#111");
    ctx.stroke_rect(0.0, 0.0, fit.width, fit.height);
}
