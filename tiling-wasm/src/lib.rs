use std::cell::RefCell;
use std::rc::Rc;

use preview_core::{MAX_PREVIEW_H, MAX_PREVIEW_W, fit_preview};
use tiling_core::Catalog;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Blob, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlOptionElement, HtmlSelectElement, Url,
};

mod canvas;
mod constants;
mod form;
mod state;
mod utils;

use crate::constants::{CONTAINER_GUTTER_PX, EXPORT_MAX_H, EXPORT_MAX_W, EXPORT_PAD_PX};
pub use crate::state::{STATE, State, with_state};
pub use crate::utils::log;
use crate::utils::{get_query_param, sync_canvas_size};

/// Redraw the preview for the last calculated layout, sized to the current
/// container width.
pub(crate) fn draw(state: &mut State) {
    let Some(layout) = state.layout.as_ref() else {
        return;
    };
    let container_w = state
        .canvas
        .parent_element()
        .map(|p| p.client_width() as f64)
        .unwrap_or(MAX_PREVIEW_W)
        - CONTAINER_GUTTER_PX;
    let fit = fit_preview(
        layout.area_width,
        layout.area_height,
        container_w.min(MAX_PREVIEW_W),
        MAX_PREVIEW_H,
    );
    let style = state.canvas.style();
    let _ = style.set_property("width", &format!("{}px", fit.width));
    let _ = style.set_property("height", &format!("{}px", fit.height));

    let dpr = sync_canvas_size(state, fit.width, fit.height);
    let _ = state.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    state.ctx.clear_rect(0.0, 0.0, fit.width, fit.height);
    canvas::draw_tiles(&state.ctx, layout, &fit);
}

fn populate_sizes(document: &Document, sizes: &[String]) -> Result<(), JsValue> {
    let Some(el) = document.get_element_by_id("tileSize") else {
        log("size select #tileSize not found");
        return Ok(());
    };
    let select: HtmlSelectElement = el.dyn_into()?;
    select.set_inner_html("");
    for key in sizes {
        let opt = HtmlOptionElement::new_with_text_and_value(&format!("{key} cm"), key)?;
        select.append_child(&opt)?;
    }
    Ok(())
}

/// Fill the form from `?w=..&h=..&size=..` (meters) and calculate right away
/// when all three are present.
fn prefill_from_query(state: &mut State) {
    let Ok(search) = state.window.location().search() else {
        return;
    };
    let doc = state.document.clone();
    let mut complete = true;
    for (param, id) in [("w", "width"), ("h", "height")] {
        match (
            get_query_param(&search, param),
            doc.get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok()),
        ) {
            (Some(v), Some(input)) => input.set_value(&v),
            _ => complete = false,
        }
    }
    match (
        get_query_param(&search, "size"),
        doc.get_element_by_id("tileSize")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok()),
    ) {
        (Some(v), Some(sel)) => sel.set_value(&v),
        _ => complete = false,
    }
    if complete {
        form::submit(state);
    }
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    form::attach_form(state.clone())?;

    // Export PNG of the current layout
    if let Some(btn) = doc.get_element_by_id("exportPng") {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Err(e) = export_png(&st.borrow()) {
                log(&format!("PNG export failed: {:?}", e));
            }
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Keep the preview fitted to its container
    let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        with_state(draw);
    }));
    state
        .borrow()
        .window
        .set_onresize(Some(onresize.as_ref().unchecked_ref()));
    onresize.forget();
    Ok(())
}

fn export_png(state: &State) -> Result<(), JsValue> {
    let Some(layout) = &state.layout else {
        let _ = state
            .window
            .alert_with_message("Calculate a layout before exporting.");
        return Ok(());
    };
    let fit = fit_preview(layout.area_width, layout.area_height, EXPORT_MAX_W, EXPORT_MAX_H);
    let bytes = preview_core::render_png(layout, &fit, EXPORT_PAD_PX)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    // Create Blob and trigger download
    let array = js_sys::Array::new();
    let u8 = js_sys::Uint8Array::from(bytes.as_slice());
    array.push(&u8);
    let blob = Blob::new_with_u8_array_sequence(&array)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let a = state
        .document
        .create_element("a")?
        .dyn_into::<HtmlElement>()?;
    a.set_attribute("href", &url)?;
    a.set_attribute(
        "download",
        &format!("tiles_{}x{}.png", layout.tile_width, layout.tile_height),
    )?;
    a.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}

fn init_canvas(
    document: &Document,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id("tilePreview")
        .ok_or_else(|| JsValue::from_str("canvas #tilePreview not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let (canvas, ctx) = init_canvas(&document)?;

    let catalog = Catalog::default();
    populate_sizes(&document, &catalog.list_keys())?;

    let state = Rc::new(RefCell::new(State {
        window,
        document,
        canvas,
        ctx,
        catalog,
        layout: None,
    }));
    STATE.with(|st| st.replace(Some(state.clone())));
    attach_ui(state.clone())?;
    prefill_from_query(&mut state.borrow_mut());
    Ok(())
}

/// `listSizes` for host scripts: catalog keys in display order.
#[wasm_bindgen(js_name = listSizes)]
pub fn list_sizes() -> js_sys::Array {
    let keys = with_state(|s| s.catalog.list_keys())
        .unwrap_or_else(|| Catalog::default().list_keys());
    keys.iter().map(|k| JsValue::from_str(k)).collect()
}

/// `calculate` for host scripts: takes and returns the JSON wire format.
#[wasm_bindgen(js_name = calculate)]
pub fn calculate(body: &str) -> Result<String, JsValue> {
    let result = with_state(|s| tiling_core::calculate_json(&s.catalog, body))
        .unwrap_or_else(|| tiling_core::calculate_json(&Catalog::default(), body));
    result.map_err(|e| JsValue::from_str(&e.to_string()))
}
