use std::cell::RefCell;
use std::rc::Rc;

use tiling_core::{CalculateRequest, TileService};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement};

use crate::utils::{meters_to_cm, parse_positive, summary_html};
use crate::{State, draw, log};

const POSITIVE_HINT: &str = "The value must be greater than 0.";

fn input_by_id(doc: &Document, id: &str) -> Option<HtmlInputElement> {
    doc.get_element_by_id(id)?.dyn_into().ok()
}

/// Flag the input as invalid unless it holds a positive number.
fn validate_positive_input(input: &HtmlInputElement) -> Option<f64> {
    match parse_positive(&input.value()) {
        Some(v) => {
            input.set_custom_validity("");
            Some(v)
        }
        None => {
            input.set_custom_validity(POSITIVE_HINT);
            let _ = input.report_validity();
            None
        }
    }
}

// Wires up live validation on the width/height inputs and the submit handler.
pub fn attach_form(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc: Document = state.borrow().document.clone();
    for id in ["width", "height"] {
        if let Some(input) = input_by_id(&doc, id) {
            let input_for_closure = input.clone();
            let oninput = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_e: Event| {
                validate_positive_input(&input_for_closure);
            }));
            input.set_oninput(Some(oninput.as_ref().unchecked_ref()));
            oninput.forget();
        }
    }

    if let Some(form) = doc.get_element_by_id("tileForm") {
        let form: HtmlFormElement = form.dyn_into()?;
        let st = state.clone();
        let onsubmit = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |e: Event| {
            e.prevent_default();
            submit(&mut st.borrow_mut());
        }));
        form.set_onsubmit(Some(onsubmit.as_ref().unchecked_ref()));
        onsubmit.forget();
    }
    Ok(())
}

/// Read the form, run the calculation and refresh the result panel.
pub fn submit(state: &mut State) {
    let doc = state.document.clone();
    let (Some(w_in), Some(h_in)) = (input_by_id(&doc, "width"), input_by_id(&doc, "height")) else {
        log("Width/height inputs are missing");
        return;
    };
    // Validate both so each input shows its own hint.
    let width = validate_positive_input(&w_in);
    let height = validate_positive_input(&h_in);
    let (Some(width_m), Some(height_m)) = (width, height) else {
        return;
    };
    let tile_size = doc
        .get_element_by_id("tileSize")
        .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        .map(|sel| sel.value())
        .unwrap_or_default();

    let request = CalculateRequest::new(meters_to_cm(width_m), meters_to_cm(height_m), tile_size);
    match TileService::new(&state.catalog).calculate(&request) {
        Ok(layout) => {
            if let Some(el) = doc.get_element_by_id("tileCount") {
                el.set_inner_html(&summary_html(&layout));
            }
            if let Some(el) = doc.get_element_by_id("result")
                && let Ok(el) = el.dyn_into::<HtmlElement>()
            {
                let _ = el.style().set_property("display", "block");
            }
            state.layout = Some(layout);
            draw(state);
        }
        Err(err) => {
            log(&format!("Calculation failed: {err}"));
            let _ = state
                .window
                .alert_with_message(&format!("The calculation failed: {err}"));
        }
    }
}
