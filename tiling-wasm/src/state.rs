use std::cell::RefCell;
use std::rc::Rc;

use tiling_core::{Catalog, LayoutResult};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

/// Global application state stored behind an `Rc<RefCell<_>>` so it can be
/// shared across the WASM callbacks.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub catalog: Catalog,
    /// Last successful calculation; redrawn on resize.
    pub layout: Option<LayoutResult>,
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}

/// Run `f` against the live state, if the app has started.
pub fn with_state<R>(f: impl FnOnce(&mut State) -> R) -> Option<R> {
    STATE.with(|st| {
        let st = st.borrow();
        let rc = st.as_ref()?;
        let mut s = rc.borrow_mut();
        Some(f(&mut s))
    })
}
