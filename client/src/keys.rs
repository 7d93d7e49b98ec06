use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

struct EscapeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

impl EscapeBinding {
    fn detach(&self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("keydown", self.handler.as_ref().unchecked_ref());
    }
}

thread_local! {
    static ESCAPE_BINDINGS: RefCell<HashMap<&'static str, EscapeBinding>> = RefCell::new(HashMap::new());
}

/// Runs `on_escape` whenever Escape is pressed outside a text field.
/// Rebinding the same slot replaces the previous handler.
pub fn bind_escape(slot: &'static str, on_escape: impl Fn() + 'static) {
    unbind_escape(slot);
    let Some(window) = web_sys::window() else {
        return;
    };

    let handler = Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
        if e.key() != "Escape" {
            return;
        }
        let target_tag = e
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
            .map(|el| el.tag_name())
            .unwrap_or_default();
        if target_tag == "INPUT" || target_tag == "TEXTAREA" {
            return;
        }
        on_escape();
    });

    if window
        .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        ESCAPE_BINDINGS.with(|bindings| {
            bindings
                .borrow_mut()
                .insert(slot, EscapeBinding { window, handler });
        });
    }
}

pub fn unbind_escape(slot: &'static str) {
    let old = ESCAPE_BINDINGS.with(|bindings| bindings.borrow_mut().remove(slot));
    if let Some(old) = old {
        old.detach();
    }
}
