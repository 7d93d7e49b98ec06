use leptos::prelude::*;
use wasm_bindgen::JsCast;

use vdma_shared::{SlideOutcome, SlideTrack};

/// Drag-the-handle confirmation. Fires `on_confirm` once per release past the
/// threshold; the handle always springs back.
#[component]
pub fn SlideConfirm(label: &'static str, on_confirm: Callback<()>) -> impl IntoView {
    let track = RwSignal::new(SlideTrack::default());

    let on_down = move |e: web_sys::PointerEvent| {
        if let Some(handle) = e
            .current_target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        {
            handle.set_pointer_capture(e.pointer_id()).ok();
        }
        track.update(|t| t.press(e.client_x() as f64));
    };
    let on_move = move |e: web_sys::PointerEvent| {
        if track.with_untracked(|t| t.is_dragging()) {
            track.update(|t| t.drag_to(e.client_x() as f64));
        }
    };
    let on_up = move |_: web_sys::PointerEvent| {
        if !track.with_untracked(|t| t.is_dragging()) {
            return;
        }
        if track.try_update(|t| t.release()) == Some(SlideOutcome::Confirmed) {
            on_confirm.run(());
        }
    };
    let on_cancel = move |_: web_sys::PointerEvent| {
        track.set(SlideTrack::default());
    };

    view! {
        <div style="position: relative; height: 56px; border-radius: 8px; background: linear-gradient(to right, #dc2626, #ef4444); overflow: hidden; user-select: none; touch-action: none;">
            <div
                style="position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; pointer-events: none;"
                style:opacity=move || track.with(|t| t.hint_opacity()).to_string()
            >
                <span style="color: #fff; font-weight: 700; font-size: 0.82rem; letter-spacing: 0.08em;">{label}</span>
            </div>
            <div
                style="position: absolute; left: 4px; top: 4px; bottom: 4px; width: 52px; background: #fff; border-radius: 6px; display: flex; align-items: center; justify-content: center; box-shadow: 0 2px 8px rgba(0,0,0,0.35); color: #dc2626; font-size: 1.6rem; font-weight: 700; touch-action: none;"
                style:cursor=move || if track.with(|t| t.is_dragging()) { "grabbing" } else { "grab" }
                style:transform=move || format!("translateX({}px)", track.with(|t| t.offset()))
                style:transition=move || if track.with(|t| t.is_dragging()) { "none" } else { "transform 0.2s ease-out" }
                on:pointerdown=on_down
                on:pointermove=on_move
                on:pointerup=on_up
                on:pointercancel=on_cancel
            >
                "\u{203A}"
            </div>
        </div>
    }
}
