use std::convert::Infallible;
use std::sync::Arc;

use leptos::prelude::*;

use vdma_shared::{CameraId, CameraStatus, Dataset, EntityRef, Selection};

use crate::colors::rgba_css;
use crate::inspector::{
    CameraSummary, HoverTooltip, Inspection, MUTED, PANEL_BORDER, Popover, inspect,
};
use crate::keys;
use crate::map_host::MapHost;
use crate::overlay::{HoverInfo, camera_overlays};

const SLOT: &str = "map-view";

#[component]
fn StatusLegend() -> impl IntoView {
    let items = [CameraStatus::Critical, CameraStatus::Warning, CameraStatus::Live]
        .into_iter()
        .map(|status| {
            let (r, g, b) = status.color_rgb();
            view! {
                <div style="display: flex; align-items: center; gap: 8px;">
                    <span style=format!(
                        "width: 12px; height: 12px; border-radius: 50%; background: {}; box-shadow: 0 0 10px {};",
                        rgba_css(r, g, b, 1.0),
                        rgba_css(r, g, b, 0.5),
                    ) />
                    <span style="font-size: 0.75rem; color: #a1a1aa;">{status.legend_label()}</span>
                </div>
            }
        })
        .collect_view();
    view! {
        <div style=format!("border-top: 1px solid {PANEL_BORDER}; padding: 16px; background: #09090b; display: flex; align-items: center; justify-content: center; gap: 32px;")>
            {items}
        </div>
    }
}

/// Camera locations on the base map with a click-through popover.
#[component]
pub fn MapView(dataset: Arc<Dataset>) -> impl IntoView {
    let selection: RwSignal<Selection<CameraId, Infallible>> = RwSignal::new(Selection::default());
    let hover: RwSignal<Option<HoverInfo>> = RwSignal::new(None);

    let on_select = Callback::new(move |target: EntityRef| {
        if let EntityRef::Camera(id) = target {
            selection.update(|s| s.select_primary(id));
        }
    });
    let on_hover = Callback::new(move |info: Option<HoverInfo>| hover.set(info));
    let on_close = Callback::new(move |_: ()| selection.update(|s| s.clear()));

    keys::bind_escape(SLOT, move || selection.update(|s| s.clear()));
    on_cleanup(|| keys::unbind_escape(SLOT));

    let overlays = camera_overlays(&dataset.cameras);
    let popover = move || match inspect(&dataset, &selection.get()) {
        Inspection::Camera(camera) => {
            let camera = camera.clone();
            view! {
                <Popover on_close=on_close>
                    <CameraSummary camera=camera />
                </Popover>
            }
            .into_any()
        }
        _ => ().into_any(),
    };

    view! {
        <div style="display: flex; flex-direction: column; height: 100%;">
            <header style=format!("border-bottom: 1px solid {PANEL_BORDER}; padding: 24px; background: #09090b;")>
                <h2 style="margin: 0; font-size: 1.5rem; font-weight: 700;">"Map View"</h2>
                <p style=format!("margin: 4px 0 0; font-size: 0.85rem; color: {MUTED};")>
                    "Geographic distribution of surveillance cameras"
                </p>
            </header>
            <div style="flex: 1; position: relative; min-height: 0;">
                <MapHost
                    slot=SLOT
                    overlays=overlays
                    on_select=on_select
                    on_hover=on_hover
                    loading_text="Loading map..."
                />
                <HoverTooltip hover=hover />
                {popover}
            </div>
            <StatusLegend />
        </div>
    }
}
