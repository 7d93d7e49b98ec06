use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::sync::Arc;

use leptos::prelude::*;

use vdma_shared::{Camera, CameraId, CameraStatus, ConfirmLatch, Dataset, Selection};

use crate::colors::rgba_css;
use crate::dispatch::{DispatchController, TimeoutScheduler};
use crate::inspector::{
    ActionZone, ActionZoneView, CameraTelemetry, Inspection, MONO, MUTED, PANEL_BORDER, StatusBadge,
    inspect,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    Feed,
}

/// Dispatch state of the mounted dashboard, tagged with its mount. Dropping
/// the controller cancels the revert.
struct DispatchSlot {
    mount: u64,
    controller: DispatchController<TimeoutScheduler>,
}

thread_local! {
    static DISPATCH: RefCell<Option<DispatchSlot>> = const { RefCell::new(None) };
    static DISPATCH_MOUNTS: Cell<u64> = const { Cell::new(0) };
}

fn card_frame(status: CameraStatus, selected: bool) -> String {
    let (r, g, b) = status.color_rgb();
    let (border, fill) = match status {
        CameraStatus::Live => ("rgba(255,255,255,0.1)".to_string(), "#18181b".to_string()),
        _ => (rgba_css(r, g, b, 1.0), rgba_css(r, g, b, 0.1)),
    };
    let ring = if selected {
        "box-shadow: 0 0 0 2px rgba(244,244,245,0.6);"
    } else {
        ""
    };
    format!(
        "border: 2px solid {border}; background: {fill}; border-radius: 8px; overflow: hidden; cursor: pointer; transition: transform 0.15s; {ring}"
    )
}

#[component]
fn VideoGlyph(size: u32) -> impl IntoView {
    view! {
        <svg width=size.to_string() height=size.to_string() viewBox="0 0 24 24" fill="none" stroke="#3f3f46" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d="m16 13 5.2 3.5a.5.5 0 0 0 .8-.4V7.9a.5.5 0 0 0-.8-.4L16 11" />
            <rect x="2" y="6" width="14" height="12" rx="2" />
        </svg>
    }
}

#[component]
fn VideoPlaceholder(camera: Camera, large: bool) -> impl IntoView {
    let alert = camera.status.is_alert().then(|| {
        let (r, g, b) = camera.status.color_rgb();
        let pulse = if camera.status == CameraStatus::Critical {
            "animation: vdma-pulse 1.2s ease-in-out infinite;"
        } else {
            ""
        };
        view! {
            <div style=format!(
                "position: absolute; top: 12px; right: 12px; color: {}; font-size: 1.3rem; {pulse}",
                rgba_css(r, g, b, 1.0),
            )>
                "\u{26A0}"
            </div>
        }
    });
    view! {
        <div style="aspect-ratio: 16 / 9; background: #000; position: relative; display: flex; align-items: center; justify-content: center;">
            <VideoGlyph size=if large { 64 } else { 48 } />
            {alert}
            <div style="position: absolute; top: 12px; left: 12px; display: flex; align-items: center; gap: 6px; background: rgba(0,0,0,0.6); padding: 2px 8px; border-radius: 4px;">
                <span style="width: 8px; height: 8px; border-radius: 50%; background: #ef4444; animation: vdma-pulse 1.2s ease-in-out infinite;" />
                <span style=format!("font-size: 0.7rem; font-family: {MONO}; color: #d4d4d8;")>"LIVE"</span>
            </div>
        </div>
    }
}

#[component]
fn GridCard(camera: Camera, selected: Signal<bool>, on_pick: Callback<CameraId>) -> impl IntoView {
    let id = camera.id;
    let status = camera.status;
    let summary = camera.threat_summary();
    view! {
        <div style=move || card_frame(status, selected.get()) on:click=move |_| on_pick.run(id)>
            <VideoPlaceholder camera=camera.clone() large=false />
            <div style="padding: 14px; display: flex; flex-direction: column; gap: 6px;">
                <div style="display: flex; align-items: center; justify-content: space-between;">
                    <span style=format!("font-family: {MONO}; font-weight: 700; font-size: 0.85rem;")>{camera.name.clone()}</span>
                    <StatusBadge label=status.label() color=status.color_rgb() />
                </div>
                <div style="font-size: 0.75rem; color: #a1a1aa;">{camera.location.clone()}</div>
                {summary.map(|text| view! {
                    <div style="font-size: 0.75rem; color: #f87171; font-weight: 500;">{format!("\u{26A0} {text}")}</div>
                })}
            </div>
        </div>
    }
}

#[component]
fn FeedCard(camera: Camera, selected: Signal<bool>, on_pick: Callback<CameraId>) -> impl IntoView {
    let id = camera.id;
    let status = camera.status;
    let threat = camera.threat.clone().map(|threat| {
        let action = camera.action.clone();
        view! {
            <div style="padding: 14px; background: rgba(239,68,68,0.1); border: 1px solid rgba(239,68,68,0.2); border-radius: 8px;">
                <div style="color: #f87171; font-weight: 700;">"\u{26A0} THREAT DETECTED"</div>
                <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 8px; margin-top: 8px; font-size: 0.85rem;">
                    <div><span style=format!("color: {MUTED};")>"Object:"</span> " " {threat.label}</div>
                    <div><span style=format!("color: {MUTED};")>"Confidence:"</span> " " {format!("{}%", threat.confidence)}</div>
                    {action.map(|action| view! {
                        <div><span style=format!("color: {MUTED};")>"Action:"</span> " " {action}</div>
                    })}
                </div>
            </div>
        }
    });
    view! {
        <div style=move || card_frame(status, selected.get()) on:click=move |_| on_pick.run(id)>
            <VideoPlaceholder camera=camera.clone() large=true />
            <div style="padding: 20px; display: flex; flex-direction: column; gap: 14px;">
                <div style="display: flex; align-items: flex-start; justify-content: space-between;">
                    <div>
                        <div style=format!("font-family: {MONO}; font-weight: 700; font-size: 1.05rem;")>{camera.name.clone()}</div>
                        <div style="font-size: 0.85rem; color: #a1a1aa; margin-top: 4px;">{camera.location.clone()}</div>
                    </div>
                    <StatusBadge label=status.label() color=status.color_rgb() />
                </div>
                {threat}
                <div style=format!("font-size: 0.72rem; color: {MUTED}; font-family: {MONO};")>{camera.timestamp.clone()}</div>
            </div>
        </div>
    }
}

#[component]
fn ModeButton(mode: ViewMode, label: &'static str, view_mode: RwSignal<ViewMode>) -> impl IntoView {
    view! {
        <button
            style="padding: 8px 16px; border: none; border-radius: 6px; font-size: 0.85rem; font-weight: 500; cursor: pointer; font-family: inherit;"
            style:background=move || if view_mode.get() == mode { "rgba(255,255,255,0.1)" } else { "transparent" }
            style:color=move || if view_mode.get() == mode { "#f4f4f5" } else { "#71717a" }
            on:click=move |_| view_mode.set(mode)
        >
            {label}
        </button>
    }
}

/// Live operations: camera wall plus the incident inspector.
#[component]
pub fn Dashboard(dataset: Arc<Dataset>) -> impl IntoView {
    let initial = dataset
        .first_camera()
        .map(Selection::with_primary)
        .unwrap_or_default();
    let selection: RwSignal<Selection<CameraId, Infallible>> = RwSignal::new(initial);
    let view_mode = RwSignal::new(ViewMode::Grid);
    let dispatched = RwSignal::new(false);

    let mount = DISPATCH_MOUNTS.with(|mounts| {
        mounts.set(mounts.get() + 1);
        mounts.get()
    });
    let controller = DispatchController::new(TimeoutScheduler, ConfirmLatch::default(), move |on| {
        dispatched.set(on)
    });
    let old = DISPATCH.with(|slot| slot.borrow_mut().replace(DispatchSlot { mount, controller }));
    drop(old);

    let on_pick = Callback::new(move |id: CameraId| selection.update(|s| s.select_primary(id)));
    let on_dispatch = Callback::new(move |_: ()| {
        DISPATCH.with(|slot| {
            if let Some(current) = slot.borrow_mut().as_mut() {
                current.controller.fire(js_sys::Date::now());
            }
        });
    });

    on_cleanup(move || {
        let old = DISPATCH.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.as_ref().is_some_and(|current| current.mount == mount) {
                slot.take()
            } else {
                None
            }
        });
        drop(old);
    });

    let is_selected = move |id: CameraId| {
        Signal::derive(move || selection.with(|s| s.primary() == Some(&id)))
    };

    let cards_data = dataset.clone();
    let cards = move || {
        let data = cards_data.clone();
        match view_mode.get() {
            ViewMode::Grid => view! {
                <div style="display: grid; grid-template-columns: repeat(3, minmax(0, 1fr)); gap: 16px;">
                    {data
                        .cameras
                        .iter()
                        .map(|camera| view! {
                            <GridCard camera=camera.clone() selected=is_selected(camera.id) on_pick=on_pick />
                        })
                        .collect_view()}
                </div>
            }
            .into_any(),
            ViewMode::Feed => view! {
                <div style="max-width: 672px; margin: 0 auto; display: flex; flex-direction: column; gap: 16px;">
                    {data
                        .feed_order()
                        .into_iter()
                        .map(|camera| view! {
                            <FeedCard camera=camera.clone() selected=is_selected(camera.id) on_pick=on_pick />
                        })
                        .collect_view()}
                </div>
            }
            .into_any(),
        }
    };

    let inspected = move || {
        let sel = selection.get();
        match inspect(&dataset, &sel) {
            Inspection::Camera(camera) => Some(camera.clone()),
            _ => None,
        }
    };

    view! {
        <div style="display: flex; height: 100%; overflow: hidden;">
            <div style="flex: 1; display: flex; flex-direction: column; overflow: hidden;">
                <header style=format!("border-bottom: 1px solid {PANEL_BORDER}; padding: 24px; background: #09090b; display: flex; align-items: center; justify-content: space-between;")>
                    <div>
                        <h2 style="margin: 0; font-size: 1.5rem; font-weight: 700;">"Live Operations"</h2>
                        <p style=format!("margin: 4px 0 0; font-size: 0.85rem; color: {MUTED};")>
                            "Real-time threat detection and monitoring"
                        </p>
                    </div>
                    <div style=format!("display: flex; gap: 6px; background: #18181b; padding: 4px; border-radius: 8px; border: 1px solid {PANEL_BORDER};")>
                        <ModeButton mode=ViewMode::Grid label="Grid" view_mode=view_mode />
                        <ModeButton mode=ViewMode::Feed label="Feed" view_mode=view_mode />
                    </div>
                </header>
                <div style="flex: 1; overflow: auto; padding: 24px;">{cards}</div>
            </div>
            <aside style=format!("width: 320px; border-left: 1px solid {PANEL_BORDER}; display: flex; flex-direction: column; background: rgba(24,24,27,0.6);")>
                {move || match inspected() {
                    Some(camera) => {
                        let action = ActionZone::for_status(camera.status, dispatched.get());
                        view! {
                            <div style=format!("padding: 24px; border-bottom: 1px solid {PANEL_BORDER};")>
                                <h3 style="margin: 0; font-size: 1.1rem; font-weight: 700;">"Incident Inspector"</h3>
                                <p style=format!("margin: 4px 0 0; font-size: 0.75rem; color: {MUTED};")>
                                    {format!("Selected: {}", camera.name)}
                                </p>
                            </div>
                            <div style="padding: 16px;">
                                <div style=format!("border-radius: 8px; overflow: hidden; border: 1px solid {PANEL_BORDER};")>
                                    <VideoPlaceholder camera=camera.clone() large=true />
                                </div>
                            </div>
                            <div style="flex: 1; padding: 0 16px 16px; overflow: auto;">
                                <h4 style=format!("margin: 0 0 12px; font-size: 0.7rem; font-weight: 700; color: {MUTED}; text-transform: uppercase; letter-spacing: 0.08em;")>
                                    "Telemetry"
                                </h4>
                                <CameraTelemetry camera=camera.clone() />
                            </div>
                            <div style=format!("padding: 16px; border-top: 1px solid {PANEL_BORDER};")>
                                <ActionZoneView action=action on_confirm=on_dispatch />
                            </div>
                        }
                        .into_any()
                    }
                    None => view! {
                        <div style=format!("padding: 24px; color: {MUTED}; font-size: 0.85rem;")>"No camera selected"</div>
                    }
                    .into_any(),
                }}
            </aside>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_cards_use_the_neutral_frame() {
        let frame = card_frame(CameraStatus::Live, false);
        assert!(frame.contains("border: 2px solid rgba(255,255,255,0.1)"));
        assert!(!frame.contains("box-shadow"));
    }

    #[test]
    fn alert_cards_take_their_status_color() {
        let frame = card_frame(CameraStatus::Critical, true);
        assert!(frame.contains("rgba(239,68,68,1)"));
        assert!(frame.contains("rgba(239,68,68,0.1)"));
        assert!(frame.contains("box-shadow"));
    }
}
