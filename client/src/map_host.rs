use std::cell::RefCell;
use std::collections::HashMap;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use web_sys::HtmlElement;

use vdma_shared::EntityRef;

use crate::config::{INITIAL_CENTER, INITIAL_ZOOM};
use crate::map_adapter::{InitOutcome, MapAdapter, MapHandlers, MapSurface};
use crate::overlay::{HoverInfo, Overlay};
use crate::surface::{CanvasSurface, ElementTarget};
use crate::viewport::MapViewport;

/// One mounted map per screen slot. `generation` invalidates deferred inits
/// that resolve after their screen already unmounted.
struct HostSlot<S: MapSurface> {
    generation: u64,
    adapter: MapAdapter<S>,
}

impl<S: MapSurface> Default for HostSlot<S> {
    fn default() -> Self {
        Self {
            generation: 0,
            adapter: MapAdapter::new(),
        }
    }
}

struct HostRegistry<S: MapSurface> {
    slots: HashMap<&'static str, HostSlot<S>>,
}

impl<S: MapSurface> Default for HostRegistry<S> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<S: MapSurface> HostRegistry<S> {
    /// Starts a mount and returns the generation its init must present.
    fn begin(&mut self, slot: &'static str) -> u64 {
        let entry = self.slots.entry(slot).or_default();
        entry.generation += 1;
        entry.generation
    }

    /// Runs the init only if no unmount or newer mount happened since `begin`.
    fn init_if_current(
        &mut self,
        slot: &'static str,
        generation: u64,
        target: &S::Target,
        view: MapViewport,
        overlays: Vec<Overlay>,
        handlers: MapHandlers,
    ) -> Option<InitOutcome> {
        let entry = self.slots.get_mut(slot)?;
        if entry.generation != generation {
            return None;
        }
        Some(entry.adapter.init(target, view, overlays, handlers))
    }

    /// Invalidates pending inits and hands back the adapter for teardown.
    fn unmount(&mut self, slot: &'static str) -> Option<MapAdapter<S>> {
        let entry = self.slots.get_mut(slot)?;
        entry.generation += 1;
        Some(std::mem::take(&mut entry.adapter))
    }
}

thread_local! {
    static HOSTS: RefCell<HostRegistry<CanvasSurface>> = RefCell::new(HostRegistry::default());
}

fn begin(slot: &'static str) -> u64 {
    HOSTS.with(|hosts| hosts.borrow_mut().begin(slot))
}

fn init_if_current(
    slot: &'static str,
    generation: u64,
    target: &ElementTarget,
    overlays: Vec<Overlay>,
    handlers: MapHandlers,
) -> Option<InitOutcome> {
    let view = MapViewport::new(INITIAL_CENTER, INITIAL_ZOOM, 0.0, 0.0);
    HOSTS.with(|hosts| {
        hosts
            .borrow_mut()
            .init_if_current(slot, generation, target, view, overlays, handlers)
    })
}

fn unmount(slot: &'static str) {
    let old = HOSTS.with(|hosts| hosts.borrow_mut().unmount(slot));
    // Dropping the adapter tears the surface down; do it outside the borrow.
    drop(old);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostStatus {
    Loading,
    Ready,
}

/// Container that owns a canvas map for the lifetime of its screen.
///
/// Initialization waits one zero-delay tick so the container is laid out,
/// then runs once. A failed or deferred init leaves the loading text up.
#[component]
pub fn MapHost(
    slot: &'static str,
    overlays: Vec<Overlay>,
    on_select: Callback<EntityRef>,
    on_hover: Callback<Option<HoverInfo>>,
    loading_text: &'static str,
) -> impl IntoView {
    let container_ref = NodeRef::<leptos::html::Div>::new();
    let status = RwSignal::new(HostStatus::Loading);
    let overlays = StoredValue::new(overlays);

    Effect::new(move || {
        let Some(container) = container_ref.get() else {
            return;
        };
        let element: &HtmlElement = &container;
        let element = element.clone();
        let generation = begin(slot);

        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(0).await;
            let target = ElementTarget::new(element);
            let handlers = MapHandlers::new(
                move |target| on_select.run(target),
                move |info| on_hover.run(info),
            );
            let Some(overlays) = overlays.try_get_value() else {
                return;
            };
            match init_if_current(slot, generation, &target, overlays, handlers) {
                Some(InitOutcome::Initialized) | Some(InitOutcome::AlreadyInitialized) => {
                    status.set(HostStatus::Ready);
                }
                Some(InitOutcome::Deferred) => {
                    web_sys::console::info_1(
                        &format!("map init deferred: slot={slot} container not attached").into(),
                    );
                }
                Some(InitOutcome::Failed(reason)) => {
                    web_sys::console::error_1(
                        &format!("map init failed: slot={slot} reason={reason}").into(),
                    );
                }
                None => {}
            }
        });
    });

    on_cleanup(move || unmount(slot));

    view! {
        <div style="position: relative; width: 100%; height: 100%; overflow: hidden; background: #0b0d12;">
            <div node_ref=container_ref style="position: absolute; inset: 0;" />
            <Show when=move || status.get() == HostStatus::Loading>
                <div style="position: absolute; inset: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 10px; color: #8b90a0; font-family: 'Inter', system-ui, sans-serif; font-size: 0.85rem; pointer-events: none;">
                    <div class="map-spinner" />
                    {loading_text}
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use vdma_shared::{CameraId, Dataset};

    use super::*;
    use crate::map_adapter::RenderTarget;
    use crate::map_adapter::testing::{FakeTarget, RecordingSurface};
    use crate::overlay::camera_overlays;

    const SLOT: &str = "map-view";

    fn view() -> MapViewport {
        MapViewport::new(INITIAL_CENTER, INITIAL_ZOOM, 800.0, 600.0)
    }

    fn overlays() -> Vec<Overlay> {
        let data = Dataset::builtin().expect("builtin dataset");
        camera_overlays(&data.cameras)
    }

    fn init(
        hosts: &mut HostRegistry<RecordingSurface>,
        generation: u64,
        target: &FakeTarget,
        log: &Rc<RefCell<Vec<EntityRef>>>,
    ) -> Option<InitOutcome> {
        let log = log.clone();
        let handlers = MapHandlers::new(move |target| log.borrow_mut().push(target), |_| {});
        hosts.init_if_current(SLOT, generation, target, view(), overlays(), handlers)
    }

    #[test]
    fn deferred_init_after_unmount_does_nothing() {
        let mut hosts = HostRegistry::<RecordingSurface>::default();
        let target = FakeTarget::attached();
        let log = Rc::new(RefCell::new(Vec::new()));

        let generation = hosts.begin(SLOT);
        drop(hosts.unmount(SLOT));

        assert_eq!(init(&mut hosts, generation, &target, &log), None);
        assert_eq!(target.created.get(), 0);
        assert!(!target.has_surface());
    }

    #[test]
    fn only_the_latest_mount_initializes() {
        let mut hosts = HostRegistry::<RecordingSurface>::default();
        let target = FakeTarget::attached();
        let log = Rc::new(RefCell::new(Vec::new()));

        let stale = hosts.begin(SLOT);
        drop(hosts.unmount(SLOT));
        let current = hosts.begin(SLOT);

        assert_eq!(init(&mut hosts, stale, &target, &log), None);
        assert_eq!(
            init(&mut hosts, current, &target, &log),
            Some(InitOutcome::Initialized)
        );
        assert_eq!(target.created.get(), 1);
    }

    #[test]
    fn unmount_tears_down_and_silences_the_surface() {
        let mut hosts = HostRegistry::<RecordingSurface>::default();
        let target = FakeTarget::attached();
        let log = Rc::new(RefCell::new(Vec::new()));

        let generation = hosts.begin(SLOT);
        init(&mut hosts, generation, &target, &log);
        target.click(EntityRef::Camera(CameraId(1)));
        assert_eq!(log.borrow().len(), 1);

        let adapter = hosts.unmount(SLOT);
        assert!(adapter.as_ref().is_some_and(MapAdapter::is_initialized));
        drop(adapter);
        assert!(!target.has_surface());
        target.click(EntityRef::Camera(CameraId(2)));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn unknown_slots_are_ignored() {
        let mut hosts = HostRegistry::<RecordingSurface>::default();
        let target = FakeTarget::attached();
        let log = Rc::new(RefCell::new(Vec::new()));
        assert_eq!(init(&mut hosts, 1, &target, &log), None);
        assert!(hosts.unmount("heatmap").is_none());
    }
}
