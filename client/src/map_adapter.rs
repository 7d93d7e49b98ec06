use std::cell::Cell;
use std::rc::Rc;

use vdma_shared::EntityRef;

use crate::overlay::{HoverInfo, Overlay};
use crate::viewport::MapViewport;

/// Host element a map surface is drawn into.
pub trait RenderTarget {
    /// Attached to a live document and ready to host a surface.
    fn is_attached(&self) -> bool;
    /// Some surface (from any adapter) already lives on this target.
    fn has_surface(&self) -> bool;
}

/// A concrete map drawing backend.
pub trait MapSurface: Sized {
    type Target: RenderTarget;

    fn create(
        target: &Self::Target,
        view: MapViewport,
        overlays: Vec<Overlay>,
        handlers: MapHandlers,
    ) -> Result<Self, String>;

    fn overlay_count(&self) -> usize;

    /// Removes everything `create` attached to the target.
    fn dispose(self);
}

/// Interaction callbacks a surface reports to its screen.
#[derive(Clone)]
pub struct MapHandlers {
    pub on_select: Rc<dyn Fn(EntityRef)>,
    pub on_hover: Rc<dyn Fn(Option<HoverInfo>)>,
}

impl MapHandlers {
    pub fn new(
        on_select: impl Fn(EntityRef) + 'static,
        on_hover: impl Fn(Option<HoverInfo>) + 'static,
    ) -> Self {
        Self {
            on_select: Rc::new(on_select),
            on_hover: Rc::new(on_hover),
        }
    }

    /// Wraps both callbacks so they do nothing once `live` is cleared.
    fn gated(self, live: Rc<Cell<bool>>) -> Self {
        let select_live = live.clone();
        let on_select = self.on_select;
        let on_hover = self.on_hover;
        Self {
            on_select: Rc::new(move |target| {
                if select_live.get() {
                    on_select(target);
                }
            }),
            on_hover: Rc::new(move |info| {
                if live.get() {
                    on_hover(info);
                }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Target not attached yet; nothing was created.
    Deferred,
    /// A surface already exists on the target; nothing was added.
    AlreadyInitialized,
    Initialized,
    Failed(String),
}

/// Owns at most one surface and its handler gate.
pub struct MapAdapter<S: MapSurface> {
    surface: Option<S>,
    live: Rc<Cell<bool>>,
}

impl<S: MapSurface> Default for MapAdapter<S> {
    fn default() -> Self {
        Self {
            surface: None,
            live: Rc::new(Cell::new(false)),
        }
    }
}

impl<S: MapSurface> MapAdapter<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(
        &mut self,
        target: &S::Target,
        view: MapViewport,
        overlays: Vec<Overlay>,
        handlers: MapHandlers,
    ) -> InitOutcome {
        if self.surface.is_some() {
            return InitOutcome::AlreadyInitialized;
        }
        if !target.is_attached() {
            return InitOutcome::Deferred;
        }
        if target.has_surface() {
            return InitOutcome::AlreadyInitialized;
        }

        let live = Rc::new(Cell::new(true));
        let handlers = handlers.gated(live.clone());
        match S::create(target, view, overlays, handlers) {
            Ok(surface) => {
                self.live = live;
                self.surface = Some(surface);
                InitOutcome::Initialized
            }
            Err(reason) => {
                live.set(false);
                InitOutcome::Failed(reason)
            }
        }
    }

    /// Silences handlers, then disposes the surface. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.live.set(false);
        if let Some(surface) = self.surface.take() {
            surface.dispose();
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn overlay_count(&self) -> usize {
        self.surface.as_ref().map_or(0, S::overlay_count)
    }
}

impl<S: MapSurface> Drop for MapAdapter<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// In-memory target and surface for exercising adapters without a DOM.
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use vdma_shared::EntityRef;

    use super::{MapHandlers, MapSurface, RenderTarget};
    use crate::overlay::Overlay;
    use crate::viewport::MapViewport;

    /// Stand-in for a DOM container.
    #[derive(Default)]
    pub(crate) struct FakeTarget {
        pub(crate) attached: Cell<bool>,
        pub(crate) hosting: Rc<Cell<bool>>,
        pub(crate) created: Cell<usize>,
        /// Handlers of the most recent surface, so tests can fire events.
        pub(crate) handlers: RefCell<Option<MapHandlers>>,
    }

    impl FakeTarget {
        pub(crate) fn attached() -> Self {
            let target = Self::default();
            target.attached.set(true);
            target
        }

        pub(crate) fn click(&self, target: EntityRef) {
            let handlers = self.handlers.borrow().clone();
            if let Some(handlers) = handlers {
                (handlers.on_select)(target);
            }
        }
    }

    impl RenderTarget for FakeTarget {
        fn is_attached(&self) -> bool {
            self.attached.get()
        }

        fn has_surface(&self) -> bool {
            self.hosting.get()
        }
    }

    pub(crate) struct RecordingSurface {
        overlays: usize,
        hosting: Rc<Cell<bool>>,
    }

    impl MapSurface for RecordingSurface {
        type Target = FakeTarget;

        fn create(
            target: &FakeTarget,
            _view: MapViewport,
            overlays: Vec<Overlay>,
            handlers: MapHandlers,
        ) -> Result<Self, String> {
            target.hosting.set(true);
            target.created.set(target.created.get() + 1);
            *target.handlers.borrow_mut() = Some(handlers);
            Ok(Self {
                overlays: overlays.len(),
                hosting: target.hosting.clone(),
            })
        }

        fn overlay_count(&self) -> usize {
            self.overlays
        }

        fn dispose(self) {
            self.hosting.set(false);
        }
    }
}
