use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, HtmlElement, PointerEvent,
    WheelEvent,
};

use vdma_shared::EntityRef;
use vdma_shared::geo::TILE_SIZE;

use crate::colors::{brighten, rgba_css};
use crate::config::{
    CLICK_SLOP_PX, MAX_CACHED_TILES, MAX_TILES_IN_FLIGHT, TILE_ATTRIBUTION, TILE_SUBDOMAINS,
    WHEEL_STEP_INTERVAL_MS, tile_url_template,
};
use crate::map_adapter::{MapHandlers, MapSurface, RenderTarget};
use crate::overlay::{HoverInfo, Overlay, OverlayShape, draw_order, hit_test};
use crate::render_loop::RenderScheduler;
use crate::tiles::TileLoader;
use crate::viewport::MapViewport;

/// Class put on a container while it hosts a surface.
pub const CONTAINER_MARKER_CLASS: &str = "vdma-map-container";

const MAP_BACKGROUND: &str = "#0b0d12";
const CANVAS_STYLE: &str = "position: absolute; inset: 0; width: 100%; height: 100%; display: block; touch-action: none; cursor: grab;";
const PIN_OUTER_RADIUS: f64 = 12.0;
const PIN_INNER_RADIUS: f64 = 7.0;

/// Whether a press at `start` released at `end` counts as a click rather than a drag.
pub fn is_click(start: (f64, f64), end: (f64, f64)) -> bool {
    (end.0 - start.0).abs() < CLICK_SLOP_PX && (end.1 - start.1).abs() < CLICK_SLOP_PX
}

/// A DOM element that can host a map canvas.
#[derive(Clone)]
pub struct ElementTarget {
    element: HtmlElement,
}

impl ElementTarget {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl RenderTarget for ElementTarget {
    fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    fn has_surface(&self) -> bool {
        self.element.class_list().contains(CONTAINER_MARKER_CLASS)
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

struct SurfaceState {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    view: RefCell<MapViewport>,
    overlays: Vec<Overlay>,
    order: Vec<usize>,
    handlers: MapHandlers,
    hovered: Cell<Option<EntityRef>>,
    press: Cell<Option<(f64, f64)>>,
    last_pointer: Cell<(f64, f64)>,
    last_wheel_ms: Cell<f64>,
    tiles: RefCell<Option<TileLoader>>,
    scheduler: RefCell<Option<RenderScheduler>>,
}

/// Canvas 2D map: raster tiles underneath, status-colored overlays on top.
pub struct CanvasSurface {
    state: Rc<SurfaceState>,
    listeners: Vec<Listener>,
}

impl MapSurface for CanvasSurface {
    type Target = ElementTarget;

    fn create(
        target: &ElementTarget,
        view: MapViewport,
        overlays: Vec<Overlay>,
        handlers: MapHandlers,
    ) -> Result<Self, String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("document unavailable")?;
        let canvas = document
            .create_element("canvas")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or("canvas element unavailable")?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or("2d context unavailable")?;
        canvas
            .set_attribute("style", CANVAS_STYLE)
            .map_err(|e| format!("canvas style: {e:?}"))?;

        let container = target.element.clone();
        container
            .append_child(&canvas)
            .map_err(|e| format!("append canvas: {e:?}"))?;
        let _ = container.class_list().add_1(CONTAINER_MARKER_CLASS);

        let order = draw_order(&overlays);
        let state = Rc::new(SurfaceState {
            container,
            canvas,
            ctx,
            view: RefCell::new(view),
            overlays,
            order,
            handlers,
            hovered: Cell::new(None),
            press: Cell::new(None),
            last_pointer: Cell::new((0.0, 0.0)),
            last_wheel_ms: Cell::new(0.0),
            tiles: RefCell::new(None),
            scheduler: RefCell::new(None),
        });

        let weak = Rc::downgrade(&state);
        *state.scheduler.borrow_mut() = Some(RenderScheduler::new(move || {
            if let Some(state) = weak.upgrade() {
                state.paint();
            }
        }));
        let weak = Rc::downgrade(&state);
        *state.tiles.borrow_mut() = Some(TileLoader::new(
            tile_url_template(),
            TILE_SUBDOMAINS,
            MAX_TILES_IN_FLIGHT,
            MAX_CACHED_TILES,
            move || {
                if let Some(state) = weak.upgrade() {
                    state.mark_dirty();
                }
            },
        ));

        let mut surface = Self {
            state,
            listeners: Vec::new(),
        };
        if let Err(e) = surface.bind_listeners() {
            surface.dispose();
            return Err(e);
        }
        surface.state.mark_dirty();
        Ok(surface)
    }

    fn overlay_count(&self) -> usize {
        self.state.overlays.len()
    }

    fn dispose(self) {
        for listener in &self.listeners {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        self.state.scheduler.borrow_mut().take();
        if let Some(tiles) = self.state.tiles.borrow_mut().take() {
            tiles.dispose();
        }
        self.state.canvas.remove();
        let _ = self
            .state
            .container
            .class_list()
            .remove_1(CONTAINER_MARKER_CLASS);
    }
}

impl CanvasSurface {
    fn bind_listeners(&mut self) -> Result<(), String> {
        let canvas: EventTarget = self.state.canvas.clone().into();

        self.listen(&canvas, "pointerdown", |state, event| {
            let Ok(e) = event.dyn_into::<PointerEvent>() else {
                return;
            };
            state.on_pointer_down(&e);
        })?;
        self.listen(&canvas, "pointermove", |state, event| {
            let Ok(e) = event.dyn_into::<PointerEvent>() else {
                return;
            };
            state.on_pointer_move(&e);
        })?;
        self.listen(&canvas, "pointerup", |state, event| {
            let Ok(e) = event.dyn_into::<PointerEvent>() else {
                return;
            };
            state.on_pointer_up(&e);
        })?;
        self.listen(&canvas, "pointercancel", |state, _| {
            state.press.set(None);
            state.set_cursor("grab");
        })?;
        self.listen(&canvas, "pointerleave", |state, _| {
            state.on_pointer_leave();
        })?;
        self.listen(&canvas, "wheel", |state, event| {
            let Ok(e) = event.dyn_into::<WheelEvent>() else {
                return;
            };
            state.on_wheel(&e);
        })?;

        if let Some(window) = web_sys::window() {
            let window: EventTarget = window.into();
            self.listen(&window, "resize", |state, _| state.mark_dirty())?;
        }
        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl Fn(&SurfaceState, Event) + 'static,
    ) -> Result<(), String> {
        let weak: Weak<SurfaceState> = Rc::downgrade(&self.state);
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(state) = weak.upgrade() {
                handler(&state, event);
            }
        });
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|e| format!("{kind} listener: {e:?}"))?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            callback,
        });
        Ok(())
    }
}

impl SurfaceState {
    fn mark_dirty(&self) {
        if let Some(scheduler) = self.scheduler.borrow().as_ref() {
            scheduler.mark_dirty();
        }
    }

    fn set_cursor(&self, cursor: &str) {
        let _ = self.canvas.style().set_property("cursor", cursor);
    }

    fn local_point(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (client_x - rect.left(), client_y - rect.top())
    }

    fn overlay_at(&self, x: f64, y: f64) -> Option<&Overlay> {
        let view = self.view.borrow();
        hit_test(&self.overlays, &self.order, &view, x, y)
    }

    fn clear_hover(&self) {
        if self.hovered.take().is_some() {
            (self.handlers.on_hover)(None);
            self.mark_dirty();
        }
    }

    fn on_pointer_down(&self, e: &PointerEvent) {
        let point = (e.client_x() as f64, e.client_y() as f64);
        self.press.set(Some(point));
        self.last_pointer.set(point);
        let _ = self.canvas.set_pointer_capture(e.pointer_id());
        self.set_cursor("grabbing");
        self.clear_hover();
    }

    fn on_pointer_move(&self, e: &PointerEvent) {
        let point = (e.client_x() as f64, e.client_y() as f64);
        if self.press.get().is_some() {
            let (lx, ly) = self.last_pointer.replace(point);
            self.view.borrow_mut().pan(point.0 - lx, point.1 - ly);
            self.mark_dirty();
            return;
        }

        let (x, y) = self.local_point(point.0, point.1);
        let hover = self.overlay_at(x, y).map(|overlay| HoverInfo::at(overlay, x, y));
        match hover {
            Some(info) => {
                if self.hovered.replace(Some(info.target)) != Some(info.target) {
                    self.set_cursor("pointer");
                    self.mark_dirty();
                }
                (self.handlers.on_hover)(Some(info));
            }
            None => {
                if self.hovered.get().is_some() {
                    self.set_cursor("grab");
                }
                self.clear_hover();
            }
        }
    }

    fn on_pointer_up(&self, e: &PointerEvent) {
        let _ = self.canvas.release_pointer_capture(e.pointer_id());
        self.set_cursor("grab");
        let Some(start) = self.press.take() else {
            return;
        };
        let end = (e.client_x() as f64, e.client_y() as f64);
        if !is_click(start, end) {
            return;
        }
        let (x, y) = self.local_point(end.0, end.1);
        let target = self.overlay_at(x, y).map(|overlay| overlay.target);
        if let Some(target) = target {
            (self.handlers.on_select)(target);
        }
    }

    fn on_pointer_leave(&self) {
        if self.press.get().is_none() {
            self.clear_hover();
        }
    }

    fn on_wheel(&self, e: &WheelEvent) {
        e.prevent_default();
        let now = js_sys::Date::now();
        if now - self.last_wheel_ms.get() < WHEEL_STEP_INTERVAL_MS {
            return;
        }
        let delta = if e.delta_y() < 0.0 {
            1
        } else if e.delta_y() > 0.0 {
            -1
        } else {
            return;
        };
        let (x, y) = self.local_point(e.client_x() as f64, e.client_y() as f64);
        let zoomed = self.view.borrow_mut().zoom_at(delta, x, y);
        if zoomed {
            self.last_wheel_ms.set(now);
            self.clear_hover();
            self.mark_dirty();
        }
    }

    fn paint(&self) {
        let w = self.container.client_width() as f64;
        let h = self.container.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let dpr = web_sys::window()
            .map(|win| win.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let pw = (w * dpr).round() as u32;
        let ph = (h * dpr).round() as u32;
        if self.canvas.width() != pw || self.canvas.height() != ph {
            self.canvas.set_width(pw);
            self.canvas.set_height(ph);
        }
        let ctx = &self.ctx;
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        self.view.borrow_mut().resize(w, h);
        let view = self.view.borrow().clone();

        ctx.set_fill_style_str(MAP_BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);

        self.paint_tiles(&view);
        for &idx in &self.order {
            if let Some(overlay) = self.overlays.get(idx) {
                self.paint_overlay(&view, overlay, w, h);
            }
        }
        self.paint_attribution(w, h);
    }

    fn paint_tiles(&self, view: &MapViewport) {
        let tiles = self.tiles.borrow();
        let Some(tiles) = tiles.as_ref() else {
            return;
        };
        let visible = view.visible_tiles();
        tiles.request(visible.iter().map(|tile| tile.coord));
        for tile in &visible {
            let Some(image) = tiles.image(&tile.coord) else {
                continue;
            };
            // Floor the start and ceil the end so neighbouring tiles overlap by
            // up to a pixel instead of leaving seams.
            let sx = tile.screen_x.floor();
            let sy = tile.screen_y.floor();
            let sw = (tile.screen_x + TILE_SIZE).ceil() - sx;
            let sh = (tile.screen_y + TILE_SIZE).ceil() - sy;
            let _ = self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(&image, sx, sy, sw, sh);
        }
    }

    fn paint_overlay(&self, view: &MapViewport, overlay: &Overlay, w: f64, h: f64) {
        let ctx = &self.ctx;
        let hovered = self.hovered.get() == Some(overlay.target);
        let (r, g, b) = overlay.color;
        match &overlay.shape {
            OverlayShape::Circle { center, radius_m } => {
                let (x, y) = view.project(*center);
                let radius = view.meters_to_pixels(*radius_m, center.lat);
                if x + radius < 0.0 || y + radius < 0.0 || x - radius > w || y - radius > h {
                    return;
                }
                ctx.begin_path();
                let _ = ctx.arc(x, y, radius, 0.0, TAU);
                ctx.set_fill_style_str(&rgba_css(r, g, b, if hovered { 0.5 } else { 0.35 }));
                ctx.fill();
                ctx.set_stroke_style_str(&rgba_css(r, g, b, 0.9));
                ctx.set_line_width(if hovered { 3.0 } else { 2.0 });
                ctx.stroke();
            }
            OverlayShape::Pin { position } => {
                let (x, y) = view.project(*position);
                if x < -PIN_OUTER_RADIUS
                    || y < -PIN_OUTER_RADIUS
                    || x > w + PIN_OUTER_RADIUS
                    || y > h + PIN_OUTER_RADIUS
                {
                    return;
                }
                let (r, g, b) = if hovered { brighten(r, g, b, 1.2) } else { (r, g, b) };
                ctx.begin_path();
                let _ = ctx.arc(x, y, PIN_OUTER_RADIUS, 0.0, TAU);
                ctx.set_fill_style_str(&rgba_css(r, g, b, 0.3));
                ctx.fill();

                ctx.begin_path();
                let _ = ctx.arc(x, y, PIN_INNER_RADIUS, 0.0, TAU);
                ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
                ctx.fill();
                ctx.set_stroke_style_str("#ffffff");
                ctx.set_line_width(2.0);
                ctx.stroke();
            }
        }
    }

    fn paint_attribution(&self, w: f64, h: f64) {
        let ctx = &self.ctx;
        ctx.set_font("10px 'Inter', sans-serif");
        let text_w = ctx
            .measure_text(TILE_ATTRIBUTION)
            .map(|m| m.width())
            .unwrap_or(160.0);
        ctx.set_fill_style_str("rgba(11, 13, 18, 0.7)");
        ctx.fill_rect(w - text_w - 12.0, h - 16.0, text_w + 12.0, 16.0);
        ctx.set_fill_style_str("rgba(200, 204, 216, 0.75)");
        let _ = ctx.fill_text(TILE_ATTRIBUTION, w - text_w - 6.0, h - 5.0);
    }
}
