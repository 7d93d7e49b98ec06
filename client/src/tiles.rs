#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};

use js_sys::Reflect;
use lru::LruCache;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::viewport::TileCoord;

const ONLOAD_HANDLE_KEY: &str = "__vdmaTileOnload";
const ONERROR_HANDLE_KEY: &str = "__vdmaTileOnerror";

/// Expands a `{s}/{z}/{x}/{y}{r}` template for one tile.
pub fn tile_url(template: &str, subdomains: &str, coord: TileCoord, retina: bool) -> String {
    let sub = if subdomains.is_empty() {
        String::new()
    } else {
        let chars: Vec<char> = subdomains.chars().collect();
        let idx = (coord.x as usize + coord.y as usize) % chars.len();
        chars[idx].to_string()
    };
    template
        .replace("{s}", &sub)
        .replace("{z}", &coord.z.to_string())
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
        .replace("{r}", if retina { "@2x" } else { "" })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Queued,
    Loading,
    Ready,
    /// Stays blank; never retried while it is cached.
    Failed,
}

/// Bookkeeping for tile loads: which tiles are wanted, which are in flight,
/// and which finished. Holds at most `max_in_flight` loads at once.
///
/// Finished tiles (ready or failed) live in an LRU of `max_cached` entries.
/// Every `want` refreshes the tiles in view, so eviction only drops tiles the
/// user panned or zoomed away from.
#[derive(Debug)]
pub struct TileBook<T> {
    pending: HashMap<TileCoord, TileState>,
    finished: LruCache<TileCoord, Option<T>>,
    queue: VecDeque<TileCoord>,
    in_flight: usize,
    max_in_flight: usize,
}

impl<T> TileBook<T> {
    pub fn new(max_in_flight: usize, max_cached: usize) -> Self {
        Self {
            pending: HashMap::new(),
            finished: LruCache::new(NonZeroUsize::new(max_cached).unwrap_or(NonZeroUsize::MIN)),
            queue: VecDeque::new(),
            in_flight: 0,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Replaces the pending queue with the tiles of the current view, in
    /// priority order. Tiles already loading or finished are left alone;
    /// queued tiles no longer in view are dropped.
    pub fn want(&mut self, coords: impl IntoIterator<Item = TileCoord>) {
        for coord in self.queue.drain(..) {
            if self.pending.get(&coord) == Some(&TileState::Queued) {
                self.pending.remove(&coord);
            }
        }
        for coord in coords {
            if self.pending.contains_key(&coord) {
                continue;
            }
            // `get` marks the tile recently used.
            if self.finished.get(&coord).is_some() {
                continue;
            }
            self.pending.insert(coord, TileState::Queued);
            self.queue.push_back(coord);
        }
    }

    /// Next tile to start loading, if a slot is free.
    pub fn next_job(&mut self) -> Option<TileCoord> {
        if self.in_flight >= self.max_in_flight {
            return None;
        }
        let coord = self.queue.pop_front()?;
        self.pending.insert(coord, TileState::Loading);
        self.in_flight += 1;
        Some(coord)
    }

    pub fn finish(&mut self, coord: TileCoord, result: Option<T>) {
        if self.pending.get(&coord) != Some(&TileState::Loading) {
            return;
        }
        self.pending.remove(&coord);
        self.in_flight = self.in_flight.saturating_sub(1);
        self.finished.put(coord, result);
    }

    pub fn ready(&self, coord: &TileCoord) -> Option<&T> {
        self.finished.peek(coord).and_then(Option::as_ref)
    }

    pub fn state(&self, coord: &TileCoord) -> Option<TileState> {
        if let Some(state) = self.pending.get(coord) {
            return Some(*state);
        }
        self.finished.peek(coord).map(|tile| match tile {
            Some(_) => TileState::Ready,
            None => TileState::Failed,
        })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn cached(&self) -> usize {
        self.finished.len()
    }
}

struct LoaderInner {
    book: RefCell<TileBook<HtmlImageElement>>,
    pending: RefCell<HashMap<TileCoord, HtmlImageElement>>,
    template: &'static str,
    subdomains: &'static str,
    retina: bool,
    on_ready: Box<dyn Fn()>,
}

/// Fetches remote raster tiles as images, a few at a time.
pub struct TileLoader {
    inner: Rc<LoaderInner>,
}

impl TileLoader {
    pub fn new(
        template: &'static str,
        subdomains: &'static str,
        max_in_flight: usize,
        max_cached: usize,
        on_ready: impl Fn() + 'static,
    ) -> Self {
        let retina = web_sys::window()
            .map(|w| w.device_pixel_ratio() > 1.0)
            .unwrap_or(false);
        Self {
            inner: Rc::new(LoaderInner {
                book: RefCell::new(TileBook::new(max_in_flight, max_cached)),
                pending: RefCell::new(HashMap::new()),
                template,
                subdomains,
                retina,
                on_ready: Box::new(on_ready),
            }),
        }
    }

    pub fn request(&self, coords: impl IntoIterator<Item = TileCoord>) {
        self.inner.book.borrow_mut().want(coords);
        pump(&self.inner);
    }

    pub fn image(&self, coord: &TileCoord) -> Option<HtmlImageElement> {
        self.inner.book.borrow().ready(coord).cloned()
    }

    /// Detaches handlers from every image still loading.
    pub fn dispose(&self) {
        for (_, img) in self.inner.pending.borrow_mut().drain() {
            clear_image_handlers(&img);
            img.set_src("");
        }
    }
}

fn pump(inner: &Rc<LoaderInner>) {
    loop {
        let Some(coord) = inner.book.borrow_mut().next_job() else {
            break;
        };
        if let Err(e) = start_load(inner, coord) {
            web_sys::console::warn_1(
                &format!(
                    "tile load not started z={} x={} y={}: {e}",
                    coord.z, coord.x, coord.y
                )
                .into(),
            );
            inner.book.borrow_mut().finish(coord, None);
        }
    }
}

fn start_load(inner: &Rc<LoaderInner>, coord: TileCoord) -> Result<(), String> {
    let img = HtmlImageElement::new().map_err(|e| format!("{e:?}"))?;

    let weak = Rc::downgrade(inner);
    let onload = Closure::<dyn FnMut()>::new(move || {
        complete(&weak, coord, true);
    });
    let weak = Rc::downgrade(inner);
    let onerror = Closure::<dyn FnMut()>::new(move || {
        complete(&weak, coord, false);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY), &onload_js);
    let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY), &onerror_js);

    inner.pending.borrow_mut().insert(coord, img.clone());
    img.set_src(&tile_url(inner.template, inner.subdomains, coord, inner.retina));
    Ok(())
}

fn complete(weak: &Weak<LoaderInner>, coord: TileCoord, ok: bool) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let Some(img) = inner.pending.borrow_mut().remove(&coord) else {
        return;
    };
    clear_image_handlers(&img);
    inner
        .book
        .borrow_mut()
        .finish(coord, if ok { Some(img) } else { None });
    if ok {
        (inner.on_ready)();
    }
    pump(&inner);
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_TILE_URL, TILE_SUBDOMAINS};

    fn coord(x: u32, y: u32) -> TileCoord {
        TileCoord { z: 13, x, y }
    }

    #[test]
    fn url_fills_every_placeholder() {
        let url = tile_url(DEFAULT_TILE_URL, TILE_SUBDOMAINS, coord(5852, 3415), false);
        // (5852 + 3415) % 4 == 3 -> "d"
        assert_eq!(url, "https://d.basemaps.cartocdn.com/dark_all/13/5852/3415.png");
    }

    #[test]
    fn retina_suffix_only_on_high_dpi() {
        let url = tile_url(DEFAULT_TILE_URL, TILE_SUBDOMAINS, coord(1, 2), true);
        assert_eq!(url, "https://d.basemaps.cartocdn.com/dark_all/13/1/2@2x.png");
    }

    #[test]
    fn subdomains_rotate_and_may_be_absent() {
        let a = tile_url("{s}", "abcd", coord(0, 0), false);
        let b = tile_url("{s}", "abcd", coord(1, 0), false);
        assert_eq!((a.as_str(), b.as_str()), ("a", "b"));
        assert_eq!(tile_url("t/{z}/{x}/{y}", "", coord(3, 4), false), "t/13/3/4");
    }

    #[test]
    fn in_flight_is_capped() {
        let mut book: TileBook<u8> = TileBook::new(2, 16);
        book.want([coord(0, 0), coord(1, 0), coord(2, 0)]);
        assert_eq!(book.next_job(), Some(coord(0, 0)));
        assert_eq!(book.next_job(), Some(coord(1, 0)));
        assert_eq!(book.next_job(), None);
        assert_eq!(book.in_flight(), 2);

        book.finish(coord(0, 0), Some(7));
        assert_eq!(book.ready(&coord(0, 0)), Some(&7));
        assert_eq!(book.next_job(), Some(coord(2, 0)));
    }

    #[test]
    fn failed_tiles_stay_blank_and_are_not_retried() {
        let mut book: TileBook<u8> = TileBook::new(4, 16);
        book.want([coord(5, 5)]);
        let job = book.next_job();
        book.finish(coord(5, 5), None);
        assert_eq!(job, Some(coord(5, 5)));
        assert_eq!(book.state(&coord(5, 5)), Some(TileState::Failed));
        assert_eq!(book.ready(&coord(5, 5)), None);

        book.want([coord(5, 5)]);
        assert_eq!(book.next_job(), None);
    }

    #[test]
    fn want_drops_queued_tiles_out_of_view() {
        let mut book: TileBook<u8> = TileBook::new(1, 16);
        book.want([coord(0, 0), coord(1, 1), coord(2, 2)]);
        assert_eq!(book.next_job(), Some(coord(0, 0)));

        book.want([coord(9, 9)]);
        assert_eq!(book.state(&coord(1, 1)), None);
        assert_eq!(book.state(&coord(0, 0)), Some(TileState::Loading));

        book.finish(coord(0, 0), Some(1));
        assert_eq!(book.next_job(), Some(coord(9, 9)));
        assert_eq!(book.next_job(), None);
    }

    #[test]
    fn stale_finish_is_ignored() {
        let mut book: TileBook<u8> = TileBook::new(1, 16);
        book.finish(coord(3, 3), Some(1));
        assert_eq!(book.state(&coord(3, 3)), None);
        assert_eq!(book.in_flight(), 0);
    }

    fn load(book: &mut TileBook<u8>, at: TileCoord, tile: Option<u8>) {
        book.want([at]);
        assert_eq!(book.next_job(), Some(at));
        book.finish(at, tile);
    }

    #[test]
    fn finished_tiles_are_capped_least_recent_first() {
        let mut book: TileBook<u8> = TileBook::new(1, 2);
        load(&mut book, coord(0, 0), Some(1));
        load(&mut book, coord(1, 0), None);
        assert_eq!(book.cached(), 2);

        // Still in view, so it outlives the failed tile.
        book.want([coord(0, 0)]);
        load(&mut book, coord(2, 0), Some(3));

        assert_eq!(book.cached(), 2);
        assert_eq!(book.ready(&coord(0, 0)), Some(&1));
        assert_eq!(book.state(&coord(1, 0)), None);
        assert_eq!(book.state(&coord(2, 0)), Some(TileState::Ready));
    }

    #[test]
    fn long_sessions_stay_bounded() {
        let mut book: TileBook<u8> = TileBook::new(4, 8);
        for x in 0..100 {
            load(&mut book, coord(x, 0), Some(0));
        }
        assert_eq!(book.cached(), 8);
        assert_eq!(book.state(&coord(99, 0)), Some(TileState::Ready));
        assert_eq!(book.state(&coord(0, 0)), None);
    }
}
