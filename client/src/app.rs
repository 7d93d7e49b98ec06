use std::cell::RefCell;
use std::sync::Arc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use vdma_shared::Dataset;

use crate::dashboard::Dashboard;
use crate::heatmap::Heatmap;
use crate::inspector::{MONO, MUTED, PANEL_BORDER};
use crate::map_view::MapView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Dashboard,
    Map,
    Heatmap,
}

impl Route {
    pub(crate) const ALL: [Route; 3] = [Self::Dashboard, Self::Map, Self::Heatmap];

    /// Unknown paths land on the dashboard.
    pub(crate) fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/map" => Self::Map,
            "/heatmap" => Self::Heatmap,
            _ => Self::Dashboard,
        }
    }

    pub(crate) fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Map => "/map",
            Self::Heatmap => "/heatmap",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Map => "Map View",
            Self::Heatmap => "Safety Heatmap",
        }
    }
}

fn current_route() -> Route {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .map(|path| Route::from_path(&path))
        .unwrap_or(Route::Dashboard)
}

/// The route to switch to, or `None` when the screen already matches.
/// Same-screen history entries (hash changes) must not remount it.
fn route_change(current: Route, next: Route) -> Option<Route> {
    (current != next).then_some(next)
}

fn navigate(route: Route, current: RwSignal<Route>) {
    if current.get_untracked() == route {
        return;
    }
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok())
        && let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(route.path()))
    {
        web_sys::console::warn_1(&format!("history push failed: path={} {e:?}", route.path()).into());
    }
    current.set(route);
}

fn remove_loading_shell() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(shell) = document.get_element_by_id("app-loading-shell") {
        shell.remove();
    }
}

struct PopStateBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::PopStateEvent)>,
}

thread_local! {
    static POPSTATE_BINDING: RefCell<Option<PopStateBinding>> = const { RefCell::new(None) };
}

#[component]
fn NavLink(route: Route, current: RwSignal<Route>) -> impl IntoView {
    let active = move || current.get() == route;
    view! {
        <a
            href=route.path()
            style="display: flex; align-items: center; gap: 12px; padding: 12px 16px; border-radius: 8px; text-decoration: none; font-weight: 500; font-size: 0.9rem; transition: background 0.15s, color 0.15s;"
            style:background=move || if active() { "rgba(255,255,255,0.05)" } else { "transparent" }
            style:border=move || if active() { "1px solid rgba(255,255,255,0.1)" } else { "1px solid transparent" }
            style:color=move || if active() { "#f4f4f5" } else { "#a1a1aa" }
            on:click=move |e: web_sys::MouseEvent| {
                if e.ctrl_key() || e.meta_key() || e.shift_key() || e.button() != 0 {
                    return;
                }
                e.prevent_default();
                navigate(route, current);
            }
        >
            {route.label()}
        </a>
    }
}

#[component]
fn NavSidebar(current: RwSignal<Route>) -> impl IntoView {
    view! {
        <aside style=format!("width: 256px; flex-shrink: 0; border-right: 1px solid {PANEL_BORDER}; display: flex; flex-direction: column; background: #09090b;")>
            <div style=format!("padding: 24px; border-bottom: 1px solid {PANEL_BORDER};")>
                <h1 style="margin: 0; font-size: 1.2rem; font-weight: 700; letter-spacing: 0.2em;">
                    "VDMA " <span style=format!("color: {MUTED};")>"//"</span> " AI"
                </h1>
            </div>
            <nav style="flex: 1; padding: 16px; display: flex; flex-direction: column; gap: 4px;">
                {Route::ALL
                    .into_iter()
                    .map(|route| view! { <NavLink route=route current=current /> })
                    .collect_view()}
            </nav>
            <div style=format!("padding: 16px; border-top: 1px solid {PANEL_BORDER}; font-size: 0.75rem; display: flex; justify-content: space-between; align-items: center;")>
                <span style=format!("color: {MUTED};")>"System:"</span>
                <span style=format!("color: #34d399; font-family: {MONO}; display: flex; align-items: center; gap: 6px;")>
                    <span style="width: 6px; height: 6px; border-radius: 50%; background: #34d399; animation: vdma-pulse 1.2s ease-in-out infinite;" />
                    "ONLINE"
                </span>
            </div>
        </aside>
    }
}

#[component]
fn DatasetErrorBanner(message: String) -> impl IntoView {
    view! {
        <div style="margin: 48px auto; max-width: 560px; padding: 20px 24px; background: rgba(239,68,68,0.1); border: 1px solid rgba(239,68,68,0.4); border-radius: 10px;">
            <div style="color: #f87171; font-weight: 700; margin-bottom: 6px;">"Dataset unavailable"</div>
            <div style=format!("font-size: 0.85rem; color: #d4d4d8; font-family: {MONO};")>{message}</div>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let route: RwSignal<Route> = RwSignal::new(current_route());

    let dataset = match Dataset::builtin() {
        Ok(data) => Ok(Arc::new(data)),
        Err(e) => {
            web_sys::console::error_1(&format!("builtin dataset rejected: {e}").into());
            Err(e.to_string())
        }
    };

    // Back/forward buttons
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        POPSTATE_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "popstate",
                    old.handler.as_ref().unchecked_ref(),
                );
            }
        });
        let handler = Closure::<dyn Fn(web_sys::PopStateEvent)>::new(move |_| {
            if let Some(next) = route_change(route.get_untracked(), current_route()) {
                route.set(next);
            }
        });
        if window
            .add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            POPSTATE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(PopStateBinding {
                    window: window.clone(),
                    handler,
                });
            });
        }
    });

    Effect::new(remove_loading_shell);

    let screen = match dataset {
        Ok(data) => {
            let screen = move || match route.get() {
                Route::Dashboard => view! { <Dashboard dataset=data.clone() /> }.into_any(),
                Route::Map => view! { <MapView dataset=data.clone() /> }.into_any(),
                Route::Heatmap => view! { <Heatmap dataset=data.clone() /> }.into_any(),
            };
            view! { {screen} }.into_any()
        }
        Err(message) => view! { <DatasetErrorBanner message=message /> }.into_any(),
    };

    view! {
        <div style="display: flex; height: 100vh; background: #09090b; color: #f4f4f5; overflow: hidden;">
            <NavSidebar current=route />
            <main style="flex: 1; min-width: 0; overflow: hidden;">{screen}</main>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_map_to_screens() {
        assert_eq!(Route::from_path("/"), Route::Dashboard);
        assert_eq!(Route::from_path(""), Route::Dashboard);
        assert_eq!(Route::from_path("/dashboard"), Route::Dashboard);
        assert_eq!(Route::from_path("/map"), Route::Map);
        assert_eq!(Route::from_path("/map/"), Route::Map);
        assert_eq!(Route::from_path("/heatmap"), Route::Heatmap);
    }

    #[test]
    fn unknown_paths_fall_back_to_dashboard() {
        assert_eq!(Route::from_path("/analytics"), Route::Dashboard);
        assert_eq!(Route::from_path("/mapping"), Route::Dashboard);
    }

    #[test]
    fn history_entries_for_the_same_screen_keep_it_mounted() {
        assert_eq!(route_change(Route::Dashboard, Route::from_path("/dashboard/")), None);
        assert_eq!(route_change(Route::Dashboard, Route::from_path("/")), None);
        assert_eq!(route_change(Route::Map, Route::Heatmap), Some(Route::Heatmap));
    }

    #[test]
    fn every_route_parses_back_from_its_path() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn nav_labels() {
        let labels: Vec<_> = Route::ALL.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["Dashboard", "Map View", "Safety Heatmap"]);
    }
}
