use std::sync::Arc;

use leptos::prelude::*;

use vdma_shared::{Dataset, EntityRef, SafetyLevel, Selection, UnitId, ZoneId, ZoneStats};

use crate::colors::rgba_css;
use crate::inspector::{
    HoverTooltip, Inspection, MUTED, PANEL_BORDER, Popover, UnitDetails, ZoneDetails, inspect,
};
use crate::keys;
use crate::map_host::MapHost;
use crate::overlay::{HoverInfo, unit_overlays, zone_overlays};

const SLOT: &str = "heatmap";
const FLOATING_CARD: &str = "position: absolute; z-index: 10; background: rgba(24,24,27,0.95); border: 1px solid rgba(255,255,255,0.1); border-radius: 8px; padding: 16px; box-shadow: 0 12px 32px rgba(0,0,0,0.5);";

#[component]
fn SafetyLegend() -> impl IntoView {
    let levels = SafetyLevel::ALL
        .into_iter()
        .map(|level| {
            let (r, g, b) = level.color_rgb();
            let (lo, hi) = level.score_range();
            view! {
                <div style="display: flex; align-items: center; gap: 12px;">
                    <span style=format!(
                        "width: 16px; height: 16px; border-radius: 50%; background: {}; box-shadow: 0 0 10px {};",
                        rgba_css(r, g, b, 1.0),
                        rgba_css(r, g, b, 0.5),
                    ) />
                    <div>
                        <div style="font-size: 0.75rem; font-weight: 500;">{level.label()}</div>
                        <div style=format!("font-size: 0.65rem; color: {MUTED};")>{format!("Score: {lo}-{hi}")}</div>
                    </div>
                </div>
            }
        })
        .collect_view();
    view! {
        <div style=format!("{FLOATING_CARD} bottom: 24px; left: 24px;")>
            <h3 style="margin: 0 0 12px; font-size: 0.85rem; font-weight: 700;">"Safety Index Legend"</h3>
            <div style="display: flex; flex-direction: column; gap: 8px;">
                {levels}
                <div style=format!("border-top: 1px solid {PANEL_BORDER}; padding-top: 8px; margin-top: 4px; display: flex; align-items: center; gap: 12px;")>
                    <span style="width: 16px; height: 16px; border-radius: 50%; background: #3b82f6; border: 2px solid #fff;" />
                    <div>
                        <div style="font-size: 0.75rem; font-weight: 500;">"Police Units"</div>
                        <div style=format!("font-size: 0.65rem; color: {MUTED};")>"Active deployment"</div>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[component]
fn StatsCard(stats: ZoneStats, updated: String) -> impl IntoView {
    let row = "display: flex; align-items: center; justify-content: space-between; gap: 24px;";
    view! {
        <div style=format!("{FLOATING_CARD} top: 24px; left: 24px;")>
            <h3 style="margin: 0 0 12px; font-size: 0.85rem; font-weight: 700;">"Live Statistics"</h3>
            <div style="display: flex; flex-direction: column; gap: 8px;">
                <div style=row>
                    <span style="font-size: 0.75rem; color: #a1a1aa;">"Monitored Zones"</span>
                    <span style="font-size: 0.85rem; font-weight: 700; color: #22d3ee;">{stats.zones}</span>
                </div>
                <div style=row>
                    <span style="font-size: 0.75rem; color: #a1a1aa;">"Police Units"</span>
                    <span style="font-size: 0.85rem; font-weight: 700; color: #60a5fa;">{stats.units}</span>
                </div>
                <div style=row>
                    <span style="font-size: 0.75rem; color: #a1a1aa;">"Avg. Safety Score"</span>
                    <span style="font-size: 0.85rem; font-weight: 700; color: #34d399;">{format!("{}/100", stats.mean_score)}</span>
                </div>
                <div style=format!("border-top: 1px solid {PANEL_BORDER}; padding-top: 8px; margin-top: 4px; font-size: 0.65rem; color: #52525b;")>
                    {format!("Updated: {updated}")}
                </div>
            </div>
        </div>
    }
}

/// Public safety index: zone circles, police units and aggregate stats.
#[component]
pub fn Heatmap(dataset: Arc<Dataset>) -> impl IntoView {
    let selection: RwSignal<Selection<ZoneId, UnitId>> = RwSignal::new(Selection::default());
    let hover: RwSignal<Option<HoverInfo>> = RwSignal::new(None);

    let on_select = Callback::new(move |target: EntityRef| match target {
        EntityRef::Zone(id) => selection.update(|s| s.select_primary(id)),
        EntityRef::Unit(id) => selection.update(|s| s.select_secondary(id)),
        EntityRef::Camera(_) => {}
    });
    let on_hover = Callback::new(move |info: Option<HoverInfo>| hover.set(info));
    let on_close = Callback::new(move |_: ()| selection.update(|s| s.clear()));

    keys::bind_escape(SLOT, move || selection.update(|s| s.clear()));
    on_cleanup(|| keys::unbind_escape(SLOT));

    let mut overlays = zone_overlays(&dataset.zones);
    overlays.extend(unit_overlays(&dataset.units));
    let stats = dataset.zone_stats();
    let updated = chrono::Local::now().format("%H:%M:%S").to_string();

    let popover = move || {
        let body = match inspect(&dataset, &selection.get()) {
            Inspection::Zone(zone) => view! { <ZoneDetails zone=zone.clone() /> }.into_any(),
            Inspection::Unit(unit) => view! { <UnitDetails unit=unit.clone() /> }.into_any(),
            Inspection::Camera(_) | Inspection::Empty => return ().into_any(),
        };
        view! { <Popover on_close=on_close>{body}</Popover> }.into_any()
    };

    view! {
        <div style="display: flex; flex-direction: column; height: 100%;">
            <header style=format!("border-bottom: 1px solid {PANEL_BORDER}; padding: 16px 24px; background: rgba(9,9,11,0.8); display: flex; align-items: center; justify-content: space-between;")>
                <div>
                    <h2 style="margin: 0; font-size: 1.5rem; font-weight: 700;">"Safety Heatmap"</h2>
                    <p style=format!("margin: 4px 0 0; font-size: 0.85rem; color: {MUTED};")>
                        "Crime density and police deployment across the city"
                    </p>
                </div>
                <div style="padding: 8px 16px; background: linear-gradient(to right, rgba(6,182,212,0.1), rgba(59,130,246,0.1)); border: 1px solid rgba(6,182,212,0.3); border-radius: 8px;">
                    <div style="font-size: 0.75rem; font-weight: 700; color: #22d3ee;">"Citizen Safety Portal"</div>
                    <div style=format!("font-size: 0.65rem; color: {MUTED};")>"Public View"</div>
                </div>
            </header>
            <div style="padding: 12px 24px; background: linear-gradient(to right, rgba(22,78,99,0.2), rgba(30,58,138,0.2)); border-bottom: 1px solid rgba(6,182,212,0.2); font-size: 0.85rem; color: #d4d4d8;">
                <span style="font-weight: 700; color: #22d3ee;">"Real-time Safety Index Map"</span>
                " - View crime density and police deployment across the city. Click on zones for detailed information."
            </div>
            <div style="flex: 1; position: relative; min-height: 0;">
                <MapHost
                    slot=SLOT
                    overlays=overlays
                    on_select=on_select
                    on_hover=on_hover
                    loading_text="Loading safety heatmap..."
                />
                <HoverTooltip hover=hover />
                <StatsCard stats=stats updated=updated />
                <SafetyLegend />
                {popover}
            </div>
            <footer style=format!("border-top: 1px solid {PANEL_BORDER}; padding: 12px 24px; background: rgba(9,9,11,0.8); display: flex; align-items: center; justify-content: space-between; font-size: 0.75rem;")>
                <span style=format!("color: {MUTED};")>"Data is anonymized and aggregated for public awareness."</span>
                <span style="color: #52525b;">"\u{00A9} 2026 VDMA AI - Public Safety Initiative"</span>
            </footer>
        </div>
    }
}
