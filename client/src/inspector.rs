use leptos::prelude::*;

use vdma_shared::{
    Camera, CameraStatus, Dataset, Entity, EntityRef, ResponderUnit, Selection, Zone,
};

use crate::colors::rgba_css;
use crate::overlay::HoverInfo;
use crate::slide_confirm::SlideConfirm;

/// What an inspector shows for the current selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inspection<'a> {
    Empty,
    Camera(&'a Camera),
    Zone(&'a Zone),
    Unit(&'a ResponderUnit),
}

/// Resolves a selection against the dataset. A selection pointing at an id
/// the dataset does not know inspects as `Empty`.
pub fn inspect<'a, P, S>(dataset: &'a Dataset, selection: &Selection<P, S>) -> Inspection<'a>
where
    P: Into<EntityRef> + Copy,
    S: Into<EntityRef> + Copy,
{
    let target = match (selection.primary(), selection.secondary()) {
        (Some(p), _) => (*p).into(),
        (None, Some(s)) => (*s).into(),
        (None, None) => return Inspection::Empty,
    };
    match dataset.resolve(target) {
        Some(Entity::Camera(camera)) => Inspection::Camera(camera),
        Some(Entity::Zone(zone)) => Inspection::Zone(zone),
        Some(Entity::Unit(unit)) => Inspection::Unit(unit),
        None => Inspection::Empty,
    }
}

/// Controls offered under the dashboard inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionZone {
    /// Slide to dispatch, or the dispatched banner while the latch holds.
    Dispatch { dispatched: bool },
    Monitor,
    NoAction,
}

impl ActionZone {
    pub fn for_status(status: CameraStatus, dispatched: bool) -> Self {
        match status {
            CameraStatus::Critical => Self::Dispatch { dispatched },
            CameraStatus::Warning => Self::Monitor,
            CameraStatus::Live => Self::NoAction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Threat,
    Action,
    Plain,
    Mono,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRow {
    pub label: &'static str,
    pub value: String,
    pub detail: Option<String>,
    pub tone: Tone,
}

/// Telemetry cards for a camera. Threat rows only appear when a threat is
/// present; the timestamp row is always last.
pub fn camera_telemetry(camera: &Camera) -> Vec<TelemetryRow> {
    let mut rows = Vec::new();
    if let Some(threat) = &camera.threat {
        rows.push(TelemetryRow {
            label: "Detected Object",
            value: threat.label.clone(),
            detail: Some(format!("Confidence: {}%", threat.confidence)),
            tone: Tone::Threat,
        });
        if let Some(action) = &camera.action {
            rows.push(TelemetryRow {
                label: "Action",
                value: action.clone(),
                detail: None,
                tone: Tone::Action,
            });
        }
        rows.push(TelemetryRow {
            label: "Location",
            value: camera.location.clone(),
            detail: None,
            tone: Tone::Plain,
        });
    }
    rows.push(TelemetryRow {
        label: "Timestamp",
        value: camera.timestamp.clone(),
        detail: None,
        tone: Tone::Mono,
    });
    rows
}

/// Lines of the threat card in the map popover: object, confidence, and the
/// action when one was classified.
pub fn threat_lines(camera: &Camera) -> Option<Vec<String>> {
    let threat = camera.threat.as_ref()?;
    let mut lines = vec![
        threat.label.clone(),
        format!("Confidence: {}%", threat.confidence),
    ];
    if let Some(action) = &camera.action {
        lines.push(format!("Action: {action}"));
    }
    Some(lines)
}

pub(crate) const PANEL_BG: &str = "#18181b";
pub(crate) const PANEL_BORDER: &str = "rgba(255,255,255,0.1)";
pub(crate) const TEXT: &str = "#f4f4f5";
pub(crate) const MUTED: &str = "#71717a";
pub(crate) const MONO: &str = "'JetBrains Mono', monospace";
pub(crate) const SANS: &str = "'Inter', system-ui, sans-serif";

#[component]
pub fn StatusBadge(label: &'static str, color: (u8, u8, u8)) -> impl IntoView {
    let (r, g, b) = color;
    let luma = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    let text = if luma >= 120.0 { "#09090b" } else { "#ffffff" };
    view! {
        <span style=format!(
            "display: inline-block; padding: 2px 8px; border-radius: 4px; font-size: 0.7rem; font-weight: 700; letter-spacing: 0.04em; text-transform: uppercase; font-family: {MONO}; background: {}; color: {text};",
            rgba_css(r, g, b, 1.0),
        )>
            {label}
        </span>
    }
}

#[component]
fn Card(label: &'static str, children: Children) -> impl IntoView {
    view! {
        <div style=format!("padding: 10px 12px; background: {PANEL_BG}; border: 1px solid {PANEL_BORDER}; border-radius: 8px;")>
            <div style=format!("font-size: 0.7rem; color: {MUTED}; font-family: {SANS};")>{label}</div>
            {children()}
        </div>
    }
}

#[component]
fn AllClear() -> impl IntoView {
    view! {
        <div style=format!("padding: 14px; background: {PANEL_BG}; border: 1px solid {PANEL_BORDER}; border-radius: 8px; text-align: center;")>
            <div style="color: #34d399; font-weight: 600;">"All Clear"</div>
            <div style=format!("font-size: 0.72rem; color: {MUTED}; margin-top: 4px;")>"No threats detected"</div>
        </div>
    }
}

/// Popover chrome with a close button, used by the map screens.
#[component]
pub fn Popover(on_close: Callback<()>, children: Children) -> impl IntoView {
    view! {
        <div style=format!(
            "position: absolute; top: 16px; right: 16px; z-index: 20; width: 280px; padding: 16px; background: rgba(9,9,11,0.92); border: 1px solid {PANEL_BORDER}; border-radius: 10px; box-shadow: 0 8px 24px rgba(0,0,0,0.5); color: {TEXT}; font-family: {SANS};"
        )>
            <button
                title="Close"
                style=format!("position: absolute; top: 8px; right: 10px; background: none; border: none; color: {MUTED}; font-size: 1.1rem; cursor: pointer; line-height: 1;")
                on:click=move |_| on_close.run(())
            >
                "\u{00D7}"
            </button>
            {children()}
        </div>
    }
}

/// Card that follows the hovered overlay on the map screens.
#[component]
pub fn HoverTooltip(hover: RwSignal<Option<HoverInfo>>) -> impl IntoView {
    let tooltip = move || {
        let Some(info) = hover.get() else {
            return ().into_any();
        };
        let details = info
            .details()
            .iter()
            .map(|line| view! { <div>{line.clone()}</div> })
            .collect_view();
        view! {
            <div
                style="position: absolute; z-index: 15; pointer-events: none; transform: translate(-50%, calc(-100% - 14px)); background: rgba(24,24,27,0.95); border: 1px solid rgba(255,255,255,0.1); border-radius: 8px; padding: 8px 12px; font-size: 12px; color: #fafafa; text-align: center; white-space: nowrap;"
                style:left=format!("{}px", info.x)
                style:top=format!("{}px", info.y)
            >
                <strong>{info.title().to_string()}</strong>
                {details}
            </div>
        }
        .into_any()
    };
    view! { {tooltip} }
}

/// Compact camera summary for the map popover.
#[component]
pub fn CameraSummary(camera: Camera) -> impl IntoView {
    let threat = threat_lines(&camera).map(|lines| {
        let mut lines = lines.into_iter();
        let label = lines.next().unwrap_or_default();
        let details = lines
            .map(|line| view! { <div style=format!("color: {MUTED}; margin-top: 2px;")>{line}</div> })
            .collect_view();
        view! {
            <div style="margin-top: 10px; padding: 8px 10px; background: rgba(239,68,68,0.1); border: 1px solid rgba(239,68,68,0.25); border-radius: 6px; font-size: 0.78rem;">
                <div style="color: #f87171; font-weight: 700;">{label}</div>
                {details}
            </div>
        }
    });
    view! {
        <div style=format!("font-family: {MONO}; font-weight: 700; font-size: 0.95rem;")>{camera.name.clone()}</div>
        <div style=format!("font-size: 0.75rem; color: {MUTED}; margin: 2px 0 8px;")>{camera.location.clone()}</div>
        <StatusBadge label=camera.status.label() color=camera.status.color_rgb() />
        {match threat {
            Some(card) => card.into_any(),
            None => view! { <div style="margin-top: 10px;"><AllClear /></div> }.into_any(),
        }}
        <div style=format!("margin-top: 10px; font-size: 0.7rem; color: {MUTED}; font-family: {MONO};")>
            {camera.timestamp.clone()}
        </div>
    }
}

/// Full telemetry stack for the dashboard inspector.
#[component]
pub fn CameraTelemetry(camera: Camera) -> impl IntoView {
    let rows = camera_telemetry(&camera);
    let all_clear = camera.threat.is_none();
    view! {
        <div style="display: flex; flex-direction: column; gap: 10px;">
            {all_clear.then(|| view! { <AllClear /> })}
            {rows
                .into_iter()
                .map(|row| {
                    let value_style = match row.tone {
                        Tone::Threat => "font-size: 1.1rem; font-weight: 700; color: #f87171; margin-top: 4px;".to_string(),
                        Tone::Action => "font-size: 1.1rem; font-weight: 700; color: #fbbf24; margin-top: 4px;".to_string(),
                        Tone::Plain => format!("font-size: 0.85rem; font-weight: 500; color: {TEXT}; margin-top: 4px;"),
                        Tone::Mono => format!("font-size: 0.85rem; color: {TEXT}; font-family: {MONO}; margin-top: 4px;"),
                    };
                    view! {
                        <Card label=row.label>
                            <div style=value_style>{row.value}</div>
                            {row.detail.map(|detail| view! {
                                <div style="font-size: 0.72rem; color: #a1a1aa; margin-top: 2px;">{detail}</div>
                            })}
                        </Card>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
pub fn ZoneDetails(zone: Zone) -> impl IntoView {
    let level = zone.level();
    let (r, g, b) = level.color_rgb();
    let color = rgba_css(r, g, b, 1.0);
    let score_pct = zone.safety_score.min(100);
    let chips = (!zone.incident_types.is_empty()).then(|| {
        let chips = zone
            .incident_types
            .iter()
            .map(|kind| {
                view! {
                    <span style="padding: 2px 8px; border-radius: 4px; background: rgba(239,68,68,0.1); border: 1px solid rgba(239,68,68,0.2); font-size: 0.7rem; color: #f87171;">
                        {kind.clone()}
                    </span>
                }
            })
            .collect_view();
        view! { <div style="display: flex; flex-wrap: wrap; gap: 4px; margin-top: 10px;">{chips}</div> }
    });
    let block = format!("padding: 14px; background: #09090b; border: 1px solid {PANEL_BORDER}; border-radius: 8px;");

    view! {
        <div style="display: flex; align-items: center; gap: 10px; margin-bottom: 14px;">
            <span style=format!("width: 14px; height: 14px; border-radius: 50%; background: {color};") />
            <div>
                <div style="font-weight: 700;">{format!("Zone #{}", zone.id)}</div>
                <div style=format!("font-size: 0.72rem; color: {MUTED};")>{format!("{} \u{00B7} Safety Analysis", zone.area)}</div>
            </div>
        </div>
        <div style="display: flex; flex-direction: column; gap: 12px;">
            <div style=block.clone()>
                <div style="font-size: 0.8rem; color: #a1a1aa;">"Safety Score"</div>
                <div style="display: flex; align-items: flex-end; gap: 6px; margin-top: 6px;">
                    <span style=format!("font-size: 2.2rem; font-weight: 900; line-height: 1; color: {color};")>{zone.safety_score}</span>
                    <span style=format!("color: {MUTED};")>"/100"</span>
                </div>
                <div style="height: 8px; border-radius: 4px; background: #27272a; overflow: hidden; margin-top: 8px;">
                    <div style=format!("height: 100%; width: {score_pct}%; background: {color};") />
                </div>
                <div style=format!("margin-top: 8px; font-size: 0.75rem; font-weight: 700; color: {color};")>{level.label()}</div>
            </div>
            <div style=block.clone()>
                <div style="font-size: 0.8rem; color: #a1a1aa;">"Recent Incidents (24h)"</div>
                <div style="font-size: 1.5rem; font-weight: 700; margin-top: 6px;">{zone.recent_incidents}</div>
                {chips}
            </div>
            <div style=block>
                <div style="font-size: 0.8rem; color: #a1a1aa;">"Active Police Units"</div>
                <div style="font-size: 1.5rem; font-weight: 700; color: #60a5fa; margin-top: 6px;">{zone.active_units}</div>
                <div style=format!("font-size: 0.72rem; color: {MUTED}; margin-top: 4px;")>"Units deployed in this area"</div>
            </div>
            <div style="font-size: 0.72rem; color: #52525b; text-align: center;">
                {format!("Last updated: {}", zone.last_updated)}
            </div>
        </div>
    }
}

#[component]
pub fn UnitDetails(unit: ResponderUnit) -> impl IntoView {
    let row = format!("display: flex; align-items: center; justify-content: space-between; padding: 10px 12px; background: #09090b; border: 1px solid {PANEL_BORDER}; border-radius: 8px;");
    view! {
        <div style="margin-bottom: 14px;">
            <div style="font-weight: 700;">{unit.name.clone()}</div>
            <div style=format!("font-size: 0.72rem; color: {MUTED};")>"Police Unit"</div>
        </div>
        <div style="display: flex; flex-direction: column; gap: 10px;">
            <div style=row.clone()>
                <span style="font-size: 0.85rem; color: #a1a1aa;">"Officers"</span>
                <span style="font-size: 1.1rem; font-weight: 700;">{unit.officers}</span>
            </div>
            <div style=row>
                <span style="font-size: 0.85rem; color: #a1a1aa;">"Status"</span>
                <StatusBadge label=unit.status.label() color=unit.status.color_rgb() />
            </div>
        </div>
    }
}

/// Buttons under the dashboard inspector for the selected camera.
#[component]
pub fn ActionZoneView(action: ActionZone, on_confirm: Callback<()>) -> impl IntoView {
    let button = "width: 100%; height: 44px; border-radius: 8px; font-weight: 500; cursor: pointer; font-family: inherit;";
    match action {
        ActionZone::Dispatch { dispatched } => view! {
            {if dispatched {
                view! {
                    <div style="height: 56px; border-radius: 8px; background: #059669; display: flex; align-items: center; justify-content: center; color: #fff; font-weight: 700;">
                        "\u{2713} UNIT DISPATCHED"
                    </div>
                }
                .into_any()
            } else {
                view! { <SlideConfirm label="SLIDE TO DISPATCH" on_confirm=on_confirm /> }.into_any()
            }}
            <button style=format!("{button} margin-top: 10px; background: transparent; border: 1px solid rgba(255,255,255,0.2); color: #a1a1aa;")>
                "Mark False Positive"
            </button>
        }
        .into_any(),
        ActionZone::Monitor => view! {
            <button style=format!("{button} background: rgba(245,158,11,0.2); border: 1px solid rgba(245,158,11,0.4); color: #fbbf24;")>
                "Monitor Closely"
            </button>
        }
        .into_any(),
        ActionZone::NoAction => view! {
            <div style=format!("text-align: center; padding: 14px 0; font-size: 0.85rem; color: {MUTED};")>
                "No action required"
            </div>
        }
        .into_any(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    use vdma_shared::{CameraId, ConfirmLatch, SlideOutcome, SlideTrack, UnitId, ZoneId};

    use super::*;
    use crate::dispatch::DispatchController;
    use crate::dispatch::testing::ManualClock;

    fn dataset() -> Dataset {
        Dataset::builtin().expect("builtin dataset")
    }

    #[test]
    fn empty_selection_inspects_nothing() {
        let data = dataset();
        let selection: Selection<ZoneId, UnitId> = Selection::default();
        assert_eq!(inspect(&data, &selection), Inspection::Empty);
    }

    #[test]
    fn selection_resolves_to_its_entity() {
        let data = dataset();
        let mut selection: Selection<ZoneId, UnitId> = Selection::default();
        selection.select_primary(ZoneId(4));
        let Inspection::Zone(zone) = inspect(&data, &selection) else {
            panic!("expected a zone");
        };
        assert_eq!(zone.id, ZoneId(4));

        selection.select_secondary(UnitId(2));
        let Inspection::Unit(unit) = inspect(&data, &selection) else {
            panic!("expected a unit");
        };
        assert_eq!(unit.id, UnitId(2));
    }

    #[test]
    fn unknown_id_inspects_as_empty() {
        let data = dataset();
        let selection: Selection<CameraId, Infallible> = Selection::with_primary(CameraId(99));
        assert_eq!(inspect(&data, &selection), Inspection::Empty);
    }

    #[test]
    fn action_zone_follows_status() {
        assert_eq!(
            ActionZone::for_status(CameraStatus::Critical, false),
            ActionZone::Dispatch { dispatched: false }
        );
        assert_eq!(
            ActionZone::for_status(CameraStatus::Warning, true),
            ActionZone::Monitor
        );
        assert_eq!(
            ActionZone::for_status(CameraStatus::Live, false),
            ActionZone::NoAction
        );
    }

    #[test]
    fn quiet_camera_telemetry_is_timestamp_only() {
        let data = dataset();
        let camera = data.camera(CameraId(3)).expect("camera 3");
        let rows = camera_telemetry(camera);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Timestamp");
    }

    #[test]
    fn map_popover_threat_card_includes_the_action() {
        let data = dataset();
        let critical = data.camera(CameraId(1)).expect("camera 1");
        assert_eq!(
            threat_lines(critical),
            Some(vec![
                "Machete".to_string(),
                "Confidence: 96%".to_string(),
                "Action: Lunging".to_string(),
            ])
        );
        let quiet = data.camera(CameraId(3)).expect("camera 3");
        assert_eq!(threat_lines(quiet), None);
    }

    #[test]
    fn critical_camera_dispatch_then_revert() {
        let data = dataset();
        let first = data.first_camera().expect("first camera");
        let selection: Selection<CameraId, Infallible> = Selection::with_primary(first);

        let Inspection::Camera(camera) = inspect(&data, &selection) else {
            panic!("dashboard starts on a camera");
        };
        assert_eq!(camera.status, CameraStatus::Critical);
        let rows = camera_telemetry(camera);
        assert_eq!(rows[0].value, "Machete");
        assert_eq!(rows[0].detail.as_deref(), Some("Confidence: 96%"));

        let clock = Rc::new(ManualClock::default());
        let shown = Rc::new(Cell::new(false));
        let banner = shown.clone();
        let mut dispatch =
            DispatchController::new(clock.clone(), ConfirmLatch::default(), move |on| banner.set(on));
        assert_eq!(
            ActionZone::for_status(camera.status, shown.get()),
            ActionZone::Dispatch { dispatched: false }
        );

        let mut track = SlideTrack::default();
        track.press(0.0);
        track.drag_to(180.0);
        assert_eq!(track.release(), SlideOutcome::Confirmed);
        clock.advance_to(1_000);
        dispatch.fire(clock.now());
        assert_eq!(
            ActionZone::for_status(camera.status, shown.get()),
            ActionZone::Dispatch { dispatched: true }
        );

        clock.advance_to(3_999);
        assert!(shown.get());
        clock.advance_to(4_000);
        assert!(!dispatch.is_confirmed());
        assert_eq!(
            ActionZone::for_status(camera.status, shown.get()),
            ActionZone::Dispatch { dispatched: false }
        );
    }
}
