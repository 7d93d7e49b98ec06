use vdma_shared::{Camera, EntityRef, LatLng, ResponderUnit, Zone};

use crate::config::PIN_HIT_RADIUS_PX;
use crate::viewport::MapViewport;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    Circle { center: LatLng, radius_m: f64 },
    Pin { position: LatLng },
}

/// A drawable, clickable map shape bound to one dataset entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub target: EntityRef,
    pub shape: OverlayShape,
    pub color: (u8, u8, u8),
    pub tooltip: Vec<String>,
}

impl Overlay {
    pub fn is_pin(&self) -> bool {
        matches!(self.shape, OverlayShape::Pin { .. })
    }

    /// Whether the screen point `(sx, sy)` falls on this overlay.
    pub fn contains(&self, vp: &MapViewport, sx: f64, sy: f64) -> bool {
        let (pos, radius_px) = match &self.shape {
            OverlayShape::Circle { center, radius_m } => {
                (*center, vp.meters_to_pixels(*radius_m, center.lat))
            }
            OverlayShape::Pin { position } => (*position, PIN_HIT_RADIUS_PX),
        };
        let (x, y) = vp.project(pos);
        let dx = sx - x;
        let dy = sy - y;
        dx * dx + dy * dy <= radius_px * radius_px
    }
}

/// Tooltip payload for the overlay under the pointer, in container pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub target: EntityRef,
    pub lines: Vec<String>,
    pub x: f64,
    pub y: f64,
}

impl HoverInfo {
    pub fn at(overlay: &Overlay, x: f64, y: f64) -> Self {
        Self {
            target: overlay.target,
            lines: overlay.tooltip.clone(),
            x,
            y,
        }
    }

    /// First line is the tooltip title, the rest render under it.
    pub fn title(&self) -> &str {
        self.lines.first().map_or("", String::as_str)
    }

    pub fn details(&self) -> &[String] {
        self.lines.get(1..).unwrap_or(&[])
    }
}

pub fn camera_overlays(cameras: &[Camera]) -> Vec<Overlay> {
    cameras
        .iter()
        .map(|camera| Overlay {
            target: EntityRef::Camera(camera.id),
            shape: OverlayShape::Pin {
                position: camera.position,
            },
            color: camera.status.color_rgb(),
            tooltip: vec![
                camera.name.clone(),
                camera.location.clone(),
                camera.status.label().to_string(),
            ],
        })
        .collect()
}

pub fn zone_overlays(zones: &[Zone]) -> Vec<Overlay> {
    zones
        .iter()
        .map(|zone| Overlay {
            target: EntityRef::Zone(zone.id),
            shape: OverlayShape::Circle {
                center: zone.center,
                radius_m: zone.radius_m,
            },
            color: zone.color_rgb(),
            tooltip: zone.tooltip_lines(),
        })
        .collect()
}

pub fn unit_overlays(units: &[ResponderUnit]) -> Vec<Overlay> {
    units
        .iter()
        .map(|unit| Overlay {
            target: EntityRef::Unit(unit.id),
            shape: OverlayShape::Pin {
                position: unit.position,
            },
            color: unit.status.color_rgb(),
            tooltip: unit.tooltip_lines(),
        })
        .collect()
}

/// Indices in paint order: circles first, pins on top, each group stable.
pub fn draw_order(overlays: &[Overlay]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..overlays.len()).collect();
    order.sort_by_key(|&i| overlays[i].is_pin());
    order
}

/// Top-most overlay under `(sx, sy)`.
pub fn hit_test<'a>(
    overlays: &'a [Overlay],
    order: &[usize],
    vp: &MapViewport,
    sx: f64,
    sy: f64,
) -> Option<&'a Overlay> {
    order
        .iter()
        .rev()
        .filter_map(|&i| overlays.get(i))
        .find(|overlay| overlay.contains(vp, sx, sy))
}

#[cfg(test)]
mod tests {
    use vdma_shared::{CameraId, Dataset, UnitId, ZoneId};

    use super::*;
    use crate::config::{INITIAL_CENTER, INITIAL_ZOOM};

    fn dataset() -> Dataset {
        Dataset::builtin().expect("builtin dataset")
    }

    fn view() -> MapViewport {
        MapViewport::new(INITIAL_CENTER, INITIAL_ZOOM, 1200.0, 900.0)
    }

    #[test]
    fn one_overlay_per_entity_in_dataset_order() {
        let data = dataset();
        let cams = camera_overlays(&data.cameras);
        assert_eq!(cams.len(), 6);
        assert_eq!(cams[0].target, EntityRef::Camera(CameraId(1)));
        assert_eq!(cams[0].color, (0xef, 0x44, 0x44));
        assert_eq!(cams[1].color, (0xf5, 0x9e, 0x0b));
        assert_eq!(cams[2].color, (0x10, 0xb9, 0x81));
        assert_eq!(
            cams[0].tooltip,
            vec!["CAM-ALPHA-04", "Sector 4 (Market)", "CRITICAL"]
        );

        let zones = zone_overlays(&data.zones);
        assert_eq!(zones.len(), 8);
        assert_eq!(zones[0].tooltip, vec!["Caution", "Safety Score: 45/100"]);
        assert_eq!(zones[3].color, (0xef, 0x44, 0x44));

        let units = unit_overlays(&data.units);
        assert_eq!(units.len(), 8);
        assert_eq!(
            units[0].tooltip,
            vec!["CP-Alpha", "4 Officers", "Status: ACTIVE"]
        );
    }

    #[test]
    fn pins_paint_after_circles() {
        let data = dataset();
        let mut overlays = unit_overlays(&data.units[..2]);
        overlays.extend(zone_overlays(&data.zones[..2]));
        let order = draw_order(&overlays);
        assert_eq!(order, vec![2, 3, 0, 1]);
    }

    #[test]
    fn pin_on_top_of_circle_wins() {
        let data = dataset();
        // Zone 1 and unit 1 share a center.
        let mut overlays = zone_overlays(&data.zones);
        overlays.extend(unit_overlays(&data.units));
        let order = draw_order(&overlays);
        let vp = view();
        let (x, y) = vp.project(data.zones[0].center);

        let hit = hit_test(&overlays, &order, &vp, x, y).map(|o| o.target);
        assert_eq!(hit, Some(EntityRef::Unit(UnitId(1))));

        // Inside the 800 m circle but outside the 12 px marker.
        let hit = hit_test(&overlays, &order, &vp, x + 30.0, y).map(|o| o.target);
        assert_eq!(hit, Some(EntityRef::Zone(ZoneId(1))));
    }

    #[test]
    fn pin_hit_radius_is_twelve_pixels() {
        let data = dataset();
        let overlays = camera_overlays(&data.cameras[..1]);
        let order = draw_order(&overlays);
        let vp = view();
        let (x, y) = vp.project(data.cameras[0].position);
        assert!(hit_test(&overlays, &order, &vp, x + 11.9, y).is_some());
        assert!(hit_test(&overlays, &order, &vp, x + 12.5, y).is_none());
    }

    #[test]
    fn empty_space_hits_nothing() {
        let data = dataset();
        let overlays = camera_overlays(&data.cameras);
        let order = draw_order(&overlays);
        assert!(hit_test(&overlays, &order, &view(), 2.0, 2.0).is_none());
    }

    #[test]
    fn hovering_a_camera_pin_reports_its_tooltip() {
        let data = dataset();
        let overlays = camera_overlays(&data.cameras);
        let order = draw_order(&overlays);
        let vp = view();
        let (x, y) = vp.project(data.cameras[1].position);

        let info = hit_test(&overlays, &order, &vp, x, y)
            .map(|overlay| HoverInfo::at(overlay, x, y))
            .expect("pin under pointer");
        assert_eq!(info.target, EntityRef::Camera(CameraId(2)));
        assert_eq!(info.title(), "CAM-BRAVO-12");
        assert_eq!(info.details(), ["Sector 7 (Transit Hub)", "WARNING"]);
        assert_eq!((info.x, info.y), (x, y));
    }
}
