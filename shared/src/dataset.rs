use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::{Camera, CameraId, CameraStatus};
use crate::entity::{Entity, EntityRef};
use crate::geo::LatLng;
use crate::unit::{ResponderUnit, UnitId};
use crate::zone::{Zone, ZoneId};

const BUILTIN_JSON: &str = include_str!("../data/dataset.json");

/// Errors raised while loading a dataset document.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Document is not valid JSON or does not match the model.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entities of one kind share an id.
    #[error("duplicate {kind} id {id}")]
    DuplicateId {
        /// Entity kind ("camera", "zone" or "unit").
        kind: &'static str,
        id: u32,
    },

    #[error("zone {id}: safety score {score} is above 100")]
    ScoreOutOfRange { id: u32, score: u8 },

    #[error("camera {id}: confidence {confidence} is above 100")]
    ConfidenceOutOfRange { id: u32, confidence: u8 },

    #[error("zone {id}: radius must be positive, got {radius_m}")]
    NonPositiveRadius { id: u32, radius_m: f64 },

    #[error("unit {id}: officer count must be at least 1")]
    NoOfficers { id: u32 },

    /// Coordinates are non-finite or outside the lat/lng ranges.
    #[error("{kind} {id}: invalid position ({lat}, {lng})")]
    InvalidPosition {
        kind: &'static str,
        id: u32,
        lat: f64,
        lng: f64,
    },
}

/// Aggregates shown on the safety statistics card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneStats {
    pub zones: usize,
    pub units: usize,
    /// Mean safety score rounded half away from zero; 0 with no zones.
    pub mean_score: u8,
}

/// The fixed set of cameras, zones and responder units.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub cameras: Vec<Camera>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub units: Vec<ResponderUnit>,
}

impl Dataset {
    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_str(raw)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// The dataset compiled into the binary.
    pub fn builtin() -> Result<Self, DatasetError> {
        Self::from_json(BUILTIN_JSON)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        check_unique("camera", self.cameras.iter().map(|c| c.id.0))?;
        check_unique("zone", self.zones.iter().map(|z| z.id.0))?;
        check_unique("unit", self.units.iter().map(|u| u.id.0))?;

        for camera in &self.cameras {
            check_position("camera", camera.id.0, camera.position)?;
            if let Some(threat) = &camera.threat
                && threat.confidence > 100
            {
                return Err(DatasetError::ConfidenceOutOfRange {
                    id: camera.id.0,
                    confidence: threat.confidence,
                });
            }
        }

        for zone in &self.zones {
            check_position("zone", zone.id.0, zone.center)?;
            if zone.safety_score > 100 {
                return Err(DatasetError::ScoreOutOfRange {
                    id: zone.id.0,
                    score: zone.safety_score,
                });
            }
            // NaN fails this comparison too.
            if !(zone.radius_m > 0.0 && zone.radius_m.is_finite()) {
                return Err(DatasetError::NonPositiveRadius {
                    id: zone.id.0,
                    radius_m: zone.radius_m,
                });
            }
        }

        for unit in &self.units {
            check_position("unit", unit.id.0, unit.position)?;
            if unit.officers == 0 {
                return Err(DatasetError::NoOfficers { id: unit.id.0 });
            }
        }

        Ok(())
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&ResponderUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn resolve(&self, target: EntityRef) -> Option<Entity<'_>> {
        match target {
            EntityRef::Camera(id) => self.camera(id).map(Entity::Camera),
            EntityRef::Zone(id) => self.zone(id).map(Entity::Zone),
            EntityRef::Unit(id) => self.unit(id).map(Entity::Unit),
        }
    }

    /// Cameras needing attention first, then live ones, keeping authored order
    /// within each group.
    pub fn feed_order(&self) -> Vec<&Camera> {
        let (mut alerts, live): (Vec<&Camera>, Vec<&Camera>) = self
            .cameras
            .iter()
            .partition(|c| c.status != CameraStatus::Live);
        alerts.extend(live);
        alerts
    }

    pub fn zone_stats(&self) -> ZoneStats {
        let mean_score = if self.zones.is_empty() {
            0
        } else {
            let total: u32 = self.zones.iter().map(|z| z.safety_score as u32).sum();
            (total as f64 / self.zones.len() as f64).round() as u8
        };
        ZoneStats {
            zones: self.zones.len(),
            units: self.units.len(),
            mean_score,
        }
    }

    pub fn first_camera(&self) -> Option<CameraId> {
        self.cameras.first().map(|c| c.id)
    }
}

fn check_unique(kind: &'static str, ids: impl Iterator<Item = u32>) -> Result<(), DatasetError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DatasetError::DuplicateId { kind, id });
        }
    }
    Ok(())
}

fn check_position(kind: &'static str, id: u32, pos: LatLng) -> Result<(), DatasetError> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(DatasetError::InvalidPosition {
            kind,
            id,
            lat: pos.lat,
            lng: pos.lng,
        })
    }
}
