use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraId};
use crate::unit::{ResponderUnit, UnitId};
use crate::zone::{Zone, ZoneId};

/// Reference to one entity of the fixed dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Camera(CameraId),
    Zone(ZoneId),
    Unit(UnitId),
}

/// An entity resolved against the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    Camera(&'a Camera),
    Zone(&'a Zone),
    Unit(&'a ResponderUnit),
}

impl Entity<'_> {
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            Self::Camera(c) => EntityRef::Camera(c.id),
            Self::Zone(z) => EntityRef::Zone(z.id),
            Self::Unit(u) => EntityRef::Unit(u.id),
        }
    }
}

impl From<CameraId> for EntityRef {
    fn from(id: CameraId) -> Self {
        Self::Camera(id)
    }
}

impl From<ZoneId> for EntityRef {
    fn from(id: ZoneId) -> Self {
        Self::Zone(id)
    }
}

impl From<UnitId> for EntityRef {
    fn from(id: UnitId) -> Self {
        Self::Unit(id)
    }
}

impl From<Infallible> for EntityRef {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
