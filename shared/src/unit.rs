use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Active,
    Responding,
    Standby,
}

impl UnitStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Responding => "responding",
            Self::Standby => "standby",
        }
    }

    pub fn color_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Active => (0x3b, 0x82, 0xf6),
            Self::Responding => (0xf5, 0x9e, 0x0b),
            Self::Standby => (0x6b, 0x72, 0x80),
        }
    }
}

/// Mobile responder unit on the safety map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponderUnit {
    pub id: UnitId,
    pub position: LatLng,
    pub name: String,
    pub officers: u32,
    pub status: UnitStatus,
}

impl ResponderUnit {
    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("{} Officers", self.officers),
            format!("Status: {}", self.status.label().to_ascii_uppercase()),
        ]
    }
}
