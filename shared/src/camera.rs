use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(pub u32);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraStatus {
    Critical,
    Warning,
    Live,
}

impl CameraStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Live => "LIVE",
        }
    }

    /// Legend wording, e.g. "Critical".
    pub fn legend_label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Live => "Live",
        }
    }

    /// Marker color as RGB bytes.
    pub fn color_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Critical => (0xef, 0x44, 0x44),
            Self::Warning => (0xf5, 0x9e, 0x0b),
            Self::Live => (0x10, 0xb9, 0x81),
        }
    }

    pub fn is_alert(self) -> bool {
        !matches!(self, Self::Live)
    }
}

/// A detected threat. Label and confidence only ever travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatDetection {
    pub label: String,
    /// Detector confidence in percent, 0..=100.
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
    pub location: String,
    pub position: LatLng,
    pub status: CameraStatus,
    #[serde(default)]
    pub threat: Option<ThreatDetection>,
    #[serde(default)]
    pub action: Option<String>,
    pub timestamp: String,
}

impl Camera {
    /// Short card summary, e.g. "Machete detected (96%)".
    pub fn threat_summary(&self) -> Option<String> {
        self.threat
            .as_ref()
            .map(|t| format!("{} detected ({}%)", t.label, t.confidence))
    }
}
