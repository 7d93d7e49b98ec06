use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::safety::SafetyLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Circular area with an aggregate safety score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub area: String,
    pub center: LatLng,
    pub radius_m: f64,
    /// 0..=100, higher is safer.
    pub safety_score: u8,
    pub recent_incidents: u32,
    #[serde(default)]
    pub incident_types: Vec<String>,
    pub active_units: u32,
    pub last_updated: String,
}

impl Zone {
    pub fn level(&self) -> SafetyLevel {
        SafetyLevel::from_score(self.safety_score as i32)
    }

    pub fn color_rgb(&self) -> (u8, u8, u8) {
        self.level().color_rgb()
    }

    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![
            self.level().label().to_string(),
            format!("Safety Score: {}/100", self.safety_score),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(score: u8) -> Zone {
        Zone {
            id: ZoneId(1),
            area: "Connaught Place".into(),
            center: LatLng::new(28.6139, 77.2090),
            radius_m: 800.0,
            safety_score: score,
            recent_incidents: 12,
            incident_types: vec!["Theft".into()],
            active_units: 3,
            last_updated: "2026-02-15 10:30:00".into(),
        }
    }

    #[test]
    fn tooltip_shows_level_and_score() {
        assert_eq!(
            zone(45).tooltip_lines(),
            vec!["Caution".to_string(), "Safety Score: 45/100".to_string()]
        );
    }

    #[test]
    fn color_tracks_score_band() {
        assert_eq!(zone(88).color_rgb(), SafetyLevel::Safe.color_rgb());
        assert_eq!(zone(38).color_rgb(), SafetyLevel::HighRisk.color_rgb());
    }

    #[test]
    fn missing_incident_types_default_to_empty() {
        let parsed: Zone = serde_json::from_str(
            r#"{
                "id": 5,
                "area": "Rajpath",
                "center": { "lat": 28.5989, "lng": 77.191 },
                "radius_m": 500,
                "safety_score": 92,
                "recent_incidents": 0,
                "active_units": 5,
                "last_updated": "2026-02-15 10:15:00"
            }"#,
        )
        .expect("zone should parse");
        assert!(parsed.incident_types.is_empty());
        assert_eq!(parsed.level(), SafetyLevel::Safe);
    }
}
