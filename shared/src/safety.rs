use serde::{Deserialize, Serialize};

/// Safety band of a zone, derived purely from its 0..=100 safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    HighRisk,
    Caution,
    Moderate,
    Safe,
}

impl SafetyLevel {
    pub const ALL: [SafetyLevel; 4] = [Self::Safe, Self::Moderate, Self::Caution, Self::HighRisk];

    /// Band for a score. Each band includes its lower bound; scores outside
    /// 0..=100 land in the nearest band.
    pub fn from_score(score: i32) -> Self {
        if score >= 80 {
            Self::Safe
        } else if score >= 60 {
            Self::Moderate
        } else if score >= 40 {
            Self::Caution
        } else {
            Self::HighRisk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Moderate => "Moderate",
            Self::Caution => "Caution",
            Self::HighRisk => "High Risk",
        }
    }

    pub fn color_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Safe => (0x10, 0xb9, 0x81),
            Self::Moderate => (0xfb, 0xbf, 0x24),
            Self::Caution => (0xfb, 0x92, 0x3c),
            Self::HighRisk => (0xef, 0x44, 0x44),
        }
    }

    pub fn color_hex(self) -> String {
        let (r, g, b) = self.color_rgb();
        hex_color(r, g, b)
    }

    /// Inclusive score range shown in the legend.
    pub fn score_range(self) -> (u8, u8) {
        match self {
            Self::Safe => (80, 100),
            Self::Moderate => (60, 79),
            Self::Caution => (40, 59),
            Self::HighRisk => (0, 39),
        }
    }
}

pub fn color_for_score(score: i32) -> (u8, u8, u8) {
    SafetyLevel::from_score(score).color_rgb()
}

pub fn level_for_score(score: i32) -> &'static str {
    SafetyLevel::from_score(score).label()
}

pub fn hex_color(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_scores_start_their_band() {
        assert_eq!(level_for_score(80), "Safe");
        assert_eq!(level_for_score(79), "Moderate");
        assert_eq!(level_for_score(60), "Moderate");
        assert_eq!(level_for_score(59), "Caution");
        assert_eq!(level_for_score(40), "Caution");
        assert_eq!(level_for_score(39), "High Risk");
        assert_eq!(level_for_score(100), "Safe");
        assert_eq!(level_for_score(0), "High Risk");
    }

    #[test]
    fn every_score_maps_to_exactly_one_known_label() {
        let labels: Vec<&str> = SafetyLevel::ALL.iter().map(|l| l.label()).collect();
        for score in 0..=100 {
            let label = level_for_score(score);
            assert_eq!(labels.iter().filter(|l| **l == label).count(), 1);
        }
    }

    #[test]
    fn higher_score_never_maps_to_a_worse_level() {
        let mut previous = SafetyLevel::from_score(0);
        for score in 1..=100 {
            let level = SafetyLevel::from_score(score);
            assert!(level >= previous, "score {score} dropped to {level:?}");
            previous = level;
        }
    }

    #[test]
    fn out_of_range_scores_clamp_to_nearest_band() {
        assert_eq!(SafetyLevel::from_score(-5), SafetyLevel::HighRisk);
        assert_eq!(SafetyLevel::from_score(i32::MIN), SafetyLevel::HighRisk);
        assert_eq!(SafetyLevel::from_score(101), SafetyLevel::Safe);
        assert_eq!(SafetyLevel::from_score(i32::MAX), SafetyLevel::Safe);
    }

    #[test]
    fn colors_follow_bands() {
        assert_eq!(color_for_score(45), (0xfb, 0x92, 0x3c));
        assert_eq!(SafetyLevel::from_score(92).color_hex(), "#10b981");
        assert_eq!(SafetyLevel::from_score(72).color_hex(), "#fbbf24");
        assert_eq!(SafetyLevel::from_score(38).color_hex(), "#ef4444");
    }

    #[test]
    fn legend_ranges_cover_whole_scale_without_overlap() {
        for score in 0..=100u8 {
            let hits = SafetyLevel::ALL
                .iter()
                .filter(|l| {
                    let (lo, hi) = l.score_range();
                    score >= lo && score <= hi
                })
                .count();
            assert_eq!(hits, 1, "score {score}");
            let (lo, hi) = SafetyLevel::from_score(score as i32).score_range();
            assert!(score >= lo && score <= hi);
        }
    }
}
