pub mod camera;
pub mod dataset;
pub mod entity;
pub mod geo;
pub mod gesture;
pub mod safety;
pub mod selection;
pub mod unit;
pub mod zone;

pub use camera::{Camera, CameraId, CameraStatus, ThreatDetection};
pub use dataset::{Dataset, DatasetError, ZoneStats};
pub use entity::{Entity, EntityRef};
pub use geo::LatLng;
pub use gesture::{ConfirmLatch, SlideOutcome, SlideTrack};
pub use safety::{SafetyLevel, color_for_score, level_for_score};
pub use selection::Selection;
pub use unit::{ResponderUnit, UnitId, UnitStatus};
pub use zone::{Zone, ZoneId};
