/// Default track length of the slide control in pixels.
pub const SLIDE_TRACK_LEN: f64 = 200.0;
/// Offset at which a release confirms.
pub const SLIDE_THRESHOLD: f64 = 180.0;
/// How long a confirmation stays visible before reverting.
pub const CONFIRM_HOLD_MS: f64 = 3000.0;

const HINT_MAX_OPACITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    Confirmed,
    Cancelled,
}

/// Drag-to-confirm state: handle offset along a horizontal track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTrack {
    track_len: f64,
    threshold: f64,
    offset: f64,
    origin: Option<f64>,
}

impl Default for SlideTrack {
    fn default() -> Self {
        Self::new(SLIDE_TRACK_LEN, SLIDE_THRESHOLD)
    }
}

impl SlideTrack {
    pub fn new(track_len: f64, threshold: f64) -> Self {
        Self {
            track_len: track_len.max(0.0),
            threshold: threshold.clamp(0.0, track_len.max(0.0)),
            offset: 0.0,
            origin: None,
        }
    }

    /// Starts a drag at pointer position `x`.
    pub fn press(&mut self, x: f64) {
        self.origin = Some(x - self.offset);
    }

    /// Moves the handle under the pointer; ignored when not pressed.
    pub fn drag_to(&mut self, x: f64) {
        let Some(origin) = self.origin else {
            return;
        };
        let offset = x - origin;
        self.offset = if offset.is_finite() {
            offset.clamp(0.0, self.track_len)
        } else {
            0.0
        };
    }

    /// Ends the drag. The handle snaps back to the start either way.
    pub fn release(&mut self) -> SlideOutcome {
        let outcome = if self.origin.is_some() && self.offset >= self.threshold {
            SlideOutcome::Confirmed
        } else {
            SlideOutcome::Cancelled
        };
        self.origin = None;
        self.offset = 0.0;
        outcome
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    /// Label opacity, fading out as the handle travels.
    pub fn hint_opacity(&self) -> f64 {
        if self.track_len <= 0.0 {
            return HINT_MAX_OPACITY;
        }
        HINT_MAX_OPACITY * (1.0 - self.offset / self.track_len)
    }
}

/// Confirmation flag that reverts after a fixed hold.
///
/// Times are milliseconds on any monotonic clock the caller chooses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfirmLatch {
    hold_ms: f64,
    fired_at: Option<f64>,
}

impl Default for ConfirmLatch {
    fn default() -> Self {
        Self::new(CONFIRM_HOLD_MS)
    }
}

impl ConfirmLatch {
    pub fn new(hold_ms: f64) -> Self {
        Self {
            hold_ms,
            fired_at: None,
        }
    }

    pub fn fire(&mut self, now_ms: f64) {
        self.fired_at = Some(now_ms);
    }

    pub fn is_confirmed(&self) -> bool {
        self.fired_at.is_some()
    }

    /// Whether the confirmation is still showing at `now_ms`.
    pub fn is_confirmed_at(&self, now_ms: f64) -> bool {
        match self.fired_at {
            Some(fired) => now_ms - fired < self.hold_ms,
            None => false,
        }
    }

    pub fn release(&mut self) {
        self.fired_at = None;
    }

    pub fn hold_ms(&self) -> f64 {
        self.hold_ms
    }
}
