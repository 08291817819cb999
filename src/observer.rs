//! Observer position, smoothed compass heading and local sidereal time.
//!
//! Raw samples come from feeds outside this crate (GPS, compass) on their own
//! schedule. The tracker accepts them either through direct handler calls or as
//! [`ObserverSample`] messages; each handler overwrites whole fields, and the tick
//! code reads one [`ObserverState`] copy at its start, so a tick never sees a
//! half-applied update.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::astro::{local_sidereal_time, sidereal_time, smooth_heading, wrap_degrees};

/// Default weight of a new compass sample in the heading low-pass filter.
pub const DEFAULT_HEADING_SMOOTHING: f64 = 0.15;

/// Snapshot of where the observer is, which way they face, and the sky rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverState {
    /// Geodetic latitude, radians (north positive).
    pub latitude_rad: f64,
    /// Longitude, radians (east positive).
    pub longitude_rad: f64,
    /// Smoothed compass heading, degrees in `[0, 360)`.
    pub heading_deg: f64,
    /// Local sidereal time, radians in `[0, 2π)`.
    pub lst_rad: f64,
    /// Time of the last position or sidereal-time update.
    pub updated_at: Option<DateTime<Utc>>,
    /// Set by the first position fix (or a fallback seed); never cleared.
    pub initialized: bool,
}

impl Default for ObserverState {
    fn default() -> Self {
        Self {
            latitude_rad: 0.0,
            longitude_rad: 0.0,
            heading_deg: 0.0,
            lst_rad: 0.0,
            updated_at: None,
            initialized: false,
        }
    }
}

/// A raw sample from one of the external feeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObserverSample {
    /// GPS fix in degrees.
    Position {
        latitude_deg: f64,
        longitude_deg: f64,
        at: DateTime<Utc>,
    },
    /// Compass reading in degrees.
    Heading { degrees: f64 },
}

/// Owns the [`ObserverState`] and applies raw samples to it.
#[derive(Debug, Clone)]
pub struct ObserverTracker {
    state: ObserverState,
    heading_smoothing: f64,
    has_heading: bool,
}

impl Default for ObserverTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_SMOOTHING)
    }
}

impl ObserverTracker {
    /// Create a tracker. `heading_smoothing` is the weight of each new compass
    /// sample, in `(0, 1]`; out-of-range values are clamped.
    pub fn new(heading_smoothing: f64) -> Self {
        let heading_smoothing = if heading_smoothing.is_finite() {
            heading_smoothing.clamp(f64::EPSILON, 1.0)
        } else {
            DEFAULT_HEADING_SMOOTHING
        };
        Self {
            state: ObserverState::default(),
            heading_smoothing,
            has_heading: false,
        }
    }

    /// Current state by reference.
    pub fn state(&self) -> &ObserverState {
        &self.state
    }

    /// Copy of the current state, for a tick to work from.
    pub fn snapshot(&self) -> ObserverState {
        self.state
    }

    /// `true` once a position fix (or fallback) has been received.
    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn heading_smoothing(&self) -> f64 {
        self.heading_smoothing
    }

    /// Store a raw GPS fix, in degrees. Position is not smoothed.
    ///
    /// Returns `false` (and leaves the state alone) for non-finite input or a
    /// latitude outside ±90°. Longitude is wrapped into `(−180°, 180°]`.
    pub fn set_position(&mut self, latitude_deg: f64, longitude_deg: f64, at: DateTime<Utc>) -> bool {
        if !(latitude_deg.is_finite() && longitude_deg.is_finite()) || latitude_deg.abs() > 90.0 {
            warn!(latitude_deg, longitude_deg, "Rejected position sample");
            return false;
        }

        let first_fix = !self.state.initialized;
        self.state.latitude_rad = latitude_deg.to_radians();
        self.state.longitude_rad = wrap_longitude_deg(longitude_deg).to_radians();
        self.state.updated_at = Some(at);
        self.state.initialized = true;

        if first_fix {
            info!(latitude_deg, longitude_deg, "First position fix");
        } else {
            debug!(latitude_deg, longitude_deg, "Position updated");
        }
        true
    }

    /// Use a fixed location when no live position feed is available.
    ///
    /// Does nothing if a fix has already been received.
    pub fn seed_fallback(&mut self, latitude_deg: f64, longitude_deg: f64, at: DateTime<Utc>) -> bool {
        if self.state.initialized {
            return false;
        }
        let accepted = self.set_position(latitude_deg, longitude_deg, at);
        if accepted {
            info!(latitude_deg, longitude_deg, "Seeded fallback observer location");
        }
        accepted
    }

    /// Feed a raw compass reading, in degrees.
    ///
    /// The first reading is taken as-is; later ones are blended in along the
    /// shorter arc. Non-finite readings are ignored.
    pub fn update_heading(&mut self, heading_deg: f64) -> bool {
        if !heading_deg.is_finite() {
            warn!(heading_deg, "Rejected heading sample");
            return false;
        }
        let target = wrap_degrees(heading_deg);
        self.state.heading_deg = if self.has_heading {
            smooth_heading(self.state.heading_deg, target, self.heading_smoothing)
        } else {
            target
        };
        self.has_heading = true;
        true
    }

    /// Recompute local sidereal time for `now` from the stored longitude.
    pub fn update_sidereal_time(&mut self, now: DateTime<Utc>) {
        self.state.lst_rad = local_sidereal_time(sidereal_time(now), self.state.longitude_rad);
        self.state.updated_at = Some(now);
    }

    /// Apply one queued sample.
    pub fn apply(&mut self, sample: ObserverSample) -> bool {
        match sample {
            ObserverSample::Position {
                latitude_deg,
                longitude_deg,
                at,
            } => self.set_position(latitude_deg, longitude_deg, at),
            ObserverSample::Heading { degrees } => self.update_heading(degrees),
        }
    }
}

/// Wrap a longitude into `(−180, 180]` degrees.
fn wrap_longitude_deg(lon: f64) -> f64 {
    let w = wrap_degrees(lon + 180.0) - 180.0;
    if w == -180.0 {
        180.0
    } else {
        w
    }
}
