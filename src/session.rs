//! Tick driver tying observer tracking, position updates and gaze matching together.
//!
//! ```text
//! feeds ──ObserverSample──▶ channel ──drain at tick start──▶ ObserverTracker
//!                                                              │ snapshot
//!                     every `recompute_interval_s` ◀───────────┤
//!                         PositionEngine::recompute            │
//!                                                              ▼
//!     pointing (device frame) ──to_sky_frame(heading)──▶ GazeMatcher::update
//! ```
//!
//! Everything runs synchronously inside [`SkySession::tick`]. Feeds may live on
//! other threads; they only ever hold a [`Sender`] and never touch the state.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use anyhow::ensure;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::astro::to_sky_frame;
use crate::gaze::{GazeConfig, GazeEvent, GazeMatcher, GazeState, SelectionInput};
use crate::observer::{ObserverSample, ObserverState, ObserverTracker, DEFAULT_HEADING_SMOOTHING};
use crate::positions::{ComputedPosition, PositionEngine, DEFAULT_SPHERE_RADIUS};
use crate::{SkyCatalog, Vector3};

/// A fixed geographic location, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }
}

/// Parameters for a [`SkySession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Radius of the sphere positions are projected onto. Default 100.
    pub sphere_radius: f64,
    /// Weight of each new compass sample, in `(0, 1]`. Default 0.15.
    pub heading_smoothing: f64,
    /// Minimum seconds between position recomputes. Default 1.0.
    /// Zero recomputes on every tick.
    pub recompute_interval_s: f64,
    /// Location to use until (or unless) a live fix arrives. Default `None`.
    pub fallback_location: Option<GeoLocation>,
    pub gaze: GazeConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sphere_radius: DEFAULT_SPHERE_RADIUS,
            heading_smoothing: DEFAULT_HEADING_SMOOTHING,
            recompute_interval_s: 1.0,
            fallback_location: None,
            gaze: GazeConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.sphere_radius > 0.0 && self.sphere_radius.is_finite(),
            "sphere radius must be positive, got {}",
            self.sphere_radius
        );
        ensure!(
            self.heading_smoothing > 0.0 && self.heading_smoothing <= 1.0,
            "heading smoothing must be in (0, 1], got {}",
            self.heading_smoothing
        );
        ensure!(
            self.recompute_interval_s >= 0.0 && self.recompute_interval_s.is_finite(),
            "recompute interval must be a finite, non-negative number of seconds, got {}",
            self.recompute_interval_s
        );
        if let Some(loc) = self.fallback_location {
            ensure!(
                loc.latitude_deg.abs() <= 90.0 && loc.longitude_deg.is_finite(),
                "invalid fallback location {:?}",
                loc
            );
        }
        self.gaze.validate()
    }
}

/// Owns the per-session state around a shared, read-only catalog.
#[derive(Debug)]
pub struct SkySession {
    catalog: Arc<SkyCatalog>,
    config: SessionConfig,
    tracker: ObserverTracker,
    engine: PositionEngine,
    matcher: GazeMatcher,
    samples_tx: Sender<ObserverSample>,
    samples_rx: Receiver<ObserverSample>,
    /// Seconds since the last recompute; `None` forces one on the next tick.
    since_recompute_s: Option<f64>,
}

impl SkySession {
    /// Create a session. Seeds the fallback location, if configured.
    pub fn new(catalog: Arc<SkyCatalog>, config: SessionConfig, now: DateTime<Utc>) -> anyhow::Result<Self> {
        config.validate()?;

        let mut tracker = ObserverTracker::new(config.heading_smoothing);
        if let Some(loc) = config.fallback_location {
            tracker.seed_fallback(loc.latitude_deg, loc.longitude_deg, now);
        }
        let (samples_tx, samples_rx) = mpsc::channel();

        Ok(Self {
            engine: PositionEngine::new(config.sphere_radius),
            matcher: GazeMatcher::new(config.gaze.clone()),
            catalog,
            config,
            tracker,
            samples_tx,
            samples_rx,
            since_recompute_s: None,
        })
    }

    /// A handle external feeds use to deliver raw samples.
    ///
    /// Samples are queued and applied at the start of the next tick.
    pub fn sample_sender(&self) -> Sender<ObserverSample> {
        self.samples_tx.clone()
    }

    /// Apply a sample immediately, bypassing the queue.
    pub fn apply_sample(&mut self, sample: ObserverSample) -> bool {
        self.ingest(sample)
    }

    /// An accepted position fix forces a recompute on the next tick, so
    /// sidereal time and positions never lag behind the stored location.
    fn ingest(&mut self, sample: ObserverSample) -> bool {
        let accepted = self.tracker.apply(sample);
        if accepted && matches!(sample, ObserverSample::Position { .. }) {
            self.since_recompute_s = None;
        }
        accepted
    }

    /// Forward an external selection input to the gaze matcher.
    pub fn handle_input(&mut self, input: SelectionInput) -> Option<GazeEvent> {
        self.matcher.handle_input(input)
    }

    /// Run one tick.
    ///
    /// `dt_s` is the time since the previous tick. `pointing` is the gaze
    /// direction in the heading-aligned device frame, or `None` while tracking
    /// is lost (which counts as looking at nothing).
    pub fn tick(&mut self, dt_s: f64, now: DateTime<Utc>, pointing: Option<&Vector3>) -> Option<GazeEvent> {
        let mut drained = 0usize;
        while let Ok(sample) = self.samples_rx.try_recv() {
            self.ingest(sample);
            drained += 1;
        }
        if drained > 0 {
            debug!(drained, "Applied queued observer samples");
        }

        let recompute = self.tracker.is_initialized() && self.recompute_due(dt_s);
        if recompute {
            self.tracker.update_sidereal_time(now);
        }

        let observer = self.tracker.snapshot();
        if recompute {
            self.engine.recompute(&self.catalog, &observer, now);
            self.since_recompute_s = Some(0.0);
        }

        match pointing {
            Some(device_dir) => {
                let sky_dir = to_sky_frame(device_dir, observer.heading_deg);
                self.matcher.update(dt_s, &sky_dir, &self.catalog, &observer)
            }
            None => self.matcher.lose_gaze(),
        }
    }

    fn recompute_due(&mut self, dt_s: f64) -> bool {
        match self.since_recompute_s.as_mut() {
            None => true,
            Some(elapsed) => {
                if dt_s.is_finite() && dt_s > 0.0 {
                    *elapsed += dt_s;
                }
                *elapsed >= self.config.recompute_interval_s
            }
        }
    }

    pub fn catalog(&self) -> &Arc<SkyCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Observer state for frame alignment by a renderer.
    pub fn observer(&self) -> &ObserverState {
        self.tracker.state()
    }

    /// Latest computed positions, indexed like the catalog's objects.
    pub fn positions(&self) -> &[ComputedPosition] {
        self.engine.positions()
    }

    pub fn engine(&self) -> &PositionEngine {
        &self.engine
    }

    pub fn gaze_state(&self) -> &GazeState {
        self.matcher.state()
    }

    /// Confirmed region code, if any.
    pub fn confirmed_region(&self) -> Option<&str> {
        self.matcher.confirmed_code()
    }

    pub fn pinned_region(&self) -> Option<&str> {
        self.matcher.pinned_code()
    }
}
