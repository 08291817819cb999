//! Gaze-to-region matching with dwell-time confirmation.
//!
//! Every tick the matcher takes the current pointing direction (already in the
//! sky frame, see [`to_sky_frame`](crate::astro::to_sky_frame)), finds the
//! nearest region centroid within [`GazeConfig::match_threshold_rad`], and runs
//! a small state machine:
//!
//! ```text
//! Idle ──(nearest centroid within threshold)──▶ Candidate(region, dwell = 0)
//! Candidate ──(dwell ≥ hold)──▶ Confirmed(region)         emits Selected
//! any ──(nothing in range)──▶ Idle                        emits Deselected
//! any ──(a different region is nearest)──▶ Candidate(new, dwell = 0)
//! ```
//!
//! Dwell never carries over from one region to another; a glance that sweeps
//! across several regions confirms none of them. Each confirmation is emitted
//! once per match episode.
//!
//! Separately, an external discrete input can pin the confirmed region
//! ([`SelectionInput::Confirm`]) so that it stays selected after the gaze moves
//! on, and release it again ([`SelectionInput::Dismiss`]).

use tracing::{debug, info, trace};

use crate::astro::{angular_distance_horizontal, cartesian_to_horizontal, equatorial_to_horizontal};
use crate::{ObserverState, Region, SkyCatalog, Vector3};

/// Tunables for [`GazeMatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct GazeConfig {
    /// Largest angular distance (radians) from a centroid that still counts
    /// as looking at its region. Default 8°.
    pub match_threshold_rad: f64,
    /// Pointing altitudes (radians) below this never match anything. Default −5°.
    pub horizon_margin_rad: f64,
    /// Regions whose centroid altitude (radians) is below this are skipped.
    /// Default 0° (the horizon).
    pub centroid_min_altitude_rad: f64,
    /// Seconds a match must persist before it is confirmed. Default 0.5.
    pub hold_duration_s: f64,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            match_threshold_rad: 8.0_f64.to_radians(),
            horizon_margin_rad: (-5.0_f64).to_radians(),
            centroid_min_altitude_rad: 0.0,
            hold_duration_s: 0.5,
        }
    }
}

impl GazeConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.match_threshold_rad > 0.0 && self.match_threshold_rad <= std::f64::consts::PI,
            "match threshold must be in (0, π] radians, got {}",
            self.match_threshold_rad
        );
        anyhow::ensure!(
            self.horizon_margin_rad.is_finite() && self.centroid_min_altitude_rad.is_finite(),
            "altitude limits must be finite"
        );
        anyhow::ensure!(
            self.hold_duration_s >= 0.0 && self.hold_duration_s.is_finite(),
            "hold duration must be a finite, non-negative number of seconds, got {}",
            self.hold_duration_s
        );
        Ok(())
    }
}

/// Discrete input from outside the gaze pipeline (button, pinch, voice, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionInput {
    /// Pin the currently confirmed region.
    Confirm,
    /// Release the pinned region.
    Dismiss,
}

/// Edge-triggered notifications emitted by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GazeEvent {
    /// Gaze dwelt on a region long enough to confirm it.
    Selected { code: String },
    /// The matched region was lost (gaze left every region, or moved off a
    /// confirmed region onto another one).
    Deselected { code: String },
    /// A confirmed region was pinned by [`SelectionInput::Confirm`].
    Pinned { code: String },
    /// The pinned region was released by [`SelectionInput::Dismiss`].
    Unpinned { code: String },
}

/// Mutable matching state, owned by [`GazeMatcher`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GazeState {
    /// Region currently under the gaze, confirmed or not.
    pub matched: Option<String>,
    /// Seconds the current match has been held.
    pub dwell_s: f64,
    /// Region confirmed in the current match episode.
    pub confirmed: Option<String>,
    /// Region pinned by external input; survives the gaze moving away.
    pub pinned: Option<String>,
}

/// Nearest region found for one pointing direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionHit<'a> {
    pub region: &'a Region,
    /// Angular distance from the pointing direction to the centroid, radians.
    pub distance_rad: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GazeMatcher {
    config: GazeConfig,
    state: GazeState,
}

impl GazeMatcher {
    pub fn new(config: GazeConfig) -> Self {
        Self {
            config,
            state: GazeState::default(),
        }
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    pub fn state(&self) -> &GazeState {
        &self.state
    }

    /// Code of the region under the gaze (possibly not yet confirmed).
    pub fn matched_code(&self) -> Option<&str> {
        self.state.matched.as_deref()
    }

    /// Code of the confirmed region, if any.
    pub fn confirmed_code(&self) -> Option<&str> {
        self.state.confirmed.as_deref()
    }

    pub fn pinned_code(&self) -> Option<&str> {
        self.state.pinned.as_deref()
    }

    /// Nearest matchable region to a pointing direction given as altitude/azimuth.
    ///
    /// Regions without a centroid, or whose centroid is below
    /// [`GazeConfig::centroid_min_altitude_rad`], are skipped. Returns the
    /// global nearest regardless of the match threshold.
    pub fn nearest_region<'a>(
        &self,
        alt_rad: f64,
        az_rad: f64,
        catalog: &'a SkyCatalog,
        observer: &ObserverState,
    ) -> Option<RegionHit<'a>> {
        catalog
            .matchable_regions()
            .filter_map(|region| {
                let [ra, dec] = region.centroid?;
                let (c_alt, c_az) =
                    equatorial_to_horizontal(ra, dec, observer.lst_rad, observer.latitude_rad);
                if c_alt < self.config.centroid_min_altitude_rad {
                    return None;
                }
                let distance_rad = angular_distance_horizontal(alt_rad, az_rad, c_alt, c_az);
                Some(RegionHit {
                    region,
                    distance_rad,
                })
            })
            .min_by(|a, b| a.distance_rad.total_cmp(&b.distance_rad))
    }

    /// Region the pointing direction is aimed at this tick, if any.
    fn candidate<'a>(
        &self,
        pointing: &Vector3,
        catalog: &'a SkyCatalog,
        observer: &ObserverState,
    ) -> Option<&'a Region> {
        if !observer.initialized {
            return None;
        }
        // Zero or non-finite directions carry no gaze
        if !(pointing.iter().all(|c| c.is_finite()) && pointing.norm() > 0.0) {
            return None;
        }
        let (alt, az) = cartesian_to_horizontal(pointing);
        if alt < self.config.horizon_margin_rad {
            return None;
        }
        let hit = self.nearest_region(alt, az, catalog, observer)?;
        (hit.distance_rad <= self.config.match_threshold_rad).then_some(hit.region)
    }

    /// Advance the state machine by one tick.
    ///
    /// `dt_s` is the time since the previous tick; negative or non-finite
    /// values count as zero. `pointing` is a sky-frame direction (any length).
    /// Returns at most one event.
    pub fn update(
        &mut self,
        dt_s: f64,
        pointing: &Vector3,
        catalog: &SkyCatalog,
        observer: &ObserverState,
    ) -> Option<GazeEvent> {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };

        let Some(region) = self.candidate(pointing, catalog, observer) else {
            return self.lose_gaze();
        };

        if self.state.matched.as_deref() != Some(region.code.as_str()) {
            let previous = self.state.confirmed.take();
            debug!(
                code = %region.code,
                previous = ?self.state.matched,
                "Gaze candidate changed"
            );
            self.state.matched = Some(region.code.clone());
            self.state.dwell_s = 0.0;
            return previous.map(|code| {
                info!(code = %code, "Region deselected");
                GazeEvent::Deselected { code }
            });
        }

        self.state.dwell_s += dt_s;
        trace!(code = %region.code, dwell_s = self.state.dwell_s, "Gaze dwell");

        if self.state.confirmed.is_none() && self.state.dwell_s >= self.config.hold_duration_s {
            self.state.confirmed = Some(region.code.clone());
            info!(code = %region.code, dwell_s = self.state.dwell_s, "Region selected");
            return Some(GazeEvent::Selected {
                code: region.code.clone(),
            });
        }
        None
    }

    /// Drop the current match, as when tracking is lost.
    ///
    /// Emits `Deselected` only if something was matched. A pin survives.
    pub fn lose_gaze(&mut self) -> Option<GazeEvent> {
        let code = self.state.matched.take()?;
        self.state.dwell_s = 0.0;
        self.state.confirmed = None;
        info!(code = %code, "Region deselected");
        Some(GazeEvent::Deselected { code })
    }

    /// Apply an external selection input.
    pub fn handle_input(&mut self, input: SelectionInput) -> Option<GazeEvent> {
        match input {
            SelectionInput::Confirm => {
                let code = self.state.confirmed.clone()?;
                if self.state.pinned.as_deref() == Some(code.as_str()) {
                    return None;
                }
                info!(code = %code, "Region pinned");
                self.state.pinned = Some(code.clone());
                Some(GazeEvent::Pinned { code })
            }
            SelectionInput::Dismiss => {
                let code = self.state.pinned.take()?;
                info!(code = %code, "Region unpinned");
                Some(GazeEvent::Unpinned { code })
            }
        }
    }

    /// Forget all matching state, including any pin.
    pub fn reset(&mut self) {
        self.state = GazeState::default();
    }
}
