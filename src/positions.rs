//! Per-object horizontal and Cartesian positions for the current observer.
//!
//! [`PositionEngine::recompute`] rewrites one [`ComputedPosition`] per catalog
//! object, in catalog index order. Apparent positions drift slowly, so callers
//! throttle recomputation (see [`SkySession`](crate::SkySession)); the engine
//! itself recomputes whenever asked.
//!
//! Nothing is culled here: objects below the horizon keep their (negative
//! altitude) entries and renderers decide what to draw, e.g. via
//! [`PositionEngine::visible`].

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::astro::{
    color_index_to_rgb, equatorial_to_horizontal, horizontal_to_cartesian, local_sidereal_time,
    magnitude_to_alpha, magnitude_to_scale, sidereal_time,
};
use crate::{ObserverState, SkyCatalog, Vector3};

/// Default radius of the sphere positions are projected onto.
pub const DEFAULT_SPHERE_RADIUS: f64 = 100.0;

/// Where one catalog object currently appears, and how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedPosition {
    /// Catalog identifier of the object this entry belongs to.
    pub id: u64,
    /// Position on the sphere: +X east, +Y zenith, +Z south.
    pub position: Vector3,
    pub alt_rad: f64,
    pub az_rad: f64,
    pub mag: f32,
    pub color_index: f32,
    pub name: Option<String>,
    pub rgb: [f32; 3],
    pub alpha: f32,
    pub scale: f32,
}

impl ComputedPosition {
    /// `true` when the object is above the geometric horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.position.y > 0.0
    }
}

/// Owns the position buffer and refills it from observer state.
#[derive(Debug, Clone)]
pub struct PositionEngine {
    radius: f64,
    positions: Vec<ComputedPosition>,
    lst_rad: Option<f64>,
    computed_at: Option<DateTime<Utc>>,
}

impl Default for PositionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SPHERE_RADIUS)
    }
}

impl PositionEngine {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            positions: Vec::new(),
            lst_rad: None,
            computed_at: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Recompute every object's position for `observer` at `now`.
    ///
    /// Does nothing and returns `false` while the observer has no position fix.
    /// The buffer is reused between calls and always ends up with exactly one
    /// entry per catalog object, in catalog order.
    pub fn recompute(&mut self, catalog: &SkyCatalog, observer: &ObserverState, now: DateTime<Utc>) -> bool {
        if !observer.initialized {
            return false;
        }

        let lst = local_sidereal_time(sidereal_time(now), observer.longitude_rad);
        let lat = observer.latitude_rad;

        let objects = catalog.objects();
        if self.positions.len() != objects.len() || self.ids_differ(catalog) {
            self.positions = objects
                .iter()
                .map(|o| ComputedPosition {
                    id: o.id,
                    position: Vector3::zeros(),
                    alt_rad: 0.0,
                    az_rad: 0.0,
                    mag: o.mag,
                    color_index: o.color_index,
                    name: o.name.clone(),
                    rgb: [1.0; 3],
                    alpha: 1.0,
                    scale: 1.0,
                })
                .collect();
        }

        for (slot, obj) in self.positions.iter_mut().zip(objects) {
            let (alt, az) = equatorial_to_horizontal(obj.ra_rad, obj.dec_rad, lst, lat);
            slot.position = horizontal_to_cartesian(alt, az, self.radius);
            slot.alt_rad = alt;
            slot.az_rad = az;
            slot.mag = obj.mag;
            slot.color_index = obj.color_index;
            slot.rgb = color_index_to_rgb(obj.color_index);
            slot.alpha = magnitude_to_alpha(obj.mag);
            slot.scale = magnitude_to_scale(obj.mag);
        }

        self.lst_rad = Some(lst);
        self.computed_at = Some(now);
        debug!(
            objects = self.positions.len(),
            lst_deg = lst.to_degrees(),
            "Recomputed sky positions"
        );
        true
    }

    fn ids_differ(&self, catalog: &SkyCatalog) -> bool {
        self.positions
            .iter()
            .zip(catalog.objects())
            .any(|(p, o)| p.id != o.id)
    }

    /// Latest positions, indexed like [`SkyCatalog::objects`].
    pub fn positions(&self) -> &[ComputedPosition] {
        &self.positions
    }

    /// Entries currently above the horizon.
    pub fn visible(&self) -> impl Iterator<Item = &ComputedPosition> {
        self.positions.iter().filter(|p| p.is_above_horizon())
    }

    /// Local sidereal time used by the last recompute.
    pub fn lst_rad(&self) -> Option<f64> {
        self.lst_rad
    }

    /// When the buffer was last recomputed.
    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.computed_at
    }
}
