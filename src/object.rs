use rkyv::{Archive, Deserialize, Serialize};

/// A fixed catalog entry: a star (or other point-like object) on the celestial sphere.
///
/// Coordinates are equatorial, in radians, for the catalog epoch. Entries are
/// built once when the catalog is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct CelestialObject {
    /// Unique catalog identifier (e.g. a Hipparcos number).
    pub id: u64,
    pub ra_rad: f64,
    pub dec_rad: f64,
    /// Apparent visual magnitude (smaller is brighter).
    pub mag: f32,
    /// B−V colour index.
    pub color_index: f32,
    /// Display name, for the handful of objects that have one.
    pub name: Option<String>,
    /// Code of the region whose figure this object belongs to, if any.
    pub region: Option<String>,
}

impl CelestialObject {
    /// Create an unnamed object from coordinates in radians.
    pub fn new(id: u64, ra_rad: f64, dec_rad: f64, mag: f32, color_index: f32) -> Self {
        Self {
            id,
            ra_rad,
            dec_rad,
            mag,
            color_index,
            name: None,
            region: None,
        }
    }

    /// Create an unnamed object from right ascension and declination in degrees.
    pub fn from_degrees(id: u64, ra_deg: f64, dec_deg: f64, mag: f32, color_index: f32) -> Self {
        Self::new(id, ra_deg.to_radians(), dec_deg.to_radians(), mag, color_index)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_region(mut self, code: impl Into<String>) -> Self {
        self.region = Some(code.into());
        self
    }
}
