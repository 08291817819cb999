//! Immutable in-memory sky catalog: objects, regions and identifier lookup.
//!
//! `SkyCatalog` is built once at startup, either
//!
//! 1. from pre-validated tables whose region centroids are already known
//!    ([`SkyCatalog::new`]),
//! 2. from raw figures, applying an optional magnitude cutoff and computing the
//!    centroids ([`SkyCatalog::build`]), or
//! 3. from bytes previously produced by [`SkyCatalog::to_rkyv_bytes`]
//!    ([`SkyCatalog::from_rkyv_bytes`]), e.g. embedded with `include_bytes!`.
//!
//! After that it is read-only and can be shared freely (`Arc<SkyCatalog>`).
//! Object indices are stable for the catalog's lifetime, which is what lets
//! [`PositionEngine`](crate::PositionEngine) address its output buffer by index.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, ensure};
use rkyv::{Archive, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{CelestialObject, Region, RegionFigure};

/// The serialized part of a catalog. The id index is rebuilt on load.
#[derive(Debug, Clone, Default, Archive, Serialize, Deserialize)]
struct CatalogTables {
    objects: Vec<CelestialObject>,
    regions: Vec<Region>,
}

#[derive(Debug, Clone, Default)]
pub struct SkyCatalog {
    tables: CatalogTables,
    index: HashMap<u64, usize>,
}

impl SkyCatalog {
    /// Build a catalog from pre-validated tables.
    ///
    /// Region centroids are taken as given. Fails on duplicate object ids,
    /// non-finite coordinates, and empty or duplicate region codes.
    pub fn new(objects: Vec<CelestialObject>, regions: Vec<Region>) -> anyhow::Result<Self> {
        let index = index_objects(&objects)?;

        let mut codes = HashSet::new();
        for region in &regions {
            ensure!(!region.code.is_empty(), "region '{}' has an empty code", region.name);
            ensure!(codes.insert(region.code.as_str()), "duplicate region code '{}'", region.code);
            if let Some([ra, dec]) = region.centroid {
                ensure!(
                    ra.is_finite() && dec.is_finite(),
                    "region '{}' has a non-finite centroid",
                    region.code
                );
            }
        }

        info!(
            objects = objects.len(),
            regions = regions.len(),
            "Sky catalog ready"
        );
        Ok(Self {
            tables: CatalogTables { objects, regions },
            index,
        })
    }

    /// Build a catalog from raw objects and region figures.
    ///
    /// Objects fainter than `max_magnitude` (when given) are dropped first; each
    /// region centroid is then computed from the members that survived. Regions
    /// left with no members keep `centroid: None` and are excluded from gaze
    /// matching.
    pub fn build(
        mut objects: Vec<CelestialObject>,
        figures: Vec<RegionFigure>,
        max_magnitude: Option<f32>,
    ) -> anyhow::Result<Self> {
        if let Some(cutoff) = max_magnitude {
            let before = objects.len();
            objects.retain(|o| o.mag <= cutoff);
            info!(
                kept = objects.len(),
                total = before,
                cutoff,
                "Applied magnitude cutoff"
            );
        }

        let index = index_objects(&objects)?;
        let lookup = |id: u64| index.get(&id).map(|&i| (objects[i].ra_rad, objects[i].dec_rad));

        let regions: Vec<Region> = figures
            .into_iter()
            .map(|figure| {
                let region = Region::from_figure(figure, lookup);
                if !region.has_centroid() {
                    warn!(code = %region.code, "Region has no members in catalog; excluded from matching");
                }
                region
            })
            .collect();

        Self::new(objects, regions)
    }

    /// Serialize the catalog tables with rkyv.
    pub fn to_rkyv_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&self.tables)
            .map_err(|e| anyhow::anyhow!("rkyv serialization failed: {}", e))?;
        Ok(bytes.to_vec())
    }

    /// Load a catalog from bytes produced by [`to_rkyv_bytes`](Self::to_rkyv_bytes).
    ///
    /// The bytes are validated before use and the result goes through the same
    /// checks as [`SkyCatalog::new`].
    pub fn from_rkyv_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        // Embedded byte slices carry no alignment guarantee
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        let tables = rkyv::from_bytes::<CatalogTables, rkyv::rancor::Error>(&aligned)
            .map_err(|e| anyhow::anyhow!("rkyv deserialization failed: {}", e))?;
        debug!(bytes = bytes.len(), "Decoded catalog tables");
        Self::new(tables.objects, tables.regions)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.tables.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.objects.is_empty()
    }

    /// All objects, in the stable index order used by the position buffer.
    pub fn objects(&self) -> &[CelestialObject] {
        &self.tables.objects
    }

    pub fn regions(&self) -> &[Region] {
        &self.tables.regions
    }

    /// Regions that have a centroid and can therefore be matched.
    pub fn matchable_regions(&self) -> impl Iterator<Item = &Region> {
        self.tables.regions.iter().filter(|r| r.has_centroid())
    }

    /// Index of an object id in [`objects`](Self::objects).
    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn object_by_id(&self, id: u64) -> Option<&CelestialObject> {
        self.index_of(id).map(|i| &self.tables.objects[i])
    }

    pub fn region_by_code(&self, code: &str) -> Option<&Region> {
        self.tables.regions.iter().find(|r| r.code == code)
    }

    /// Segments of `region` as pairs of object indices.
    ///
    /// Segments with an endpoint missing from the catalog are left out, so a
    /// renderer draws whatever part of the figure survived.
    pub fn resolve_segments(&self, region: &Region) -> Vec<[usize; 2]> {
        region
            .segments
            .iter()
            .filter_map(|[a, b]| Some([self.index_of(*a)?, self.index_of(*b)?]))
            .collect()
    }
}

fn index_objects(objects: &[CelestialObject]) -> anyhow::Result<HashMap<u64, usize>> {
    let mut index = HashMap::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        if !(obj.ra_rad.is_finite() && obj.dec_rad.is_finite()) {
            bail!("object {} has non-finite coordinates", obj.id);
        }
        if index.insert(obj.id, i).is_some() {
            bail!("duplicate object id {}", obj.id);
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn objects() -> Vec<CelestialObject> {
        vec![
            CelestialObject::from_degrees(1, 10.0, 0.0, 1.0, 0.0),
            CelestialObject::from_degrees(2, 12.0, 2.0, 3.0, 0.5),
            CelestialObject::from_degrees(3, 14.0, 4.0, 5.5, 1.2),
        ]
    }

    #[test]
    fn lookup_by_id_and_code() {
        let figures = vec![RegionFigure::new("Abc", "Alpha Beta", vec![[1, 2], [2, 3]])];
        let catalog = SkyCatalog::build(objects(), figures, None).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.index_of(2), Some(1));
        assert_eq!(catalog.object_by_id(3).unwrap().mag, 5.5);
        assert!(catalog.object_by_id(42).is_none());
        assert_eq!(catalog.region_by_code("Abc").unwrap().name, "Alpha Beta");
        assert!(catalog.region_by_code("Xyz").is_none());
    }

    #[test]
    fn magnitude_cutoff_prunes_members_and_centroid() {
        let figures = vec![RegionFigure::new("Abc", "Alpha Beta", vec![[1, 2], [2, 3]])];
        let catalog = SkyCatalog::build(objects(), figures, Some(4.0)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.object_by_id(3).is_none());

        let region = catalog.region_by_code("Abc").unwrap();
        let [ra, dec] = region.centroid.unwrap();
        assert_abs_diff_eq!(ra.to_degrees(), 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dec.to_degrees(), 1.0, epsilon = 1e-9);

        // The dangling [2, 3] segment is dropped when resolving
        assert_eq!(catalog.resolve_segments(region), vec![[0, 1]]);
    }

    #[test]
    fn empty_regions_are_kept_but_not_matchable() {
        let figures = vec![
            RegionFigure::new("Abc", "Alpha Beta", vec![[1, 2]]),
            RegionFigure::new("Ghost", "Ghost", vec![[100, 101]]),
        ];
        let catalog = SkyCatalog::build(objects(), figures, None).unwrap();
        assert_eq!(catalog.regions().len(), 2);
        let codes: Vec<&str> = catalog.matchable_regions().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["Abc"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut objs = objects();
        objs.push(CelestialObject::from_degrees(2, 50.0, 0.0, 2.0, 0.0));
        let err = SkyCatalog::new(objs, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("duplicate object id 2"));
    }

    #[test]
    fn duplicate_and_empty_codes_are_rejected() {
        let figures = vec![
            RegionFigure::new("Abc", "One", vec![[1, 2]]),
            RegionFigure::new("Abc", "Two", vec![[2, 3]]),
        ];
        assert!(SkyCatalog::build(objects(), figures, None).is_err());

        let figures = vec![RegionFigure::new("", "Nameless", vec![[1, 2]])];
        assert!(SkyCatalog::build(objects(), figures, None).is_err());
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let objs = vec![CelestialObject::new(9, f64::NAN, 0.0, 1.0, 0.0)];
        assert!(SkyCatalog::new(objs, Vec::new()).is_err());
    }

    #[test]
    fn rkyv_bytes_reload_identically() {
        let figures = vec![
            RegionFigure::new("Abc", "Alpha Beta", vec![[1, 2], [2, 3]]),
            RegionFigure::new("Ghost", "Ghost", vec![[100, 101]]),
        ];
        let objs: Vec<CelestialObject> = objects()
            .into_iter()
            .map(|o| if o.id == 1 { o.with_name("First").in_region("Abc") } else { o })
            .collect();
        let catalog = SkyCatalog::build(objs, figures, None).unwrap();

        let bytes = catalog.to_rkyv_bytes().unwrap();
        // Shift by one byte to exercise the unaligned path
        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&bytes);
        let loaded = SkyCatalog::from_rkyv_bytes(&shifted[1..]).unwrap();

        assert_eq!(loaded.objects(), catalog.objects());
        assert_eq!(loaded.regions(), catalog.regions());
        assert_eq!(loaded.index_of(3), Some(2));
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        assert!(SkyCatalog::from_rkyv_bytes(&[1, 2, 3]).is_err());
    }
}
