//! Named sky regions (constellation figures) and their hit-test centroids.
//!
//! A region is drawn as a list of line segments between catalog objects. For
//! gaze matching it is reduced to a single point, the centroid: the unweighted
//! mean equatorial position of the distinct objects its segments reference.
//!
//! Segment endpoints may name objects that are not in the loaded catalog (for
//! example stars removed by a magnitude cutoff). Those references are skipped:
//! partial figures are expected, not an error.

use std::collections::HashSet;
use std::f64::consts::{PI, TAU};

use rkyv::{Archive, Deserialize, Serialize};

use crate::astro::wrap_two_pi;

/// A region as produced by catalog tooling, before its centroid is known.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFigure {
    /// Short unique code, e.g. `"Ori"`.
    pub code: String,
    pub name: String,
    /// Line segments as pairs of object identifiers, in drawing order.
    pub segments: Vec<[u64; 2]>,
}

impl RegionFigure {
    pub fn new(code: impl Into<String>, name: impl Into<String>, segments: Vec<[u64; 2]>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            segments,
        }
    }
}

/// An immutable catalog region with its precomputed centroid.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub segments: Vec<[u64; 2]>,
    /// Centroid `[ra_rad, dec_rad]`, or `None` when none of the member
    /// objects is present. Regions without a centroid are never matched.
    pub centroid: Option<[f64; 2]>,
}

impl Region {
    /// Build a region from its figure, computing the centroid from whatever
    /// member objects `lookup` can resolve to `(ra_rad, dec_rad)`.
    pub fn from_figure<F>(figure: RegionFigure, lookup: F) -> Self
    where
        F: Fn(u64) -> Option<(f64, f64)>,
    {
        let centroid = compute_centroid(&figure.segments, lookup);
        Self {
            code: figure.code,
            name: figure.name,
            segments: figure.segments,
            centroid,
        }
    }

    /// Distinct object identifiers referenced by the segments, in first-seen order.
    pub fn member_ids(&self) -> Vec<u64> {
        distinct_ids(&self.segments)
    }

    /// `true` when the region can take part in gaze matching.
    pub fn has_centroid(&self) -> bool {
        self.centroid.is_some()
    }
}

fn distinct_ids(segments: &[[u64; 2]]) -> Vec<u64> {
    let mut seen = HashSet::new();
    segments
        .iter()
        .flat_map(|seg| seg.iter().copied())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Mean equatorial position of the distinct resolvable members of `segments`.
///
/// Declinations are averaged directly. Right ascensions are first unwrapped to
/// lie within ±π of the first member so that a figure straddling 0h averages to
/// 0h rather than 12h; for any figure narrower than 12h of RA this is exactly
/// the arithmetic mean. Returns `None` when no member resolves.
pub fn compute_centroid<F>(segments: &[[u64; 2]], lookup: F) -> Option<[f64; 2]>
where
    F: Fn(u64) -> Option<(f64, f64)>,
{
    let members: Vec<(f64, f64)> = distinct_ids(segments)
        .into_iter()
        .filter_map(|id| {
            let pos = lookup(id);
            if pos.is_none() {
                tracing::debug!(id, "skipping region member missing from catalog");
            }
            pos
        })
        .collect();

    let (ra0, _) = *members.first()?;
    let n = members.len() as f64;
    let (ra_sum, dec_sum) = members.iter().fold((0.0, 0.0), |(ra_acc, dec_acc), (ra, dec)| {
        let offset = (ra - ra0 + PI).rem_euclid(TAU) - PI;
        (ra_acc + ra0 + offset, dec_acc + dec)
    });

    Some([wrap_two_pi(ra_sum / n), dec_sum / n])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::HashMap;

    fn deg(d: f64) -> f64 {
        d.to_radians()
    }

    fn table(entries: &[(u64, f64, f64)]) -> HashMap<u64, (f64, f64)> {
        entries
            .iter()
            .map(|&(id, ra, dec)| (id, (deg(ra), deg(dec))))
            .collect()
    }

    #[test]
    fn centroid_is_mean_of_distinct_members() {
        let stars = table(&[(1, 10.0, 20.0), (2, 20.0, 30.0), (3, 30.0, 40.0)]);
        // Star 2 appears in both segments but counts once
        let segs = vec![[1, 2], [2, 3]];
        let c = compute_centroid(&segs, |id| stars.get(&id).copied()).unwrap();
        assert_abs_diff_eq!(c[0], deg(20.0), epsilon = 1e-12);
        assert_abs_diff_eq!(c[1], deg(30.0), epsilon = 1e-12);
    }

    #[test]
    fn missing_members_are_skipped() {
        let stars = table(&[(1, 10.0, 20.0), (2, 20.0, 30.0)]);
        let with_dangling = vec![[1, 2], [2, 99]];
        let without = vec![[1, 2]];
        let a = compute_centroid(&with_dangling, |id| stars.get(&id).copied()).unwrap();
        let b = compute_centroid(&without, |id| stars.get(&id).copied()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn objects_outside_the_figure_do_not_move_the_centroid() {
        let mut stars = table(&[(1, 100.0, -5.0), (2, 110.0, 5.0)]);
        let segs = vec![[1, 2]];
        let before = compute_centroid(&segs, |id| stars.get(&id).copied()).unwrap();
        stars.insert(3, (deg(200.0), deg(60.0)));
        let after = compute_centroid(&segs, |id| stars.get(&id).copied()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_region_has_no_centroid() {
        let stars: HashMap<u64, (f64, f64)> = HashMap::new();
        assert_eq!(compute_centroid(&[[5, 6]], |id| stars.get(&id).copied()), None);
        assert_eq!(compute_centroid(&[], |id| stars.get(&id).copied()), None);
    }

    #[test]
    fn centroid_straddling_zero_hours() {
        let stars = table(&[(1, 356.0, 10.0), (2, 2.0, 20.0)]);
        let c = compute_centroid(&[[1, 2]], |id| stars.get(&id).copied()).unwrap();
        assert_abs_diff_eq!(c[0], deg(359.0), epsilon = 1e-12);
        assert_abs_diff_eq!(c[1], deg(15.0), epsilon = 1e-12);
    }

    #[test]
    fn region_from_figure_keeps_segments_and_members() {
        let stars = table(&[(1, 10.0, 0.0), (2, 12.0, 0.0), (3, 14.0, 0.0)]);
        let fig = RegionFigure::new("Tst", "Test", vec![[3, 1], [1, 2]]);
        let region = Region::from_figure(fig, |id| stars.get(&id).copied());
        assert_eq!(region.member_ids(), vec![3, 1, 2]);
        assert!(region.has_centroid());
        assert_abs_diff_eq!(region.centroid.unwrap()[0], deg(12.0), epsilon = 1e-12);
    }
}
