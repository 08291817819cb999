//! Angular separation on the sphere and circular smoothing.

use super::wrap_degrees;

/// Great-circle separation between two equatorial positions, in radians.
///
/// Haversine form: well conditioned for the small separations a hit test
/// cares about, where the law of cosines loses most of its digits.
pub fn angular_distance(ra1_rad: f64, dec1_rad: f64, ra2_rad: f64, dec2_rad: f64) -> f64 {
    haversine(dec1_rad, ra1_rad, dec2_rad, ra2_rad)
}

/// Great-circle separation between two horizontal positions, in radians.
///
/// Same formula as [`angular_distance`] with altitude in the latitude role and
/// azimuth in the longitude role.
pub fn angular_distance_horizontal(alt1_rad: f64, az1_rad: f64, alt2_rad: f64, az2_rad: f64) -> f64 {
    haversine(alt1_rad, az1_rad, alt2_rad, az2_rad)
}

fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let half_dlat = 0.5 * (lat2 - lat1);
    let half_dlon = 0.5 * (lon2 - lon1);
    let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    2.0 * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Exponentially smooth a compass heading toward a new sample, in degrees `[0, 360)`.
///
/// `alpha` is the weight of the new sample (`1.0` jumps straight to `target_deg`).
/// The blend follows the shorter arc, so 359° → 1° passes through 0° rather than
/// sweeping back through 180°.
pub fn smooth_heading(current_deg: f64, target_deg: f64, alpha: f64) -> f64 {
    let mut diff = target_deg - current_deg;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }
    wrap_degrees(current_deg + alpha * diff)
}
