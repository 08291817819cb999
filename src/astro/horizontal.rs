//! Equatorial → horizontal → Cartesian transforms and the heading frame rotation.

use std::f64::consts::TAU;

use nalgebra::{Rotation3, Vector3};

use super::wrap_two_pi;

/// Below this, `cos(alt)` (or `cos(lat)`) is treated as zero and azimuth is undefined.
const DEGENERATE_COS: f64 = 1e-12;

/// Convert equatorial coordinates to horizontal coordinates.
///
/// Inputs are radians: right ascension, declination, local sidereal time and
/// observer latitude. Returns `(altitude, azimuth)` in radians, with azimuth in
/// `[0, 2π)` measured clockwise from geographic north.
///
/// The hour angle is `lst − ra`. Objects east of the meridian (`sin(H) < 0`) get
/// azimuths in `[0, π]`; objects west of it get `(π, 2π)`.
///
/// When the object sits at the zenith or nadir (or the observer stands on a pole)
/// the azimuth has no meaning and is reported as `0`.
pub fn equatorial_to_horizontal(ra_rad: f64, dec_rad: f64, lst_rad: f64, lat_rad: f64) -> (f64, f64) {
    let hour_angle = lst_rad - ra_rad;
    let (sin_dec, cos_dec) = dec_rad.sin_cos();
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_ha, cos_ha) = hour_angle.sin_cos();

    let sin_alt = (sin_dec * sin_lat + cos_dec * cos_lat * cos_ha).clamp(-1.0, 1.0);
    let alt = sin_alt.asin();
    let cos_alt = alt.cos();

    let denom = cos_alt * cos_lat;
    if denom.abs() < DEGENERATE_COS {
        return (alt, 0.0);
    }

    let cos_az = ((sin_dec - sin_alt * sin_lat) / denom).clamp(-1.0, 1.0);
    let az = cos_az.acos();
    let az = if sin_ha > 0.0 { TAU - az } else { az };
    (alt, wrap_two_pi(az))
}

/// Project horizontal coordinates onto a sphere of the given radius.
///
/// Returns `(x, y, z)` with +X east, +Y zenith, +Z south.
pub fn horizontal_to_cartesian(alt_rad: f64, az_rad: f64, radius: f64) -> Vector3<f64> {
    let (sin_alt, cos_alt) = alt_rad.sin_cos();
    let (sin_az, cos_az) = az_rad.sin_cos();
    Vector3::new(
        radius * cos_alt * sin_az,
        radius * sin_alt,
        -radius * cos_alt * cos_az,
    )
}

/// Inverse of [`horizontal_to_cartesian`]: returns `(altitude, azimuth)` in radians.
///
/// The vector need not be normalized. A zero vector maps to `(0, 0)`; a vector
/// along the vertical axis gets azimuth `0`.
pub fn cartesian_to_horizontal(v: &Vector3<f64>) -> (f64, f64) {
    let n = v.norm();
    if !(n > 0.0) {
        return (0.0, 0.0);
    }
    let alt = (v.y / n).clamp(-1.0, 1.0).asin();
    let horiz = (v.x * v.x + v.z * v.z).sqrt();
    if horiz / n < DEGENERATE_COS {
        return (alt, 0.0);
    }
    let az = wrap_two_pi(v.x.atan2(-v.z));
    (alt, az)
}

/// Rotate a direction from the heading-aligned device frame into the sky frame.
///
/// The device frame shares the sky frame's vertical axis (+Y up) but is turned so
/// that its forward axis (−Z) points along the compass heading. A renderer that
/// draws the catalog in device space applies [`from_sky_frame`]; a pointing
/// direction measured in device space comes back with this function. Both sides
/// must use this pair so that they agree on the heading rotation.
pub fn to_sky_frame(direction: &Vector3<f64>, heading_deg: f64) -> Vector3<f64> {
    heading_rotation(heading_deg) * direction
}

/// Rotate a sky-frame direction into the heading-aligned device frame.
///
/// Inverse of [`to_sky_frame`].
pub fn from_sky_frame(direction: &Vector3<f64>, heading_deg: f64) -> Vector3<f64> {
    heading_rotation(heading_deg).inverse() * direction
}

/// Rotation about +Y taking device space to sky space.
///
/// Azimuth grows clockwise seen from above (north → east), which is a negative
/// right-handed rotation about +Y.
fn heading_rotation(heading_deg: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), -heading_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn deg(d: f64) -> f64 {
        d.to_radians()
    }

    #[test]
    fn object_on_meridian_at_equator_is_at_zenith() {
        let (alt, az) = equatorial_to_horizontal(0.0, 0.0, 0.0, 0.0);
        assert_abs_diff_eq!(alt, FRAC_PI_2, epsilon = 1e-9);
        assert_eq!(az, 0.0);
        assert!(!alt.is_nan());
    }

    #[test]
    fn transit_altitude_is_ninety_minus_lat_minus_dec() {
        // On the meridian, alt = 90° − |lat − dec|
        let lat = deg(40.0);
        let dec = deg(10.0);
        let (alt, az) = equatorial_to_horizontal(deg(75.0), dec, deg(75.0), lat);
        assert_abs_diff_eq!(alt, deg(60.0), epsilon = 1e-9);
        // South of the zenith → azimuth 180°
        assert_abs_diff_eq!(az, PI, epsilon = 1e-6);

        // Declination north of the zenith culminates due north
        let (alt, az) = equatorial_to_horizontal(0.0, deg(70.0), 0.0, lat);
        assert_abs_diff_eq!(alt, deg(60.0), epsilon = 1e-9);
        assert!(az < 1e-6 || (TAU - az) < 1e-6);
    }

    #[test]
    fn rising_objects_are_east_and_setting_objects_west() {
        let lat = deg(30.0);
        // Hour angle −3h: east of meridian
        let (_, az_east) = equatorial_to_horizontal(deg(45.0), 0.0, 0.0, lat);
        assert!(az_east > 0.0 && az_east < PI, "az was {}", az_east.to_degrees());
        // Hour angle +3h: west of meridian
        let (_, az_west) = equatorial_to_horizontal(deg(315.0), 0.0, 0.0, lat);
        assert!(az_west > PI && az_west < TAU, "az was {}", az_west.to_degrees());
        // Symmetric about the meridian
        assert_abs_diff_eq!(az_east + az_west, TAU, epsilon = 1e-9);
    }

    #[test]
    fn celestial_pole_sits_at_latitude_altitude() {
        let lat = deg(52.0);
        let (alt, az) = equatorial_to_horizontal(deg(123.0), FRAC_PI_2, deg(17.0), lat);
        assert_abs_diff_eq!(alt, lat, epsilon = 1e-9);
        assert!(az < 1e-6 || (TAU - az) < 1e-6);
    }

    #[test]
    fn observer_at_pole_does_not_produce_nan() {
        let (alt, az) = equatorial_to_horizontal(deg(10.0), deg(20.0), deg(50.0), FRAC_PI_2);
        assert_abs_diff_eq!(alt, deg(20.0), epsilon = 1e-9);
        assert!(!az.is_nan());
    }

    #[test]
    fn cartesian_axes_follow_convention() {
        let north = horizontal_to_cartesian(0.0, 0.0, 1.0);
        assert_abs_diff_eq!(north, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        let east = horizontal_to_cartesian(0.0, FRAC_PI_2, 1.0);
        assert_abs_diff_eq!(east, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        let south = horizontal_to_cartesian(0.0, PI, 1.0);
        assert_abs_diff_eq!(south, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        let zenith = horizontal_to_cartesian(FRAC_PI_2, 1.234, 50.0);
        assert_abs_diff_eq!(zenith, Vector3::new(0.0, 50.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn cartesian_round_trip_recovers_alt_az() {
        let (alt, az) = (deg(23.5), deg(211.0));
        let v = horizontal_to_cartesian(alt, az, 100.0);
        assert_abs_diff_eq!(v.norm(), 100.0, epsilon = 1e-9);
        let (alt2, az2) = cartesian_to_horizontal(&v);
        assert_abs_diff_eq!(alt2, alt, epsilon = 1e-12);
        assert_abs_diff_eq!(az2, az, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_vectors_map_to_defaults() {
        assert_eq!(cartesian_to_horizontal(&Vector3::zeros()), (0.0, 0.0));
        let (alt, az) = cartesian_to_horizontal(&Vector3::new(0.0, -2.0, 0.0));
        assert_abs_diff_eq!(alt, -FRAC_PI_2, epsilon = 1e-12);
        assert_eq!(az, 0.0);
    }

    #[test]
    fn device_forward_points_along_heading() {
        let forward = Vector3::new(0.0, 0.0, -1.0);
        for heading in [0.0, 45.0, 90.0, 180.0, 270.0, 359.0] {
            let sky = to_sky_frame(&forward, heading);
            let (alt, az) = cartesian_to_horizontal(&sky);
            assert_abs_diff_eq!(alt, 0.0, epsilon = 1e-12);
            let diff = (az - deg(heading)).abs();
            assert!(diff < 1e-9 || (TAU - diff) < 1e-9, "heading {heading}: az {}", az.to_degrees());
        }
    }

    #[test]
    fn device_right_is_east_when_facing_north_and_south_when_facing_east() {
        let right = Vector3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(to_sky_frame(&right, 0.0), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(to_sky_frame(&right, 90.0), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn sky_frame_rotation_is_invertible_and_keeps_altitude() {
        let v = horizontal_to_cartesian(deg(35.0), deg(120.0), 1.0);
        let device = from_sky_frame(&v, 73.0);
        assert_abs_diff_eq!(device.y, v.y, epsilon = 1e-12);
        assert_abs_diff_eq!(to_sky_frame(&device, 73.0), v, epsilon = 1e-12);
    }
}
