//! Pure astronomical math used by every other module.
//!
//! Everything here is a free function over plain numbers (or [`Vector3`](crate::Vector3)),
//! with no shared state, so it is safe to call from anywhere.
//!
//! # Pipeline
//!
//! ```text
//! UTC instant → Julian date → GMST → + longitude → LST
//! (RA, Dec) + LST + latitude → (alt, az) → Cartesian (x, y, z)
//! ```
//!
//! # Presentation frame
//!
//! Cartesian positions use a fixed, right-handed, observer-centred frame:
//!
//! - **+X** points to geographic east
//! - **+Y** points to the zenith
//! - **+Z** points to geographic south (so **−Z** is north)
//!
//! Azimuth is measured clockwise from north (north = 0, east = π/2).
//! The same convention is used by [`horizontal_to_cartesian`],
//! [`cartesian_to_horizontal`] and the heading rotation in [`to_sky_frame`].
//!
//! All angles are radians unless a name says otherwise (`_deg`).

mod appearance;
mod horizontal;
mod sidereal;
mod sphere;

pub use appearance::*;
pub use horizontal::*;
pub use sidereal::*;
pub use sphere::*;

use std::f64::consts::TAU;

/// Wrap an angle in radians into `[0, 2π)`.
///
/// `rem_euclid` keeps negative inputs in range, and the extra check catches the
/// case where rounding lands exactly on `2π`.
pub fn wrap_two_pi(angle_rad: f64) -> f64 {
    let wrapped = angle_rad.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle_deg: f64) -> f64 {
    let wrapped = angle_deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_two_pi_handles_negative_and_large() {
        assert!((wrap_two_pi(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((wrap_two_pi(3.0 * TAU + 1.0) - 1.0).abs() < 1e-9);
        assert_eq!(wrap_two_pi(TAU), 0.0);
        assert_eq!(wrap_two_pi(0.0), 0.0);
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!((wrap_degrees(-1.0) - 359.0).abs() < 1e-12);
        assert!((wrap_degrees(725.0) - 5.0).abs() < 1e-9);
        // A tiny negative value rounds up to 360.0 under rem_euclid
        let w = wrap_degrees(-1e-15);
        assert!((0.0..360.0).contains(&w));
    }
}
