//! Julian date and mean sidereal time.
//!
//! Uses the linear sidereal-rate approximation
//! `GMST = 280.46061837° + 360.98564736629° × (JD − 2451545.0)`,
//! which is good to roughly one arc-minute over several decades around J2000.
//! That is far below what a hand-held pointing device can resolve.

use chrono::{DateTime, Utc};

use super::wrap_two_pi;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian date of the J2000.0 epoch (2000-01-01T12:00:00 TT, treated as UTC here).
pub const J2000_JD: f64 = 2_451_545.0;
/// GMST at J2000.0, in degrees.
pub const GMST_AT_J2000_DEG: f64 = 280.460_618_37;
/// Sidereal rotation per solar day, in degrees.
pub const GMST_DEG_PER_DAY: f64 = 360.985_647_366_29;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian date of a UTC instant.
pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    // Split seconds and sub-second part so large timestamps keep millisecond precision
    let secs = instant.timestamp() as f64;
    let nanos = instant.timestamp_subsec_nanos() as f64 * 1e-9;
    UNIX_EPOCH_JD + (secs + nanos) / SECONDS_PER_DAY
}

/// Greenwich mean sidereal time for a UTC instant, in radians `[0, 2π)`.
pub fn sidereal_time(instant: DateTime<Utc>) -> f64 {
    let days = julian_date(instant) - J2000_JD;
    // Reduce in degrees first: the product is large and rem_euclid is exact
    let gmst_deg = (GMST_AT_J2000_DEG + GMST_DEG_PER_DAY * days).rem_euclid(360.0);
    wrap_two_pi(gmst_deg.to_radians())
}

/// Local sidereal time from GMST and an east-positive longitude, in radians `[0, 2π)`.
pub fn local_sidereal_time(gmst_rad: f64, longitude_rad: f64) -> f64 {
    wrap_two_pi(gmst_rad + longitude_rad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn julian_date_of_known_instants() {
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_abs_diff_eq!(julian_date(epoch), UNIX_EPOCH_JD, epsilon = 1e-9);

        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_abs_diff_eq!(julian_date(j2000), J2000_JD, epsilon = 1e-9);
    }

    #[test]
    fn gmst_at_j2000() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let gmst = sidereal_time(j2000);
        assert_abs_diff_eq!(gmst, GMST_AT_J2000_DEG.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn gmst_reference_value() {
        // Meeus, Astronomical Algorithms, example 12.b:
        // 1987-04-10 19:21:00 UT -> GMST 8h 34m 57.0896s = 128.7378734°
        let t = Utc.with_ymd_and_hms(1987, 4, 10, 19, 21, 0).unwrap();
        let gmst_deg = sidereal_time(t).to_degrees();
        // The linear model is good to about an arc-minute here
        assert_abs_diff_eq!(gmst_deg, 128.737_873_4, epsilon = 1.0 / 60.0);
    }

    #[test]
    fn gmst_before_j2000_stays_in_range() {
        let t = Utc.with_ymd_and_hms(1950, 6, 15, 3, 0, 0).unwrap();
        let gmst = sidereal_time(t);
        assert!((0.0..TAU).contains(&gmst));
    }

    #[test]
    fn gmst_advances_one_turn_per_sidereal_day() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap();
        // One sidereal day is ~23h 56m 4.0905s
        let t1 = t0 + chrono::Duration::milliseconds(86_164_090);
        let d = (sidereal_time(t1) - sidereal_time(t0)).abs();
        assert!(d < 1e-5 || (TAU - d) < 1e-5, "delta was {d}");
    }

    #[test]
    fn lst_wraps_with_longitude() {
        assert_abs_diff_eq!(local_sidereal_time(0.1, -0.3), TAU - 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(local_sidereal_time(TAU - 0.1, 0.3), 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(local_sidereal_time(PI, 0.0), PI, epsilon = 1e-12);
    }
}
