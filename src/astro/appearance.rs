//! Magnitude and colour-index mappings to display attributes.

/// B−V stops of the colour ramp, bluest first.
const BV_STOPS: [f32; 5] = [-0.4, 0.0, 0.4, 1.0, 2.0];

/// RGB at each stop: blue-white → white → yellow → orange → orange-red.
const RGB_STOPS: [[f32; 3]; 5] = [
    [0.61, 0.71, 1.00],
    [1.00, 1.00, 1.00],
    [1.00, 0.96, 0.78],
    [1.00, 0.82, 0.56],
    [1.00, 0.55, 0.35],
];

/// Magnitude that maps to full opacity and the largest scale.
pub const BRIGHTEST_MAGNITUDE: f32 = -1.5;
/// Magnitude at (and beyond) which opacity and scale reach their floors.
pub const FAINTEST_MAGNITUDE: f32 = 6.5;

pub const MIN_ALPHA: f32 = 0.15;
pub const MAX_ALPHA: f32 = 1.0;
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;

/// Map a B−V colour index to an RGB triple in `[0, 1]`.
///
/// Piecewise linear between the stops above. Input is clamped to `[−0.4, 2.0]`,
/// so out-of-range or extreme catalog values get the end colours.
pub fn color_index_to_rgb(bv: f32) -> [f32; 3] {
    let bv = if bv.is_nan() { 0.0 } else { bv };
    let bv = bv.clamp(BV_STOPS[0], BV_STOPS[BV_STOPS.len() - 1]);

    let band = BV_STOPS
        .windows(2)
        .position(|w| bv <= w[1])
        .unwrap_or(BV_STOPS.len() - 2);

    let (lo, hi) = (BV_STOPS[band], BV_STOPS[band + 1]);
    let t = (bv - lo) / (hi - lo);
    let (a, b) = (RGB_STOPS[band], RGB_STOPS[band + 1]);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Opacity for an apparent magnitude, linear in magnitude, in `[0.15, 1.0]`.
pub fn magnitude_to_alpha(mag: f32) -> f32 {
    lerp_by_magnitude(mag, MAX_ALPHA, MIN_ALPHA)
}

/// Billboard scale for an apparent magnitude, linear in magnitude, in `[0.5, 3.0]`.
pub fn magnitude_to_scale(mag: f32) -> f32 {
    lerp_by_magnitude(mag, MAX_SCALE, MIN_SCALE)
}

/// Linear map from `[BRIGHTEST, FAINTEST]` magnitude onto `[bright, faint]`, clamped.
fn lerp_by_magnitude(mag: f32, bright: f32, faint: f32) -> f32 {
    if mag.is_nan() {
        return faint;
    }
    let t = ((mag - BRIGHTEST_MAGNITUDE) / (FAINTEST_MAGNITUDE - BRIGHTEST_MAGNITUDE)).clamp(0.0, 1.0);
    bright + (faint - bright) * t
}
