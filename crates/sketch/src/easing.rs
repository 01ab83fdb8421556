//! Phase easing for the orbit animation.

/// Number of frames in one full orbit.
pub const CYCLES: u64 = 512;

/// Share of the final ratio taken from plain linear progress. Keeps the
/// ellipses drifting through the endpoints instead of stalling there.
const LINEAR_BLEND: f32 = 0.1;

/// Cubic ease-in-out split at the midpoint.
///
/// Maps `[0, 1]` onto `[0, 1]` with `ease_in_out_cubic(0.5) == 0.5`.
pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        0.5 * (2.0 * x).powi(3)
    } else {
        0.5 * (2.0 * (x - 1.0)).powi(3) + 1.0
    }
}

/// Linear progress through the current cycle, in `[0, 1)`.
pub fn cycle_progress(count: u64) -> f32 {
    (count % CYCLES) as f32 / CYCLES as f32
}

/// Eased orbit ratio for an absolute frame count, in `[0, 1)`.
pub fn ratio_eased(count: u64) -> f32 {
    let ratio = cycle_progress(count);
    ease_in_out_cubic(ratio) * (1.0 - LINEAR_BLEND) + ratio * LINEAR_BLEND
}
