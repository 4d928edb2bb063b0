//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value between the given limits.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range (-pi, pi].
///
/// Angle differences (heading errors for example) should be passed through
/// this immediately after the subtraction, otherwise errors near the +/-pi
/// boundary come out with a magnitude close to 2pi.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::nan);
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::nan);

    let mut wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    // Round-off in rem_euclid can land exactly on the open end of the range
    if wrapped <= -pi_t {
        wrapped = wrapped + tau_t;
    }

    wrapped
}

/// Convert a quaternion (x, y, z, w) into (roll, pitch, yaw) Euler angles in
/// radians, using the intrinsic Z-Y-X (yaw, pitch, roll) convention.
///
/// The quaternion is not normalised. Near gimbal lock the pitch term is
/// clamped to +/-pi/2 rather than producing a NaN from `asin`.
pub fn quaternion_to_euler(x: f64, y: f64, z: f64, w: f64) -> (f64, f64, f64) {
    let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));

    let sin_pitch = clamp(&(2.0 * (w * y - z * x)), &-1.0, &1.0);
    let pitch = sin_pitch.asin();

    let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

    (roll, pitch, yaw)
}

/// Convert (roll, pitch, yaw) Euler angles in radians into a quaternion
/// (x, y, z, w).
///
/// Inverse of [`quaternion_to_euler`].
pub fn euler_to_quaternion(roll: f64, pitch: f64, yaw: f64) -> (f64, f64, f64, f64) {
    let (sr, cr) = (roll / 2.0).sin_cos();
    let (sp, cp) = (pitch / 2.0).sin_cos();
    let (sy, cy) = (yaw / 2.0).sin_cos();

    (
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy
    )
}
