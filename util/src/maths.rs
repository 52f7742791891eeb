//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// Use `wrap_to_2pi` when the upper bound must be excluded.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into the range [0, 2pi).
///
/// Unlike a bare `rem_euclid` the upper bound is never returned, a value that
/// rounds onto 2pi is mapped to 0.
pub fn wrap_to_2pi<T>(value: T) -> T
where
    T: Float,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::zero);

    let r = rem_euclid(value, tau_t);

    if r >= tau_t {
        T::zero()
    } else {
        r
    }
}

/// True if `lower < value < upper`.
pub fn strictly_between<T>(value: T, lower: T, upper: T) -> bool
where
    T: Float,
{
    lower < value && value < upper
}
