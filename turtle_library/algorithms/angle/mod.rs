//! Planar angle arithmetic
//!
//! All headings in this crate live in the half-open interval (-π, π].
//!
//! # Example
//!
//! ```rust
//! use turtle_library::algorithms::angle::{angle_between, normalize_angle};
//! use std::f64::consts::PI;
//!
//! assert_eq!(normalize_angle(-PI), PI);
//! assert!((angle_between(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-12);
//! ```

use std::f64::consts::{PI, TAU};

/// Wrap `angle` into (-π, π].
///
/// Angles already inside the interval are returned untouched, so applying
/// this twice gives a bit-identical result. NaN stays NaN.
pub fn normalize_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }

    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Signed shortest turn that takes heading `from` to heading `to`
pub fn angle_between(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// True when two headings point the same way within `tolerance` radians
pub fn headings_close(a: f64, b: f64, tolerance: f64) -> bool {
    angle_between(a, b).abs() <= tolerance
}
