//! # Numerical constants of the tracker
//!
//! These values are part of the fixed-point contract of the algorithm. Changing any of them
//! changes the tracking output.

/// Number of fractional bits used for interpolation weights and gradient samples.
pub const W_BITS: i32 = 14;

/// Fixed-point unit of the bilinear weights (`2^W_BITS`).
pub const D0: i32 = 1 << W_BITS;

/// Intensity samples carry 5 extra fractional bits relative to gradient samples.
pub const INTENSITY_BITS: i32 = 5;

/// Scale converting accumulated fixed-point products back into floats (`2^-20`).
pub const FLT_SCALE: f32 = 1.0 / (1 << 20) as f32;

/// Keypoints whose spatial gradient matrix determinant falls below this are lost.
pub const DETERMINANT_THRESHOLD: f32 = 1.0e-07;

/// Keypoints whose normalised minimum eigenvalue falls below this are lost.
pub const EIGENVALUE_THRESHOLD: f32 = 1.0e-04;

/// Linear scale between two adjacent pyramid levels.
pub const SCALE_PYRAMID_HALF: f32 = 0.5;

/// Size of the Scharr filter. Half of it is the border lost by undefined border handling.
pub const SCHARR_FILTER_SIZE: usize = 3;

/// Iteration cap used when termination only depends on epsilon.
pub const MAX_EPSILON_ITERATIONS: usize = 1000;

/// Two consecutive deltas summing below this (per axis) are considered oscillating.
pub const OSCILLATION_THRESHOLD: f32 = 0.01;
