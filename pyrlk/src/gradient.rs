//! # Lucas-Kanade normal equations
//!
//! The spatial gradient matrix `G = [A11 A12; A12 A22]` and the temporal gradient vector
//! `b = [b1; b2]` are accumulated in fixed point from window samples and converted to floats
//! with [`FLT_SCALE`]. The motion update is then `-G^-1 * b`.

use crate::consts::{DETERMINANT_THRESHOLD, EIGENVALUE_THRESHOLD, FLT_SCALE};

/// Symmetric 2x2 structure tensor of a window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpatialGradient {
    pub a11: f32,
    pub a12: f32,
    pub a22: f32,
}

impl SpatialGradient {
    /// Accumulate the structure tensor from gradient windows.
    ///
    /// # Panics
    ///
    /// If the windows are of different length.
    pub fn from_windows(ix: &[i32], iy: &[i32]) -> Self {
        assert_eq!(ix.len(), iy.len(), "gradient window size mismatch");

        let (mut a11, mut a12, mut a22) = (0i64, 0i64, 0i64);

        for (&x, &y) in ix.iter().zip(iy) {
            let (x, y) = (x as i64, y as i64);
            a11 += x * x;
            a12 += x * y;
            a22 += y * y;
        }

        Self {
            a11: a11 as f32 * FLT_SCALE,
            a12: a12 as f32 * FLT_SCALE,
            a22: a22 as f32 * FLT_SCALE,
        }
    }

    pub fn determinant(&self) -> f32 {
        self.a11 * self.a22 - self.a12 * self.a12
    }

    /// Smaller eigenvalue of the matrix, divided by the number of window pixels.
    pub fn min_eigenvalue(&self, window_dimension: usize) -> f32 {
        let trace = self.a11 + self.a22;
        let discriminant = trace * trace - 4.0 * self.determinant();
        let eigenvalue = (trace - discriminant.sqrt()) / 2.0;

        eigenvalue / (window_dimension * window_dimension) as f32
    }

    /// Whether the window has enough texture in both directions to be tracked.
    pub fn is_trackable(&self, window_dimension: usize) -> bool {
        !(self.min_eigenvalue(window_dimension) < EIGENVALUE_THRESHOLD
            || self.determinant() < DETERMINANT_THRESHOLD)
    }

    /// Solve for the motion that cancels the temporal gradient.
    ///
    /// # Arguments
    ///
    /// * `b` - temporal gradient vector.
    /// * `determinant` - precomputed [`determinant`](Self::determinant).
    pub fn solve(&self, b: &TemporalGradient, determinant: f32) -> (f32, f32) {
        let (a11, a12, a22) = (self.a11 as f64, self.a12 as f64, self.a22 as f64);
        let det = determinant as f64;

        let delta_x = (a12 * b.b2 - a22 * b.b1) / det;
        let delta_y = (a12 * b.b1 - a11 * b.b2) / det;

        (delta_x as f32, delta_y as f32)
    }
}

/// Mismatch between the two frames, projected onto the spatial gradients.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TemporalGradient {
    pub b1: f64,
    pub b2: f64,
}

impl TemporalGradient {
    /// Accumulate the temporal gradient vector.
    ///
    /// # Arguments
    ///
    /// * `old` - intensity window in the old image.
    /// * `new` - intensity window in the new image.
    /// * `ix` - horizontal gradient window in the old image.
    /// * `iy` - vertical gradient window in the old image.
    ///
    /// # Panics
    ///
    /// If any of the windows differ in length.
    pub fn from_windows(old: &[i32], new: &[i32], ix: &[i32], iy: &[i32]) -> Self {
        assert_eq!(ix.len(), iy.len(), "gradient window size mismatch");
        assert_eq!(old.len(), new.len(), "intensity window size mismatch");
        assert_eq!(old.len(), ix.len(), "intensity and gradient window size mismatch");

        let (mut b1, mut b2) = (0i64, 0i64);

        for (((&i, &j), &x), &y) in old.iter().zip(new).zip(ix).zip(iy) {
            let diff = (j - i) as i64;
            b1 += diff * x as i64;
            b2 += diff * y as i64;
        }

        Self {
            b1: (b1 as f32 * FLT_SCALE) as f64,
            b2: (b2 as f32 * FLT_SCALE) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn structure_tensor() {
        let g = SpatialGradient::from_windows(&[1024, 0, -1024], &[0, 1024, 1024]);

        assert_approx_eq!(g.a11, 2.0);
        assert_approx_eq!(g.a12, -1.0);
        assert_approx_eq!(g.a22, 2.0);
        assert_approx_eq!(g.determinant(), 3.0);
        assert_approx_eq!(g.min_eigenvalue(1), 1.0);
        assert_approx_eq!(g.min_eigenvalue(3), 1.0 / 9.0);
    }

    #[test]
    #[should_panic]
    fn mismatched_windows_are_fatal() {
        SpatialGradient::from_windows(&[1, 2, 3], &[1, 2]);
    }

    #[test]
    #[should_panic]
    fn mismatched_temporal_windows_are_fatal() {
        TemporalGradient::from_windows(&[1, 2], &[1, 2, 3], &[0, 0], &[0, 0]);
    }

    #[test]
    fn rank_deficient_windows_are_not_trackable() {
        let ix = vec![32; 225];
        let iy = vec![0; 225];
        assert!(!SpatialGradient::from_windows(&ix, &iy).is_trackable(15));
        assert!(!SpatialGradient::from_windows(&iy, &iy).is_trackable(15));

        let g = SpatialGradient::from_windows(&[1024, 0], &[0, 1024]);
        assert!(g.is_trackable(1));
    }

    #[test]
    fn solves_translation() {
        // Unit gradients along both axes. The new frame got brighter, so the content moved
        // against the gradient.
        let ix = [1024, 0];
        let iy = [0, 1024];
        let g = SpatialGradient::from_windows(&ix, &iy);
        let b = TemporalGradient::from_windows(&[0, 0], &[1024, 2048], &ix, &iy);

        assert_approx_eq!(b.b1, 1.0);
        assert_approx_eq!(b.b2, 2.0);

        let (dx, dy) = g.solve(&b, g.determinant());
        assert_approx_eq!(dx, -1.0);
        assert_approx_eq!(dy, -2.0);
    }

    #[test]
    fn identical_windows_have_no_motion() {
        let ix = [300, -20, 45, 800];
        let iy = [-60, 510, 90, 12];
        let frame = [4000, 4100, 3900, 3800];

        let g = SpatialGradient::from_windows(&ix, &iy);
        let b = TemporalGradient::from_windows(&frame, &frame, &ix, &iy);

        assert_eq!(b, TemporalGradient::default());
        assert_eq!(g.solve(&b, g.determinant()), (0.0, 0.0));
    }
}
