//! # Per-level iterative refinement
//!
//! Every keypoint is refined independently at each pyramid level. The refinement produces a
//! [`LevelOutcome`], and losing a keypoint only becomes final on the full resolution level.

use crate::consts::{INTENSITY_BITS, OSCILLATION_THRESHOLD, SCALE_PYRAMID_HALF, W_BITS};
use crate::gradient::{SpatialGradient, TemporalGradient};
use crate::image::{Border, Pixel, Plane, ValidRegion};
use crate::keypoint::{InternalKeypoint, TrackedPoints};
use crate::params::OpticalFlowParameters;
use crate::sampler::derivative_window;
use log::*;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Result of refining a single keypoint on a single level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelOutcome {
    /// The old keypoint was not tracked, nothing was done.
    Skipped,
    /// Either the old or the new window left the valid region.
    OutOfBounds,
    /// The window does not have enough texture to solve for motion.
    LowTexture,
    /// The update became smaller than epsilon.
    Converged { iterations: usize },
    /// Two consecutive updates (nearly) cancelled each other out.
    Oscillating { iterations: usize },
    /// The iteration limit was reached.
    Exhausted { iterations: usize },
}

impl LevelOutcome {
    /// Whether the outcome loses the keypoint when it happens at full resolution.
    pub fn is_lost(&self) -> bool {
        matches!(self, Self::OutOfBounds | Self::LowTexture)
    }
}

/// Tally of refinement outcomes on a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub skipped: usize,
    pub out_of_bounds: usize,
    pub low_texture: usize,
    pub converged: usize,
    pub oscillating: usize,
    pub exhausted: usize,
    pub iterations: usize,
}

impl LevelStats {
    pub fn record(&mut self, outcome: LevelOutcome) {
        match outcome {
            LevelOutcome::Skipped => self.skipped += 1,
            LevelOutcome::OutOfBounds => self.out_of_bounds += 1,
            LevelOutcome::LowTexture => self.low_texture += 1,
            LevelOutcome::Converged { iterations } => {
                self.converged += 1;
                self.iterations += iterations;
            }
            LevelOutcome::Oscillating { iterations } => {
                self.oscillating += 1;
                self.iterations += iterations;
            }
            LevelOutcome::Exhausted { iterations } => {
                self.exhausted += 1;
                self.iterations += iterations;
            }
        }
    }

    /// Number of keypoints lost on this level.
    pub fn lost(&self) -> usize {
        self.out_of_bounds + self.low_texture
    }
}

/// Everything the refinement needs to know about the level being processed.
pub struct LevelContext<'a, T> {
    pub level: usize,
    pub old_image: &'a Plane<T>,
    pub new_image: &'a Plane<T>,
    pub grad_x: &'a Plane<i16>,
    pub grad_y: &'a Plane<i16>,
    pub valid_region: ValidRegion,
    pub border: Border,
    pub params: &'a OpticalFlowParameters,
}

impl<'a, T: Pixel> LevelContext<'a, T> {
    /// Refine a single keypoint pair on this level.
    ///
    /// Only the new keypoint is modified. Its tracking status gets cleared if the keypoint is
    /// lost on the full resolution level.
    ///
    /// # Arguments
    ///
    /// * `old` - reference position in the old image.
    /// * `new` - current estimate in the new image.
    pub fn track(&self, old: &InternalKeypoint, new: &mut InternalKeypoint) -> LevelOutcome {
        if !old.tracking_status {
            return LevelOutcome::Skipped;
        }

        let outcome = self.refine(old, new);

        if self.level == 0 && outcome.is_lost() {
            new.tracking_status = false;
        }

        outcome
    }

    /// Refine every keypoint on this level.
    pub fn track_all(&self, points: &mut TrackedPoints) -> LevelStats {
        #[cfg(feature = "rayon")]
        let outcomes = points
            .old
            .par_iter()
            .zip(points.new.par_iter_mut())
            .map(|(old, new)| self.track(old, new))
            .collect::<Vec<_>>();

        #[cfg(not(feature = "rayon"))]
        let outcomes = points
            .old
            .iter()
            .zip(points.new.iter_mut())
            .map(|(old, new)| self.track(old, new))
            .collect::<Vec<_>>();

        let mut stats = LevelStats::default();

        for (i, outcome) in outcomes.into_iter().enumerate() {
            trace!("level {} keypoint {i}: {outcome:?}", self.level);
            stats.record(outcome);
        }

        stats
    }

    fn refine(&self, old: &InternalKeypoint, new: &mut InternalKeypoint) -> LevelOutcome {
        let params = self.params;
        let window = params.window_dimension;

        if old.is_outside(&self.valid_region, window) {
            return LevelOutcome::OutOfBounds;
        }

        let ix = derivative_window(self.grad_x, old, self.border, window, W_BITS);
        let iy = derivative_window(self.grad_y, old, self.border, window, W_BITS);

        let gradient = SpatialGradient::from_windows(&ix, &iy);

        if !gradient.is_trackable(window) {
            return LevelOutcome::LowTexture;
        }

        let determinant = gradient.determinant();
        let intensity_scale = W_BITS - INTENSITY_BITS;

        // The old keypoint stays put for the whole level.
        let old_window =
            derivative_window(self.old_image, old, self.border, window, intensity_scale);

        let uses_epsilon = params.termination.uses_epsilon();
        let iteration_cap = params.iteration_cap();

        let mut prev_delta = (0.0f32, 0.0f32);

        for j in 0..iteration_cap {
            if new.is_outside(&self.valid_region, window) {
                return LevelOutcome::OutOfBounds;
            }

            let new_window =
                derivative_window(self.new_image, new, self.border, window, intensity_scale);

            let b = TemporalGradient::from_windows(&old_window, &new_window, &ix, &iy);
            let (delta_x, delta_y) = gradient.solve(&b, determinant);

            new.x += delta_x;
            new.y += delta_y;

            if uses_epsilon && delta_x * delta_x + delta_y * delta_y <= params.epsilon {
                return LevelOutcome::Converged { iterations: j + 1 };
            }

            if j > 0 && damp_oscillation(new, (delta_x, delta_y), prev_delta) {
                return LevelOutcome::Oscillating { iterations: j + 1 };
            }

            prev_delta = (delta_x, delta_y);
        }

        LevelOutcome::Exhausted {
            iterations: iteration_cap,
        }
    }
}

/// Undo half of the last update if it (nearly) cancelled out the previous one.
///
/// Returns whether the update was oscillating.
///
/// # Arguments
///
/// * `new` - estimate with `delta` already applied.
/// * `delta` - last update.
/// * `prev_delta` - update applied the iteration before.
fn damp_oscillation(
    new: &mut InternalKeypoint,
    delta: (f32, f32),
    prev_delta: (f32, f32),
) -> bool {
    let oscillating = (delta.0 + prev_delta.0).abs() < OSCILLATION_THRESHOLD
        && (delta.1 + prev_delta.1).abs() < OSCILLATION_THRESHOLD;

    if oscillating {
        new.x -= delta.0 * SCALE_PYRAMID_HALF;
        new.y -= delta.1 * SCALE_PYRAMID_HALF;
    }

    oscillating
}
