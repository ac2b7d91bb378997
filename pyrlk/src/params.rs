//! # Tracking parameters

use crate::consts::MAX_EPSILON_ITERATIONS;
use anyhow::{bail, Result};

/// Rule deciding when the per-keypoint refinement loop stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Termination {
    /// Stop after a fixed number of iterations.
    Iterations,
    /// Stop once the update is small enough.
    Epsilon,
    /// Stop on whichever of the above happens first.
    Both,
}

impl Termination {
    /// Whether the epsilon criterion takes part in termination.
    pub fn uses_epsilon(self) -> bool {
        matches!(self, Self::Epsilon | Self::Both)
    }
}

/// Parameters of a single optical flow run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OpticalFlowParameters {
    pub termination: Termination,
    /// Refinement stops once the squared magnitude of an update, `dx^2 + dy^2`, is at most
    /// this value.
    pub epsilon: f32,
    /// Maximum number of iterations per keypoint per level.
    pub num_iterations: usize,
    /// Side of the square integration window. Must be odd.
    pub window_dimension: usize,
    /// Seed the coarsest level with the caller supplied estimates instead of the old points.
    pub use_initial_estimate: bool,
}

impl Default for OpticalFlowParameters {
    fn default() -> Self {
        Self {
            termination: Termination::Both,
            epsilon: 0.01,
            num_iterations: 30,
            window_dimension: 21,
            use_initial_estimate: false,
        }
    }
}

impl OpticalFlowParameters {
    pub fn termination(self, termination: Termination) -> Self {
        Self {
            termination,
            ..self
        }
    }

    pub fn epsilon(self, epsilon: f32) -> Self {
        Self { epsilon, ..self }
    }

    pub fn num_iterations(self, num_iterations: usize) -> Self {
        Self {
            num_iterations,
            ..self
        }
    }

    pub fn window_dimension(self, window_dimension: usize) -> Self {
        Self {
            window_dimension,
            ..self
        }
    }

    pub fn use_initial_estimate(self, use_initial_estimate: bool) -> Self {
        Self {
            use_initial_estimate,
            ..self
        }
    }

    /// Check the parameters for values the tracker can not work with.
    pub fn validate(&self) -> Result<()> {
        if self.window_dimension == 0 || self.window_dimension % 2 == 0 {
            bail!(
                "Window dimension must be odd, got {}",
                self.window_dimension
            );
        }

        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            bail!("Epsilon must be a non-negative number, got {}", self.epsilon);
        }

        Ok(())
    }

    /// Number of iterations the refinement loop may run for.
    pub fn iteration_cap(&self) -> usize {
        match self.termination {
            Termination::Epsilon => MAX_EPSILON_ITERATIONS,
            _ => self.num_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let params = OpticalFlowParameters::default()
            .termination(Termination::Iterations)
            .num_iterations(7)
            .window_dimension(15)
            .epsilon(0.5)
            .use_initial_estimate(true);

        assert_eq!(params.termination, Termination::Iterations);
        assert_eq!(params.num_iterations, 7);
        assert_eq!(params.window_dimension, 15);
        assert!(params.use_initial_estimate);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn even_window_is_rejected() {
        assert!(OpticalFlowParameters::default()
            .window_dimension(4)
            .validate()
            .is_err());
        assert!(OpticalFlowParameters::default()
            .window_dimension(0)
            .validate()
            .is_err());
    }

    #[test]
    fn bad_epsilon_is_rejected() {
        assert!(OpticalFlowParameters::default()
            .epsilon(f32::NAN)
            .validate()
            .is_err());
        assert!(OpticalFlowParameters::default()
            .epsilon(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn epsilon_only_runs_up_to_the_cap() {
        let params = OpticalFlowParameters::default()
            .termination(Termination::Epsilon)
            .num_iterations(3);
        assert_eq!(params.iteration_cap(), MAX_EPSILON_ITERATIONS);
        assert_eq!(params.termination(Termination::Both).iteration_cap(), 3);
        assert!(!Termination::Iterations.uses_epsilon());
    }
}
