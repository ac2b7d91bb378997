//! # Pyramidal optical flow driver

use crate::consts::SCHARR_FILTER_SIZE;
use crate::image::{Border, Pixel, Plane};
use crate::keypoint::{Keypoint, TrackedPoints};
use crate::params::OpticalFlowParameters;
use crate::pyramid::Pyramid;
use crate::refine::LevelContext;
use crate::scharr::scharr_3x3;
use anyhow::{bail, Result};
use log::*;

/// Sparse pyramidal Lucas-Kanade tracker.
///
/// Keypoints are tracked coarse-to-fine. Every level seeds the next finer one, and only the
/// full resolution level decides whether a keypoint is lost.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PyramidalLk {
    pub params: OpticalFlowParameters,
    /// Number of pyramid levels, including the full resolution one.
    pub num_levels: usize,
    pub border: Border,
}

impl Default for PyramidalLk {
    fn default() -> Self {
        Self {
            params: Default::default(),
            num_levels: 3,
            border: Default::default(),
        }
    }
}

impl PyramidalLk {
    pub fn new(params: OpticalFlowParameters, num_levels: usize, border: Border) -> Self {
        Self {
            params,
            num_levels,
            border,
        }
    }

    pub fn params(self, params: OpticalFlowParameters) -> Self {
        Self { params, ..self }
    }

    pub fn num_levels(self, num_levels: usize) -> Self {
        Self { num_levels, ..self }
    }

    pub fn border(self, border: Border) -> Self {
        Self { border, ..self }
    }

    /// Check the configuration for values the tracker can not work with.
    pub fn validate(&self) -> Result<()> {
        if self.num_levels == 0 {
            bail!("At least one pyramid level is required");
        }

        self.params.validate()
    }

    /// Build a pyramid suitable for [`flow_pyramids`](Self::flow_pyramids).
    pub fn build_pyramid<T: Pixel>(&self, image: &Plane<T>) -> Pyramid<T> {
        Pyramid::gaussian_half(image, self.num_levels, self.border)
    }

    /// Track keypoints from the old image to the new one.
    ///
    /// Returns one keypoint per entry of `old_points`, in the same order.
    ///
    /// # Arguments
    ///
    /// * `old_image` - image the keypoints were detected in.
    /// * `new_image` - image to track the keypoints into.
    /// * `old_points` - keypoints in the old image.
    /// * `new_estimates` - initial guesses in the new image. Only used when
    /// `use_initial_estimate` is set, and then must be as long as `old_points`.
    pub fn flow<T: Pixel>(
        &self,
        old_image: &Plane<T>,
        new_image: &Plane<T>,
        old_points: &[Keypoint],
        new_estimates: &[Keypoint],
    ) -> Result<Vec<Keypoint>> {
        if old_image.dim() != new_image.dim() {
            bail!(
                "Image shapes differ: {:?} vs {:?}",
                old_image.dim(),
                new_image.dim()
            );
        }

        self.validate()?;

        let old_pyramid = self.build_pyramid(old_image);
        let new_pyramid = self.build_pyramid(new_image);

        self.track_levels(&old_pyramid, &new_pyramid, old_points, new_estimates)
    }

    /// Track keypoints between two prebuilt pyramids.
    ///
    /// Both pyramids must have at least `num_levels` levels of matching sizes.
    pub fn flow_pyramids<T: Pixel>(
        &self,
        old_pyramid: &Pyramid<T>,
        new_pyramid: &Pyramid<T>,
        old_points: &[Keypoint],
        new_estimates: &[Keypoint],
    ) -> Result<Vec<Keypoint>> {
        self.validate()?;
        self.track_levels(old_pyramid, new_pyramid, old_points, new_estimates)
    }

    /// [`flow_pyramids`](Self::flow_pyramids) on an already validated configuration.
    fn track_levels<T: Pixel>(
        &self,
        old_pyramid: &Pyramid<T>,
        new_pyramid: &Pyramid<T>,
        old_points: &[Keypoint],
        new_estimates: &[Keypoint],
    ) -> Result<Vec<Keypoint>> {
        let num_levels = self.num_levels;
        let params = &self.params;

        if old_pyramid.num_levels() < num_levels || new_pyramid.num_levels() < num_levels {
            bail!(
                "Pyramids have {} and {} levels, {num_levels} needed",
                old_pyramid.num_levels(),
                new_pyramid.num_levels()
            );
        }

        for (old, new) in old_pyramid.levels()[..num_levels]
            .iter()
            .zip(&new_pyramid.levels()[..num_levels])
        {
            if old.dim() != new.dim() {
                bail!("Pyramid level shapes differ: {:?} vs {:?}", old.dim(), new.dim());
            }
            if old.is_empty() {
                bail!("Can not track in an empty image");
            }
        }

        if params.use_initial_estimate && new_estimates.len() != old_points.len() {
            bail!(
                "Got {} estimates for {} keypoints",
                new_estimates.len(),
                old_points.len()
            );
        }

        let mut points = TrackedPoints::with_len(old_points.len());

        if points.is_empty() {
            return Ok(vec![]);
        }

        for level in (0..num_levels).rev() {
            let old_image = old_pyramid.level(level);
            let new_image = new_pyramid.level(level);

            let (grad_x, grad_y) = scharr_3x3(old_image, self.border);

            points.scale_to_level(
                level,
                num_levels,
                params.use_initial_estimate,
                old_points,
                new_estimates,
            );

            let ctx = LevelContext {
                level,
                old_image,
                new_image,
                grad_x: &grad_x,
                grad_y: &grad_y,
                valid_region: old_image.valid_region(self.border.mode, SCHARR_FILTER_SIZE / 2),
                border: self.border,
                params,
            };

            let stats = ctx.track_all(&mut points);

            debug!(
                "level {level} ({}x{}): {} keypoints, {} lost, {} iterations",
                old_image.width(),
                old_image.height(),
                points.len() - stats.skipped,
                stats.lost(),
                stats.iterations
            );
        }

        Ok(points.to_keypoints())
    }
}

/// Track keypoints from the old image to the new one.
///
/// This is a shorthand for [`PyramidalLk::flow`].
///
/// # Examples
///
/// ```
/// use pyrlk::prelude::v1::*;
///
/// let image = Plane::from_fn(64, 64, |x, y| {
///     let (dx, dy) = (x as f32 - 32.0, y as f32 - 32.0);
///     (40.0 + 180.0 * (-(dx * dx + dy * dy) / 72.0).exp()) as u8
/// });
///
/// let params = OpticalFlowParameters::default().window_dimension(9);
/// let points = [Keypoint::new(32, 32), Keypoint::new(1, 1)];
///
/// let tracked = optical_flow(&image, &image, &params, 2, &points, &[], Border::undefined())?;
///
/// assert_eq!(tracked, [Keypoint::new(32, 32), Keypoint { x: 1, y: 1, tracking_status: 0 }]);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn optical_flow<T: Pixel>(
    old_image: &Plane<T>,
    new_image: &Plane<T>,
    params: &OpticalFlowParameters,
    num_levels: usize,
    old_points: &[Keypoint],
    new_estimates: &[Keypoint],
    border: Border,
) -> Result<Vec<Keypoint>> {
    PyramidalLk::new(*params, num_levels, border).flow(
        old_image,
        new_image,
        old_points,
        new_estimates,
    )
}
