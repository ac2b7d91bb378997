//! # Motion vectors from tracked keypoints

use crate::keypoint::Keypoint;
use nalgebra as na;

/// Pair containing normalised coordinates and motion at them.
pub type MotionEntry = (na::Point2<f32>, na::Vector2<f32>);
/// Vector of `MotionEntry` elements.
pub type MotionVectors = Vec<MotionEntry>;

/// Convert a keypoint into normalised image coordinates.
///
/// `(0, 0)` is the top-left corner, `(1, 1)` the bottom-right one.
pub fn normalise(keypoint: &Keypoint, width: usize, height: usize) -> na::Point2<f32> {
    na::Point2::new(
        keypoint.x as f32 / width as f32,
        keypoint.y as f32 / height as f32,
    )
}

/// Build a motion field out of tracking results.
///
/// Only keypoints that survived tracking produce an entry. Every entry is located at the old
/// keypoint and points to the new one, both in normalised coordinates.
///
/// # Arguments
///
/// * `old_points` - keypoints given to the tracker.
/// * `new_points` - tracker output, index aligned with `old_points`.
/// * `width` - width of the tracked frames.
/// * `height` - height of the tracked frames.
pub fn motion_vectors(
    old_points: &[Keypoint],
    new_points: &[Keypoint],
    width: usize,
    height: usize,
) -> MotionVectors {
    old_points
        .iter()
        .zip(new_points)
        .filter(|(_, new)| new.is_tracked())
        .map(|(old, new)| {
            let pos = normalise(old, width, height);
            (pos, normalise(new, width, height) - pos)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn only_tracked_points() {
        let old = [Keypoint::new(10, 20), Keypoint::new(50, 50), Keypoint::new(0, 0)];
        let new = [
            Keypoint::new(15, 10),
            Keypoint {
                x: 51,
                y: 50,
                tracking_status: 0,
            },
            Keypoint::new(0, 0),
        ];

        let field = motion_vectors(&old, &new, 100, 40);

        assert_eq!(field.len(), 2);

        let (pos, motion) = field[0];
        assert_approx_eq!(pos.x, 0.1);
        assert_approx_eq!(pos.y, 0.5);
        assert_approx_eq!(motion.x, 0.05);
        assert_approx_eq!(motion.y, -0.25);

        assert_eq!(field[1].1, na::Vector2::zeros());
    }
}
