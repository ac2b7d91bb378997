//! # Keypoints and their per-level bookkeeping

use crate::consts::SCALE_PYRAMID_HALF;
use crate::image::ValidRegion;
use bytemuck::{Pod, Zeroable};

/// Keypoint with integer pixel coordinates.
///
/// `tracking_status` is 1 for tracked points and 0 for lost ones.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Keypoint {
    pub x: i32,
    pub y: i32,
    pub tracking_status: i32,
}

impl Keypoint {
    /// Create a tracked keypoint.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            tracking_status: 1,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracking_status != 0
    }
}

/// Keypoint with sub-pixel coordinates, used while tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InternalKeypoint {
    pub x: f32,
    pub y: f32,
    pub tracking_status: bool,
}

impl InternalKeypoint {
    /// Check whether a `window_dimension` sized window around the keypoint leaves the valid
    /// region.
    ///
    /// The window is anchored at the floored coordinates. The last row and column of the
    /// region are excluded as well, since bilinear sampling reads one pixel past the window.
    pub fn is_outside(&self, region: &ValidRegion, window_dimension: usize) -> bool {
        let half_window = (window_dimension / 2) as i32;
        let x = self.x.floor() as i32;
        let y = self.y.floor() as i32;

        x - half_window < region.start.0
            || x + half_window >= region.end.0 - 1
            || y - half_window < region.start.1
            || y + half_window >= region.end.1 - 1
    }

    /// Round into an integer keypoint.
    pub fn round(&self) -> Keypoint {
        Keypoint {
            x: self.x.round() as i32,
            y: self.y.round() as i32,
            tracking_status: self.tracking_status as i32,
        }
    }
}

/// Index aligned reference ("old") and estimated ("new") keypoint positions.
///
/// Entry `i` of both arrays belongs to input keypoint `i` for the whole run.
#[derive(Clone, Debug, Default)]
pub struct TrackedPoints {
    pub old: Vec<InternalKeypoint>,
    pub new: Vec<InternalKeypoint>,
}

impl TrackedPoints {
    /// Allocate internal state for `len` keypoints.
    pub fn with_len(len: usize) -> Self {
        Self {
            old: vec![Default::default(); len],
            new: vec![Default::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.old.len()
    }

    pub fn is_empty(&self) -> bool {
        self.old.is_empty()
    }

    /// Bring the keypoints to the resolution of `level`.
    ///
    /// On the coarsest level the points get seeded from the caller input, scaled down by
    /// `0.5^level`. The old points always start tracked. The new points either copy the old
    /// ones, or take the caller estimates. An estimate only starts tracked if its status is
    /// exactly 1.
    ///
    /// On any other level every coordinate is scaled up by 2, regardless of the status.
    ///
    /// # Arguments
    ///
    /// * `level` - level that is about to be processed.
    /// * `num_levels` - total number of levels.
    /// * `use_initial_estimate` - seed new points from `estimates`.
    /// * `old_points` - keypoints in the old image, at full resolution.
    /// * `estimates` - estimated keypoints in the new image. Only read with
    /// `use_initial_estimate`, in which case it must be as long as `old_points`.
    pub fn scale_to_level(
        &mut self,
        level: usize,
        num_levels: usize,
        use_initial_estimate: bool,
        old_points: &[Keypoint],
        estimates: &[Keypoint],
    ) {
        if level + 1 == num_levels {
            let scale = SCALE_PYRAMID_HALF.powi(level as i32);

            for (i, (old, new)) in self.old.iter_mut().zip(self.new.iter_mut()).enumerate() {
                let point = &old_points[i];

                *old = InternalKeypoint {
                    x: point.x as f32 * scale,
                    y: point.y as f32 * scale,
                    tracking_status: true,
                };

                *new = if use_initial_estimate {
                    let estimate = &estimates[i];
                    InternalKeypoint {
                        x: estimate.x as f32 * scale,
                        y: estimate.y as f32 * scale,
                        tracking_status: estimate.tracking_status == 1,
                    }
                } else {
                    InternalKeypoint {
                        tracking_status: true,
                        ..*old
                    }
                };
            }
        } else {
            for p in self.old.iter_mut().chain(self.new.iter_mut()) {
                p.x /= SCALE_PYRAMID_HALF;
                p.y /= SCALE_PYRAMID_HALF;
            }
        }
    }

    /// Round the new points into integer keypoints, preserving order.
    pub fn to_keypoints(&self) -> Vec<Keypoint> {
        self.new.iter().map(InternalKeypoint::round).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(w: i32, h: i32) -> ValidRegion {
        ValidRegion {
            start: (0, 0),
            end: (w, h),
        }
    }

    #[test]
    fn window_gate() {
        let r = region(100, 100);
        let at = |x, y| InternalKeypoint {
            x,
            y,
            tracking_status: true,
        };

        assert!(!at(50.0, 50.0).is_outside(&r, 15));
        assert!(!at(7.0, 7.0).is_outside(&r, 15));
        assert!(at(6.9, 50.0).is_outside(&r, 15));
        assert!(!at(91.9, 50.0).is_outside(&r, 15));
        assert!(at(92.0, 50.0).is_outside(&r, 15));
        assert!(at(50.0, 92.0).is_outside(&r, 15));
        assert!(at(-0.5, 50.0).is_outside(&r, 1));
    }

    #[test]
    fn coarsest_level_seeding() {
        let old = [Keypoint::new(40, 80), Keypoint::new(3, 5)];
        let est = [
            Keypoint::new(44, 84),
            Keypoint {
                x: 8,
                y: 8,
                tracking_status: 0,
            },
        ];

        let mut points = TrackedPoints::with_len(2);
        points.scale_to_level(2, 3, false, &old, &[]);

        assert_eq!((points.old[0].x, points.old[0].y), (10.0, 20.0));
        assert_eq!(points.new[0], points.old[0]);
        assert!(points.new[1].tracking_status);

        points.scale_to_level(2, 3, true, &old, &est);
        assert_eq!((points.new[0].x, points.new[0].y), (11.0, 21.0));
        assert!(!points.new[1].tracking_status);
        assert!(points.old[1].tracking_status);

        let est = [
            Keypoint {
                tracking_status: 2,
                ..est[0]
            },
            Keypoint {
                tracking_status: -1,
                ..est[0]
            },
        ];
        points.scale_to_level(2, 3, true, &old, &est);
        assert!(!points.new[0].tracking_status);
        assert!(!points.new[1].tracking_status);
    }

    #[test]
    fn finer_levels_double_everything() {
        let old = [Keypoint::new(40, 80)];
        let mut points = TrackedPoints::with_len(1);
        points.scale_to_level(1, 2, false, &old, &[]);
        points.new[0].x += 0.25;
        points.new[0].tracking_status = false;

        points.scale_to_level(0, 2, false, &old, &[]);

        assert_eq!((points.old[0].x, points.old[0].y), (40.0, 80.0));
        assert_eq!((points.new[0].x, points.new[0].y), (40.5, 80.0));
        assert!(!points.new[0].tracking_status);
    }

    #[test]
    fn rounding_back() {
        let p = InternalKeypoint {
            x: 51.5,
            y: 49.49,
            tracking_status: true,
        };
        assert_eq!(p.round(), Keypoint::new(52, 49));
        assert_eq!(
            InternalKeypoint {
                tracking_status: false,
                ..p
            }
            .round()
            .tracking_status,
            0
        );
    }
}
