//! # Keypoint trackers

use crate::prelude::v1::*;

/// Generic sparse keypoint tracker.
pub trait Tracker<T> {
    /// Track keypoints between a pair of frames.
    ///
    /// The output is index aligned with `old_points`. Lost keypoints are kept in place, with
    /// their tracking status cleared.
    ///
    /// # Arguments
    ///
    /// * `old_image` - frame the keypoints come from.
    /// * `new_image` - frame to find the keypoints in.
    /// * `old_points` - keypoints in `old_image`.
    /// * `new_estimates` - optional initial guesses in `new_image`. Trackers may ignore them.
    fn track(
        &mut self,
        old_image: &Plane<T>,
        new_image: &Plane<T>,
        old_points: &[Keypoint],
        new_estimates: &[Keypoint],
    ) -> Result<Vec<Keypoint>>;
}

impl<T: Pixel> Tracker<T> for PyramidalLk {
    fn track(
        &mut self,
        old_image: &Plane<T>,
        new_image: &Plane<T>,
        old_points: &[Keypoint],
        new_estimates: &[Keypoint],
    ) -> Result<Vec<Keypoint>> {
        self.flow(old_image, new_image, old_points, new_estimates)
    }
}

/// Tracks keypoints through a stream of frames.
///
/// The pyramid of the previous frame is kept around, so every frame only gets its pyramid
/// built once.
pub struct FrameTracker<T> {
    lk: PyramidalLk,
    prev: Option<Pyramid<T>>,
}

impl<T: Pixel> From<PyramidalLk> for FrameTracker<T> {
    fn from(lk: PyramidalLk) -> Self {
        Self { lk, prev: None }
    }
}

impl<T: Pixel> FrameTracker<T> {
    pub fn new(lk: PyramidalLk) -> Result<Self> {
        lk.validate()?;
        Ok(lk.into())
    }

    pub fn lk(&self) -> &PyramidalLk {
        &self.lk
    }

    /// Process a single frame in the stream.
    ///
    /// `points` hold keypoints in the previous frame. If there is one, they get replaced with
    /// their positions in `frame`, and `Ok(true)` is returned. On the first frame there is
    /// nothing to track against, so `points` are left untouched and `Ok(false)` is returned.
    ///
    /// With `use_initial_estimate` set, the previous positions double as the estimates.
    pub fn process_frame(
        &mut self,
        frame: &Plane<T>,
        points: &mut Vec<Keypoint>,
    ) -> Result<bool> {
        let pyramid = self.lk.build_pyramid(frame);

        let tracked = if let Some(prev) = &self.prev {
            let tracked = self.lk.flow_pyramids(prev, &pyramid, points, points)?;
            *points = tracked;
            true
        } else {
            false
        };

        self.prev = Some(pyramid);

        Ok(tracked)
    }

    /// Forget the previous frame.
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(cx: f32, cy: f32) -> Plane<u8> {
        Plane::from_fn(96, 96, |x, y| {
            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
            let r2 = dx * dx + dy * dy;
            (30.0 + 120.0 * (-r2 / 98.0).exp() + 60.0 * (-(dx - 6.0).powi(2) / 30.0).exp())
                .round() as u8
        })
    }

    #[test]
    fn first_frame_only_primes() {
        let mut tracker = FrameTracker::new(PyramidalLk::default()).unwrap();
        let mut points = vec![Keypoint::new(48, 48)];

        assert!(!tracker.process_frame(&frame(48.0, 48.0), &mut points).unwrap());
        assert_eq!(points, [Keypoint::new(48, 48)]);

        assert!(tracker.process_frame(&frame(48.0, 48.0), &mut points).unwrap());
        assert_eq!(points, [Keypoint::new(48, 48)]);

        tracker.reset();
        assert!(!tracker.process_frame(&frame(48.0, 48.0), &mut points).unwrap());
    }

    #[test]
    fn follows_through_frames() {
        let lk = PyramidalLk::default()
            .params(OpticalFlowParameters::default().window_dimension(15))
            .num_levels(2)
            .border(Border::replicate());
        let mut tracker = FrameTracker::new(lk).unwrap();
        let mut points = vec![Keypoint::new(40, 40)];

        for i in 0..5 {
            let c = 40.0 + i as f32;
            tracker.process_frame(&frame(c, c), &mut points).unwrap();
        }

        assert!(points[0].is_tracked());
        assert!((points[0].x - 44).abs() <= 1, "{:?}", points[0]);
        assert!((points[0].y - 44).abs() <= 1, "{:?}", points[0]);
    }

    #[test]
    fn trait_object() {
        let mut tracker: Box<dyn Tracker<u8>> = Box::new(PyramidalLk::default().num_levels(1));
        let image = frame(48.0, 48.0);
        let out = tracker
            .track(&image, &image, &[Keypoint::new(48, 48)], &[])
            .unwrap();
        assert_eq!(out, [Keypoint::new(48, 48)]);
    }

    #[test]
    fn invalid_configuration() {
        assert!(FrameTracker::<u8>::new(PyramidalLk::default().num_levels(0)).is_err());

        let mut tracker = FrameTracker::new(PyramidalLk::default()).unwrap();
        let mut points = vec![Keypoint::new(10, 10)];
        tracker
            .process_frame(&Plane::<u8>::new(32, 32), &mut points)
            .unwrap();
        assert!(tracker
            .process_frame(&Plane::<u8>::new(32, 16), &mut points)
            .is_err());
    }
}
