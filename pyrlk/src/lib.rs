//! # Pyramidal Lucas-Kanade Tracking Library
//!
//! This library tracks sparse keypoints between pairs of grayscale frames. Motion is refined
//! iteratively on a Gaussian image pyramid, from the coarsest level down to full resolution,
//! using fixed point bilinear sampling and Scharr gradients.
//!
//! The easiest way to use the library is to import its prelude:
//!
//! ```
//! use pyrlk::prelude::v1::*;
//! ```
//!
//! Then either call [`optical_flow`](flow::optical_flow) on a pair of frames, or feed a
//! [`FrameTracker`](tracker::FrameTracker) one frame at a time.

pub mod consts;
pub mod flow;
pub mod gradient;
pub mod image;
pub mod keypoint;
pub mod motion;
pub mod params;
pub mod pyramid;
pub mod refine;
pub mod sampler;
pub mod scharr;
pub mod tracker;
pub mod utils;

pub mod prelude {
    pub mod v1 {
        pub use crate::{
            flow::{optical_flow, PyramidalLk},
            image::{Border, BorderMode, Pixel, Plane},
            keypoint::Keypoint,
            motion::{motion_vectors, MotionEntry, MotionVectors},
            params::{OpticalFlowParameters, Termination},
            pyramid::Pyramid,
            tracker::{FrameTracker, Tracker},
        };
        pub use anyhow::{anyhow, Error, Result};
    }
}
