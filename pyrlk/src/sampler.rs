//! # Fixed-point bilinear sampling

use crate::consts::D0;
use crate::image::{Border, Pixel, Plane};
use crate::keypoint::InternalKeypoint;
use crate::utils::round_right_shift;

/// Fixed-point bilinear weights `(w00, w01, w10, w11)` for fractional offsets `(dx, dy)`.
///
/// The first three weights are rounded independently, the last one takes the remainder, thus
/// the four always sum up to exactly [`D0`].
pub fn bilinear_weights(dx: f32, dy: f32) -> [i32; 4] {
    let dx_1 = 1.0 - dx;
    let dy_1 = 1.0 - dy;
    let d0 = D0 as f32;

    let w00 = (dx_1 * dy_1 * d0).round() as i32;
    let w01 = (dx * dy_1 * d0).round() as i32;
    let w10 = (dx_1 * dy * d0).round() as i32;
    let w11 = D0 - w00 - w01 - w10;

    [w00, w01, w10, w11]
}

/// Sample the plane between `(x, y)` and `(x + 1, y + 1)`.
///
/// # Arguments
///
/// * `plane` - image or gradient plane to sample.
/// * `x` - column of the top-left neighbour.
/// * `y` - row of the top-left neighbour.
/// * `weights` - output of [`bilinear_weights`].
/// * `border` - border policy for reads outside of the plane.
/// * `scale` - number of fractional bits to drop from the weighted sum.
pub fn bilinear_interpolate<T: Pixel>(
    plane: &Plane<T>,
    x: i32,
    y: i32,
    [w00, w01, w10, w11]: [i32; 4],
    border: Border,
    scale: i32,
) -> i32 {
    let constant = T::from_i32_saturating(border.constant_value as i32);
    let at = |x, y| -> i32 { plane.element_at(x, y, border.mode, constant).into() };

    let tl = at(x, y);
    let tr = at(x + 1, y);
    let bl = at(x, y + 1);
    let br = at(x + 1, y + 1);

    round_right_shift(tl * w00 + tr * w01 + bl * w10 + br * w11, scale)
}

/// Iterate fixed-point samples of a `window_dimension` sized square around the keypoint.
///
/// The window is anchored at the truncated keypoint coordinates and every sample is
/// interpolated with the fractional part of the keypoint. Samples are produced row by row.
///
/// # Arguments
///
/// * `plane` - image or gradient plane to sample.
/// * `keypoint` - window centre.
/// * `border` - border policy for reads outside of the plane.
/// * `window_dimension` - side of the window, odd.
/// * `scale` - number of fractional bits to drop from every sample.
pub fn window_samples<'a, T: Pixel>(
    plane: &'a Plane<T>,
    keypoint: &InternalKeypoint,
    border: Border,
    window_dimension: usize,
    scale: i32,
) -> impl Iterator<Item = i32> + Clone + 'a {
    let half_window = (window_dimension / 2) as i32;

    let (int_x, int_y) = (keypoint.x.trunc(), keypoint.y.trunc());
    let weights = bilinear_weights(keypoint.x - int_x, keypoint.y - int_y);
    let (cx, cy) = (int_x as i32, int_y as i32);

    (cy - half_window..=cy + half_window).flat_map(move |y| {
        (cx - half_window..=cx + half_window)
            .map(move |x| bilinear_interpolate(plane, x, y, weights, border, scale))
    })
}

/// Collect [`window_samples`] into a buffer.
pub fn derivative_window<T: Pixel>(
    plane: &Plane<T>,
    keypoint: &InternalKeypoint,
    border: Border,
    window_dimension: usize,
    scale: i32,
) -> Vec<i32> {
    window_samples(plane, keypoint, border, window_dimension, scale).collect()
}
