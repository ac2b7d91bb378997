//! # Scharr 3x3 gradient operator

use crate::image::{Border, Pixel, Plane};
use crate::utils::saturate_i16;

/// Horizontal Scharr kernel, row-major. The vertical one is its transpose.
const SCHARR_X: [[i32; 3]; 3] = [[-3, 0, 3], [-10, 0, 10], [-3, 0, 3]];

/// Compute horizontal and vertical Scharr gradients.
///
/// Returns `(gx, gy)`, both of the same size as `src`. A unit horizontal intensity slope
/// produces `gx = 32`.
///
/// # Arguments
///
/// * `src` - input image.
/// * `border` - border policy used for reads outside of `src`.
pub fn scharr_3x3<T: Pixel>(src: &Plane<T>, border: Border) -> (Plane<i16>, Plane<i16>) {
    let constant = T::from_i32_saturating(border.constant_value as i32);
    let (w, h) = src.dim();

    let mut gx = Plane::new(w, h);
    let mut gy = Plane::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let (mut sx, mut sy) = (0, 0);

            for (j, row) in SCHARR_X.iter().enumerate() {
                for (i, &k) in row.iter().enumerate() {
                    let (sample_x, sample_y) = (x as i32 + i as i32 - 1, y as i32 + j as i32 - 1);
                    let v: i32 = src
                        .element_at(sample_x, sample_y, border.mode, constant)
                        .into();
                    sx += v * k;
                    // Transposed kernel for the vertical direction.
                    sy += v * SCHARR_X[i][j];
                }
            }

            gx.set(x, y, saturate_i16(sx));
            gy.set(x, y, saturate_i16(sy));
        }
    }

    (gx, gy)
}
