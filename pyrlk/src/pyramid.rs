//! # Half-scale Gaussian image pyramid

use crate::image::{Border, Pixel, Plane};
use crate::utils::round_right_shift;

/// Binomial approximation of a Gaussian, applied in both directions (sums to 256 in 2D).
const GAUSSIAN_5: [i32; 5] = [1, 4, 6, 4, 1];

/// Multi-resolution representation of an image.
///
/// Level 0 is the full resolution image, every following level has half of the linear
/// resolution of the previous one (rounded up).
#[derive(Clone, Debug)]
pub struct Pyramid<T> {
    levels: Vec<Plane<T>>,
}

impl<T: Pixel> Pyramid<T> {
    /// Build a Gaussian pyramid with `num_levels` levels.
    ///
    /// Every level past the first one is the previous level blurred with a 5x5 Gaussian and
    /// downsampled with nearest neighbour, centre sampling.
    ///
    /// # Arguments
    ///
    /// * `src` - full resolution image.
    /// * `num_levels` - total number of levels, including the full resolution one.
    /// * `border` - border policy used by the blur and the downsampling.
    pub fn gaussian_half(src: &Plane<T>, num_levels: usize, border: Border) -> Self {
        let mut levels = Vec::with_capacity(num_levels);

        if num_levels > 0 {
            levels.push(src.clone());
        }

        for i in 1..num_levels {
            let blurred = gaussian5x5(&levels[i - 1], border);
            levels.push(half_scale_nearest(&blurred, border));
        }

        Self { levels }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Get a single level of the pyramid.
    pub fn level(&self, level: usize) -> &Plane<T> {
        &self.levels[level]
    }

    pub fn levels(&self) -> &[Plane<T>] {
        &self.levels
    }
}

/// Apply the 5x5 Gaussian filter, normalised by 256 with rounding.
pub fn gaussian5x5<T: Pixel>(src: &Plane<T>, border: Border) -> Plane<T> {
    let constant = T::from_i32_saturating(border.constant_value as i32);

    Plane::from_fn(src.width(), src.height(), |x, y| {
        let (x, y) = (x as i32, y as i32);
        let mut sum = 0;

        for (j, ky) in GAUSSIAN_5.iter().enumerate() {
            for (i, kx) in GAUSSIAN_5.iter().enumerate() {
                let v: i32 = src
                    .element_at(x + i as i32 - 2, y + j as i32 - 2, border.mode, constant)
                    .into();
                sum += v * kx * ky;
            }
        }

        T::from_i32_saturating(round_right_shift(sum, 8))
    })
}

/// Downsample to `ceil(w / 2) x ceil(h / 2)` by picking the nearest source pixel to every
/// destination pixel centre.
pub fn half_scale_nearest<T: Pixel>(src: &Plane<T>, border: Border) -> Plane<T> {
    let constant = T::from_i32_saturating(border.constant_value as i32);
    let (w, h) = src.dim();
    let (dw, dh) = ((w + 1) / 2, (h + 1) / 2);

    if dw == 0 || dh == 0 {
        return Plane::new(dw, dh);
    }

    let wr = w as f32 / dw as f32;
    let hr = h as f32 / dh as f32;

    Plane::from_fn(dw, dh, |x, y| {
        let sx = ((x as f32 + 0.5) * wr) as i32;
        let sy = ((y as f32 + 0.5) * hr) as i32;
        src.element_at(sx, sy, border.mode, constant)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_sizes() {
        let src = Plane::<u8>::new(101, 64);
        let pyr = Pyramid::gaussian_half(&src, 4, Border::replicate());

        let dims = pyr.levels().iter().map(Plane::dim).collect::<Vec<_>>();
        assert_eq!(dims, vec![(101, 64), (51, 32), (26, 16), (13, 8)]);
    }

    #[test]
    fn first_level_is_the_source() {
        let src = Plane::from_fn(16, 16, |x, y| (x * 3 + y * 7) as u8);
        let pyr = Pyramid::gaussian_half(&src, 2, Border::undefined());
        assert_eq!(pyr.level(0), &src);
    }

    #[test]
    fn blur_keeps_constant_images() {
        let src = Plane::from_fn(9, 7, |_, _| 77u8);
        assert_eq!(gaussian5x5(&src, Border::replicate()), src);
    }

    #[test]
    fn blur_with_constant_border_darkens_edges() {
        let src = Plane::from_fn(9, 7, |_, _| 200u8);
        let blurred = gaussian5x5(&src, Border::constant(0));
        assert!(blurred.get(0, 0) < 200);
        assert_eq!(blurred.get(4, 3), 200);
    }

    #[test]
    fn nearest_picks_odd_pixels() {
        let src = Plane::from_fn(8, 4, |x, y| (x + 10 * y) as u8);
        let half = half_scale_nearest(&src, Border::replicate());
        assert_eq!(half.dim(), (4, 2));
        assert_eq!(half.get(0, 0), 11);
        assert_eq!(half.get(3, 1), 37);
    }
}
