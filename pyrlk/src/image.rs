//! # Single channel image planes and border handling

use crate::utils::{saturate_i16, saturate_u8};
use anyhow::{anyhow, Result};

/// Pixel element that can be stored in a [`Plane`].
///
/// All arithmetic on pixels happens in `i32`, `from_i32_saturating` brings results back.
pub trait Pixel: Copy + Default + Into<i32> + Send + Sync + 'static {
    fn from_i32_saturating(value: i32) -> Self;
}

impl Pixel for u8 {
    fn from_i32_saturating(value: i32) -> Self {
        saturate_u8(value)
    }
}

impl Pixel for i16 {
    fn from_i32_saturating(value: i32) -> Self {
        saturate_i16(value)
    }
}

/// How reads outside of the image are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BorderMode {
    /// Border pixels are not defined. Reads return the constant value, and any output that
    /// would depend on the border is excluded from the valid region.
    Undefined,
    /// Reads outside return a constant value.
    Constant,
    /// Reads outside return the nearest edge pixel.
    Replicate,
}

impl std::str::FromStr for BorderMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "undefined" => Ok(Self::Undefined),
            "constant" => Ok(Self::Constant),
            "replicate" => Ok(Self::Replicate),
            _ => Err(anyhow!("Unknown border mode: {s}")),
        }
    }
}

/// Border policy applied uniformly by every border-aware lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Border {
    pub mode: BorderMode,
    pub constant_value: u8,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            mode: BorderMode::Undefined,
            constant_value: 0,
        }
    }
}

impl Border {
    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn replicate() -> Self {
        Self {
            mode: BorderMode::Replicate,
            constant_value: 0,
        }
    }

    pub fn constant(constant_value: u8) -> Self {
        Self {
            mode: BorderMode::Constant,
            constant_value,
        }
    }
}

/// Region of a plane whose values do not depend on undefined border pixels.
///
/// `start` is inclusive, `end` is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidRegion {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

/// Row-major single channel 2D buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Pixel> Plane<T> {
    /// Create a zero filled plane.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![T::default(); width * height],
            width,
            height,
        }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Arguments
    ///
    /// * `width` - number of columns.
    /// * `height` - number of rows.
    /// * `data` - pixels, must contain exactly `width * height` elements.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(anyhow!(
                "Buffer of {} elements does not fit a {width}x{height} plane",
                data.len()
            ));
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Build a plane by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();

        Self {
            data,
            width,
            height,
        }
    }

    /// Get width and height of the plane.
    pub fn dim(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the pixels in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get pixel at in-range coordinates.
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.width + x]
    }

    /// Set pixel at in-range coordinates.
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.data[y * self.width + x] = value;
    }

    /// Read a pixel, resolving out of range coordinates with the border policy.
    ///
    /// Replicate border clamps the coordinates to the image, while constant and undefined
    /// borders return the constant value.
    ///
    /// # Arguments
    ///
    /// * `x` - horizontal coordinate, may be negative.
    /// * `y` - vertical coordinate, may be negative.
    /// * `border` - border policy.
    /// * `constant` - value to return outside of the image for non-replicating borders.
    pub fn element_at(&self, x: i32, y: i32, border: BorderMode, constant: T) -> T {
        let (w, h) = (self.width as i32, self.height as i32);

        if x < 0 || y < 0 || x >= w || y >= h {
            match border {
                BorderMode::Replicate if w > 0 && h > 0 => {
                    self.get(x.clamp(0, w - 1) as usize, y.clamp(0, h - 1) as usize)
                }
                _ => constant,
            }
        } else {
            self.get(x as usize, y as usize)
        }
    }

    /// Compute the valid region of the plane after a filter of `border_size` pixels on every
    /// side has been applied with the given border mode.
    ///
    /// Only undefined borders shrink the region.
    pub fn valid_region(&self, border: BorderMode, border_size: usize) -> ValidRegion {
        let (w, h) = (self.width as i32, self.height as i32);

        if border == BorderMode::Undefined {
            let b = border_size as i32;
            let valid_w = std::cmp::max(0, w - 2 * b);
            let valid_h = std::cmp::max(0, h - 2 * b);
            ValidRegion {
                start: (b, b),
                end: (b + valid_w, b + valid_h),
            }
        } else {
            ValidRegion {
                start: (0, 0),
                end: (w, h),
            }
        }
    }
}
