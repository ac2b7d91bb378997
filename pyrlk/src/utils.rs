//! # Utility module

/// Divide by `2^n`, rounding halves towards positive infinity.
///
/// This is an arithmetic shift, thus negative values round the same way positive ones do
/// (`-1.5` becomes `-1`).
///
/// # Arguments
///
/// * `value` - fixed-point value to shift.
/// * `n` - number of fractional bits to drop. Must be at least 1.
pub fn round_right_shift(value: i32, n: i32) -> i32 {
    debug_assert!(n > 0);
    (value + (1 << (n - 1))) >> n
}

/// Clamp a wide integer into the `i16` range.
pub fn saturate_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Clamp a wide integer into the `u8` range.
pub fn saturate_u8(value: i32) -> u8 {
    value.clamp(u8::MIN as i32, u8::MAX as i32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_rounds_half_up() {
        assert_eq!(round_right_shift(3, 1), 2);
        assert_eq!(round_right_shift(2, 1), 1);
        assert_eq!(round_right_shift(-3, 1), -1);
        assert_eq!(round_right_shift(100 << 14, 14), 100);
        assert_eq!(round_right_shift((100 << 14) + (1 << 13), 14), 101);
        assert_eq!(round_right_shift((100 << 14) + (1 << 13) - 1, 14), 100);
    }

    #[test]
    fn saturation() {
        assert_eq!(saturate_u8(-5), 0);
        assert_eq!(saturate_u8(300), 255);
        assert_eq!(saturate_u8(17), 17);
        assert_eq!(saturate_i16(40000), i16::MAX);
        assert_eq!(saturate_i16(-40000), i16::MIN);
    }
}
