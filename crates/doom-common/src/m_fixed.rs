// m_fixed.rs — 16.16 fixed-point arithmetic
//
// Every operation truncates the same way the simulation always has;
// demo playback depends on the exact low bits.

pub type Fixed = i32;

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: Fixed = 1 << FRACBITS;

#[inline]
pub fn d_abs(x: Fixed) -> Fixed {
    x.wrapping_abs()
}

/// Multiply two fixed values, shifting the 64-bit product back down.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    ((a as i64 * b as i64) >> FRACBITS) as Fixed
}

/// Divide with overflow saturation: when the quotient cannot be
/// represented, returns `i32::MAX` or `i32::MIN` by sign.
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if (d_abs(a) >> 14) >= d_abs(b) {
        ((a ^ b) >> 31) ^ i32::MAX
    } else {
        (((a as i64) << FRACBITS) / b as i64) as Fixed
    }
}

/// 1/v in 16.16, truncated. Zero maps to `i32::MAX`.
pub fn fixed_reciprocal(v: Fixed) -> Fixed {
    if v == 0 {
        return i32::MAX;
    }
    let mag = (v as i64).unsigned_abs();
    let r = (0xffff_ffffu64 / mag).min(i32::MAX as u64) as Fixed;
    if v < 0 {
        -r
    } else {
        r
    }
}

/// Division by multiplication with the truncated reciprocal. Cheaper than
/// `fixed_div` and slightly less exact; slope math is tuned around it.
#[inline]
pub fn fixed_approx_div(a: Fixed, b: Fixed) -> Fixed {
    fixed_mul(a, fixed_reciprocal(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_mul_truncates() {
        assert_eq!(fixed_mul(2 * FRACUNIT, 3 * FRACUNIT), 6 * FRACUNIT);
        assert_eq!(fixed_mul(FRACUNIT / 2, FRACUNIT / 2), FRACUNIT / 4);
        // arithmetic shift rounds toward negative infinity
        assert_eq!(fixed_mul(-1, 1), -1);
        assert_eq!(fixed_mul(1, 1), 0);
    }

    #[test]
    fn test_fixed_div() {
        assert_eq!(fixed_div(6 * FRACUNIT, 3 * FRACUNIT), 2 * FRACUNIT);
        assert_eq!(fixed_div(FRACUNIT, 4 * FRACUNIT), FRACUNIT / 4);
        assert_eq!(fixed_div(-FRACUNIT, 2 * FRACUNIT), -FRACUNIT / 2);
    }

    #[test]
    fn test_fixed_div_saturates() {
        assert_eq!(fixed_div(1000 * FRACUNIT, 1), i32::MAX);
        assert_eq!(fixed_div(-1000 * FRACUNIT, 1), i32::MIN);
        assert_eq!(fixed_div(1000 * FRACUNIT, 0), i32::MAX);
    }

    #[test]
    fn test_reciprocal() {
        assert_eq!(fixed_reciprocal(FRACUNIT), FRACUNIT - 1);
        assert_eq!(fixed_reciprocal(2 * FRACUNIT), FRACUNIT / 2 - 1);
        assert_eq!(fixed_reciprocal(-2 * FRACUNIT), -(FRACUNIT / 2 - 1));
        assert_eq!(fixed_reciprocal(0), i32::MAX);
        assert_eq!(fixed_reciprocal(1), i32::MAX);
    }

    #[test]
    fn test_approx_div_close_to_exact() {
        let a = 64 * FRACUNIT;
        let b = 200 * FRACUNIT;
        let exact = fixed_div(a, b);
        let approx = fixed_approx_div(a, b);
        assert!(approx <= exact);
        assert!(exact - approx < exact / 100, "exact {} approx {}", exact, approx);
    }
}
