// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Geometric severity weights.
//!
//! Rule violations are weighted so that `c` occurrences in a section of `n`
//! players always outweigh any number of lighter violations below them:
//! `weight(c, n) = 1 + n + n² + … + n^(c-1)`. One violation costs 1, two cost
//! more than `n` single ones could, and so on. The sum saturates at the
//! numeric maximum rather than wrapping.

use crate::num::ops::saturating_arithmetic::{SaturatingAddVal, SaturatingMulVal};
use num_traits::{PrimInt, Signed};

/// Returns `Σ_{k=0}^{count-1} base^k`, clamped at `T::max_value()`.
///
/// A `count` of zero yields zero, so the weight is free of charge for
/// rule-abiding boards.
///
/// # Examples
///
/// ```rust
/// # use wallchart_core::num::geometric::severity_weight;
///
/// assert_eq!(severity_weight(0_i64, 10), 0);
/// assert_eq!(severity_weight(1_i64, 10), 1);
/// assert_eq!(severity_weight(3_i64, 10), 111);
/// assert_eq!(severity_weight(64_i64, i64::MAX), i64::MAX);
/// ```
pub fn severity_weight<T>(count: T, base: T) -> T
where
    T: PrimInt + Signed + SaturatingAddVal + SaturatingMulVal,
{
    debug_assert!(
        count >= T::zero(),
        "called `severity_weight` with a negative count"
    );

    let mut weight = T::zero();
    let mut term = T::one();
    let mut k = T::zero();
    while k < count {
        weight = weight.saturating_add_val(term);
        term = term.saturating_mul_val(base);
        k = k + T::one();
    }
    weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_count_is_free() {
        assert_eq!(severity_weight(0_i64, 40), 0);
    }

    #[test]
    fn test_single_violation_costs_one() {
        assert_eq!(severity_weight(1_i64, 40), 1);
    }

    #[test]
    fn test_two_violations_dominate_section() {
        // With 40 players, two violations must outweigh 40 single ones.
        assert_eq!(severity_weight(2_i64, 40), 41);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let w = severity_weight(100_i64, 1000);
        assert_eq!(w, i64::MAX, "deep repeats must clamp at the maximum");
    }
}
