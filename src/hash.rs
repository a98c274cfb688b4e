//! Hash function (C2): per-hyperplane signed bin index and the flattening of
//! a hashset into a single bucket key.
//!
//! The flatten formula is kept verbatim: it is not a collision-free encoding,
//! and "fixing" it would change bucket membership for every existing index.
use crate::vector::dot;

/// `h(v) = floor(dot(v, w) / r)` for a single hyperplane `w`.
pub fn signed_bin(v: &[f64], w: &[f64], r: f64) -> i64 {
    (dot(v, w) / r).floor() as i64
}

/// Ordered signed bin index per hyperplane, in hyperplane id order.
pub fn hashset(v: &[f64], hyperplanes: &[Vec<f64>], r: f64) -> Vec<i64> {
    hyperplanes.iter().map(|w| signed_bin(v, w, r)).collect()
}

/// Collapse an ordered hashset into a single bucket key.
///
/// `key = h_H + sum_{i=1}^{H-1} (h_i * 2)^(H - i)`
///
/// Widened to `i128` to push the overflow bound much further out than a
/// fixed `i64`/`i32` key would allow, without pulling in an
/// arbitrary-precision integer dependency. A configuration that still
/// overflows `i128` saturates rather than panics, and logs a warning — this
/// can only happen with implausibly large `num_hyperplanes` or bin indices.
pub fn flatten(h: &[i64]) -> i128 {
    let len = h.len();
    if len == 0 {
        return 0;
    }
    let last = h[len - 1] as i128;
    let mut key = last;
    for (i, &hi) in h[..len - 1].iter().enumerate() {
        let base = (hi as i128) * 2;
        let exp = (len - 1 - i) as u32;
        let term = match base.checked_pow(exp) {
            Some(t) => t,
            None => {
                let saturated = if base < 0 && exp % 2 == 1 {
                    i128::MIN
                } else {
                    i128::MAX
                };
                tracing::warn!(
                    base,
                    exp,
                    "bucket key term overflowed i128, saturating"
                );
                saturated
            }
        };
        key = key.saturating_add(term);
    }
    key
}

/// Compute the flattened bucket key for `v` directly.
pub fn bucket_key(v: &[f64], hyperplanes: &[Vec<f64>], r: f64) -> i128 {
    flatten(&hashset(v, hyperplanes, r))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signed_bin() {
        let w = vec![1.0, 0.0];
        assert_eq!(signed_bin(&[0.1, 0.0], &w, 1.0), 0);
        assert_eq!(signed_bin(&[9.9, 0.0], &w, 1.0), 9);
        assert_eq!(signed_bin(&[-0.1, 0.0], &w, 1.0), -1);
    }

    #[test]
    fn test_flatten_single_hyperplane() {
        // H=1: flatten is just the identity.
        assert_eq!(flatten(&[0]), 0);
        assert_eq!(flatten(&[9]), 9);
    }

    #[test]
    fn test_flatten_multi_hyperplane() {
        // H=3: key = h3 + (h1*2)^2 + (h2*2)^1
        let h = [2, -1, 3];
        let expected = 3_i128 + (2 * 2_i128).pow(2) + (-1 * 2_i128).pow(1);
        assert_eq!(flatten(&h), expected);
    }

    #[test]
    fn test_flatten_deterministic() {
        // Repeated calls return the same integer.
        let h = vec![3, -2, 5, 0];
        assert_eq!(flatten(&h), flatten(&h));
    }

    #[test]
    fn test_flatten_saturates_instead_of_panicking() {
        let h = vec![i64::MAX, i64::MAX, i64::MAX];
        let _ = flatten(&h);
    }
}
