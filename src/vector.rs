//! Vector math kernel (C1): dot product, L2 norm/distance, Gaussian sampling
//! and normalization. Every vector passed around the public API is a plain
//! `Vec<f64>` / `&[f64]`; `ndarray` is used internally for the arithmetic.
use crate::error::{Error, Result};
use crate::utils::create_rng;
use ndarray::prelude::*;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;

/// Standard inner product. Panics if `v.len() != w.len()`.
pub fn dot(v: &[f64], w: &[f64]) -> f64 {
    aview1(v).dot(&aview1(w))
}

/// Euclidean (L2) norm. Non-negative; zero iff `v` is the zero vector.
pub fn l2(v: &[f64]) -> f64 {
    let v = aview1(v);
    v.dot(&v).sqrt()
}

/// Euclidean distance between two vectors of equal dimension. Panics if
/// `a.len() != b.len()`.
pub fn l2_dist(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "l2_dist: mismatched vector dimensions");
    let diff: Vec<f64> = a.iter().zip(b).map(|(ai, bi)| ai - bi).collect();
    l2(&diff)
}

/// Draw `d` independent samples from the standard normal distribution N(0, 1).
pub fn sample_standard_normal(d: usize, seed: u64) -> Vec<f64> {
    let mut rng = create_rng(seed);
    Array::random_using(d, StandardNormal, &mut rng).to_vec()
}

/// Return `v / l2(v)`. Fails with `Error::DegenerateVector` if `v` is the
/// zero vector (l2(v) == 0).
pub fn normalize(v: &[f64]) -> Result<Vec<f64>> {
    let norm = l2(v);
    if norm == 0.0 {
        return Err(Error::DegenerateVector);
    }
    Ok(v.iter().map(|x| x / norm).collect())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1., 2., 3.], &[1., 2., 3.]), 14.);
    }

    #[test]
    fn test_l2() {
        assert_eq!(l2(&[3., 4.]), 5.);
        assert_eq!(l2(&[0., 0., 0.]), 0.);
    }

    #[test]
    fn test_l2_dist() {
        assert_eq!(l2_dist(&[0., 0.], &[3., 4.]), 5.);
    }

    #[test]
    #[should_panic]
    fn test_l2_dist_mismatched_dims_panics() {
        l2_dist(&[0., 0.], &[3., 4., 5.]);
    }

    #[test]
    fn test_normalize() {
        let v = normalize(&[3., 4.]).unwrap();
        assert!((l2(&v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_degenerate() {
        assert!(matches!(
            normalize(&[0., 0., 0.]),
            Err(Error::DegenerateVector)
        ));
    }

    #[test]
    fn test_sample_standard_normal_dim() {
        let v = sample_standard_normal(16, 1);
        assert_eq!(v.len(), 16);
    }
}
