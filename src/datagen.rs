//! Synthetic dataset generator: produces Gaussian-clustered embeddings for
//! exercising the index without a real corpus on hand.
//!
//! `dims` is a real, independent parameter here. A prior implementation this
//! one draws from took a separate `n` argument but immediately overwrote it
//! with `ceil(log_26(size))` before using it as the embedding dimension,
//! silently discarding the caller's value. `generate-dataset` takes `<size>`
//! and `<dims>` as two independent arguments, so this implementation honors
//! `dims` as given and uses `ceil(log_26(size))` only for identifier length,
//! which is what the naming scheme actually needs it for.
use crate::store::DatasetRecord;
use crate::utils::create_rng;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;

const LOWER_BOUND: f64 = -50.0;
const UPPER_BOUND: f64 = 50.0;
const NUM_CLUSTERS: usize = 3;

/// Generate `size` Gaussian-clustered records of dimension `dims`.
///
/// Cluster centers are drawn uniformly in `[-50, 50]` per axis; once every
/// `size / num_clusters` points a new center is drawn, and points are then
/// sampled `Normal(center_i, sigma)` per axis, `sigma = (|a| + |b|) / 10`.
pub fn generate(size: usize, dims: usize, seed: u64) -> Vec<DatasetRecord> {
    if size == 0 || dims == 0 {
        return vec![];
    }
    let sigma = (LOWER_BOUND.abs() + UPPER_BOUND.abs()) / 10.0;
    let points_per_cluster = (size / NUM_CLUSTERS).max(1);
    let mut rng = create_rng(seed);
    let uniform = Uniform::new(LOWER_BOUND, UPPER_BOUND);

    let mut dataset = Vec::with_capacity(size);
    let mut center = vec![0.0; dims];
    for (i, raw) in identifiers(size).enumerate().take(size) {
        if i % points_per_cluster == 0 {
            center = (0..dims).map(|_| uniform.sample(&mut rng)).collect();
        }
        let embedding: Vec<f64> = center
            .iter()
            .map(|&c| {
                let normal = Normal::new(c, sigma).expect("sigma is always positive");
                normal.sample(&mut rng)
            })
            .collect();
        dataset.push(DatasetRecord { raw, embedding });
    }
    dataset
}

/// Identifiers: fixed-width base-26 uppercase-letter combinations, width the
/// minimal length that can represent `size` distinct values, in
/// lexicographic order — `AAA`, `AAB`, ..., `AAZ`, `ABA`, ... for `n = 3`.
fn identifiers(size: usize) -> impl Iterator<Item = String> {
    let n = identifier_len(size);
    (0..size).map(move |idx| to_base26(idx, n))
}

fn identifier_len(size: usize) -> usize {
    if size <= 1 {
        return 1;
    }
    ((size as f64).ln() / 26f64.ln()).ceil().max(1.0) as usize
}

fn to_base26(mut idx: usize, width: usize) -> String {
    let mut digits = vec![0u8; width];
    for slot in digits.iter_mut().rev() {
        *slot = (idx % 26) as u8;
        idx /= 26;
    }
    digits.into_iter().map(|d| (b'A' + d) as char).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_generate_respects_size_and_dims() {
        let data = generate(10, 4, 1);
        assert_eq!(data.len(), 10);
        assert!(data.iter().all(|r| r.embedding.len() == 4));
    }

    #[test]
    fn test_generate_empty() {
        assert!(generate(0, 4, 1).is_empty());
        assert!(generate(10, 0, 1).is_empty());
    }

    #[test]
    fn test_identifiers_unique_and_fixed_width() {
        let ids: Vec<String> = identifiers(50).collect();
        let lens: std::collections::HashSet<usize> = ids.iter().map(|s| s.len()).collect();
        assert_eq!(lens.len(), 1);
        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn test_generate_reproducible_with_seed() {
        let a = generate(20, 3, 42);
        let b = generate(20, 3, 42);
        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.raw, rb.raw);
            assert_eq!(ra.embedding, rb.embedding);
        }
    }
}
