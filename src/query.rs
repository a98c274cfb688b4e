//! Query engine (C5): map a query vector to a bucket, rank candidates by
//! Euclidean distance, return the top k.
use crate::error::{Error, Result};
use crate::hash::bucket_key;
use crate::store::Store;
use crate::vector::l2_dist;

/// One ranked neighbor: `(distance, raw identifier)`.
pub type Neighbor = (f64, String);

/// k approximate nearest neighbors of `query` under Euclidean distance,
/// restricted to the query's bucket.
///
/// Returns `[]` if the query's bucket has no Data, or if `k <= 0`. Fails
/// with `Error::DimensionMismatch` if `query.len() != dim`.
pub fn knn(
    store: &Store,
    hyperplanes: &[Vec<f64>],
    dim: usize,
    bucket_size: f64,
    query: &[f64],
    k: usize,
) -> Result<Vec<Neighbor>> {
    if query.len() != dim {
        return Err(Error::DimensionMismatch {
            expected: dim,
            got: query.len(),
        });
    }
    if k == 0 {
        return Ok(vec![]);
    }

    let key = bucket_key(query, hyperplanes, bucket_size);
    let bucket = match store.fetch_bucket(key)? {
        Some(b) => b,
        None => return Ok(vec![]),
    };

    let mut candidates: Vec<Neighbor> = store
        .fetch_bucket_data(&bucket)?
        .into_iter()
        .map(|d| (l2_dist(query, &d.embedding), d.raw))
        .collect();

    // fetch_bucket_data yields Data in id-ascending order already, and
    // sort_by is stable, so ties keep that insertion order.
    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("distance is never NaN"));
    candidates.truncate(k);
    Ok(candidates)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::build;
    use crate::store::DatasetRecord;

    fn sample_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        let records = vec![
            DatasetRecord { raw: "A".into(), embedding: vec![0.1, 0.0] },
            DatasetRecord { raw: "B".into(), embedding: vec![0.2, 0.0] },
            DatasetRecord { raw: "C".into(), embedding: vec![9.9, 0.0] },
        ];
        store.populate(&records).unwrap();
        store
    }

    #[test]
    fn test_trivial_knn() {
        let store = sample_store();
        build(&store, 1, 1.0, 1).unwrap();
        let hyperplanes: Vec<Vec<f64>> = store
            .fetch_all_hyperplanes()
            .unwrap()
            .into_iter()
            .map(|h| h.vector)
            .collect();

        let result = knn(&store, &hyperplanes, 2, 1.0, &[0.15, 0.0], 2).unwrap();
        assert_eq!(result.len(), 2);
        assert!((result[0].0 - 0.05).abs() < 1e-9);
        assert!((result[1].0 - 0.05).abs() < 1e-9);
        let raws: Vec<_> = result.iter().map(|(_, raw)| raw.clone()).collect();
        assert_eq!(raws, vec!["A", "B"]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let store = sample_store();
        build(&store, 1, 1.0, 1).unwrap();
        let hyperplanes: Vec<Vec<f64>> = store
            .fetch_all_hyperplanes()
            .unwrap()
            .into_iter()
            .map(|h| h.vector)
            .collect();
        let result = knn(&store, &hyperplanes, 2, 1.0, &[1.0, 2.0, 3.0], 1);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_empty_bucket_returns_empty() {
        let store = sample_store();
        build(&store, 1, 1.0, 1).unwrap();
        let hyperplanes: Vec<Vec<f64>> = store
            .fetch_all_hyperplanes()
            .unwrap()
            .into_iter()
            .map(|h| h.vector)
            .collect();
        // Bucket key 7 has no Data (only keys 0 and 9 are populated).
        let result = knn(&store, &hyperplanes, 2, 1.0, &[7.5, 0.0], 5).unwrap();
        assert_eq!(result, vec![]);
    }

    #[test]
    fn test_k_zero_returns_empty() {
        let store = sample_store();
        build(&store, 1, 1.0, 1).unwrap();
        let hyperplanes: Vec<Vec<f64>> = store
            .fetch_all_hyperplanes()
            .unwrap()
            .into_iter()
            .map(|h| h.vector)
            .collect();
        let result = knn(&store, &hyperplanes, 2, 1.0, &[0.1, 0.0], 0).unwrap();
        assert!(result.is_empty());
    }
}
