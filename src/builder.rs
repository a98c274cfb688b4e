//! Index builder (C4): populate hyperplanes and assign every Data item to a
//! bucket.
use crate::hash::bucket_key;
use crate::store::{Bucket, Data, Entity, EntityKind, Hyperplane, Store};
use crate::utils::create_rng;
use crate::vector::{normalize, sample_standard_normal};
use crate::Result;
use rand::Rng;
use rayon::prelude::*;

/// Summary of a completed build, used for logging only.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildReport {
    pub num_hyperplanes: usize,
    pub num_data: usize,
    pub num_buckets: usize,
}

/// Truncate Hyperplane and Bucket, clear every Data's bucket_ref, regenerate
/// `num_hyperplanes` unit hyperplanes, and assign every Data item to a
/// (possibly newly created) bucket.
///
/// The per-Data hashing step is computed in parallel with `rayon`, but bucket
/// get-or-create and the Data -> Bucket assignment are applied back to the
/// store sequentially in Data id order, so the externally observable
/// ordering stays deterministic regardless of how hashing was scheduled.
pub fn build(store: &Store, num_hyperplanes: usize, bucket_size: f64, seed: u64) -> Result<BuildReport> {
    // Clear Data's bucket_ref before truncating Bucket: bucket_id is a FK
    // (foreign_keys = ON), so dropping buckets while Data rows still
    // reference them violates the constraint.
    store.clear_all_data_bucket_refs()?;
    store.clean(&[EntityKind::Hyperplane, EntityKind::Bucket])?;

    let data = store.fetch_all_data()?;
    if data.is_empty() {
        tracing::warn!("build called with no populated Data, nothing to do");
        return Ok(BuildReport::default());
    }
    let dim = data[0].embedding.len();

    let hyperplanes = generate_hyperplanes(store, num_hyperplanes, dim, seed)?;
    let planes: Vec<Vec<f64>> = hyperplanes.iter().map(|h| h.vector.clone()).collect();

    // Hashing is embarrassingly parallel and touches no store state.
    let keys: Vec<i128> = data
        .par_iter()
        .map(|d| bucket_key(&d.embedding, &planes, bucket_size))
        .collect();

    let mut seen_keys = std::collections::HashSet::new();
    let num_data = {
        let mut count = 0usize;
        for (mut d, key) in data.into_iter().zip(keys) {
            let bucket = store.create(Entity::Bucket(Bucket::new(key)))?.into_bucket()?;
            seen_keys.insert(key);
            d.bucket = Some(bucket);
            store.update(Entity::Data(d))?;
            count += 1;
        }
        count
    };

    let report = BuildReport {
        num_hyperplanes: hyperplanes.len(),
        num_data,
        num_buckets: seen_keys.len(),
    };
    tracing::info!(
        num_hyperplanes = report.num_hyperplanes,
        num_data = report.num_data,
        "index build complete"
    );
    Ok(report)
}

fn generate_hyperplanes(
    store: &Store,
    num_hyperplanes: usize,
    dim: usize,
    seed: u64,
) -> Result<Vec<Hyperplane>> {
    let mut rng = create_rng(seed);
    let mut hyperplanes = Vec::with_capacity(num_hyperplanes);
    for _ in 0..num_hyperplanes {
        let plane_seed = rng.gen();
        let raw = sample_standard_normal(dim, plane_seed);
        let unit = normalize(&raw)?;
        let hyperplane = store
            .create(Entity::Hyperplane(Hyperplane::new(unit)))?
            .into_hyperplane()?;
        hyperplanes.push(hyperplane);
    }
    Ok(hyperplanes)
}
