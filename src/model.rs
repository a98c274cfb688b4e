//! Model facade (C6): holds the two knobs (`num_hyperplanes`, `bucket_size`)
//! and orchestrates build vs. load, via a consuming builder-pattern
//! construction (`BrpModel::new(...).seed(...)`).
use crate::builder::{self, BuildReport};
use crate::error::Error;
use crate::query::{self, Neighbor};
use crate::store::Store;
use crate::Result;

pub struct BrpModel {
    pub num_hyperplanes: usize,
    pub bucket_size: f64,
    hyperplanes: Vec<Vec<f64>>,
    dim: usize,
    seed: u64,
}

impl BrpModel {
    /// # Arguments
    /// * `num_hyperplanes` - number of hyperplanes used to build the model.
    /// * `bucket_size` - spacing between adjacent parallel hyperplanes (`r`).
    pub fn new(num_hyperplanes: usize, bucket_size: f64) -> Self {
        BrpModel {
            num_hyperplanes,
            bucket_size,
            hyperplanes: Vec::new(),
            dim: 0,
            seed: 0,
        }
    }

    /// Seed for the hyperplane RNG. 0 (the default) means OS-seeded.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// If `force_init`, (re)build the index from the store's populated Data.
    /// Otherwise, hydrate the in-memory hyperplane list from the store and
    /// set `num_hyperplanes` to however many were actually persisted.
    pub fn load(&mut self, store: &Store, force_init: bool) -> Result<Option<BuildReport>> {
        let report = if force_init {
            Some(builder::build(store, self.num_hyperplanes, self.bucket_size, self.seed)?)
        } else {
            None
        };

        let hyperplanes = store.fetch_all_hyperplanes()?;
        self.num_hyperplanes = hyperplanes.len();
        self.dim = hyperplanes.first().map(|h| h.vector.len()).unwrap_or(0);
        self.hyperplanes = hyperplanes.into_iter().map(|h| h.vector).collect();
        Ok(report)
    }

    /// k approximate nearest neighbors of `query`. See `query::knn`.
    pub fn knn(&self, store: &Store, query: &[f64], k: usize) -> Result<Vec<Neighbor>> {
        query::knn(store, &self.hyperplanes, self.dim, self.bucket_size, query, k)
    }

    /// k approximate nearest neighbors of the Data item stored under
    /// `raw`. Fails with `Error::NotFound` if no Data has that identifier.
    pub fn knn_for_identifier(&self, store: &Store, raw: &str, k: usize) -> Result<Vec<Neighbor>> {
        let data = store.fetch_data(raw)?.ok_or(Error::NotFound)?;
        self.knn(store, &data.embedding, k)
    }
}
