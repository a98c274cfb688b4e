#![allow(dead_code)]
//! Approximate nearest-neighbor search over dense vectors using Bucketed
//! Random Projection (BRP), a locality-sensitive hashing scheme for
//! Euclidean distance: restrict the search for a query's nearest neighbors
//! to the vectors that fall in the same hyperplane-projection bucket.
extern crate ndarray;

mod builder;
pub mod datagen;
pub mod error;
mod hash;
mod model;
mod query;
pub mod store;
mod utils;
pub mod vector;

pub use builder::{build, BuildReport};
pub use error::{Error, Result};
pub use hash::{bucket_key, flatten, hashset, signed_bin};
pub use model::BrpModel;
pub use query::{knn, Neighbor};
pub use store::{DatasetRecord, Entity, EntityKind, Store};
