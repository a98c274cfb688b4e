//! Persistent store (C3): durable typed storage for the three entities with
//! relational integrity (Data -> Bucket by id).
mod entity;
mod sqlite;

pub use entity::{format_vector, parse_vector, Bucket, Data, Entity, Hyperplane};
pub use sqlite::{DatasetRecord, EntityKind, Store};
