//! The three persistent entities and the closed tagged union used to
//! dispatch `create`/`update` over them. A prior implementation this one
//! draws from routed these by runtime type; here it is a plain enum matched
//! exhaustively at compile time.
use crate::error::{Error, Result};

/// Unit-norm D-dimensional normal. Created only by the builder, never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperplane {
    pub id: Option<i64>,
    pub vector: Vec<f64>,
}

impl Hyperplane {
    pub fn new(vector: Vec<f64>) -> Self {
        Hyperplane { id: None, vector }
    }
}

/// `hash` is the flattened bucket key; unique across buckets within one
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub id: Option<i64>,
    pub hash: i128,
}

impl Bucket {
    pub fn new(hash: i128) -> Self {
        Bucket { id: None, hash }
    }
}

/// `raw` is an opaque identifier, not required unique. `bucket` is `None`
/// until the builder assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub id: Option<i64>,
    pub raw: String,
    pub embedding: Vec<f64>,
    pub bucket: Option<Bucket>,
}

impl Data {
    pub fn new(raw: String, embedding: Vec<f64>) -> Self {
        Data {
            id: None,
            raw,
            embedding,
            bucket: None,
        }
    }
}

/// Closed union of the three persistent entity kinds.
#[derive(Debug, Clone)]
pub enum Entity {
    Hyperplane(Hyperplane),
    Bucket(Bucket),
    Data(Data),
}

impl Entity {
    pub fn into_hyperplane(self) -> Result<Hyperplane> {
        match self {
            Entity::Hyperplane(h) => Ok(h),
            _ => Err(Error::UpdateNotSupported),
        }
    }

    pub fn into_bucket(self) -> Result<Bucket> {
        match self {
            Entity::Bucket(b) => Ok(b),
            _ => Err(Error::UpdateNotSupported),
        }
    }

    pub fn into_data(self) -> Result<Data> {
        match self {
            Entity::Data(d) => Ok(d),
            _ => Err(Error::UpdateNotSupported),
        }
    }
}

impl From<Hyperplane> for Entity {
    fn from(h: Hyperplane) -> Self {
        Entity::Hyperplane(h)
    }
}

impl From<Bucket> for Entity {
    fn from(b: Bucket) -> Self {
        Entity::Bucket(b)
    }
}

impl From<Data> for Entity {
    fn from(d: Data) -> Self {
        Entity::Data(d)
    }
}

/// Serialize a vector to the bracketed textual form (`[1.12, 2.45]`) used by
/// the `hyperplane.vector` and `data.embedding` columns.
pub fn format_vector(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Parse the bracketed textual form back into a vector. Accepts any
/// whitespace around brackets, commas and numbers.
pub fn parse_vector(s: &str) -> Result<Vec<f64>> {
    let trimmed = s.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| Error::VectorParse(s.to_string()))?;
    let inner = inner.trim();
    if inner.is_empty() {
        return Ok(vec![]);
    }
    inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| Error::VectorParse(s.to_string()))
        })
        .collect()
}
