//! Persistent store (C3): typed CRUD over Hyperplane, Bucket and Data with
//! relational integrity, backed by an embedded sqlite database. The schema
//! is relational rather than per-hash-table BLOB buckets — a real Data ->
//! Bucket foreign key and a unique constraint on `bucket.hash`, not a
//! union-of-buckets query.
use super::entity::{format_vector, parse_vector, Bucket, Data, Entity, Hyperplane};
use crate::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// One input record of the dataset consumed by `Store::populate`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatasetRecord {
    pub raw: String,
    pub embedding: Vec<f64>,
}

/// Entity kinds `Store::clean` can truncate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Hyperplane,
    Bucket,
    Data,
}

/// The bucket-key column is stored as its canonical decimal string (`TEXT`)
/// rather than a native `INTEGER`: sqlite's INTEGER storage class tops out
/// at 64 bits, which would silently lose precision for the widened `i128`
/// bucket key. See DESIGN.md.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS hyperplane (
    id INTEGER PRIMARY KEY,
    vector TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS bucket (
    id INTEGER PRIMARY KEY,
    hash TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS data (
    id INTEGER PRIMARY KEY,
    raw TEXT NOT NULL,
    embedding TEXT NOT NULL,
    bucket_id INTEGER NULL REFERENCES bucket (id)
);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the store at `path`. If `force_init`, the backing file
    /// is removed and the schema recreated from scratch.
    pub fn open<P: AsRef<Path>>(path: P, force_init: bool) -> Result<Self> {
        let path = path.as_ref();
        if force_init && path.exists() {
            std::fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// Open an in-memory store, useful for tests: an isolated `:memory:`
    /// connection.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// Truncate the given entity tables. Truncating `bucket` or
    /// `hyperplane` does not cascade; callers are expected to clear
    /// `Data.bucket_ref` themselves (this is what `build` does at the start
    /// of a rebuild).
    pub fn clean(&self, kinds: &[EntityKind]) -> Result<()> {
        for kind in kinds {
            let table = match kind {
                EntityKind::Hyperplane => "hyperplane",
                EntityKind::Bucket => "bucket",
                EntityKind::Data => "data",
            };
            self.conn
                .execute(&format!("DELETE FROM {}", table), params![])?;
        }
        Ok(())
    }

    /// Clear `bucket_ref` on every Data row, without deleting the rows.
    pub fn clear_all_data_bucket_refs(&self) -> Result<()> {
        self.conn
            .execute("UPDATE data SET bucket_id = NULL", params![])?;
        Ok(())
    }

    /// Batch-create Data rows from raw dataset records. Population precedes
    /// and is independent from building.
    pub fn populate(&self, records: &[DatasetRecord]) -> Result<Vec<Data>> {
        records
            .iter()
            .map(|r| {
                let data = Data::new(r.raw.clone(), r.embedding.clone());
                self.create(Entity::Data(data))?.into_data()
            })
            .collect()
    }

    /// Insert an entity. Buckets are get-or-create on `hash` (idempotent).
    /// Data requires any referenced Bucket to already have an id.
    pub fn create(&self, entity: Entity) -> Result<Entity> {
        match entity {
            Entity::Hyperplane(h) => self.create_hyperplane(h).map(Entity::Hyperplane),
            Entity::Bucket(b) => self.create_bucket(b).map(Entity::Bucket),
            Entity::Data(d) => self.create_data(d).map(Entity::Data),
        }
    }

    /// Update an entity by id. Only Data and Bucket are supported;
    /// Hyperplane is immutable once created.
    pub fn update(&self, entity: Entity) -> Result<Entity> {
        match entity {
            Entity::Hyperplane(_) => Err(Error::UpdateNotSupported),
            Entity::Bucket(b) => self.update_bucket(b).map(Entity::Bucket),
            Entity::Data(d) => self.update_data(d).map(Entity::Data),
        }
    }

    fn create_hyperplane(&self, mut h: Hyperplane) -> Result<Hyperplane> {
        self.conn.execute(
            "INSERT INTO hyperplane (vector) VALUES (?1)",
            params![format_vector(&h.vector)],
        )?;
        h.id = Some(self.conn.last_insert_rowid());
        Ok(h)
    }

    /// Get-or-create on `hash`: if a bucket with this hash already exists,
    /// return it unchanged; otherwise insert and return the new row.
    fn create_bucket(&self, b: Bucket) -> Result<Bucket> {
        if let Some(existing) = self.fetch_bucket(b.hash)? {
            return Ok(existing);
        }
        let hash_text = b.hash.to_string();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO bucket (hash) VALUES (?1)",
            params![hash_text],
        )?;
        if inserted == 0 {
            // Lost a race with a concurrent insert of the same hash. Callers
            // are expected to serialize readers/writers, but the unique
            // constraint is the actual guarantee.
            return self
                .fetch_bucket(b.hash)?
                .ok_or_else(|| Error::Store(rusqlite::Error::QueryReturnedNoRows));
        }
        Ok(Bucket {
            id: Some(self.conn.last_insert_rowid()),
            hash: b.hash,
        })
    }

    fn create_data(&self, mut d: Data) -> Result<Data> {
        if let Some(bucket) = &d.bucket {
            if bucket.id.is_none() {
                return Err(Error::UnattachedEntity);
            }
        }
        self.conn.execute(
            "INSERT INTO data (raw, embedding, bucket_id) VALUES (?1, ?2, ?3)",
            params![
                d.raw,
                format_vector(&d.embedding),
                d.bucket.and_then(|b| b.id)
            ],
        )?;
        d.id = Some(self.conn.last_insert_rowid());
        Ok(d)
    }

    fn update_bucket(&self, b: Bucket) -> Result<Bucket> {
        let id = b.id.ok_or(Error::UnattachedEntity)?;
        self.conn.execute(
            "UPDATE bucket SET hash = ?1 WHERE id = ?2",
            params![b.hash.to_string(), id],
        )?;
        Ok(b)
    }

    fn update_data(&self, d: Data) -> Result<Data> {
        let id = d.id.ok_or(Error::UnattachedEntity)?;
        if let Some(bucket) = &d.bucket {
            if bucket.id.is_none() {
                return Err(Error::UnattachedEntity);
            }
        }
        self.conn.execute(
            "UPDATE data SET raw = ?1, embedding = ?2, bucket_id = ?3 WHERE id = ?4",
            params![
                d.raw,
                format_vector(&d.embedding),
                d.bucket.and_then(|b| b.id),
                id
            ],
        )?;
        Ok(d)
    }

    pub fn fetch_bucket(&self, hash: i128) -> Result<Option<Bucket>> {
        self.conn
            .query_row(
                "SELECT id, hash FROM bucket WHERE hash = ?1",
                params![hash.to_string()],
                |row| {
                    let id: i64 = row.get(0)?;
                    let hash_text: String = row.get(1)?;
                    Ok((id, hash_text))
                },
            )
            .optional()?
            .map(|(id, hash_text)| {
                hash_text
                    .parse::<i128>()
                    .map(|hash| Bucket { id: Some(id), hash })
                    .map_err(|_| Error::VectorParse(hash_text))
            })
            .transpose()
    }

    /// Fetch the first Data whose `raw` matches, hydrated with its Bucket.
    pub fn fetch_data(&self, raw: &str) -> Result<Option<Data>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, raw, embedding, bucket_id FROM data WHERE raw = ?1 LIMIT 1",
                params![raw],
                |row| {
                    let id: i64 = row.get(0)?;
                    let raw: String = row.get(1)?;
                    let embedding: String = row.get(2)?;
                    let bucket_id: Option<i64> = row.get(3)?;
                    Ok((id, raw, embedding, bucket_id))
                },
            )
            .optional()?;
        row.map(|(id, raw, embedding, bucket_id)| self.hydrate_data(id, raw, embedding, bucket_id))
            .transpose()
    }

    /// All Data currently assigned to `bucket`, in Data id-ascending order.
    /// Requires `bucket.id` to be set.
    pub fn fetch_bucket_data(&self, bucket: &Bucket) -> Result<Vec<Data>> {
        let bucket_id = bucket.id.ok_or(Error::UnattachedEntity)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, raw, embedding, bucket_id FROM data WHERE bucket_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![bucket_id], |row| {
            let id: i64 = row.get(0)?;
            let raw: String = row.get(1)?;
            let embedding: String = row.get(2)?;
            let bucket_id: Option<i64> = row.get(3)?;
            Ok((id, raw, embedding, bucket_id))
        })?;
        rows.map(|r| {
            let (id, raw, embedding, bucket_id) = r?;
            self.hydrate_data(id, raw, embedding, bucket_id)
        })
        .collect()
    }

    /// All Data in id-ascending order, hydrated with their Bucket (if any).
    pub fn fetch_all_data(&self) -> Result<Vec<Data>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, raw, embedding, bucket_id FROM data ORDER BY id ASC")?;
        let rows = stmt.query_map(params![], |row| {
            let id: i64 = row.get(0)?;
            let raw: String = row.get(1)?;
            let embedding: String = row.get(2)?;
            let bucket_id: Option<i64> = row.get(3)?;
            Ok((id, raw, embedding, bucket_id))
        })?;
        rows.map(|r| {
            let (id, raw, embedding, bucket_id) = r?;
            self.hydrate_data(id, raw, embedding, bucket_id)
        })
        .collect()
    }

    /// All Hyperplanes in id-ascending order (== generation order).
    pub fn fetch_all_hyperplanes(&self) -> Result<Vec<Hyperplane>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, vector FROM hyperplane ORDER BY id ASC")?;
        let rows = stmt.query_map(params![], |row| {
            let id: i64 = row.get(0)?;
            let vector: String = row.get(1)?;
            Ok((id, vector))
        })?;
        rows.map(|r| {
            let (id, vector) = r?;
            Ok(Hyperplane {
                id: Some(id),
                vector: parse_vector(&vector)?,
            })
        })
        .collect()
    }

    fn hydrate_data(
        &self,
        id: i64,
        raw: String,
        embedding: String,
        bucket_id: Option<i64>,
    ) -> Result<Data> {
        let bucket = match bucket_id {
            Some(bid) => Some(self.fetch_bucket_by_id(bid)?),
            None => None,
        };
        Ok(Data {
            id: Some(id),
            raw,
            embedding: parse_vector(&embedding)?,
            bucket,
        })
    }

    fn fetch_bucket_by_id(&self, id: i64) -> Result<Bucket> {
        self.conn.query_row(
            "SELECT id, hash FROM bucket WHERE id = ?1",
            params![id],
            |row| {
                let id: i64 = row.get(0)?;
                let hash_text: String = row.get(1)?;
                Ok((id, hash_text))
            },
        )
        .map(|(id, hash_text)| {
            hash_text
                .parse::<i128>()
                .map(|hash| Bucket { id: Some(id), hash })
                .map_err(|_| Error::VectorParse(hash_text))
        })?
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bucket_get_or_create() {
        let store = Store::open_in_memory().unwrap();
        let b1 = store.create(Entity::Bucket(Bucket::new(2))).unwrap().into_bucket().unwrap();
        let b2 = store.create(Entity::Bucket(Bucket::new(4))).unwrap().into_bucket().unwrap();
        let b3 = store.create(Entity::Bucket(Bucket::new(2))).unwrap().into_bucket().unwrap();

        assert_ne!(b1.id, b2.id);
        assert_eq!(b1.id, b3.id);
    }

    #[test]
    fn test_data_requires_attached_bucket() {
        let store = Store::open_in_memory().unwrap();
        let mut d = Data::new("a".into(), vec![1.0, 2.0]);
        d.bucket = Some(Bucket::new(5)); // no id set
        assert!(matches!(
            store.create(Entity::Data(d)),
            Err(Error::UnattachedEntity)
        ));
    }

    #[test]
    fn test_fetch_bucket_data_requires_attached() {
        let store = Store::open_in_memory().unwrap();
        let b = Bucket::new(5);
        assert!(matches!(
            store.fetch_bucket_data(&b),
            Err(Error::UnattachedEntity)
        ));
    }

    #[test]
    fn test_hyperplane_update_not_supported() {
        let store = Store::open_in_memory().unwrap();
        let h = store
            .create(Entity::Hyperplane(Hyperplane::new(vec![1.0, 0.0])))
            .unwrap()
            .into_hyperplane()
            .unwrap();
        assert!(matches!(
            store.update(Entity::Hyperplane(h)),
            Err(Error::UpdateNotSupported)
        ));
    }

    #[test]
    fn test_populate_and_fetch_data() {
        let store = Store::open_in_memory().unwrap();
        let records = vec![
            DatasetRecord {
                raw: "A".into(),
                embedding: vec![0.1, 0.0],
            },
            DatasetRecord {
                raw: "B".into(),
                embedding: vec![0.2, 0.0],
            },
        ];
        let created = store.populate(&records).unwrap();
        assert_eq!(created.len(), 2);
        let fetched = store.fetch_data("A").unwrap().unwrap();
        assert_eq!(fetched.embedding, vec![0.1, 0.0]);
        assert!(fetched.bucket.is_none());
    }

    #[test]
    fn test_fetch_bucket_data_id_order() {
        let store = Store::open_in_memory().unwrap();
        let bucket = store.create(Entity::Bucket(Bucket::new(7))).unwrap().into_bucket().unwrap();
        for raw in ["A", "B", "C"] {
            let mut d = Data::new(raw.into(), vec![1.0]);
            d.bucket = Some(bucket);
            store.create(Entity::Data(d)).unwrap();
        }
        let data = store.fetch_bucket_data(&bucket).unwrap();
        let raws: Vec<_> = data.iter().map(|d| d.raw.clone()).collect();
        assert_eq!(raws, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_force_init_resets_store() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        {
            let store = Store::open(&path, true).unwrap();
            store.create(Entity::Bucket(Bucket::new(1))).unwrap();
        }
        let store = Store::open(&path, true).unwrap();
        assert!(store.fetch_bucket(1).unwrap().is_none());
    }

    #[test]
    fn test_wide_bucket_hash_round_trips() {
        // Exercises the i128-beyond-i64 path the TEXT column exists for.
        let store = Store::open_in_memory().unwrap();
        let big = (i64::MAX as i128) * 1000;
        let created = store
            .create(Entity::Bucket(Bucket::new(big)))
            .unwrap()
            .into_bucket()
            .unwrap();
        let fetched = store.fetch_bucket(big).unwrap().unwrap();
        assert_eq!(created.hash, big);
        assert_eq!(fetched.hash, big);
    }
}
