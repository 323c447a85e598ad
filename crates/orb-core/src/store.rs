//! The `Store` external collaborator (§6) and its tag-query grammar.
//!
//! Generalizes the teacher's `StorageBackend` trait
//! (`shared/crates/storage/src/lib.rs`, `get`/`put`/`delete`/`exists`/
//! `list_keys`) to the tag-indexed contract §6 describes:
//! `Open(namespace, tagGroups…) -> Store` and
//! `Store.{Put(key, value, tags…), Get(key), Delete(key), Batch(ops…),
//! Query(expr) -> Iterator}`, plus the `tag:value && tag<=int` grammar.
//! The teacher's `receipts/src/query.rs` `ReceiptFilter` is the grounding for
//! "filter, then paginate" even though here the filter is a parsed
//! expression over tags rather than fixed SQL columns.

use crate::error::{OrbError, Result};
use std::collections::HashMap;

/// A single tag attached to a stored record. Values are either strings or
/// integers; integer tags are the only ones the query grammar can compare
/// with `<=`/`>=`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tag {
    pub name: String,
    pub value: TagValue,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagValue {
    Str(String),
    Int(i64),
}

impl Tag {
    pub fn str(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: TagValue::Str(value.into()),
        }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: TagValue::Int(value),
        }
    }
}

/// A record as returned by `Get`/`Query`: the raw value plus its tags, so
/// callers that re-query don't need a second round trip.
#[derive(Debug, Clone)]
pub struct Record {
    pub key: String,
    pub value: Vec<u8>,
    pub tags: Vec<Tag>,
}

/// One write in a `Batch` call.
#[derive(Debug, Clone)]
pub enum BatchOp {
    Put {
        key: String,
        value: Vec<u8>,
        tags: Vec<Tag>,
    },
    Delete {
        key: String,
    },
}

/// A single clause of a parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    Eq(String, String),
    Le(String, i64),
    Ge(String, i64),
}

/// A parsed `tag:value && tag<=int && tag>=int` expression (§6).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryExpr {
    clauses: Vec<Clause>,
}

impl QueryExpr {
    /// Parse the grammar: clauses conjoined with `&&`, each either
    /// `tag:value`, `tag<=int`, or `tag>=int`.
    pub fn parse(expr: &str) -> Result<Self> {
        let mut clauses = Vec::new();
        for raw in expr.split("&&") {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if let Some((tag, rhs)) = raw.split_once("<=") {
                let value: i64 = rhs
                    .trim()
                    .parse()
                    .map_err(|_| OrbError::integrity(format!("bad integer in clause {raw:?}")))?;
                clauses.push(Clause::Le(tag.trim().to_string(), value));
            } else if let Some((tag, rhs)) = raw.split_once(">=") {
                let value: i64 = rhs
                    .trim()
                    .parse()
                    .map_err(|_| OrbError::integrity(format!("bad integer in clause {raw:?}")))?;
                clauses.push(Clause::Ge(tag.trim().to_string(), value));
            } else if let Some((tag, rhs)) = raw.split_once(':') {
                clauses.push(Clause::Eq(tag.trim().to_string(), rhs.trim().to_string()));
            } else {
                return Err(OrbError::integrity(format!("unparseable clause {raw:?}")));
            }
        }
        Ok(Self { clauses })
    }

    /// True if every clause is satisfied by `tags`.
    pub fn matches(&self, tags: &[Tag]) -> bool {
        let by_name: HashMap<&str, &TagValue> =
            tags.iter().map(|t| (t.name.as_str(), &t.value)).collect();
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq(name, want) => matches!(by_name.get(name.as_str()), Some(TagValue::Str(v)) if v == want)
                || matches!(by_name.get(name.as_str()), Some(TagValue::Int(v)) if v.to_string() == *want),
            Clause::Le(name, want) => {
                matches!(by_name.get(name.as_str()), Some(TagValue::Int(v)) if v <= want)
            }
            Clause::Ge(name, want) => {
                matches!(by_name.get(name.as_str()), Some(TagValue::Int(v)) if v >= want)
            }
        })
    }
}

/// The storage collaborator declared in §6. Implementations are opaque key-value
/// engines with a secondary tag index; Orb's components never assume a
/// particular backend.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn put(&self, key: &str, value: Vec<u8>, tags: Vec<Tag>) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<Record>>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn batch(&self, ops: Vec<BatchOp>) -> Result<()>;
    async fn query(&self, expr: &str) -> Result<Vec<Record>>;
}

/// In-memory `Store`, grounded on the teacher's `MemoryStorage`
/// (`shared/crates/storage/src/lib.rs`). Used by unit tests across the
/// workspace; production deployments supply a real backend out of scope of
/// this core.
#[derive(Default)]
pub struct MemoryStore {
    data: tokio::sync::RwLock<HashMap<String, (Vec<u8>, Vec<Tag>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn put(&self, key: &str, value: Vec<u8>, tags: Vec<Tag>) -> Result<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), (value, tags));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Record>> {
        Ok(self
            .data
            .read()
            .await
            .get(key)
            .map(|(value, tags)| Record {
                key: key.to_string(),
                value: value.clone(),
                tags: tags.clone(),
            }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.write().await.remove(key);
        Ok(())
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        let mut data = self.data.write().await;
        for op in ops {
            match op {
                BatchOp::Put { key, value, tags } => {
                    data.insert(key, (value, tags));
                }
                BatchOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn query(&self, expr: &str) -> Result<Vec<Record>> {
        let parsed = QueryExpr::parse(expr)?;
        let data = self.data.read().await;
        Ok(data
            .iter()
            .filter(|(_, (_, tags))| parsed.matches(tags))
            .map(|(key, (value, tags))| Record {
                key: key.clone(),
                value: value.clone(),
                tags: tags.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conjoined_clauses() {
        let expr = QueryExpr::parse("status:in-process && statusCheckTime<=100").unwrap();
        assert!(expr.matches(&[Tag::str("status", "in-process"), Tag::int("statusCheckTime", 50)]));
        assert!(!expr.matches(&[Tag::str("status", "in-process"), Tag::int("statusCheckTime", 150)]));
        assert!(!expr.matches(&[Tag::str("status", "completed"), Tag::int("statusCheckTime", 50)]));
    }

    #[tokio::test]
    async fn memory_store_round_trips_and_queries() {
        let store = MemoryStore::new();
        store
            .put(
                "a1",
                b"payload".to_vec(),
                vec![Tag::str("status", "in-process"), Tag::int("statusCheckTime", 10)],
            )
            .await
            .unwrap();
        store
            .put(
                "a2",
                b"payload2".to_vec(),
                vec![Tag::str("status", "completed"), Tag::int("statusCheckTime", 20)],
            )
            .await
            .unwrap();

        let got = store.get("a1").await.unwrap().unwrap();
        assert_eq!(got.value, b"payload");

        let due = store.query("status:in-process && statusCheckTime<=15").await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].key, "a1");

        store.delete("a1").await.unwrap();
        assert!(store.get("a1").await.unwrap().is_none());
    }
}
