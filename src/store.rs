// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The canonical holding list.
//!
//! The whole list lives under one key in the `kv_store` table as a JSON array.
//! It is read once when the store is opened and rewritten in full after every
//! mutation, so the last write always wins.

use crate::db::{kv_get, kv_remove, kv_set};
use crate::error::StoreError;
use crate::models::{
    Category, Holding, HoldingId, HoldingPatch, ID_SPACE, NewHolding, UNASSIGNED_ID,
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashSet;

pub const STORAGE_KEY: &str = "mc360:items";

const MAX_ID_ATTEMPTS: usize = 64;

/// Draw a random id in `1..ID_SPACE`.
pub fn random_id() -> Result<HoldingId, StoreError> {
    let mut buf = [0u8; 8];
    getrandom::getrandom(&mut buf).map_err(|e| StoreError::Random(e.to_string()))?;
    Ok(u64::from_le_bytes(buf) % (ID_SPACE - 1) + 1)
}

fn unused_id(taken: &HashSet<HoldingId>) -> Result<HoldingId, StoreError> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = random_id()?;
        if !taken.contains(&id) {
            return Ok(id);
        }
    }
    Err(StoreError::IdSpaceExhausted)
}

/// Records read from a stored blob, plus the positions of elements that were not records.
#[derive(Debug, Default)]
pub struct Decoded {
    pub items: Vec<Holding>,
    pub skipped: Vec<usize>,
}

/// Decode a stored blob record by record. Only a blob that is not a JSON array fails.
pub fn decode(raw: &str) -> Result<Decoded, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(raw)?;
    let mut out = Decoded::default();
    for (index, v) in values.into_iter().enumerate() {
        match serde_json::from_value::<Holding>(v) {
            Ok(h) => out.items.push(h),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping stored element that is not a holding");
                out.skipped.push(index);
            }
        }
    }
    Ok(out)
}

pub struct HoldingStore<'c> {
    conn: &'c Connection,
    items: Vec<Holding>,
}

impl<'c> HoldingStore<'c> {
    /// Open the store. A missing blob is an empty portfolio; so is an undecodable one.
    ///
    /// Records whose id could not be read get a fresh one, written back at once
    /// so the id stays stable across runs.
    pub fn load(conn: &'c Connection) -> Result<Self, StoreError> {
        let items = match kv_get(conn, STORAGE_KEY)? {
            None => Vec::new(),
            Some(raw) => match decode(&raw) {
                Ok(decoded) => decoded.items,
                Err(e) => {
                    tracing::warn!(error = %e, "stored holdings could not be decoded; starting empty");
                    Vec::new()
                }
            },
        };
        tracing::debug!(count = items.len(), "holdings loaded");
        let mut store = Self { conn, items };
        if store.assign_missing_ids()? > 0 {
            store.persist()?;
        }
        Ok(store)
    }

    fn assign_missing_ids(&mut self) -> Result<usize, StoreError> {
        let mut taken = self.taken_ids();
        let mut fixed = 0;
        for h in self.items.iter_mut().filter(|h| h.id == UNASSIGNED_ID) {
            h.id = unused_id(&taken)?;
            taken.insert(h.id);
            fixed += 1;
            tracing::warn!(id = h.id, name = %h.name, "stored holding had no usable id; assigned one");
        }
        Ok(fixed)
    }

    pub fn list(&self) -> &[Holding] {
        &self.items
    }

    pub fn get(&self, id: HoldingId) -> Option<&Holding> {
        self.items.iter().find(|h| h.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn taken_ids(&self) -> HashSet<HoldingId> {
        self.items.iter().map(|h| h.id).collect()
    }

    /// Assign a fresh id and put the record at the front of the list.
    pub fn add(&mut self, new: NewHolding) -> Result<&Holding, StoreError> {
        let id = unused_id(&self.taken_ids())?;
        self.items.insert(0, new.with_id(id));
        self.persist()?;
        tracing::info!(id, "holding added");
        Ok(&self.items[0])
    }

    /// Merge `patch` into the record with `id`. Returns false (and writes nothing) when absent.
    pub fn update(&mut self, id: HoldingId, patch: &HoldingPatch) -> Result<bool, StoreError> {
        let Some(h) = self.items.iter_mut().find(|h| h.id == id) else {
            tracing::debug!(id, "update for unknown id ignored");
            return Ok(false);
        };
        patch.apply(h);
        self.persist()?;
        Ok(true)
    }

    /// Rename a record. Blank names are ignored.
    pub fn rename(&mut self, id: HoldingId, name: &str) -> Result<bool, StoreError> {
        if name.is_empty() {
            return Ok(false);
        }
        let patch = HoldingPatch {
            name: Some(name.to_string()),
            ..HoldingPatch::default()
        };
        self.update(id, &patch)
    }

    pub fn remove(&mut self, id: HoldingId) -> Result<bool, StoreError> {
        let before = self.items.len();
        self.items.retain(|h| h.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        tracing::info!(id, "holding removed");
        Ok(true)
    }

    /// Prepend an imported batch, keeping its order, and drain the buffer.
    ///
    /// Ids that clash with the portfolio (or with each other) are redrawn.
    pub fn merge_imported(&mut self, batch: &mut Vec<Holding>) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut taken = self.taken_ids();
        let mut incoming: Vec<Holding> = batch.drain(..).collect();
        for h in incoming.iter_mut() {
            if !taken.insert(h.id) {
                h.id = unused_id(&taken)?;
                taken.insert(h.id);
            }
        }
        let count = incoming.len();
        incoming.append(&mut self.items);
        self.items = incoming;
        self.persist()?;
        tracing::info!(count, "imported batch merged");
        Ok(count)
    }

    /// Prepend the LIC / SSY template holdings.
    pub fn add_samples(&mut self) -> Result<usize, StoreError> {
        let templates = [
            ("LIC Policy", Category::Lic, 60_000, 77_000),
            ("Sukanya Samriddhi", Category::Ssy, 50_000, 62_000),
        ];
        let mut taken = self.taken_ids();
        let mut batch = Vec::with_capacity(templates.len());
        for (name, category, invested, current) in templates {
            let id = unused_id(&taken)?;
            taken.insert(id);
            batch.push(Holding {
                id,
                name: name.to_string(),
                category,
                invested: Decimal::from(invested),
                current: Decimal::from(current),
            });
        }
        self.merge_imported(&mut batch)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.items.clear();
        kv_remove(self.conn, STORAGE_KEY)?;
        tracing::info!("portfolio cleared");
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.items)?;
        kv_set(self.conn, STORAGE_KEY, &raw)?;
        tracing::debug!(count = self.items.len(), bytes = raw.len(), "holdings persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn holding(id: HoldingId, name: &str) -> Holding {
        Holding {
            id,
            name: name.into(),
            category: Category::Stocks,
            invested: Decimal::from(10),
            current: Decimal::from(12),
        }
    }

    #[test]
    fn random_ids_stay_in_range() {
        for _ in 0..1000 {
            let id = random_id().unwrap();
            assert!(id >= 1 && id < ID_SPACE);
        }
    }

    #[test]
    fn merge_redraws_colliding_ids() {
        let conn = setup_conn();
        let mut store = HoldingStore::load(&conn).unwrap();
        store.merge_imported(&mut vec![holding(5, "old")]).unwrap();

        let mut batch = vec![holding(5, "new a"), holding(9, "new b"), holding(9, "new c")];
        store.merge_imported(&mut batch).unwrap();

        let ids: HashSet<HoldingId> = store.list().iter().map(|h| h.id).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(store.list()[3].id, 5);
        assert_eq!(store.list()[3].name, "old");
    }

    #[test]
    fn undecodable_blob_loads_as_empty() {
        let conn = setup_conn();
        kv_set(&conn, STORAGE_KEY, "{not json").unwrap();
        let store = HoldingStore::load(&conn).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn decode_skips_elements_that_are_not_records() {
        let d = decode(r#"[{"id":1,"name":"a"}, 7, "x", {"id":2}]"#).unwrap();
        assert_eq!(d.items.len(), 2);
        assert_eq!(d.skipped, [1, 2]);
        assert!(decode(r#"{"id":1}"#).is_err());
    }

    #[test]
    fn rename_ignores_blank_names() {
        let conn = setup_conn();
        let mut store = HoldingStore::load(&conn).unwrap();
        store.merge_imported(&mut vec![holding(1, "keep")]).unwrap();
        assert!(!store.rename(1, "").unwrap());
        assert_eq!(store.get(1).unwrap().name, "keep");
    }
}
