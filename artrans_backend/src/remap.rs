//! Two-phase identifier remapping.
//!
//! Every source record receives a provisional [`Ordinal`] before anything is
//! written, so a reply can name a parent that appears later in the batch.
//! As records commit, [`IdentifierMapping`] learns which storage id each
//! ordinal became. Records that never commit stay unmapped.

use crate::artran::Artran;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 1-based position of a record in the import batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ordinal(i64);

impl Ordinal {
    pub fn from_index(index: usize) -> Self {
        Self(index as i64 + 1)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source id to ordinal lookup, fixed for the lifetime of one import run.
#[derive(Debug, Clone, Default)]
pub struct OrdinalTable {
    by_source_id: HashMap<String, Ordinal>,
    len: usize,
}

impl OrdinalTable {
    /// Walks `records` once in input order. When an external id repeats, the
    /// last occurrence takes over the lookup; earlier duplicates keep their own
    /// ordinal but can no longer be referenced as parents.
    pub fn assign(records: &[Artran]) -> Self {
        let mut by_source_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let ordinal = Ordinal::from_index(index);
            if record.id.is_empty() {
                continue;
            }
            if let Some(replaced) = by_source_id.insert(record.id.clone(), ordinal) {
                tracing::warn!(
                    source_id = %record.id,
                    replaced = %replaced,
                    current = %ordinal,
                    "duplicate source id, replies resolve to the latest occurrence"
                );
            }
        }
        Self {
            by_source_id,
            len: records.len(),
        }
    }

    pub fn ordinal_for(&self, source_id: &str) -> Option<Ordinal> {
        self.by_source_id.get(source_id).copied()
    }

    /// The record's own ordinal, a pure function of its position.
    pub fn ordinal_at(&self, index: usize) -> Ordinal {
        debug_assert!(index < self.len, "ordinal index out of range");
        Ordinal::from_index(index)
    }

    /// Ordinal of the record's declared parent. `None` for top-level records and
    /// for parents that are not part of this batch.
    pub fn provisional_parent(&self, record: &Artran) -> Option<Ordinal> {
        if record.rid.is_empty() {
            return None;
        }
        let parent = self.ordinal_for(&record.rid);
        if parent.is_none() {
            tracing::debug!(
                source_id = %record.id,
                parent_id = %record.rid,
                "parent not present in import batch"
            );
        }
        parent
    }
}

/// Ordinal to storage-assigned comment id, populated only on successful commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMapping {
    finals: BTreeMap<Ordinal, i64>,
}

impl IdentifierMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_committed(&mut self, ordinal: Ordinal, final_id: i64) {
        if let Some(previous) = self.finals.insert(ordinal, final_id) {
            tracing::warn!(%ordinal, previous, final_id, "ordinal committed twice");
        }
    }

    pub fn final_id(&self, ordinal: Ordinal) -> Option<i64> {
        self.finals.get(&ordinal).copied()
    }
}
