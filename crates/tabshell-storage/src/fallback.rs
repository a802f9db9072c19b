//! Primary store with a local fallback
//!
//! Models a remote-synced store: writes go to the primary first, and a
//! failing primary is replaced by the fallback for that call. Reads merge
//! both, so records accepted during an outage stay visible afterwards.

use std::collections::HashSet;

use crate::record::{Record, RecordStore};
use crate::Result;

pub struct FallbackStore<P, F> {
    primary: P,
    fallback: F,
}

impl<P: RecordStore, F: RecordStore> FallbackStore<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: RecordStore, F: RecordStore> RecordStore for FallbackStore<P, F> {
    fn append(&self, record: Record) -> Result<Record> {
        match self.primary.append(record.clone()) {
            Ok(stored) => Ok(stored),
            Err(e) => {
                tracing::warn!(error = %e, id = %record.id, "Primary store append failed, using fallback");
                self.fallback.append(record)
            }
        }
    }

    /// The record lives in exactly one of the stores. A primary failure
    /// is only tolerated when the fallback held it.
    fn remove_by_id(&self, id: &str) -> Result<()> {
        let in_fallback = self.fallback.list_all()?.iter().any(|r| r.id == id);
        self.fallback.remove_by_id(id)?;

        match self.primary.remove_by_id(id) {
            Ok(()) => Ok(()),
            Err(e) if in_fallback => {
                tracing::warn!(error = %e, id = %id, "Primary store remove failed, removed from fallback");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Primary records plus anything accepted by the fallback during an
    /// outage, newest first
    fn list_all(&self) -> Result<Vec<Record>> {
        let local = self.fallback.list_all()?;

        let mut records = match self.primary.list_all() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Primary store list failed, using fallback");
                return Ok(local);
            }
        };

        if !local.is_empty() {
            let seen: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
            records.extend(local.into_iter().filter(|r| !seen.contains(&r.id)));
            records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }

        Ok(records)
    }

    /// Clears both stores; fails if the primary could not be cleared
    fn clear_all(&self) -> Result<()> {
        self.fallback.clear_all()?;

        self.primary.clear_all().inspect_err(|e| {
            tracing::warn!(error = %e, "Primary store clear failed");
        })
    }
}
