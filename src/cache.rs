// Single-slot, time-bounded cache for the session's raw table.
//
// The raw table is keyed on nothing: there is one slot, and it expires after
// the configured TTL. Failed loads are never cached.

use crate::error::Result;
use crate::types::Record;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Slot {
    loaded_at: Instant,
    table: Arc<Vec<Record>>,
}

pub struct RawTableCache {
    ttl: Duration,
    slot: Mutex<Option<Slot>>,
}

impl RawTableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached table if it is still fresh at `now`.
    pub fn get_at(&self, now: Instant) -> Option<Arc<Vec<Record>>> {
        let slot = self.slot.lock().ok()?;
        match slot.as_ref() {
            Some(s) if now.saturating_duration_since(s.loaded_at) < self.ttl => {
                log::debug!("raw table cache hit ({} rows)", s.table.len());
                Some(Arc::clone(&s.table))
            }
            Some(_) => {
                log::debug!("raw table cache expired");
                None
            }
            None => None,
        }
    }

    pub fn get(&self) -> Option<Arc<Vec<Record>>> {
        self.get_at(Instant::now())
    }

    pub fn put_at(&self, table: Vec<Record>, now: Instant) -> Arc<Vec<Record>> {
        let table = Arc::new(table);
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(Slot {
                loaded_at: now,
                table: Arc::clone(&table),
            });
        }
        table
    }

    pub fn put(&self, table: Vec<Record>) -> Arc<Vec<Record>> {
        self.put_at(table, Instant::now())
    }

    /// Cached table, or the result of `load` stored as the new slot.
    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<Vec<Record>>>
    where
        F: FnOnce() -> Result<Vec<Record>>,
    {
        if let Some(table) = self.get() {
            return Ok(table);
        }
        log::info!("raw table cache miss, loading");
        let table = load()?;
        Ok(self.put(table))
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl Default for RawTableCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
