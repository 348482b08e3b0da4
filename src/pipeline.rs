//! Per-upload pipeline and its content-keyed memoization.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::{ReportConfig, DEFAULT_CACHE_CAPACITY};
use crate::loader::{load_records_from_bytes, LoadError};
use crate::report::{build_outcome, ReportOutcome};

/// Load, classify and aggregate one uploaded file.
pub fn run_pipeline(bytes: &[u8], cfg: &ReportConfig) -> Result<ReportOutcome, LoadError> {
    let loaded = load_records_from_bytes(bytes)?;
    let outcome = build_outcome(loaded, cfg);

    if let ReportOutcome::NoValidData {
        rows_read,
        rows_dropped,
    } = &outcome
    {
        info!(
            component = "pipeline",
            event = "pipeline.empty",
            rows_read = *rows_read,
            rows_dropped = *rows_dropped
        );
    }

    Ok(outcome)
}

pub fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Outcomes keyed by the SHA-256 of the uploaded bytes. At most `capacity`
/// entries are kept; the oldest insertion is evicted first. Failed loads are
/// not stored.
#[derive(Clone)]
pub struct ReportCache {
    cfg: Arc<ReportConfig>,
    capacity: usize,
    entries: Arc<RwLock<CacheEntries>>,
}

#[derive(Default)]
struct CacheEntries {
    by_key: HashMap<String, Arc<ReportOutcome>>,
    insertion_order: VecDeque<String>,
}

impl CacheEntries {
    fn insert(
        &mut self,
        key: String,
        outcome: Arc<ReportOutcome>,
        capacity: usize,
    ) -> Arc<ReportOutcome> {
        if let Some(existing) = self.by_key.get(&key) {
            return Arc::clone(existing);
        }

        while self.by_key.len() >= capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.by_key.remove(&oldest);
            info!(
                component = "pipeline",
                event = "pipeline.cache.evicted",
                content_key = %oldest
            );
        }

        self.insertion_order.push_back(key.clone());
        self.by_key.insert(key, Arc::clone(&outcome));
        outcome
    }
}

impl ReportCache {
    pub fn new(cfg: ReportConfig) -> Self {
        Self::with_capacity(cfg, DEFAULT_CACHE_CAPACITY)
    }

    /// A zero capacity is treated as one.
    pub fn with_capacity(cfg: ReportConfig, capacity: usize) -> Self {
        Self {
            cfg: Arc::new(cfg),
            capacity: capacity.max(1),
            entries: Arc::new(RwLock::new(CacheEntries::default())),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.cfg
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_or_run(&self, bytes: &[u8]) -> Result<Arc<ReportOutcome>, LoadError> {
        let key = content_key(bytes);

        if let Some(hit) = self
            .entries
            .read()
            .expect("report cache lock should not be poisoned")
            .by_key
            .get(&key)
        {
            info!(
                component = "pipeline",
                event = "pipeline.cache.hit",
                content_key = %key
            );
            return Ok(Arc::clone(hit));
        }

        info!(
            component = "pipeline",
            event = "pipeline.cache.miss",
            content_key = %key,
            bytes = bytes.len()
        );
        let outcome = Arc::new(run_pipeline(bytes, &self.cfg)?);

        let shared = self
            .entries
            .write()
            .expect("report cache lock should not be poisoned")
            .insert(key, outcome, self.capacity);
        Ok(shared)
    }

    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.entries
            .read()
            .expect("report cache lock should not be poisoned")
            .by_key
            .contains_key(&content_key(bytes))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("report cache lock should not be poisoned")
            .by_key
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .expect("report cache lock should not be poisoned");
        entries.by_key.clear();
        entries.insertion_order.clear();
    }
}
