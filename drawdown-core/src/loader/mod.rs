//! Memoizing data loader
//!
//! Source tables are expensive to read and the same file is typically requested by many
//! stages and many scenarios. [`ReaderCache`] maps a call signature (see [`key`]) to the
//! loaded value so that each distinct signature is loaded at most once per cache.
//!
//! Callers always receive an independent copy; mutating a returned table never affects the
//! stored entry or any other caller.
//! Entries are never evicted. A caller needing fresh data must pass a distinguishing argument.
//!
//! The lock is held across the check-load-insert sequence, so concurrent callers asking for
//! the same signature observe exactly one load. A read closure must not re-enter the cache
//! it is being called from.

mod csv_reader;
pub mod key;

pub use csv_reader::CsvTableReader;
pub use key::{Arg, CacheKey, HashChain, HashStrategy, LoadCall, OpaqueArg};

use crate::errors::ModelResult;
use crate::series::AnnualRegionalSeries;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Cache from call signatures to loaded values
pub struct ReaderCache<T> {
    entries: Mutex<HashMap<CacheKey, T>>,
    chain: HashChain,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// The cache used for source tables
pub type TableCache = ReaderCache<AnnualRegionalSeries>;

impl<T> fmt::Debug for ReaderCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderCache")
            .field("entries", &self.entries.lock().len())
            .field("chain", &self.chain)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T: Clone> Default for ReaderCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ReaderCache<T> {
    pub fn new() -> Self {
        Self::with_chain(HashChain::default())
    }

    /// Use a custom list of hashing strategies
    pub fn with_chain(chain: HashChain) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            chain,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return a copy of the value for `call`, invoking `read` only on the first request
    ///
    /// Fails with [`ModelError::UnhashableArgument`](crate::errors::ModelError) before
    /// `read` is attempted if any argument cannot be hashed. A failed read stores nothing.
    pub fn load<F>(&self, call: &LoadCall, read: F) -> ModelResult<T>
    where
        F: FnOnce(&LoadCall) -> ModelResult<T>,
    {
        let key = self.chain.key(call)?;
        let mut entries = self.entries.lock();

        if let Some(value) = entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(source = ?call.source(), "reader cache hit");
            return Ok(value.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(source = ?call.source(), "reader cache miss");
        let value = read(call)?;
        entries.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every entry and reset the counters
    ///
    /// Intended for separating independent test runs.
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl TableCache {
    /// The process-wide table cache, created on first use
    pub fn global() -> Arc<TableCache> {
        static GLOBAL: OnceLock<Arc<TableCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(TableCache::new())).clone()
    }

    /// Load a year-indexed regional CSV table through the cache
    pub fn read_csv(&self, call: &LoadCall) -> ModelResult<AnnualRegionalSeries> {
        self.load(call, CsvTableReader::read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ModelError;
    use crate::region::Region;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    fn table(scale: f64) -> AnnualRegionalSeries {
        AnnualRegionalSeries::from_fn(2014..=2016, |y, r| scale * (y - 2000) as f64 + r.index() as f64)
    }

    #[test]
    fn second_call_is_a_hit() {
        let cache = TableCache::new();
        let loads = AtomicUsize::new(0);
        let call = LoadCall::new("a.csv").kwarg("sep", ",");

        let read = |_: &LoadCall| {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(table(1.0))
        };
        let first = cache.load(&call, read).unwrap();
        let second = cache.load(&call, read).unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn returned_copies_are_independent() {
        let cache = TableCache::new();
        let call = LoadCall::new("a.csv");

        let mut first = cache.load(&call, |_| Ok(table(1.0))).unwrap();
        first.set(2015, Region::World, -42.0).unwrap();

        let second = cache.load(&call, |_| Ok(table(2.0))).unwrap();
        assert_eq!(second, table(1.0));
        assert_ne!(second.get(2015, Region::World).unwrap(), -42.0);
    }

    #[test]
    fn structurally_equal_table_arguments_hit() {
        let cache = TableCache::new();
        let a = LoadCall::new("derived").arg(table(3.0));
        let b = LoadCall::new("derived").arg(table(3.0));

        cache.load(&a, |_| Ok(table(1.0))).unwrap();
        cache.load(&b, |_| panic!("should be cached")).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_reads_are_not_cached() {
        let cache = TableCache::new();
        let call = LoadCall::new("missing.csv");
        let err = cache.load(&call, |_| Err(ModelError::Parse("boom".into())));
        assert!(err.is_err());
        assert!(cache.is_empty());
        assert!(cache.load(&call, |_| Ok(table(1.0))).is_ok());
    }

    #[test]
    fn clear_resets_state() {
        let cache = TableCache::new();
        cache.load(&LoadCall::new("a.csv"), |_| Ok(table(1.0))).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 0);
    }

    #[test]
    fn concurrent_callers_load_once() {
        let cache = Arc::new(TableCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let loads = loads.clone();
                thread::spawn(move || {
                    cache
                        .load(&LoadCall::new("shared.csv"), |_| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            Ok(table(1.0))
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), table(1.0));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
