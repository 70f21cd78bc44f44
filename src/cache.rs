use std::collections::HashMap;
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use regex::{Regex, RegexBuilder};

use crate::entry::FileStat;

/// Concurrent memoizing map with compute-once semantics.
///
/// First access to a key runs the computation exactly once; concurrent
/// accesses to the same key wait on the in-flight result instead of
/// recomputing. The outer mutex only guards slot insertion — the
/// computation itself runs outside it, so unrelated keys never serialize
/// on each other's work.
pub(crate) struct OnceMap<K, V> {
    slots: Mutex<HashMap<K, std::sync::Arc<OnceLock<V>>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> OnceMap<K, V> {
    pub fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }

    pub fn get_or_init(&self, key: &K, init: impl FnOnce() -> V) -> V {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            std::sync::Arc::clone(slots.entry(key.clone()).or_default())
        };
        slot.get_or_init(init).clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

/// Per-run stat cache, keyed by absolute path.
///
/// `None` records a failed stat (permission denied, race-deleted) so the
/// failure is not retried either.
pub(crate) struct StatCache {
    inner: OnceMap<PathBuf, Option<FileStat>>,
}

impl StatCache {
    pub fn new() -> Self {
        Self { inner: OnceMap::new() }
    }

    pub fn stat(&self, path: &Path) -> Option<FileStat> {
        self.inner.get_or_init(&path.to_path_buf(), || {
            let meta = fs::metadata(path).ok()?;
            Some(FileStat {
                size: meta.len(),
                modified: meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                is_dir: meta.is_dir(),
            })
        })
    }
}

/// Per-run compiled-pattern cache, keyed by pattern text.
///
/// The same query pattern is tested against every candidate in the run, so
/// compilation must happen once. Patterns compile case-insensitively to
/// match the engine's literal-match semantics.
pub(crate) struct PatternCache {
    inner: OnceMap<String, Result<Regex, regex::Error>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self { inner: OnceMap::new() }
    }

    pub fn compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        self.inner.get_or_init(&pattern.to_string(), || {
            RegexBuilder::new(pattern).case_insensitive(true).build()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn computes_once_per_key() {
        let map: OnceMap<String, usize> = OnceMap::new();
        let calls = AtomicUsize::new(0);
        let key = "k".to_string();

        let a = map.get_or_init(&key, || {
            calls.fetch_add(1, Ordering::SeqCst);
            7
        });
        let b = map.get_or_init(&key, || {
            calls.fetch_add(1, Ordering::SeqCst);
            9
        });

        assert_eq!((a, b), (7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn concurrent_first_access_computes_once() {
        let map: Arc<OnceMap<u32, u32>> = Arc::new(OnceMap::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let map = Arc::clone(&map);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    map.get_or_init(&1, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        42
                    })
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pattern_cache_reuses_compilation() {
        let cache = PatternCache::new();
        let a = cache.compile("invoice.*").unwrap();
        let _b = cache.compile("invoice.*").unwrap();
        assert!(a.is_match("INVOICE_jan.txt"));
        assert!(cache.compile("[invalid").is_err());
    }
}
