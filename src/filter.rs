use chrono::{DateTime, Local};

use crate::config::SearchConfig;
use crate::entry::CandidateEntry;

/// Run the filter chain over a candidate.
///
/// Predicates are applied in order — extension membership, size bounds,
/// modification-time bounds — and the chain short-circuits on the first
/// failure. Each predicate is disabled when its configuration is absent;
/// with nothing configured, every entry passes. All checks operate on the
/// cached stat snapshot and never touch the filesystem.
pub(crate) fn passes(entry: &CandidateEntry, config: &SearchConfig) -> bool {
    if !config.file_types.is_empty() {
        match entry.extension() {
            Some(ext) if config.file_types.contains(&ext) => {}
            _ => return false,
        }
    }

    if let Some(min) = config.min_size {
        if entry.stat.size < min {
            return false;
        }
    }
    if let Some(max) = config.max_size {
        if entry.stat.size > max {
            return false;
        }
    }

    if config.has_date_bounds() {
        let modified: DateTime<Local> = entry.stat.modified.into();
        if let Some(after) = config.modified_after {
            if modified < after {
                return false;
            }
        }
        if let Some(before) = config.modified_before {
            if modified > before {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileStat;
    use std::collections::HashSet;
    use std::time::{Duration, SystemTime};

    fn config() -> SearchConfig {
        SearchConfig {
            root: "/tmp".into(),
            max_depth: None,
            file_types: HashSet::new(),
            min_size: None,
            max_size: None,
            modified_after: None,
            modified_before: None,
            exclude_dirs: HashSet::new(),
            threads: 1,
            max_results: None,
            sort_by: None,
            preview: false,
            incremental_timeout: Duration::from_millis(500),
            priority_mode: true,
        }
    }

    fn entry(name: &str, size: u64, modified: SystemTime) -> CandidateEntry {
        CandidateEntry {
            path: format!("/tmp/{name}").into(),
            name: name.to_string(),
            depth: 1,
            stat: FileStat { size, modified, is_dir: false },
        }
    }

    #[test]
    fn no_predicates_accepts_everything() {
        let cfg = config();
        assert!(passes(&entry("a.bin", 0, SystemTime::UNIX_EPOCH), &cfg));
    }

    #[test]
    fn extension_filter() {
        let mut cfg = config();
        cfg.file_types.insert("py".into());
        assert!(passes(&entry("x.py", 1, SystemTime::now()), &cfg));
        assert!(passes(&entry("x.PY", 1, SystemTime::now()), &cfg));
        assert!(!passes(&entry("x.rs", 1, SystemTime::now()), &cfg));
        assert!(!passes(&entry("noext", 1, SystemTime::now()), &cfg));
    }

    #[test]
    fn size_bounds() {
        let mut cfg = config();
        cfg.min_size = Some(10);
        cfg.max_size = Some(100);
        let now = SystemTime::now();
        assert!(!passes(&entry("small", 9, now), &cfg));
        assert!(passes(&entry("low", 10, now), &cfg));
        assert!(passes(&entry("high", 100, now), &cfg));
        assert!(!passes(&entry("big", 101, now), &cfg));
    }

    #[test]
    fn date_bounds() {
        let mut cfg = config();
        cfg.modified_after = Some(chrono::Local::now() - chrono::Duration::days(7));
        let fresh = SystemTime::now();
        let stale = SystemTime::now() - Duration::from_secs(30 * 24 * 3600);
        assert!(passes(&entry("fresh", 1, fresh), &cfg));
        assert!(!passes(&entry("stale", 1, stale), &cfg));
    }

    #[test]
    fn chain_rejects_iff_any_predicate_rejects() {
        let mut cfg = config();
        cfg.file_types.insert("py".into());
        cfg.min_size = Some(10);
        let now = SystemTime::now();
        // Passes extension, fails size.
        assert!(!passes(&entry("x.py", 5, now), &cfg));
        // Fails extension, passes size.
        assert!(!passes(&entry("x.rs", 50, now), &cfg));
        // Passes both.
        assert!(passes(&entry("x.py", 50, now), &cfg));
    }
}
