use chrono::NaiveDate;

use crate::config::SearchConfig;

/// Traversal priority of a directory, highest first.
///
/// Assigned once per directory from its name; stable for the duration of a
/// run. `Excluded` is a pruning decision — the directory is never
/// descended into — while every other tier only affects ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityTier {
    Excluded = 0,
    Low = 10,
    Normal = 50,
    Main = 70,
    Config = 80,
    Test = 90,
    Source = 100,
}

/// Classify a directory by name.
///
/// Pure function of the name and the configured date bounds — no I/O.
/// Rule order: exclusion set, out-of-range date-named directories
/// (pruned, not merely deprioritized), keyword rules, default. The first
/// matching rule wins.
pub fn classify(name: &str, config: &SearchConfig) -> PriorityTier {
    if config.exclude_dirs.contains(name) {
        return PriorityTier::Excluded;
    }

    // Date-named directories (archives, log rotations) outside the
    // requested date range are not worth descending into at all.
    if config.has_date_bounds() {
        if let Ok(date) = NaiveDate::parse_from_str(name, "%Y-%m-%d") {
            let after_ok = config
                .modified_after
                .map(|b| date >= b.date_naive())
                .unwrap_or(true);
            let before_ok = config
                .modified_before
                .map(|b| date <= b.date_naive())
                .unwrap_or(true);
            if !after_ok || !before_ok {
                return PriorityTier::Excluded;
            }
        }
    }

    match name.to_ascii_lowercase().as_str() {
        "src" => PriorityTier::Source,
        "test" | "tests" => PriorityTier::Test,
        "config" | "conf" => PriorityTier::Config,
        "main" | "bin" | "app" => PriorityTier::Main,
        "cache" | "tmp" | "temp" => PriorityTier::Low,
        _ => PriorityTier::Normal,
    }
}
