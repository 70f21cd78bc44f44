use std::fs;

use tracing::trace;

use crate::cache::PatternCache;
use crate::config::{MAX_CONTENT_BYTES, PREVIEW_CONTEXT_LINES};
use crate::entry::CandidateEntry;
use crate::query::{MatchMode, Query};

/// Bytes inspected for the binary guard before a content scan commits to
/// reading lines.
const BINARY_SNIFF_BYTES: usize = 8192;

/// What the matcher decided about one candidate.
pub(crate) enum MatchOutcome {
    Matched {
        /// The mode that succeeded, not the mode that was requested.
        mode: MatchMode,
        preview: Option<String>,
    },
    NoMatch,
    /// The file could not be read; counts as an access skip, not a failure.
    Skipped,
}

/// Test a candidate against the query.
///
/// `Both` mode short-circuits on a filename match; the content scan only
/// runs when the name missed. The regex pattern was validated at config
/// time, so a cache miss compiling here cannot fail.
pub(crate) fn match_entry(
    entry: &CandidateEntry,
    query: &Query,
    patterns: &PatternCache,
    preview: bool,
) -> MatchOutcome {
    match query.mode {
        MatchMode::Filename => {
            if name_matches(entry, query, patterns) {
                MatchOutcome::Matched { mode: MatchMode::Filename, preview: None }
            } else {
                MatchOutcome::NoMatch
            }
        }
        MatchMode::Content => scan_content(entry, query, patterns, preview),
        MatchMode::Both => {
            if name_matches(entry, query, patterns) {
                MatchOutcome::Matched { mode: MatchMode::Filename, preview: None }
            } else {
                scan_content(entry, query, patterns, preview)
            }
        }
    }
}

/// Filename test: cached regex against the base name, or case-insensitive
/// containment of any `OR`-term. An empty literal query matches every
/// name — filename mode degenerates to filters-only.
fn name_matches(entry: &CandidateEntry, query: &Query, patterns: &PatternCache) -> bool {
    if query.regex {
        return patterns
            .compile(&query.text)
            .map(|re| re.is_match(&entry.name))
            .unwrap_or(false);
    }
    let terms = query.terms();
    if terms.is_empty() {
        return true;
    }
    let name = entry.name.to_lowercase();
    terms.iter().any(|t| name.contains(t))
}

/// Line-by-line content scan. First matching line wins; binary files and
/// oversized files are non-matches, unreadable files are skips.
fn scan_content(
    entry: &CandidateEntry,
    query: &Query,
    patterns: &PatternCache,
    preview: bool,
) -> MatchOutcome {
    // Empty query text never matches content.
    if query.is_empty() {
        return MatchOutcome::NoMatch;
    }
    if entry.stat.size > MAX_CONTENT_BYTES {
        trace!(path = %entry.path.display(), size = entry.stat.size, "content scan skipped: too large");
        return MatchOutcome::NoMatch;
    }

    let data = match fs::read(&entry.path) {
        Ok(data) => data,
        Err(err) => {
            trace!(path = %entry.path.display(), %err, "content scan skipped: unreadable");
            return MatchOutcome::Skipped;
        }
    };

    if data[..data.len().min(BINARY_SNIFF_BYTES)].contains(&0) {
        trace!(path = %entry.path.display(), "content scan skipped: binary");
        return MatchOutcome::NoMatch;
    }

    let text = String::from_utf8_lossy(&data);
    let lines: Vec<&str> = text.lines().collect();

    let regex = if query.regex {
        match patterns.compile(&query.text) {
            Ok(re) => Some(re),
            Err(_) => return MatchOutcome::NoMatch,
        }
    } else {
        None
    };
    let terms = query.terms();

    for (i, line) in lines.iter().enumerate() {
        let hit = match &regex {
            Some(re) => re.is_match(line),
            None => {
                let lower = line.to_lowercase();
                terms.iter().any(|t| lower.contains(t))
            }
        };
        if hit {
            let snippet = preview.then(|| render_preview(&lines, i));
            return MatchOutcome::Matched { mode: MatchMode::Content, preview: snippet };
        }
    }

    MatchOutcome::NoMatch
}

/// Matched line plus up to [`PREVIEW_CONTEXT_LINES`] lines on each side.
fn render_preview(lines: &[&str], hit: usize) -> String {
    let start = hit.saturating_sub(PREVIEW_CONTEXT_LINES);
    let end = (hit + PREVIEW_CONTEXT_LINES + 1).min(lines.len());
    lines[start..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileStat;
    use std::io::Write;
    use std::time::SystemTime;

    fn entry_for(path: &std::path::Path) -> CandidateEntry {
        let meta = std::fs::metadata(path).unwrap();
        CandidateEntry {
            path: path.to_path_buf(),
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            depth: 1,
            stat: FileStat {
                size: meta.len(),
                modified: meta.modified().unwrap(),
                is_dir: false,
            },
        }
    }

    fn query(text: &str, mode: MatchMode, regex: bool) -> Query {
        Query { text: text.into(), mode, regex }
    }

    #[test]
    fn filename_literal_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("INVOICE_jan.txt");
        std::fs::write(&path, "x").unwrap();
        let entry = entry_for(&path);
        let patterns = PatternCache::new();

        let q = query("invoice", MatchMode::Filename, false);
        assert!(matches!(
            match_entry(&entry, &q, &patterns, false),
            MatchOutcome::Matched { mode: MatchMode::Filename, .. }
        ));
    }

    #[test]
    fn content_or_terms() {
        let dir = tempfile::tempdir().unwrap();
        let q = query("TODO OR FIXME", MatchMode::Content, false);
        let patterns = PatternCache::new();

        for (name, body, expect) in [
            ("a.txt", "has a FIXME here", true),
            ("b.txt", "just a TODO", true),
            ("c.txt", "nothing to see", false),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            let matched = matches!(
                match_entry(&entry_for(&path), &q, &patterns, false),
                MatchOutcome::Matched { .. }
            );
            assert_eq!(matched, expect, "{name}");
        }
    }

    #[test]
    fn binary_file_is_a_non_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"TODO\x00\x01\x02 binary").unwrap();
        drop(f);

        let q = query("TODO", MatchMode::Content, false);
        let patterns = PatternCache::new();
        assert!(matches!(
            match_entry(&entry_for(&path), &q, &patterns, false),
            MatchOutcome::NoMatch
        ));
    }

    #[test]
    fn preview_includes_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.py");
        std::fs::write(&path, "one\ntwo\ndef search():\nfour\nfive\nsix").unwrap();

        let q = query("def search", MatchMode::Content, false);
        let patterns = PatternCache::new();
        match match_entry(&entry_for(&path), &q, &patterns, true) {
            MatchOutcome::Matched { preview: Some(p), .. } => {
                assert_eq!(p, "one\ntwo\ndef search():\nfour\nfive");
            }
            _ => panic!("expected a content match with preview"),
        }
    }

    #[test]
    fn both_mode_prefers_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "report body mentions report").unwrap();

        let q = query("report", MatchMode::Both, false);
        let patterns = PatternCache::new();
        assert!(matches!(
            match_entry(&entry_for(&path), &q, &patterns, false),
            MatchOutcome::Matched { mode: MatchMode::Filename, .. }
        ));
    }

    #[test]
    fn empty_query_content_mode_matches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "anything").unwrap();

        let q = query("", MatchMode::Content, false);
        let patterns = PatternCache::new();
        assert!(matches!(
            match_entry(&entry_for(&path), &q, &patterns, false),
            MatchOutcome::NoMatch
        ));
    }

    #[test]
    fn regex_matches_like_literal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice_mar.txt");
        std::fs::write(&path, "x").unwrap();
        let entry = entry_for(&path);
        let patterns = PatternCache::new();

        let literal = query("invoice", MatchMode::Filename, false);
        let regex = query("invoice", MatchMode::Filename, true);
        let lit_hit = matches!(match_entry(&entry, &literal, &patterns, false), MatchOutcome::Matched { .. });
        let re_hit = matches!(match_entry(&entry, &regex, &patterns, false), MatchOutcome::Matched { .. });
        assert_eq!(lit_hit, re_hit);
        assert!(lit_hit);
    }
}
