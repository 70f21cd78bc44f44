/// Which part of a candidate the query is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Test the base name only.
    Filename,
    /// Open the file and scan its lines.
    Content,
    /// Filename first; content only if the name did not match.
    Both,
}

/// Immutable query value for one run.
///
/// Literal matching is case-insensitive. An empty query in filename mode
/// matches every name (filter-only searches, e.g. size-only); an empty
/// query in content mode matches no content.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    pub mode: MatchMode,
    pub regex: bool,
}

impl Query {
    /// Lowercased literal terms, `OR`-composed.
    ///
    /// Splitting happens on the exact token `" OR "` only, so
    /// `"TODO OR FIXME"` matches either word while `"def search"` stays a
    /// single phrase. Regex queries are never split.
    pub(crate) fn terms(&self) -> Vec<String> {
        if self.regex || self.text.is_empty() {
            return Vec::new();
        }
        self.text
            .split(" OR ")
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Query {
        Query { text: text.into(), mode: MatchMode::Filename, regex: false }
    }

    #[test]
    fn single_phrase_is_one_term() {
        assert_eq!(literal("def search").terms(), vec!["def search"]);
    }

    #[test]
    fn or_token_splits_terms() {
        assert_eq!(literal("TODO OR FIXME").terms(), vec!["todo", "fixme"]);
    }

    #[test]
    fn lowercase_or_is_not_a_separator() {
        assert_eq!(literal("todo or fixme").terms(), vec!["todo or fixme"]);
    }

    #[test]
    fn empty_query_has_no_terms() {
        assert!(literal("").terms().is_empty());
    }

    #[test]
    fn regex_query_is_never_split() {
        let q = Query { text: "a OR b".into(), mode: MatchMode::Filename, regex: true };
        assert!(q.terms().is_empty());
    }
}
