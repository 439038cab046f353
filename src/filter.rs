//! Line filter predicate
//!
//! A `FilterSpec` is compiled exactly once, before any worker starts, and is
//! then borrowed read-only by every worker thread of the pipeline scope.

use regex::{Regex, RegexBuilder};

use crate::error::{PipelineError, PredicateError, Result};

/// Decides whether a line is kept.
///
/// Implementations must be deterministic and free of side effects: the same
/// line may be evaluated on any worker thread, and the pipeline assumes the
/// answer does not depend on which one.
pub trait LinePredicate: Send + Sync {
    fn keep(&self, line: &str) -> std::result::Result<bool, PredicateError>;
}

/// Pattern and invert flag, as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub pattern: Option<String>,
    pub invert_match: bool,
    pub ignore_case: bool,
}

impl FilterSpec {
    pub fn new(pattern: Option<String>, invert_match: bool) -> Self {
        Self {
            pattern,
            invert_match,
            ignore_case: false,
        }
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Compile the pattern into an executable matcher.
    ///
    /// An absent or empty pattern keeps every line.
    pub fn compile(&self) -> Result<CompiledFilter> {
        let regex = match self.pattern.as_deref() {
            None | Some("") => None,
            Some(pattern) => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(self.ignore_case)
                    .build()
                    .map_err(|source| PipelineError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    })?,
            ),
        };

        tracing::debug!(
            pattern = ?self.pattern,
            invert = self.invert_match,
            ignore_case = self.ignore_case,
            "compiled line filter"
        );

        Ok(CompiledFilter {
            regex,
            invert_match: self.invert_match,
        })
    }
}

/// Immutable matcher produced by `FilterSpec::compile`.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    regex: Option<Regex>,
    invert_match: bool,
}

impl CompiledFilter {
    pub fn matches(&self, line: &str) -> bool {
        match &self.regex {
            // With no pattern there is nothing to invert.
            None => true,
            Some(regex) => regex.is_match(line) != self.invert_match,
        }
    }
}

impl LinePredicate for CompiledFilter {
    fn keep(&self, line: &str) -> std::result::Result<bool, PredicateError> {
        Ok(self.matches(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: Option<&str>, invert: bool) -> CompiledFilter {
        FilterSpec::new(pattern.map(str::to_string), invert)
            .compile()
            .unwrap()
    }

    #[test]
    fn test_absent_pattern_keeps_everything() {
        let filter = compile(None, false);
        assert!(filter.matches("anything"));
        assert!(filter.matches(""));
    }

    #[test]
    fn test_absent_pattern_ignores_invert() {
        let filter = compile(None, true);
        assert!(filter.matches("anything"));
    }

    #[test]
    fn test_empty_pattern_keeps_everything() {
        let filter = compile(Some(""), false);
        assert!(filter.matches("apple"));
    }

    #[test]
    fn test_substring_search() {
        let filter = compile(Some("an"), false);
        assert!(filter.matches("banana"));
        assert!(!filter.matches("apple"));
        assert!(!filter.matches("cherry"));
    }

    #[test]
    fn test_invert_match() {
        let filter = compile(Some("an"), true);
        assert!(!filter.matches("banana"));
        assert!(filter.matches("apple"));
        assert!(filter.matches("date"));
    }

    #[test]
    fn test_regex_syntax() {
        let filter = compile(Some(r"^ERROR\s+\d{3}$"), false);
        assert!(filter.matches("ERROR 500"));
        assert!(!filter.matches("WARN 500"));
        assert!(!filter.matches("ERROR 5000"));
    }

    #[test]
    fn test_ignore_case() {
        let filter = FilterSpec::new(Some("error".to_string()), false)
            .with_ignore_case(true)
            .compile()
            .unwrap();
        assert!(filter.matches("ERROR: disk full"));
        assert!(filter.matches("an error occurred"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = FilterSpec::new(Some("(unclosed".to_string()), false)
            .compile()
            .unwrap_err();
        assert!(err.is_usage());
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_predicate_trait_matches_inherent() {
        let filter = compile(Some("a"), false);
        assert!(filter.keep("cat").unwrap());
        assert!(!filter.keep("dog").unwrap());
    }
}
