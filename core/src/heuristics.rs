//! Structural facts read from the source text.
//!
//! Every check is a single line-anchored pattern: a marker only counts when
//! it starts a line (after indentation), so text behind `//` or `/*` never
//! matches.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use playground_types::Action;

use crate::resolver::resolve_default_action;
use crate::selector::Memo;

/// Output kind that does not imply a run or build choice.
pub const PROC_MACRO_CRATE_TYPE: &str = "proc-macro";

static TEST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*#\s*\[\s*test\s*(\([^"]*)?\]"#).expect("valid test attribute regex")
});

static ENTRY_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(pub\s+)?\s*(const\s+)?\s*(async\s+)?\s*fn\s+main\s*\(\s*\)")
        .expect("valid main function regex")
});

static CRATE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*#!\s*\[\s*crate_type\s*=\s*"([^"]*)"\s*\]"#)
        .expect("valid crate_type attribute regex")
});

/// Whether a line opens with a `#[test ...]` attribute.
#[must_use]
pub fn has_test_marker(text: &str) -> bool {
    TEST_MARKER.is_match(text)
}

/// Whether a line declares `fn main()`, optionally `pub`, `const` and `async`.
///
/// `main` must be followed (after whitespace) by an empty parameter list, so
/// `fn mainly()` does not count.
#[must_use]
pub fn has_entry_point(text: &str) -> bool {
    ENTRY_POINT.is_match(text)
}

/// The value of the first `#![crate_type = "..."]` attribute, if any. An
/// empty value counts as no declaration.
#[must_use]
pub fn explicit_output_kind(text: &str) -> Option<&str> {
    CRATE_TYPE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .filter(|kind| !kind.is_empty())
}

/// Everything the resolver needs to know about one source text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFacts {
    pub has_tests: bool,
    pub has_entry_point: bool,
    pub output_kind: Option<String>,
}

impl SourceFacts {
    #[must_use]
    pub fn analyze(text: &str) -> Self {
        Self {
            has_tests: has_test_marker(text),
            has_entry_point: has_entry_point(text),
            output_kind: explicit_output_kind(text).map(ToString::to_string),
        }
    }

    /// The action the "run" control performs when left on auto.
    #[must_use]
    pub fn default_action(&self) -> Action {
        resolve_default_action(
            self.output_kind.as_deref(),
            self.has_tests,
            self.has_entry_point,
        )
    }

    /// Declared output kind, or `bin`/`lib` derived from the default action.
    #[must_use]
    pub fn crate_type(&self) -> &str {
        match self.output_kind.as_deref() {
            Some(kind) => kind,
            None if self.default_action() == Action::Execute => "bin",
            None => "lib",
        }
    }

    #[must_use]
    pub fn runs_as_test(&self) -> bool {
        self.default_action() == Action::Test
    }
}

/// Memoized [`SourceFacts`] for the current buffer.
///
/// Configuration changes re-derive state that depends on these facts; as long
/// as the text is unchanged the regexes are not run again.
#[derive(Debug, Default)]
pub struct SourceAnalyzer {
    memo: Memo<Arc<str>, SourceFacts>,
}

impl SourceAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&mut self, text: &Arc<str>) -> &SourceFacts {
        self.memo.get_or_compute(text, |text| {
            tracing::trace!(bytes = text.len(), "Analyzing source text");
            SourceFacts::analyze(text)
        })
    }
}
