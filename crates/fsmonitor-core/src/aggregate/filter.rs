/// Exclusion filter — skips entries whose name contains a configured pattern.
use compact_str::CompactString;

/// A single optional substring pattern matched against entry names.
///
/// The default filter has no pattern and includes everything. An empty
/// pattern is treated the same as no pattern, otherwise it would match
/// every name and hide the whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionFilter {
    pattern: Option<CompactString>,
}

impl ExclusionFilter {
    /// Filter that excludes nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Filter that excludes every entry whose name contains `pattern`.
    pub fn new(pattern: impl AsRef<str>) -> Self {
        let pattern = pattern.as_ref();
        if pattern.is_empty() {
            return Self::none();
        }
        Self {
            pattern: Some(CompactString::new(pattern)),
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// `true` when the entry called `name` must be skipped.
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        match &self.pattern {
            Some(pattern) => name.contains(pattern.as_str()),
            None => false,
        }
    }
}

impl From<Option<&str>> for ExclusionFilter {
    fn from(pattern: Option<&str>) -> Self {
        pattern.map(ExclusionFilter::new).unwrap_or_default()
    }
}
