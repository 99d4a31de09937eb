//! Page-level access to a document's text

/// A document whose pages can be read as plain text, in order.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of page `index` (zero-based). Pages that cannot be read, or do
    /// not exist, come back empty.
    fn page_text(&self, index: usize) -> String;

    /// All pages joined with newlines.
    fn full_text(&self) -> String {
        (0..self.page_count())
            .map(|i| self.page_text(i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Pages already held in memory (pre-extracted text, fixtures).
#[derive(Debug, Clone, Default)]
pub struct MemoryPages(pub Vec<String>);

impl MemoryPages {
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(pages.into_iter().map(Into::into).collect())
    }
}

impl PageSource for MemoryPages {
    fn page_count(&self) -> usize {
        self.0.len()
    }

    fn page_text(&self, index: usize) -> String {
        self.0.get(index).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_pages() {
        let doc = MemoryPages::new(["one", "two"]);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(1), "two");
        assert_eq!(doc.page_text(2), "");
        assert_eq!(doc.full_text(), "one\ntwo");
    }
}
