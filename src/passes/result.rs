//! Normalization result with statistics.

use serde::{Deserialize, Serialize};

/// Result of normalizing a document: the rewritten text and what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeResult {
    /// The rewritten document
    pub content: String,

    /// Statistics collected by the passes
    pub report: NormalizeReport,
}

impl NormalizeResult {
    /// Create a new normalization result.
    pub fn new(content: String, report: NormalizeReport) -> Self {
        Self { content, report }
    }

    /// Whether the document differed from its normalized form.
    pub fn changed(&self) -> bool {
        self.report.changed
    }
}

/// Statistics collected during one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Page-number and legacy paragraph-number markers removed
    pub markers_removed: usize,

    /// Pages numbered
    pub page_count: usize,

    /// Headings and paragraphs numbered, per page in document order
    pub paragraphs_per_page: Vec<usize>,

    /// Figures numbered
    pub figure_count: usize,

    /// Layout rule iterations until the text stopped changing
    pub layout_iterations: usize,

    /// Whether the output differs from the input
    pub changed: bool,
}

impl NormalizeReport {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total headings and paragraphs numbered.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs_per_page.iter().sum()
    }

    /// Merge another report into this one (batch totals).
    pub fn merge(&mut self, other: &NormalizeReport) {
        self.markers_removed += other.markers_removed;
        self.page_count += other.page_count;
        self.paragraphs_per_page
            .extend_from_slice(&other.paragraphs_per_page);
        self.figure_count += other.figure_count;
        self.layout_iterations = self.layout_iterations.max(other.layout_iterations);
        self.changed |= other.changed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_count() {
        let report = NormalizeReport {
            paragraphs_per_page: vec![3, 0, 2],
            ..Default::default()
        };
        assert_eq!(report.paragraph_count(), 5);
    }

    #[test]
    fn test_report_merge() {
        let mut total = NormalizeReport {
            page_count: 2,
            paragraphs_per_page: vec![1, 2],
            figure_count: 1,
            layout_iterations: 2,
            ..Default::default()
        };

        let other = NormalizeReport {
            page_count: 1,
            paragraphs_per_page: vec![4],
            figure_count: 3,
            layout_iterations: 1,
            changed: true,
            ..Default::default()
        };

        total.merge(&other);

        assert_eq!(total.page_count, 3);
        assert_eq!(total.paragraph_count(), 7);
        assert_eq!(total.figure_count, 4);
        assert_eq!(total.layout_iterations, 2);
        assert!(total.changed);
    }

    #[test]
    fn test_report_serializes() {
        let report = NormalizeReport {
            page_count: 1,
            paragraphs_per_page: vec![2],
            ..Default::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"page_count\":1"));
        assert!(json.contains("\"paragraphs_per_page\":[2]"));
    }
}
