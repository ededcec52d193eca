//! The normalization pipeline and its passes.
//!
//! Passes run in a fixed order, each on the output of the previous one:
//!
//! 1. [`AnnotationStripPass`] removes generated markers
//! 2. [`PageNumberingPass`] numbers pages
//! 3. [`ParagraphNumberingPass`] numbers headings and paragraphs per page
//! 4. [`FigureNumberingPass`] numbers figures across the document
//! 5. [`LayoutNormalizationPass`] fixes line breaks and indentation
//!
//! The first four share one parsed [`Document`]; layout runs on the
//! serialized text.

mod figures;
mod layout;
mod options;
mod pages;
mod paragraphs;
mod result;
mod strip;

pub use figures::FigureNumberingPass;
pub use layout::LayoutNormalizationPass;
pub use options::NormalizeOptions;
pub use pages::PageNumberingPass;
pub use paragraphs::ParagraphNumberingPass;
pub use result::{NormalizeReport, NormalizeResult};
pub use strip::AnnotationStripPass;

use crate::error::Result;
use crate::markup::Document;

/// Data attribute carrying the page ordinal.
pub const PAGE_DATA_ATTR: &str = "data-page";

/// Data attribute carrying the paragraph's local ordinal.
pub const PARA_DATA_ATTR: &str = "data-para";

/// Data attribute carrying the figure label.
pub const FIGURE_DATA_ATTR: &str = "data-fig";

/// A rewrite over the document tree.
///
/// Each pass keeps its counters local to one call of [`Pass::run`], so a pass
/// value can be reused across documents.
pub trait Pass {
    /// Counters reported by one run.
    type Stats;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite `doc` in place.
    fn run(&self, doc: &mut Document) -> Self::Stats;

    /// Parse `input`, run the pass and serialize the result.
    fn apply(&self, input: &str) -> (String, Self::Stats) {
        let mut doc = Document::parse(input);
        let stats = self.run(&mut doc);
        (doc.to_string(), stats)
    }
}

/// The full normalization pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    strip: AnnotationStripPass,
    pages: PageNumberingPass,
    paragraphs: ParagraphNumberingPass,
    figures: FigureNumberingPass,
    layout: LayoutNormalizationPass,
}

impl Pipeline {
    /// Build a pipeline, validating the options.
    pub fn new(options: NormalizeOptions) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            strip: AnnotationStripPass::new(options.clone()),
            pages: PageNumberingPass::new(options.clone()),
            paragraphs: ParagraphNumberingPass::new(options.clone()),
            figures: FigureNumberingPass::new(options.clone())?,
            layout: LayoutNormalizationPass::new(options)?,
        })
    }

    /// Normalize one document.
    pub fn run(&self, input: &str) -> NormalizeResult {
        let mut doc = Document::parse(input);

        let markers_removed = self.strip.run(&mut doc);
        log::debug!("{}: {} markers removed", self.strip.name(), markers_removed);

        let page_count = self.pages.run(&mut doc);
        log::debug!("{}: {} pages", self.pages.name(), page_count);

        let paragraphs_per_page = self.paragraphs.run(&mut doc);
        log::debug!(
            "{}: {} paragraphs",
            self.paragraphs.name(),
            paragraphs_per_page.iter().sum::<usize>()
        );

        let figure_count = self.figures.run(&mut doc);
        log::debug!("{}: {} figures", self.figures.name(), figure_count);

        let (content, layout_iterations) = self.layout.apply(&doc.to_string());
        log::debug!("layout settled after {} iterations", layout_iterations);

        let report = NormalizeReport {
            markers_removed,
            page_count,
            paragraphs_per_page,
            figure_count,
            layout_iterations,
            changed: content != input,
        };

        NormalizeResult::new(content, report)
    }
}
