//! Removal of generated marker elements.

use super::{NormalizeOptions, Pass};
use crate::markup::{remove_elements, Classifier, Document};

/// Removes page-number and legacy paragraph-number markers so they can be
/// regenerated from scratch.
#[derive(Debug, Clone)]
pub struct AnnotationStripPass {
    options: NormalizeOptions,
}

impl AnnotationStripPass {
    /// Create the pass.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }
}

impl Pass for AnnotationStripPass {
    /// Number of markers removed.
    type Stats = usize;

    fn name(&self) -> &'static str {
        "strip-annotations"
    }

    fn run(&self, doc: &mut Document) -> usize {
        let classifier = Classifier::new(&self.options);
        remove_elements(&mut doc.nodes, &|e| classifier.is_marker(e))
    }
}
