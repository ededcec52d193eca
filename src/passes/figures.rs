//! Document-wide figure numbering and caption prefixes.

use regex::Regex;

use super::{NormalizeOptions, Pass, FIGURE_DATA_ATTR};
use crate::error::Result;
use crate::markup::{Classifier, Document, Element, Node, NodeKind};

/// Numbers figure images across the whole document and rewrites the
/// numeric prefix of their alt text.
#[derive(Debug, Clone)]
pub struct FigureNumberingPass {
    options: NormalizeOptions,
    stale_prefix: Regex,
}

impl FigureNumberingPass {
    /// Create the pass. Fails only if the caption pattern cannot compile.
    pub fn new(options: NormalizeOptions) -> Result<Self> {
        let stale_prefix = Regex::new(&format!(
            "^{}[0-9]+{}",
            regex::escape(&options.caption_label),
            regex::escape(&options.caption_separator)
        ))?;
        Ok(Self {
            options,
            stale_prefix,
        })
    }

    /// Caption for figure `ordinal` given its current alt text.
    ///
    /// A prefix in exactly the generated form is replaced; anything else is
    /// kept as part of the caption.
    pub fn caption(&self, ordinal: usize, alt: &str) -> String {
        let rest = self.stale_prefix.replace(alt.trim(), "");
        format!("{}{}", self.options.caption_prefix(ordinal), rest.trim())
    }

    fn number_figures(&self, nodes: &mut [Node], classifier: &Classifier<'_>, count: usize) -> usize {
        let mut count = count;
        for node in nodes.iter_mut() {
            if let Node::Element(element) = node {
                if classifier.classify(element) == NodeKind::Figure {
                    count += 1;
                    self.rewrite(element, count);
                }
                count = self.number_figures(&mut element.children, classifier, count);
            }
        }
        count
    }

    fn rewrite(&self, figure: &mut Element, ordinal: usize) {
        let tag = &mut figure.start;
        tag.remove_attrs(&[FIGURE_DATA_ATTR]);

        match tag.attr_mut("alt") {
            Some(alt) => {
                let caption = self.caption(ordinal, alt.value().unwrap_or(""));
                alt.set_value(caption);
            }
            None => tag.push_attr("alt", self.options.caption_prefix(ordinal)),
        }

        tag.push_attr(FIGURE_DATA_ATTR, self.options.figure_label(ordinal));
        log::trace!("figure {}: {}", ordinal, tag);
    }
}

impl Pass for FigureNumberingPass {
    /// Number of figures.
    type Stats = usize;

    fn name(&self) -> &'static str {
        "number-figures"
    }

    fn run(&self, doc: &mut Document) -> usize {
        let classifier = Classifier::new(&self.options);
        self.number_figures(&mut doc.nodes, &classifier, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> FigureNumberingPass {
        FigureNumberingPass::new(NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn test_caption_replaces_stale_prefix() {
        let pass = pass();
        assert_eq!(pass.caption(1, "図9：old"), "図1：old");
        assert_eq!(pass.caption(2, "  図12：  spaced "), "図2：spaced");
        assert_eq!(pass.caption(3, ""), "図3：");
    }

    #[test]
    fn test_caption_keeps_foreign_numbering() {
        let pass = pass();
        assert_eq!(pass.caption(1, "Fig. 4: chart"), "図1：Fig. 4: chart");
        assert_eq!(pass.caption(1, "図A：chart"), "図1：図A：chart");
    }

    #[test]
    fn test_numbers_document_wide() {
        let src = "<section class=\"page\"><img class=\"fig\" src=\"a.png\" alt=\"図9：old\"></section>\n<section class=\"page\"><p><img src=\"b.png\" class=\"fig wide\"></p></section>";
        let (out, count) = pass().apply(src);
        assert_eq!(count, 2);
        assert!(out.contains("<img class=\"fig\" src=\"a.png\" alt=\"図1：old\" data-fig=\"図1\">"));
        assert!(out.contains("<img src=\"b.png\" class=\"fig wide\" alt=\"図2：\" data-fig=\"図2\">"));
    }

    #[test]
    fn test_ignores_plain_images() {
        let src = "<img src=\"logo.png\" alt=\"図5：logo\">";
        let (out, count) = pass().apply(src);
        assert_eq!(count, 0);
        assert_eq!(out, src);
    }

    #[test]
    fn test_replaces_stale_data_attribute_and_keeps_self_closing() {
        let src = "<img data-fig=\"図7\" class=\"fig\" alt='図7：x' />";
        let (out, _) = pass().apply(src);
        assert_eq!(out, "<img class=\"fig\" alt='図1：x' data-fig=\"図1\" />");
    }

    #[test]
    fn test_reapplication_is_stable() {
        let src = "<img class=\"fig\" alt=\"図3：chart\"><img class=\"fig\">";
        let (once, _) = pass().apply(src);
        let (twice, _) = pass().apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_caption_vocabulary() {
        let options = NormalizeOptions::default().with_caption("Fig. ", ": ");
        let pass = FigureNumberingPass::new(options).unwrap();
        assert_eq!(pass.caption(2, "Fig. 10: flow"), "Fig. 2: flow");
    }
}
