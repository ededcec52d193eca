//! Page numbering.

use super::{NormalizeOptions, Pass, PAGE_DATA_ATTR};
use crate::markup::{Classifier, Document, Element, Node, PAGE_MARKER_TAG};

/// Numbers page containers in document order, re-indents their content and
/// appends a page-number marker to each.
#[derive(Debug, Clone)]
pub struct PageNumberingPass {
    options: NormalizeOptions,
}

impl PageNumberingPass {
    /// Create the pass.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Markup of the page-number marker for a page.
    pub fn marker(&self, ordinal: usize) -> String {
        format!(
            "<{tag} class=\"{class}\">{ordinal}</{tag}>",
            tag = PAGE_MARKER_TAG,
            class = self.options.page_number_class,
        )
    }

    fn number_pages(&self, nodes: &mut [Node], classifier: &Classifier<'_>, count: usize) -> usize {
        let mut count = count;
        for node in nodes.iter_mut() {
            let Node::Element(element) = node else {
                continue;
            };

            if classifier.is_page(element) {
                if element.is_closed() {
                    count += 1;
                    self.rewrite(element, count);
                    continue;
                }
                log::warn!(
                    "page container without end tag is not numbered: {}",
                    element.start
                );
            }

            count = self.number_pages(&mut element.children, classifier, count);
        }
        count
    }

    fn rewrite(&self, page: &mut Element, ordinal: usize) {
        log::trace!("page {} gets ordinal {}", page.start, ordinal);

        let tag = &mut page.start;
        tag.remove_attrs(&["id", PAGE_DATA_ATTR]);
        tag.tidy_spacing();
        tag.push_attr("id", format!("{}{}", self.options.page_id_prefix, ordinal));
        tag.push_attr(PAGE_DATA_ATTR, ordinal.to_string());

        let indent = self.options.indent();
        let inner = page.inner_html();
        let content = skip_leading_blank_lines(&inner).trim_end();

        let mut lines: Vec<String> = if content.is_empty() {
            Vec::new()
        } else {
            content
                .split('\n')
                .map(|line| format!("{}{}", indent, line.trim_start()))
                .collect()
        };
        lines.push(format!("{}{}", indent, self.marker(ordinal)));

        page.set_inner_html(&format!("\n{}\n", lines.join("\n")));
        page.end = Some(format!("</{}>", page.start.name));
    }
}

impl Pass for PageNumberingPass {
    /// Number of pages.
    type Stats = usize;

    fn name(&self) -> &'static str {
        "number-pages"
    }

    fn run(&self, doc: &mut Document) -> usize {
        let classifier = Classifier::new(&self.options);
        self.number_pages(&mut doc.nodes, &classifier, 0)
    }
}

/// Drop the leading whitespace run up to and including its last line break.
fn skip_leading_blank_lines(text: &str) -> &str {
    let leading = text.len() - text.trim_start().len();
    match text[..leading].rfind('\n') {
        Some(i) => &text[i + 1..],
        None => text,
    }
}
