//! Per-page heading and paragraph numbering.

use super::{NormalizeOptions, Pass, PAGE_DATA_ATTR, PARA_DATA_ATTR};
use crate::markup::{Classifier, Document, Element, Node, NodeKind};

/// Numbers headings and paragraphs within each page and reflows their text
/// to canonical indentation.
#[derive(Debug, Clone)]
pub struct ParagraphNumberingPass {
    options: NormalizeOptions,
}

impl ParagraphNumberingPass {
    /// Create the pass.
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    fn visit_pages(&self, nodes: &mut [Node], classifier: &Classifier<'_>, counts: &mut Vec<usize>) {
        for node in nodes.iter_mut() {
            let Node::Element(element) = node else {
                continue;
            };

            if classifier.is_page(element) && element.is_closed() {
                let page = page_ordinal(element);
                let count = self.number_in_page(&mut element.children, page, classifier, 0);
                log::trace!("page {}: {} paragraphs", page, count);
                counts.push(count);
            } else {
                self.visit_pages(&mut element.children, classifier, counts);
            }
        }
    }

    fn number_in_page(
        &self,
        nodes: &mut Vec<Node>,
        page: usize,
        classifier: &Classifier<'_>,
        local: usize,
    ) -> usize {
        let mut local = local;
        let mut i = 0;

        while i < nodes.len() {
            let is_paragraph = matches!(
                &nodes[i],
                Node::Element(e)
                    if e.is_closed() && matches!(classifier.classify(e), NodeKind::Paragraph(_))
            );

            if is_paragraph {
                local += 1;
                if let Node::Element(paragraph) = &mut nodes[i] {
                    self.rewrite(paragraph, page, local, classifier);
                }
                i += self.break_before(nodes, i);
            } else if let Node::Element(element) = &mut nodes[i] {
                local = self.number_in_page(&mut element.children, page, classifier, local);
            }

            i += 1;
        }

        local
    }

    /// Start the node at `index` on a fresh line at canonical indentation.
    /// Returns the number of nodes inserted before it.
    fn break_before(&self, nodes: &mut Vec<Node>, index: usize) -> usize {
        let lead = format!("\n{}", self.options.indent());

        if index > 0 {
            if let Node::Text(prev) = &mut nodes[index - 1] {
                let kept = prev.trim_end().len();
                prev.truncate(kept);
                prev.push_str(&lead);
                return 0;
            }
        }

        nodes.insert(index, Node::Text(lead));
        1
    }

    fn rewrite(&self, paragraph: &mut Element, page: usize, local: usize, classifier: &Classifier<'_>) {
        let tag = &mut paragraph.start;
        tag.remove_attrs(&["id", PARA_DATA_ATTR]);
        tag.tidy_spacing();
        tag.push_attr(
            "id",
            format!("{}{}-{}", self.options.paragraph_id_prefix, page, local),
        );
        tag.push_attr(PARA_DATA_ATTR, local.to_string());

        paragraph.remove_descendants(&|e| classifier.is_paragraph_marker(e));
        join_split_start_tags(&mut paragraph.children);

        let body = paragraph.inner_html();
        let lines: Vec<&str> = body
            .trim()
            .split('\n')
            .map(str::trim_start)
            .filter(|line| !line.is_empty())
            .collect();

        let indent = self.options.indent();
        let inner = if lines.is_empty() {
            format!("\n{}", indent)
        } else {
            let body_indent = self.options.body_indent();
            let separator = format!("\n{}", body_indent);
            format!(
                "\n{}{}\n{}",
                body_indent,
                lines.join(separator.as_str()),
                indent
            )
        };

        paragraph.set_inner_html(&inner);
        paragraph.end = Some(format!("</{}>", paragraph.start.name));
    }
}

impl Pass for ParagraphNumberingPass {
    /// Paragraph count of each page, in document order.
    type Stats = Vec<usize>;

    fn name(&self) -> &'static str {
        "number-paragraphs"
    }

    fn run(&self, doc: &mut Document) -> Vec<usize> {
        let classifier = Classifier::new(&self.options);
        let mut counts = Vec::new();
        self.visit_pages(&mut doc.nodes, &classifier, &mut counts);
        counts
    }
}

/// Page ordinal as recorded on the page container by page numbering.
fn page_ordinal(page: &Element) -> usize {
    match page
        .start
        .attr_value(PAGE_DATA_ATTR)
        .and_then(|v| v.trim().parse().ok())
    {
        Some(ordinal) => ordinal,
        None => {
            log::warn!("page without a readable {}: {}", PAGE_DATA_ATTR, page.start);
            0
        }
    }
}

/// Pull the first attribute of every start tag onto the tag's line
/// (`<mark\n    class="x">` becomes `<mark class="x">`).
fn join_split_start_tags(nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            if let Some(first) = element.start.attrs.first_mut() {
                if first.space.contains('\n') {
                    first.space = " ".to_string();
                }
            }
            join_split_start_tags(&mut element.children);
        }
    }
}
