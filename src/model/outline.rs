//! Outline of a document: its pages, paragraphs and figures as currently
//! annotated.

use serde::{Deserialize, Serialize};

use crate::markup::{Classifier, Document, Element, Node, NodeKind, TagKind};
use crate::passes::{NormalizeOptions, FIGURE_DATA_ATTR, PAGE_DATA_ATTR, PARA_DATA_ATTR};

/// A heading or paragraph found inside a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphEntry {
    /// Heading level or body paragraph
    pub kind: TagKind,

    /// Value of the paragraph data attribute, if numeric
    pub ordinal: Option<usize>,

    /// Value of the `id` attribute
    pub id: Option<String>,

    /// Text content with whitespace collapsed
    pub text: String,
}

/// A page container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Value of the page data attribute, if numeric
    pub ordinal: Option<usize>,

    /// Value of the `id` attribute
    pub id: Option<String>,

    /// Headings and paragraphs in document order
    pub paragraphs: Vec<ParagraphEntry>,
}

/// A figure image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureEntry {
    /// Ordinal parsed from the figure data attribute
    pub ordinal: Option<usize>,

    /// Alt text
    pub alt: Option<String>,

    /// Image source
    pub src: Option<String>,
}

/// Pages, paragraphs and figures of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Page containers in document order
    pub pages: Vec<PageEntry>,

    /// Figures in document order
    pub figures: Vec<FigureEntry>,
}

impl Outline {
    /// Build the outline of a parsed document.
    pub fn from_document(doc: &Document, options: &NormalizeOptions) -> Self {
        let classifier = Classifier::new(options);
        let mut outline = Outline::default();
        collect_pages(&doc.nodes, &classifier, &mut outline.pages);
        collect_figures(&doc.nodes, &classifier, options, &mut outline.figures);
        outline
    }

    /// Parse markup and build its outline.
    pub fn parse(src: &str, options: &NormalizeOptions) -> Self {
        Self::from_document(&Document::parse(src), options)
    }

    /// Total headings and paragraphs over all pages.
    pub fn paragraph_count(&self) -> usize {
        self.pages.iter().map(|p| p.paragraphs.len()).sum()
    }

    /// Total headings over all pages.
    pub fn heading_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.paragraphs)
            .filter(|p| p.kind.is_heading())
            .count()
    }

    /// Numbering inconsistencies: gaps, duplicates, ids that do not follow
    /// from ordinals, captions not starting with their own prefix. Empty for a
    /// normalized document.
    pub fn problems(&self, options: &NormalizeOptions) -> Vec<String> {
        let mut problems = Vec::new();

        for (i, page) in self.pages.iter().enumerate() {
            let expected = i + 1;
            if page.ordinal != Some(expected) {
                problems.push(format!(
                    "page {} has {} {:?}",
                    expected, PAGE_DATA_ATTR, page.ordinal
                ));
            }
            let expected_id = format!("{}{}", options.page_id_prefix, expected);
            if page.id.as_deref() != Some(expected_id.as_str()) {
                problems.push(format!("page {} has id {:?}", expected, page.id));
            }

            for (j, paragraph) in page.paragraphs.iter().enumerate() {
                let local = j + 1;
                if paragraph.ordinal != Some(local) {
                    problems.push(format!(
                        "paragraph {} of page {} has {} {:?}",
                        local, expected, PARA_DATA_ATTR, paragraph.ordinal
                    ));
                }
                let expected_id = format!("{}{}-{}", options.paragraph_id_prefix, expected, local);
                if paragraph.id.as_deref() != Some(expected_id.as_str()) {
                    problems.push(format!(
                        "paragraph {} of page {} has id {:?}",
                        local, expected, paragraph.id
                    ));
                }
            }
        }

        for (k, figure) in self.figures.iter().enumerate() {
            let expected = k + 1;
            if figure.ordinal != Some(expected) {
                problems.push(format!(
                    "figure {} has {} ordinal {:?}",
                    expected, FIGURE_DATA_ATTR, figure.ordinal
                ));
            }
            let alt = figure.alt.as_deref().unwrap_or("");
            if !alt.starts_with(&options.caption_prefix(expected)) {
                problems.push(format!("figure {} has caption {:?}", expected, alt));
            }
        }

        problems
    }

    /// Whether every ordinal, id and caption is where it should be.
    pub fn is_consistent(&self, options: &NormalizeOptions) -> bool {
        self.problems(options).is_empty()
    }
}

fn collect_pages(nodes: &[Node], classifier: &Classifier<'_>, pages: &mut Vec<PageEntry>) {
    for node in nodes {
        let Some(element) = node.as_element() else {
            continue;
        };

        if classifier.is_page(element) && element.is_closed() {
            let mut paragraphs = Vec::new();
            collect_paragraphs(&element.children, classifier, &mut paragraphs);
            pages.push(PageEntry {
                ordinal: numeric_attr(element, PAGE_DATA_ATTR),
                id: element.start.attr_value("id").map(str::to_string),
                paragraphs,
            });
        } else {
            collect_pages(&element.children, classifier, pages);
        }
    }
}

fn collect_paragraphs(nodes: &[Node], classifier: &Classifier<'_>, out: &mut Vec<ParagraphEntry>) {
    for node in nodes {
        let Some(element) = node.as_element() else {
            continue;
        };

        match classifier.classify(element) {
            NodeKind::Paragraph(kind) if element.is_closed() => out.push(ParagraphEntry {
                kind,
                ordinal: numeric_attr(element, PARA_DATA_ATTR),
                id: element.start.attr_value("id").map(str::to_string),
                text: element.text_content(),
            }),
            _ => collect_paragraphs(&element.children, classifier, out),
        }
    }
}

fn collect_figures(
    nodes: &[Node],
    classifier: &Classifier<'_>,
    options: &NormalizeOptions,
    out: &mut Vec<FigureEntry>,
) {
    for node in nodes {
        let Some(element) = node.as_element() else {
            continue;
        };

        if classifier.classify(element) == NodeKind::Figure {
            let ordinal = element
                .start
                .attr_value(FIGURE_DATA_ATTR)
                .and_then(|label| label.strip_prefix(options.caption_label.as_str()))
                .and_then(|n| n.parse().ok());
            out.push(FigureEntry {
                ordinal,
                alt: element.start.attr_value("alt").map(str::to_string),
                src: element.start.attr_value("src").map(str::to_string),
            });
        }
        collect_figures(&element.children, classifier, options, out);
    }
}

fn numeric_attr(element: &Element, name: &str) -> Option<usize> {
    element
        .start
        .attr_value(name)
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMALIZED: &str = r#"<body>
<section class="page" id="page-1" data-page="1">
  <h1 id="p1-1" data-para="1">
    Title
  </h1>
  <p id="p1-2" data-para="2">
    Hello
    world
  </p>
  <div class="page-number">1</div>
</section>
<section class="page" id="page-2" data-page="2">
  <p id="p2-1" data-para="1">
    <img class="fig" src="a.png" alt="図1：chart" data-fig="図1">
  </p>
  <div class="page-number">2</div>
</section>
</body>
"#;

    #[test]
    fn test_outline_of_normalized_document() {
        let options = NormalizeOptions::default();
        let outline = Outline::parse(NORMALIZED, &options);

        assert_eq!(outline.pages.len(), 2);
        assert_eq!(outline.paragraph_count(), 3);
        assert_eq!(outline.heading_count(), 1);
        assert_eq!(outline.pages[0].paragraphs[1].text, "Hello world");
        assert_eq!(outline.figures.len(), 1);
        assert_eq!(outline.figures[0].ordinal, Some(1));
        assert_eq!(outline.figures[0].src.as_deref(), Some("a.png"));
        assert!(outline.is_consistent(&options), "{:?}", outline.problems(&options));
    }

    #[test]
    fn test_problems_detect_gaps_and_duplicates() {
        let options = NormalizeOptions::default();
        let src = NORMALIZED
            .replace("data-page=\"2\"", "data-page=\"3\"")
            .replace("alt=\"図1：chart\"", "alt=\"図2：chart\"");
        let outline = Outline::parse(&src, &options);
        let problems = outline.problems(&options);

        assert_eq!(problems.len(), 2, "{:?}", problems);
        assert!(problems[0].starts_with("page 2"));
        assert!(problems[1].starts_with("figure 1"));
    }

    #[test]
    fn test_caption_check_accepts_kept_foreign_prefix() {
        let options = NormalizeOptions::default();
        let src = NORMALIZED.replace("alt=\"図1：chart\"", "alt=\"図1：図3：chart\"");
        let outline = Outline::parse(&src, &options);
        assert!(outline.is_consistent(&options), "{:?}", outline.problems(&options));
    }
}
