//! Classification of elements into the structural kinds the passes act on.

use serde::{Deserialize, Serialize};

use super::tree::Element;
use crate::passes::NormalizeOptions;

/// Tag of the page-number marker element.
pub const PAGE_MARKER_TAG: &str = "div";

/// Tag of the legacy paragraph-number marker element.
pub const PARAGRAPH_MARKER_TAG: &str = "span";

/// Tag of figure elements.
pub const FIGURE_TAG: &str = "img";

/// Kind of a paragraph-like element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// `h1` through `h6`
    Heading(u8),
    /// `p`
    Body,
}

impl TagKind {
    /// Kind for a tag name, if it is a heading or paragraph.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        match name.as_bytes() {
            b"p" => Some(TagKind::Body),
            [b'h', level @ b'1'..=b'6'] => Some(TagKind::Heading(level - b'0')),
            _ => None,
        }
    }

    /// Whether this is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, TagKind::Heading(_))
    }
}

/// Structural kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Page container
    Page,
    /// Heading or body paragraph
    Paragraph(TagKind),
    /// Numbered figure image
    Figure,
    /// Generated page-number marker
    PageMarker,
    /// Legacy paragraph-number marker
    ParagraphMarker,
    /// Anything else
    Other,
}

/// Classifies elements according to the configured vocabulary.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    options: &'a NormalizeOptions,
}

impl<'a> Classifier<'a> {
    /// Create a classifier for the given options.
    pub fn new(options: &'a NormalizeOptions) -> Self {
        Self { options }
    }

    /// Determine the kind of an element.
    pub fn classify(&self, element: &Element) -> NodeKind {
        let tag = &element.start;

        if tag.is(&self.options.page_tag) && tag.has_class(&self.options.page_class) {
            return NodeKind::Page;
        }
        if let Some(kind) = TagKind::from_tag_name(&tag.name) {
            return NodeKind::Paragraph(kind);
        }
        if tag.is(FIGURE_TAG) && tag.has_class(&self.options.figure_class) {
            return NodeKind::Figure;
        }
        if tag.is(PAGE_MARKER_TAG) && tag.has_class(&self.options.page_number_class) {
            return NodeKind::PageMarker;
        }
        if tag.is(PARAGRAPH_MARKER_TAG) && tag.has_class(&self.options.para_number_class) {
            return NodeKind::ParagraphMarker;
        }
        NodeKind::Other
    }

    /// Whether the element is a page container.
    pub fn is_page(&self, element: &Element) -> bool {
        self.classify(element) == NodeKind::Page
    }

    /// Whether the element is either kind of generated marker.
    pub fn is_marker(&self, element: &Element) -> bool {
        matches!(
            self.classify(element),
            NodeKind::PageMarker | NodeKind::ParagraphMarker
        )
    }

    /// Whether the element is the legacy paragraph-number marker.
    pub fn is_paragraph_marker(&self, element: &Element) -> bool {
        self.classify(element) == NodeKind::ParagraphMarker
    }
}
