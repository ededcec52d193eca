//! Normalization options and configuration.

use crate::error::{Error, Result};

/// Options controlling the markup vocabulary and canonical layout.
///
/// The defaults match the conventions of the documents this tool was written
/// for: `<section class="page">` pages, `<img class="fig">` figures and
/// Japanese figure captions (`図1：`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Columns of indentation for one structural level
    pub indent_width: usize,

    /// Tag name of page containers
    pub page_tag: String,

    /// Class token identifying page containers
    pub page_class: String,

    /// Class token of the generated page-number marker
    pub page_number_class: String,

    /// Class token of the legacy paragraph-number marker
    pub para_number_class: String,

    /// Class token identifying figure images
    pub figure_class: String,

    /// Word placed before the figure ordinal in captions
    pub caption_label: String,

    /// Separator placed after the figure ordinal in captions
    pub caption_separator: String,

    /// Prefix of page ids (`page-` gives `page-3`)
    pub page_id_prefix: String,

    /// Prefix of paragraph ids (`p` gives `p3-1`)
    pub paragraph_id_prefix: String,

    /// Upper bound on layout normalization iterations
    pub max_layout_iterations: usize,
}

impl NormalizeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width of one structural level.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Set the tag name of page containers.
    pub fn with_page_tag(mut self, tag: impl Into<String>) -> Self {
        self.page_tag = tag.into();
        self
    }

    /// Set the class token identifying page containers.
    pub fn with_page_class(mut self, class: impl Into<String>) -> Self {
        self.page_class = class.into();
        self
    }

    /// Set the class token of the page-number marker.
    pub fn with_page_number_class(mut self, class: impl Into<String>) -> Self {
        self.page_number_class = class.into();
        self
    }

    /// Set the class token identifying figure images.
    pub fn with_figure_class(mut self, class: impl Into<String>) -> Self {
        self.figure_class = class.into();
        self
    }

    /// Set the caption label and separator (`("Fig. ", ": ")` gives `Fig. 1: `).
    pub fn with_caption(mut self, label: impl Into<String>, separator: impl Into<String>) -> Self {
        self.caption_label = label.into();
        self.caption_separator = separator.into();
        self
    }

    /// Set the id prefixes used for pages and paragraphs.
    pub fn with_id_prefixes(mut self, page: impl Into<String>, paragraph: impl Into<String>) -> Self {
        self.page_id_prefix = page.into();
        self.paragraph_id_prefix = paragraph.into();
        self
    }

    /// Set the layout iteration cap.
    pub fn with_max_layout_iterations(mut self, iterations: usize) -> Self {
        self.max_layout_iterations = iterations;
        self
    }

    /// One level of canonical indentation.
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_width)
    }

    /// Two levels of canonical indentation (paragraph body text).
    pub fn body_indent(&self) -> String {
        " ".repeat(self.indent_width * 2)
    }

    /// Caption prefix for a figure ordinal, e.g. `図3：`.
    pub fn caption_prefix(&self, ordinal: usize) -> String {
        format!(
            "{}{}{}",
            self.caption_label, ordinal, self.caption_separator
        )
    }

    /// Value of the figure data attribute, e.g. `図3`.
    pub fn figure_label(&self, ordinal: usize) -> String {
        format!("{}{}", self.caption_label, ordinal)
    }

    /// Check that the options can drive a pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.indent_width == 0 {
            return Err(Error::InvalidOptions(
                "indent width must be at least 1".to_string(),
            ));
        }
        if self.max_layout_iterations == 0 {
            return Err(Error::InvalidOptions(
                "max layout iterations must be at least 1".to_string(),
            ));
        }
        if self.caption_label.is_empty() {
            return Err(Error::InvalidOptions(
                "caption label must not be empty".to_string(),
            ));
        }
        if !self
            .caption_separator
            .starts_with(|c: char| !c.is_ascii_digit())
        {
            return Err(Error::InvalidOptions(format!(
                "caption separator must be non-empty and not start with a digit, got {:?}",
                self.caption_separator
            )));
        }

        let attr_texts = [
            ("caption label", &self.caption_label),
            ("caption separator", &self.caption_separator),
            ("page id prefix", &self.page_id_prefix),
            ("paragraph id prefix", &self.paragraph_id_prefix),
        ];
        for (what, value) in attr_texts {
            if value.contains(['"', '\'']) {
                return Err(Error::InvalidOptions(format!(
                    "{} must not contain quotes, got {:?}",
                    what, value
                )));
            }
        }

        let tokens = [
            ("page tag", &self.page_tag),
            ("page class", &self.page_class),
            ("page number class", &self.page_number_class),
            ("paragraph number class", &self.para_number_class),
            ("figure class", &self.figure_class),
        ];
        for (what, value) in tokens {
            if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '"') {
                return Err(Error::InvalidOptions(format!(
                    "{} must be a single non-empty token, got {:?}",
                    what, value
                )));
            }
        }

        if !self.page_tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::InvalidOptions(format!(
                "page tag {:?} is not a valid tag name",
                self.page_tag
            )));
        }

        Ok(())
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            page_tag: "section".to_string(),
            page_class: "page".to_string(),
            page_number_class: "page-number".to_string(),
            para_number_class: "para-number".to_string(),
            figure_class: "fig".to_string(),
            caption_label: "図".to_string(),
            caption_separator: "：".to_string(),
            page_id_prefix: "page-".to_string(),
            paragraph_id_prefix: "p".to_string(),
            max_layout_iterations: 4,
        }
    }
}
