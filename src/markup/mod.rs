//! Markup parsing module.
//!
//! A small, forgiving parser for HTML-like documents. It builds a lossless
//! tree (see [`Document`]) with proper nesting, which the numbering passes
//! traverse instead of matching tags with patterns.

mod kind;
mod lexer;
mod tree;

pub use kind::{Classifier, NodeKind, TagKind, FIGURE_TAG, PAGE_MARKER_TAG, PARAGRAPH_MARKER_TAG};
pub use lexer::{Lexer, Token};
pub use tree::{remove_elements, AttrValue, Attribute, Document, Element, Node, StartTag};
