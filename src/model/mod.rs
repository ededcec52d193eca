//! Document model for inspecting numbering.
//!
//! An [`Outline`] is a read-only view of a parsed document: the pages with
//! their headings and paragraphs, and the figures. It is what `stats`
//! reports and what consistency checks run against.

mod outline;

pub use outline::{FigureEntry, Outline, PageEntry, ParagraphEntry};
