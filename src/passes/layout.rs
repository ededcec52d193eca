//! Whitespace and line-break normalization.
//!
//! Unlike the numbering passes this works on the text directly: the rules
//! are about lines and columns, not elements.

use regex::{Captures, Regex};

use super::NormalizeOptions;
use crate::error::Result;

/// Enforces block adjacency, blank-line, trailing-whitespace and left-margin
/// rules, repeating until the text stops changing.
#[derive(Debug, Clone)]
pub struct LayoutNormalizationPass {
    options: NormalizeOptions,
    container_then_child: Regex,
    block_close: Regex,
    blank_run: Regex,
    column_zero: Regex,
}

impl LayoutNormalizationPass {
    /// Create the pass with patterns for the configured page tag.
    pub fn new(options: NormalizeOptions) -> Result<Self> {
        let page_tag = regex::escape(&options.page_tag);

        let container_then_child = Regex::new(&format!(
            r"(<(?:section|div|{page_tag})\b[^>]*>)[ \t]+(<(?:p|h[1-6]|div|span|a)\b[^>]*>)"
        ))?;
        let block_close = Regex::new(&format!(r"</(?:p|h[1-6]|div|section|{page_tag})>"))?;
        let blank_run = Regex::new(r"\n\s*\n\s*\n+")?;
        let column_zero = Regex::new(&format!(
            r"(?m)^[^\S\n]+(<body\b|</body>|<{page_tag}\b|</{page_tag}>)"
        ))?;

        Ok(Self {
            options,
            container_then_child,
            block_close,
            blank_run,
            column_zero,
        })
    }

    /// Apply the rules until a fixed point, bounded by
    /// `max_layout_iterations`. Returns the text and the iteration count.
    pub fn apply(&self, input: &str) -> (String, usize) {
        let max = self.options.max_layout_iterations.max(1);
        let mut current = input.to_string();

        for iteration in 1..=max {
            let next = self.apply_once(&current);
            if next == current {
                return (current, iteration);
            }
            current = next;
        }

        log::warn!("layout did not settle after {} iterations", max);
        (current, max)
    }

    /// One application of every rule, in order.
    pub fn apply_once(&self, text: &str) -> String {
        let text = self.break_after_container_open(text);
        let text = self.break_after_block_close(&text);
        let text = self.collapse_blank_lines(&text);
        let text = strip_trailing_whitespace(&text);
        self.pin_to_column_zero(&text)
    }

    /// `<div> <p>` on one line: move the child to its own line.
    fn break_after_container_open(&self, text: &str) -> String {
        self.container_then_child
            .replace_all(text, |caps: &Captures| {
                let at = caps.get(0).map_or(0, |m| m.start());
                format!("{}\n{}{}", &caps[1], line_indent(text, at), &caps[2])
            })
            .into_owned()
    }

    /// `</p><img>` on one line: break after the closing tag. The run of
    /// spaces between them is replaced by the current line's indentation.
    fn break_after_block_close(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 64);
        let mut last = 0;

        for m in self.block_close.find_iter(text) {
            let after = &text[m.end()..];
            let gap = after.len()
                - after
                    .trim_start_matches(|c: char| c.is_whitespace() && c != '\n')
                    .len();
            if !after[gap..].starts_with('<') {
                continue;
            }

            out.push_str(&text[last..m.end()]);
            out.push('\n');
            out.push_str(line_indent(text, m.start()));
            last = m.end() + gap;
        }

        out.push_str(&text[last..]);
        out
    }

    /// Two or more blank lines become one.
    fn collapse_blank_lines(&self, text: &str) -> String {
        self.blank_run.replace_all(text, "\n\n").into_owned()
    }

    /// Body and page container tags start at column 0.
    fn pin_to_column_zero(&self, text: &str) -> String {
        self.column_zero.replace_all(text, "${1}").into_owned()
    }
}

/// Leading spaces and tabs of the line containing byte offset `at`.
fn line_indent(text: &str, at: usize) -> &str {
    let start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let line = &text[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

fn strip_trailing_whitespace(text: &str) -> String {
    text.split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}
