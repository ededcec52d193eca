//! Tokenizer for HTML-like markup.
//!
//! The lexer never fails: anything that does not form a complete tag is
//! returned as text. Every byte of the input ends up in exactly one token,
//! so concatenating the raw form of all tokens reproduces the source.

use super::tree::{AttrValue, Attribute, StartTag};

/// Elements whose content is opaque text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Character data between tags
    Text(&'a str),

    /// Comment, doctype, CDATA or processing instruction, kept verbatim
    Raw(&'a str),

    /// Opening (or self-closing) tag
    StartTag(StartTag),

    /// Closing tag with its lowercase name and raw source
    EndTag { name: String, raw: &'a str },
}

/// Streaming tokenizer over a markup string.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    raw_text_end: Option<String>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer positioned at the start of `src`.
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_text_end: None,
        }
    }

    fn text_until_next_tag(&mut self, skip: usize) -> Token<'a> {
        let rest = &self.src[self.pos..];
        let len = rest[skip..]
            .find('<')
            .map(|i| i + skip)
            .unwrap_or(rest.len());
        self.pos += len;
        Token::Text(&rest[..len])
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.src.len() {
            return None;
        }

        if let Some(name) = self.raw_text_end.take() {
            let rest = &self.src[self.pos..];
            let len = find_end_tag(rest, &name).unwrap_or(rest.len());
            if len > 0 {
                self.pos += len;
                return Some(Token::Text(&rest[..len]));
            }
        }

        let rest = &self.src[self.pos..];
        if !rest.starts_with('<') {
            return Some(self.text_until_next_tag(0));
        }

        match lex_markup(rest) {
            Some((token, consumed)) => {
                self.pos += consumed;
                if let Token::StartTag(tag) = &token {
                    let name = tag.local_name();
                    if !tag.self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                        self.raw_text_end = Some(name);
                    }
                }
                Some(token)
            }
            None => Some(self.text_until_next_tag(1)),
        }
    }
}

/// Characters allowed in tag names after the first letter.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// Byte offset of `</name` (ASCII case-insensitive) in `hay`.
fn find_end_tag(hay: &str, name: &str) -> Option<usize> {
    hay.match_indices("</").map(|(i, _)| i).find(|&i| {
        hay[i + 2..]
            .get(..name.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
    })
}

/// Lex a construct starting with `<`. Returns the token and bytes consumed.
fn lex_markup(rest: &str) -> Option<(Token<'_>, usize)> {
    if let Some(body) = rest.strip_prefix("<!--") {
        let consumed = body
            .find("-->")
            .map(|end| 4 + end + 3)
            .unwrap_or(rest.len());
        return Some((Token::Raw(&rest[..consumed]), consumed));
    }

    if rest.starts_with("<!") || rest.starts_with("<?") {
        let end = rest.find('>')?;
        return Some((Token::Raw(&rest[..=end]), end + 1));
    }

    if let Some(body) = rest.strip_prefix("</") {
        if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let name_len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
        let end = rest.find('>')?;
        let name = body[..name_len].to_ascii_lowercase();
        return Some((
            Token::EndTag {
                name,
                raw: &rest[..=end],
            },
            end + 1,
        ));
    }

    if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
        let (tag, consumed) = lex_start_tag(rest)?;
        return Some((Token::StartTag(tag), consumed));
    }

    None
}

/// Parse `<name attr="v" ...>` into a [`StartTag`], keeping all spacing.
fn lex_start_tag(rest: &str) -> Option<(StartTag, usize)> {
    let name_len = rest[1..]
        .find(|c: char| !is_name_char(c))
        .unwrap_or(rest.len() - 1);
    let name = rest[1..1 + name_len].to_string();
    let mut i = 1 + name_len;
    let mut attrs = Vec::new();

    loop {
        let lead_start = i;
        loop {
            let tail = &rest[i..];
            match tail.chars().next() {
                Some(c) if is_space(c) => i += 1,
                Some('/') if !tail[1..].starts_with('>') => i += 1,
                _ => break,
            }
        }
        let space = rest[lead_start..i].to_string();
        let tail = &rest[i..];

        if tail.is_empty() {
            return None;
        }
        if tail.starts_with('>') {
            return Some((StartTag::from_parts(name, attrs, space, false), i + 1));
        }
        if tail.starts_with("/>") {
            return Some((StartTag::from_parts(name, attrs, space, true), i + 2));
        }

        let mut attr_len = tail
            .find(|c: char| is_space(c) || matches!(c, '=' | '>' | '/'))
            .unwrap_or(tail.len());
        if attr_len == 0 {
            // a stray '=' becomes a one-character attribute name
            attr_len = tail.chars().next().map(char::len_utf8).unwrap_or(1);
        }
        let attr_name = tail[..attr_len].to_string();
        i += attr_len;

        let after_name = &rest[i..];
        let gap = after_name.len() - after_name.trim_start_matches(is_space).len();
        if !after_name[gap..].starts_with('=') {
            attrs.push(Attribute::from_parts(space, attr_name, None));
            continue;
        }

        let value_start = {
            let after_eq = &rest[i + gap + 1..];
            i + gap + 1 + (after_eq.len() - after_eq.trim_start_matches(is_space).len())
        };
        let separator = rest[i..value_start].to_string();
        let raw_value = &rest[value_start..];

        let (quote, text, consumed) = match raw_value.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let close = raw_value[1..].find(q)?;
                (Some(q), &raw_value[1..1 + close], close + 2)
            }
            Some(_) => {
                let len = raw_value
                    .find(|c: char| is_space(c) || c == '>')
                    .unwrap_or(raw_value.len());
                (None, &raw_value[..len], len)
            }
            None => return None,
        };

        attrs.push(Attribute::from_parts(
            space,
            attr_name,
            Some(AttrValue {
                separator,
                quote,
                text: text.to_string(),
            }),
        ));
        i = value_start + consumed;
    }
}
