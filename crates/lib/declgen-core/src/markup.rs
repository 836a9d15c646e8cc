//! Minimal HTML tokenizer producing start-tag, end-tag and text events.
//!
//! This is not a DOM parser. It recognizes just enough markup to walk a
//! Doxygen reference page in document order: tags with their attributes, and
//! the text between them. Comments, doctype declarations and processing
//! instructions are dropped. `script` and `style` bodies are delivered as one
//! opaque text event.

use std::borrow::Cow;
use std::sync::LazyLock;

use logos::{Lexer, Logos};
use regex::{Captures, Regex};

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'=/>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*);").expect("valid entity regex")
});

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[token("<!--", bump_comment)]
    Comment,

    #[regex(r"<![A-Za-z\[][^>]*>")]
    Declaration,

    #[regex(r"<\?[^>]*>")]
    Instruction,

    #[regex(r"<[A-Za-z][^>]*>")]
    StartTag,

    #[regex(r"</[A-Za-z][^>]*>")]
    EndTag,

    #[regex(r"[^<]+")]
    Text,

    #[token("<")]
    Stray,
}

fn bump_comment(lex: &mut Lexer<'_, RawToken>) {
    let rest = lex.remainder();
    let len = rest.find("-->").map_or(rest.len(), |end| end + 3);
    lex.bump(len);
}

/// A single attribute on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A tokenizer event in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
    },
    EndTag {
        name: String,
    },
    Text(String),
}

impl MarkupEvent {
    /// Looks up an attribute value on a start tag.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::StartTag { attributes, .. } => attributes
                .iter()
                .find(|attribute| attribute.name == name)
                .map(|attribute| attribute.value.as_str()),
            _ => None,
        }
    }

    pub fn is_start_of(&self, tag: &str) -> bool {
        matches!(self, Self::StartTag { name, .. } if name == tag)
    }

    pub fn is_end_of(&self, tag: &str) -> bool {
        matches!(self, Self::EndTag { name } if name == tag)
    }
}

/// Iterator over the events of one markup document.
pub struct MarkupEvents<'s> {
    lexer: Lexer<'s, RawToken>,
    raw_text_close: Option<String>,
}

/// Tokenizes `markup` lazily.
pub fn events(markup: &str) -> MarkupEvents<'_> {
    MarkupEvents {
        lexer: RawToken::lexer(markup),
        raw_text_close: None,
    }
}

impl Iterator for MarkupEvents<'_> {
    type Item = MarkupEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(closing) = self.raw_text_close.take() {
            let rest = self.lexer.remainder();
            let end = find_ignore_ascii_case(rest, &closing).unwrap_or(rest.len());
            let content = rest[..end].to_string();
            self.lexer.bump(end);
            if !content.is_empty() {
                return Some(MarkupEvent::Text(content));
            }
        }

        loop {
            let token = self.lexer.next()?;
            let slice = self.lexer.slice();
            match token {
                Ok(RawToken::StartTag) => {
                    let event = parse_start_tag(slice);
                    if let MarkupEvent::StartTag { name, .. } = &event
                        && RAW_TEXT_ELEMENTS.contains(&name.as_str())
                    {
                        self.raw_text_close = Some(format!("</{name}"));
                    }
                    return Some(event);
                }
                Ok(RawToken::EndTag) => {
                    let inner = &slice[2..slice.len() - 1];
                    return Some(MarkupEvent::EndTag {
                        name: tag_name(inner),
                    });
                }
                Ok(RawToken::Text | RawToken::Stray) | Err(_) => {
                    return Some(MarkupEvent::Text(decode_entities(slice).into_owned()));
                }
                Ok(RawToken::Comment | RawToken::Declaration | RawToken::Instruction) => {}
            }
        }
    }
}

/// Byte offset of the first ASCII case-insensitive match of `needle`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn tag_name(inner: &str) -> String {
    inner
        .split(|ch: char| ch.is_whitespace() || ch == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn parse_start_tag(slice: &str) -> MarkupEvent {
    let inner = &slice[1..slice.len() - 1];
    let name = tag_name(inner);
    let rest = &inner[name.len()..];
    let attributes = ATTRIBUTE_RE
        .captures_iter(rest)
        .map(|caps| Attribute {
            name: caps[1].to_ascii_lowercase(),
            value: caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|value| decode_entities(value.as_str()).into_owned())
                .unwrap_or_default(),
        })
        .collect();
    MarkupEvent::StartTag { name, attributes }
}

/// Decodes the common named character references and numeric references.
/// Unknown references are left as written.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY_RE.replace_all(text, |caps: &Captures<'_>| {
        let reference = &caps[1];
        decode_reference(reference).map_or_else(|| caps[0].to_string(), String::from)
    })
}

fn decode_reference(reference: &str) -> Option<char> {
    if let Some(numeric) = reference.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match reference {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
