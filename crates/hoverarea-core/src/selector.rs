//! CSS selector subset used to resolve element references.
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`, `[attr=value]` (quoted
//! or bare), the descendant and child combinators, and comma-separated groups. Matching is
//! right-to-left with backtracking over ancestors.

use crate::dom::{Document, NodeId};
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    /// ASCII-lowercase tag name.
    Type(String),
    Universal,
    Class(String),
    Id(String),
    AttrExists(String),
    AttrEquals { name: String, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self> {
        let mut selectors = Vec::new();
        for part in split_groups(input) {
            selectors.push(Parser::new(input, part).complex()?);
        }
        Ok(Self { selectors })
    }

    pub fn matches(&self, doc: &Document, element: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(doc, element))
    }
}

impl ComplexSelector {
    fn compound_at(&self, index: usize) -> &CompoundSelector {
        if index == 0 {
            &self.first
        } else {
            &self.rest[index - 1].1
        }
    }

    pub fn matches(&self, doc: &Document, element: NodeId) -> bool {
        self.matches_from(doc, element, self.rest.len())
    }

    fn matches_from(&self, doc: &Document, element: NodeId, index: usize) -> bool {
        if !self.compound_at(index).matches(doc, element) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let combinator = self.rest[index - 1].0;
        let mut ancestor = doc.parent(element);
        while let Some(candidate) = ancestor {
            if doc.element(candidate).is_none() {
                return false;
            }
            if self.matches_from(doc, candidate, index - 1) {
                return true;
            }
            if combinator == Combinator::Child {
                return false;
            }
            ancestor = doc.parent(candidate);
        }
        false
    }
}

impl CompoundSelector {
    pub fn matches(&self, doc: &Document, element: NodeId) -> bool {
        let Some(el) = doc.element(element) else {
            return false;
        };
        self.simples.iter().all(|simple| match simple {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(tag) => el.tag == *tag,
            SimpleSelector::Class(class) => el.has_class(class),
            SimpleSelector::Id(id) => el.attrs.get("id").is_some_and(|v| v == id),
            SimpleSelector::AttrExists(name) => el.attrs.contains_key(name),
            SimpleSelector::AttrEquals { name, value } => {
                el.attrs.get(name).is_some_and(|v| v == value)
            }
        })
    }
}

struct Parser<'a> {
    whole: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(whole: &'a str, part: &'a str) -> Self {
        Self {
            whole,
            chars: part.chars().peekable(),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::InvalidSelector {
            selector: self.whole.to_string(),
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut saw = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            saw = true;
        }
        saw
    }

    fn complex(&mut self) -> Result<ComplexSelector> {
        self.skip_whitespace();
        let first = self.compound()?;
        let mut rest = Vec::new();
        loop {
            let saw_space = self.skip_whitespace();
            let combinator = match self.chars.peek().copied() {
                None => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if saw_space => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected character `{c}`"))),
            };
            rest.push((combinator, self.compound()?));
        }
        Ok(ComplexSelector { first, rest })
    }

    fn compound(&mut self) -> Result<CompoundSelector> {
        let mut simples = Vec::new();
        while let Some(&c) = self.chars.peek() {
            let simple = match c {
                '*' => {
                    self.chars.next();
                    SimpleSelector::Universal
                }
                '.' => {
                    self.chars.next();
                    SimpleSelector::Class(self.ident("class name")?)
                }
                '#' => {
                    self.chars.next();
                    SimpleSelector::Id(self.ident("id")?)
                }
                '[' => {
                    self.chars.next();
                    self.attribute()?
                }
                c if is_ident_char(c) => {
                    SimpleSelector::Type(self.ident("tag name")?.to_ascii_lowercase())
                }
                _ => break,
            };
            simples.push(simple);
        }
        if simples.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(CompoundSelector { simples })
    }

    fn ident(&mut self, what: &str) -> Result<String> {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        if out.is_empty() {
            return Err(self.error(format!("expected {what}")));
        }
        Ok(out)
    }

    fn attribute(&mut self) -> Result<SimpleSelector> {
        self.skip_whitespace();
        let name = self.ident("attribute name")?.to_ascii_lowercase();
        self.skip_whitespace();
        match self.chars.next() {
            Some(']') => Ok(SimpleSelector::AttrExists(name)),
            Some('=') => {
                self.skip_whitespace();
                let value = match self.chars.peek() {
                    Some(&quote @ ('"' | '\'')) => {
                        self.chars.next();
                        self.quoted(quote)?
                    }
                    _ => self.ident("attribute value")?,
                };
                self.skip_whitespace();
                match self.chars.next() {
                    Some(']') => Ok(SimpleSelector::AttrEquals { name, value }),
                    _ => Err(self.error("unterminated attribute selector")),
                }
            }
            _ => Err(self.error("unterminated attribute selector")),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String> {
        let mut out = String::new();
        for c in self.chars.by_ref() {
            if c == quote {
                return Ok(out);
            }
            out.push(c);
        }
        Err(self.error("unterminated string"))
    }
}

/// Splits a selector list at commas that are outside quotes and attribute brackets.
fn split_groups(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut in_brackets = false;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if in_brackets => quote = Some(c),
            (None, '[') => in_brackets = true,
            (None, ']') => in_brackets = false,
            (None, ',') if !in_brackets => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
