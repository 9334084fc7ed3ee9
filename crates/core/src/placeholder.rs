//! Placeholder token matching in template text.

use crate::error::{Error, Result};
use regex::Regex;

/// A piece of template text: either literal text or a placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// A compiled set of placeholder tokens such as `[HOOK]` or `[CTA_SUB]`.
#[derive(Debug, Clone)]
pub struct PlaceholderSet {
    tokens: Vec<String>,
    pattern: Option<Regex>,
}

impl PlaceholderSet {
    /// Compile a set of tokens. Longer tokens are tried first.
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.is_empty())
            .collect();
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens.dedup();

        let pattern = if tokens.is_empty() {
            None
        } else {
            let alternation = tokens
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&format!("({})", alternation))
                .map_err(|e| Error::ConfigError(format!("Invalid placeholder set: {}", e)))?;
            Some(regex)
        };

        Ok(Self { tokens, pattern })
    }

    /// The tokens in match priority order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether `text` contains any placeholder.
    pub fn contains_any(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// Split `text` into literal and placeholder tokens, in order.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let Some(pattern) = &self.pattern else {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Token::Literal(text)]
            };
        };

        let mut tokens = Vec::new();
        let mut last = 0;
        for m in pattern.find_iter(text) {
            if m.start() > last {
                tokens.push(Token::Literal(&text[last..m.start()]));
            }
            tokens.push(Token::Placeholder(m.as_str()));
            last = m.end();
        }
        if last < text.len() {
            tokens.push(Token::Literal(&text[last..]));
        }
        tokens
    }
}
