//! Highlighting grammar for the flow DSL
//!
//! The grammar is a plain value handed to whatever highlighter the host
//! uses. Nothing is registered globally; a host that wants different colors
//! or extra rules builds its own `Grammar`.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"#.*").unwrap());
static KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:flow|task|description)\b").unwrap());
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\{\w+\}|"(?:[^"\\]|\\.)*""#).unwrap());
static ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+>").unwrap());
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}:]").unwrap());

/// Token classes a highlighter maps to styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Comment,
    Keyword,
    String,
    Arrow,
    Punctuation,
    /// Anything no rule claimed
    Text,
}

impl TokenKind {
    /// CSS-style class name (`token keyword`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Comment => "comment",
            TokenKind::Keyword => "keyword",
            TokenKind::String => "string",
            TokenKind::Arrow => "arrow",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenRule {
    pub kind: TokenKind,
    pub pattern: Regex,
}

/// A classified slice of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'t> {
    pub kind: TokenKind,
    pub text: &'t str,
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct Grammar {
    /// Primary language tag, e.g. `dsl`
    pub language: String,
    /// Other tags the same grammar answers to
    pub aliases: Vec<String>,
    /// Earlier rules win when two matches start at the same offset
    pub rules: Vec<TokenRule>,
}

impl Grammar {
    pub fn new(language: impl Into<String>, rules: Vec<TokenRule>) -> Self {
        Self {
            language: language.into(),
            aliases: Vec::new(),
            rules,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Grammar of the flow DSL, tagged `dsl` with alias `flow`
    pub fn flow() -> Self {
        let rule = |kind, pattern: &Lazy<Regex>| TokenRule {
            kind,
            pattern: Regex::clone(pattern),
        };
        Self::new(
            "dsl",
            vec![
                rule(TokenKind::Comment, &COMMENT),
                rule(TokenKind::Keyword, &KEYWORD),
                rule(TokenKind::String, &STRING),
                rule(TokenKind::Arrow, &ARROW),
                rule(TokenKind::Punctuation, &PUNCTUATION),
            ],
        )
        .with_alias("flow")
    }

    /// Whether a code block tagged `tag` should use this grammar
    pub fn handles(&self, tag: &str) -> bool {
        self.language == tag || self.aliases.iter().any(|alias| alias == tag)
    }

    /// Split `text` into tokens covering every byte, in order.
    ///
    /// At each offset the earliest match of any rule is taken; gaps become
    /// `Text` tokens.
    pub fn tokenize<'t>(&self, text: &'t str) -> Vec<Token<'t>> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let mut best: Option<(TokenKind, Range<usize>)> = None;
            for rule in &self.rules {
                let Some(found) = rule.pattern.find_at(text, pos) else {
                    continue;
                };
                if found.start() == found.end() {
                    continue;
                }
                let earlier = best
                    .as_ref()
                    .map_or(true, |(_, span)| found.start() < span.start);
                if earlier {
                    best = Some((rule.kind, found.range()));
                }
            }

            let Some((kind, span)) = best else {
                tokens.push(Token {
                    kind: TokenKind::Text,
                    text: &text[pos..],
                    span: pos..text.len(),
                });
                break;
            };

            if span.start > pos {
                tokens.push(Token {
                    kind: TokenKind::Text,
                    text: &text[pos..span.start],
                    span: pos..span.start,
                });
            }
            pos = span.end;
            tokens.push(Token {
                kind,
                text: &text[span.clone()],
                span,
            });
        }

        tokens
    }
}
