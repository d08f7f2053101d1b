//! Tokenization of LaTeX source for the annotation pass.
//!
//! The tokenizer knows just enough about LaTeX to find the places where a
//! change marker could break nesting: command names, braces and the literal
//! text in between. Anything it does not recognise falls through as a single
//! character so the driving loop always makes progress.

use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = lazy_regex!(
    r"^(?s:\\([A-Za-z@*]+)|([{}])|([^\\{}]+)|(.))",
    "token pattern regex should compile"
);

/// Classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A backslash followed by letters, `@` or `*`, e.g. `\section*`.
    CommandName,
    /// A single `{`.
    OpenBrace,
    /// A single `}`.
    CloseBrace,
    /// A maximal run without backslashes or braces.
    Literal,
    /// Any other single character, such as a lone backslash.
    Fallback,
}

/// A slice of LaTeX source with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    #[must_use]
    pub fn new(text: &'a str, kind: TokenKind) -> Self { Self { text, kind } }

    /// Command name without the leading backslash.
    ///
    /// Returns `None` for tokens that are not command names.
    #[must_use]
    pub fn command(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::CommandName => self.text.strip_prefix('\\'),
            _ => None,
        }
    }

    /// Whether the token opens or closes a context or names a command.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::CommandName | TokenKind::OpenBrace | TokenKind::CloseBrace
        )
    }

    #[must_use]
    pub fn is_whitespace(&self) -> bool { self.text.chars().all(char::is_whitespace) }
}

/// Split the next token off `text`.
///
/// Returns `None` only when `text` is empty. The returned token is never
/// empty, so repeated application always terminates.
///
/// # Examples
///
/// ```
/// use texdiff::tokenize::{TokenKind, next_token};
///
/// let (token, rest) = next_token(r"\cite{a}").expect("non-empty input");
/// assert_eq!(token.kind, TokenKind::CommandName);
/// assert_eq!(token.text, r"\cite");
/// assert_eq!(rest, "{a}");
/// ```
#[must_use]
pub fn next_token(text: &str) -> Option<(Token<'_>, &str)> {
    if text.is_empty() {
        return None;
    }
    let caps = TOKEN_RE.captures(text)?;
    let whole = caps.get(0)?;
    let kind = if caps.get(1).is_some() {
        TokenKind::CommandName
    } else if caps.get(2).is_some() {
        if whole.as_str() == "{" {
            TokenKind::OpenBrace
        } else {
            TokenKind::CloseBrace
        }
    } else if caps.get(3).is_some() {
        TokenKind::Literal
    } else {
        TokenKind::Fallback
    };
    let (head, rest) = text.split_at(whole.end());
    Some((Token::new(head, kind), rest))
}

/// Iterator over the tokens of a string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self { Self { rest: text } }

    /// Text not yet consumed by the iterator.
    #[must_use]
    pub fn remainder(&self) -> &'a str { self.rest }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (token, rest) = next_token(self.rest)?;
        self.rest = rest;
        Some(token)
    }
}

/// Collect every token of `text`.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token<'_>> { Tokens::new(text).collect() }

/// Split a leading brace group off `text`.
///
/// Returns the group's content without its outer braces and the text after
/// the closing brace, or `None` when `text` does not start with `{` or the
/// group never closes.
///
/// # Examples
///
/// ```
/// use texdiff::tokenize::split_group;
///
/// assert_eq!(split_group("{a {b}} c"), Some(("a {b}", " c")));
/// assert_eq!(split_group("{open"), None);
/// ```
#[must_use]
pub fn split_group(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('{')?;
    let mut depth = 1_usize;
    let mut rest = inner;
    while let Some((token, after)) = next_token(rest) {
        match token.kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => {
                depth -= 1;
                if depth == 0 {
                    let end = inner.len() - rest.len();
                    return Some((&inner[..end], after));
                }
            }
            _ => {}
        }
        rest = after;
    }
    None
}
