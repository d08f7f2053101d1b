//! Sequence diff between two document texts.
//!
//! The annotation pass only needs an ordered list of equal, inserted and
//! deleted runs. This module produces one with `similar`, coalescing adjacent
//! changes of the same kind, then shifts change boundaries so they do not
//! split a command name from itself or from its argument.

use std::{fmt, str::FromStr, sync::LazyLock, time::Duration};

use regex::Regex;
use similar::{Algorithm, ChangeTag, TextDiff};
use tracing::trace;

use crate::tokenize::split_group;

const DIFF_TIMEOUT: Duration = Duration::from_secs(2);

/// A command name, possibly incomplete, at the end of a string.
///
/// The backslash must not itself be escaped, so the second half of a `\\`
/// line break never starts a command.
static TRAILING_COMMAND_RE: LazyLock<Regex> = lazy_regex!(
    r"(?:^|[^\\])(?:\\\\)*(\\[A-Za-z@*]*)$",
    "trailing command regex should compile"
);

/// Kind of a [`DiffOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Equal,
    Insert,
    Delete,
}

/// One run of the diff between the old and new text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOp {
    pub kind: OpKind,
    pub text: String,
}

impl DiffOp {
    pub fn new(kind: OpKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn equal(text: impl Into<String>) -> Self { Self::new(OpKind::Equal, text) }

    pub fn insert(text: impl Into<String>) -> Self { Self::new(OpKind::Insert, text) }

    pub fn delete(text: impl Into<String>) -> Self { Self::new(OpKind::Delete, text) }
}

/// Unit the diff operates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Chars,
    Words,
    Lines,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chars" | "char" => Ok(Self::Chars),
            "words" | "word" => Ok(Self::Words),
            "lines" | "line" => Ok(Self::Lines),
            other => Err(format!(
                "unknown granularity `{other}` (expected chars, words or lines)"
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Chars => "chars",
            Self::Words => "words",
            Self::Lines => "lines",
        })
    }
}

/// Diff `old` against `new`.
///
/// The returned ops cover both texts without gaps: concatenating the equal
/// and inserted runs yields `new`, the equal and deleted runs yield `old`.
///
/// # Examples
///
/// ```
/// use texdiff::diff::{DiffOp, Granularity, diff_texts};
///
/// let ops = diff_texts("a b", "a c", Granularity::Chars);
/// assert_eq!(
///     ops,
///     vec![DiffOp::equal("a "), DiffOp::delete("b"), DiffOp::insert("c")]
/// );
/// ```
#[must_use]
pub fn diff_texts(old: &str, new: &str, granularity: Granularity) -> Vec<DiffOp> {
    let mut config = TextDiff::configure();
    config.algorithm(Algorithm::Myers).timeout(DIFF_TIMEOUT);
    let diff = match granularity {
        Granularity::Chars => config.diff_chars(old, new),
        Granularity::Words => config.diff_words(old, new),
        Granularity::Lines => config.diff_lines(old, new),
    };

    let mut ops: Vec<DiffOp> = Vec::new();
    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => OpKind::Equal,
            ChangeTag::Insert => OpKind::Insert,
            ChangeTag::Delete => OpKind::Delete,
        };
        match ops.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => ops.push(DiffOp::new(kind, change.value())),
        }
    }
    align_to_markup(ops)
}

fn is_name_char(c: char) -> bool { c.is_ascii_alphabetic() || c == '@' || c == '*' }

fn starts_with_name_char(text: &str) -> bool { text.chars().next().is_some_and(is_name_char) }

/// Byte offset where a trailing, possibly incomplete, command name starts.
fn command_start(text: &str) -> Option<usize> {
    TRAILING_COMMAND_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.start())
}

fn ends_with_command(text: &str) -> bool {
    command_start(text).is_some_and(|start| text.len() - start > 1)
}

fn ends_with_escape(text: &str) -> bool {
    command_start(text).is_some_and(|start| text.len() - start == 1)
}

fn absorb(op: DiffOp, old: &mut String, new: &mut String) {
    match op.kind {
        OpKind::Delete => old.push_str(&op.text),
        _ => new.push_str(&op.text),
    }
}

/// Move unchanged text into neighbouring changes so that every command name
/// lies within a single op and a changed command name carries its argument.
///
/// Each run of changes becomes at most one deletion followed by one
/// insertion. The text moved into a change is added to both sides, so the
/// ops still rebuild both inputs.
///
/// # Examples
///
/// ```
/// use texdiff::diff::{DiffOp, align_to_markup};
///
/// let ops = vec![
///     DiffOp::equal(r"\s"),
///     DiffOp::insert("ubs"),
///     DiffOp::equal("ection{Intro}"),
/// ];
/// assert_eq!(
///     align_to_markup(ops),
///     vec![
///         DiffOp::delete(r"\section{Intro}"),
///         DiffOp::insert(r"\subsection{Intro}"),
///     ]
/// );
/// ```
#[must_use]
pub fn align_to_markup(ops: Vec<DiffOp>) -> Vec<DiffOp> {
    let mut out: Vec<DiffOp> = Vec::with_capacity(ops.len());
    let mut ops = ops.into_iter().peekable();
    while let Some(op) = ops.next() {
        if op.kind == OpKind::Equal {
            out.push(op);
            continue;
        }
        let mut old = String::new();
        let mut new = String::new();
        absorb(op, &mut old, &mut new);
        while let Some(change) = ops.next_if(|op| op.kind != OpKind::Equal) {
            absorb(change, &mut old, &mut new);
        }

        if let Some(prev) = out.last_mut().filter(|prev| prev.kind == OpKind::Equal)
            && let Some(start) = command_start(&prev.text)
        {
            let partial = &prev.text[start..];
            if let Some(next) = ops.peek_mut().filter(|next| next.kind == OpKind::Equal)
                && [&old, &new]
                    .iter()
                    .all(|side| side.is_empty() || side.ends_with(partial))
            {
                // Slide the change left so it starts at the command instead
                // of ending inside it.
                let head = prev.text.split_off(start);
                trace!(head = head.as_str(), "sliding change onto command boundary");
                for side in [&mut old, &mut new] {
                    if !side.is_empty() {
                        side.truncate(side.len() - head.len());
                        side.insert_str(0, &head);
                    }
                }
                next.text.insert_str(0, &head);
            } else if partial == "\\"
                || starts_with_name_char(&old)
                || starts_with_name_char(&new)
            {
                let head = prev.text.split_off(start);
                trace!(head = head.as_str(), "moving command prefix into change");
                old.insert_str(0, &head);
                new.insert_str(0, &head);
            }
        }
        if out
            .last()
            .is_some_and(|prev| prev.kind == OpKind::Equal && prev.text.is_empty())
        {
            out.pop();
            while let Some(prior) = out.pop_if(|op| op.kind != OpKind::Equal) {
                match prior.kind {
                    OpKind::Delete => old.insert_str(0, &prior.text),
                    _ => new.insert_str(0, &prior.text),
                }
            }
        }

        // An equal run swallowed whole joins the changes on both sides of it
        // into one run, which may in turn end inside another command.
        while let Some(next) = ops.peek_mut().filter(|next| next.kind == OpKind::Equal) {
            let before = next.text.len();
            if command_start(&old).is_some() || command_start(&new).is_some() {
                let mut end = next
                    .text
                    .find(|c: char| !is_name_char(c))
                    .unwrap_or(next.text.len());
                if end == 0 && (ends_with_escape(&old) || ends_with_escape(&new)) {
                    // A lone backslash escapes the character after it.
                    end = next
                        .text
                        .chars()
                        .next()
                        .filter(|c| !matches!(c, '{' | '}'))
                        .map_or(0, char::len_utf8);
                }
                let tail: String = next.text.drain(..end).collect();
                old.push_str(&tail);
                new.push_str(&tail);
            }
            if (ends_with_command(&old) || ends_with_command(&new))
                && let Some((_, rest)) = split_group(&next.text)
            {
                let end = next.text.len() - rest.len();
                let group: String = next.text.drain(..end).collect();
                trace!(group = group.as_str(), "moving command argument into change");
                old.push_str(&group);
                new.push_str(&group);
            }
            if next.text.is_empty() {
                ops.next();
                while let Some(change) = ops.next_if(|op| op.kind != OpKind::Equal) {
                    absorb(change, &mut old, &mut new);
                }
                continue;
            }
            if next.text.len() == before {
                break;
            }
        }

        out.push(DiffOp::delete(old));
        out.push(DiffOp::insert(new));
    }
    out.retain(|op| !op.text.is_empty());
    out
}
