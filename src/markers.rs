//! Change markers in the annotated body.
//!
//! Additions are written as `\TexDiffAdd{...}` and deletions as
//! `\TexDiffDel{...}`. The helpers here resolve an annotated body back into
//! one of its inputs by keeping one kind of marker's content and dropping the
//! other. Changes written without a marker (at the document root, in
//! `\begin`/`\end` arguments, or inside silent environments) cannot be told
//! apart from unchanged text and stay as they are.

use crate::{
    style::StyleKind,
    tokenize::{TokenKind, next_token, split_group},
};

pub const ADDITION_MARKER: &str = r"\TexDiffAdd";
pub const DELETION_MARKER: &str = r"\TexDiffDel";

#[must_use]
pub fn marker_for(kind: StyleKind) -> &'static str {
    match kind {
        StyleKind::Addition => ADDITION_MARKER,
        StyleKind::Deletion => DELETION_MARKER,
    }
}

/// Keep additions and drop deletions, recovering the new document.
///
/// # Examples
///
/// ```
/// use texdiff::markers::accept_changes;
///
/// let body = r"A \TexDiffDel{red}\TexDiffAdd{blue} fox";
/// assert_eq!(accept_changes(body), "A blue fox");
/// ```
#[must_use]
pub fn accept_changes(body: &str) -> String { resolve(body, ADDITION_MARKER, DELETION_MARKER) }

/// Keep deletions and drop additions, recovering the old document.
#[must_use]
pub fn reject_changes(body: &str) -> String { resolve(body, DELETION_MARKER, ADDITION_MARKER) }

fn resolve(body: &str, keep: &str, drop: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some((token, after)) = next_token(rest) {
        if token.kind == TokenKind::CommandName
            && (token.text == keep || token.text == drop)
            && let Some((argument, tail)) = split_group(after)
        {
            if token.text == keep {
                out.push_str(&resolve(argument, keep, drop));
            }
            rest = tail;
            continue;
        }
        out.push_str(token.text);
        rest = after;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_match_style_kinds() {
        assert_eq!(marker_for(StyleKind::Addition), r"\TexDiffAdd");
        assert_eq!(marker_for(StyleKind::Deletion), r"\TexDiffDel");
    }

    #[test]
    fn accept_unwraps_nested_groups() {
        let body = r"\TexDiffAdd{\textbf{x} {y}}z\TexDiffDel{\emph{w}}";
        assert_eq!(accept_changes(body), r"\textbf{x} {y}z");
        assert_eq!(reject_changes(body), r"z\emph{w}");
    }

    #[test]
    fn unclosed_marker_is_left_verbatim() {
        let body = r"a \TexDiffAdd{b";
        assert_eq!(accept_changes(body), body);
    }

    #[test]
    fn similar_command_names_are_untouched() {
        let body = r"\TexDiffAddition{x} \TexDiffAdd {y}";
        assert_eq!(accept_changes(body), body);
    }

    #[test]
    fn text_without_markers_is_unchanged() {
        let body = "\\begin{document}\nplain\n\\end{document}\n";
        assert_eq!(accept_changes(body), body);
        assert_eq!(reject_changes(body), body);
    }
}
