//! High-level document processing.

use rayon::prelude::*;
use tracing::debug;

use crate::{
    annotate::annotate,
    diff::{Granularity, diff_texts},
    error::StructuralError,
    header::{info_header, style_header},
    style::StyleConfig,
};

/// Settings for one annotation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub styles: StyleConfig,
    pub granularity: Granularity,
}

/// Diff two texts and annotate the result.
///
/// # Errors
/// Returns a [`StructuralError`] when the combined text does not nest.
///
/// # Examples
///
/// ```
/// use texdiff::{diff::Granularity, markers::accept_changes, process::annotate_texts};
///
/// let old = r"\begin{document}The fox.\end{document}";
/// let new = r"\begin{document}The red fox.\end{document}";
/// let body = annotate_texts(old, new, Granularity::Words).unwrap();
/// assert!(body.contains(r"\TexDiffAdd{"));
/// assert_eq!(accept_changes(&body), new);
/// ```
pub fn annotate_texts(
    old: &str,
    new: &str,
    granularity: Granularity,
) -> Result<String, StructuralError> {
    let ops = diff_texts(old, new, granularity);
    debug!(ops = ops.len(), %granularity, "diffed inputs");
    annotate(&ops)
}

/// Build the complete annotated document: headers followed by the body.
///
/// # Errors
/// Returns a [`StructuralError`] when the combined text does not nest.
pub fn render_document(
    old_label: &str,
    new_label: &str,
    old: &str,
    new: &str,
    options: &Options,
) -> Result<String, StructuralError> {
    let body = annotate_texts(old, new, options.granularity)?;
    let mut out = info_header(old_label, new_label);
    out.push_str(&style_header(&options.styles));
    out.push_str(&body);
    Ok(out)
}

/// Annotate independent `(old, new)` pairs in parallel.
///
/// Results are returned in input order.
#[must_use]
pub fn annotate_pairs(
    pairs: &[(String, String)],
    granularity: Granularity,
) -> Vec<Result<String, StructuralError>> {
    pairs
        .par_iter()
        .map(|(old, new)| annotate_texts(old, new, granularity))
        .collect()
}
