//! Headers prepended to the annotated document.
//!
//! The informational header is a block of `%` comment lines. The style header
//! defines the change markers from the configured templates.

use crate::{
    markers::{ADDITION_MARKER, DELETION_MARKER},
    policy::fragile_commands,
    style::StyleConfig,
};

/// Comment block naming the tool and both inputs.
#[must_use]
pub fn info_header(old_label: &str, new_label: &str) -> String {
    format!(
        "% Generated by {name} {version}\n% Old: {old_label}\n% New: {new_label}\n%\n",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    )
}

/// Preamble lines defining `\TexDiffAdd` and `\TexDiffDel`.
///
/// `soul` is loaded only when a template uses `\ul` or `\st`; the fragile
/// commands are then registered with it so they survive inside a marker.
#[must_use]
pub fn style_header(styles: &StyleConfig) -> String {
    let mut out = String::new();
    if styles.needs_soul() {
        out.push_str("\\RequirePackage{soul}\n");
    }
    for (marker, template) in [
        (ADDITION_MARKER, styles.addition()),
        (DELETION_MARKER, styles.deletion()),
    ] {
        out.push_str(&format!("\\providecommand{{{marker}}}[1]{{{template}}}\n"));
    }
    if styles.needs_soul() {
        out.push_str("\\AtBeginDocument{%\n");
        for command in fragile_commands() {
            out.push_str(&format!(
                "  \\ifdefined\\{command}\\soulregister\\{command}7\\fi\n"
            ));
        }
        out.push_str("}\n");
    }
    out
}
