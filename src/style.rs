//! Marker styles for additions and deletions.
//!
//! A style template is a LaTeX macro body with a single `#1` placeholder for
//! the marked text. The annotated body always uses the `\TexDiffAdd` and
//! `\TexDiffDel` markers; the header defines them from these templates.

use std::fmt;

use crate::error::ConfigError;

/// Which kind of change a style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Addition,
    Deletion,
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Addition => "addition",
            Self::Deletion => "deletion",
        })
    }
}

const ADDITION_STYLES: &[(&str, &str)] = &[("plain", "#1"), ("underline", r"\ul{#1}")];

const DELETION_STYLES: &[(&str, &str)] = &[
    ("none", ""),
    ("plain", "#1"),
    ("strike", r"\st{#1}"),
    ("underline", r"\ul{#1}"),
];

fn table(kind: StyleKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        StyleKind::Addition => ADDITION_STYLES,
        StyleKind::Deletion => DELETION_STYLES,
    }
}

/// Look up the macro template for a named style.
///
/// Names are matched case-insensitively.
///
/// # Errors
/// Returns [`ConfigError::UnknownStyle`] when `name` is not registered for
/// `kind`.
///
/// # Examples
///
/// ```
/// use texdiff::style::{StyleKind, style_for};
///
/// assert_eq!(style_for(StyleKind::Deletion, "Strike").unwrap(), r"\st{#1}");
/// assert!(style_for(StyleKind::Addition, "strike").is_err());
/// ```
pub fn style_for(kind: StyleKind, name: &str) -> Result<&'static str, ConfigError> {
    table(kind)
        .iter()
        .find(|(style, _)| style.eq_ignore_ascii_case(name))
        .map(|(_, template)| *template)
        .ok_or_else(|| ConfigError::UnknownStyle {
            kind,
            name: name.to_string(),
        })
}

/// Style names accepted for `kind`.
pub fn style_names(kind: StyleKind) -> impl Iterator<Item = &'static str> {
    table(kind).iter().map(|(name, _)| *name)
}

/// Validated pair of addition and deletion templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleConfig {
    addition: &'static str,
    deletion: &'static str,
}

impl StyleConfig {
    /// Resolve both style names up front.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownStyle`] for the first unknown name.
    pub fn new(addition: &str, deletion: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            addition: style_for(StyleKind::Addition, addition)?,
            deletion: style_for(StyleKind::Deletion, deletion)?,
        })
    }

    #[must_use]
    pub fn addition(&self) -> &'static str { self.addition }

    #[must_use]
    pub fn deletion(&self) -> &'static str { self.deletion }

    /// Whether either template needs the `soul` package.
    #[must_use]
    pub fn needs_soul(&self) -> bool {
        [self.addition, self.deletion]
            .iter()
            .any(|template| template.contains(r"\ul{") || template.contains(r"\st{"))
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            addition: r"\ul{#1}",
            deletion: r"\st{#1}",
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(StyleKind::Addition, "plain", "#1")]
    #[case(StyleKind::Addition, "underline", r"\ul{#1}")]
    #[case(StyleKind::Deletion, "none", "")]
    #[case(StyleKind::Deletion, "plain", "#1")]
    #[case(StyleKind::Deletion, "strike", r"\st{#1}")]
    #[case(StyleKind::Deletion, "UNDERLINE", r"\ul{#1}")]
    fn resolves_registered_styles(
        #[case] kind: StyleKind,
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(style_for(kind, name), Ok(expected));
    }

    #[rstest]
    #[case(StyleKind::Addition, "none")]
    #[case(StyleKind::Addition, "strike")]
    #[case(StyleKind::Deletion, "bold")]
    #[case(StyleKind::Deletion, "")]
    fn rejects_unknown_styles(#[case] kind: StyleKind, #[case] name: &str) {
        assert_eq!(
            style_for(kind, name),
            Err(ConfigError::UnknownStyle {
                kind,
                name: name.to_string(),
            })
        );
    }

    #[test]
    fn every_listed_name_resolves() {
        for kind in [StyleKind::Addition, StyleKind::Deletion] {
            for name in style_names(kind) {
                let template = style_for(kind, name).expect("listed style resolves");
                assert!(template.is_empty() || template.contains("#1"));
            }
        }
    }

    #[test]
    fn config_reports_first_bad_name() {
        let err = StyleConfig::new("wavy", "none").expect_err("unknown addition style");
        assert_eq!(
            err,
            ConfigError::UnknownStyle {
                kind: StyleKind::Addition,
                name: "wavy".into(),
            }
        );
        assert!(StyleConfig::new("plain", "none").is_ok());
    }

    #[test]
    fn soul_only_when_templates_use_it() {
        assert!(StyleConfig::default().needs_soul());
        let plain = StyleConfig::new("plain", "none").expect("valid");
        assert!(!plain.needs_soul());
    }
}
