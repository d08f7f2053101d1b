//! Error types shared by the annotation pass and its configuration.

use thiserror::Error;

use crate::style::StyleKind;

/// Malformed nesting detected while tracking the document structure.
///
/// Any of these aborts the current pass: once the stack disagrees with the
/// text, later placement decisions would be meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("unmatched '}}' encountered")]
    UnmatchedClose,
    #[error("extra \\end{{{name}}} with no open environment")]
    ExtraEnd { name: String },
    #[error("environment mismatch: expected \\end{{{expected}}}, got \\end{{{found}}}")]
    EnvironmentMismatch { expected: String, found: String },
    #[error("command \\{command} missing its brace argument")]
    MissingArgument { command: String },
}

/// Invalid configuration, reported before any diffing starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown {kind} style `{name}`")]
    UnknownStyle { kind: StyleKind, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_messages_quote_latex() {
        assert_eq!(
            StructuralError::ExtraEnd { name: "foo".into() }.to_string(),
            r"extra \end{foo} with no open environment"
        );
        assert_eq!(
            StructuralError::EnvironmentMismatch {
                expected: "itemize".into(),
                found: "enumerate".into(),
            }
            .to_string(),
            r"environment mismatch: expected \end{itemize}, got \end{enumerate}"
        );
        assert_eq!(
            StructuralError::UnmatchedClose.to_string(),
            "unmatched '}' encountered"
        );
    }

    #[test]
    fn config_message_names_the_kind() {
        let err = ConfigError::UnknownStyle {
            kind: StyleKind::Deletion,
            name: "wavy".into(),
        };
        assert_eq!(err.to_string(), "unknown deletion style `wavy`");
    }
}
