//! Name-keyed policy tables for environments and commands.
//!
//! Adding a math-like environment or another command whose argument must
//! stay intact is a matter of extending one of the tables below.

/// How changes inside an environment are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentPolicy {
    /// Changes are wrapped in markers as usual.
    Annotate,
    /// Insertions are applied unmarked and deletions are dropped.
    Silent,
}

/// How changes inside a command's brace argument are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPolicy {
    /// Markers may sit inside the argument.
    Inline,
    /// The argument must stay intact; the whole invocation is rebuilt and
    /// wrapped instead.
    Reconstruct,
    /// The argument is part of the document structure and is never marked.
    Structural,
}

const ENVIRONMENT_POLICIES: &[(&str, EnvironmentPolicy)] = &[
    ("equation", EnvironmentPolicy::Silent),
    ("equation*", EnvironmentPolicy::Silent),
    ("align", EnvironmentPolicy::Silent),
    ("align*", EnvironmentPolicy::Silent),
    ("alignat", EnvironmentPolicy::Silent),
    ("alignat*", EnvironmentPolicy::Silent),
    ("flalign", EnvironmentPolicy::Silent),
    ("flalign*", EnvironmentPolicy::Silent),
    ("gather", EnvironmentPolicy::Silent),
    ("gather*", EnvironmentPolicy::Silent),
    ("multline", EnvironmentPolicy::Silent),
    ("multline*", EnvironmentPolicy::Silent),
    ("eqnarray", EnvironmentPolicy::Silent),
    ("eqnarray*", EnvironmentPolicy::Silent),
    ("math", EnvironmentPolicy::Silent),
    ("displaymath", EnvironmentPolicy::Silent),
];

const COMMAND_POLICIES: &[(&str, CommandPolicy)] = &[
    ("begin", CommandPolicy::Structural),
    ("end", CommandPolicy::Structural),
    ("cite", CommandPolicy::Reconstruct),
    ("citep", CommandPolicy::Reconstruct),
    ("citet", CommandPolicy::Reconstruct),
    ("citealp", CommandPolicy::Reconstruct),
    ("citeauthor", CommandPolicy::Reconstruct),
    ("citeyear", CommandPolicy::Reconstruct),
    ("nocite", CommandPolicy::Reconstruct),
    ("ref", CommandPolicy::Reconstruct),
    ("eqref", CommandPolicy::Reconstruct),
    ("pageref", CommandPolicy::Reconstruct),
    ("autoref", CommandPolicy::Reconstruct),
    ("cref", CommandPolicy::Reconstruct),
    ("Cref", CommandPolicy::Reconstruct),
    ("url", CommandPolicy::Reconstruct),
];

#[must_use]
pub fn environment_policy(name: &str) -> EnvironmentPolicy {
    ENVIRONMENT_POLICIES
        .iter()
        .find(|(env, _)| *env == name)
        .map_or(EnvironmentPolicy::Annotate, |(_, policy)| *policy)
}

#[must_use]
pub fn command_policy(name: &str) -> CommandPolicy {
    COMMAND_POLICIES
        .iter()
        .find(|(cmd, _)| *cmd == name)
        .map_or(CommandPolicy::Inline, |(_, policy)| *policy)
}

/// Commands whose arguments are rebuilt rather than split by a marker.
pub fn fragile_commands() -> impl Iterator<Item = &'static str> {
    COMMAND_POLICIES
        .iter()
        .filter(|(_, policy)| *policy == CommandPolicy::Reconstruct)
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("equation", EnvironmentPolicy::Silent)]
    #[case("align*", EnvironmentPolicy::Silent)]
    #[case("document", EnvironmentPolicy::Annotate)]
    #[case("Equation", EnvironmentPolicy::Annotate)]
    fn looks_up_environment_policy(#[case] name: &str, #[case] expected: EnvironmentPolicy) {
        assert_eq!(environment_policy(name), expected);
    }

    #[rstest]
    #[case("cite", CommandPolicy::Reconstruct)]
    #[case("Cref", CommandPolicy::Reconstruct)]
    #[case("begin", CommandPolicy::Structural)]
    #[case("textbf", CommandPolicy::Inline)]
    fn looks_up_command_policy(#[case] name: &str, #[case] expected: CommandPolicy) {
        assert_eq!(command_policy(name), expected);
    }

    #[test]
    fn fragile_commands_exclude_structural_ones() {
        let fragile: Vec<_> = fragile_commands().collect();
        assert!(fragile.contains(&"cite"));
        assert!(!fragile.contains(&"begin"));
    }
}
