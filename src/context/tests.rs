//! Tests for the `ContextTracker` stack machine.
//!
//! These cases cover environment pairing, pending-command resolution and the
//! structural errors that abort an annotation pass.

use rstest::rstest;

use super::*;

fn tracked(text: &str) -> ContextTracker {
    let mut tracker = ContextTracker::new();
    tracker.feed(text).expect("well-formed input");
    tracker
}

#[test]
fn tracker_starts_empty() {
    let tracker = ContextTracker::new();
    assert!(tracker.is_empty());
    assert!(tracker.pending().is_idle());
    assert_eq!(tracker.current_environment(), None);
}

#[rstest]
#[case("plain text")]
#[case("{a}{b{c}}")]
#[case(r"\begin{document}\section{Intro} text\end{document}")]
#[case(r"\begin{itemize}\item one \item two\end{itemize}")]
#[case(r"\begin{a}\begin{b}{x}\end{b}\end{a}")]
#[case(r"\begin { equation* } x \end{equation*}")]
#[case(r"\cite{a,b} and \ref{fig:1}")]
fn balanced_input_leaves_stack_empty(#[case] input: &str) {
    let tracker = tracked(input);
    assert!(tracker.is_empty(), "left open: {:?}", tracker.hierarchy());
}

#[test]
fn begin_pushes_named_environment() {
    let tracker = tracked(r"\begin{document}\begin{equation}");
    assert_eq!(
        tracker.hierarchy(),
        vec!["Environment(document)", "Environment(equation)"]
    );
    assert_eq!(tracker.current_environment(), Some("equation"));
}

#[test]
fn environment_name_is_trimmed() {
    let tracker = tracked("\\begin{  align*\n}");
    assert_eq!(tracker.current_environment(), Some("align*"));
}

#[test]
fn command_argument_reports_parent_and_capture() {
    let tracker = tracked(r"\begin{document}see \cite{knuth, lamport");
    assert_eq!(
        tracker.hierarchy(),
        vec!["Environment(document)", "CommandArgument(cite)"]
    );
    assert_eq!(tracker.parent_command(), Some("cite"));
    assert_eq!(tracker.argument_capture(), Some("knuth, lamport"));
}

#[test]
fn capture_spans_nested_groups() {
    let tracker = tracked(r"\textbf{a {b} c");
    assert_eq!(tracker.argument_capture(), Some("a { c"));
    let tracker = tracked(r"\textbf{a {b");
    assert_eq!(tracker.hierarchy(), vec!["CommandArgument(textbf)", "Group"]);
    assert_eq!(tracker.parent_command(), None);
    assert_eq!(tracker.argument_capture(), Some("a {"));
}

#[test]
fn group_has_no_parent_command() {
    let tracker = tracked("{x");
    assert_eq!(tracker.hierarchy(), vec!["Group"]);
    assert_eq!(tracker.parent_command(), None);
}

#[test]
fn bare_command_is_cleared_by_text() {
    let mut tracker = ContextTracker::new();
    tracker.feed(r"\item").expect("valid");
    assert_eq!(tracker.pending(), &Pending::Command("item".into()));
    tracker.feed(" one").expect("valid");
    assert!(tracker.pending().is_idle());
    tracker.feed("{x}").expect("valid");
    assert!(tracker.is_empty());
}

#[test]
fn later_command_overwrites_pending() {
    let tracker = tracked(r"\noindent\textbf{x");
    assert_eq!(tracker.parent_command(), Some("textbf"));
}

#[test]
fn environment_hidden_while_command_pending() {
    let tracker = tracked(r"\begin{equation}\frac");
    assert_eq!(tracker.current_environment(), None);
    let tracker = tracked(r"\begin{equation}\frac{1}{2}");
    assert_eq!(tracker.current_environment(), Some("equation"));
}

#[test]
fn whitespace_before_begin_argument_is_tolerated() {
    let tracker = tracked("\\begin \n {table}");
    assert_eq!(tracker.current_environment(), Some("table"));
}

#[test]
fn close_brace_clears_pending() {
    let tracker = tracked(r"{\bf}");
    assert!(tracker.pending().is_idle());
    assert!(tracker.is_empty());
}

#[test]
fn transitions_describe_structure() {
    let mut tracker = ContextTracker::new();
    let results: Vec<Transition> = crate::tokenize::tokenize(r"\begin{x}{y}\end{x}")
        .iter()
        .map(|token| tracker.consume(token).expect("valid"))
        .collect();
    assert_eq!(
        results,
        vec![
            Transition::Unchanged,
            Transition::Opened,
            Transition::Unchanged,
            Transition::EnvironmentOpened,
            Transition::Opened,
            Transition::Unchanged,
            Transition::Closed,
            Transition::Unchanged,
            Transition::Opened,
            Transition::Unchanged,
            Transition::EnvironmentClosed,
        ]
    );
}

#[rstest]
#[case(r"\end{foo}", StructuralError::ExtraEnd { name: "foo".into() })]
#[case("a}", StructuralError::UnmatchedClose)]
#[case(r"\begin qux", StructuralError::MissingArgument { command: "begin".into() })]
#[case(r"\begin{a}x\end y", StructuralError::MissingArgument { command: "end".into() })]
#[case(
    r"\begin{itemize}\end{enumerate}",
    StructuralError::EnvironmentMismatch { expected: "itemize".into(), found: "enumerate".into() }
)]
#[case(
    r"\begin{a}{\end{a}",
    StructuralError::EnvironmentMismatch { expected: "?".into(), found: "a".into() }
)]
fn malformed_input_is_structural_error(#[case] input: &str, #[case] expected: StructuralError) {
    let mut tracker = ContextTracker::new();
    assert_eq!(tracker.feed(input), Err(expected));
}

#[test]
fn end_inside_group_with_no_environment_is_mismatch() {
    let mut tracker = ContextTracker::new();
    let err = tracker.feed(r"{\end{foo}").expect_err("should fail");
    assert_eq!(
        err,
        StructuralError::EnvironmentMismatch {
            expected: "?".into(),
            found: "foo".into(),
        }
    );
}
