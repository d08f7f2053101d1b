//! Wrap-policy engine for annotating a diff of two LaTeX documents.
//!
//! [`Annotator`] consumes diff operations in document order. Unchanged text
//! goes to a backtrack buffer; inserted and deleted text is split into
//! tokens, placed according to the surrounding structure and written out,
//! flushing the buffer first. Every operation's text, including deletions,
//! is fed through one [`ContextTracker`] so placement reflects the annotated
//! stream rather than either input.
//!
//! Changes inside the argument of a fragile command such as `\cite` are
//! never marked in place. The invocation is held back until its argument
//! closes and is then written twice, the old form marked as a deletion and
//! the new form as an addition, replacing any unchanged prefix still in the
//! buffer.

mod buffer;


use tracing::{debug, trace, warn};

use buffer::BacktrackBuffer;

use crate::{
    context::{Context, ContextKind, ContextTracker, Transition},
    diff::{DiffOp, OpKind},
    error::StructuralError,
    markers::marker_for,
    policy::{CommandPolicy, EnvironmentPolicy, command_policy, environment_policy},
    style::StyleKind,
    tokenize::{Token, TokenKind, Tokens},
};

/// Where a change sits relative to the open contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Nothing is open; text is written unmarked.
    Root,
    /// Inside a `\begin`/`\end` argument; text is written unmarked.
    Structural,
    /// Inside a silent environment such as `equation`; insertions are written
    /// unmarked and deletions dropped.
    Silent,
    /// Directly inside a fragile command's argument.
    Fragile,
    /// Anywhere else; text is wrapped in a marker.
    Marked,
}

impl Placement {
    /// Classify the tracker's current position.
    #[must_use]
    pub fn of(tracker: &ContextTracker) -> Self {
        Self::classify(tracker, tracker.current_environment())
    }

    /// Classify the position of a command name that takes no argument.
    ///
    /// The name is still pending in `tracker`, which hides the enclosing
    /// environment until it resolves.
    fn of_command(tracker: &ContextTracker) -> Self {
        let environment = tracker
            .contexts()
            .iter()
            .rev()
            .find(|ctx| ctx.kind() == ContextKind::Environment)
            .and_then(Context::name);
        Self::classify(tracker, environment)
    }

    fn classify(tracker: &ContextTracker, environment: Option<&str>) -> Self {
        if tracker.is_empty() {
            return Self::Root;
        }
        let parent = tracker.parent_command().map(command_policy);
        if parent == Some(CommandPolicy::Structural) {
            return Self::Structural;
        }
        if environment.map(environment_policy) == Some(EnvironmentPolicy::Silent) {
            return Self::Silent;
        }
        if parent == Some(CommandPolicy::Reconstruct) {
            return Self::Fragile;
        }
        Self::Marked
    }
}

fn style_kind(kind: OpKind) -> StyleKind {
    match kind {
        OpKind::Insert => StyleKind::Addition,
        OpKind::Equal | OpKind::Delete => StyleKind::Deletion,
    }
}

/// Location of the most recent command-name token.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// In unchanged text, at this byte offset of the backtrack buffer.
    Buffer(usize),
    /// In the current change run, at this token index.
    Run(usize),
}

#[derive(Debug)]
struct Invocation {
    anchor: Anchor,
    kind: OpKind,
    text: String,
}

/// A fragile command invocation whose argument is still open.
#[derive(Debug)]
struct Deferred {
    /// Stack depth of the argument context.
    depth: usize,
    /// Buffer offset where the invocation's unchanged text starts.
    anchor: usize,
    old: String,
    new: String,
    changed: bool,
}

impl Deferred {
    fn push(&mut self, kind: OpKind, text: &str) {
        match kind {
            OpKind::Equal => {
                self.old.push_str(text);
                self.new.push_str(text);
            }
            OpKind::Insert => {
                self.new.push_str(text);
                self.changed = true;
            }
            OpKind::Delete => {
                self.old.push_str(text);
                self.changed = true;
            }
        }
    }
}

#[derive(Debug)]
struct Piece {
    text: String,
    structural: bool,
    /// A command name not yet known to take an argument.
    awaiting: bool,
    placement: Placement,
}

/// Tokens of the current change op that have not been written yet.
///
/// Tokens before `floor` complete a command that was pending when the run
/// started and are placed one by one. Tokens in `floor..balanced` form a
/// balanced span wrapped by a single marker. Anything after `balanced` left
/// contexts open and is again placed token by token.
#[derive(Debug)]
struct Run {
    pieces: Vec<Piece>,
    open: usize,
    floor: Option<usize>,
    balanced: usize,
    placement: Option<Placement>,
}

impl Run {
    fn new(tracker: &ContextTracker) -> Self {
        let idle = tracker.pending().is_idle();
        Self {
            pieces: Vec::new(),
            open: 0,
            floor: idle.then_some(0),
            balanced: 0,
            placement: idle.then(|| Placement::of(tracker)),
        }
    }

    /// Update the open-context count for `transition`.
    ///
    /// Returns `true` when the token closed a context opened before the run.
    fn closes_outer(&mut self, transition: Transition) -> bool {
        match transition {
            Transition::Unchanged => false,
            Transition::Opened => {
                self.open += 1;
                false
            }
            Transition::Closed => {
                if self.open == 0 {
                    return true;
                }
                self.open -= 1;
                false
            }
            // The closed argument is replaced by its environment.
            Transition::EnvironmentOpened => self.open == 0,
            Transition::EnvironmentClosed => {
                if self.open < 2 {
                    return true;
                }
                self.open -= 2;
                false
            }
        }
    }

    fn push(&mut self, token: &Token<'_>, tracker: &ContextTracker) {
        // A second command name means the one pending before the run took no
        // argument.
        if self.floor.is_none() && self.open == 0 && token.kind == TokenKind::CommandName {
            self.floor = Some(self.pieces.len());
        }
        let command = token.kind == TokenKind::CommandName;
        self.pieces.push(Piece {
            text: token.text.to_string(),
            structural: token.is_structural(),
            awaiting: command,
            placement: if command {
                Placement::of_command(tracker)
            } else {
                Placement::of(tracker)
            },
        });
        if self.open != 0 || !tracker.pending().is_idle() {
            return;
        }
        if self.floor.is_some() {
            self.balanced = self.pieces.len();
            self.placement.get_or_insert(Placement::of(tracker));
        } else {
            self.floor = Some(self.pieces.len());
        }
    }

    /// Whether the run ends with a command name whose argument may follow.
    fn awaiting(&self) -> bool { self.pieces.last().is_some_and(|piece| piece.awaiting) }

    /// Resolve a trailing command name against the token after it.
    ///
    /// `token` has already been consumed by `tracker`. A name followed by
    /// anything but its argument is complete on its own and can be marked.
    fn settle(&mut self, token: &Token<'_>, tracker: &ContextTracker) {
        if token.kind == TokenKind::OpenBrace {
            if let Some(last) = self.pieces.last_mut() {
                last.awaiting = false;
            }
        } else if token.kind == TokenKind::CommandName || tracker.pending().is_idle() {
            self.settle_bare();
        }
    }

    /// Treat a trailing command name as taking no argument.
    fn settle_bare(&mut self) {
        if let Some(last) = self.pieces.last_mut().filter(|piece| piece.awaiting) {
            last.awaiting = false;
            last.structural = false;
        }
    }

    fn truncate(&mut self, len: usize) {
        self.pieces.truncate(len);
        self.balanced = self.balanced.min(len);
        self.floor = self.floor.map(|floor| floor.min(len));
    }
}

/// Streaming annotator for one document pair.
#[derive(Debug, Default)]
pub struct Annotator {
    tracker: ContextTracker,
    buffer: BacktrackBuffer,
    output: String,
    run: Option<Run>,
    /// A finished run ending in a command name, kept until the next token.
    held: Option<(OpKind, Run)>,
    invocation: Option<Invocation>,
    deferred: Option<Deferred>,
}

impl Annotator {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Process the next diff operation.
    ///
    /// # Errors
    /// Returns a [`StructuralError`] when the annotated stream stops nesting
    /// properly. The annotator must not be used after an error.
    pub fn push(&mut self, op: &DiffOp) -> Result<(), StructuralError> {
        debug!(
            kind = ?op.kind,
            len = op.text.len(),
            hierarchy = ?self.tracker.hierarchy(),
            "annotating op"
        );
        match op.kind {
            OpKind::Equal => self.equal(&op.text),
            OpKind::Insert | OpKind::Delete => self.change(op.kind, &op.text),
        }
    }

    /// Flush pending text and return the annotated body.
    #[must_use]
    pub fn finish(mut self) -> String {
        if let Some((kind, mut run)) = self.held.take() {
            run.settle_bare();
            self.commit(kind, run);
        }
        if let Some(deferred) = self.deferred.take() {
            warn!(
                invocation = deferred.new.as_str(),
                "document ended inside a fragile command argument"
            );
            if deferred.changed {
                self.buffer.truncate(deferred.anchor);
                self.emit(&deferred.new);
            }
        }
        if !self.tracker.is_empty() {
            warn!(
                hierarchy = ?self.tracker.hierarchy(),
                "document ended with open contexts"
            );
        }
        self.buffer.flush_into(&mut self.output);
        self.output
    }

    /// Text already committed to the output.
    #[must_use]
    pub fn output(&self) -> &str { &self.output }

    /// Unchanged text still held in the backtrack buffer.
    #[must_use]
    pub fn pending(&self) -> &str { self.buffer.as_str() }

    #[must_use]
    pub fn tracker(&self) -> &ContextTracker { &self.tracker }

    fn equal(&mut self, text: &str) -> Result<(), StructuralError> {
        for token in Tokens::new(text) {
            let invocation = self.invocation.take();
            let transition = self.tracker.consume(&token)?;
            self.release_held(&token);
            if token.kind == TokenKind::CommandName {
                self.invocation = Some(Invocation {
                    anchor: Anchor::Buffer(self.buffer.len()),
                    kind: OpKind::Equal,
                    text: token.text.to_string(),
                });
            }
            self.buffer.push(token.text);
            if self.extend_deferred(OpKind::Equal, token.text) {
                continue;
            }
            if transition == Transition::Opened {
                self.open_deferred(invocation, OpKind::Equal, token.text);
            }
        }
        Ok(())
    }

    fn change(&mut self, kind: OpKind, text: &str) -> Result<(), StructuralError> {
        for token in Tokens::new(text) {
            let invocation = self.invocation.take();
            if self.run.is_none() && self.deferred.is_none() {
                self.run = Some(Run::new(&self.tracker));
            }
            let transition = self.tracker.consume(&token)?;
            self.release_held(&token);
            if self.extend_deferred(kind, token.text) {
                continue;
            }
            if transition == Transition::Opened
                && self.open_deferred(invocation, kind, token.text)
            {
                continue;
            }

            let run = self.run.get_or_insert_with(|| Run::new(&self.tracker));
            run.settle(&token, &self.tracker);
            if run.closes_outer(transition) {
                if let Some(done) = self.run.take() {
                    self.commit(kind, done);
                }
                self.emit(token.text);
                continue;
            }
            if token.kind == TokenKind::CommandName {
                self.invocation = Some(Invocation {
                    anchor: Anchor::Run(run.pieces.len()),
                    kind,
                    text: token.text.to_string(),
                });
            }
            run.push(&token, &self.tracker);
        }

        if let Some(done) = self.run.take() {
            if done.awaiting() {
                self.held = Some((kind, done));
            } else {
                self.commit(kind, done);
            }
        }
        if matches!(
            self.invocation,
            Some(Invocation {
                anchor: Anchor::Run(_),
                ..
            })
        ) {
            self.invocation = None;
        }
        Ok(())
    }

    /// Commit the held run now that the token after its command name is known.
    fn release_held(&mut self, token: &Token<'_>) {
        if let Some((kind, mut run)) = self.held.take() {
            run.settle(token, &self.tracker);
            self.commit(kind, run);
        }
    }

    /// Route a token into the open fragile invocation, if any.
    fn extend_deferred(&mut self, kind: OpKind, text: &str) -> bool {
        let Some(deferred) = self.deferred.as_mut() else {
            return false;
        };
        deferred.push(kind, text);
        if self.tracker.depth() < deferred.depth
            && let Some(done) = self.deferred.take()
        {
            self.close_deferred(done);
        }
        true
    }

    /// Start holding back a fragile command whose argument just opened.
    fn open_deferred(&mut self, invocation: Option<Invocation>, kind: OpKind, text: &str) -> bool {
        if self.deferred.is_some() {
            return false;
        }
        let Some(command) = self.tracker.parent_command() else {
            return false;
        };
        if command_policy(command) != CommandPolicy::Reconstruct {
            return false;
        }
        let Some(invocation) = invocation else {
            warn!(
                command,
                "fragile command name already written; argument changes stay unmarked"
            );
            return false;
        };

        if let Some(mut run) = self.run.take() {
            if let Anchor::Run(index) = invocation.anchor {
                run.truncate(index);
            }
            self.commit(kind, run);
        }
        let anchor = match invocation.anchor {
            Anchor::Buffer(offset) => offset,
            Anchor::Run(_) => self.buffer.len(),
        };
        let mut deferred = Deferred {
            depth: self.tracker.depth(),
            anchor,
            old: String::new(),
            new: String::new(),
            changed: false,
        };
        deferred.push(invocation.kind, &invocation.text);
        deferred.push(kind, text);
        trace!(command = invocation.text.as_str(), anchor, "deferring fragile command");
        self.deferred = Some(deferred);
        true
    }

    fn close_deferred(&mut self, done: Deferred) {
        if !done.changed {
            return;
        }
        self.buffer.truncate(done.anchor);
        let placement = Placement::of(&self.tracker);
        debug!(
            old = done.old.as_str(),
            new = done.new.as_str(),
            ?placement,
            "rebuilt fragile command"
        );
        if placement == Placement::Silent || done.old == done.new {
            self.emit(&done.new);
            return;
        }
        if !done.old.is_empty() {
            self.emit_marked(StyleKind::Deletion, &done.old);
        }
        if !done.new.is_empty() {
            self.emit_marked(StyleKind::Addition, &done.new);
        }
    }

    fn commit(&mut self, kind: OpKind, run: Run) {
        let floor = run.floor.unwrap_or(run.pieces.len());
        let balanced = run.balanced.max(floor);
        self.place_each(kind, &run.pieces[..floor]);
        let span = &run.pieces[floor..balanced];
        match run.placement {
            Some(placement) if !span.is_empty() => {
                let text: String = span.iter().map(|piece| piece.text.as_str()).collect();
                self.place(kind, placement, &text);
            }
            _ => self.place_each(kind, span),
        }
        self.place_each(kind, &run.pieces[balanced..]);
    }

    /// Place pieces individually, merging adjacent marked text.
    fn place_each(&mut self, kind: OpKind, pieces: &[Piece]) {
        let mut marked = String::new();
        for piece in pieces {
            if !piece.structural && piece.placement == Placement::Marked {
                marked.push_str(&piece.text);
                continue;
            }
            if !marked.is_empty() {
                self.place(kind, Placement::Marked, &std::mem::take(&mut marked));
            }
            if piece.structural {
                self.emit(&piece.text);
            } else {
                self.place(kind, piece.placement, &piece.text);
            }
        }
        if !marked.is_empty() {
            self.place(kind, Placement::Marked, &marked);
        }
    }

    fn place(&mut self, kind: OpKind, placement: Placement, text: &str) {
        match placement {
            Placement::Marked => self.emit_marked(style_kind(kind), text),
            Placement::Root | Placement::Structural => self.emit(text),
            Placement::Silent | Placement::Fragile => {
                if kind == OpKind::Delete {
                    trace!(text, ?placement, "dropping deletion");
                } else {
                    self.emit(text);
                }
            }
        }
    }

    fn emit(&mut self, text: &str) {
        self.buffer.flush_into(&mut self.output);
        self.output.push_str(text);
    }

    fn emit_marked(&mut self, kind: StyleKind, text: &str) {
        self.buffer.flush_into(&mut self.output);
        self.output.push_str(marker_for(kind));
        self.output.push('{');
        self.output.push_str(text);
        self.output.push('}');
    }
}

/// Annotate a complete diff.
///
/// # Errors
/// Returns the first [`StructuralError`] met while tracking the stream.
///
/// # Examples
///
/// ```
/// use texdiff::{annotate, diff::DiffOp};
///
/// let ops = [
///     DiffOp::equal(r"\begin{document}Hello "),
///     DiffOp::insert("brave "),
///     DiffOp::equal(r"world\end{document}"),
/// ];
/// assert_eq!(
///     annotate(&ops).unwrap(),
///     r"\begin{document}Hello \TexDiffAdd{brave }world\end{document}"
/// );
/// ```
pub fn annotate(ops: &[DiffOp]) -> Result<String, StructuralError> {
    let mut annotator = Annotator::new();
    for op in ops {
        annotator.push(op)?;
    }
    Ok(annotator.finish())
}
