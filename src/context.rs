//! Nesting context tracking for LaTeX token streams.
//!
//! [`ContextTracker`] is a small stack machine fed one token at a time. It
//! records which groups, command arguments and environments are open at the
//! current position so the annotation pass can decide where a change marker
//! may safely go.

use std::fmt;

use tracing::trace;

use crate::{
    error::StructuralError,
    tokenize::{Token, TokenKind, Tokens},
};

#[cfg(test)]
mod tests;

/// Kind of nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// A bare `{...}` group.
    Group,
    /// The brace argument of a command, e.g. the `{...}` of `\cite{...}`.
    CommandArgument,
    /// A `\begin{name}...\end{name}` block.
    Environment,
}

/// One open nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    kind: ContextKind,
    name: Option<String>,
    capture: String,
}

impl Context {
    fn group() -> Self {
        Self {
            kind: ContextKind::Group,
            name: None,
            capture: String::new(),
        }
    }

    fn argument(command: String) -> Self {
        Self {
            kind: ContextKind::CommandArgument,
            name: Some(command),
            capture: String::new(),
        }
    }

    fn environment(name: String) -> Self {
        Self {
            kind: ContextKind::Environment,
            name: Some(name),
            capture: String::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ContextKind { self.kind }

    /// Command name for arguments, environment name for environments.
    #[must_use]
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }

    /// Raw text seen while this context was innermost.
    ///
    /// Only command arguments capture text. The capture of a closed argument
    /// ends with its closing brace.
    #[must_use]
    pub fn capture(&self) -> &str { &self.capture }

    fn is_argument_of(&self, command: &str) -> bool {
        self.kind == ContextKind::CommandArgument && self.name.as_deref() == Some(command)
    }

    /// Name held between the braces of a closed `\begin`/`\end` argument.
    fn argument_name(&self) -> String {
        let inner = self.capture.strip_suffix('}').unwrap_or(&self.capture);
        inner.trim().to_string()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            ContextKind::Group => return f.write_str("Group"),
            ContextKind::CommandArgument => "CommandArgument",
            ContextKind::Environment => "Environment",
        };
        match &self.name {
            Some(name) => write!(f, "{label}({name})"),
            None => f.write_str(label),
        }
    }
}

/// Command name read but not yet resolved by the following token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Pending {
    #[default]
    Idle,
    Command(String),
}

impl Pending {
    #[must_use]
    pub fn is_idle(&self) -> bool { matches!(self, Self::Idle) }

    /// Take the pending name, leaving the slot idle.
    fn take(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Command(name) => Some(name),
        }
    }
}

/// Structural effect of a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No context was opened or closed.
    Unchanged,
    /// A group or command argument was opened.
    Opened,
    /// The innermost context was closed.
    Closed,
    /// A `\begin{...}` argument closed and its environment opened.
    EnvironmentOpened,
    /// An `\end{...}` argument closed together with its environment.
    EnvironmentClosed,
}

/// Stack of open contexts plus the pending-command slot.
#[derive(Debug, Clone, Default)]
pub struct ContextTracker {
    stack: Vec<Context>,
    pending: Pending,
}

impl ContextTracker {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Advance the tracker by one token.
    ///
    /// # Errors
    /// Returns a [`StructuralError`] for an unmatched `}`, an `\end` with no
    /// open environment, a mismatched `\end`, or a `\begin`/`\end` followed
    /// by anything but whitespace before its brace argument.
    pub fn consume(&mut self, token: &Token<'_>) -> Result<Transition, StructuralError> {
        if let Some(top) = self.stack.last_mut()
            && top.kind == ContextKind::CommandArgument
        {
            top.capture.push_str(token.text);
        }

        let transition = match token.kind {
            TokenKind::CommandName => {
                let name = token.command().unwrap_or_default().to_string();
                self.pending = Pending::Command(name);
                Transition::Unchanged
            }
            TokenKind::OpenBrace => {
                let context = match self.pending.take() {
                    Some(command) => Context::argument(command),
                    None => Context::group(),
                };
                self.stack.push(context);
                Transition::Opened
            }
            TokenKind::CloseBrace => {
                self.pending = Pending::Idle;
                self.close()?
            }
            TokenKind::Literal | TokenKind::Fallback => {
                self.resolve_pending(token)?;
                Transition::Unchanged
            }
        };
        trace!(token = token.text, ?transition, depth = self.stack.len(), "consumed token");
        Ok(transition)
    }

    /// Feed every token of `text` through the tracker.
    ///
    /// # Errors
    /// Propagates the first [`StructuralError`] encountered.
    pub fn feed(&mut self, text: &str) -> Result<(), StructuralError> {
        for token in Tokens::new(text) {
            self.consume(&token)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<Transition, StructuralError> {
        let closed = self.stack.pop().ok_or(StructuralError::UnmatchedClose)?;
        if closed.is_argument_of("begin") {
            self.stack.push(Context::environment(closed.argument_name()));
            return Ok(Transition::EnvironmentOpened);
        }
        if closed.is_argument_of("end") {
            let name = closed.argument_name();
            let Some(top) = self.stack.last() else {
                return Err(StructuralError::ExtraEnd { name });
            };
            if top.kind != ContextKind::Environment || top.name() != Some(name.as_str()) {
                let expected = match top.kind {
                    ContextKind::Environment => top.name().unwrap_or_default().to_string(),
                    _ => String::from("?"),
                };
                return Err(StructuralError::EnvironmentMismatch {
                    expected,
                    found: name,
                });
            }
            self.stack.pop();
            return Ok(Transition::EnvironmentClosed);
        }
        Ok(Transition::Closed)
    }

    fn resolve_pending(&mut self, token: &Token<'_>) -> Result<(), StructuralError> {
        let Pending::Command(command) = &self.pending else {
            return Ok(());
        };
        if matches!(command.as_str(), "begin" | "end") {
            if token.is_whitespace() {
                return Ok(());
            }
            return Err(StructuralError::MissingArgument {
                command: command.clone(),
            });
        }
        self.pending = Pending::Idle;
        Ok(())
    }

    #[must_use]
    pub fn pending(&self) -> &Pending { &self.pending }

    #[must_use]
    pub fn depth(&self) -> usize { self.stack.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.stack.is_empty() }

    #[must_use]
    pub fn contexts(&self) -> &[Context] { &self.stack }

    /// Context descriptors from outermost to innermost.
    #[must_use]
    pub fn hierarchy(&self) -> Vec<String> {
        self.stack.iter().map(ToString::to_string).collect()
    }

    /// Name of the nearest enclosing environment.
    ///
    /// Returns `None` while a command is pending, since the environment is not
    /// current until the command has been resolved.
    #[must_use]
    pub fn current_environment(&self) -> Option<&str> {
        if !self.pending.is_idle() {
            return None;
        }
        self.stack
            .iter()
            .rev()
            .find(|ctx| ctx.kind == ContextKind::Environment)
            .and_then(Context::name)
    }

    /// Command whose argument is the innermost context.
    #[must_use]
    pub fn parent_command(&self) -> Option<&str> {
        self.stack
            .last()
            .filter(|ctx| ctx.kind == ContextKind::CommandArgument)
            .and_then(Context::name)
    }

    /// Capture of the innermost open command argument.
    #[must_use]
    pub fn argument_capture(&self) -> Option<&str> {
        self.stack
            .iter()
            .rev()
            .find(|ctx| ctx.kind == ContextKind::CommandArgument)
            .map(Context::capture)
    }
}
