//! Library for annotating the differences between two LaTeX documents.
//!
//! Inserted and deleted text is wrapped in change markers placed so that the
//! result still nests: markers never split a command from its argument, math
//! environments take changes silently, and fragile commands such as `\cite`
//! are rebuilt whole.

#[macro_use]
mod macros;

pub mod annotate;
pub mod context;
pub mod diff;
pub mod error;
pub mod header;
pub mod io;
pub mod markers;
pub mod policy;
pub mod process;
pub mod style;
pub mod tokenize;

pub use annotate::{Annotator, Placement, annotate};
pub use context::{Context, ContextKind, ContextTracker, Pending, Transition};
pub use diff::{DiffOp, Granularity, OpKind, align_to_markup, diff_texts};
pub use error::{ConfigError, StructuralError};
pub use markers::{accept_changes, reject_changes};
pub use process::{Options, annotate_pairs, annotate_texts, render_document};
pub use style::{StyleConfig, StyleKind, style_for};
pub use tokenize::{Token, TokenKind, Tokens, next_token, tokenize};
