//! Backtrack buffer for unchanged text.
//!
//! Equal runs are held here instead of being written straight to the output
//! so that a later change can take back the start of a fragile command that
//! has not been committed yet.

#[derive(Debug, Default)]
pub(crate) struct BacktrackBuffer {
    text: String,
}

impl BacktrackBuffer {
    pub(crate) fn as_str(&self) -> &str { self.text.as_str() }

    pub(crate) fn len(&self) -> usize { self.text.len() }

    pub(crate) fn push(&mut self, text: &str) { self.text.push_str(text); }

    /// Drop everything from byte offset `at` onwards.
    ///
    /// Offsets past the end leave the buffer untouched.
    pub(crate) fn truncate(&mut self, at: usize) {
        if at < self.text.len() {
            self.text.truncate(at);
        }
    }

    /// Move the buffered text to the end of `out`.
    pub(crate) fn flush_into(&mut self, out: &mut String) {
        if self.text.is_empty() {
            return;
        }
        if out.is_empty() {
            *out = std::mem::take(&mut self.text);
        } else {
            out.push_str(&self.text);
            self.text.clear();
        }
    }
}
