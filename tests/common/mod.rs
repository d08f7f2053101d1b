//! Utility helpers shared across integration tests.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Join lines with `\n`, adding a trailing newline.
///
/// Keeps multi-line LaTeX fixtures readable without raw string indentation
/// leaking into the document.
macro_rules! tex_lines {
    ($($line:expr),* $(,)?) => {{
        let mut text = String::new();
        $(
            text.push_str($line);
            text.push('\n');
        )*
        text
    }};
}

/// Wrap `body` in a minimal article.
pub fn article(body: &str) -> String {
    format!("\\documentclass{{article}}\n\\begin{{document}}\n{body}\\end{{document}}\n")
}

/// Write `content` to `name` inside `dir` and return the path.
pub fn write_tex(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}
