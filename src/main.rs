use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use texdiff::{
    Granularity,
    Options,
    StyleConfig,
    io::{read_text, write_output},
    render_document,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    version,
    about = "Generate a .tex file showing the differences between two LaTeX documents"
)]
struct Cli {
    /// Original and revised .tex files
    #[arg(num_args = 0..=2)]
    files: Vec<PathBuf>,
    /// Path to the original .tex file
    #[arg(long)]
    old: Option<PathBuf>,
    /// Path to the revised .tex file
    #[arg(long)]
    new: Option<PathBuf>,
    /// Write the annotated document here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Marker style for additions (plain, underline)
    #[arg(long = "add-style", default_value = "underline")]
    add_style: String,
    /// Marker style for deletions (none, plain, strike, underline)
    #[arg(long = "del-style", default_value = "strike")]
    del_style: String,
    /// Diff unit (chars, words, lines)
    #[arg(long, default_value = "chars")]
    granularity: Granularity,
    /// Log engine decisions to standard error
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Resolve the two input paths from flags and positional arguments.
    fn inputs(&self) -> anyhow::Result<(PathBuf, PathBuf)> {
        let mut positional = self.files.iter().cloned();
        let old = self.old.clone().or_else(|| positional.next());
        let new = self.new.clone().or_else(|| positional.next());
        if let Some(extra) = positional.next() {
            bail!("unexpected extra input path {}", extra.display());
        }
        match (old, new) {
            (Some(old), Some(new)) => Ok((old, new)),
            (None, _) => bail!("missing original .tex file (pass it first or use --old)"),
            (_, None) => bail!("missing revised .tex file (pass it second or use --new)"),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TEXDIFF_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the command-line tool that annotates LaTeX differences.
///
/// Validates the style names before reading any input, diffs the two files
/// and writes the headers and annotated body to standard output or the
/// `--output` path.
///
/// # Examples
///
/// ```sh
/// # Print the annotated document
/// texdiff old.tex new.tex
///
/// # Hide deletions and write to a file
/// texdiff --old old.tex --new new.tex --del-style none -o diff.tex
/// ```
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let styles = StyleConfig::new(&cli.add_style, &cli.del_style)?;
    let options = Options {
        styles,
        granularity: cli.granularity,
    };
    let (old_path, new_path) = cli.inputs()?;

    let old = read_text(&old_path)
        .with_context(|| format!("failed to read {}", old_path.display()))?;
    let new = read_text(&new_path)
        .with_context(|| format!("failed to read {}", new_path.display()))?;

    let old_label = old_path.display().to_string();
    let new_label = new_path.display().to_string();
    let document = render_document(&old_label, &new_label, &old, &new, &options)
        .with_context(|| format!("failed to annotate {old_label} against {new_label}"))?;
    info!(bytes = document.len(), "annotated document");

    write_output(cli.output.as_deref(), &document).with_context(|| match &cli.output {
        Some(path) => format!("failed to write {}", path.display()),
        None => String::from("failed to write to standard output"),
    })
}
