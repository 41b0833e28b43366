//! CLI definitions: argument parsing and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

const AFTER_HELP: &str = "\
EXAMPLES:
  chatdoc answer.md                 Render a file to HTML on stdout
  chatdoc - < answer.md             Read markdown from stdin
  chatdoc -a answer.md              Wrap words for reveal animation
  chatdoc --check-links answer.md   Annotate links with a trust verdict
  chatdoc -f json answer.md         Dump the document tree as JSON
  chatdoc -f normalized answer.md   Show the text after delimiter/fence normalization
  chatdoc --copy answer.md          Also copy the raw markdown to the clipboard

ENVIRONMENT:
  CHATDOC_ANIMATED, CHATDOC_CHECK_LINK_CREDIBILITY, CHATDOC_ENABLE_COPY   on/off defaults
  CHATDOC_COPY_ACK_MS      How long the copy button shows success (ms)
  CHATDOC_COPY_COMMAND     Fallback copy command (e.g. \"xsel --clipboard --input\")
";

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// HTML fragment
    Html,
    /// Document tree as JSON
    Json,
    /// Plain text, math as TeX source
    Text,
    /// Normalized markdown, before parsing
    Normalized,
}

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Render model-generated markdown with math into a safe document",
    after_help = AFTER_HELP
)]
pub struct Args {
    /// Markdown file to render ('-' or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Wrap each word in an addressable span for reveal animation
    #[arg(short = 'a', long)]
    pub animated: bool,

    /// Annotate links with a credibility verdict
    #[arg(long)]
    pub check_links: bool,

    /// Copy the raw input to the clipboard after rendering
    #[arg(long)]
    pub copy: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Html)]
    pub format: Format,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }

    /// Whether input comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input
            .as_deref()
            .is_none_or(|path| path.as_os_str() == "-")
    }
}
