//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version` / `-V`: Show version
//! - `--debug`: Enable debug logging on stderr
//! - `--offline`: Never fetch `http(s)://` sources
//!
//! # Boolean Flags
//!
//! Boolean-valued options take an optional literal, `--strict=no`; a bare
//! `--strict` means true. Literals go through
//! [`crate::core::boolean::parse_flag`]. The `=` is required so a following
//! positional source is never taken as the literal.
//!
//! # Usage Errors
//!
//! `--help` and `--version` print and exit 0 through clap. Every other
//! parse error becomes an [`anyhow::Error`] so it reaches the failure
//! reporter and exits 1.

use std::ffi::OsString;

use anyhow::anyhow;
use clap::error::ErrorKind;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::core::boolean::parse_flag;
use crate::core::source::STDIN_DESCRIPTOR;

/// jsonld - Transform JSON-LD documents from files, URLs or stdin
#[derive(Parser, Debug)]
#[command(name = "jsonld")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable network access for http(s) sources
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> anyhow::Result<Self> {
        Self::parse_args_from(std::env::args_os())
    }

    /// Parse `args`, the first item being the binary name.
    pub fn parse_args_from<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
                _ => Err(anyhow!(usage_message(&err))),
            },
        }
    }
}

/// Clap's rendering without its own `error:` label.
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered.trim_start_matches("error:").trim().to_string()
}

/// Flags shared by every processing command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Spaces per indentation level [default: 2]
    #[arg(short, long, value_name = "N")]
    pub indent: Option<usize>,

    /// Do not print a trailing newline
    #[arg(short = 'N', long)]
    pub no_newline: bool,

    /// Base IRI for relative references
    #[arg(short, long, value_name = "IRI")]
    pub base: Option<String>,
}

/// `format` arguments.
#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// Document to read
    #[arg(value_name = "filename|URL|-", default_value = STDIN_DESCRIPTOR)]
    pub input: String,

    /// Output format: json, application/ld+json, nquads, application/nquads, ...
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Output N-Quads (overrides --json and --format)
    #[arg(short = 'q', long)]
    pub nquads: bool,

    /// Output JSON-LD (overrides --format)
    #[arg(short, long)]
    pub json: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// `compact` arguments.
#[derive(Args, Debug, Clone)]
pub struct CompactArgs {
    /// Document to read
    #[arg(value_name = "filename|URL|-", default_value = STDIN_DESCRIPTOR)]
    pub input: String,

    /// Context to compact with
    #[arg(short, long, value_name = "filename|URL|-")]
    pub context: Option<String>,

    /// Drop properties that do not map to absolute IRIs
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "true",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub strict: bool,

    /// Replace single-element arrays with their element
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "true",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub compact_arrays: bool,

    /// Always output a top-level @graph
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub graph: bool,

    /// Expand the input before compacting
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "true",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub expansion: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// `expand` arguments.
#[derive(Args, Debug, Clone)]
pub struct ExpandArgs {
    /// Document to read
    #[arg(value_name = "filename|URL|-", default_value = STDIN_DESCRIPTOR)]
    pub input: String,

    /// Keep top-level nodes that only have an @id
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub keep_free_floating_nodes: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// `flatten` arguments.
#[derive(Args, Debug, Clone)]
pub struct FlattenArgs {
    /// Document to read
    #[arg(value_name = "filename|URL|-", default_value = STDIN_DESCRIPTOR)]
    pub input: String,

    /// Context to compact the flattened output with
    #[arg(short, long, value_name = "filename|URL|-")]
    pub context: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// `frame` arguments.
#[derive(Args, Debug, Clone)]
pub struct FrameArgs {
    /// Document to read
    #[arg(value_name = "filename|URL|-", default_value = STDIN_DESCRIPTOR)]
    pub input: String,

    /// Frame to apply
    #[arg(short, long, value_name = "filename|URL|-")]
    pub frame: Option<String>,

    /// Embed matched nodes instead of referencing them
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "true",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub embed: bool,

    /// Only output properties named in the frame
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub explicit: bool,

    /// Do not add defaults for missing frame properties
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_flag,
        action = ArgAction::Set
    )]
    pub omit_default: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// `normalize` arguments.
#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// Document to read
    #[arg(value_name = "filename|URL|-", default_value = STDIN_DESCRIPTOR)]
    pub input: String,

    /// Output format: nquads or application/nquads [default: dataset object]
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Output N-Quads (overrides --format)
    #[arg(short = 'q', long)]
    pub nquads: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Re-serialize a document as JSON-LD or N-Quads
    #[command(
        name = "format",
        long_about = "Re-serialize a document.\n\n\
            JSON-LD output (the default) writes the document back as read, \
            pretty-printed, without processing it. N-Quads output converts the \
            document to RDF first.",
        after_help = "\
EXAMPLES:
    # Pretty-print a document from stdin
    cat doc.jsonld | jsonld format

    # Convert a remote document to N-Quads
    jsonld format -q https://example.org/doc.jsonld"
    )]
    Format(FormatArgs),

    /// Compact a document with a context
    #[command(
        name = "compact",
        after_help = "\
EXAMPLES:
    jsonld compact -c context.jsonld doc.jsonld

    # Input is already expanded; keep arrays
    jsonld compact -c context.jsonld --expansion=false --compact-arrays=false expanded.jsonld"
    )]
    Compact(CompactArgs),

    /// Expand a document
    #[command(name = "expand")]
    Expand(ExpandArgs),

    /// Flatten a document, optionally compacting the result
    #[command(
        name = "flatten",
        after_help = "\
EXAMPLES:
    jsonld flatten doc.jsonld
    jsonld flatten -c context.jsonld doc.jsonld"
    )]
    Flatten(FlattenArgs),

    /// Frame a document
    #[command(
        name = "frame",
        after_help = "\
EXAMPLES:
    jsonld frame -f frame.jsonld doc.jsonld
    jsonld frame -f frame.jsonld --embed=false doc.jsonld"
    )]
    Frame(FrameArgs),

    /// Canonicalize a document's RDF dataset
    #[command(
        name = "normalize",
        after_help = "\
EXAMPLES:
    jsonld normalize -q doc.jsonld"
    )]
    Normalize(NormalizeArgs),

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    jsonld completion bash > ~/.local/share/bash-completion/completions/jsonld

    # Zsh
    jsonld completion zsh > ~/.zfunc/_jsonld"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
