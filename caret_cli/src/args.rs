//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "caret",
    version,
    about = "Resolve the type of the expression fragment before a caret"
)]
pub struct Cli {
    /// Expression text
    #[arg(value_name = "TEXT", required_unless_present = "file", conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the expression from a file instead
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Caret byte offset; defaults to the end of the text
    #[arg(long, value_name = "OFFSET")]
    pub caret: Option<usize>,

    /// Type model (.toml or .json) with custom types and the context type
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Type bound to `it`, overriding the model's context
    #[arg(long, value_name = "TYPE")]
    pub context: Option<String>,

    /// List the members available at the caret
    #[arg(long)]
    pub complete: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Strings use `""` for an embedded quote
    #[arg(long)]
    pub double_quote_escapes: bool,

    /// Runtime configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "CARET_LOG", default_value = "warn")]
    pub log_level: log::LevelFilter,
}
