use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::TocFilterMode;
use crate::source::SourceFormat;

#[derive(Parser, Debug)]
#[command(
    name = "govdoc",
    version,
    about = "Governance document section parsing and table-of-contents tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Parse(ParseArgs),
    Toc(TocArgs),
    Nav(NavArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Plain,
    Markdown,
    Word,
}

impl FormatArg {
    pub fn explicit(self) -> Option<SourceFormat> {
        match self {
            Self::Auto => None,
            Self::Plain => Some(SourceFormat::PlainText),
            Self::Markdown => Some(SourceFormat::Markdown),
            Self::Word => Some(SourceFormat::WordProcessor),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long = "override")]
    pub override_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    #[arg(long, value_enum)]
    pub toc_filter: Option<TocFilterMode>,

    #[arg(long = "db")]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TocArgs {
    #[arg(long = "db", default_value = "govdoc.sqlite")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub document_id: String,

    #[arg(long = "locked")]
    pub locked: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct NavArgs {
    #[arg(long = "db", default_value = "govdoc.sqlite")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub document_id: String,

    #[arg(long)]
    pub number: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long = "db", default_value = "govdoc.sqlite")]
    pub db_path: PathBuf,
}
