use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "herodote")]
#[command(about = "Search conventional commits from the terminal")]
pub struct Cli {
    /// Initial location query string, e.g. "?query=repo%3Aapi"
    #[arg(long, default_value = "")]
    pub location: String,

    /// Directory holding base.yaml and {environment}.yaml
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}
