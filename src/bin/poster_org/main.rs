mod catalog;
mod config;
mod organize;
mod pipeline;
mod planner;
mod prompt;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::config::Action;
use crate::organize::Organizer;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Organize poster files and archives to match a media library")]
struct Args {
    /// Optional poster root directory (overrides the config file)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Action to perform
    #[arg(short = 's', long, value_enum, default_value = "new")]
    action: Action,

    /// Replace existing poster files without prompting
    #[arg(short, long)]
    all: bool,

    /// Hard link organized posters into the media folders
    #[arg(short, long)]
    copy: bool,

    /// Organize posters without matching to a media folder
    #[arg(short, long)]
    force: bool,

    /// Process only the libraries with the given names
    #[arg(short = 'l', long = "libraries", num_args = 1, action = clap::ArgAction::Append, name = "LIBRARY")]
    libraries: Vec<String>,

    /// Narrow source poster folders with a fuzzy filter
    #[arg(long, name = "FILTER")]
    filter: Option<String>,

    /// Only print planned changes without touching files
    #[arg(short, long)]
    print: bool,

    /// Find and process poster folders not linked to any media
    #[arg(short, long)]
    unlinked: bool,

    /// Generate shell completion
    #[arg(long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        poster_tools::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        Organizer::new(args)?.run()
    }
}
