use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bobbin-player")]
#[command(about = "Bobbin dialogue runner CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Replays the given choices and stops at the next unanswered options.
    Play(PlayArgs),
    /// Runs a fixture directory against its testcase.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[arg(long = "dialogue-dir")]
    pub(crate) dialogue_dir: String,
    #[arg(long = "entry-node")]
    pub(crate) entry_node: Option<String>,
    #[arg(long = "choice")]
    pub(crate) choices: Vec<usize>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "dialogue-dir")]
    pub(crate) dialogue_dir: String,
    #[arg(long = "case")]
    pub(crate) case: Option<String>,
}
