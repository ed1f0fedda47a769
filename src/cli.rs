use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar (default: built-in assignment statements)
    pub file: Option<PathBuf>,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Amount to generate
    #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
    pub amount: u32,

    /// Depth after which only the cheapest alternatives are expanded
    #[arg(short = 'd', long, value_name = "DEPTH", default_value_t = 10)]
    pub max_depth: usize,

    /// Seed for the random choices (default: random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Shrink every sentence containing "((" with a later "))"
    #[arg(long)]
    pub shrink: bool,

    /// Log generation and shrinking steps
    #[arg(short, long)]
    pub verbose: bool,
}
