mod cli;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use gramshrink::generator::{Expander, GeneratorConfig};
use gramshrink::grammars::{self, has_nested_parens};
use gramshrink::parser;
use gramshrink::shrink::Shrinker;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let grammar = match &cli.file {
        Some(path) => match parser::parse_file(path) {
            Ok(grammar) => grammar,
            Err(errors) => {
                for error in errors {
                    eprintln!("{}", error);
                }
                return ExitCode::FAILURE;
            }
        },
        None => grammars::assignments(),
    };
    let start = cli.start.clone().unwrap_or_else(|| grammar.start_symbol.clone());

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, "seeded");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let expander = Expander::with_config(&grammar, GeneratorConfig::new().with_max_depth(cli.max_depth));

    for _ in 0..cli.amount {
        let generation = match expander.generate(&start, &mut rng) {
            Ok(generation) => generation,
            Err(error) => {
                eprintln!("{}", error);
                return ExitCode::FAILURE;
            }
        };

        if !cli.shrink {
            println!("{}", generation.output);
            continue;
        }
        if !has_nested_parens(&generation.output) {
            info!(choices = generation.choices.len(), "no nested parentheses, nothing to shrink");
            continue;
        }

        let mut shrinker = Shrinker::new(&expander, start.as_str(), has_nested_parens);
        let minimal = shrinker.shrink(&generation.choices);
        let sentence = match expander.replay(&start, &minimal) {
            Ok(sentence) => sentence,
            Err(error) => {
                eprintln!("{}", error);
                return ExitCode::FAILURE;
            }
        };

        println!("original: {} ({} choices)", generation.output, generation.choices.len());
        println!("minimal: {} ({} choices)", sentence, minimal.len());
        println!("{:?}", minimal);
    }

    ExitCode::SUCCESS
}
