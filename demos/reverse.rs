use clap::{Parser, ValueEnum};
use reverse_ge_rs::{AssemblyConfig, Assembler, Grammar, ParseOptions, StrategyKind};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Finds a genome that maps to a target string under a BNF grammar.
///
/// Usage: cargo run --example reverse -- --grammar-file grammars/expression.bnf --target "(x+y)"
#[derive(Parser)]
#[command(name = "reverse")]
#[command(about = "Reconstruct a GE genome from a target phenotype")]
struct Args {
    /// BNF grammar to parse the target with
    #[arg(long)]
    grammar_file: PathBuf,

    /// String the genome must decode to
    #[arg(long)]
    target: String,

    /// Print only the genome
    #[arg(long)]
    silent: bool,

    #[arg(long, value_enum, default_value_t = Strategy::FixedPoint)]
    strategy: Strategy,

    /// Column count substituted for GE_RANGE:dataset_n_vars
    #[arg(long)]
    dataset_n_vars: Option<usize>,

    /// Give up after this many growth passes
    #[arg(long)]
    max_passes: Option<usize>,

    /// Give up after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Print the derivation tree
    #[arg(long)]
    tree: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    FixedPoint,
    Lookahead,
}

impl From<Strategy> for StrategyKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::FixedPoint => StrategyKind::FixedPoint,
            Strategy::Lookahead => StrategyKind::Lookahead,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut options = ParseOptions::default();
    if let Some(n_vars) = args.dataset_n_vars {
        options = options.with_dataset_n_vars(n_vars);
    }
    let grammar = match Grammar::from_file(&args.grammar_file, &options) {
        Ok(grammar) => grammar,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut config = AssemblyConfig::default().with_strategy(args.strategy.into());
    if let Some(passes) = args.max_passes {
        config = config.with_max_passes(passes);
    }
    if let Some(seconds) = args.time_limit {
        config = config.with_time_limit(Duration::from_secs(seconds));
    }

    let solution = match Assembler::new(&grammar).with_config(config).assemble(&args.target) {
        Ok(solution) => solution,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let genome = solution
        .genome
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    if args.silent {
        println!("[{}]", genome);
        return ExitCode::SUCCESS;
    }

    println!("Target:     {}", args.target);
    println!("Phenotype:  {}", solution.phenotype);
    println!("Genome:     [{}]", genome);

    println!("\n=== Statistics ===");
    println!("Root: {}", grammar.name(solution.root));
    println!("Codons used: {}", solution.used_codons());
    println!("Tree nodes: {}", solution.tree.len());
    println!("Tree depth: {}", solution.tree.depth());
    println!("Growth passes: {}", solution.passes);
    println!("Snippets required: {}", solution.snippet_count);

    if args.tree {
        println!("\n=== Derivation ===");
        print!("{}", solution.tree.pretty(&grammar));
    }

    ExitCode::SUCCESS
}
