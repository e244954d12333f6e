use std::{fs, process::ExitCode, rc::Rc};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use winter::{
    interpreter::{
        alloc::CountingAllocator,
        state::{Config, DEFAULT_GLOBALS_CAPACITY, State},
    },
    run,
};

/// Winter is a small, embeddable, dynamically typed scripting language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells winter to look at a file instead of a script.
    #[arg(short, long)]
    file: bool,

    /// Pipe mode is a feature that automatically prints out the value of the
    /// last statement of a winter script.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Print the parsed tree before evaluating it.
    #[arg(short, long)]
    ast: bool,

    /// Print allocator statistics when the script finishes.
    #[arg(short, long)]
    stats: bool,

    /// Number of bucket chains in the global table.
    #[arg(short, long, default_value_t = DEFAULT_GLOBALS_CAPACITY)]
    capacity: usize,

    /// Log evaluation milestones to stderr. `RUST_LOG` takes precedence.
    #[arg(short, long)]
    verbose: bool,

    contents: String,
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)
                                                    .with_target(true)
                                                    .with_level(true))
                                  .with(filter)
                                  .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let script = if args.file {
        match fs::read_to_string(&args.contents) {
            Ok(script) => script,
            Err(_) => {
                eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                          &args.contents);
                return ExitCode::FAILURE;
            },
        }
    } else {
        args.contents.clone()
    };

    let counting = Rc::new(CountingAllocator::new());
    let config = Config { globals_capacity: args.capacity };

    let code = match execute(&counting, config, &script, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    };

    if args.stats {
        eprintln!("{}", counting.stats());
    }
    code
}

/// Runs the script in a state charged to `counting`.
///
/// Everything the run allocated is released before this returns, so the
/// allocator statistics read afterwards show what leaked.
fn execute(counting: &Rc<CountingAllocator>,
           config: Config,
           script: &str,
           args: &Args)
           -> Result<(), Box<dyn std::error::Error>> {
    let state = State::with_allocator(counting.clone(), config)?;
    if args.ast {
        print_tree(&state, script)?;
    }
    run(&state, script, args.pipe_mode)?;
    Ok(())
}

/// Prints the S-expression dump of the parsed script.
fn print_tree(state: &State, script: &str) -> Result<(), Box<dyn std::error::Error>> {
    match state.parse(script)? {
        Some(tree) => println!("{tree}"),
        None => println!("(block)"),
    }
    Ok(())
}
