use std::fmt::Display;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use numseq::{FibStrategy, DEFAULT_LEN};
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

/// Compute factorials, Fibonacci numbers and FizzBuzz sequences
#[derive(Parser)]
#[command(name = "numseq", version)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute n!
    Factorial {
        /// Non-negative index
        #[arg(allow_negative_numbers = true)]
        n: String,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Compute the n-th Fibonacci number
    Fib {
        /// Non-negative index
        #[arg(allow_negative_numbers = true)]
        n: String,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value_t = FibStrategy::Iterative)]
        strategy: FibStrategy,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the FizzBuzz sequence, one element per line
    Fizzbuzz {
        /// Sequence length
        #[arg(allow_negative_numbers = true)]
        n: Option<String>,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Print only the number of decimal digits of the result
    #[arg(long)]
    digits: bool,

    /// Print how long the computation took
    #[arg(long)]
    time: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("numseq started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli.command) {
        if is_broken_pipe(&e) {
            debug!("stdout closed, stopping");
            return;
        }
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    match command {
        Commands::Factorial { n, output } => {
            let n = numseq::parse_index(&n)?;
            report(&mut out, &output, || numseq::factorial(n))?;
        }
        Commands::Fib {
            n,
            strategy,
            output,
        } => {
            let n = numseq::parse_index(&n)?;
            report(&mut out, &output, || strategy.compute(n))?;
        }
        Commands::Fizzbuzz { n } => {
            let n = match n {
                Some(n) => numseq::parse_length(&n)?,
                None => DEFAULT_LEN,
            };
            for element in numseq::fizzbuzz_iter(n) {
                writeln!(out, "{element}")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn report<T: Display>(
    out: &mut impl Write,
    output: &OutputArgs,
    compute: impl FnOnce() -> T,
) -> io::Result<()> {
    let start = Instant::now();
    let result = compute();
    let elapsed = start.elapsed();

    if output.digits {
        writeln!(out, "{}", result.to_string().len())?;
    } else {
        writeln!(out, "{result}")?;
    }
    if output.time {
        writeln!(out, "took {:.6} seconds", elapsed.as_secs_f64())?;
    }
    Ok(())
}

/// A reader that hangs up early (`numseq fizzbuzz | head`) is a normal end.
fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
}
