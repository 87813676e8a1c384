use clap::Parser;
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

mod request;

use request::Request;

/// Evaluate arithmetic on raw bit patterns in fixed-point, half
/// precision or single precision.
#[derive(Parser, Debug)]
#[command(name = "bitcalc")]
struct Args {
    /// Numeric format: `h` (half precision), `f` (single precision),
    /// or `A.B` for fixed-point Q(A,B)
    format: String,

    /// Rounding mode selector, 0-3 (only 0, truncation, is
    /// implemented)
    rounding: String,

    /// First operand as a hex bit pattern, e.g. 0x3f800000
    operand: String,

    /// Optional operator (one of + - * /) followed by a second
    /// operand
    #[arg(allow_hyphen_values = true, num_args = 0..)]
    rest: Vec<String>,
}

fn run_evaluator() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // See
    // https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.  Diagnostics go to stderr; stdout carries only the
    // rendered result.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Box::new(e));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let request = Request::from_tokens(&args.format, &args.rounding, &args.operand, &args.rest)?;
    event!(Level::DEBUG, "dispatching request {:?}", &request);
    let rendered = request.evaluate()?;
    println!("{rendered}");
    Ok(())
}

fn main() {
    match run_evaluator() {
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
