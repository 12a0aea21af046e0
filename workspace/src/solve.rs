use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use sinebasis::{
    hamiltonian::{ HamOptions, Hamiltonian },
    output,
    potential::Potential,
    scan::ScanConfig,
};

const EXAMPLES: &str = "\
solve: 1D quantum potential solver using a basis expansion.

For simple 1D potentials such as the infinite square well, Kronig-Penney,
etc., this produces a numerical solution by expanding in the eigenbasis of an
infinite square well spanning the potential's domain.

Examples:
  Solve the potential in `kp.cfg` using 200 basis functions:
    solve 200 --potential kp.cfg
  This saves the solution to the default `output.dat` in the current
  directory.

  Keep only the 10 lowest states and deepen the wells:
    solve 200 --potential kp.cfg --solutions 10 --set v0=-30

  Widen the domain beyond the declared regions:
    solve 100 --potential barrier.cfg --xi -5 --xf 15

REQUIRED: potential config file, e.g. `pot.cfg`.
RETURNS: solution output written to file; the first line is the header
`Eigenval      Eigenvec`, followed by one line per state holding its energy
and basis coefficients.";

#[derive(Parser, Debug)]
#[command(about = "1D quantum potential solver", long_about = None)]
struct Args {
    /// Number of basis functions.
    #[arg(default_value_t = 100)]
    n: usize,

    /// Path to the potential configuration file.
    #[arg(long, required_unless_present = "examples")]
    potential: Option<PathBuf>,

    /// Output file.
    #[arg(long, default_value = "output.dat")]
    outfile: PathBuf,

    /// Number of solutions to write; defaults to all of them.
    #[arg(long)]
    solutions: Option<usize>,

    /// Override the left edge of the domain.
    #[arg(long, allow_hyphen_values = true)]
    xi: Option<f64>,

    /// Override the right edge of the domain.
    #[arg(long, allow_hyphen_values = true)]
    xf: Option<f64>,

    /// Adjust a potential parameter, as `name=value`; may be repeated.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, f64)>,

    /// Divisor applied to the smallest parameter magnitude to get the scan
    /// step, in [2, 10].
    #[arg(long, default_value_t = 10.0)]
    divisor: f64,

    /// Fixed scan step, overriding the parameter-based choice.
    #[arg(long)]
    step: Option<f64>,

    /// Print usage examples and exit.
    #[arg(long)]
    examples: bool,
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value)
        = s.split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE; got {s:?}"))?;
    let value: f64
        = value.trim().parse()
        .map_err(|_| format!("cannot parse {:?} as a number", value.trim()))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.examples {
        println!("{}", EXAMPLES);
        return Ok(());
    }
    let path = args.potential.context("missing --potential")?;

    let mut pot = Potential::from_file(&path)
        .with_context(|| format!("failed to read potential {}", path.display()))?;
    if !args.set.is_empty() {
        pot.adjust(args.set.iter().map(|(name, val)| (name.as_str(), *val)))?;
    }

    let opts = HamOptions {
        xi: args.xi,
        xf: args.xf,
        scan: ScanConfig { divisor: args.divisor, step: args.step },
    };
    let ham = Hamiltonian::with_options(pot, args.n, opts)?;
    let sols = ham.solutions(args.solutions.unwrap_or(args.n))?;
    output::save(&args.outfile, &sols)
        .with_context(|| format!("failed to write {}", args.outfile.display()))?;

    let (xi, xf) = ham.domain();
    let barriers = ham.barriers();
    println!("potential: {}", path.display());
    println!("domain: [{}, {}]; {} basis functions", xi, xf, ham.n_basis());
    println!(
        "barriers: {} interior{}",
        barriers.centers().len(),
        if barriers.has_vacuum() { " + vacuum edges" } else { "" },
    );
    for (k, sol) in sols.iter().take(5).enumerate() {
        println!("E[{}] = {:.10}", k, sol.e);
    }
    if sols.len() > 5 { println!("..."); }
    println!("wrote {} solutions to {}", sols.len(), args.outfile.display());
    Ok(())
}
