use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use strider::domain::{Comparison, StridedInterval};
use strider::{Backend, BackendConfig, Op, Value};
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "strider";

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct StriderParams {
    #[command(subcommand)]
    pub command: Commands,
    /// Rounds of value-set sampling before `sample` gives up; stored for later runs
    #[arg(long)]
    pub sample_rounds: Option<usize>,
}

/// Interval operands are written `<bits>:<lo>..<hi>[/<stride>]` or `<bits>:<value>`
#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two intervals, e.g. `compare ULT 8:0..10 8:5..15`
    Compare {
        op: Comparison,
        a: String,
        b: String,
    },
    /// Join two intervals
    Join { a: String, b: String },
    /// Widen the first interval by the second
    Widen { old: String, new: String },
    /// Print the unsigned bounds of an interval
    Bounds { a: String },
    /// Print concrete members of an interval
    Sample {
        a: String,
        #[arg(default_value_t = 8)]
        n: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let params = StriderParams::parse();
    let config = update_config(&params)?;
    let backend = Backend::with_config(config);
    match params.command {
        Commands::Compare { op, a, b } => {
            let (a, b) = (parse_interval(&a)?, parse_interval(&b)?);
            let result = backend.call(Op::from(op), [a.into(), b.into()], 1)?;
            print_value(&result);
        }
        Commands::Join { a, b } => {
            let (a, b) = (parse_interval(&a)?, parse_interval(&b)?);
            let bits = a.bits();
            print_value(&backend.call(Op::Union, [a.into(), b.into()], bits)?);
        }
        Commands::Widen { old, new } => {
            let (old, new) = (parse_interval(&old)?, parse_interval(&new)?);
            let bits = old.bits();
            print_value(&backend.call(Op::Widen, [old.into(), new.into()], bits)?);
        }
        Commands::Bounds { a } => {
            let a = Value::Abstract(parse_interval(&a)?.into());
            println!("{:#x} {:#x}", backend.min(&a)?, backend.max(&a)?);
        }
        Commands::Sample { a, n } => {
            let a = Value::Abstract(parse_interval(&a)?.into());
            println!("{}", backend.eval(&a, n)?.iter().join(" "));
        }
    }
    Ok(())
}

/// Load the stored configuration, overriding it with anything given on the command line
fn update_config(params: &StriderParams) -> anyhow::Result<BackendConfig> {
    let stored: BackendConfig = confy::load(APP_NAME, None)?;
    let Some(sample_rounds) = params.sample_rounds else {
        return Ok(stored);
    };
    let updated = BackendConfig { sample_rounds };
    if updated != stored {
        confy::store(APP_NAME, None, &updated)?;
    }
    Ok(updated)
}

fn print_value(value: &Value) {
    match value {
        Value::Abstract(v) => println!("{v}"),
        Value::Bool(b) => println!("{b}"),
        Value::Int(i) => println!("{i}"),
        Value::Float(f) => println!("{f}"),
        Value::Str(s) => println!("{s}"),
    }
}

fn parse_number(text: &str) -> anyhow::Result<u128> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("invalid number `{text}`"))
}

fn parse_interval(text: &str) -> anyhow::Result<StridedInterval> {
    let (bits, range) = text
        .split_once(':')
        .ok_or_else(|| anyhow!("expected `<bits>:<range>`, got `{text}`"))?;
    let bits: u32 = bits.parse().with_context(|| format!("invalid width `{bits}`"))?;
    let (range, stride) = match range.split_once('/') {
        Some((range, stride)) => (range, parse_number(stride)?),
        None => (range, 1),
    };
    let si = match range.split_once("..") {
        Some((lo, hi)) => StridedInterval::new(bits, stride, parse_number(lo)?, parse_number(hi)?)?,
        None if stride == 1 => StridedInterval::point(bits, parse_number(range)?)?,
        None => bail!("a single value takes no stride: `{text}`"),
    };
    Ok(si)
}
