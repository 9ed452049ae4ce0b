//! typed-view - Detachable Typed Memory Views
//!
//! Command line entry point for exercising view operations and the sort
//! engine on values given as arguments.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use typed_view::config::CONFIG_FILE_NAME;
use typed_view::sort::{select_strategy, SortStrategy};
use typed_view::value::number_to_string;
use typed_view::{
    Bounds, ContentType, ElementKind, EngineConfig, Numeric, TypedView, Value,
};

#[derive(Parser)]
#[command(name = "tview")]
#[command(version)]
#[command(about = "Detachable typed memory views", long_about = None)]
struct Cli {
    /// Configuration file (default: search for typed-view.toml upwards)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a start/end pair against a length
    Bounds {
        /// Sequence length
        #[arg(short, long)]
        len: usize,

        /// Relative start
        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        start: f64,

        /// Relative end (default: length)
        #[arg(long, allow_hyphen_values = true)]
        end: Option<f64>,
    },

    /// Show or write the configuration
    Config {
        /// Write the active configuration to this file
        #[arg(long, value_name = "PATH")]
        init: Option<PathBuf>,
    },

    /// Move a block of elements within the view
    CopyWithin {
        /// Destination index
        #[arg(long, allow_hyphen_values = true)]
        target: f64,

        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        start: f64,

        #[arg(long, allow_hyphen_values = true)]
        end: Option<f64>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Fill a window with one value
    Fill {
        /// Value to store
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        start: f64,

        #[arg(long, allow_hyphen_values = true)]
        end: Option<f64>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Copy a window into a new view
    Slice {
        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        start: f64,

        #[arg(long, allow_hyphen_values = true)]
        end: Option<f64>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Sort the values with the default ordering
    Sort {
        /// Sort descending through a comparator (stable merge sort)
        #[arg(long)]
        descending: bool,

        /// Sort this many random values instead of the given ones
        #[arg(long)]
        random: Option<usize>,

        /// Seed for --random
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Repeat the sort and report timing
        #[arg(long)]
        iterations: Option<usize>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// View a window of the same buffer
    Subarray {
        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        begin: f64,

        #[arg(long, allow_hyphen_values = true)]
        end: Option<f64>,

        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args)]
struct ViewArgs {
    /// Element kind (int8, uint8, uint8-clamped, int16, uint16, int32,
    /// uint32, float32, float64, big-int64, big-uint64)
    #[arg(short, long, default_value = "float64")]
    kind: ElementKind,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Element values (NaN, -0 and Infinity accepted)
    #[arg(allow_hyphen_values = true)]
    values: Vec<String>,
}

#[derive(Serialize)]
struct ViewReport {
    kind: ElementKind,
    length: usize,
    byte_offset: usize,
    values: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<SortStrategy>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::load_from_cwd().context("Failed to load configuration")?,
    };
    init_logging(&config);
    config.clone().install().context("Invalid configuration")?;

    match cli.command {
        Commands::Bounds { len, start, end } => cmd_bounds(len, start, end),
        Commands::Config { init } => cmd_config(&config, init.as_ref()),
        Commands::CopyWithin {
            target,
            start,
            end,
            view,
        } => cmd_copy_within(target, start, end, &view),
        Commands::Fill {
            value,
            start,
            end,
            view,
        } => cmd_fill(&value, start, end, &view),
        Commands::Slice { start, end, view } => cmd_slice(start, end, &view),
        Commands::Sort {
            descending,
            random,
            seed,
            iterations,
            view,
        } => cmd_sort(descending, random, seed, iterations, &view),
        Commands::Subarray { begin, end, view } => cmd_subarray(begin, end, &view),
    }
}

fn init_logging(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_bounds(len: usize, start: f64, end: Option<f64>) -> Result<()> {
    let bounds = Bounds::from_relative(start.trunc(), end.map(f64::trunc), len);
    println!(
        "from: {}  to: {}  count: {}",
        bounds.from, bounds.to, bounds.count
    );
    Ok(())
}

fn cmd_config(config: &EngineConfig, init: Option<&PathBuf>) -> Result<()> {
    match init {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(CONFIG_FILE_NAME)
            } else {
                path.clone()
            };
            config
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => {
            let text = toml::to_string_pretty(config).context("Failed to render config")?;
            print!("{}", text);
        }
    }
    Ok(())
}

fn cmd_copy_within(target: f64, start: f64, end: Option<f64>, args: &ViewArgs) -> Result<()> {
    let view = build_view(args)?;
    view.copy_within(&Value::from(target), &Value::from(start), &optional(end))?;
    report(&view, args.json, None)
}

fn cmd_fill(value: &str, start: f64, end: Option<f64>, args: &ViewArgs) -> Result<()> {
    let view = build_view(args)?;
    let value = parse_value(args.kind, value)?;
    view.fill(&value, &Value::from(start), &optional(end))?;
    report(&view, args.json, None)
}

fn cmd_slice(start: f64, end: Option<f64>, args: &ViewArgs) -> Result<()> {
    let view = build_view(args)?;
    let sliced = view.slice(&Value::from(start), &optional(end))?;
    report(&sliced, args.json, None)
}

fn cmd_subarray(begin: f64, end: Option<f64>, args: &ViewArgs) -> Result<()> {
    let view = build_view(args)?;
    let sub = view.subarray(&Value::from(begin), &optional(end))?;
    report(&sub, args.json, None)
}

fn cmd_sort(
    descending: bool,
    random: Option<usize>,
    seed: u64,
    iterations: Option<usize>,
    args: &ViewArgs,
) -> Result<()> {
    let view = match random {
        Some(count) => random_view(args.kind, count, seed)?,
        None => build_view(args)?,
    };
    let comparator = if descending {
        Value::function(|_, args| {
            let a = args.first().cloned().unwrap_or_default();
            let b = args.get(1).cloned().unwrap_or_default();
            match (a, b) {
                (Value::BigInt(a), Value::BigInt(b)) => Ok(Value::from(b.cmp(&a) as i32)),
                (a, b) => Ok(Value::from(b.to_number("sort")? - a.to_number("sort")?)),
            }
        })
    } else {
        Value::Undefined
    };
    let strategy = select_strategy(
        view.kind(),
        view.length(),
        descending,
        &EngineConfig::current().sort,
    );

    if let Some(iterations) = iterations {
        let original = view.to_vec()?;
        let start = Instant::now();
        for _ in 0..iterations {
            let fresh = TypedView::new(view.kind(), original.len())?;
            for (k, v) in original.iter().enumerate() {
                fresh.set(k, &Value::from(*v))?;
            }
            fresh.sort(&comparator)?;
        }
        let elapsed = start.elapsed();
        let avg_ns = elapsed.as_nanos() / iterations.max(1) as u128;
        println!("Sort Benchmark:");
        println!("---------------");
        println!("  Kind: {}", view.kind());
        println!("  Elements: {}", original.len());
        println!("  Strategy: {:?}", strategy);
        println!("  Iterations: {}", iterations);
        println!("  Total time: {:?}", elapsed);
        println!("  Average: {} ns ({:.2} μs)", avg_ns, avg_ns as f64 / 1000.0);
        return Ok(());
    }

    view.sort(&comparator)?;
    report(&view, args.json, Some(strategy))
}

fn optional(n: Option<f64>) -> Value {
    n.map_or(Value::Undefined, Value::from)
}

fn build_view(args: &ViewArgs) -> Result<TypedView> {
    let values = args
        .values
        .iter()
        .map(|s| parse_value(args.kind, s))
        .collect::<Result<Vec<_>>>()?;
    let view = TypedView::new(args.kind, values.len())?;
    for (k, value) in values.iter().enumerate() {
        view.set(k, value)?;
    }
    Ok(view)
}

fn parse_value(kind: ElementKind, s: &str) -> Result<Value> {
    match kind.content_type() {
        ContentType::BigInt => {
            let n: i128 = s
                .trim_end_matches('n')
                .parse()
                .with_context(|| format!("'{}' is not a big integer", s))?;
            Ok(Value::BigInt(n))
        }
        ContentType::Number => {
            let n = match s {
                "NaN" => f64::NAN,
                "Infinity" | "+Infinity" => f64::INFINITY,
                "-Infinity" => f64::NEG_INFINITY,
                _ => s
                    .parse::<f64>()
                    .with_context(|| format!("'{}' is not a number", s))?,
            };
            Ok(Value::from(n))
        }
    }
}

fn random_view(kind: ElementKind, count: usize, seed: u64) -> Result<TypedView> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let view = TypedView::new(kind, count)?;
    for k in 0..count {
        let value = match kind.content_type() {
            ContentType::BigInt => Value::BigInt(i128::from(rng.gen::<i64>())),
            ContentType::Number if kind.is_float() => Value::from(rng.gen_range(-1.0e6..1.0e6)),
            ContentType::Number => Value::from(rng.gen::<i32>()),
        };
        view.set(k, &value)?;
    }
    Ok(view)
}

fn numeric_to_json(n: Numeric) -> serde_json::Value {
    match n {
        Numeric::Number(x) => {
            let integral = x.fract() == 0.0 && x.abs() < 9.0e15 && !(x == 0.0 && x.is_sign_negative());
            if integral {
                serde_json::Value::from(x as i64)
            } else {
                serde_json::Number::from_f64(x)
                    .map(serde_json::Value::Number)
                    .unwrap_or_else(|| serde_json::Value::String(number_to_string(x)))
            }
        }
        Numeric::BigInt(v) => match i64::try_from(v) {
            Ok(v) => serde_json::Value::from(v),
            Err(_) => serde_json::Value::String(v.to_string()),
        },
    }
}

fn report(view: &TypedView, json: bool, strategy: Option<SortStrategy>) -> Result<()> {
    if view.is_detached() {
        bail!("view is detached");
    }
    if json {
        let report = ViewReport {
            kind: view.kind(),
            length: view.length(),
            byte_offset: view.byte_offset(),
            values: view.to_vec()?.into_iter().map(numeric_to_json).collect(),
            strategy,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(strategy) = strategy {
            println!("strategy: {:?}", strategy);
        }
        println!("{} [{}]", view.kind(), view.join(Some(", "))?);
    }
    Ok(())
}
