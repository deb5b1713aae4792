//! AlgoVerse trace engine CLI.
//!
//! Provides the `algoverse` binary: list the algorithm catalog, record a
//! trace as JSON, play one back headlessly, and run the property checker or
//! benchmarks. Machine-readable results go to stdout, logs and errors to
//! stderr.

mod config;

use std::path::PathBuf;
use std::process;
use std::thread;

use clap::{Args, Parser, Subcommand};

use algoverse_core::{StepRecord, TraceError};
use algoverse_playback::{PlaybackConfig, PlaybackController, PlaybackState, SystemClock};
use algoverse_trace::{
    check_properties, run_benchmark, standard_catalog, BenchmarkConfig, PropertyCheckConfig,
    RecorderConfig,
};

use crate::config::CliConfig;

/// Algorithm trace recorder and player.
#[derive(Parser)]
#[command(name = "algoverse", about = "Algorithm trace recorder and player")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where to read an algorithm input from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputSource {
    /// Input as inline JSON, e.g. '{"sequence":[3,1,2]}'.
    #[arg(short, long)]
    input: Option<String>,

    /// Path to a JSON input file.
    #[arg(long)]
    input_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List registered algorithms with their expected input shapes.
    List,

    /// Record a trace and print it as JSON.
    Record {
        /// Algorithm id, e.g. bubble-sort.
        #[arg(short, long)]
        algorithm: String,

        #[command(flatten)]
        source: InputSource,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,

        /// Step limit (default: $ALGOVERSE_MAX_STEPS or 100000).
        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Record a trace and play it back in real time.
    Play {
        #[arg(short, long)]
        algorithm: String,

        #[command(flatten)]
        source: InputSource,

        /// Speed multiplier, clamped to [0.25, 4].
        #[arg(short, long, default_value_t = 1.0)]
        speed: f64,

        /// Milliseconds per step at speed 1 (default:
        /// $ALGOVERSE_BASE_INTERVAL_MS or 1000).
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Check determinism and well-formedness on random inputs.
    Check {
        /// Random inputs per algorithm.
        #[arg(short = 'n', long, default_value_t = 25)]
        iterations: u32,

        /// Random seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Largest generated input size.
        #[arg(long, default_value_t = 12)]
        max_size: usize,
    },

    /// Measure recording time and trace size at several input sizes.
    Bench {
        #[arg(short, long)]
        algorithm: String,

        /// Comma-separated input sizes.
        #[arg(long, value_delimiter = ',', default_values_t = [10, 50, 100])]
        sizes: Vec<usize>,

        /// Runs per size.
        #[arg(short = 'n', long, default_value_t = 3)]
        iterations: u32,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();

    let exit_code = match cli.command {
        Commands::List => run_list(),
        Commands::Record {
            algorithm,
            source,
            pretty,
            max_steps,
        } => run_record(
            &algorithm,
            &source,
            pretty,
            max_steps.unwrap_or(config.max_steps),
        ),
        Commands::Play {
            algorithm,
            source,
            speed,
            interval_ms,
        } => {
            let base_interval = interval_ms
                .filter(|ms| *ms > 0)
                .map(std::time::Duration::from_millis)
                .unwrap_or(config.base_interval);
            run_play(&algorithm, &source, speed, base_interval, config.max_steps)
        }
        Commands::Check {
            iterations,
            seed,
            max_size,
        } => run_check(PropertyCheckConfig {
            iterations,
            random_seed: seed,
            max_size,
        }),
        Commands::Bench {
            algorithm,
            sizes,
            iterations,
            seed,
        } => run_bench(
            &algorithm,
            BenchmarkConfig {
                sizes,
                iterations,
                random_seed: seed,
            },
        ),
    };
    process::exit(exit_code);
}

/// Print the catalog as JSON.
fn run_list() -> i32 {
    let entries: Vec<serde_json::Value> = standard_catalog()
        .descriptors()
        .map(|d| {
            serde_json::json!({
                "id": d.id,
                "name": d.name,
                "category": d.category,
                "expectedShape": d.shape.to_string(),
            })
        })
        .collect();
    print_json(&entries, true)
}

/// Execute the record subcommand.
///
/// Returns exit code: 0 = success, 1 = invalid input or unknown algorithm,
/// 3 = I/O error.
fn run_record(algorithm: &str, source: &InputSource, pretty: bool, max_steps: usize) -> i32 {
    let json = match read_input(source) {
        Ok(json) => json,
        Err(code) => return code,
    };
    let config = RecorderConfig { max_steps };
    match standard_catalog().record_json(algorithm, &json, &config) {
        Ok(run) => print_json(&run, pretty),
        Err(e) => report_trace_error(&e),
    }
}

/// Execute the play subcommand: record, then advance in real time and print
/// each step as the cursor reaches it.
fn run_play(
    algorithm: &str,
    source: &InputSource,
    speed: f64,
    base_interval: std::time::Duration,
    max_steps: usize,
) -> i32 {
    let json = match read_input(source) {
        Ok(json) => json,
        Err(code) => return code,
    };
    let run = match standard_catalog().record_json(algorithm, &json, &RecorderConfig { max_steps })
    {
        Ok(run) => run,
        Err(e) => return report_trace_error(&e),
    };

    let playback_config = PlaybackConfig {
        base_interval,
        initial_speed: speed,
    };
    let mut controller = match PlaybackController::with_config(playback_config, SystemClock::new())
    {
        Ok(c) => c.with_sink(print_step),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if let Err(e) = controller.load(run) {
        eprintln!("Error: {}", e);
        return 1;
    }
    controller.play();
    let period = base_interval.div_f64(controller.speed());
    while controller.state() == PlaybackState::Playing {
        thread::sleep(period);
        controller.tick();
    }
    0
}

fn print_step(step: &StepRecord) {
    let marker = if step.terminal { " (done)" } else { "" };
    println!(
        "[{:>4}] {:<8} {}{}",
        step.sequence_index,
        step.kind.to_string(),
        step.description,
        marker
    );
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 = all checks passed, 2 = property failures.
fn run_check(config: PropertyCheckConfig) -> i32 {
    let result = check_properties(standard_catalog(), &config);
    let code = print_json(&result, true);
    if code != 0 {
        return code;
    }
    if result.is_success() {
        0
    } else {
        eprintln!(
            "{} of {} property checks failed (seed {})",
            result.failures.len(),
            result.total_run,
            result.random_seed
        );
        2
    }
}

/// Execute the bench subcommand.
fn run_bench(algorithm: &str, config: BenchmarkConfig) -> i32 {
    match run_benchmark(standard_catalog(), algorithm, &config) {
        Ok(results) => print_json(&results, true),
        Err(e) => report_trace_error(&e),
    }
}

/// Read the input JSON text. Parsing happens in the catalog, against the
/// shape the chosen algorithm expects. Errors are reported to stderr and
/// mapped to an exit code.
fn read_input(source: &InputSource) -> Result<String, i32> {
    match (&source.input, &source.input_file) {
        (Some(inline), _) => Ok(inline.clone()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            eprintln!("Error: failed to read '{}': {}", path.display(), e);
            3
        }),
        (None, None) => {
            eprintln!("Error: no input given");
            Err(1)
        }
    }
}

fn report_trace_error(error: &TraceError) -> i32 {
    eprintln!("Error: {}", error);
    1
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> i32 {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            3
        }
    }
}
