//! Size-sweep runner: times each multiply strategy and cross-checks the
//! results against the direct i-k-j kernel.

use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::Parser;
use haifisch::multiply::kernel::matmul_ikj;
use haifisch::{Config, Matrix, Multiplier, Strategy};
use log::info;

#[derive(Debug, Parser)]
#[command(version, about = "Time naive vs Strassen multiplication over a sweep of sizes")]
struct Cli {
    /// Square sizes to sweep, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [8, 16, 32, 33, 64, 127, 128, 129, 256]
    )]
    sizes: Vec<usize>,

    /// Timed runs per method (after one warmup run)
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Worker threads for the naive strategy (0 = all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Side length where Strassen switches to the direct kernel
    #[arg(long)]
    strassen_leaf: Option<usize>,

    /// Compute Strassen's seven sub-products in parallel
    #[arg(long)]
    parallel_strassen: bool,
}

struct Row {
    size: usize,
    strategy: Strategy,
    naive: Duration,
    strassen: Option<Duration>,
    dispatch: Duration,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = env_logger::try_init();

    let mut config = Config::from_env().context("reading HAIFISCH_* environment")?;
    if let Some(threads) = cli.threads {
        config.num_threads = threads;
    }
    if let Some(leaf) = cli.strassen_leaf {
        config.strassen_leaf = leaf;
    }
    config.parallel_strassen |= cli.parallel_strassen;

    let multiplier = Multiplier::new(config)?;

    println!("=== Matrix Multiplication Sweep ===\n");
    println!(
        "Threads: {}, Strassen leaf: {}, parallel Strassen: {}\n",
        multiplier.num_threads(),
        multiplier.config().strassen_leaf,
        multiplier.config().parallel_strassen
    );

    let mut rows = Vec::with_capacity(cli.sizes.len());
    for &size in &cli.sizes {
        rows.push(run_size(&multiplier, size, cli.iterations)?);
    }

    print_summary_table(&rows);
    Ok(())
}

fn run_size(multiplier: &Multiplier, size: usize, iterations: usize) -> anyhow::Result<Row> {
    println!("Matrix: {}×{}", size, size);
    println!("{}", "-".repeat(50));

    let n = size * size;
    let a = Matrix::from_vec(size, size, (0..n).map(|i| (i % 100) as f64).collect())?;
    let b = Matrix::from_vec(size, size, (0..n).map(|i| (i % 97) as f64).collect())?;
    info!(
        "operands: {} elements each, {:.3} MiB",
        a.len(),
        a.memory_footprint() as f64 / 1024.0 / 1024.0
    );

    let mut expected = vec![0.0; n];
    matmul_ikj(a.as_slice(), b.as_slice(), &mut expected, size, size, size);

    let (naive, c) = bench_fn(iterations, || multiplier.multiply_using(Strategy::Naive, &a, &b))?;
    check("naive", size, c.as_slice(), &expected)?;
    report("Naive", naive, size);

    let strategy = Strategy::select(a.shape(), b.shape());
    let strassen = if strategy == Strategy::Strassen {
        let (elapsed, c) =
            bench_fn(iterations, || multiplier.multiply_using(Strategy::Strassen, &a, &b))?;
        check("strassen", size, c.as_slice(), &expected)?;
        report("Strassen", elapsed, size);
        Some(elapsed)
    } else {
        None
    };

    let (dispatch, c) = bench_fn(iterations, || multiplier.multiply(&a, &b))?;
    check("dispatch", size, c.as_slice(), &expected)?;
    report(&format!("Dispatch ({:?})", strategy), dispatch, size);
    println!();

    Ok(Row {
        size,
        strategy,
        naive,
        strassen,
        dispatch,
    })
}

/// Run `f` once to warm up, then `iterations` more times, and return the
/// mean wall-clock time of the timed runs with the last result.
fn bench_fn<F, R>(iterations: usize, mut f: F) -> haifisch::Result<(Duration, R)>
where
    F: FnMut() -> haifisch::Result<R>,
{
    // Warmup
    let mut last = f()?;

    let runs = iterations.max(1);
    let start = Instant::now();
    for _ in 0..runs {
        last = f()?;
    }
    let avg = start.elapsed() / runs as u32;
    Ok((avg, last))
}

fn check(name: &str, size: usize, actual: &[f64], expected: &[f64]) -> anyhow::Result<()> {
    for (i, (&got, &want)) in actual.iter().zip(expected).enumerate() {
        if (got - want).abs() > 1e-8 * want.abs().max(1.0) {
            bail!(
                "{name}: mismatch at {size}x{size} index {i}: expected {want}, got {got}"
            );
        }
    }
    Ok(())
}

fn report(name: &str, elapsed: Duration, size: usize) {
    let secs = elapsed.as_secs_f64();
    let gflops = 2.0 * (size * size * size) as f64 / secs / 1e9;
    println!(
        "  {:20} {:10.3} ms  {:6.2} GFLOPS",
        name,
        secs * 1000.0,
        gflops
    );
}

fn print_summary_table(rows: &[Row]) {
    println!("\n{}", "=".repeat(72));
    println!("SUMMARY");
    println!("{}", "=".repeat(72));

    println!(
        "\n{:<10} {:>14} {:>14} {:>14} {:>12}",
        "Size", "Naive", "Strassen", "Dispatch", "Strategy"
    );
    println!("{}", "-".repeat(72));

    for row in rows {
        let strassen = match row.strassen {
            Some(elapsed) => format!("{:.3} ms", elapsed.as_secs_f64() * 1000.0),
            None => "-".to_string(),
        };
        println!(
            "{:<10} {:>11.3} ms {:>14} {:>11.3} ms {:>12}",
            row.size,
            row.naive.as_secs_f64() * 1000.0,
            strassen,
            row.dispatch.as_secs_f64() * 1000.0,
            format!("{:?}", row.strategy)
        );
    }

    println!("{}", "=".repeat(72));
    println!("\nAll results matched the direct i-k-j kernel.\n");
}
