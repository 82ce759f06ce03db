// demos/julia.rs
//
// Render the Julia set under one strategy and time repeated runs.
// Run with: cargo run --release --example julia -- [--seq|--mt|--loop|--grid] [size] [runs]
// Output: $TMPDIR/julia.png
//
// Set RUST_LOG=tessera=debug to see per-dispatch spans.

use std::env;
use std::time::Instant;

use tessera::kernels::julia::{colorize, julia, JuliaConfig};
use tessera::{Executor, FlatBuffer, IndexDomain, Launch, Strategy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let strategy: Strategy = match args.get(1) {
        Some(s) => s.parse()?,
        None => Strategy::Sequential,
    };
    let size: usize = args.get(2).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(2048);
    let runs: usize = args.get(3).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(5);

    let domain = IndexDomain::new_2d(size, size)?;
    let launch: Launch = match strategy {
        Strategy::IndexedGrid => domain.partition(largest_tile(size, 16), largest_tile(size, 16))?.into(),
        _ => domain.into(),
    };
    let exec = Executor::new(strategy);
    println!("Strategy: {strategy} ({} workers)", exec.workers());
    println!("Domain:   {domain}");
    if let Some(grid) = launch.worker_grid() {
        println!("Grid:     {grid}");
    }

    let config = JuliaConfig::default();
    let mut hue = FlatBuffer::for_domain(&domain);
    let mut brightness = FlatBuffer::for_domain(&domain);

    let mut best = f64::MAX;
    for run in 0..runs {
        let t0 = Instant::now();
        julia(&exec, launch, config, &mut hue, &mut brightness)?;
        let ms = t0.elapsed().as_secs_f64() * 1e3;
        best = best.min(ms);
        println!("  run {run:>2}: {ms:8.2} ms");
    }
    println!("Best: {best:.2} ms");

    let rgb = colorize(&exec, launch, &hue, &brightness)?;
    let img = image::RgbImage::from_fn(size as u32, size as u32, |x, y| {
        let p = rgb.get(y as usize, x as usize);
        image::Rgb([(p >> 16) as u8, (p >> 8) as u8, p as u8])
    });
    let path = env::temp_dir().join("julia.png");
    img.save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Largest divisor of `n` not above `bound`.
fn largest_tile(n: usize, bound: usize) -> usize {
    (1..=bound.min(n)).rev().find(|d| n % d == 0).unwrap_or(1)
}
