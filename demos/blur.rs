// demos/blur.rs
//
// Box-blur an ARGB image channel by channel under one strategy.
// Run with: cargo run --release --example blur -- [--seq|--mt|--loop|--grid] [input.png] [runs]
// Without an input file a synthetic 1024×1024 scene is used.
// Output: $TMPDIR/blurred.png

use std::env;
use std::time::Instant;

use tessera::kernels::blur::{blur_argb, Filter, FILTER_WIDTH};
use tessera::{Executor, FlatBuffer, Launch, Strategy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let strategy: Strategy = match args.get(1) {
        Some(s) => s.parse()?,
        None => Strategy::Sequential,
    };
    let input = match args.get(2) {
        Some(path) => load_argb(path)?,
        None => make_scene(1024, 1024),
    };
    let runs: usize = args.get(3).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(3);

    let domain = input.domain()?;
    let launch: Launch = if strategy.requires_grid() { domain.grid().into() } else { domain.into() };
    let exec = Executor::new(strategy);
    let filter = Filter::uniform(FILTER_WIDTH)?;
    println!("Strategy: {strategy} ({} workers)", exec.workers());
    println!("Image:    {domain}, filter {FILTER_WIDTH}×{FILTER_WIDTH}");

    let mut output = None;
    for run in 0..runs.max(1) {
        let t0 = Instant::now();
        output = Some(blur_argb(&exec, launch, &input, &filter)?);
        println!("  run {run:>2}: {:8.2} ms", t0.elapsed().as_secs_f64() * 1e3);
    }

    if let Some(out) = output {
        let img = image::RgbaImage::from_fn(out.cols() as u32, out.rows() as u32, |x, y| {
            let p = out.get(y as usize, x as usize);
            image::Rgba([(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8])
        });
        let path = env::temp_dir().join("blurred.png");
        img.save(&path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn load_argb(path: &str) -> Result<FlatBuffer<u32>, image::ImageError> {
    let img = image::open(path)?.to_rgba8();
    let (w, h) = img.dimensions();
    Ok(FlatBuffer::from_fn(h as usize, w as usize, |r, c| {
        let [red, green, blue, alpha] = img.get_pixel(c as u32, r as u32).0;
        (alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32
    }))
}

/// Checkerboard with a diagonal gradient, fully opaque.
fn make_scene(rows: usize, cols: usize) -> FlatBuffer<u32> {
    FlatBuffer::from_fn(rows, cols, |r, c| {
        let check = if (r / 64 + c / 64) % 2 == 0 { 220u32 } else { 30 };
        let grad = ((r + c) * 255 / (rows + cols)) as u32;
        0xff00_0000 | check << 16 | grad << 8 | (255 - check)
    })
}
