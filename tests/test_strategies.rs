// tests/test_strategies.rs — Cross-strategy equivalence for every kernel.
//
// Sequential is the oracle. Every other strategy must reproduce its output
// bit for bit on the integer kernels and within DFT_TOLERANCE on the DFT.

use tessera::kernels::blur::{blur, blur_argb, Filter};
use tessera::kernels::dft::{dft, DFT_TOLERANCE};
use tessera::kernels::grayscale::{grayscale, grayscale_in_place};
use tessera::kernels::julia::{colorize, julia, JuliaConfig};
use tessera::kernels::vector::{vector_op, Float4, VectorOp};
use tessera::{Executor, ExecutorConfig, FlatBuffer, IndexDomain, Launch, Strategy};

// ===== Helpers =====

/// The launch each strategy needs: grids for indexed-grid, bare domains
/// for the rest.
fn launch(strategy: Strategy, domain: IndexDomain) -> Launch {
    match strategy {
        Strategy::IndexedGrid => domain.grid().into(),
        _ => domain.into(),
    }
}

/// Deterministic textured ARGB image.
fn scene(rows: usize, cols: usize) -> FlatBuffer<u32> {
    FlatBuffer::from_fn(rows, cols, |r, c| {
        let red = ((r * 7 + c * 3) % 256) as u32;
        let green = ((r * c) % 256) as u32;
        let blue = if (r / 8 + c / 8) % 2 == 0 { 230 } else { 20 };
        0xff00_0000 | red << 16 | green << 8 | blue
    })
}

fn channel(rows: usize, cols: usize) -> FlatBuffer<u8> {
    FlatBuffer::from_fn(rows, cols, |r, c| ((r * 31 + c * 17) % 256) as u8)
}

// ===== Blur =====

#[test]
fn blur_agrees_across_strategies() {
    let input = channel(45, 61);
    let domain = input.domain().unwrap();
    let filter = Filter::uniform(7).unwrap();

    let mut oracle = FlatBuffer::new(45, 61);
    blur(&Executor::new(Strategy::Sequential), domain, &input, &filter, &mut oracle).unwrap();

    for strategy in Strategy::ALL {
        let mut out = FlatBuffer::new(45, 61);
        blur(&Executor::new(strategy), launch(strategy, domain), &input, &filter, &mut out).unwrap();
        assert_eq!(out, oracle, "{strategy} disagrees with sequential");
    }
}

#[test]
fn blur_argb_agrees_with_explicit_partition() {
    let image = scene(64, 48);
    let domain = image.domain().unwrap();
    let filter = Filter::uniform(5).unwrap();

    let oracle = blur_argb(&Executor::new(Strategy::Sequential), domain, &image, &filter).unwrap();
    let grid = domain.partition(16, 16).unwrap();
    let out = blur_argb(&Executor::new(Strategy::IndexedGrid), grid, &image, &filter).unwrap();
    assert_eq!(out, oracle);
}

// ===== Grayscale =====

#[test]
fn grayscale_agrees_across_strategies() {
    let image = scene(33, 50);
    let domain = image.domain().unwrap();

    let mut oracle = FlatBuffer::new(33, 50);
    grayscale(&Executor::new(Strategy::Sequential), domain, &image, &mut oracle).unwrap();

    for strategy in Strategy::ALL {
        let exec = Executor::new(strategy);
        let mut out = FlatBuffer::new(33, 50);
        grayscale(&exec, launch(strategy, domain), &image, &mut out).unwrap();
        assert_eq!(out, oracle, "{strategy}: out-of-place");

        let mut inplace = image.clone();
        grayscale_in_place(&exec, launch(strategy, domain), &mut inplace).unwrap();
        assert_eq!(inplace, oracle, "{strategy}: in-place");
    }
}

// ===== Julia =====

#[test]
fn julia_agrees_across_strategies() {
    let domain = IndexDomain::new_2d(96, 128).unwrap();
    let cfg = JuliaConfig::default();
    let seq = Executor::new(Strategy::Sequential);

    let mut hue0 = FlatBuffer::for_domain(&domain);
    let mut bright0 = FlatBuffer::for_domain(&domain);
    julia(&seq, domain, cfg, &mut hue0, &mut bright0).unwrap();

    for strategy in Strategy::ALL {
        let mut hue = FlatBuffer::for_domain(&domain);
        let mut bright = FlatBuffer::for_domain(&domain);
        julia(&Executor::new(strategy), launch(strategy, domain), cfg, &mut hue, &mut bright).unwrap();
        assert_eq!(hue, hue0, "{strategy}: hue");
        assert_eq!(bright, bright0, "{strategy}: brightness");
    }

    // The view contains both escaping and trapped points.
    assert!(bright0.as_slice().contains(&0.0));
    assert!(bright0.as_slice().contains(&1.0));
}

#[test]
fn julia_centre_matches_sequential_reference() {
    // The centre starts at z = 0. Whether and when it escapes under
    // c = -0.7 + 0.27015i is whatever the sequential run says; every
    // strategy must report the same.
    let domain = IndexDomain::new_2d(64, 64).unwrap();
    let centre = (32, 32);
    let mut reference = None;
    for strategy in Strategy::ALL {
        let mut hue = FlatBuffer::for_domain(&domain);
        let mut bright = FlatBuffer::for_domain(&domain);
        julia(&Executor::new(strategy), launch(strategy, domain), JuliaConfig::default(), &mut hue, &mut bright)
            .unwrap();
        let here = (hue.get(centre.0, centre.1), bright.get(centre.0, centre.1));
        assert!(here.0.is_finite());
        match reference {
            None => reference = Some(here),
            Some(r) => assert_eq!(here, r, "{strategy}"),
        }
    }
}

#[test]
fn julia_colorize_agrees_across_strategies() {
    let domain = IndexDomain::new_2d(40, 40).unwrap();
    let seq = Executor::new(Strategy::Sequential);
    let mut hue = FlatBuffer::for_domain(&domain);
    let mut bright = FlatBuffer::for_domain(&domain);
    julia(&seq, domain, JuliaConfig::default(), &mut hue, &mut bright).unwrap();

    let oracle = colorize(&seq, domain, &hue, &bright).unwrap();
    for strategy in Strategy::ALL {
        let out = colorize(&Executor::new(strategy), launch(strategy, domain), &hue, &bright).unwrap();
        assert_eq!(out, oracle, "{strategy}");
    }
}

// ===== DFT =====

#[test]
fn dft_agrees_within_tolerance() {
    let n = 64;
    let v: Vec<f32> = (0..n).map(|i| 1.0 / (i + 2) as f32).collect();
    let re = FlatBuffer::from_vec_1d(v.clone());
    let im = FlatBuffer::from_vec_1d(v);
    let domain = IndexDomain::new_1d(n).unwrap();

    let mut re0 = FlatBuffer::new_1d(n);
    let mut im0 = FlatBuffer::new_1d(n);
    dft(&Executor::new(Strategy::Sequential), domain, &re, &im, &mut re0, &mut im0).unwrap();

    for strategy in Strategy::ALL {
        let mut out_re = FlatBuffer::new_1d(n);
        let mut out_im = FlatBuffer::new_1d(n);
        dft(&Executor::new(strategy), launch(strategy, domain), &re, &im, &mut out_re, &mut out_im).unwrap();
        for k in 0..n {
            assert!((out_re.get(k, 0) - re0.get(k, 0)).abs() <= DFT_TOLERANCE, "{strategy}: re[{k}]");
            assert!((out_im.get(k, 0) - im0.get(k, 0)).abs() <= DFT_TOLERANCE, "{strategy}: im[{k}]");
        }
    }
}

// ===== Vector =====

#[test]
fn vector_ops_agree_across_strategies() {
    let n = 8192;
    let a = FlatBuffer::from_fn(n, 1, |i, _| Float4::new(i as f32, 1.0, -(i as f32), 0.25));
    let b = FlatBuffer::from_fn(n, 1, |i, _| Float4::splat((i % 7) as f32));
    let domain = IndexDomain::new_1d(n).unwrap();

    for op in [VectorOp::Add, VectorOp::Sub] {
        let mut oracle = FlatBuffer::new_1d(n);
        vector_op(&Executor::new(Strategy::Sequential), domain, op, &a, &b, &mut oracle).unwrap();
        for strategy in Strategy::ALL {
            let mut out = FlatBuffer::new_1d(n);
            vector_op(&Executor::new(strategy), launch(strategy, domain), op, &a, &b, &mut out).unwrap();
            assert_eq!(out, oracle, "{strategy}: {op:?}");
        }
    }
}

// ===== Configuration =====

#[test]
fn dedicated_pool_and_tiny_grain_agree() {
    let input = channel(30, 30);
    let domain = input.domain().unwrap();
    let filter = Filter::uniform(3).unwrap();

    let mut oracle = FlatBuffer::new(30, 30);
    blur(&Executor::new(Strategy::Sequential), domain, &input, &filter, &mut oracle).unwrap();

    let config = ExecutorConfig { threads: Some(3), loop_grain: 7 };
    for strategy in [Strategy::Threaded, Strategy::IndexedLoop, Strategy::IndexedGrid] {
        let exec = Executor::with_config(strategy, config.clone()).unwrap();
        let mut out = FlatBuffer::new(30, 30);
        blur(&exec, launch(strategy, domain), &input, &filter, &mut out).unwrap();
        assert_eq!(out, oracle, "{strategy} on 3 threads");
    }
}
