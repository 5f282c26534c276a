// src/bin/resolve-bench.rs

//! Times every resolve path on synthetic surfaces.
//!
//! Usage: `resolve-bench [CONFIG.json]`. Without an argument the
//! configuration comes from `LOONGSON_RESOLVE_CONFIG` or the defaults.

use anyhow::{ensure, Context};
use log::info;
use loongson_resolve::{
    blit::CopyStrategy,
    config::{Config, CONFIG},
    engine::{Engine, GpuKind, ResolveRequest},
    geometry::Surface,
    supertile::{ResolvePath, SUPERTILE_SIZE},
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const PIXEL_BYTES: usize = 4;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            Config::load(&path)
                .with_context(|| format!("Cannot start bench with {}", path.display()))?
        }
        None => CONFIG.clone(),
    };
    let bench = &config.bench;
    ensure!(
        bench.width > 0 && bench.height > 0 && bench.iterations > 0,
        "bench dimensions and iterations must be non-zero: {:?}",
        bench
    );

    let engine = Engine::from_config(&config, Engine::global().features());
    info!(
        "Benchmarking {}x{} surfaces, {} iterations",
        bench.width, bench.height, bench.iterations
    );

    let (width, height) = (bench.width, bench.height);
    let tiled_stride = width.div_ceil(SUPERTILE_SIZE) * SUPERTILE_SIZE;
    let tiled_rows = height.div_ceil(SUPERTILE_SIZE) * SUPERTILE_SIZE;
    let tiled: Vec<u32> = (0..tiled_stride * tiled_rows).map(|i| i as u32).collect();
    let mut linear = vec![0u32; width * height];

    let pixels = width as f64 * height as f64 * f64::from(bench.iterations);
    let mut paths = vec![ResolvePath::Generic];
    if engine.resolve_path() != ResolvePath::Generic {
        paths.push(engine.resolve_path());
    }
    for path in paths {
        let runner = Engine::with_strategy(engine.copy_strategy(), path);
        for gpu in [GpuKind::Etnaviv, GpuKind::Gsgpu] {
            let req = ResolveRequest {
                src: Surface {
                    base: tiled.as_ptr() as *const u8,
                    stride: tiled_stride,
                    x: 0,
                    y: 0,
                    width,
                    height,
                    cpp: PIXEL_BYTES,
                },
                dst: Surface {
                    base: linear.as_mut_ptr() as *mut u8,
                    stride: width,
                    x: 0,
                    y: 0,
                    width,
                    height,
                    cpp: PIXEL_BYTES,
                },
            };
            let elapsed = time(bench.iterations, || {
                // SAFETY: both buffers cover the full request.
                let ok = unsafe { runner.resolve(gpu, &req) };
                debug_assert!(ok);
            });
            report(&format!("{:?} {:?}", gpu, path), pixels * 4.0, elapsed);
        }
    }

    let src: Vec<u8> = tiled.iter().flat_map(|p| p.to_le_bytes()).collect();
    let mut dst = vec![0u8; src.len()];
    let widest = CopyStrategy::select(engine.features()).width();
    for strategy in [
        CopyStrategy::Portable,
        CopyStrategy::Vector128,
        CopyStrategy::Vector256,
    ] {
        if strategy.width() > widest {
            continue;
        }
        let runner = Engine::with_strategy(strategy, engine.resolve_path());
        let elapsed = time(bench.iterations, || runner.copy_slice(&mut dst, &src));
        let bytes = src.len() as f64 * f64::from(bench.iterations);
        report(&format!("copy {:?}", strategy), bytes, elapsed);
    }

    Ok(())
}

fn time(iterations: u32, mut f: impl FnMut()) -> Duration {
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    start.elapsed()
}

fn report(label: &str, bytes: f64, elapsed: Duration) {
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    info!(
        "{:<18} {:>10.3} ms {:>10.1} MiB/s",
        label,
        secs * 1000.0,
        bytes / secs / (1024.0 * 1024.0)
    );
}
