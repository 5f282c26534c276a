// src/engine.rs

//! The resolve engine: detected capabilities plus the routines picked for
//! them, built once and handed to callers by value.

use crate::blit::{self, CopyStrategy};
use crate::blocktile;
use crate::config::{Config, CONFIG};
use crate::cpu::{detect_cpu_vector_features, CpuFeatures};
use crate::geometry::{area, intersect, BoxRec, Surface};
use crate::lanes::{Lanes, Native};
use crate::supertile::{self, ResolvePath};
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static GLOBAL: Lazy<Engine> =
    Lazy::new(|| Engine::from_config(&CONFIG, detect_cpu_vector_features()));

/// GPU whose tiling the source surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuKind {
    /// Vivante GC1000 class: 64x64 supertiles.
    Etnaviv,
    /// Loongson GSGPU: 4x4 block tiles.
    Gsgpu,
}

/// One resolve: a tiled source window and the linear destination origin.
///
/// Strides are in pixels and `cpp` is bytes per pixel. The window size is the
/// source `width x height`; the destination only contributes its origin and
/// stride.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest {
    pub src: Surface<*const u8>,
    pub dst: Surface<*mut u8>,
}

/// Capabilities and selected strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    features: CpuFeatures,
    copy: CopyStrategy,
    path: ResolvePath,
}

impl Engine {
    /// The process-wide engine, built from [`CONFIG`] on first use.
    pub fn global() -> &'static Engine {
        &GLOBAL
    }

    /// Builds an engine from CPU detection alone.
    pub fn detect() -> Self {
        Engine::from_config(&Config::default(), detect_cpu_vector_features())
    }

    /// Builds an engine for `features`, honoring the overrides in `config`.
    pub fn from_config(config: &Config, features: CpuFeatures) -> Self {
        let copy = match config.copy.strategy.fixed() {
            Some(strategy) => strategy.clamp_to(features),
            None => CopyStrategy::select(features),
        };
        let path = if features.has_vector128() && !config.resolve.force_portable {
            ResolvePath::Vector
        } else {
            ResolvePath::Generic
        };
        info!(
            "Resolve engine: features {:?}, copy {:?}, resolve {:?} ({} lanes)",
            features,
            copy,
            path,
            Native::NAME
        );
        Engine {
            features,
            copy,
            path,
        }
    }

    /// An engine with explicit choices, clamped to the host CPU.
    pub fn with_strategy(copy: CopyStrategy, path: ResolvePath) -> Self {
        let features = detect_cpu_vector_features();
        let path = match path {
            ResolvePath::Vector if !features.has_vector128() => ResolvePath::Generic,
            other => other,
        };
        Engine {
            features,
            copy: copy.clamp_to(features),
            path,
        }
    }

    pub fn features(&self) -> CpuFeatures {
        self.features
    }

    pub fn copy_strategy(&self) -> CopyStrategy {
        self.copy
    }

    pub fn resolve_path(&self) -> ResolvePath {
        self.path
    }

    /// [`blit::block_copy`] with this engine's strategy.
    ///
    /// # Safety
    /// See [`blit::block_copy`].
    pub unsafe fn block_copy(&self, dst: *mut u8, src: *const u8, len: usize) {
        blit::block_copy(self.copy, dst, src, len)
    }

    /// [`blit::copy_slice`] with this engine's strategy.
    pub fn copy_slice(&self, dst: &mut [u8], src: &[u8]) {
        blit::copy_slice(self.copy, dst, src)
    }

    /// Resolves `req` with the resolver for `gpu`.
    ///
    /// Returns `false` only when the block-tile resolver refuses the pixel
    /// depth.
    ///
    /// # Safety
    /// The surfaces must satisfy the contract of
    /// [`supertile::resolve_supertile_to_linear`] or
    /// [`blocktile::resolve_block_tile_4x4`], respectively.
    pub unsafe fn resolve(&self, gpu: GpuKind, req: &ResolveRequest) -> bool {
        let (src, dst) = (&req.src, &req.dst);
        match gpu {
            GpuKind::Etnaviv => {
                debug_assert_eq!(src.cpp, supertile::PIXEL_BYTES);
                debug_assert_eq!(dst.cpp, supertile::PIXEL_BYTES);
                supertile::resolve_supertile_with(
                    self.path,
                    src.base as *const u32,
                    dst.base as *mut u32,
                    src.stride,
                    dst.stride,
                    src.x,
                    src.y,
                    dst.x,
                    dst.y,
                    src.width,
                    src.height,
                )
            }
            GpuKind::Gsgpu => blocktile::resolve_block_tile_with(
                self.path,
                src.base,
                dst.base,
                src.stride * src.cpp,
                dst.stride * dst.cpp,
                (src.cpp * 8) as u32,
                (dst.cpp * 8) as u32,
                src.x,
                src.y,
                dst.x,
                dst.y,
                src.width,
                src.height,
            ),
        }
    }

    /// Resolves only the parts of `req` covered by `boxes`, given in source
    /// surface coordinates. Boxes are clipped to the source window; the ones
    /// left empty are skipped.
    ///
    /// Returns the number of pixels resolved.
    ///
    /// # Safety
    /// Same contract as [`Engine::resolve`].
    pub unsafe fn resolve_boxes(
        &self,
        gpu: GpuKind,
        req: &ResolveRequest,
        boxes: &[BoxRec],
    ) -> i64 {
        let bounds = req.src.bounds();
        let mut resolved = 0i64;
        for b in boxes {
            let mut clip = BoxRec::default();
            if !intersect(&mut clip, b, &bounds) {
                continue;
            }
            let dx = (clip.x1 - bounds.x1) as usize;
            let dy = (clip.y1 - bounds.y1) as usize;
            let part = ResolveRequest {
                src: Surface {
                    x: clip.x1 as usize,
                    y: clip.y1 as usize,
                    width: clip.width() as usize,
                    height: clip.height() as usize,
                    ..req.src
                },
                dst: Surface {
                    x: req.dst.x + dx,
                    y: req.dst.y + dy,
                    width: clip.width() as usize,
                    height: clip.height() as usize,
                    ..req.dst
                },
            };
            if self.resolve(gpu, &part) {
                resolved += i64::from(area(&clip));
            }
        }
        debug!("Resolved {} pixels from {} boxes", resolved, boxes.len());
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyChoice;
    use crate::supertile::supertile_offset;

    fn surfaces(
        tiled: &[u32],
        tiled_stride: usize,
        linear: &mut [u32],
        linear_stride: usize,
        width: usize,
        height: usize,
    ) -> ResolveRequest {
        ResolveRequest {
            src: Surface {
                base: tiled.as_ptr() as *const u8,
                stride: tiled_stride,
                x: 0,
                y: 0,
                width,
                height,
                cpp: 4,
            },
            dst: Surface {
                base: linear.as_mut_ptr() as *mut u8,
                stride: linear_stride,
                x: 0,
                y: 0,
                width,
                height,
                cpp: 4,
            },
        }
    }

    #[test]
    fn it_should_pick_the_widest_strategy_without_overrides() {
        let engine = Engine::from_config(&Config::default(), CpuFeatures::SSE2 | CpuFeatures::AVX);
        assert_eq!(engine.copy_strategy(), CopyStrategy::Vector256);
        assert_eq!(engine.resolve_path(), ResolvePath::Vector);

        let engine = Engine::from_config(&Config::default(), CpuFeatures::empty());
        assert_eq!(engine.copy_strategy(), CopyStrategy::Portable);
        assert_eq!(engine.resolve_path(), ResolvePath::Generic);
    }

    #[test_log::test]
    fn it_should_honor_and_clamp_config_overrides() {
        let mut config = Config::default();
        config.copy.strategy = StrategyChoice::Vector256;
        config.resolve.force_portable = true;

        let engine = Engine::from_config(&config, CpuFeatures::NEON);
        assert_eq!(engine.copy_strategy(), CopyStrategy::Vector128);
        assert_eq!(engine.resolve_path(), ResolvePath::Generic);
    }

    #[test]
    fn it_should_share_one_global_engine() {
        assert!(std::ptr::eq(Engine::global(), Engine::global()));
        assert_eq!(Engine::global().features(), detect_cpu_vector_features());
    }

    #[test]
    fn it_should_copy_with_its_strategy() {
        let engine = Engine::detect();
        let src: Vec<u8> = (0..200u8).collect();
        let mut dst = vec![0u8; 200];
        engine.copy_slice(&mut dst, &src);
        assert_eq!(dst, src);
    }

    #[test]
    fn it_should_route_etnaviv_and_gsgpu_to_their_resolvers() {
        let tiled: Vec<u32> = (0..128 * 64).map(|i| i as u32).collect();
        for path in [ResolvePath::Generic, ResolvePath::Vector] {
            let engine = Engine::with_strategy(CopyStrategy::Portable, path);

            let mut linear = vec![0u32; 100 * 40];
            let req = surfaces(&tiled, 128, &mut linear, 100, 100, 40);
            assert!(unsafe { engine.resolve(GpuKind::Etnaviv, &req) });
            assert_eq!(linear[39 * 100 + 99], supertile_offset(99, 39, 128) as u32);

            let mut linear = vec![0u32; 8 * 4];
            let req = surfaces(&tiled, 8, &mut linear, 8, 8, 4);
            assert!(unsafe { engine.resolve(GpuKind::Gsgpu, &req) });
            assert_eq!(&linear[..8], &[0, 1, 4, 5, 16, 17, 20, 21]);
        }
    }

    #[test]
    fn it_should_resolve_only_the_clipped_boxes() {
        let tiled: Vec<u32> = (1..=64 * 64).collect();
        let engine = Engine::detect();
        let mut linear = vec![0u32; 64 * 64];
        let req = surfaces(&tiled, 64, &mut linear, 64, 64, 64);

        let boxes = [
            BoxRec::new(0, 0, 8, 8),
            BoxRec::new(60, 60, 80, 80), // clipped to 4x4
            BoxRec::new(70, 0, 90, 10),  // outside
        ];
        let resolved = unsafe { engine.resolve_boxes(GpuKind::Etnaviv, &req, &boxes) };
        assert_eq!(resolved, 64 + 16);

        for y in 0..64 {
            for x in 0..64 {
                let inside = (x < 8 && y < 8) || (x >= 60 && y >= 60);
                let want = if inside {
                    tiled[supertile_offset(x, y, 64)]
                } else {
                    0
                };
                assert_eq!(linear[y * 64 + x], want, "({}, {})", x, y);
            }
        }
    }
}
