//! # Loongson Resolve
//!
//! CPU-side resolve of GPU tiled surfaces into linear scanout buffers.
//!
//! Two tiled layouts are handled:
//!
//! - Vivante 64x64 supertiles ([`supertile`]), as rendered by the etnaviv
//!   driver on GC1000 class cores.
//! - 4x4 block tiles ([`blocktile`]), as rendered by the Loongson GSGPU.
//!
//! Each resolver has a portable path and a vector path written once against
//! the [`lanes::Lanes`] abstraction. Bulk copies go through [`blit`], which
//! picks a copy routine from the CPU features found by [`cpu`].
//! [`engine::Engine`] ties detection and configuration together.

pub mod blit;
pub mod blocktile;
pub mod config;
pub mod cpu;
pub mod engine;
pub mod geometry;
pub mod lanes;
pub mod supertile;

pub use blit::{block_copy, select_copy_strategy, CopyStrategy};
pub use blocktile::resolve_block_tile_4x4;
pub use cpu::{detect_cpu_vector_features, CpuFeatures};
pub use engine::{Engine, GpuKind, ResolveRequest};
pub use geometry::{area, intersect, BoxRec, Surface};
pub use supertile::{resolve_supertile_to_linear, ResolvePath};
