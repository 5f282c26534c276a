// src/supertile/mod.rs

//! Vivante 64x64 supertile layout and its resolve to linear.
//!
//! A supertile holds 64x64 pixels of 4 bytes. It is built from 16x16 tiles of
//! 4x4 pixels; each tile is 16 pixels in row-major order (64 bytes). Tiles are
//! grouped two wide and four tall, and the groups fill the supertile in
//! row-major order (8 groups across, 4 down). The resulting tile index for
//! tile column `tx` and tile row `ty` is
//!
//! ```text
//! index = (ty / 4) * 64 + (tx / 2) * 8 + (ty % 4) * 2 + (tx % 2)
//! ```
//!
//! which lays the first rows out as:
//!
//! ```text
//!   0   1   8   9  16  17  24  25  32  33  40  41  48  49  56  57
//!   2   3  10  11  18  19  26  27  34  35  42  43  50  51  58  59
//!   4   5  12  13  20  21  28  29  36  37  44  45  52  53  60  61
//!   6   7  14  15  22  23  30  31  38  39  46  47  54  55  62  63
//!  64  65  72  73  80  81  88  89  96  97 104 105 112 113 120 121
//!  ...
//! 198 199 206 207 214 215 222 223 230 231 238 239 246 247 254 255
//! ```
//!
//! Only one level of nesting exists; this is not a Morton order.
//!
//! Supertiles are stored row-major across the surface. With a tiled pixel
//! stride `stride` (a multiple of 64), supertile `(sx, sy)` starts at pixel
//! `sy * 64 * stride + sx * 4096`. Tiled surfaces are allocated in whole
//! supertiles, so reading a full tile that contains a requested pixel is
//! always in bounds.

use crate::lanes::Native;
use log::trace;
use serde::{Deserialize, Serialize};

pub mod generic;
pub mod simd;


/// Edge of a supertile in pixels.
pub const SUPERTILE_SIZE: usize = 64;
/// Pixels in one supertile.
pub const SUPERTILE_PIXELS: usize = SUPERTILE_SIZE * SUPERTILE_SIZE;
/// Edge of a tile in pixels.
pub const TILE_SIZE: usize = 4;
/// Pixels in one tile.
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;
/// Bytes per pixel. Supertiled render targets are always 32 bpp.
pub const PIXEL_BYTES: usize = 4;

/// Pixels in one group of 2x4 tiles.
pub(crate) const GROUP_PIXELS: usize = 8 * TILE_PIXELS;
/// Pixels in one row of 8 groups (16 scanlines of the supertile).
pub(crate) const GROUP_ROW_PIXELS: usize = 8 * GROUP_PIXELS;
/// Pixels in a tile pair (two horizontally adjacent tiles).
pub(crate) const PAIR_PIXELS: usize = 2 * TILE_PIXELS;

/// Which implementation walks the supertiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvePath {
    /// Raw memory copies, no vector registers.
    #[default]
    Generic,
    /// Lane loads and stores on the native vector unit.
    Vector,
}

/// Tile index of tile `(tx, ty)` inside its supertile.
#[inline(always)]
pub const fn tile_index(tx: usize, ty: usize) -> usize {
    (ty / 4) * 64 + (tx / 2) * 8 + (ty % 4) * 2 + (tx % 2)
}

/// Tile coordinate `(tx, ty)` of tile `index`. Inverse of [`tile_index`].
#[inline(always)]
pub const fn tile_position(index: usize) -> (usize, usize) {
    let group_y = index / 64;
    let group_x = (index % 64) / 8;
    let tile_row = (index % 8) / 2;
    (group_x * 2 + index % 2, group_y * 4 + tile_row)
}

/// Pixel offset of surface pixel `(x, y)` in a supertiled surface of pixel
/// stride `stride`.
#[inline(always)]
pub const fn supertile_offset(x: usize, y: usize, stride: usize) -> usize {
    let (sx, sy) = (x / SUPERTILE_SIZE, y / SUPERTILE_SIZE);
    let (tx, ty) = ((x % SUPERTILE_SIZE) / TILE_SIZE, (y % SUPERTILE_SIZE) / TILE_SIZE);
    sy * SUPERTILE_SIZE * stride
        + sx * SUPERTILE_PIXELS
        + tile_index(tx, ty) * TILE_PIXELS
        + (y % TILE_SIZE) * TILE_SIZE
        + x % TILE_SIZE
}

/// A supertile-aligned source window and its linear destination.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    /// First pixel of the supertile holding the window origin.
    pub src: *const u32,
    /// Destination pixel matching the window origin.
    pub dst: *mut u32,
    pub src_stride: usize,
    pub dst_stride: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    /// Start of supertile `(sx, sy)` relative to the window.
    #[inline(always)]
    pub unsafe fn supertile(&self, sx: usize, sy: usize) -> *const u32 {
        self.src
            .add(sy * SUPERTILE_SIZE * self.src_stride + sx * SUPERTILE_PIXELS)
    }

    /// Destination pixel `(x, y)` relative to the window.
    #[inline(always)]
    pub unsafe fn dst_at(&self, x: usize, y: usize) -> *mut u32 {
        self.dst.add(y * self.dst_stride + x)
    }
}

/// Resolves a supertiled region into a linear one.
///
/// Strides and coordinates are in pixels of 4 bytes. The destination receives
/// exactly `width * height` pixels inside
/// `[dst_x, dst_x + width) x [dst_y, dst_y + height)`. The vector path is
/// used when the host has a 128-bit vector unit. Always returns `true`.
///
/// # Safety
/// `src` must cover the whole supertiles touched by the window, `dst` must be
/// valid for the destination window, and the two must not overlap.
#[allow(clippy::too_many_arguments)]
pub unsafe fn resolve_supertile_to_linear(
    src: *const u32,
    dst: *mut u32,
    src_stride: usize,
    dst_stride: usize,
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
) -> bool {
    let path = if crate::cpu::detect_cpu_vector_features().has_vector128() {
        ResolvePath::Vector
    } else {
        ResolvePath::Generic
    };
    resolve_supertile_with(
        path, src, dst, src_stride, dst_stride, src_x, src_y, dst_x, dst_y, width, height,
    )
}

/// [`resolve_supertile_to_linear`] with an explicit implementation.
///
/// # Safety
/// Same contract as [`resolve_supertile_to_linear`].
#[allow(clippy::too_many_arguments)]
pub unsafe fn resolve_supertile_with(
    path: ResolvePath,
    src: *const u32,
    dst: *mut u32,
    src_stride: usize,
    dst_stride: usize,
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
) -> bool {
    debug_assert!(dst_stride >= dst_x + width, "destination stride too small");
    debug_assert_eq!(src_stride % SUPERTILE_SIZE, 0, "tiled stride not supertile aligned");
    trace!(
        "resolve supertile {:?}: src ({}, {}) -> dst ({}, {}) {}x{}",
        path,
        src_x,
        src_y,
        dst_x,
        dst_y,
        width,
        height
    );
    if width == 0 || height == 0 {
        return true;
    }

    let dst_origin = dst.add(dst_y * dst_stride + dst_x);
    if src_x % SUPERTILE_SIZE != 0 || src_y % SUPERTILE_SIZE != 0 {
        resolve_by_pixel(src, dst_origin, src_stride, dst_stride, src_x, src_y, width, height);
        return true;
    }

    let window = Window {
        src: src.add(supertile_offset(src_x, src_y, src_stride)),
        dst: dst_origin,
        src_stride,
        dst_stride,
        width,
        height,
    };
    match path {
        ResolvePath::Generic => generic::resolve(&window),
        ResolvePath::Vector => simd::resolve::<Native>(&window),
    }
    true
}

/// Per-pixel resolve for source origins that do not start on a supertile.
#[allow(clippy::too_many_arguments)]
unsafe fn resolve_by_pixel(
    src: *const u32,
    dst: *mut u32,
    src_stride: usize,
    dst_stride: usize,
    src_x: usize,
    src_y: usize,
    width: usize,
    height: usize,
) {
    for y in 0..height {
        let row = dst.add(y * dst_stride);
        for x in 0..width {
            *row.add(x) = *src.add(supertile_offset(src_x + x, src_y + y, src_stride));
        }
    }
}

/// Writes a linear region into supertile layout (the inverse resolve).
///
/// Only the pixels of the requested window are written; the rest of each
/// touched tile keeps its contents.
///
/// # Safety
/// `src` must be valid for the linear window, `dst` must cover the touched
/// supertiles, and the two must not overlap.
#[allow(clippy::too_many_arguments)]
pub unsafe fn tile_linear_to_supertile(
    src: *const u32,
    dst: *mut u32,
    src_stride: usize,
    dst_stride: usize,
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
) -> bool {
    debug_assert_eq!(dst_stride % SUPERTILE_SIZE, 0, "tiled stride not supertile aligned");
    for y in 0..height {
        let row = src.add((src_y + y) * src_stride + src_x);
        for x in 0..width {
            *dst.add(supertile_offset(dst_x + x, dst_y + y, dst_stride)) = *row.add(x);
        }
    }
    true
}
