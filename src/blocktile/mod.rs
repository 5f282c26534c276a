// src/blocktile/mod.rs

//! GSGPU 4x4 block-tile layout and its resolve to linear.
//!
//! Tiles of 4x4 pixels are stored row-major across the surface; one row of
//! tiles covers four scanlines and occupies `4 * stride` bytes. Inside a tile
//! the 16 pixels form four 2x2 quads (top-left, top-right, bottom-left,
//! bottom-right), each quad row-major:
//!
//! ```text
//!  0  1 |  4  5
//!  2  3 |  6  7
//! ------+------
//!  8  9 | 12 13
//! 10 11 | 14 15
//! ```
//!
//! Read as four 128-bit vectors `v0..v3`, scanline 0 is the low 64-bit halves
//! of `v0` and `v1` interleaved, scanline 1 the high halves, and scanlines 2
//! and 3 the same for `v2` and `v3`.

use crate::lanes::Native;
use crate::supertile::ResolvePath;
use core::ptr;
use log::{trace, warn};

pub mod simd;


/// Edge of a block tile in pixels.
pub const BLOCK_SIZE: usize = 4;
/// Pixels in one block tile.
pub const BLOCK_PIXELS: usize = BLOCK_SIZE * BLOCK_SIZE;
/// The only pixel depth the layout is defined for.
pub const SUPPORTED_BPP: u32 = 32;

/// Pixel offset of `(x, y)` inside its block tile.
#[inline(always)]
pub const fn block_pixel_index(x: usize, y: usize) -> usize {
    (y / 2) * 8 + (x / 2) * 4 + (y % 2) * 2 + x % 2
}

/// Pixel offset of surface pixel `(x, y)` in a block-tiled surface whose
/// stride is `stride` pixels.
#[inline(always)]
pub const fn block_offset(x: usize, y: usize, stride: usize) -> usize {
    (y / BLOCK_SIZE) * BLOCK_SIZE * stride
        + (x / BLOCK_SIZE) * BLOCK_PIXELS
        + block_pixel_index(x % BLOCK_SIZE, y % BLOCK_SIZE)
}

/// How a `len` long range starting at `origin` splits over block tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spans {
    /// Pixels before the first tile boundary (0..=3).
    pub lead: usize,
    /// Whole tiles after the lead.
    pub body: usize,
    /// Pixels after the last whole tile (0..=3).
    pub tail: usize,
    /// Offset of the first pixel inside its tile.
    pub lead_at: usize,
    /// Tile index holding the lead, or the first body tile if there is none.
    pub first_tile: usize,
}

impl Spans {
    pub fn new(origin: usize, len: usize) -> Self {
        let lead_at = origin % BLOCK_SIZE;
        let lead = ((BLOCK_SIZE - lead_at) % BLOCK_SIZE).min(len);
        let tail = (len - lead) % BLOCK_SIZE;
        let body = (len - lead - tail) / BLOCK_SIZE;
        Self {
            lead,
            body,
            tail,
            lead_at,
            first_tile: origin / BLOCK_SIZE,
        }
    }

    /// Tile index of the first whole tile.
    pub fn body_tile(&self) -> usize {
        self.first_tile + usize::from(self.lead > 0)
    }

    /// Tile index holding the tail.
    pub fn tail_tile(&self) -> usize {
        self.body_tile() + self.body
    }
}

/// Validated geometry of one resolve, all in pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockWindow {
    pub src: *const u32,
    pub dst: *mut u32,
    pub src_stride: usize,
    pub dst_stride: usize,
    pub src_x: usize,
    pub src_y: usize,
    pub width: usize,
    pub height: usize,
}

impl BlockWindow {
    /// First pixel of tile row `tile_y`.
    #[inline(always)]
    pub unsafe fn tile_row(&self, tile_y: usize) -> *const u32 {
        self.src.add(tile_y * BLOCK_SIZE * self.src_stride)
    }
}

/// Resolves a 4x4 block-tiled region into a linear one.
///
/// Strides are in bytes, depths in bits per pixel, coordinates in pixels.
/// Only 32 bpp on both sides is defined; anything else is refused with
/// `false` and the destination is left alone. The vector path is used when
/// the host has a 128-bit vector unit.
///
/// # Safety
/// `src` must cover every tile holding a requested pixel, `dst` must be valid
/// for the destination window, and the two must not overlap.
#[allow(clippy::too_many_arguments)]
pub unsafe fn resolve_block_tile_4x4(
    src: *const u8,
    dst: *mut u8,
    src_stride: usize,
    dst_stride: usize,
    src_bpp: u32,
    dst_bpp: u32,
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
    resolve_block_tile_with(
        path, src, dst, src_stride, dst_stride, src_bpp, dst_bpp, src_x, src_y, dst_x, dst_y,
        width, height,
    )
}

/// [`resolve_block_tile_4x4`] with an explicit implementation.
///
/// # Safety
/// Same contract as [`resolve_block_tile_4x4`].
#[allow(clippy::too_many_arguments)]
pub unsafe fn resolve_block_tile_with(
    path: ResolvePath,
    src: *const u8,
    dst: *mut u8,
    src_stride: usize,
    dst_stride: usize,
    src_bpp: u32,
    dst_bpp: u32,
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
) -> bool {
    if src_bpp != SUPPORTED_BPP || dst_bpp != SUPPORTED_BPP {
        warn!(
            "Block-tile resolve of {} bpp to {} bpp is not supported",
            src_bpp, dst_bpp
        );
        return false;
    }
    let cpp = SUPPORTED_BPP as usize / 8;
    debug_assert_eq!(src_stride % cpp, 0, "source stride not a whole pixel count");
    debug_assert_eq!(dst_stride % cpp, 0, "destination stride not a whole pixel count");
    debug_assert!(dst_stride / cpp >= dst_x + width, "destination stride too small");
    trace!(
        "resolve block tile {:?}: src ({}, {}) -> dst ({}, {}) {}x{}",
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

    let dst_stride = dst_stride / cpp;
    let window = BlockWindow {
        src: src as *const u32,
        dst: (dst as *mut u32).add(dst_y * dst_stride + dst_x),
        src_stride: src_stride / cpp,
        dst_stride,
        src_x,
        src_y,
        width,
        height,
    };
    match path {
        ResolvePath::Generic => resolve_portable(&window),
        ResolvePath::Vector => simd::resolve::<Native>(&window),
    }
    true
}

/// Scalar fallback: every pixel is read from its tile offset and written to
/// its scanline position. The byte pointers carry no alignment guarantee.
unsafe fn resolve_portable(w: &BlockWindow) {
    for y in 0..w.height {
        let row = w.dst.add(y * w.dst_stride);
        for x in 0..w.width {
            let offset = block_offset(w.src_x + x, w.src_y + y, w.src_stride);
            ptr::write_unaligned(row.add(x), ptr::read_unaligned(w.src.add(offset)));
        }
    }
}

/// Writes a linear 32 bpp region into 4x4 block-tile layout.
///
/// Strides are in bytes. Only the requested pixels are written.
///
/// # Safety
/// `src` must be valid for the linear window, `dst` must cover every touched
/// tile, and the two must not overlap.
#[allow(clippy::too_many_arguments)]
pub unsafe fn tile_linear_to_block_4x4(
    src: *const u8,
    dst: *mut u8,
    src_stride: usize,
    dst_stride: usize,
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
) -> bool {
    let cpp = SUPPORTED_BPP as usize / 8;
    let (src, dst) = (src as *const u32, dst as *mut u32);
    let (src_stride, dst_stride) = (src_stride / cpp, dst_stride / cpp);
    for y in 0..height {
        let row = src.add((src_y + y) * src_stride + src_x);
        for x in 0..width {
            let offset = block_offset(dst_x + x, dst_y + y, dst_stride);
            ptr::write_unaligned(dst.add(offset), ptr::read_unaligned(row.add(x)));
        }
    }
    true
}
