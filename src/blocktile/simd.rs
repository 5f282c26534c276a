// src/blocktile/simd.rs

//! Vectorized 4x4 block-tile resolver.
//!
//! Each tile is loaded as four lanes and de-interleaved into four scanlines
//! with 64-bit half interleaves. Whole tiles are stored lane by lane; tiles cut
//! by the window edge go through [`STORE_MASK`].

use super::{BlockWindow, Spans, BLOCK_PIXELS, BLOCK_SIZE};
use crate::lanes::{Lanes, LANE_PIXELS};
use core::ptr;

/// Lanes of a scanline to store, by `[first column][column count]`.
///
/// Every (left, right) x (top, bottom) remainder combination reduces to one
/// of these masks plus a row range.
#[rustfmt::skip]
const STORE_MASK: [[u8; BLOCK_SIZE + 1]; BLOCK_SIZE] = [
    [0b0000, 0b0001, 0b0011, 0b0111, 0b1111],
    [0b0000, 0b0010, 0b0110, 0b1110, 0b0000],
    [0b0000, 0b0100, 0b1100, 0b0000, 0b0000],
    [0b0000, 0b1000, 0b0000, 0b0000, 0b0000],
];

/// Loads one tile and returns its four scanlines.
#[inline(always)]
unsafe fn detile<L: Lanes>(tile: *const u32) -> [L::Vec; BLOCK_SIZE] {
    let v0 = L::load(tile);
    let v1 = L::load(tile.add(LANE_PIXELS));
    let v2 = L::load(tile.add(2 * LANE_PIXELS));
    let v3 = L::load(tile.add(3 * LANE_PIXELS));
    [
        L::interleave_lo64(v0, v1),
        L::interleave_hi64(v0, v1),
        L::interleave_lo64(v2, v3),
        L::interleave_hi64(v2, v3),
    ]
}

/// Stores scanlines `row0..row0 + rows` of a whole tile.
#[inline(always)]
unsafe fn store_rows<L: Lanes>(
    lines: &[L::Vec; BLOCK_SIZE],
    dst: *mut u32,
    dst_stride: usize,
    row0: usize,
    rows: usize,
) {
    for r in 0..rows {
        L::store(dst.add(r * dst_stride), lines[row0 + r]);
    }
}

/// Stores the `cols` pixels starting at column `col0` of scanlines
/// `row0..row0 + rows`.
#[inline(always)]
unsafe fn store_masked<L: Lanes>(
    lines: &[L::Vec; BLOCK_SIZE],
    dst: *mut u32,
    dst_stride: usize,
    col0: usize,
    cols: usize,
    row0: usize,
    rows: usize,
) {
    let mask = STORE_MASK[col0][cols];
    for r in 0..rows {
        let pixels = L::to_array(lines[row0 + r]);
        let out = dst.add(r * dst_stride);
        for (lane, &pixel) in pixels.iter().enumerate() {
            if mask & (1 << lane) != 0 {
                ptr::write_unaligned(out.add(lane - col0), pixel);
            }
        }
    }
}

/// Resolves scanlines `row0..row0 + rows` of tile row `tile_y` across the
/// whole window width: left remainder, whole tiles, right remainder.
unsafe fn band<L: Lanes>(
    w: &BlockWindow,
    xs: &Spans,
    tile_y: usize,
    row0: usize,
    rows: usize,
    dst: *mut u32,
) {
    let tiles = w.tile_row(tile_y);
    let mut out = dst;

    if xs.lead > 0 {
        let lines = detile::<L>(tiles.add(xs.first_tile * BLOCK_PIXELS));
        store_masked::<L>(&lines, out, w.dst_stride, xs.lead_at, xs.lead, row0, rows);
        out = out.add(xs.lead);
    }

    let body = xs.body_tile();
    for i in 0..xs.body {
        let lines = detile::<L>(tiles.add((body + i) * BLOCK_PIXELS));
        store_rows::<L>(&lines, out, w.dst_stride, row0, rows);
        out = out.add(BLOCK_SIZE);
    }

    if xs.tail > 0 {
        let lines = detile::<L>(tiles.add(xs.tail_tile() * BLOCK_PIXELS));
        store_masked::<L>(&lines, out, w.dst_stride, 0, xs.tail, row0, rows);
    }
}

/// Resolves a block-tiled window: interior tile rows first, then the top
/// remainder rows, then the bottom remainder rows.
///
/// # Safety
/// See [`super::resolve_block_tile_4x4`].
pub(crate) unsafe fn resolve<L: Lanes>(w: &BlockWindow) {
    let xs = Spans::new(w.src_x, w.width);
    let ys = Spans::new(w.src_y, w.height);

    let interior = w.dst.add(ys.lead * w.dst_stride);
    let body = ys.body_tile();
    for i in 0..ys.body {
        band::<L>(
            w,
            &xs,
            body + i,
            0,
            BLOCK_SIZE,
            interior.add(i * BLOCK_SIZE * w.dst_stride),
        );
    }

    if ys.lead > 0 {
        band::<L>(w, &xs, ys.first_tile, ys.lead_at, ys.lead, w.dst);
    }

    if ys.tail > 0 {
        let bottom = w.dst.add((ys.lead + ys.body * BLOCK_SIZE) * w.dst_stride);
        band::<L>(w, &xs, ys.tail_tile(), 0, ys.tail, bottom);
    }
}
