// src/supertile/simd.rs

//! Vectorized supertile resolver.
//!
//! The unit of work is a tile pair: the two horizontally adjacent tiles of one
//! group row, 32 consecutive source pixels that become four destination rows
//! of eight pixels. Whole pairs move with lane loads and stores. Pairs cut by
//! the window edge are staged through a scratch row and closed out with the
//! store mask from [`COLUMN_MASK`].

use super::{
    Window, GROUP_PIXELS, GROUP_ROW_PIXELS, PAIR_PIXELS, SUPERTILE_SIZE, TILE_PIXELS, TILE_SIZE,
};
use crate::lanes::{Lanes, LANE_PIXELS};

/// Width of a tile pair in pixels.
const PAIR_WIDTH: usize = 2 * TILE_SIZE;
/// Tile pairs across one supertile.
const PAIRS_X: usize = SUPERTILE_SIZE / PAIR_WIDTH;
/// Tile rows down one supertile.
const TILE_ROWS: usize = SUPERTILE_SIZE / TILE_SIZE;

/// Store mask for a pair row cut to `cols` pixels: whole lanes stored straight
/// from registers, then single pixels from the staged row.
///
/// Indexed by `cols` (0..=8): `(whole_lanes, tail_pixels)`.
const COLUMN_MASK: [(usize, usize); PAIR_WIDTH + 1] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (1, 0),
    (1, 1),
    (1, 2),
    (1, 3),
    (2, 0),
];

/// Source pointer of the pair in tile row `tile_row` and pair column `pair_x`.
#[inline(always)]
unsafe fn pair_src(supertile: *const u32, tile_row: usize, pair_x: usize) -> *const u32 {
    supertile.add(
        (tile_row / 4) * GROUP_ROW_PIXELS + pair_x * GROUP_PIXELS + (tile_row % 4) * PAIR_PIXELS,
    )
}

/// Destination pointer of the same pair.
#[inline(always)]
unsafe fn pair_dst(dst: *mut u32, dst_stride: usize, tile_row: usize, pair_x: usize) -> *mut u32 {
    dst.add(tile_row * TILE_SIZE * dst_stride + pair_x * PAIR_WIDTH)
}

/// Moves a whole tile pair.
#[inline(always)]
unsafe fn pair_full<L: Lanes>(src: *const u32, dst: *mut u32, dst_stride: usize) {
    let right = src.add(TILE_PIXELS);
    for r in 0..TILE_SIZE {
        let a = L::load(src.add(r * TILE_SIZE));
        let b = L::load(right.add(r * TILE_SIZE));
        let out = dst.add(r * dst_stride);
        L::store(out, a);
        L::store(out.add(LANE_PIXELS), b);
    }
}

/// Moves the top-left `cols x rows` of a tile pair, `cols <= 8`, `rows <= 4`.
///
/// Only tiles holding requested pixels are loaded.
#[inline(always)]
unsafe fn pair_partial<L: Lanes>(
    src: *const u32,
    dst: *mut u32,
    dst_stride: usize,
    cols: usize,
    rows: usize,
) {
    debug_assert!(cols <= PAIR_WIDTH && rows <= TILE_SIZE);
    let (whole_lanes, tail_pixels) = COLUMN_MASK[cols];
    let right = src.add(TILE_PIXELS);

    for r in 0..rows {
        let out = dst.add(r * dst_stride);
        let mut staged = [0u32; PAIR_WIDTH];

        let a = L::load(src.add(r * TILE_SIZE));
        staged[..LANE_PIXELS].copy_from_slice(&L::to_array(a));
        if whole_lanes >= 1 {
            L::store(out, a);
        }
        if cols > TILE_SIZE {
            let b = L::load(right.add(r * TILE_SIZE));
            staged[LANE_PIXELS..].copy_from_slice(&L::to_array(b));
            if whole_lanes >= 2 {
                L::store(out.add(LANE_PIXELS), b);
            }
        }

        let first = whole_lanes * LANE_PIXELS;
        for c in first..first + tail_pixels {
            *out.add(c) = staged[c];
        }
    }
}

/// Resolves a supertile-aligned window.
///
/// # Safety
/// See [`super::resolve_supertile_to_linear`].
pub(crate) unsafe fn resolve<L: Lanes>(w: &Window) {
    let num_supertile_x = w.width / SUPERTILE_SIZE;
    let num_supertile_y = w.height / SUPERTILE_SIZE;
    let remain_x = w.width % SUPERTILE_SIZE;
    let remain_y = w.height % SUPERTILE_SIZE;

    for sy in 0..num_supertile_y {
        for sx in 0..num_supertile_x {
            supertile::<L>(
                w.supertile(sx, sy),
                w.dst_at(sx * SUPERTILE_SIZE, sy * SUPERTILE_SIZE),
                w.dst_stride,
            );
        }
        if remain_x > 0 {
            row_tail::<L>(
                w.supertile(num_supertile_x, sy),
                w.dst_at(num_supertile_x * SUPERTILE_SIZE, sy * SUPERTILE_SIZE),
                w.dst_stride,
                remain_x,
            );
        }
    }

    if remain_y > 0 {
        for sx in 0..num_supertile_x {
            col_tail::<L>(
                w.supertile(sx, num_supertile_y),
                w.dst_at(sx * SUPERTILE_SIZE, num_supertile_y * SUPERTILE_SIZE),
                w.dst_stride,
                remain_y,
            );
        }
        if remain_x > 0 {
            corner_tail::<L>(
                w.supertile(num_supertile_x, num_supertile_y),
                w.dst_at(num_supertile_x * SUPERTILE_SIZE, num_supertile_y * SUPERTILE_SIZE),
                w.dst_stride,
                remain_x,
                remain_y,
            );
        }
    }
}

/// One whole supertile: 4 group rows of 8 groups, 4 pairs per group.
unsafe fn supertile<L: Lanes>(src: *const u32, dst: *mut u32, dst_stride: usize) {
    for tile_row in 0..TILE_ROWS {
        for pair_x in 0..PAIRS_X {
            pair_full::<L>(
                pair_src(src, tile_row, pair_x),
                pair_dst(dst, dst_stride, tile_row, pair_x),
                dst_stride,
            );
        }
    }
}

/// Right edge: `remain_x / 8` whole pairs per tile row, then the `< 8` pixel
/// tail of each tile row.
unsafe fn row_tail<L: Lanes>(src: *const u32, dst: *mut u32, dst_stride: usize, remain_x: usize) {
    let pairs = remain_x / PAIR_WIDTH;
    let tail = remain_x % PAIR_WIDTH;

    for tile_row in 0..TILE_ROWS {
        for pair_x in 0..pairs {
            pair_full::<L>(
                pair_src(src, tile_row, pair_x),
                pair_dst(dst, dst_stride, tile_row, pair_x),
                dst_stride,
            );
        }
        if tail > 0 {
            pair_partial::<L>(
                pair_src(src, tile_row, pairs),
                pair_dst(dst, dst_stride, tile_row, pairs),
                dst_stride,
                tail,
                TILE_SIZE,
            );
        }
    }
}

/// Bottom edge: `remain_y / 4` whole tile rows, then the 1..=3 row tail.
unsafe fn col_tail<L: Lanes>(src: *const u32, dst: *mut u32, dst_stride: usize, remain_y: usize) {
    let tile_rows = remain_y / TILE_SIZE;
    let tail = remain_y % TILE_SIZE;

    for tile_row in 0..tile_rows {
        for pair_x in 0..PAIRS_X {
            pair_full::<L>(
                pair_src(src, tile_row, pair_x),
                pair_dst(dst, dst_stride, tile_row, pair_x),
                dst_stride,
            );
        }
    }
    if tail > 0 {
        for pair_x in 0..PAIRS_X {
            pair_partial::<L>(
                pair_src(src, tile_rows, pair_x),
                pair_dst(dst, dst_stride, tile_rows, pair_x),
                dst_stride,
                PAIR_WIDTH,
                tail,
            );
        }
    }
}

/// Bottom-right corner: whole pairs, then pairs cut on the right, on the
/// bottom, or on both.
unsafe fn corner_tail<L: Lanes>(
    src: *const u32,
    dst: *mut u32,
    dst_stride: usize,
    remain_x: usize,
    remain_y: usize,
) {
    let pairs = remain_x / PAIR_WIDTH;
    let tail_x = remain_x % PAIR_WIDTH;
    let tile_rows = remain_y / TILE_SIZE;
    let tail_y = remain_y % TILE_SIZE;

    for tile_row in 0..tile_rows {
        for pair_x in 0..pairs {
            pair_full::<L>(
                pair_src(src, tile_row, pair_x),
                pair_dst(dst, dst_stride, tile_row, pair_x),
                dst_stride,
            );
        }
        if tail_x > 0 {
            pair_partial::<L>(
                pair_src(src, tile_row, pairs),
                pair_dst(dst, dst_stride, tile_row, pairs),
                dst_stride,
                tail_x,
                TILE_SIZE,
            );
        }
    }

    if tail_y > 0 {
        for pair_x in 0..pairs {
            pair_partial::<L>(
                pair_src(src, tile_rows, pair_x),
                pair_dst(dst, dst_stride, tile_rows, pair_x),
                dst_stride,
                PAIR_WIDTH,
                tail_y,
            );
        }
        if tail_x > 0 {
            pair_partial::<L>(
                pair_src(src, tile_rows, pairs),
                pair_dst(dst, dst_stride, tile_rows, pairs),
                dst_stride,
                tail_x,
                tail_y,
            );
        }
    }
}
