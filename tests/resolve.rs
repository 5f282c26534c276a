// Drives the public API end to end: tile a linear image into each GPU
// layout, then resolve it back through the engine.

use loongson_resolve::blocktile::{block_offset, tile_linear_to_block_4x4};
use loongson_resolve::supertile::{supertile_offset, tile_linear_to_supertile};
use loongson_resolve::{
    area, block_copy, intersect, resolve_block_tile_4x4, resolve_supertile_to_linear,
    select_copy_strategy, BoxRec, CopyStrategy, Engine, GpuKind, ResolvePath, ResolveRequest,
    Surface,
};

const WIDTH: usize = 150;
const HEIGHT: usize = 70;
const TILED_STRIDE: usize = 192;
const TILED_ROWS: usize = 128;

fn image() -> Vec<u32> {
    (0..WIDTH * HEIGHT)
        .map(|i| (i as u32).wrapping_mul(2_654_435_761))
        .collect()
}

fn request(tiled: &[u32], linear: &mut [u32], width: usize, height: usize) -> ResolveRequest {
    ResolveRequest {
        src: Surface {
            base: tiled.as_ptr() as *const u8,
            stride: TILED_STRIDE,
            x: 0,
            y: 0,
            width,
            height,
            cpp: 4,
        },
        dst: Surface {
            base: linear.as_mut_ptr() as *mut u8,
            stride: WIDTH,
            x: 0,
            y: 0,
            width,
            height,
            cpp: 4,
        },
    }
}

fn supertiled(linear: &[u32]) -> Vec<u32> {
    let mut tiled = vec![0u32; TILED_STRIDE * TILED_ROWS];
    unsafe {
        tile_linear_to_supertile(
            linear.as_ptr(),
            tiled.as_mut_ptr(),
            WIDTH,
            TILED_STRIDE,
            0,
            0,
            0,
            0,
            WIDTH,
            HEIGHT,
        );
    }
    tiled
}

fn block_tiled(linear: &[u32]) -> Vec<u32> {
    let mut tiled = vec![0u32; TILED_STRIDE * TILED_ROWS];
    unsafe {
        tile_linear_to_block_4x4(
            linear.as_ptr() as *const u8,
            tiled.as_mut_ptr() as *mut u8,
            WIDTH * 4,
            TILED_STRIDE * 4,
            0,
            0,
            0,
            0,
            WIDTH,
            HEIGHT,
        );
    }
    tiled
}

#[test]
fn it_should_resolve_supertiles_on_every_path() {
    let linear = image();
    let tiled = supertiled(&linear);
    assert_eq!(tiled[supertile_offset(149, 69, TILED_STRIDE)], linear[69 * WIDTH + 149]);

    for path in [ResolvePath::Generic, ResolvePath::Vector] {
        let engine = Engine::with_strategy(CopyStrategy::Portable, path);
        let mut out = vec![0u32; WIDTH * HEIGHT];
        let req = request(&tiled, &mut out, WIDTH, HEIGHT);
        assert!(unsafe { engine.resolve(GpuKind::Etnaviv, &req) });
        assert_eq!(out, linear, "{:?}", path);
    }

    let mut out = vec![0u32; WIDTH * HEIGHT];
    let ok = unsafe {
        resolve_supertile_to_linear(
            tiled.as_ptr(),
            out.as_mut_ptr(),
            TILED_STRIDE,
            WIDTH,
            0,
            0,
            0,
            0,
            WIDTH,
            HEIGHT,
        )
    };
    assert!(ok);
    assert_eq!(out, linear);
}

#[test]
fn it_should_resolve_block_tiles_on_every_path() {
    let linear = image();
    let tiled = block_tiled(&linear);
    assert_eq!(tiled[block_offset(149, 69, TILED_STRIDE)], linear[69 * WIDTH + 149]);

    for path in [ResolvePath::Generic, ResolvePath::Vector] {
        let engine = Engine::with_strategy(CopyStrategy::Portable, path);
        let mut out = vec![0u32; WIDTH * HEIGHT];
        let req = request(&tiled, &mut out, WIDTH, HEIGHT);
        assert!(unsafe { engine.resolve(GpuKind::Gsgpu, &req) });
        assert_eq!(out, linear, "{:?}", path);
    }

    // Unaligned sub-window straight through the free function.
    let (src_x, src_y, width, height) = (3, 5, 101, 42);
    let mut out = vec![0u32; WIDTH * HEIGHT];
    let ok = unsafe {
        resolve_block_tile_4x4(
            tiled.as_ptr() as *const u8,
            out.as_mut_ptr() as *mut u8,
            TILED_STRIDE * 4,
            WIDTH * 4,
            32,
            32,
            src_x,
            src_y,
            0,
            0,
            width,
            height,
        )
    };
    assert!(ok);
    for y in 0..height {
        assert_eq!(
            &out[y * WIDTH..y * WIDTH + width],
            &linear[(src_y + y) * WIDTH + src_x..(src_y + y) * WIDTH + src_x + width],
            "row {}",
            y
        );
    }
}

#[test]
fn it_should_resolve_damage_boxes_through_the_global_engine() {
    let linear = image();
    let tiled = supertiled(&linear);
    let mut out = vec![0u32; WIDTH * HEIGHT];
    let req = request(&tiled, &mut out, WIDTH, HEIGHT);

    let damage = [BoxRec::new(10, 10, 80, 40), BoxRec::new(140, 60, 200, 90)];
    let mut clipped = BoxRec::default();
    assert!(intersect(&mut clipped, &damage[1], &req.src.bounds()));
    assert_eq!(clipped, BoxRec::new(140, 60, 150, 70));

    let resolved = unsafe { Engine::global().resolve_boxes(GpuKind::Etnaviv, &req, &damage) };
    assert_eq!(resolved, i64::from(area(&damage[0]) + area(&clipped)));

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let damaged = ((10..80).contains(&x) && (10..40).contains(&y))
                || ((140..150).contains(&x) && (60..70).contains(&y));
            let want = if damaged { linear[y * WIDTH + x] } else { 0 };
            assert_eq!(out[y * WIDTH + x], want, "({}, {})", x, y);
        }
    }
}

#[test]
fn it_should_block_copy_with_the_detected_strategy() {
    let src: Vec<u8> = (0..4099u32).map(|i| (i * 7) as u8).collect();
    let mut dst = vec![0u8; src.len() + 3];
    unsafe {
        block_copy(select_copy_strategy(), dst.as_mut_ptr().add(3), src.as_ptr(), src.len());
    }
    assert_eq!(&dst[3..], &src[..]);
    assert_eq!(&dst[..3], &[0, 0, 0]);
}
