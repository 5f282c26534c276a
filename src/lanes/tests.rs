// src/lanes/tests.rs

use super::*;

fn check_backend<L: Lanes>() {
    let a_src = [1u32, 2, 3, 4];
    let b_src = [5u32, 6, 7, 8];
    let (a, b) = unsafe { (L::load(a_src.as_ptr()), L::load(b_src.as_ptr())) };

    assert_eq!(L::to_array(a), a_src);
    assert_eq!(L::to_array(L::interleave_lo64(a, b)), [1, 2, 5, 6]);
    assert_eq!(L::to_array(L::interleave_hi64(a, b)), [3, 4, 7, 8]);

    let mut out = [0u32; 6];
    unsafe { L::store(out.as_mut_ptr().add(1), b) };
    assert_eq!(out, [0, 5, 6, 7, 8, 0]);
}

#[test]
fn it_should_interleave_64_bit_halves_with_the_scalar_backend() {
    check_backend::<Scalar>();
}

#[test]
fn it_should_interleave_64_bit_halves_with_the_native_backend() {
    check_backend::<Native>();
}

#[test]
fn it_should_load_from_unaligned_addresses() {
    let src = [9u32, 10, 11, 12, 13];
    let bytes = unsafe { core::slice::from_raw_parts(src.as_ptr() as *const u8, 20) };
    let mut shifted = vec![0u8; 21];
    shifted[1..].copy_from_slice(bytes);
    let v = unsafe { Native::load(shifted.as_ptr().add(1) as *const u32) };
    assert_eq!(Native::to_array(v), [9, 10, 11, 12]);
}
