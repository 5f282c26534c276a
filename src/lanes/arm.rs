//! ARM NEON lane backend.

use super::{Lanes, LANE_PIXELS};
use core::arch::aarch64::*;

/// NEON Backend (4 lanes).
#[derive(Copy, Clone, Debug, Default)]
pub struct Neon;

impl Lanes for Neon {
    type Vec = uint32x4_t;

    const NAME: &'static str = "neon";

    #[inline(always)]
    unsafe fn load(src: *const u32) -> Self::Vec {
        vld1q_u32(src)
    }

    #[inline(always)]
    unsafe fn store(dst: *mut u32, v: Self::Vec) {
        vst1q_u32(dst, v)
    }

    #[inline(always)]
    fn interleave_lo64(a: Self::Vec, b: Self::Vec) -> Self::Vec {
        unsafe {
            vreinterpretq_u32_u64(vzip1q_u64(
                vreinterpretq_u64_u32(a),
                vreinterpretq_u64_u32(b),
            ))
        }
    }

    #[inline(always)]
    fn interleave_hi64(a: Self::Vec, b: Self::Vec) -> Self::Vec {
        unsafe {
            vreinterpretq_u32_u64(vzip2q_u64(
                vreinterpretq_u64_u32(a),
                vreinterpretq_u64_u32(b),
            ))
        }
    }

    #[inline(always)]
    fn to_array(v: Self::Vec) -> [u32; LANE_PIXELS] {
        let mut arr = [0u32; LANE_PIXELS];
        unsafe { vst1q_u32(arr.as_mut_ptr(), v) };
        arr
    }
}
