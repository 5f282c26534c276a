//! x86_64 lane backend.

use super::{Lanes, LANE_PIXELS};
use core::arch::x86_64::*;

/// SSE2 Backend (4 lanes). SSE2 is part of the x86_64 baseline.
#[derive(Copy, Clone, Debug, Default)]
pub struct Sse2;

impl Lanes for Sse2 {
    type Vec = __m128i;

    const NAME: &'static str = "sse2";

    #[inline(always)]
    unsafe fn load(src: *const u32) -> Self::Vec {
        _mm_loadu_si128(src as *const __m128i)
    }

    #[inline(always)]
    unsafe fn store(dst: *mut u32, v: Self::Vec) {
        _mm_storeu_si128(dst as *mut __m128i, v)
    }

    #[inline(always)]
    fn interleave_lo64(a: Self::Vec, b: Self::Vec) -> Self::Vec {
        unsafe { _mm_unpacklo_epi64(a, b) }
    }

    #[inline(always)]
    fn interleave_hi64(a: Self::Vec, b: Self::Vec) -> Self::Vec {
        unsafe { _mm_unpackhi_epi64(a, b) }
    }

    #[inline(always)]
    fn to_array(v: Self::Vec) -> [u32; LANE_PIXELS] {
        let mut arr = [0u32; LANE_PIXELS];
        unsafe { _mm_storeu_si128(arr.as_mut_ptr() as *mut __m128i, v) };
        arr
    }
}
