//! Portable lane backend. A "register" is a plain array and every load or
//! store is a raw 16-byte memory copy.

use super::{Lanes, LANE_PIXELS};
use core::ptr;

/// Array-backed lanes, available on every target.
#[derive(Copy, Clone, Debug, Default)]
pub struct Scalar;

impl Lanes for Scalar {
    type Vec = [u32; LANE_PIXELS];

    const NAME: &'static str = "scalar";

    #[inline(always)]
    unsafe fn load(src: *const u32) -> Self::Vec {
        ptr::read_unaligned(src as *const [u32; LANE_PIXELS])
    }

    #[inline(always)]
    unsafe fn store(dst: *mut u32, v: Self::Vec) {
        ptr::write_unaligned(dst as *mut [u32; LANE_PIXELS], v)
    }

    #[inline(always)]
    fn interleave_lo64(a: Self::Vec, b: Self::Vec) -> Self::Vec {
        [a[0], a[1], b[0], b[1]]
    }

    #[inline(always)]
    fn interleave_hi64(a: Self::Vec, b: Self::Vec) -> Self::Vec {
        [a[2], a[3], b[2], b[3]]
    }

    #[inline(always)]
    fn to_array(v: Self::Vec) -> [u32; LANE_PIXELS] {
        v
    }
}
