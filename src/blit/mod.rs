// src/blit/mod.rs

//! Bulk memory copy with a CPU-dependent instruction sequence.
//!
//! The observable result of every strategy is the same as `memcpy`: an exact
//! byte-for-byte copy of non-overlapping regions. Only the instruction
//! sequence differs. A strategy is picked once from [`CpuFeatures`] and
//! passed to callers by value.

use crate::cpu::{detect_cpu_vector_features, CpuFeatures};
use core::ptr;
use log::{debug, warn};
use serde::{Deserialize, Serialize};


/// Implementation used by [`block_copy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStrategy {
    /// Scalar copy, available everywhere.
    #[default]
    Portable,
    /// 128-bit vector loads and stores (SSE2 or NEON).
    Vector128,
    /// 256-bit vector loads and stores (AVX).
    Vector256,
}

impl CopyStrategy {
    /// Picks the widest strategy the given features allow.
    ///
    /// The extensions are hierarchical: `AVX` wins over `SSE2`/`NEON`, which
    /// win over the portable copy.
    pub fn select(features: CpuFeatures) -> Self {
        if features.has_vector256() {
            CopyStrategy::Vector256
        } else if features.has_vector128() {
            CopyStrategy::Vector128
        } else {
            CopyStrategy::Portable
        }
    }

    /// Downgrades `self` until `features` can run it.
    pub fn clamp_to(self, features: CpuFeatures) -> Self {
        let best = CopyStrategy::select(features);
        if self.width() > best.width() {
            warn!(
                "Copy strategy {:?} not supported by CPU ({:?}); using {:?}",
                self, features, best
            );
            best
        } else {
            self
        }
    }

    /// Vector width in bytes, 1 for the portable copy.
    pub fn width(self) -> usize {
        match self {
            CopyStrategy::Portable => 1,
            CopyStrategy::Vector128 => 16,
            CopyStrategy::Vector256 => 32,
        }
    }
}

/// Probes the host CPU and returns the strategy for it.
pub fn select_copy_strategy() -> CopyStrategy {
    let features = detect_cpu_vector_features();
    let strategy = CopyStrategy::select(features);
    debug!("Selected copy strategy {:?} for {:?}", strategy, features);
    strategy
}

/// Copies `len` bytes from `src` to `dst` using `strategy`.
///
/// A vector strategy requested on a CPU without the matching extension runs
/// the portable copy instead; the bytes written are the same either way.
///
/// # Safety
/// `src` must be valid for `len` bytes of reads, `dst` for `len` bytes of
/// writes, and the two regions must not overlap.
pub unsafe fn block_copy(strategy: CopyStrategy, dst: *mut u8, src: *const u8, len: usize) {
    debug_assert!(
        (dst as usize) >= (src as usize) + len || (src as usize) >= (dst as usize) + len,
        "block_copy regions overlap"
    );
    let features = detect_cpu_vector_features();
    match strategy {
        CopyStrategy::Vector256 if features.has_vector256() => arch::copy_256(dst, src, len),
        CopyStrategy::Vector256 | CopyStrategy::Vector128 if features.has_vector128() => {
            arch::copy_128(dst, src, len)
        }
        _ => copy_portable(dst, src, len),
    }
}

/// Safe wrapper over [`block_copy`]. Copies `min(dst.len(), src.len())` bytes.
pub fn copy_slice(strategy: CopyStrategy, dst: &mut [u8], src: &[u8]) {
    let len = dst.len().min(src.len());
    // SAFETY: both slices cover `len` bytes and a `&mut` cannot alias a `&`.
    unsafe { block_copy(strategy, dst.as_mut_ptr(), src.as_ptr(), len) }
}

/// Byte-wise copy used when no vector unit is available.
///
/// # Safety
/// Same contract as [`block_copy`].
pub unsafe fn copy_portable(dst: *mut u8, src: *const u8, len: usize) {
    for i in 0..len {
        *dst.add(i) = *src.add(i);
    }
}

/// Aligns `dst` to 16 bytes with 1/2/4/8-byte scalar stores.
///
/// Each step runs only if enough bytes remain, so once fewer than 16 bytes
/// are left the destination may stay unaligned; the drain does not care.
#[inline(always)]
unsafe fn align_prologue(dst: &mut *mut u8, src: &mut *const u8, len: &mut usize) {
    if (*dst as usize) & 1 != 0 && *len >= 1 {
        move_scalar::<u8>(dst, src, len);
    }
    if (*dst as usize) & 2 != 0 && *len >= 2 {
        move_scalar::<u16>(dst, src, len);
    }
    if (*dst as usize) & 4 != 0 && *len >= 4 {
        move_scalar::<u32>(dst, src, len);
    }
    if (*dst as usize) & 8 != 0 && *len >= 8 {
        move_scalar::<u64>(dst, src, len);
    }
}

/// Drains fewer than 16 bytes in descending power-of-two chunks.
#[inline(always)]
unsafe fn drain_scalar(mut dst: *mut u8, mut src: *const u8, mut len: usize) {
    debug_assert!(len < 16);
    if len >= 8 {
        move_scalar::<u64>(&mut dst, &mut src, &mut len);
    }
    if len >= 4 {
        move_scalar::<u32>(&mut dst, &mut src, &mut len);
    }
    if len >= 2 {
        move_scalar::<u16>(&mut dst, &mut src, &mut len);
    }
    if len >= 1 {
        move_scalar::<u8>(&mut dst, &mut src, &mut len);
    }
}

#[inline(always)]
unsafe fn move_scalar<T: Copy>(dst: &mut *mut u8, src: &mut *const u8, len: &mut usize) {
    let n = core::mem::size_of::<T>();
    let v = ptr::read_unaligned(*src as *const T);
    ptr::write_unaligned(*dst as *mut T, v);
    *dst = dst.add(n);
    *src = src.add(n);
    *len -= n;
}

#[cfg(target_arch = "x86_64")]
mod arch {
    use super::{align_prologue, drain_scalar};
    use core::arch::x86_64::*;

    pub(super) unsafe fn copy_128(mut dst: *mut u8, mut src: *const u8, mut len: usize) {
        align_prologue(&mut dst, &mut src, &mut len);

        while len >= 64 {
            debug_assert_eq!(dst as usize & 15, 0);
            let x0 = _mm_loadu_si128(src as *const __m128i);
            let x1 = _mm_loadu_si128(src.add(16) as *const __m128i);
            let x2 = _mm_loadu_si128(src.add(32) as *const __m128i);
            let x3 = _mm_loadu_si128(src.add(48) as *const __m128i);
            _mm_store_si128(dst as *mut __m128i, x0);
            _mm_store_si128(dst.add(16) as *mut __m128i, x1);
            _mm_store_si128(dst.add(32) as *mut __m128i, x2);
            _mm_store_si128(dst.add(48) as *mut __m128i, x3);
            dst = dst.add(64);
            src = src.add(64);
            len -= 64;
        }
        if len >= 32 {
            let x0 = _mm_loadu_si128(src as *const __m128i);
            let x1 = _mm_loadu_si128(src.add(16) as *const __m128i);
            _mm_storeu_si128(dst as *mut __m128i, x0);
            _mm_storeu_si128(dst.add(16) as *mut __m128i, x1);
            dst = dst.add(32);
            src = src.add(32);
            len -= 32;
        }
        if len >= 16 {
            _mm_storeu_si128(dst as *mut __m128i, _mm_loadu_si128(src as *const __m128i));
            dst = dst.add(16);
            src = src.add(16);
            len -= 16;
        }
        drain_scalar(dst, src, len);
    }

    #[target_feature(enable = "avx")]
    pub(super) unsafe fn copy_256(mut dst: *mut u8, mut src: *const u8, mut len: usize) {
        align_prologue(&mut dst, &mut src, &mut len);
        // One more 16-byte step brings the destination to 32 bytes.
        if (dst as usize) & 16 != 0 && len >= 16 {
            _mm_storeu_si128(dst as *mut __m128i, _mm_loadu_si128(src as *const __m128i));
            dst = dst.add(16);
            src = src.add(16);
            len -= 16;
        }

        while len >= 64 {
            debug_assert_eq!(dst as usize & 31, 0);
            let y0 = _mm256_loadu_si256(src as *const __m256i);
            let y1 = _mm256_loadu_si256(src.add(32) as *const __m256i);
            _mm256_store_si256(dst as *mut __m256i, y0);
            _mm256_store_si256(dst.add(32) as *mut __m256i, y1);
            dst = dst.add(64);
            src = src.add(64);
            len -= 64;
        }
        if len >= 32 {
            _mm256_storeu_si256(dst as *mut __m256i, _mm256_loadu_si256(src as *const __m256i));
            dst = dst.add(32);
            src = src.add(32);
            len -= 32;
        }
        if len >= 16 {
            _mm_storeu_si128(dst as *mut __m128i, _mm_loadu_si128(src as *const __m128i));
            dst = dst.add(16);
            src = src.add(16);
            len -= 16;
        }
        drain_scalar(dst, src, len);
    }
}

#[cfg(target_arch = "aarch64")]
mod arch {
    use super::{align_prologue, drain_scalar};
    use core::arch::aarch64::*;

    pub(super) unsafe fn copy_128(mut dst: *mut u8, mut src: *const u8, mut len: usize) {
        align_prologue(&mut dst, &mut src, &mut len);

        while len >= 64 {
            let q0 = vld1q_u8(src);
            let q1 = vld1q_u8(src.add(16));
            let q2 = vld1q_u8(src.add(32));
            let q3 = vld1q_u8(src.add(48));
            vst1q_u8(dst, q0);
            vst1q_u8(dst.add(16), q1);
            vst1q_u8(dst.add(32), q2);
            vst1q_u8(dst.add(48), q3);
            dst = dst.add(64);
            src = src.add(64);
            len -= 64;
        }
        if len >= 32 {
            vst1q_u8(dst, vld1q_u8(src));
            vst1q_u8(dst.add(16), vld1q_u8(src.add(16)));
            dst = dst.add(32);
            src = src.add(32);
            len -= 32;
        }
        if len >= 16 {
            vst1q_u8(dst, vld1q_u8(src));
            dst = dst.add(16);
            src = src.add(16);
            len -= 16;
        }
        drain_scalar(dst, src, len);
    }

    // NEON has no 256-bit registers; never reached because `has_vector256`
    // is false on this architecture.
    pub(super) unsafe fn copy_256(dst: *mut u8, src: *const u8, len: usize) {
        copy_128(dst, src, len)
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod arch {
    pub(super) unsafe fn copy_128(dst: *mut u8, src: *const u8, len: usize) {
        super::copy_portable(dst, src, len)
    }

    pub(super) unsafe fn copy_256(dst: *mut u8, src: *const u8, len: usize) {
        super::copy_portable(dst, src, len)
    }
}
