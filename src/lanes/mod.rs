// src/lanes/mod.rs

//! The 4 x 32-bit vector lane capability used by the resolvers.
//!
//! Resolvers are generic over [`Lanes`] so the same tiling walk runs on a
//! plain array backend or on real 128-bit registers. Every backend must
//! produce bit-identical results.

use core::fmt::Debug;

pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub mod x86;

#[cfg(target_arch = "aarch64")]
pub mod arm;

pub use scalar::Scalar;

// Select the native backend based on target architecture
#[cfg(target_arch = "x86_64")]
pub use x86::Sse2 as Native;

#[cfg(target_arch = "aarch64")]
pub use arm::Neon as Native;

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub use scalar::Scalar as Native;

/// Number of 32-bit pixels in one lane vector.
pub const LANE_PIXELS: usize = 4;

/// A 128-bit vector of four 32-bit pixels.
pub trait Lanes: 'static + Copy + Clone + Send + Sync + Debug + Default {
    /// The register type.
    type Vec: Copy;

    /// Short name for logs.
    const NAME: &'static str;

    /// Loads four pixels. No alignment requirement.
    ///
    /// # Safety
    /// `src` must be valid for reading 16 bytes.
    unsafe fn load(src: *const u32) -> Self::Vec;

    /// Stores four pixels. No alignment requirement.
    ///
    /// # Safety
    /// `dst` must be valid for writing 16 bytes.
    unsafe fn store(dst: *mut u32, v: Self::Vec);

    /// `{ a.lo64, b.lo64 }`: pixels `a0 a1 b0 b1`.
    fn interleave_lo64(a: Self::Vec, b: Self::Vec) -> Self::Vec;

    /// `{ a.hi64, b.hi64 }`: pixels `a2 a3 b2 b3`.
    fn interleave_hi64(a: Self::Vec, b: Self::Vec) -> Self::Vec;

    /// Spills a register to memory order.
    fn to_array(v: Self::Vec) -> [u32; LANE_PIXELS];
}

#[cfg(test)]
mod tests;
