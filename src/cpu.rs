// src/cpu.rs

//! Host CPU vector capability detection.
//!
//! The result is probed once per process and cached; it never changes after
//! the first call.

use bitflags::bitflags;
use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Vector instruction set extensions available on the running CPU.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CpuFeatures: u32 {
        /// x86_64 128-bit integer vectors.
        const SSE2 = 1 << 0;
        /// x86_64 256-bit vectors. Implies `SSE2`.
        const AVX  = 1 << 1;
        /// aarch64 Advanced SIMD, 128-bit.
        const NEON = 1 << 2;
    }
}

impl CpuFeatures {
    /// True if a 128-bit integer load/store/interleave unit is present.
    pub fn has_vector128(self) -> bool {
        self.intersects(CpuFeatures::SSE2 | CpuFeatures::NEON)
    }

    /// True if 256-bit loads and stores are available.
    pub fn has_vector256(self) -> bool {
        self.contains(CpuFeatures::AVX)
    }
}

static DETECTED: Lazy<CpuFeatures> = Lazy::new(|| {
    let features = probe();
    info!("Detected CPU vector features: {:?}", features);
    features
});

/// Returns the cached feature set of the host CPU.
///
/// Architectures without a known vector unit report no features, which sends
/// every caller down the portable paths.
pub fn detect_cpu_vector_features() -> CpuFeatures {
    *DETECTED
}

#[cfg(target_arch = "x86_64")]
fn probe() -> CpuFeatures {
    let mut features = CpuFeatures::empty();
    if std::arch::is_x86_feature_detected!("sse2") {
        features |= CpuFeatures::SSE2;
        // AVX is only meaningful on top of SSE2.
        if std::arch::is_x86_feature_detected!("avx") {
            features |= CpuFeatures::AVX;
        }
    }
    features
}

#[cfg(target_arch = "aarch64")]
fn probe() -> CpuFeatures {
    if std::arch::is_aarch64_feature_detected!("neon") {
        CpuFeatures::NEON
    } else {
        CpuFeatures::empty()
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn probe() -> CpuFeatures {
    CpuFeatures::empty()
}
