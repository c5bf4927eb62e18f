use lazy_static::lazy_static;
use num_complex::Complex32;
use parking_lot::Mutex;
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

/// Base interface for forward transforms used by the analyzer.
pub trait FrequencyTransform: Send + Sync {
    /// In-place forward transform; `buffer` must match the planned length.
    fn xform_inplace(&self, buffer: &mut [Complex32]);

    fn name(&self) -> String;
}

/// Forward plan backed by `rustfft`.
pub struct RustFftPlan {
    n: usize,
    fft: Arc<dyn Fft<f32>>,
}

impl FrequencyTransform for RustFftPlan {
    fn xform_inplace(&self, buffer: &mut [Complex32]) {
        self.fft.process(buffer);
    }

    fn name(&self) -> String {
        format!("RustFFT({})", self.n)
    }
}

lazy_static! {
    static ref PLANNER: Mutex<FftPlanner<f32>> = Mutex::new(FftPlanner::new());
    static ref PLAN_CACHE: Mutex<HashMap<usize, Arc<dyn FrequencyTransform>>> =
        Mutex::new(HashMap::new());
}

/// Returns a forward transform plan for size `n`, cached across sessions.
pub fn find_dft(n: usize) -> Arc<dyn FrequencyTransform> {
    // Cached plan lookup.
    {
        let cache = PLAN_CACHE.lock();
        if let Some(plan) = cache.get(&n) {
            return plan.clone();
        }
    }

    let fft = PLANNER.lock().plan_fft_forward(n);
    let plan: Arc<dyn FrequencyTransform> = Arc::new(RustFftPlan { n, fft });
    log::debug!("Planned {}", plan.name());

    let mut cache = PLAN_CACHE.lock();
    cache.insert(n, plan.clone());
    plan
}

/// Blackman window coefficients (alpha = 0.16) of length `n`.
pub fn blackman_window(n: usize) -> Vec<f32> {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;

    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_are_cached_per_size() {
        let a = find_dft(64);
        let b = find_dft(64);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "RustFFT(64)");
    }

    #[test]
    fn transforms_constant_signal_into_dc_bin() {
        let plan = find_dft(16);
        let mut buf = vec![Complex32::new(1.0, 0.0); 16];
        plan.xform_inplace(&mut buf);

        assert!((buf[0].re - 16.0).abs() < 1e-4);
        for bin in &buf[1..] {
            assert!(bin.norm() < 1e-4);
        }
    }

    #[test]
    fn blackman_window_is_zero_at_edge_and_peaks_mid() {
        let w = blackman_window(2048);
        assert!(w[0].abs() < 1e-6);
        assert!((w[1024] - 1.0).abs() < 1e-4);
    }
}
