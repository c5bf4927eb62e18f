use crate::error::AudioError;
use crate::fft::{blackman_window, find_dft, FrequencyTransform};
use num_complex::Complex32;
use std::collections::VecDeque;
use std::sync::Arc;

// Analyzer defaults.
pub const DEFAULT_FFT_SIZE: usize = 2048; // Yields 1024 frequency bins.
pub const DEFAULT_SMOOTHING: f32 = 0.8;
pub const DEFAULT_MIN_DECIBELS: f32 = -100.0;
pub const DEFAULT_MAX_DECIBELS: f32 = -30.0;

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32768;

/// Tuning for a [`FrequencyAnalyzer`]. Fixed once the analyzer is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    pub fft_size: usize,
    pub smoothing: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), AudioError> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(AudioError::InvalidConfig(format!(
                "fft size {} must be a power of two between {} and {}",
                self.fft_size, MIN_FFT_SIZE, MAX_FFT_SIZE
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(AudioError::InvalidConfig(format!(
                "smoothing {} must be within [0, 1]",
                self.smoothing
            )));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(AudioError::InvalidConfig(format!(
                "min decibels {} must be below max decibels {}",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Anything that can fill a byte spectrum on demand.
pub trait FrequencySource {
    fn frequency_bin_count(&self) -> usize;

    /// Fills `buf` with the current spectrum as bytes (0..=255).
    /// Bins past `frequency_bin_count()` are left untouched.
    fn get_byte_frequency_data(&mut self, buf: &mut [u8]);
}

/// Pull-based spectrum analyzer over a sliding window of mono samples.
pub struct FrequencyAnalyzer {
    config: AnalyzerConfig,
    fft_plan: Arc<dyn FrequencyTransform>,
    window: Vec<f32>,

    //
    // Most recent `fft_size` time-domain samples, oldest first.
    //
    time_domain_buf: VecDeque<f32>,

    //
    // Smoothed linear magnitudes and their dB conversion, one per bin.
    //
    smoothed: Vec<f32>,
    spectrum_db: Vec<f32>,
    scratch: Vec<Complex32>,

    dirty: bool,
}

impl FrequencyAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AudioError> {
        config.validate()?;

        let n = config.fft_size;
        let bins = config.frequency_bin_count();

        Ok(Self {
            config,
            fft_plan: find_dft(n),
            window: blackman_window(n),
            time_domain_buf: VecDeque::from(vec![0.0; n]),
            smoothed: vec![0.0; bins],
            spectrum_db: vec![f32::NEG_INFINITY; bins],
            scratch: vec![Complex32::default(); n],
            dirty: true,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    pub fn algorithm_name(&self) -> String {
        self.fft_plan.name()
    }

    pub fn push_sample(&mut self, sample: f32) {
        self.time_domain_buf.pop_front();
        self.time_domain_buf.push_back(sample);
        self.dirty = true;
    }

    pub fn push_samples(&mut self, samples: &[f32]) {
        let n = self.config.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        for &sample in tail {
            self.push_sample(sample);
        }
    }

    /// Fills `buf` with the current spectrum in dB.
    pub fn get_float_frequency_data(&mut self, buf: &mut [f32]) {
        self.refresh();
        for (out, &db) in buf.iter_mut().zip(&self.spectrum_db) {
            *out = db;
        }
    }

    /// Recomputes the spectrum when new samples arrived since the last read.
    fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let n = self.config.fft_size;

        //
        // Apply the window and prepare complex FFT input.
        //
        for ((slot, &x), &w) in self
            .scratch
            .iter_mut()
            .zip(&self.time_domain_buf)
            .zip(&self.window)
        {
            *slot = Complex32::new(x * w, 0.0);
        }

        self.fft_plan.xform_inplace(&mut self.scratch);

        //
        // Blend with the previous frame, then convert to dB.
        //
        let tau = self.config.smoothing;
        for i in 0..self.smoothed.len() {
            let mag = self.scratch[i].norm() / n as f32;
            let mut value = tau * self.smoothed[i] + (1.0 - tau) * mag;
            if !value.is_finite() {
                value = 0.0;
            }
            self.smoothed[i] = value;
            self.spectrum_db[i] = linear_to_db(value);
        }
    }
}

impl FrequencySource for FrequencyAnalyzer {
    fn frequency_bin_count(&self) -> usize {
        self.config.frequency_bin_count()
    }

    fn get_byte_frequency_data(&mut self, buf: &mut [u8]) {
        self.refresh();

        let min_db = self.config.min_decibels;
        let range = self.config.max_decibels - min_db;

        for (out, &db) in buf.iter_mut().zip(&self.spectrum_db) {
            let scaled = 255.0 / range * (db - min_db);
            *out = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}

fn linear_to_db(value: f32) -> f32 {
    if value > 0.0 {
        20.0 * value.log10()
    } else {
        f32::NEG_INFINITY
    }
}
