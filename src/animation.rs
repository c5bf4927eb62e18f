use crate::audio::FrequencySource;
use crate::level::{calculate_decibels, calculate_rms_level, estimate_db_spl, normalized_level};
use crate::meter::{calculate_cell_colors, MeterCellState, NUM_CELLS};
use std::time::{Duration, Instant};

/// Everything the display needs for one refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterFrame {
    pub level: f32,
    pub dbfs: f32,
    pub db_spl: i32,
    pub cells: [MeterCellState; NUM_CELLS],
}

impl MeterFrame {
    pub fn from_spectrum(data: &[u8]) -> Self {
        let rms = calculate_rms_level(data);
        let level = normalized_level(rms);
        let dbfs = calculate_decibels(data);

        Self {
            level,
            dbfs,
            db_spl: estimate_db_spl(dbfs),
            cells: calculate_cell_colors(level),
        }
    }
}

/// Samples a [`FrequencySource`] once per display refresh.
///
/// The driver owns the reusable spectrum buffer. The caller asks for the
/// next refresh only while [`AnimationDriver::is_running`] holds.
pub struct AnimationDriver {
    buffer: Vec<u8>,
    running: bool,

    //
    // Statistics for periodic logging.
    //
    last_stats_time: Instant,
    frames: usize,
    peak_level: f32,
    peak_dbfs: f32,
}

impl AnimationDriver {
    pub fn new(bin_count: usize) -> Self {
        Self {
            buffer: vec![0; bin_count],
            running: true,
            last_stats_time: Instant::now(),
            frames: 0,
            peak_level: 0.0,
            peak_dbfs: f32::NEG_INFINITY,
        }
    }

    /// Halts the loop; later steps return `None`.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::debug!("Animation stopped after {} frames", self.frames);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Runs one frame. Returns `None` once the driver has been stopped.
    pub fn step<S: FrequencySource + ?Sized>(&mut self, source: &mut S) -> Option<MeterFrame> {
        if !self.is_running() {
            return None;
        }

        let bins = source.frequency_bin_count();
        if self.buffer.len() != bins {
            self.buffer.resize(bins, 0);
        }

        source.get_byte_frequency_data(&mut self.buffer);
        let frame = MeterFrame::from_spectrum(&self.buffer);

        self.record(&frame);
        Some(frame)
    }

    fn record(&mut self, frame: &MeterFrame) {
        self.frames += 1;
        self.peak_level = self.peak_level.max(frame.level);
        self.peak_dbfs = self.peak_dbfs.max(frame.dbfs);

        if self.last_stats_time.elapsed() > Duration::from_secs(1) {
            log::info!(
                "Meter | Frames: {} | Peak level: {:.3} | Peak dBFS: {:.1}",
                self.frames,
                self.peak_level,
                self.peak_dbfs
            );
            self.frames = 0;
            self.peak_level = 0.0;
            self.peak_dbfs = f32::NEG_INFINITY;
            self.last_stats_time = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AnalyzerConfig, CaptureSession};

    /// Source that fills every bin with one value.
    struct Constant(u8, usize);

    impl FrequencySource for Constant {
        fn frequency_bin_count(&self) -> usize {
            self.1
        }

        fn get_byte_frequency_data(&mut self, buf: &mut [u8]) {
            buf.fill(self.0);
        }
    }

    #[test]
    fn full_scale_frame() {
        let mut driver = AnimationDriver::new(1024);
        let frame = driver.step(&mut Constant(255, 1024)).unwrap();

        assert_eq!(frame.level, 1.0);
        assert_eq!(frame.dbfs, 0.0);
        assert_eq!(frame.db_spl, 94);
        assert!(frame.cells.iter().all(|c| c.is_active()));
    }

    #[test]
    fn silent_frame() {
        let mut driver = AnimationDriver::new(1024);
        let frame = driver.step(&mut Constant(0, 1024)).unwrap();

        assert_eq!(frame.level, 0.0);
        assert_eq!(frame.dbfs, -60.0);
        assert_eq!(frame.db_spl, 34);
        assert!(frame.cells.iter().all(|c| !c.is_active()));
    }

    #[test]
    fn level_follows_perceptual_curve() {
        let mut driver = AnimationDriver::new(8);
        let frame = driver.step(&mut Constant(64, 8)).unwrap();

        let expected = ((64.0f32 / 255.0).powf(0.4) * 1.2).min(1.0);
        assert!((frame.level - expected).abs() < 1e-6);
    }

    #[test]
    fn stopped_driver_yields_nothing() {
        let mut driver = AnimationDriver::new(16);
        assert!(driver.step(&mut Constant(100, 16)).is_some());

        driver.stop();
        assert!(!driver.is_running());
        assert!(driver.step(&mut Constant(100, 16)).is_none());

        // Stopping again is harmless.
        driver.stop();
        assert!(driver.step(&mut Constant(100, 16)).is_none());
    }

    #[test]
    fn buffer_is_resized_to_source() {
        let mut driver = AnimationDriver::new(4);
        driver.step(&mut Constant(3, 10)).unwrap();
        assert_eq!(driver.buffer, vec![3u8; 10]);
    }

    #[test]
    fn drives_a_capture_session() {
        let (mut session, mut producer) =
            CaptureSession::detached(AnalyzerConfig::default()).unwrap();
        let mut driver = AnimationDriver::new(session.frequency_bin_count());

        let silent = driver.step(&mut session).unwrap();
        assert_eq!(silent.level, 0.0);

        let tone: Vec<f32> = (0..2048)
            .map(|i| (2.0 * std::f32::consts::PI * 40.0 * i as f32 / 2048.0).sin())
            .collect();
        producer.push_slice(&tone);

        let loud = driver.step(&mut session).unwrap();
        assert!(loud.level > 0.0);
        assert!(loud.cells[0].is_active());

        driver.stop();
        session.close();
        assert!(driver.step(&mut session).is_none());
    }
}
