// dBFS window reported by the meter.
pub const MIN_DB: f32 = -60.0;
pub const MAX_DB: f32 = 0.0;

/// Largest magnitude a byte spectrum bin can hold.
pub const MAX_MAGNITUDE: f32 = 255.0;

// 94 dB SPL is taken to correspond to 0 dBFS.
pub const REFERENCE_DB_SPL: f32 = 94.0;
pub const MIN_DB_SPL: i32 = 30;

// Perceptual curve applied to the normalized RMS.
const LEVEL_EXPONENT: f32 = 0.4;
const LEVEL_GAIN: f32 = 1.2;

/// Root-mean-square of the magnitudes. Zero for an empty buffer.
pub fn calculate_rms_level(data: &[u8]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().map(|&v| (v as f64) * (v as f64)).sum();
    (sum / data.len() as f64).sqrt() as f32
}

/// Converts a byte spectrum into dBFS, clamped to [`MIN_DB`, `MAX_DB`].
///
/// Pure silence reports the floor. Otherwise the RMS is floored at one raw
/// unit before the log so the result is always finite.
pub fn calculate_decibels(data: &[u8]) -> f32 {
    let rms = calculate_rms_level(data);
    // All-zero input pins to the floor; any energy jumps to the 1-unit reading (-48.1).
    if rms <= 0.0 {
        return MIN_DB;
    }

    let dbfs = 20.0 * (rms.max(1.0) / MAX_MAGNITUDE).log10();
    dbfs.clamp(MIN_DB, MAX_DB)
}

/// Rough sound pressure level for a dBFS reading, never below [`MIN_DB_SPL`].
pub fn estimate_db_spl(dbfs: f32) -> i32 {
    ((REFERENCE_DB_SPL + dbfs).round() as i32).max(MIN_DB_SPL)
}

/// Maps a raw RMS magnitude onto the [0, 1] meter scale.
pub fn normalized_level(rms: f32) -> f32 {
    let level = (rms / MAX_MAGNITUDE).max(0.0).powf(LEVEL_EXPONENT) * LEVEL_GAIN;
    level.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(v: u8) -> Vec<u8> {
        vec![v; 1024]
    }

    #[test]
    fn silence_is_the_floor() {
        assert_eq!(calculate_decibels(&uniform(0)), -60.0);
        assert_eq!(calculate_decibels(&[]), -60.0);
    }

    #[test]
    fn full_scale_is_the_ceiling() {
        assert_eq!(calculate_decibels(&uniform(255)), 0.0);
    }

    #[test]
    fn uniform_buffers_match_closed_form() {
        for v in 1..=255u8 {
            let expected = (20.0 * (v as f32 / 255.0).log10()).clamp(-60.0, 0.0);
            let got = calculate_decibels(&uniform(v));
            assert!((got - expected).abs() < 1e-4, "v={} got={} expected={}", v, got, expected);
        }
    }

    #[test]
    fn squares_each_sample() {
        // RMS of [0, 255] is 255 / sqrt(2).
        let rms = calculate_rms_level(&[0, 255]);
        assert!((rms - 255.0 / 2f32.sqrt()).abs() < 1e-3);
        assert!((calculate_decibels(&[0, 255]) - (-3.0103)).abs() < 1e-3);
    }

    #[test]
    fn estimates_spl() {
        assert_eq!(estimate_db_spl(-60.0), 34);
        assert_eq!(estimate_db_spl(0.0), 94);
        assert_eq!(estimate_db_spl(-70.0), 30);
        assert_eq!(estimate_db_spl(-20.4), 74);
    }

    #[test]
    fn normalized_level_curve() {
        assert_eq!(normalized_level(0.0), 0.0);
        assert_eq!(normalized_level(255.0), 1.0);

        let quarter = normalized_level(255.0 * 0.25);
        assert!((quarter - 0.25f32.powf(0.4) * 1.2).abs() < 1e-6);

        // Gain saturates before full scale.
        assert_eq!(normalized_level(255.0 * 0.7), 1.0);
    }
}
