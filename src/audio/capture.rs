use super::analyzer::{AnalyzerConfig, FrequencyAnalyzer, FrequencySource};
use super::devices::{find_input_device, DeviceSelector};
use crate::error::AudioError;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::{Consumer, HeapRb, Producer};
use std::sync::Arc;

pub type SampleProducer = Producer<f32, Arc<HeapRb<f32>>>;
pub type SampleConsumer = Consumer<f32, Arc<HeapRb<f32>>>;

/// A live input stream wired into a frequency analyzer.
///
/// The session exclusively owns its stream. Once [`CaptureSession::close`]
/// has run, the session only yields silence and cannot be reopened.
pub struct CaptureSession {
    stream: Option<cpal::Stream>,
    consumer: Option<SampleConsumer>,
    analyzer: Option<FrequencyAnalyzer>,
    spectrum_db: Vec<f32>,

    device_name: String,
    sample_rate: u32,
    channels: u16,
}

impl CaptureSession {
    /// Opens `selector` at its default input config and starts streaming.
    pub fn open(
        host: &cpal::Host,
        selector: &DeviceSelector,
        config: AnalyzerConfig,
    ) -> Result<Self, AudioError> {
        let analyzer = FrequencyAnalyzer::new(config)?;

        let device = find_input_device(host, selector)?;
        let device_name = device.name().unwrap_or_else(|_| selector.to_string());
        log::info!("Selected audio device: {}", device_name);

        //
        // Retrieve and log the device's default input configuration.
        //
        let supported_config = device.default_input_config()?;
        let sample_format = supported_config.sample_format();
        let stream_config: cpal::StreamConfig = supported_config.into();

        log::info!(
            "Audio config: {:?} @ {}Hz, Channels: {}",
            sample_format,
            stream_config.sample_rate.0,
            stream_config.channels
        );

        //
        // Ring buffer holds 4x the transform window to ride out UI stalls.
        //
        let (producer, consumer) = HeapRb::<f32>::new(config.fft_size * 4).split();

        let stream = match sample_format {
            SampleFormat::F32 => build_input::<f32>(&device, &stream_config, producer)?,
            SampleFormat::I16 => build_input::<i16>(&device, &stream_config, producer)?,
            SampleFormat::U16 => build_input::<u16>(&device, &stream_config, producer)?,
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };

        //
        // Start the stream; on failure it is dropped before the error returns.
        //
        if let Err(err) = stream.play() {
            drop(stream);
            log::error!("Failed to start capture on {}: {}", device_name, err);
            return Err(err.into());
        }

        log::info!("Capture session opened on {}", device_name);

        Ok(Self {
            stream: Some(stream),
            consumer: Some(consumer),
            spectrum_db: vec![0.0; config.frequency_bin_count()],
            analyzer: Some(analyzer),
            device_name,
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn analyzer(&self) -> Option<&FrequencyAnalyzer> {
        self.analyzer.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none() && self.analyzer.is_none()
    }

    /// Frequency of the loudest bin in the current spectrum, in Hz.
    /// Reads the spectrum as last refreshed; does not pull new input.
    pub fn peak_frequency(&mut self) -> Option<f32> {
        let analyzer = self.analyzer.as_mut()?;
        analyzer.get_float_frequency_data(&mut self.spectrum_db);

        let (bin, &peak) = self
            .spectrum_db
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        if !peak.is_finite() {
            return None;
        }
        Some(bin as f32 * self.sample_rate as f32 / analyzer.fft_size() as f32)
    }

    /// Stops the stream and releases the analyzer. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }

        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                log::warn!("Failed to pause stream on {}: {}", self.device_name, err);
            }
            drop(stream);
            log::info!("Capture stream on {} stopped", self.device_name);
        }

        self.consumer = None;

        if self.analyzer.take().is_some() {
            log::debug!("Analyzer for {} released", self.device_name);
        }
    }

    /// Moves every sample the stream produced so far into the analyzer.
    fn drain_input(&mut self) -> usize {
        let (Some(consumer), Some(analyzer)) = (self.consumer.as_mut(), self.analyzer.as_mut())
        else {
            return 0;
        };

        let mut chunk = [0.0f32; 512];
        let mut count = 0;
        loop {
            let n = consumer.pop_slice(&mut chunk);
            if n == 0 {
                break;
            }
            analyzer.push_samples(&chunk[..n]);
            count += n;
        }
        count
    }

    /// A session with no hardware stream, fed through the returned producer.
    #[cfg(test)]
    pub(crate) fn detached(config: AnalyzerConfig) -> Result<(Self, SampleProducer), AudioError> {
        let analyzer = FrequencyAnalyzer::new(config)?;
        let (producer, consumer) = HeapRb::<f32>::new(config.fft_size * 4).split();

        let session = Self {
            stream: None,
            consumer: Some(consumer),
            spectrum_db: vec![0.0; config.frequency_bin_count()],
            analyzer: Some(analyzer),
            device_name: "detached".to_string(),
            sample_rate: 48_000,
            channels: 1,
        };
        Ok((session, producer))
    }
}

impl FrequencySource for CaptureSession {
    fn frequency_bin_count(&self) -> usize {
        self.analyzer
            .as_ref()
            .map(|analyzer| analyzer.frequency_bin_count())
            .unwrap_or(0)
    }

    fn get_byte_frequency_data(&mut self, buf: &mut [u8]) {
        self.drain_input();
        match self.analyzer.as_mut() {
            Some(analyzer) => analyzer.get_byte_frequency_data(buf),
            None => buf.fill(0),
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut producer: SampleProducer,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels as usize;
    let err_fn = |err| log::error!("Audio input error: {}", err);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            downmix(data, channels, |sample| {
                let _ = producer.push(sample);
            });
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

/// Folds interleaved frames down to mono f32.
/// Stereo is averaged; wider layouts keep the first channel.
pub(crate) fn downmix<T>(data: &[T], channels: usize, mut sink: impl FnMut(f32))
where
    T: Sample,
    f32: cpal::FromSample<T>,
{
    match channels {
        0 => {}
        1 => data.iter().for_each(|&sample| sink(sample.to_sample::<f32>())),
        2 => {
            for chunk in data.chunks_exact(2) {
                sink((chunk[0].to_sample::<f32>() + chunk[1].to_sample::<f32>()) * 0.5);
            }
        }
        _ => {
            for chunk in data.chunks_exact(channels) {
                if let Some(&sample) = chunk.first() {
                    sink(sample.to_sample::<f32>());
                }
            }
        }
    }
}
