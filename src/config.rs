use crate::audio::analyzer::{
    AnalyzerConfig, DEFAULT_FFT_SIZE, DEFAULT_MAX_DECIBELS, DEFAULT_MIN_DECIBELS,
    DEFAULT_SMOOTHING,
};
use crate::audio::DeviceSelector;
use crate::error::AudioError;
use clap::Parser;
use log::LevelFilter;

/// micmeter - live microphone level meter
#[derive(Parser, Debug)]
#[command(name = "micmeter")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input device to open, as printed by --list-devices (defaults to the system input)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Print the available input devices and exit
    #[arg(short, long)]
    pub list_devices: bool,

    /// Spectrum smoothing between frames, 0 (none) to 1
    #[arg(long, default_value_t = DEFAULT_SMOOTHING)]
    pub smoothing: f32,

    /// Spectrum magnitude mapped to byte 0
    #[arg(long, default_value_t = DEFAULT_MIN_DECIBELS, allow_hyphen_values = true)]
    pub min_db: f32,

    /// Spectrum magnitude mapped to byte 255
    #[arg(long, default_value_t = DEFAULT_MAX_DECIBELS, allow_hyphen_values = true)]
    pub max_db: f32,

    /// Increase logging verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    pub fn device_selector(&self) -> DeviceSelector {
        DeviceSelector::from_name(self.device.clone())
    }

    /// Validated analyzer tuning. The transform size is always the default.
    pub fn analyzer_config(&self) -> Result<AnalyzerConfig, AudioError> {
        let config = AnalyzerConfig {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: self.smoothing,
            min_decibels: self.min_db,
            max_decibels: self.max_db,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Initializes logging; `RUST_LOG` still overrides the computed filter.
pub fn init_logging(args: &Args) {
    let filter = format!(
        "warn,micmeter={}",
        args.log_level().to_string().to_lowercase()
    );
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .init();
}
