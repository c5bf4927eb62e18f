pub mod analyzer;
pub mod capture;
pub mod devices;

pub use analyzer::{AnalyzerConfig, FrequencySource};
pub use capture::CaptureSession;
pub use devices::{list_input_devices, AudioDeviceDescriptor, DeviceSelector};
