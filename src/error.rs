use thiserror::Error;

/// Failures surfaced by device enumeration and capture setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Microphone access was denied: {0}")]
    PermissionDenied(String),

    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Audio device is busy: {0}")]
    HardwareBusy(String),

    #[error("Audio platform unavailable: {0}")]
    PlatformUnavailable(String),

    #[error("Unsupported audio sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid analyzer configuration: {0}")]
    InvalidConfig(String),
}

impl AudioError {
    /// Sorts an opaque backend message into the closest error kind.
    pub fn from_backend(description: &str) -> Self {
        let lower = description.to_lowercase();

        if lower.contains("permission") || lower.contains("denied") || lower.contains("not permitted")
        {
            AudioError::PermissionDenied(description.to_string())
        } else if lower.contains("busy") || lower.contains("in use") {
            AudioError::HardwareBusy(description.to_string())
        } else if lower.contains("no such device") || lower.contains("not found") {
            AudioError::DeviceUnavailable(description.to_string())
        } else {
            AudioError::PlatformUnavailable(description.to_string())
        }
    }
}

impl From<cpal::BackendSpecificError> for AudioError {
    fn from(err: cpal::BackendSpecificError) -> Self {
        AudioError::from_backend(&err.description)
    }
}

impl From<cpal::DevicesError> for AudioError {
    fn from(err: cpal::DevicesError) -> Self {
        match err {
            cpal::DevicesError::BackendSpecific { err } => err.into(),
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        match err {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => {
                AudioError::DeviceUnavailable(err.to_string())
            }
            cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
                AudioError::UnsupportedFormat(err.to_string())
            }
            cpal::DefaultStreamConfigError::BackendSpecific { err } => err.into(),
        }
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        match err {
            cpal::BuildStreamError::DeviceNotAvailable => {
                AudioError::DeviceUnavailable(err.to_string())
            }
            cpal::BuildStreamError::StreamConfigNotSupported => {
                AudioError::UnsupportedFormat(err.to_string())
            }
            cpal::BuildStreamError::BackendSpecific { err } => err.into(),
            other => AudioError::PlatformUnavailable(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        match err {
            cpal::PlayStreamError::DeviceNotAvailable => {
                AudioError::DeviceUnavailable(err.to_string())
            }
            cpal::PlayStreamError::BackendSpecific { err } => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_backend_messages() {
        assert!(matches!(
            AudioError::from_backend("ALSA function 'snd_pcm_open' failed with error 'EBUSY: Device or resource busy'"),
            AudioError::HardwareBusy(_)
        ));
        assert!(matches!(
            AudioError::from_backend("Permission denied"),
            AudioError::PermissionDenied(_)
        ));
        assert!(matches!(
            AudioError::from_backend("ENODEV: No such device"),
            AudioError::DeviceUnavailable(_)
        ));
        assert!(matches!(
            AudioError::from_backend("jack server is not running"),
            AudioError::PlatformUnavailable(_)
        ));
    }

    #[test]
    fn maps_missing_device_errors() {
        let err: AudioError = cpal::BuildStreamError::DeviceNotAvailable.into();
        assert!(matches!(err, AudioError::DeviceUnavailable(_)));

        let err: AudioError = cpal::PlayStreamError::DeviceNotAvailable.into();
        assert!(matches!(err, AudioError::DeviceUnavailable(_)));
    }

    #[test]
    fn maps_backend_specific_enumeration_errors() {
        let err: AudioError = cpal::DevicesError::BackendSpecific {
            err: cpal::BackendSpecificError {
                description: "access denied by user".to_string(),
            },
        }
        .into();
        assert!(matches!(err, AudioError::PermissionDenied(_)));
    }
}
