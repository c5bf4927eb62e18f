use crate::error::AudioError;
use cpal::traits::{DeviceTrait, HostTrait};
use std::collections::HashSet;
use std::fmt;

/// An input endpoint as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDeviceDescriptor {
    /// Identifier accepted by [`DeviceSelector::Named`].
    pub id: String,
    pub label: String,
    pub is_default: bool,
}

/// Which input endpoint a capture session should open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    #[default]
    Default,
    Named(String),
}

impl DeviceSelector {
    pub fn from_name(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.trim().is_empty() && name != "default" => {
                DeviceSelector::Named(name)
            }
            _ => DeviceSelector::Default,
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelector::Default => write!(f, "default input"),
            DeviceSelector::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Builds descriptors for input devices in host order.
/// Unnamed devices are numbered by their position among the inputs. Repeated
/// labels get a ` (N)` suffix so every id resolves to exactly one device.
pub(crate) fn describe_inputs(
    names: &[Option<String>],
    default_name: Option<&str>,
) -> Vec<AudioDeviceDescriptor> {
    let mut seen = HashSet::new();
    let mut default_taken = false;

    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let base = match name {
                Some(name) if !name.is_empty() => name.clone(),
                _ => format!("Microphone {}", index + 1),
            };

            let mut label = base.clone();
            let mut copy = 2;
            while !seen.insert(label.clone()) {
                label = format!("{} ({})", base, copy);
                copy += 1;
            }

            let is_default = !default_taken
                && name.as_deref().is_some_and(|n| !n.is_empty())
                && name.as_deref() == default_name;
            default_taken |= is_default;

            AudioDeviceDescriptor {
                id: label.clone(),
                label,
                is_default,
            }
        })
        .collect()
}

fn enumerate_inputs(host: &cpal::Host) -> Result<(Vec<cpal::Device>, Vec<AudioDeviceDescriptor>), AudioError> {
    let devices: Vec<cpal::Device> = host.input_devices()?.collect();
    let names: Vec<Option<String>> = devices.iter().map(|dev| dev.name().ok()).collect();
    let default_name = host.default_input_device().and_then(|dev| dev.name().ok());

    let descriptors = describe_inputs(&names, default_name.as_deref());
    Ok((devices, descriptors))
}

/// Lists every input-capable endpoint the host exposes.
pub fn list_input_devices(host: &cpal::Host) -> Result<Vec<AudioDeviceDescriptor>, AudioError> {
    let (_, descriptors) = enumerate_inputs(host)?;

    log::info!("--- AVAILABLE INPUT DEVICES ---");
    for (i, desc) in descriptors.iter().enumerate() {
        let marker = if desc.is_default { " (default)" } else { "" };
        log::info!("  [{}]: {}{}", i, desc.label, marker);
    }
    log::info!("-------------------------------");

    Ok(descriptors)
}

/// Resolves a selector to a concrete input device.
pub fn find_input_device(
    host: &cpal::Host,
    selector: &DeviceSelector,
) -> Result<cpal::Device, AudioError> {
    match selector {
        DeviceSelector::Default => host.default_input_device().ok_or_else(|| {
            AudioError::DeviceUnavailable("no default input device".to_string())
        }),
        DeviceSelector::Named(id) => {
            let (mut devices, descriptors) = enumerate_inputs(host)?;
            descriptors
                .iter()
                .position(|desc| &desc.id == id)
                .map(|pos| devices.swap_remove(pos))
                .ok_or_else(|| AudioError::DeviceUnavailable(format!("no input device named {}", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_backend_names_when_present() {
        let names = vec![Some("USB Mic".to_string()), Some("Built-in".to_string())];
        let descs = describe_inputs(&names, Some("Built-in"));

        assert_eq!(descs[0].label, "USB Mic");
        assert!(!descs[0].is_default);
        assert_eq!(descs[1].label, "Built-in");
        assert!(descs[1].is_default);
    }

    #[test]
    fn numbers_placeholders_by_input_position() {
        let names = vec![None, Some("Headset".to_string()), None];
        let descs = describe_inputs(&names, None);

        let labels: Vec<&str> = descs.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Microphone 1", "Headset", "Microphone 3"]);
        assert_eq!(descs[2].id, "Microphone 3");
    }

    #[test]
    fn empty_names_fall_back_to_placeholder() {
        let descs = describe_inputs(&[Some(String::new())], None);
        assert_eq!(descs[0].label, "Microphone 1");
        assert!(!descs[0].is_default);
    }

    #[test]
    fn duplicate_names_get_distinct_ids() {
        let names = vec![
            Some("USB Audio Device".to_string()),
            Some("USB Audio Device".to_string()),
            None,
            Some("Microphone 3".to_string()),
        ];
        let descs = describe_inputs(&names, Some("USB Audio Device"));

        let ids: Vec<&str> = descs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            ["USB Audio Device", "USB Audio Device (2)", "Microphone 3", "Microphone 3 (2)"]
        );

        // Each id resolves back to its own position.
        for (pos, desc) in descs.iter().enumerate() {
            assert_eq!(descs.iter().position(|d| d.id == desc.id), Some(pos));
        }

        let defaults: Vec<bool> = descs.iter().map(|d| d.is_default).collect();
        assert_eq!(defaults, [true, false, false, false]);
    }

    #[test]
    fn selector_from_name() {
        assert_eq!(DeviceSelector::from_name(None), DeviceSelector::Default);
        assert_eq!(
            DeviceSelector::from_name(Some("default".to_string())),
            DeviceSelector::Default
        );
        assert_eq!(
            DeviceSelector::from_name(Some("USB Mic".to_string())),
            DeviceSelector::Named("USB Mic".to_string())
        );
    }
}
