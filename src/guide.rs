//! OS-level pairing guidance
//!
//! After app-level Bluetooth pairing succeeds, OS audio routing may still
//! need a manual pairing step. The host supplies platform-specific
//! instructions through [`GuideSource`]; this core only consumes the text
//! and shows the `os-pairing-guide` screen. The screen is a side-branch:
//! it is entered from outside the normal transition graph and exits only
//! via close.

use crate::store::DeviceRecord;

/// Supplier of platform-specific OS pairing instructions
pub trait GuideSource: Send + Sync {
    /// Instructions for routing audio to `device`, or `None` when the
    /// platform needs no manual step
    fn instructions(&self, device: &DeviceRecord) -> Option<String>;
}

/// Fixed-text guide source
///
/// Suitable for hosts that render one instruction set per platform and
/// substitute the device name themselves.
pub struct StaticGuide {
    template: String,
}

impl StaticGuide {
    /// Create a guide whose text contains `{device}` placeholders
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl GuideSource for StaticGuide {
    fn instructions(&self, device: &DeviceRecord) -> Option<String> {
        Some(self.template.replace("{device}", &device.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_guide_substitutes_device_name() {
        let guide = StaticGuide::new("Open Settings > Bluetooth and select {device}.");
        let device = DeviceRecord::new("1", "Sony WH-1000XM4", "bluetooth");
        assert_eq!(
            guide.instructions(&device).as_deref(),
            Some("Open Settings > Bluetooth and select Sony WH-1000XM4.")
        );
    }
}
