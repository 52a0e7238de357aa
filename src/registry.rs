//! Device type catalogue and voice metadata
//!
//! A static, ordered registry of device classes. Registration order is
//! significant: voice detection and numeric selection ("device 2") both
//! resolve against it, first match wins. Each entry binds the
//! [`DeviceTransport`] used to scan and pair that class, so orchestrators
//! dispatch through the registry instead of branching on type ids.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use crate::store::FailureKind;
use crate::transport::DeviceTransport;

/// Fallback when a device class has no message for a failure kind
const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// How a device class is discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMethod {
    /// Backend Bluetooth adapter scan
    Bluetooth,
    /// Backend cast/mDNS scan
    Cast,
    /// Generic backend scan
    Backend,
}

/// How a device class is paired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingMethod {
    Bluetooth,
    Cast,
    Backend,
}

/// Static metadata for one class of pairable device
#[derive(Debug, Clone)]
pub struct DeviceTypeDescriptor {
    pub id: String,
    pub display_name: String,
    pub scan_method: ScanMethod,
    pub scan_timeout: Duration,
    pub pairing_method: PairingMethod,
    /// Whether pairing waits on a real approval handshake on the device
    pub requires_approval: bool,
    /// Ordered voice-match patterns (first match wins)
    pub voice_patterns: Vec<Regex>,
    pub failure_messages: HashMap<FailureKind, String>,
    /// Cosmetic delay before scan results are committed, so the scanning
    /// animation can finish. Never blocks the underlying network call.
    pub presentation_delay: Duration,
}

impl DeviceTypeDescriptor {
    /// Whether any voice pattern matches the utterance
    #[must_use]
    pub fn matches_voice(&self, utterance: &str) -> bool {
        self.voice_patterns.iter().any(|p| p.is_match(utterance))
    }

    /// Spoken message for a failure kind, with a generic fallback
    #[must_use]
    pub fn failure_message(&self, kind: FailureKind) -> &str {
        self.failure_messages
            .get(&kind)
            .map_or(GENERIC_FAILURE_MESSAGE, String::as_str)
    }
}

/// Ordered catalogue of device classes with their transports
pub struct DeviceTypeRegistry {
    types: Vec<DeviceTypeDescriptor>,
    transports: HashMap<String, Arc<dyn DeviceTransport>>,
}

impl DeviceTypeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            transports: HashMap::new(),
        }
    }

    /// Create the builtin catalogue, binding every class to `transport`
    #[must_use]
    pub fn with_builtin(transport: Arc<dyn DeviceTransport>) -> Self {
        let mut registry = Self::new();
        for descriptor in builtin_types() {
            registry.register(descriptor, Arc::clone(&transport));
        }
        registry
    }

    /// Append a device class; later registrations rank lower in
    /// voice detection and numeric selection
    pub fn register(
        &mut self,
        descriptor: DeviceTypeDescriptor,
        transport: Arc<dyn DeviceTransport>,
    ) {
        self.transports.insert(descriptor.id.clone(), transport);
        self.types.push(descriptor);
    }

    /// Look up a device class by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DeviceTypeDescriptor> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Transport bound to a device class
    #[must_use]
    pub fn transport_for(&self, id: &str) -> Option<Arc<dyn DeviceTransport>> {
        self.transports.get(id).cloned()
    }

    /// All device classes in registration order
    #[must_use]
    pub fn all(&self) -> &[DeviceTypeDescriptor] {
        &self.types
    }

    /// First device class (registration order) with a voice pattern
    /// matching the utterance
    #[must_use]
    pub fn detect_from_voice(&self, utterance: &str) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.matches_voice(utterance))
            .map(|t| t.id.as_str())
    }

    /// Number of registered device classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for DeviceTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("valid voice pattern")
}

fn messages<const N: usize>(entries: [(FailureKind, &str); N]) -> HashMap<FailureKind, String> {
    entries
        .into_iter()
        .map(|(kind, text)| (kind, text.to_string()))
        .collect()
}

/// The builtin device class catalogue, in selection order
fn builtin_types() -> Vec<DeviceTypeDescriptor> {
    vec![
        DeviceTypeDescriptor {
            id: "bluetooth".to_string(),
            display_name: "Bluetooth audio".to_string(),
            scan_method: ScanMethod::Bluetooth,
            scan_timeout: Duration::from_secs(15),
            pairing_method: PairingMethod::Bluetooth,
            requires_approval: false,
            voice_patterns: vec![
                pattern(r"(?i)\bbluetooth\b"),
                pattern(r"(?i)\bhead(?:phone|set)s?\b"),
                pattern(r"(?i)\bear(?:bud|phone)s?\b"),
                pattern(r"(?i)\bspeakers?\b"),
                pattern(r"(?i)\bairpods\b"),
            ],
            failure_messages: messages([
                (
                    FailureKind::NoDevices,
                    "I couldn't find any Bluetooth audio devices. Make sure your device is in pairing mode and nearby.",
                ),
                (
                    FailureKind::ScanFailed,
                    "Bluetooth scanning isn't available right now. Please try again.",
                ),
                (
                    FailureKind::Rejected,
                    "The device declined the connection. Put it back in pairing mode and try again.",
                ),
                (
                    FailureKind::Timeout,
                    "The Bluetooth device took too long to respond.",
                ),
            ]),
            presentation_delay: Duration::from_millis(3000),
        },
        DeviceTypeDescriptor {
            id: "android-tv".to_string(),
            display_name: "Android TV".to_string(),
            scan_method: ScanMethod::Backend,
            scan_timeout: Duration::from_secs(10),
            pairing_method: PairingMethod::Backend,
            requires_approval: true,
            voice_patterns: vec![
                pattern(r"(?i)\bandroid\s*tv\b"),
                pattern(r"(?i)\bsmart\s*tv\b"),
                pattern(r"(?i)\btelevision\b"),
                pattern(r"(?i)\btv\b"),
            ],
            failure_messages: messages([
                (
                    FailureKind::NoDevices,
                    "I couldn't find any Android TVs on your network.",
                ),
                (
                    FailureKind::Rejected,
                    "The TV declined the pairing request. Accept the prompt on the TV screen and try again.",
                ),
                (
                    FailureKind::Timeout,
                    "The TV didn't respond to the pairing request in time.",
                ),
            ]),
            presentation_delay: Duration::ZERO,
        },
        DeviceTypeDescriptor {
            id: "chromecast".to_string(),
            display_name: "Chromecast".to_string(),
            scan_method: ScanMethod::Cast,
            scan_timeout: Duration::from_secs(8),
            pairing_method: PairingMethod::Cast,
            requires_approval: false,
            voice_patterns: vec![
                pattern(r"(?i)\bchrome\s*cast\b"),
                pattern(r"(?i)\bcast(?:ing)?\b"),
            ],
            failure_messages: messages([
                (
                    FailureKind::NoDevices,
                    "I couldn't find any Chromecast devices on your network.",
                ),
                (
                    FailureKind::ScanFailed,
                    "Cast discovery isn't available right now. Please try again.",
                ),
            ]),
            presentation_delay: Duration::from_millis(1000),
        },
        DeviceTypeDescriptor {
            id: "mobile".to_string(),
            display_name: "Mobile device".to_string(),
            scan_method: ScanMethod::Backend,
            scan_timeout: Duration::from_secs(10),
            pairing_method: PairingMethod::Backend,
            requires_approval: true,
            voice_patterns: vec![
                pattern(r"(?i)\bphone\b"),
                pattern(r"(?i)\bmobile\b"),
                pattern(r"(?i)\btablet\b"),
                pattern(r"(?i)\bi(?:phone|pad)\b"),
            ],
            failure_messages: messages([
                (
                    FailureKind::NoDevices,
                    "I couldn't find any mobile devices to link.",
                ),
                (
                    FailureKind::Rejected,
                    "The link request was declined on the device.",
                ),
            ]),
            presentation_delay: Duration::ZERO,
        },
        DeviceTypeDescriptor {
            id: "smart-home".to_string(),
            display_name: "Smart home".to_string(),
            scan_method: ScanMethod::Backend,
            scan_timeout: Duration::from_secs(12),
            pairing_method: PairingMethod::Backend,
            requires_approval: false,
            voice_patterns: vec![
                pattern(r"(?i)\bsmart\s*home\b"),
                pattern(r"(?i)\blights?\b"),
                pattern(r"(?i)\bbulbs?\b"),
                pattern(r"(?i)\bplugs?\b"),
                pattern(r"(?i)\bthermostat\b"),
            ],
            failure_messages: messages([
                (
                    FailureKind::NoDevices,
                    "I couldn't find any smart home devices.",
                ),
            ]),
            presentation_delay: Duration::ZERO,
        },
    ]
}
