//! Session state consumed by the renderer and the voice interpreter
//!
//! The renderer reads `current_screen` plus the session fields; nothing
//! else leaves this crate. All types serialize with the field casing the
//! browser bridge expects (camelCase fields, kebab-case screen names).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single authoritative screen field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    /// Pick a device class to scan for
    #[default]
    DeviceTypeSelector,
    /// Discovery in flight
    Scanning,
    /// Discovery completed with at least one device
    DeviceList,
    /// Pairing sequence in flight
    Pairing,
    /// Pairing reached a terminal connected state (auto-closes)
    Success,
    /// Pairing failed; retry/back/rescan offered
    Error,
    /// Discovery completed empty or failed; rescan offered
    NoDevices,
    /// OS-level audio routing still needs manual pairing (side-branch)
    OsPairingGuide,
}

/// Discovery session status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
    Completed,
    Failed,
}

/// Pairing session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStatus {
    Connecting,
    WaitingApproval,
    Connected,
    Failed,
}

/// Why a scan or pairing attempt failed
///
/// Keys the per-device-class spoken failure messages in the registry and
/// lands in [`PairingSession::error_reason`] for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network/timeout/backend-reported error during discovery
    ScanFailed,
    /// Valid, non-error empty discovery result
    NoDevices,
    /// Backend rejected the pairing request
    Rejected,
    /// Pairing request timed out
    Timeout,
    /// Execution error while pairing
    Execution,
}

/// A discovered device as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub id: String,
    pub name: String,
    pub device_type_id: String,
    #[serde(default)]
    pub paired: bool,
    #[serde(default)]
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
}

impl DeviceRecord {
    /// Create a record with only the required fields set
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, device_type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_type_id: device_type_id.into(),
            paired: false,
            connected: false,
            ip: None,
            model: None,
            manufacturer: None,
        }
    }
}

/// One discovery attempt for a device type, tagged with a generation
///
/// Exactly one scan session is current at a time. The generation is a
/// monotonic counter bumped whenever a fresh session replaces this one;
/// in-flight callbacks compare their captured generation against it and
/// drop themselves on mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub device_type_id: Option<String>,
    pub status: ScanStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub devices: Vec<DeviceRecord>,
    pub error: Option<String>,
    pub generation: u64,
}

impl ScanSession {
    /// Fresh idle session superseding `previous`
    #[must_use]
    pub fn fresh(device_type_id: Option<String>, previous_generation: u64) -> Self {
        Self {
            device_type_id,
            generation: previous_generation + 1,
            ..Self::default()
        }
    }
}

/// One connection attempt for a selected device, progressing through
/// 4 fixed steps to a terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingSession {
    pub device_id: String,
    pub device_type_id: String,
    pub status: PairingStatus,
    /// Progress in percent, one of 0/25/50/75/100
    pub progress_percent: u8,
    /// Step index in `[0, 3]`
    pub step_index: u8,
    pub error: Option<String>,
    pub error_reason: Option<FailureKind>,
    pub generation: u64,
}

impl PairingSession {
    /// Fresh session at step 0 for the given device
    #[must_use]
    pub fn fresh(device_id: String, device_type_id: String, generation: u64) -> Self {
        Self {
            device_id,
            device_type_id,
            status: PairingStatus::Connecting,
            progress_percent: 0,
            step_index: 0,
            error: None,
            error_reason: None,
            generation,
        }
    }
}

/// The complete pairing modal state
///
/// Constructed once per application lifetime and only ever mutated by the
/// reducer. `pairing_generation` is the last issued pairing generation and
/// only grows, so a torn-down session can never be resurrected by a stale
/// callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingState {
    pub modal_open: bool,
    pub current_screen: Screen,
    pub selected_device_type: Option<String>,
    pub scan: ScanSession,
    pub selected_device: Option<DeviceRecord>,
    pub pairing: Option<PairingSession>,
    /// Last issued pairing generation (monotonic across sessions)
    pub pairing_generation: u64,
    /// OS pairing instructions supplied by an external collaborator
    pub os_guide: Option<String>,
}

/// Read-only projection the voice interpreter consults
#[derive(Debug, Clone)]
pub struct VoiceCommandContext {
    pub current_screen: Screen,
    pub selected_device_type: Option<String>,
    pub found_devices: Vec<DeviceRecord>,
}

impl From<&PairingState> for VoiceCommandContext {
    fn from(state: &PairingState) -> Self {
        Self {
            current_screen: state.current_screen,
            selected_device_type: state.selected_device_type.clone(),
            found_devices: state.scan.devices.clone(),
        }
    }
}
