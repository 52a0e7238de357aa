//! Pure state transitions for the pairing modal
//!
//! Every mutation is a named [`Action`] applied by [`reduce`], a
//! deterministic function of `(state, action)`. The screen assignment per
//! action is fixed; timers and async work live in the surrounding store
//! and orchestrators, never here.

use chrono::Utc;

use super::state::{
    DeviceRecord, FailureKind, PairingSession, PairingState, PairingStatus, ScanSession,
    ScanStatus, Screen,
};

/// Named store actions
///
/// `SelectDeviceType`, `Rescan`, and `OpenModal` each create a fresh scan
/// session (bumping the scan generation); `SelectDevice` and `RetryPairing`
/// create a fresh pairing session. `CloseModal` tears both down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenModal,
    CloseModal,
    SelectDeviceType(String),
    StartScanning,
    SetFoundDevices(Vec<DeviceRecord>),
    SetScanError(String),
    SelectDevice(DeviceRecord),
    UpdatePairingProgress {
        percent: u8,
        step: u8,
        status: PairingStatus,
    },
    SetConnectionSuccess,
    SetConnectionError {
        message: String,
        reason: FailureKind,
    },
    BackToDeviceList,
    Rescan,
    RetryPairing,
    ShowOsPairingGuide {
        instructions: String,
    },
}

impl Action {
    /// Short name for structured logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenModal => "open_modal",
            Self::CloseModal => "close_modal",
            Self::SelectDeviceType(_) => "select_device_type",
            Self::StartScanning => "start_scanning",
            Self::SetFoundDevices(_) => "set_found_devices",
            Self::SetScanError(_) => "set_scan_error",
            Self::SelectDevice(_) => "select_device",
            Self::UpdatePairingProgress { .. } => "update_pairing_progress",
            Self::SetConnectionSuccess => "set_connection_success",
            Self::SetConnectionError { .. } => "set_connection_error",
            Self::BackToDeviceList => "back_to_device_list",
            Self::Rescan => "rescan",
            Self::RetryPairing => "retry_pairing",
            Self::ShowOsPairingGuide { .. } => "show_os_pairing_guide",
        }
    }
}

/// Apply `action` to `state`, returning the next state
#[must_use]
pub fn reduce(state: &PairingState, action: &Action) -> PairingState {
    let mut next = state.clone();

    match action {
        Action::OpenModal => {
            next.modal_open = true;
            next.current_screen = Screen::DeviceTypeSelector;
            next.selected_device_type = None;
            next.selected_device = None;
            next.scan = ScanSession::fresh(None, state.scan.generation);
            next.pairing = None;
            next.pairing_generation = state.pairing_generation + 1;
            next.os_guide = None;
        }
        Action::CloseModal => {
            next.modal_open = false;
            next.current_screen = Screen::DeviceTypeSelector;
            next.selected_device_type = None;
            next.selected_device = None;
            // Bump both generations so in-flight callbacks drop themselves
            next.scan = ScanSession::fresh(None, state.scan.generation);
            next.pairing = None;
            next.pairing_generation = state.pairing_generation + 1;
            next.os_guide = None;
        }
        Action::SelectDeviceType(device_type_id) => {
            next.selected_device_type = Some(device_type_id.clone());
            next.scan = ScanSession::fresh(Some(device_type_id.clone()), state.scan.generation);
            next.current_screen = Screen::Scanning;
        }
        Action::StartScanning => {
            next.scan.status = ScanStatus::Scanning;
            next.scan.started_at = Some(Utc::now());
            next.scan.devices.clear();
            next.scan.error = None;
        }
        Action::SetFoundDevices(devices) => {
            next.scan.status = ScanStatus::Completed;
            next.scan.devices.clone_from(devices);
            next.scan.error = None;
            next.current_screen = if devices.is_empty() {
                Screen::NoDevices
            } else {
                Screen::DeviceList
            };
        }
        Action::SetScanError(message) => {
            next.scan.status = ScanStatus::Failed;
            next.scan.devices.clear();
            next.scan.error = Some(message.clone());
            next.current_screen = Screen::NoDevices;
        }
        Action::SelectDevice(device) => {
            next.selected_device = Some(device.clone());
            next.pairing_generation = state.pairing_generation + 1;
            next.pairing = Some(PairingSession::fresh(
                device.id.clone(),
                device.device_type_id.clone(),
                next.pairing_generation,
            ));
            next.current_screen = Screen::Pairing;
        }
        Action::UpdatePairingProgress {
            percent,
            step,
            status,
        } => {
            if let Some(pairing) = next.pairing.as_mut() {
                pairing.progress_percent = *percent;
                pairing.step_index = *step;
                pairing.status = *status;
            }
        }
        Action::SetConnectionSuccess => {
            if let Some(pairing) = next.pairing.as_mut() {
                pairing.status = PairingStatus::Connected;
                pairing.progress_percent = 100;
                pairing.step_index = 3;
                pairing.error = None;
                pairing.error_reason = None;
            }
            next.current_screen = Screen::Success;
        }
        Action::SetConnectionError { message, reason } => {
            // Progress stays frozen at the last step reached before failure
            if let Some(pairing) = next.pairing.as_mut() {
                pairing.status = PairingStatus::Failed;
                pairing.error = Some(message.clone());
                pairing.error_reason = Some(*reason);
            }
            next.current_screen = Screen::Error;
        }
        Action::BackToDeviceList => {
            next.selected_device = None;
            next.pairing = None;
            next.pairing_generation = state.pairing_generation + 1;
            next.current_screen = Screen::DeviceList;
        }
        Action::Rescan => {
            next.selected_device = None;
            next.pairing = None;
            next.pairing_generation = state.pairing_generation + 1;
            next.scan = ScanSession::fresh(
                state.selected_device_type.clone(),
                state.scan.generation,
            );
            next.current_screen = Screen::Scanning;
        }
        Action::RetryPairing => {
            // No carried-over progress from the prior failed attempt
            if let Some(previous) = state.pairing.as_ref() {
                next.pairing_generation = state.pairing_generation + 1;
                next.pairing = Some(PairingSession::fresh(
                    previous.device_id.clone(),
                    previous.device_type_id.clone(),
                    next.pairing_generation,
                ));
                next.current_screen = Screen::Pairing;
            }
        }
        Action::ShowOsPairingGuide { instructions } => {
            next.os_guide = Some(instructions.clone());
            next.current_screen = Screen::OsPairingGuide;
        }
    }

    next
}
