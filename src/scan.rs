//! Scan orchestration
//!
//! Runs one discovery attempt per scan session: dispatches to the device
//! class's transport within its time budget, announces the outcome, and
//! commits the result after the class's cosmetic presentation delay.
//! Every commit is generation-guarded, so a stale scan resolving after
//! close or rescan is a logged no-op.

use std::sync::Arc;

use crate::clock::PresentationClock;
use crate::registry::DeviceTypeRegistry;
use crate::speech::SpeechSink;
use crate::store::{Action, DeviceRecord, FailureKind, SessionStore};
use crate::{Error, Result};

/// Executes device-class-specific discovery against the session store
pub struct ScanOrchestrator {
    store: SessionStore,
    registry: Arc<DeviceTypeRegistry>,
    speech: Arc<dyn SpeechSink>,
    clock: Arc<dyn PresentationClock>,
}

impl ScanOrchestrator {
    /// Create an orchestrator over the shared store and registry
    #[must_use]
    pub fn new(
        store: SessionStore,
        registry: Arc<DeviceTypeRegistry>,
        speech: Arc<dyn SpeechSink>,
        clock: Arc<dyn PresentationClock>,
    ) -> Self {
        Self {
            store,
            registry,
            speech,
            clock,
        }
    }

    /// Run one discovery attempt for the scan session tagged `generation`
    ///
    /// The session must already exist (created by `SelectDeviceType` or
    /// `Rescan`). Resolution always lands the user on `device-list` or
    /// `no-devices` unless the session was superseded in flight.
    ///
    /// # Errors
    ///
    /// Returns error only when `device_type_id` is not in the registry;
    /// scan failures are converted into store state, never propagated.
    pub async fn run(&self, device_type_id: &str, generation: u64) -> Result<()> {
        let descriptor = self
            .registry
            .get(device_type_id)
            .ok_or_else(|| Error::UnknownDeviceType(device_type_id.to_string()))?;
        let transport = self
            .registry
            .transport_for(device_type_id)
            .ok_or_else(|| Error::UnknownDeviceType(device_type_id.to_string()))?;

        if !self.store.commit_scan(generation, Action::StartScanning) {
            return Ok(());
        }
        tracing::info!(device_type = device_type_id, generation, "scan started");

        let outcome =
            tokio::time::timeout(descriptor.scan_timeout, transport.scan(descriptor)).await;

        let (announcement, action) = match outcome {
            Ok(Ok(devices)) if devices.is_empty() => {
                tracing::info!(device_type = device_type_id, "scan found no devices");
                (
                    descriptor.failure_message(FailureKind::NoDevices).to_string(),
                    Action::SetFoundDevices(vec![]),
                )
            }
            Ok(Ok(devices)) => {
                tracing::info!(
                    device_type = device_type_id,
                    count = devices.len(),
                    "scan completed"
                );
                (found_announcement(&devices), Action::SetFoundDevices(devices))
            }
            Ok(Err(err)) => {
                tracing::warn!(device_type = device_type_id, error = %err, "scan failed");
                (
                    descriptor.failure_message(FailureKind::ScanFailed).to_string(),
                    Action::SetScanError(err.to_string()),
                )
            }
            Err(_elapsed) => {
                tracing::warn!(
                    device_type = device_type_id,
                    budget = ?descriptor.scan_timeout,
                    "scan timed out"
                );
                (
                    descriptor.failure_message(FailureKind::ScanFailed).to_string(),
                    Action::SetScanError("scan timed out".to_string()),
                )
            }
        };

        self.speech.speak(&announcement);

        // Cosmetic only: lets the scanning animation finish. The network
        // call above has already resolved.
        self.clock.sleep(descriptor.presentation_delay).await;

        if !self.store.commit_scan(generation, action) {
            tracing::debug!(
                device_type = device_type_id,
                generation,
                "scan result dropped, session superseded"
            );
        }
        Ok(())
    }
}

/// Spoken summary of a non-empty scan result
fn found_announcement(devices: &[DeviceRecord]) -> String {
    let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
    let listed = match names.as_slice() {
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
        [] => String::new(),
    };

    if devices.len() == 1 {
        format!("Found 1 device: {listed}.")
    } else {
        format!("Found {} devices: {listed}.", devices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> DeviceRecord {
        DeviceRecord::new("id", name, "bluetooth")
    }

    #[test]
    fn announcement_for_one_device() {
        let text = found_announcement(&[device("Sony WH-1000XM4")]);
        assert_eq!(text, "Found 1 device: Sony WH-1000XM4.");
    }

    #[test]
    fn announcement_for_two_devices() {
        let text = found_announcement(&[device("Sony WH-1000XM4"), device("JBL Flip")]);
        assert_eq!(text, "Found 2 devices: Sony WH-1000XM4 and JBL Flip.");
    }

    #[test]
    fn announcement_lists_three_names() {
        let text = found_announcement(&[device("A"), device("B"), device("C")]);
        assert_eq!(text, "Found 3 devices: A, B and C.");
    }
}
