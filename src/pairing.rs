//! Pairing orchestration
//!
//! Drives a pairing session through the fixed 4-step progress model to a
//! terminal state:
//!
//! | step | progress | status |
//! |------|----------|-------------------|
//! | 0    | 25%      | connecting        |
//! | 1    | 50%      | connecting (the connect/request call) |
//! | 2    | 75%      | waiting_approval  |
//! | 3    | 100%     | connected         |
//!
//! Classes with a real approval handshake show `waiting_approval` while
//! the backend blocks on the user's answer; the others dwell there
//! briefly so the progress animation reads as a sequence. Failure aborts
//! at whatever step it happened — progress freezes, no delay is added.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::PresentationClock;
use crate::registry::{DeviceTypeDescriptor, DeviceTypeRegistry};
use crate::speech::SpeechSink;
use crate::store::{Action, DeviceRecord, FailureKind, PairingStatus, SessionStore};
use crate::transport::{PairOutcome, PairRequest};
use crate::{Error, Result};

/// Executes the 4-step pairing sequence against the session store
pub struct PairingOrchestrator {
    store: SessionStore,
    registry: Arc<DeviceTypeRegistry>,
    speech: Arc<dyn SpeechSink>,
    clock: Arc<dyn PresentationClock>,
    step_dwell: Duration,
}

impl PairingOrchestrator {
    /// Create an orchestrator over the shared store and registry
    #[must_use]
    pub fn new(
        store: SessionStore,
        registry: Arc<DeviceTypeRegistry>,
        speech: Arc<dyn SpeechSink>,
        clock: Arc<dyn PresentationClock>,
        step_dwell: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            speech,
            clock,
            step_dwell,
        }
    }

    /// Run the pairing sequence for the session tagged `generation`
    ///
    /// The session must already exist (created by `SelectDevice` or
    /// `RetryPairing`) at step 0. A superseded generation aborts the
    /// sequence silently at the next commit.
    ///
    /// # Errors
    ///
    /// Returns error only when the device's type is not in the registry;
    /// pairing failures are converted into store state, never propagated.
    pub async fn run(&self, device: &DeviceRecord, generation: u64) -> Result<()> {
        let descriptor = self
            .registry
            .get(&device.device_type_id)
            .ok_or_else(|| Error::UnknownDeviceType(device.device_type_id.clone()))?;
        let transport = self
            .registry
            .transport_for(&device.device_type_id)
            .ok_or_else(|| Error::UnknownDeviceType(device.device_type_id.clone()))?;

        tracing::info!(
            device_id = %device.id,
            device_type = %device.device_type_id,
            generation,
            "pairing started"
        );

        // A backend may report the device as already connected (seen with
        // Bluetooth): jump straight to connected without replaying steps.
        if device.connected {
            tracing::info!(device_id = %device.id, "device already connected, short-circuit");
            if self.store.commit_pairing(generation, Action::SetConnectionSuccess) {
                self.speech
                    .speak(&format!("{} is already connected.", device.name));
            }
            return Ok(());
        }

        self.speech.speak(&format!("Connecting to {}...", device.name));

        // Step 0: connecting
        if !self.advance(generation, 25, 0, PairingStatus::Connecting).await {
            return Ok(());
        }

        // Step 1: the class-specific connect/request call
        if !self.commit_progress(generation, 50, 1, PairingStatus::Connecting) {
            return Ok(());
        }

        let request = PairRequest::for_device(device);
        let outcome = if descriptor.requires_approval {
            // Real handshake: surface waiting_approval while the backend
            // blocks on the user's answer on the target device
            if !self.commit_progress(generation, 75, 2, PairingStatus::WaitingApproval) {
                return Ok(());
            }
            transport.pair(&request).await
        } else {
            transport.pair(&request).await
        };

        match outcome {
            Ok(PairOutcome { success: true, .. }) => {}
            Ok(PairOutcome {
                success: false,
                message,
            }) => {
                tracing::warn!(device_id = %device.id, ?message, "pairing rejected by backend");
                self.fail(generation, descriptor, FailureKind::Rejected, message);
                return Ok(());
            }
            Err(Error::Backend(err)) if err.is_timeout() => {
                tracing::warn!(device_id = %device.id, "pairing timed out");
                self.fail(generation, descriptor, FailureKind::Timeout, None);
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(device_id = %device.id, error = %err, "pairing failed");
                self.fail(generation, descriptor, FailureKind::Execution, Some(err.to_string()));
                return Ok(());
            }
        }

        if !descriptor.requires_approval {
            // Simulated approval dwell for classes without a handshake
            self.clock.sleep(self.step_dwell).await;
            if !self.advance(generation, 75, 2, PairingStatus::WaitingApproval).await {
                return Ok(());
            }
        }

        // Step 3: terminal connected state
        if self.store.commit_pairing(generation, Action::SetConnectionSuccess) {
            tracing::info!(device_id = %device.id, "pairing connected");
            self.speech.speak(&format!("Connected to {}.", device.name));
        }
        Ok(())
    }

    /// Commit a progress step and wait out the success-path dwell
    async fn advance(
        &self,
        generation: u64,
        percent: u8,
        step: u8,
        status: PairingStatus,
    ) -> bool {
        if !self.commit_progress(generation, percent, step, status) {
            return false;
        }
        self.clock.sleep(self.step_dwell).await;
        true
    }

    fn commit_progress(
        &self,
        generation: u64,
        percent: u8,
        step: u8,
        status: PairingStatus,
    ) -> bool {
        self.store.commit_pairing(
            generation,
            Action::UpdatePairingProgress {
                percent,
                step,
                status,
            },
        )
    }

    /// Abort the sequence at the current step; no delay is added
    fn fail(
        &self,
        generation: u64,
        descriptor: &DeviceTypeDescriptor,
        reason: FailureKind,
        detail: Option<String>,
    ) {
        let spoken = descriptor.failure_message(reason);
        self.speech.speak(spoken);

        let message = detail.unwrap_or_else(|| spoken.to_string());
        if !self.store.commit_pairing(
            generation,
            Action::SetConnectionError { message, reason },
        ) {
            tracing::debug!(generation, "pairing failure dropped, session superseded");
        }
    }
}
