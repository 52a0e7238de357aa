//! Pairing controller
//!
//! The facade the host embeds: owns the store, both orchestrators, and
//! the voice interpreter. Click input and voice input drive the same
//! state machine through the same methods — a voice command resolves to
//! a store action and is routed exactly like the corresponding click.

use std::sync::Arc;

use crate::clock::PresentationClock;
use crate::config::PairingConfig;
use crate::guide::GuideSource;
use crate::pairing::PairingOrchestrator;
use crate::registry::DeviceTypeRegistry;
use crate::scan::ScanOrchestrator;
use crate::speech::SpeechSink;
use crate::store::{Action, DeviceRecord, SessionStore};
use crate::voice::VoiceCommandInterpreter;
use crate::{Error, Result};

/// Facade over the pairing state machine
pub struct PairingController {
    store: SessionStore,
    registry: Arc<DeviceTypeRegistry>,
    scanner: Arc<ScanOrchestrator>,
    pairer: Arc<PairingOrchestrator>,
    interpreter: VoiceCommandInterpreter,
}

impl PairingController {
    /// Wire a controller from its collaborators
    #[must_use]
    pub fn new(
        config: &PairingConfig,
        registry: Arc<DeviceTypeRegistry>,
        speech: Arc<dyn SpeechSink>,
        clock: Arc<dyn PresentationClock>,
    ) -> Self {
        let store = SessionStore::with_auto_close(config.timing.success_auto_close);
        let scanner = Arc::new(ScanOrchestrator::new(
            store.clone(),
            Arc::clone(&registry),
            Arc::clone(&speech),
            Arc::clone(&clock),
        ));
        let pairer = Arc::new(PairingOrchestrator::new(
            store.clone(),
            Arc::clone(&registry),
            speech,
            clock,
            config.timing.step_dwell,
        ));
        let interpreter = VoiceCommandInterpreter::new(Arc::clone(&registry));

        Self {
            store,
            registry,
            scanner,
            pairer,
            interpreter,
        }
    }

    /// The shared session store (renderer reads state snapshots from it)
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Open the pairing modal on the device type selector
    pub fn open_modal(&self) {
        self.store.dispatch(Action::OpenModal);
    }

    /// Close the modal, tearing down both sessions and all timers
    pub fn close_modal(&self) {
        self.store.dispatch(Action::CloseModal);
    }

    /// Select a device class and start scanning for it
    ///
    /// The screen flips to `scanning` synchronously; discovery runs on a
    /// spawned task against the fresh scan session.
    ///
    /// # Errors
    ///
    /// Returns error if the device type is not in the registry.
    pub fn select_device_type(&self, device_type_id: &str) -> Result<()> {
        if self.registry.get(device_type_id).is_none() {
            return Err(Error::UnknownDeviceType(device_type_id.to_string()));
        }

        self.store
            .dispatch(Action::SelectDeviceType(device_type_id.to_string()));
        self.spawn_scan(device_type_id.to_string());
        Ok(())
    }

    /// Select a discovered device and start pairing with it
    pub fn select_device(&self, device: DeviceRecord) {
        self.store.dispatch(Action::SelectDevice(device.clone()));
        self.spawn_pairing(device);
    }

    /// Re-run discovery for the currently selected device type
    ///
    /// A rescan with no selected type is a logged no-op.
    pub fn rescan(&self) {
        let Some(device_type_id) = self.store.state().selected_device_type else {
            tracing::warn!("rescan requested with no selected device type");
            return;
        };

        self.store.dispatch(Action::Rescan);
        self.spawn_scan(device_type_id);
    }

    /// Re-run the pairing sequence for the selected device from step 0
    pub fn retry_pairing(&self) {
        let Some(device) = self.store.state().selected_device else {
            tracing::warn!("retry requested with no selected device");
            return;
        };

        self.store.dispatch(Action::RetryPairing);
        self.spawn_pairing(device);
    }

    /// Return from a failed pairing to the completed device list
    pub fn back_to_device_list(&self) {
        self.store.dispatch(Action::BackToDeviceList);
    }

    /// Show OS-level pairing instructions for the selected device
    ///
    /// Called by the host after app-level pairing succeeded but OS audio
    /// routing still needs a manual step. No-op when nothing is selected
    /// or the guide has no instructions for the platform.
    pub fn show_os_pairing_guide(&self, guide: &dyn GuideSource) {
        let Some(device) = self.store.state().selected_device else {
            tracing::warn!("pairing guide requested with no selected device");
            return;
        };

        if let Some(instructions) = guide.instructions(&device) {
            self.store
                .dispatch(Action::ShowOsPairingGuide { instructions });
        }
    }

    /// Feed one utterance into the state machine
    ///
    /// Returns the action the transcript resolved to, or `None` when it
    /// matched nothing (the voice loop keeps listening either way).
    pub fn handle_voice(&self, transcript: &str) -> Option<Action> {
        let context = self.store.voice_context();
        let action = self.interpreter.interpret(transcript, &context)?;
        tracing::info!(action = action.name(), transcript, "voice command matched");

        match &action {
            Action::CloseModal => self.close_modal(),
            Action::SelectDeviceType(id) => {
                if let Err(err) = self.select_device_type(id) {
                    tracing::warn!(error = %err, "voice-selected device type vanished");
                }
            }
            Action::SelectDevice(device) => self.select_device(device.clone()),
            Action::Rescan => self.rescan(),
            Action::BackToDeviceList => self.back_to_device_list(),
            other => self.store.dispatch(other.clone()),
        }

        Some(action)
    }

    fn spawn_scan(&self, device_type_id: String) {
        let generation = self.store.scan_generation();
        let scanner = Arc::clone(&self.scanner);
        tokio::spawn(async move {
            if let Err(err) = scanner.run(&device_type_id, generation).await {
                tracing::error!(
                    error = %err,
                    device_type = %device_type_id,
                    "scan orchestration error"
                );
            }
        });
    }

    fn spawn_pairing(&self, device: DeviceRecord) {
        let Some(generation) = self.store.pairing_generation() else {
            return;
        };
        let pairer = Arc::clone(&self.pairer);
        tokio::spawn(async move {
            if let Err(err) = pairer.run(&device, generation).await {
                tracing::error!(
                    error = %err,
                    device_id = %device.id,
                    "pairing orchestration error"
                );
            }
        });
    }
}
