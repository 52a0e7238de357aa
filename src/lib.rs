//! Aura Pairing - Device discovery and pairing core for the Aura voice assistant
//!
//! This library provides the state machine behind Aura's device modal:
//! - Scan orchestration per device class (Bluetooth audio, Android TV,
//!   Chromecast, mobile, smart home)
//! - A 4-step pairing sequence to a terminal connected/failed state
//! - Voice command interpretation against the current screen
//! - Generation-counted cancellation so stale async results never
//!   overwrite newer sessions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      Host                            │
//! │   Renderer  │  Speech-to-text loop  │  TTS sink     │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                PairingController                     │
//! │   SessionStore  │  Scan/Pairing orchestrators       │
//! │   VoiceCommandInterpreter  │  DeviceTypeRegistry    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              Device backend (HTTP)                   │
//! │   /api/device/scan/{type}  │  /api/device/pair      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The store's `current_screen` field is the sole signal consumed by the
//! renderer and read back by the interpreter to decide what a new
//! utterance means.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod guide;
pub mod pairing;
pub mod registry;
pub mod scan;
pub mod speech;
pub mod store;
pub mod transport;
pub mod voice;

pub use clock::{InstantClock, PresentationClock, TokioClock};
pub use config::{BackendConfig, PairingConfig, TimingConfig};
pub use controller::PairingController;
pub use error::{Error, Result};
pub use guide::{GuideSource, StaticGuide};
pub use pairing::PairingOrchestrator;
pub use registry::{DeviceTypeDescriptor, DeviceTypeRegistry, PairingMethod, ScanMethod};
pub use scan::ScanOrchestrator;
pub use speech::{ChannelSpeech, NullSpeech, SpeechSink};
pub use store::{
    Action, DeviceRecord, FailureKind, PairingSession, PairingState, PairingStatus, ScanSession,
    ScanStatus, Screen, SessionStore, VoiceCommandContext,
};
pub use transport::{DeviceTransport, HttpBackend, PairOutcome, PairRequest};
pub use voice::VoiceCommandInterpreter;
