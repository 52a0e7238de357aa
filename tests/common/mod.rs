//! Shared test utilities

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use aura_pairing::{
    DeviceRecord, DeviceTransport, DeviceTypeDescriptor, DeviceTypeRegistry, Error, InstantClock,
    PairOutcome, PairRequest, PairingConfig, PairingController, Result, Screen, SessionStore,
    SpeechSink, TimingConfig,
};

/// Scripted pair call outcome
#[derive(Debug, Clone)]
pub enum PairScript {
    Accept,
    Reject(String),
    Fail(String),
}

struct ScanStep {
    delay: Duration,
    outcome: std::result::Result<Vec<DeviceRecord>, String>,
}

struct PairStep {
    delay: Duration,
    script: PairScript,
}

/// Scripted transport: queued steps are consumed per call; an empty
/// queue scans to an empty list and pairs successfully
pub struct MockTransport {
    scan_steps: Mutex<VecDeque<ScanStep>>,
    pair_steps: Mutex<VecDeque<PairStep>>,
    scan_calls: AtomicUsize,
    pair_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scan_steps: Mutex::new(VecDeque::new()),
            pair_steps: Mutex::new(VecDeque::new()),
            scan_calls: AtomicUsize::new(0),
            pair_calls: AtomicUsize::new(0),
        })
    }

    pub fn push_scan_devices(&self, delay: Duration, devices: Vec<DeviceRecord>) {
        self.scan_steps.lock().unwrap().push_back(ScanStep {
            delay,
            outcome: Ok(devices),
        });
    }

    pub fn push_scan_error(&self, delay: Duration, message: &str) {
        self.scan_steps.lock().unwrap().push_back(ScanStep {
            delay,
            outcome: Err(message.to_string()),
        });
    }

    pub fn push_pair(&self, delay: Duration, script: PairScript) {
        self.pair_steps
            .lock()
            .unwrap()
            .push_back(PairStep { delay, script });
    }

    pub fn scan_call_count(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn pair_call_count(&self) -> usize {
        self.pair_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn scan(&self, _descriptor: &DeviceTypeDescriptor) -> Result<Vec<DeviceRecord>> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.scan_steps.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                tokio::time::sleep(step.delay).await;
                step.outcome.map_err(Error::Scan)
            }
            None => Ok(vec![]),
        }
    }

    async fn pair(&self, _request: &PairRequest) -> Result<PairOutcome> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.pair_steps.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                tokio::time::sleep(step.delay).await;
                match step.script {
                    PairScript::Accept => Ok(PairOutcome {
                        success: true,
                        message: None,
                    }),
                    PairScript::Reject(message) => Ok(PairOutcome {
                        success: false,
                        message: Some(message),
                    }),
                    PairScript::Fail(message) => Err(Error::Pairing(message)),
                }
            }
            None => Ok(PairOutcome {
                success: true,
                message: None,
            }),
        }
    }
}

/// Speech sink that records every utterance
pub struct RecordingSpeech {
    utterances: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            utterances: Mutex::new(Vec::new()),
        })
    }

    pub fn spoken(&self) -> Vec<String> {
        self.utterances.lock().unwrap().clone()
    }
}

impl SpeechSink for RecordingSpeech {
    fn speak(&self, text: &str) {
        self.utterances.lock().unwrap().push(text.to_string());
    }
}

/// Test configuration: zero step dwell, fast auto-close
pub fn test_config() -> PairingConfig {
    PairingConfig {
        timing: TimingConfig {
            step_dwell: Duration::ZERO,
            success_auto_close: Duration::from_millis(60),
        },
        ..PairingConfig::default()
    }
}

/// Opt-in test logging: `RUST_LOG=aura_pairing=debug cargo test`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Controller over the builtin catalogue, zero-delay clock, recorded speech
pub fn test_controller(
    transport: Arc<MockTransport>,
) -> (PairingController, Arc<RecordingSpeech>) {
    init_tracing();
    let registry = Arc::new(DeviceTypeRegistry::with_builtin(transport));
    let speech = RecordingSpeech::new();
    let controller = PairingController::new(
        &test_config(),
        registry,
        Arc::clone(&speech) as Arc<dyn SpeechSink>,
        Arc::new(InstantClock),
    );
    (controller, speech)
}

/// A bluetooth device record for tests
pub fn bt_device(id: &str, name: &str) -> DeviceRecord {
    DeviceRecord::new(id, name, "bluetooth")
}

/// Poll until the store reaches `screen`, panicking after 2 seconds
pub async fn wait_for_screen(store: &SessionStore, screen: Screen) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if store.screen() == screen {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {screen:?}, stuck on {:?}",
            store.screen()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Give spawned orchestrator tasks a chance to settle
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
