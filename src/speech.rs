//! Voice feedback sink
//!
//! Orchestrators announce scan results and pairing outcomes through
//! [`SpeechSink`]. Speaking is fire-and-forget: failures are logged by the
//! implementation and never propagate into orchestration control flow.

use tokio::sync::mpsc;

/// Fire-and-forget text-to-speech sink
pub trait SpeechSink: Send + Sync {
    /// Queue an utterance for synthesis
    fn speak(&self, text: &str);
}

/// Sink that discards all utterances
pub struct NullSpeech;

impl SpeechSink for NullSpeech {
    fn speak(&self, _text: &str) {}
}

/// Sink that forwards utterances to the host over a channel
///
/// The host end drives the actual synthesis (browser TTS or a cloud
/// voice). A closed receiver is logged and otherwise ignored.
pub struct ChannelSpeech {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSpeech {
    /// Create a sink and the receiving end for the host
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SpeechSink for ChannelSpeech {
    fn speak(&self, text: &str) {
        tracing::debug!(text, "speaking");
        if self.tx.send(text.to_string()).is_err() {
            tracing::warn!("speech receiver dropped, utterance discarded");
        }
    }
}
