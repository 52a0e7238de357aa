//! Voice command interpretation
//!
//! Maps a transcript plus the current screen onto zero or one store
//! action. The grammar is a declarative table of `(pattern, action)`
//! pairs evaluated in registration order, not a chain of code branches,
//! so it can be tested exhaustively and localized later.
//!
//! Unmatched input is always `None` — the voice loop keeps listening and
//! a no-match is never an error. Cancellation phrases are evaluated
//! before any screen-specific rule, on every screen.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::registry::DeviceTypeRegistry;
use crate::store::{Action, Screen, VoiceCommandContext};

/// One entry of the phrase grammar
struct PhraseRule {
    pattern: Regex,
    action: fn() -> Action,
}

fn rule(pattern: &str, action: fn() -> Action) -> PhraseRule {
    PhraseRule {
        pattern: Regex::new(pattern).expect("valid phrase pattern"),
        action,
    }
}

/// Cancellation phrases, honored on every screen before anything else
static CANCEL_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)\bcancel\b", || Action::CloseModal),
        rule(r"(?i)\bclose\b", || Action::CloseModal),
        rule(r"(?i)\bstop\b", || Action::CloseModal),
        rule(r"(?i)\bnever\s?mind\b", || Action::CloseModal),
        rule(r"(?i)\bgo back\b", || Action::CloseModal),
    ]
});

/// Device-list screen phrases
static DEVICE_LIST_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)\bscan again\b", || Action::Rescan),
        rule(r"(?i)\brefresh\b", || Action::Rescan),
        rule(r"(?i)\brescan\b", || Action::Rescan),
    ]
});

/// Error and no-devices screen phrases
static RECOVERY_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)\btry again\b", || Action::Rescan),
        rule(r"(?i)\bretry\b", || Action::Rescan),
        rule(r"(?i)\brepeat\b", || Action::Rescan),
        rule(r"(?i)\bback\b", || Action::BackToDeviceList),
        rule(r"(?i)\blist\b", || Action::BackToDeviceList),
        rule(r"(?i)\bshow devices\b", || Action::BackToDeviceList),
    ]
});

/// Spoken index digit, e.g. "connect to device 2"
static INDEX_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").expect("valid index pattern"));

/// Ordinal vocabulary for list selection, index = position
const ORDINAL_WORDS: [&str; 5] = ["first", "second", "third", "fourth", "fifth"];

fn first_match(rules: &[PhraseRule], text: &str) -> Option<Action> {
    rules
        .iter()
        .find(|r| r.pattern.is_match(text))
        .map(|r| (r.action)())
}

/// 1-based index spoken as a digit or ordinal word, returned 0-based
fn spoken_index(text: &str) -> Option<usize> {
    if let Some(captures) = INDEX_DIGIT.captures(text) {
        let n: usize = captures.get(1)?.as_str().parse().ok()?;
        return n.checked_sub(1);
    }

    let lower = text.to_lowercase();
    ORDINAL_WORDS.iter().position(|w| lower.contains(w))
}

/// Maps transcripts onto store actions given the current screen
pub struct VoiceCommandInterpreter {
    registry: Arc<DeviceTypeRegistry>,
}

impl VoiceCommandInterpreter {
    /// Create an interpreter over the device type registry
    #[must_use]
    pub fn new(registry: Arc<DeviceTypeRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a transcript to at most one store action
    #[must_use]
    pub fn interpret(&self, transcript: &str, context: &VoiceCommandContext) -> Option<Action> {
        let text = transcript.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(action) = first_match(&CANCEL_RULES, text) {
            return Some(action);
        }

        match context.current_screen {
            Screen::DeviceTypeSelector => self.interpret_type_selection(text),
            Screen::DeviceList => Self::interpret_device_selection(text, context),
            Screen::Error | Screen::NoDevices => first_match(&RECOVERY_RULES, text),
            _ => None,
        }
    }

    fn interpret_type_selection(&self, text: &str) -> Option<Action> {
        if let Some(index) = spoken_index(text) {
            if let Some(descriptor) = self.registry.all().get(index) {
                return Some(Action::SelectDeviceType(descriptor.id.clone()));
            }
        }

        self.registry
            .detect_from_voice(text)
            .map(|id| Action::SelectDeviceType(id.to_string()))
    }

    fn interpret_device_selection(text: &str, context: &VoiceCommandContext) -> Option<Action> {
        if let Some(action) = first_match(&DEVICE_LIST_RULES, text) {
            return Some(action);
        }

        if let Some(index) = spoken_index(text) {
            if let Some(device) = context.found_devices.get(index) {
                return Some(Action::SelectDevice(device.clone()));
            }
        }

        // Substring match against found device names, first match in list
        // order. Known ambiguity: "AirPods" also matches "AirPods Pro"
        // when it appears earlier in the list.
        let lower = text.to_lowercase();
        context
            .found_devices
            .iter()
            .find(|d| lower.contains(&d.name.to_lowercase()))
            .map(|d| Action::SelectDevice(d.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DeviceRecord;
    use crate::transport::{PairOutcome, PairRequest};
    use crate::transport::DeviceTransport;
    use crate::registry::DeviceTypeDescriptor;
    use crate::Result;
    use async_trait::async_trait;

    struct StubTransport;

    #[async_trait]
    impl DeviceTransport for StubTransport {
        async fn scan(&self, _descriptor: &DeviceTypeDescriptor) -> Result<Vec<DeviceRecord>> {
            Ok(vec![])
        }

        async fn pair(&self, _request: &PairRequest) -> Result<PairOutcome> {
            Ok(PairOutcome {
                success: true,
                message: None,
            })
        }
    }

    fn interpreter() -> VoiceCommandInterpreter {
        VoiceCommandInterpreter::new(Arc::new(DeviceTypeRegistry::with_builtin(Arc::new(
            StubTransport,
        ))))
    }

    fn context(screen: Screen, devices: Vec<DeviceRecord>) -> VoiceCommandContext {
        VoiceCommandContext {
            current_screen: screen,
            selected_device_type: None,
            found_devices: devices,
        }
    }

    fn device(id: &str, name: &str) -> DeviceRecord {
        DeviceRecord::new(id, name, "bluetooth")
    }

    #[test]
    fn cancel_wins_on_every_screen() {
        let interp = interpreter();
        for screen in [
            Screen::DeviceTypeSelector,
            Screen::Scanning,
            Screen::DeviceList,
            Screen::Pairing,
            Screen::Success,
            Screen::Error,
            Screen::NoDevices,
            Screen::OsPairingGuide,
        ] {
            let ctx = context(screen, vec![]);
            assert_eq!(
                interp.interpret("cancel", &ctx),
                Some(Action::CloseModal),
                "screen {screen:?}"
            );
        }
    }

    #[test]
    fn nevermind_both_spellings_cancel() {
        let interp = interpreter();
        let ctx = context(Screen::DeviceList, vec![]);
        assert_eq!(interp.interpret("nevermind", &ctx), Some(Action::CloseModal));
        assert_eq!(interp.interpret("never mind", &ctx), Some(Action::CloseModal));
    }

    #[test]
    fn headphone_selects_bluetooth() {
        let interp = interpreter();
        let ctx = context(Screen::DeviceTypeSelector, vec![]);
        assert_eq!(
            interp.interpret("connect to my headphone", &ctx),
            Some(Action::SelectDeviceType("bluetooth".to_string()))
        );
    }

    #[test]
    fn numeric_selection_on_type_selector() {
        let interp = interpreter();
        let ctx = context(Screen::DeviceTypeSelector, vec![]);
        // Registry order: bluetooth, android-tv, chromecast, ...
        assert_eq!(
            interp.interpret("device 2", &ctx),
            Some(Action::SelectDeviceType("android-tv".to_string()))
        );
    }

    #[test]
    fn out_of_range_number_falls_back_to_patterns() {
        let interp = interpreter();
        let ctx = context(Screen::DeviceTypeSelector, vec![]);
        assert_eq!(interp.interpret("device 99", &ctx), None);
    }

    #[test]
    fn numeric_and_ordinal_device_selection() {
        let interp = interpreter();
        let devices = vec![device("1", "Sony WH-1000XM4"), device("2", "JBL Flip")];
        let ctx = context(Screen::DeviceList, devices.clone());

        assert_eq!(
            interp.interpret("connect to device 1", &ctx),
            Some(Action::SelectDevice(devices[0].clone()))
        );
        assert_eq!(
            interp.interpret("the second one", &ctx),
            Some(Action::SelectDevice(devices[1].clone()))
        );
    }

    #[test]
    fn device_selection_by_name_substring() {
        let interp = interpreter();
        let devices = vec![device("1", "AirPods"), device("2", "AirPods Pro")];
        let ctx = context(Screen::DeviceList, devices.clone());

        // First match in list order wins; "AirPods Pro" is shadowed
        assert_eq!(
            interp.interpret("connect to airpods pro", &ctx),
            Some(Action::SelectDevice(devices[0].clone()))
        );
    }

    #[test]
    fn rescan_phrases_on_device_list() {
        let interp = interpreter();
        let ctx = context(Screen::DeviceList, vec![device("1", "JBL Flip")]);
        for phrase in ["scan again", "refresh", "rescan please"] {
            assert_eq!(interp.interpret(phrase, &ctx), Some(Action::Rescan), "{phrase}");
        }
    }

    #[test]
    fn recovery_phrases_on_error_screens() {
        let interp = interpreter();
        for screen in [Screen::Error, Screen::NoDevices] {
            let ctx = context(screen, vec![]);
            assert_eq!(interp.interpret("try again", &ctx), Some(Action::Rescan));
            assert_eq!(interp.interpret("retry", &ctx), Some(Action::Rescan));
            assert_eq!(
                interp.interpret("show devices", &ctx),
                Some(Action::BackToDeviceList)
            );
            assert_eq!(
                interp.interpret("back", &ctx),
                Some(Action::BackToDeviceList)
            );
        }
    }

    #[test]
    fn go_back_is_cancellation_even_on_error_screen() {
        let interp = interpreter();
        let ctx = context(Screen::Error, vec![]);
        assert_eq!(interp.interpret("go back", &ctx), Some(Action::CloseModal));
    }

    #[test]
    fn unmatched_input_is_a_no_op() {
        let interp = interpreter();
        assert_eq!(
            interp.interpret("what's the weather", &context(Screen::DeviceTypeSelector, vec![])),
            None
        );
        assert_eq!(interp.interpret("", &context(Screen::DeviceList, vec![])), None);
        assert_eq!(
            interp.interpret("anything at all", &context(Screen::Scanning, vec![])),
            None
        );
    }
}
