//! Lifecycle and input events delivered to keyboard listeners.

use crate::candidate_box::CandidatePage;
use crate::input_store::InputMap;

/// Something that happened on one keyboard instance.
///
/// Events borrow from the keyboard; listeners copy what they want to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent<'a> {
    /// Construction finished and the instance is registered.
    Init,
    /// A button is about to be applied to the active input.
    BeforeInputUpdate { button: &'a str },
    /// A button was activated, whether or not it changed anything.
    KeyPress { button: &'a str },
    /// The pressed button was released.
    KeyReleased { button: &'a str },
    /// The active input changed. `input` is the visible (decorated) value.
    Change { input_name: &'a str, input: &'a str },
    /// Same change, with every buffer.
    ChangeAll { inputs: &'a InputMap },
    /// The candidate box opened, moved to another page, or closed (`None`).
    CandidatesChanged { page: Option<&'a CandidatePage> },
    /// `load_modules` finished.
    ModulesLoaded { names: &'a [String] },
}

/// Callback registered with `Keyboard::subscribe`.
pub type Listener = Box<dyn FnMut(&KeyboardEvent<'_>)>;

/// Outcome of a single button activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationResult {
    /// `{//}` placeholder: nothing happened and nothing was reported.
    Ignored,
    /// Reported to listeners, but the text did not change.
    Pressed,
    /// The edit failed `inputPattern` or `maxLength` and was dropped.
    Rejected,
    /// The active input changed.
    Changed,
}

impl ActivationResult {
    pub fn changed(&self) -> bool {
        matches!(self, ActivationResult::Changed)
    }
}

pub(crate) fn emit(listeners: &mut [Listener], event: KeyboardEvent<'_>) {
    for listener in listeners.iter_mut() {
        listener(&event);
    }
}
