//! Keyboard instances.
//!
//! A [`Keyboard`] owns the handle a host talks to; its mutable state lives
//! in a shared [`KeyboardState`] that is also reachable from the instance
//! registry, so other keyboards can push synchronized input into it and
//! release events can reach every instance.
//!
//! Activation pipeline for one button:
//!
//! 1. `{//}` is ignored outright.
//! 2. `BeforeInputUpdate` and `KeyPress` are reported.
//! 3. The button is applied to the active input at the caret.
//! 4. A changed value must match `inputPattern` and respect `maxLength`,
//!    otherwise it is dropped.
//! 5. The value is stored, the caret collapsed, other instances synced.
//! 6. `Change` / `ChangeAll` are reported and candidates re-evaluated.

use crate::candidate::CandidateDictionary;
use crate::candidate_box::{CandidateBox, CandidatePage};
use crate::caret::{get_rtl_offset, CaretModel};
use crate::config::{CompiledPatterns, KeyboardOptions};
use crate::error::Result;
use crate::event::{emit, ActivationResult, KeyboardEvent, Listener};
use crate::hold::HoldTimer;
use crate::input_store::{InputMap, InputStore};
use crate::layout::display_label;
use crate::module::{ModuleSet, ModuleSpec};
use crate::mount::{InstanceId, MountTarget};
use crate::physical::{PhysicalKeyEvent, PhysicalKeyMapper};
use crate::registry::{Registry, Shared};
use crate::sync::{broadcast, SyncSnapshot, Synchronized};
use crate::text_edit::{self, button_type, ButtonType, EditRules};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Registry of every live keyboard in a host.
pub type InstanceRegistry = Registry<KeyboardState>;

/// Caret report from the host's text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaretEvent {
    /// Selection in the field. Offsets are UTF-16 units into `value`, the
    /// field's visible (possibly RTL-decorated) text.
    Selection {
        start: usize,
        end: usize,
        value: String,
    },
    /// Focus moved to something that is neither the field nor a keyboard.
    FocusLost,
}

/// Per-instance state shared through the registry.
pub struct KeyboardState {
    id: InstanceId,
    options: KeyboardOptions,
    inputs: InputStore,
    caret: CaretModel,
    dictionary: CandidateDictionary,
    candidate_box: CandidateBox,
    mapper: PhysicalKeyMapper,
    hold: HoldTimer,
    patterns: CompiledPatterns,
    edit_rules: EditRules,
    modules: ModuleSet,
    modules_loaded: bool,
    /// Button currently held down
    pressed: Option<String>,
    max_length_reached: bool,
}

impl KeyboardState {
    pub fn new(id: InstanceId, options: KeyboardOptions) -> Result<Self> {
        let patterns = options.compile_patterns()?;
        let dictionary = CandidateDictionary::from_entries(
            options
                .layout_candidates
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        let mut inputs = InputStore::new(options.rtl);
        inputs.ensure(&options.input_name);

        Ok(Self {
            id,
            inputs,
            caret: CaretModel::new(),
            dictionary,
            candidate_box: CandidateBox::with_page_size(options.layout_candidates_page_size),
            mapper: PhysicalKeyMapper::from_layout(&options.layout),
            hold: HoldTimer::new(),
            patterns,
            edit_rules: options.edit_rules(),
            modules: ModuleSet::new(),
            modules_loaded: false,
            pressed: None,
            max_length_reached: false,
            options,
        })
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn options(&self) -> &KeyboardOptions {
        &self.options
    }

    pub fn input_name(&self) -> &str {
        &self.options.input_name
    }

    fn resolve_name<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        name.unwrap_or(&self.options.input_name)
    }

    // ========== Input Buffers ==========

    /// Visible value of `name` (the active input when `None`).
    pub fn get_input(&self, name: Option<&str>) -> String {
        self.inputs.get_input(self.resolve_name(name))
    }

    /// Undecorated value of `name`.
    pub fn raw_input(&self, name: Option<&str>) -> &str {
        self.inputs.raw(self.resolve_name(name))
    }

    /// Store a value without syncing or reporting it.
    pub fn set_input(&mut self, text: &str, name: Option<&str>) {
        let name = self.resolve_name(name).to_string();
        self.inputs.set_input(text, &name);
    }

    pub fn get_all_inputs(&self) -> InputMap {
        self.inputs.get_all_inputs()
    }

    pub fn max_length_reached(&self) -> bool {
        self.max_length_reached
    }

    // ========== Caret ==========

    pub fn caret(&self) -> &CaretModel {
        &self.caret
    }

    pub fn set_caret_position(&mut self, pos: usize, end: Option<usize>) {
        self.caret.set_caret_position(pos, end);
        tracing::debug!(instance = %self.id, caret = ?self.caret.range(), "caret moved");
    }

    pub fn clear_caret(&mut self) {
        self.caret.clear();
    }

    // ========== Candidates ==========

    /// Add or replace a candidate trigger. Malformed entries are skipped.
    pub fn add_suggestion_trigger(&mut self, trigger: &str, suggestions: &str) -> bool {
        let added = self.dictionary.insert(trigger, suggestions);
        if added {
            self.options.add_candidate(trigger, suggestions);
        }
        added
    }

    pub fn dictionary(&self) -> &CandidateDictionary {
        &self.dictionary
    }

    pub fn candidate_page(&self) -> Option<CandidatePage> {
        self.candidate_box.snapshot()
    }

    // ========== Layout ==========

    /// Buttons of the visible layout.
    pub fn buttons(&self) -> Vec<Vec<String>> {
        self.options.visible_buttons()
    }

    pub fn display_label(&self, token: &str) -> String {
        display_label(token, self.options.display.as_ref(), self.options.merge_display)
    }

    pub fn physical_keys(&self) -> &PhysicalKeyMapper {
        &self.mapper
    }

    // ========== Modules ==========

    pub fn register_module_prop<M, P, V>(&mut self, module: M, prop: P, value: V)
    where
        M: Into<String>,
        P: Into<String>,
        V: Into<String>,
    {
        self.modules.register_prop(module, prop, value);
    }

    pub fn module_prop(&self, module: &str, prop: &str) -> Option<&str> {
        self.modules.prop(module, prop)
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.names()
    }

    pub fn modules_loaded(&self) -> bool {
        self.modules_loaded
    }

    // ========== Internals ==========

    /// Apply `button` to the active input, gating the result.
    fn apply_button(&mut self, button: &str) -> ActivationResult {
        let name = self.options.input_name.clone();
        let current = self.inputs.raw(&name);
        let caret = self.caret.range().map(|r| r.as_tuple());
        let edit = text_edit::apply(button, current, caret, &self.edit_rules);

        if !edit.changed {
            return ActivationResult::Pressed;
        }
        if !self.patterns.allows(&name, &edit.text) {
            return ActivationResult::Rejected;
        }
        if let Some(max_length) = &self.options.max_length {
            if max_length.exceeded(&name, current, &edit.text) {
                self.max_length_reached = true;
                tracing::debug!(instance = %self.id, input = %name, "max length reached");
                return ActivationResult::Rejected;
            }
        }

        self.max_length_reached = false;
        self.inputs.set_input(&edit.text, &name);
        self.caret.resolve_edit(edit.caret);
        tracing::debug!(
            instance = %self.id,
            input = %name,
            value = %edit.text,
            caret = ?self.caret.range(),
            "input changed"
        );
        ActivationResult::Changed
    }

    /// Look up candidates for the active input and show or close the box.
    /// Returns the new page if the visible box changed.
    fn refresh_candidates(&mut self) -> Option<Option<CandidatePage>> {
        let before = self.candidate_box.snapshot();
        let found = self.dictionary.lookup(
            self.inputs.raw(&self.options.input_name),
            self.caret.position_end(),
            self.options.layout_candidates_case_sensitive_match,
        );
        match found {
            Some(found) => self.candidate_box.show(&found),
            None => self.candidate_box.destroy(),
        }
        let after = self.candidate_box.snapshot();
        if before == after {
            return None;
        }
        tracing::debug!(instance = %self.id, page = ?after, "candidates changed");
        Some(after)
    }

    /// Close the box. Returns whether it was open.
    fn close_candidates(&mut self) -> bool {
        let was_open = self.candidate_box.is_open();
        self.candidate_box.destroy();
        was_open
    }

    fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            origin: self.id.clone(),
            inputs: self.inputs.inputs().clone(),
            caret: self.caret.range(),
        }
    }

    fn release(&mut self) -> Option<String> {
        self.hold.cancel();
        self.pressed.take()
    }
}

impl Synchronized for KeyboardState {
    fn apply_sync(&mut self, snapshot: &SyncSnapshot) {
        self.inputs.replace_input(snapshot.inputs.clone());
        self.inputs.ensure(&self.options.input_name);
        if self.options.disable_caret_positioning {
            self.caret.clear();
        } else {
            self.caret.set_range(snapshot.caret);
        }
    }
}

impl fmt::Debug for KeyboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardState")
            .field("id", &self.id)
            .field("inputs", &self.inputs)
            .field("caret", &self.caret)
            .field("candidate_box", &self.candidate_box)
            .field("modules", &self.modules)
            .finish()
    }
}

/// A keyboard instance bound to a mount target.
///
/// Dropping the keyboard destroys it: it leaves the registry and its hold
/// timer is cancelled. A destroyed keyboard ignores activations, timers and
/// hardware keys, and no longer broadcasts.
pub struct Keyboard {
    id: InstanceId,
    state: Shared<KeyboardState>,
    registry: InstanceRegistry,
    listeners: Vec<Listener>,
    destroyed: bool,
}

impl Keyboard {
    pub fn new(mount: MountTarget, options: KeyboardOptions, registry: &InstanceRegistry) -> Result<Self> {
        Self::with_listeners(mount, options, registry, Vec::new())
    }

    /// Like [`Keyboard::new`], with listeners in place before `Init` fires.
    pub fn with_listeners(
        mount: MountTarget,
        options: KeyboardOptions,
        registry: &InstanceRegistry,
        listeners: Vec<Listener>,
    ) -> Result<Self> {
        let id = InstanceId::from_mount(&mount)?;
        let state = KeyboardState::new(id.clone(), options)?;
        let state = Rc::new(RefCell::new(state));
        registry.register(id.clone(), Rc::clone(&state));
        tracing::debug!(instance = %id, "keyboard initialized");

        let mut keyboard = Self {
            id,
            state,
            registry: registry.clone(),
            listeners,
            destroyed: false,
        };
        emit(&mut keyboard.listeners, KeyboardEvent::Init);
        Ok(keyboard)
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Read access to the instance state.
    pub fn state(&self) -> Ref<'_, KeyboardState> {
        self.state.borrow()
    }

    pub fn options(&self) -> KeyboardOptions {
        self.state.borrow().options.clone()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&KeyboardEvent<'_>) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ========== Activation ==========

    /// Apply one button press to the active input.
    ///
    /// An accepted edit is kept even when syncing it fails; the error then
    /// reports that other instances did not receive it.
    pub fn handle_activation(&mut self, button: &str) -> Result<ActivationResult> {
        if self.destroyed || button_type(button) == ButtonType::Placeholder {
            return Ok(ActivationResult::Ignored);
        }
        tracing::debug!(instance = %self.id, button, "key pressed");
        emit(&mut self.listeners, KeyboardEvent::BeforeInputUpdate { button });
        emit(&mut self.listeners, KeyboardEvent::KeyPress { button });

        let result = self.state.borrow_mut().apply_button(button);
        if result.changed() {
            self.after_change()?;
        }
        Ok(result)
    }

    /// Pointer down on a button: activate it and arm hold-to-repeat.
    pub fn handle_button_down(&mut self, button: &str, now: Instant) -> Result<ActivationResult> {
        if self.destroyed {
            return Ok(ActivationResult::Ignored);
        }
        {
            let mut state = self.state.borrow_mut();
            state.hold.press(button, now);
            state.pressed = Some(button.to_string());
        }
        self.handle_activation(button)
    }

    /// Pointer released anywhere. Hold timers stop on every instance.
    pub fn handle_button_up(&mut self) -> Result<()> {
        let released = self.state.borrow_mut().release();
        if let Some(button) = &released {
            emit(&mut self.listeners, KeyboardEvent::KeyReleased { button });
        }
        self.registry.dispatch(|state, _| {
            state.release();
        })
    }

    /// Fire the held button again if a repeat is due.
    pub fn poll_timers(&mut self, now: Instant) -> Result<Option<ActivationResult>> {
        if self.destroyed {
            return Ok(None);
        }
        let due = self.state.borrow_mut().hold.poll(now);
        match due {
            Some(button) => self.handle_activation(&button).map(Some),
            None => Ok(None),
        }
    }

    /// Route a hardware key through the positional table.
    pub fn handle_physical_key(&mut self, event: &PhysicalKeyEvent) -> Result<Option<ActivationResult>> {
        if self.destroyed {
            return Ok(None);
        }
        let button = self.state.borrow_mut().mapper.handle(event);
        match button {
            Some(button) => self.handle_activation(&button).map(Some),
            None => Ok(None),
        }
    }

    /// Track the host field's selection. With `disableCaretPositioning`
    /// the caret is dropped instead, so edits append.
    pub fn handle_caret_event(&mut self, event: &CaretEvent) {
        let mut state = self.state.borrow_mut();
        if state.options.disable_caret_positioning {
            state.clear_caret();
            return;
        }
        match event {
            CaretEvent::Selection { start, end, value } => {
                let (start, end) = if state.options.rtl {
                    (get_rtl_offset(*start, value), get_rtl_offset(*end, value))
                } else {
                    (*start, *end)
                };
                state.set_caret_position(start, Some(end));
            }
            CaretEvent::FocusLost => state.clear_caret(),
        }
    }

    // ========== Input Buffers ==========

    /// Visible value of `name` (the active input when `None`).
    pub fn get_input(&self, name: Option<&str>) -> String {
        self.state.borrow().get_input(name)
    }

    pub fn get_all_inputs(&self) -> InputMap {
        self.state.borrow().get_all_inputs()
    }

    /// Replace an input's value and sync it to other instances.
    pub fn set_input(&mut self, text: &str, name: Option<&str>) -> Result<()> {
        self.set_input_without_sync(text, name);
        self.sync_if_enabled()
    }

    pub fn set_input_without_sync(&mut self, text: &str, name: Option<&str>) {
        self.state.borrow_mut().set_input(text, name);
    }

    /// Swap every buffer at once.
    pub fn replace_input(&mut self, inputs: InputMap) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        state.inputs.replace_input(inputs);
        state.inputs.ensure(&state.options.input_name);
    }

    /// Empty an input and put the caret at its start.
    pub fn clear_input(&mut self, name: Option<&str>) -> Result<()> {
        let closed = {
            let mut state = self.state.borrow_mut();
            let name = state.resolve_name(name).to_string();
            state.inputs.clear_input(&name);
            state.caret.set_caret_position(0, None);
            state.close_candidates()
        };
        if closed {
            emit(&mut self.listeners, KeyboardEvent::CandidatesChanged { page: None });
        }
        self.sync_if_enabled()
    }

    pub fn max_length_reached(&self) -> bool {
        self.state.borrow().max_length_reached
    }

    // ========== Caret ==========

    pub fn caret_position(&self) -> Option<usize> {
        self.state.borrow().caret.position()
    }

    pub fn caret_position_end(&self) -> Option<usize> {
        self.state.borrow().caret.position_end()
    }

    pub fn set_caret_position(&mut self, pos: usize, end: Option<usize>) {
        self.state.borrow_mut().set_caret_position(pos, end);
    }

    pub fn clear_caret(&mut self) {
        self.state.borrow_mut().clear_caret();
    }

    // ========== Candidates ==========

    pub fn add_suggestion_trigger(&mut self, trigger: &str, suggestions: &str) -> bool {
        self.state.borrow_mut().add_suggestion_trigger(trigger, suggestions)
    }

    pub fn candidate_page(&self) -> Option<CandidatePage> {
        self.state.borrow().candidate_page()
    }

    pub fn candidates_next_page(&mut self) -> bool {
        self.turn_candidate_page(CandidateBox::next_page)
    }

    pub fn candidates_prev_page(&mut self) -> bool {
        self.turn_candidate_page(CandidateBox::prev_page)
    }

    fn turn_candidate_page(&mut self, turn: fn(&mut CandidateBox) -> bool) -> bool {
        let page = {
            let mut state = self.state.borrow_mut();
            if !turn(&mut state.candidate_box) {
                return false;
            }
            state.candidate_box.snapshot()
        };
        emit(
            &mut self.listeners,
            KeyboardEvent::CandidatesChanged { page: page.as_ref() },
        );
        true
    }

    /// Replace the trailing trigger with candidate `index` of the visible
    /// page. Returns the inserted candidate, or `None` if there is no such
    /// candidate.
    pub fn select_candidate(&mut self, index: usize) -> Result<Option<String>> {
        let picked = {
            let state = self.state.borrow();
            let picked = state
                .candidate_box
                .candidate_at(index)
                .zip(state.candidate_box.trigger())
                .map(|(candidate, trigger)| (candidate.to_string(), trigger.to_string()));
            picked
        };
        let Some((candidate, trigger)) = picked else {
            return Ok(None);
        };

        emit(
            &mut self.listeners,
            KeyboardEvent::BeforeInputUpdate { button: &candidate },
        );

        {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            let name = state.options.input_name.clone();
            let replacement = crate::candidate::select(
                &candidate,
                &trigger,
                state.inputs.raw(&name),
                state.caret.position_end(),
                state.options.layout_candidates_case_sensitive_match,
                !state.options.disable_candidate_normalization,
            );
            state.inputs.set_input(&replacement.text, &name);
            if state.options.disable_caret_positioning {
                state.caret.clear();
            } else {
                state.caret.set_caret_position(replacement.caret, None);
            }
            state.candidate_box.destroy();
            tracing::debug!(
                instance = %self.id,
                candidate = %candidate,
                value = %replacement.text,
                "candidate selected"
            );
        }

        if self.state.borrow().options.enable_layout_candidates_key_press {
            emit(
                &mut self.listeners,
                KeyboardEvent::KeyPress { button: &candidate },
            );
        }
        self.emit_change();
        let synced = self.sync_if_enabled();
        emit(&mut self.listeners, KeyboardEvent::CandidatesChanged { page: None });
        synced.map(|()| Some(candidate))
    }

    // ========== Options ==========

    /// Update options in place. Patterns are recompiled first; if that fails
    /// nothing changes.
    pub fn set_options<F>(&mut self, update: F) -> Result<()>
    where
        F: FnOnce(&mut KeyboardOptions),
    {
        let closed = {
            let mut state = self.state.borrow_mut();
            let mut options = state.options.clone();
            update(&mut options);
            let patterns = options.compile_patterns()?;
            let previous = std::mem::replace(&mut state.options, options);
            let state = &mut *state;
            let options = &state.options;

            state.patterns = patterns;
            state.edit_rules = options.edit_rules();
            state.inputs.set_rtl(options.rtl);
            state.inputs.ensure(&options.input_name);
            if options.disable_caret_positioning && !previous.disable_caret_positioning {
                state.caret.clear();
            }
            if options.layout != previous.layout {
                state.mapper = PhysicalKeyMapper::from_layout(&options.layout);
            }
            if options.layout_candidates != previous.layout_candidates {
                state.dictionary = CandidateDictionary::from_entries(
                    options
                        .layout_candidates
                        .iter()
                        .map(|(k, v)| (k.as_str(), v.as_str())),
                );
            }

            let reset_box = options.layout_name != previous.layout_name
                || options.layout_candidates != previous.layout_candidates
                || options.layout_candidates_page_size != previous.layout_candidates_page_size;
            if reset_box {
                state
                    .candidate_box
                    .set_page_size(options.layout_candidates_page_size);
                state.close_candidates()
            } else {
                false
            }
        };
        if closed {
            emit(&mut self.listeners, KeyboardEvent::CandidatesChanged { page: None });
        }
        Ok(())
    }

    // ========== Instances ==========

    /// Run `f` on every registered keyboard.
    pub fn dispatch<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(&mut KeyboardState, &InstanceId),
    {
        self.registry.dispatch(f)
    }

    /// Push this instance's buffers and caret to every other instance.
    /// Returns how many were updated. A destroyed keyboard updates none.
    pub fn sync_instance_inputs(&self) -> Result<usize> {
        if self.destroyed {
            return Ok(0);
        }
        let snapshot = self.state.borrow().snapshot();
        broadcast(&self.registry, &snapshot)
    }

    fn sync_if_enabled(&self) -> Result<()> {
        if !self.state.borrow().options.sync_instance_inputs {
            return Ok(());
        }
        self.sync_instance_inputs().map(|_| ()).map_err(|err| {
            tracing::warn!(instance = %self.id, error = %err, "input sync failed");
            err
        })
    }

    /// Resolve, initialize and keep `modules`.
    pub fn load_modules(&mut self, modules: Vec<ModuleSpec>) {
        let names = {
            let mut state = self.state.borrow_mut();
            for spec in modules {
                let mut module = spec.resolve(&mut state);
                module.init(&mut state);
                tracing::debug!(instance = %self.id, module = module.name(), "module loaded");
                state.modules.push(module);
            }
            state.modules_loaded = true;
            state.modules.names()
        };
        emit(&mut self.listeners, KeyboardEvent::ModulesLoaded { names: &names });
    }

    /// Leave the registry and stop timers. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        {
            let mut state = self.state.borrow_mut();
            state.release();
            state.candidate_box.destroy();
        }
        // A newer keyboard may have taken over this id
        let registered_here = self
            .registry
            .get(&self.id)
            .is_some_and(|handle| Rc::ptr_eq(&handle, &self.state));
        if registered_here {
            self.registry.unregister(&self.id);
        }
        tracing::debug!(instance = %self.id, "keyboard destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ========== Internals ==========

    /// Sync, report and re-evaluate candidates after an accepted edit. A sync
    /// failure is returned once the local events have gone out.
    fn after_change(&mut self) -> Result<()> {
        let synced = self.sync_if_enabled();
        self.emit_change();

        let enabled = self.state.borrow().options.enable_layout_candidates;
        if !enabled {
            return synced;
        }
        let changed = self.state.borrow_mut().refresh_candidates();
        if let Some(page) = changed {
            emit(
                &mut self.listeners,
                KeyboardEvent::CandidatesChanged { page: page.as_ref() },
            );
        }
        synced
    }

    fn emit_change(&mut self) {
        let (input_name, input, inputs) = {
            let state = self.state.borrow();
            (
                state.options.input_name.clone(),
                state.get_input(None),
                state.get_all_inputs(),
            )
        };
        emit(
            &mut self.listeners,
            KeyboardEvent::Change {
                input_name: &input_name,
                input: &input,
            },
        );
        emit(&mut self.listeners, KeyboardEvent::ChangeAll { inputs: &inputs });
    }
}

impl Drop for Keyboard {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyboard")
            .field("id", &self.id)
            .field("listeners", &self.listeners.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
