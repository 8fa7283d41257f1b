//! Tests for hardware keys routed through the positional table into a keyboard

use libkeyboard_core::{
    ActivationResult, InstanceRegistry, Keyboard, KeyboardOptions, Layout, MountTarget,
    PhysicalKeyEvent,
};

fn type_keys(kb: &mut Keyboard, keys: &[(&str, &str)]) {
    for (code, key) in keys {
        kb.handle_physical_key(&PhysicalKeyEvent::down(*code, *key)).unwrap();
        kb.handle_physical_key(&PhysicalKeyEvent::up(*code, *key)).unwrap();
    }
}

#[test]
fn qwerty_codes_type_layout_buttons() {
    let registry = InstanceRegistry::new();
    let mut kb = Keyboard::new(MountTarget::Default, KeyboardOptions::default(), &registry).unwrap();

    type_keys(&mut kb, &[("KeyH", "h"), ("KeyI", "i"), ("Space", " "), ("Digit1", "1")]);
    assert_eq!(kb.get_input(None), "hi 1");

    type_keys(&mut kb, &[("Backspace", "Backspace")]);
    assert_eq!(kb.get_input(None), "hi ");
}

#[test]
fn positions_follow_the_visible_layout() {
    let mut layout = Layout::new();
    layout.insert(
        "default",
        [
            "; 1 2 3 4 5 6 7 8 9 0 - = {bksp}",
            "{tab} / ' ק ר א ט ו ן ם פ ] [ \\",
        ],
    );
    let mut options = KeyboardOptions::default();
    options.layout = layout;
    let registry = InstanceRegistry::new();
    let mut kb = Keyboard::new(MountTarget::Default, options, &registry).unwrap();

    // The host reports Latin keys, the keyboard types what sits in that slot
    type_keys(&mut kb, &[("KeyE", "e"), ("KeyR", "r")]);
    assert_eq!(kb.get_input(None), "קר");
}

#[test]
fn shift_and_caps_lock() {
    let registry = InstanceRegistry::new();
    let mut kb = Keyboard::new(MountTarget::Default, KeyboardOptions::default(), &registry).unwrap();

    kb.handle_physical_key(&PhysicalKeyEvent::down("ShiftLeft", "Shift")).unwrap();
    kb.handle_physical_key(&PhysicalKeyEvent::down("KeyA", "A")).unwrap();
    kb.handle_physical_key(&PhysicalKeyEvent::up("KeyA", "A")).unwrap();
    kb.handle_physical_key(&PhysicalKeyEvent::up("ShiftLeft", "Shift")).unwrap();
    type_keys(&mut kb, &[("KeyB", "b"), ("CapsLock", "CapsLock"), ("KeyC", "C")]);

    assert_eq!(kb.get_input(None), "AbC");
}

#[test]
fn unknown_codes_fall_back_to_key() {
    let registry = InstanceRegistry::new();
    let mut kb = Keyboard::new(MountTarget::Default, KeyboardOptions::default(), &registry).unwrap();

    let result = kb
        .handle_physical_key(&PhysicalKeyEvent::down("ArrowLeft", "ArrowLeft"))
        .unwrap();
    assert_eq!(result, Some(ActivationResult::Pressed));

    type_keys(&mut kb, &[("Numpad7", "7"), ("NumpadAdd", "+")]);
    assert_eq!(kb.get_input(None), "7+");
}
