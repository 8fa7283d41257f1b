//! Tests for the bundled presets driven through the session the binary uses

use libkeyboard::{preset, KeyboardOptions, Session, RTL_END, RTL_START};

#[test]
fn hebrew_preset_types_rtl_through_physical_keys() {
    let mut session = Session::new(preset("hebrew").unwrap(), 1).unwrap();
    session.run_line(":key KeyA a").unwrap();
    session.run_line(":key KeyL l").unwrap();

    let keyboard = session.active();
    assert_eq!(keyboard.state().raw_input(None), "שך");
    assert_eq!(
        keyboard.get_input(None),
        format!("{RTL_START}שך{RTL_END}")
    );
}

#[test]
fn synced_instances_follow_the_active_one() {
    let mut options = KeyboardOptions::default();
    options.set_sync_instance_inputs(true);
    let mut session = Session::new(options, 3).unwrap();

    session.run_line("hey").unwrap();
    session.run_line(":use 3").unwrap();
    session.run_line("{bksp}!").unwrap();

    for keyboard in session.keyboards() {
        assert_eq!(keyboard.get_input(None), "he!");
    }
    assert_eq!(session.registry().len(), 3);
}

#[test]
fn pinyin_paging_and_pick() {
    let mut session = Session::new(preset("pinyin").unwrap(), 1).unwrap();
    session.run_line("wo shi").unwrap();

    let out = session.run_line(":next").unwrap().unwrap();
    assert!(out.iter().any(|l| l.contains("[2/2]")));

    session.run_line(":pick 1").unwrap();
    // page 2 of "是 时 事 十 市 使 世 式 师 实" starts at 使
    assert_eq!(session.active().get_input(None), "wo 使");
}

#[test]
fn show_lists_every_keyboard() {
    let mut session = Session::new(KeyboardOptions::default(), 2).unwrap();
    let out = session.run_line(":show").unwrap().unwrap();
    assert_eq!(out.len(), 2);
    assert!(out[0].starts_with("* [simpleKeyboard]"));
    assert!(out[1].starts_with("  [keyboard2]"));
}
