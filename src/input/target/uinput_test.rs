use std::collections::HashSet;

use evdev::{EventType, KeyCode};

use crate::input::{
    joystick::{JoystickAxis, JoystickState, BUTTON_COUNT},
    target::{
        uinput::{axis_code, button_code, device_name, translate_state, UinputJoystick},
        SessionState, TargetError, VirtualJoystick,
    },
};

const MISSING_UINPUT: &str = "/nonexistent/io4feeder/uinput";

#[test]
fn test_axis_and_button_codes_are_unique() {
    let axes: HashSet<u16> = JoystickAxis::ALL.iter().map(|a| axis_code(*a).0).collect();
    assert_eq!(axes.len(), JoystickAxis::ALL.len());

    let buttons: HashSet<u16> = (0..BUTTON_COUNT).map(|b| button_code(b).0).collect();
    assert_eq!(buttons.len(), BUTTON_COUNT);
    assert_eq!(button_code(0), KeyCode::BTN_TRIGGER_HAPPY1);
}

#[test]
fn test_translate_initial_state_emits_everything() {
    let state = JoystickState::new(1);
    let events = translate_state(None, &state);
    assert_eq!(events.len(), JoystickAxis::ALL.len() + BUTTON_COUNT);
}

#[test]
fn test_translate_only_emits_changes() {
    let old = JoystickState::new(1);
    let mut state = old;
    state.set_axis(JoystickAxis::X, u16::MAX);
    state.buttons = 0x0001_0000;

    let events = translate_state(Some(&old), &state);
    assert_eq!(events.len(), 2);

    let axis = &events[0];
    assert_eq!(axis.event_type(), EventType::ABSOLUTE);
    assert_eq!(axis.code(), axis_code(JoystickAxis::X).0);
    assert_eq!(axis.value(), 65535);

    let button = &events[1];
    assert_eq!(button.event_type(), EventType::KEY);
    assert_eq!(button.code(), button_code(16).0);
    assert_eq!(button.value(), 1);

    assert!(translate_state(Some(&state), &state).is_empty());
}

#[test]
fn test_missing_subsystem() {
    let mut joystick = UinputJoystick::with_path(MISSING_UINPUT);
    assert!(!joystick.is_available());
    assert_eq!(joystick.status(1), SessionState::Missing);
    assert!(matches!(joystick.acquire(1), Err(TargetError::Unavailable)));
}

#[test]
fn test_update_requires_acquire() {
    let mut joystick = UinputJoystick::with_path(MISSING_UINPUT);
    let result = joystick.update(2, &JoystickState::new(2));
    assert!(matches!(result, Err(TargetError::NotAcquired(2))));
}

#[test]
fn test_release_is_idempotent() {
    let mut joystick = UinputJoystick::with_path(MISSING_UINPUT);
    joystick.release(1);
    joystick.release(1);
    assert_eq!(joystick.status(1), SessionState::Missing);
}

#[test]
fn test_device_name() {
    assert_eq!(device_name(3), "IO4 Virtual Joystick 3");
}

#[test]
fn test_joystick_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let mut joystick = UinputJoystick::new();
    // Needs write access to /dev/uinput
    if joystick.status(16) != SessionState::Free {
        return Ok(());
    }

    joystick.acquire(16)?;
    assert_eq!(joystick.status(16), SessionState::OwnedBySelf);

    let mut state = JoystickState::new(16);
    state.set_axis(JoystickAxis::X, 1234);
    state.buttons = 0x0000_0003;
    joystick.update(16, &state)?;
    joystick.update(16, &state)?;

    joystick.release(16);
    joystick.release(16);
    assert!(matches!(
        joystick.update(16, &state),
        Err(TargetError::NotAcquired(16))
    ));

    Ok(())
}
