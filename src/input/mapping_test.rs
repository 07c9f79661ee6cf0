use crate::{
    drivers::io4::hid_report::DecodedReport,
    input::{
        joystick::JoystickAxis,
        mapping::{button_mask, AxisBinding, AxisMapping, AxisSource},
    },
};

fn sample_report() -> DecodedReport {
    DecodedReport {
        analog: [100, 200, 300, 0, 0, 0, 0, 0],
        spinners: [5, 6, 0, 0],
        buttons: [0x0003, 0x0001],
        ..Default::default()
    }
}

#[test]
fn test_default_mapping() {
    let mapping = AxisMapping::default();
    let state = mapping.map(&sample_report(), 1);

    assert_eq!(state.device, 1);
    assert_eq!(state.axis(JoystickAxis::X), 100);
    assert_eq!(state.axis(JoystickAxis::Y), 200);
    assert_eq!(state.axis(JoystickAxis::Z), 300);
    assert_eq!(state.axis(JoystickAxis::Rudder), 5);
    assert_eq!(state.axis(JoystickAxis::Aileron), 6);
    assert_eq!(state.buttons, 0x0001_0003);

    // Unbound axes stay centered at zero
    assert_eq!(state.axis(JoystickAxis::Rx), 0);
    assert_eq!(state.axis(JoystickAxis::Slider), 0);
}

#[test]
fn test_mapping_is_deterministic() {
    let mapping = AxisMapping::default();
    let report = sample_report();
    assert_eq!(mapping.map(&report, 3), mapping.map(&report, 3));
}

#[test]
fn test_full_range_passthrough() {
    let report = DecodedReport {
        analog: [u16::MAX, 0, 0x8000, 0, 0, 0, 0, 0],
        spinners: [u16::MAX, 1, 0, 0],
        ..Default::default()
    };
    let state = AxisMapping::default().map(&report, 1);
    assert_eq!(state.axis(JoystickAxis::X), u16::MAX);
    assert_eq!(state.axis(JoystickAxis::Y), 0);
    assert_eq!(state.axis(JoystickAxis::Z), 0x8000);
    assert_eq!(state.axis(JoystickAxis::Rudder), u16::MAX);
}

#[test]
fn test_button_bit_positions() {
    let mut report = DecodedReport::default();
    report.buttons = [0x8000, 0x0000];
    assert_eq!(button_mask(&report), 0x0000_8000);

    report.buttons = [0x0000, 0x8000];
    assert_eq!(button_mask(&report), 0x8000_0000);

    report.buttons = [0xFFFF, 0xFFFF];
    let state = AxisMapping::default().map(&report, 1);
    assert_eq!(state.buttons, u32::MAX);
    assert!(state.is_pressed(0));
    assert!(state.is_pressed(31));
    assert!(!state.is_pressed(32));
}

#[test]
fn test_custom_bindings() {
    let mapping = AxisMapping::new(vec![
        AxisBinding::new(JoystickAxis::Slider, AxisSource::Analog(7)),
        AxisBinding::new(JoystickAxis::X, AxisSource::Spinner(3)),
        // Rebinding an axis keeps the last binding
        AxisBinding::new(JoystickAxis::X, AxisSource::Analog(4)),
    ]);
    let report = DecodedReport {
        analog: [0, 0, 0, 0, 44, 0, 0, 77],
        spinners: [0, 0, 0, 33],
        ..Default::default()
    };
    let state = mapping.map(&report, 2);
    assert_eq!(state.axis(JoystickAxis::Slider), 77);
    assert_eq!(state.axis(JoystickAxis::X), 44);
    assert_eq!(state.axis(JoystickAxis::Y), 0);
}

#[test]
fn test_source_validity() {
    assert!(AxisSource::Analog(7).is_valid());
    assert!(!AxisSource::Analog(8).is_valid());
    assert!(AxisSource::Spinner(3).is_valid());
    assert!(!AxisSource::Spinner(4).is_valid());
    assert_eq!(AxisSource::Spinner(9).read(&sample_report()), 0);
}
