use std::{error::Error, time::Duration};

use crate::{
    config::{path::get_config_paths, FeederConfig, LoadError},
    constants::{IO4_PID, IO4_VID},
    drivers::io4::hid_report::DecodedReport,
    input::{
        joystick::JoystickAxis,
        mapping::{AxisBinding, AxisSource},
    },
};

const BUNDLED_CONFIG: &str = "./rootfs/usr/share/io4feeder/config.yaml";

#[test]
fn test_empty_config_uses_defaults() -> Result<(), Box<dyn Error>> {
    let config = FeederConfig::from_yaml("{}".to_string())?;
    assert_eq!(config, FeederConfig::default());
    assert_eq!(config.device.vendor_id, IO4_VID);
    assert_eq!(config.device.product_id, IO4_PID);
    assert_eq!(config.joystick_id, 1);
    assert_eq!(config.poll_timeout(), Duration::from_millis(100));
    assert_eq!(config.pacing_interval(), Duration::from_millis(5));
    assert_eq!(config.axes.len(), 5);

    Ok(())
}

#[test]
fn test_load_full_config() -> Result<(), Box<dyn Error>> {
    let yaml = r#"
version: 1
kind: FeederConfig
name: Cabinet 2
device:
  vendor_id: 0x0ca3
  product_id: 0x0021
joystick_id: 4
poll_timeout_ms: 50
pacing_interval_ms: 0
axes:
  - axis: slider
    source:
      analog: 5
  - axis: rudder
    source:
      spinner: 2
"#;
    let config = FeederConfig::from_yaml(yaml.to_string())?;
    assert_eq!(config.name, "Cabinet 2");
    assert_eq!(config.device.vendor_id, 0x0CA3);
    assert_eq!(config.joystick_id, 4);
    assert_eq!(config.poll_timeout(), Duration::from_millis(50));
    assert_eq!(config.pacing_interval(), Duration::ZERO);
    assert_eq!(
        config.axes,
        vec![
            AxisBinding::new(JoystickAxis::Slider, AxisSource::Analog(5)),
            AxisBinding::new(JoystickAxis::Rudder, AxisSource::Spinner(2)),
        ]
    );

    Ok(())
}

#[test]
fn test_reject_invalid_values() {
    let cases = [
        "joystick_id: 0",
        "joystick_id: 17",
        "poll_timeout_ms: 0",
        "poll_timeout_ms: 5000",
        "axes: [{axis: x, source: {analog: 8}}]",
        "axes: [{axis: x, source: {spinner: 4}}]",
    ];
    for yaml in cases {
        let result = FeederConfig::from_yaml(yaml.to_string());
        assert!(
            matches!(result, Err(LoadError::Invalid(_))),
            "'{yaml}' should be rejected"
        );
    }
}

#[test]
fn test_reject_malformed_yaml() {
    let result = FeederConfig::from_yaml("axes: [{axis: warp, source: {analog: 0}}]".to_string());
    assert!(matches!(result, Err(LoadError::DeserializeError(_))));
}

#[test]
fn test_yaml_roundtrip() -> Result<(), Box<dyn Error>> {
    let config = FeederConfig::default();
    let yaml = config.to_yaml()?;
    assert_eq!(FeederConfig::from_yaml(yaml)?, config);

    Ok(())
}

#[test]
fn test_bundled_config_loads() -> Result<(), Box<dyn Error>> {
    let config = FeederConfig::from_yaml_file(BUNDLED_CONFIG)?;
    assert_eq!(config.device.vendor_id, IO4_VID);
    assert_eq!(config.mapping().bindings().len(), config.axes.len());

    Ok(())
}

#[test]
fn test_configured_axes_reach_mapping() -> Result<(), Box<dyn Error>> {
    let yaml = r#"
joystick_id: 3
axes:
  - axis: x
    source:
      analog: 4
  - axis: slider
    source:
      spinner: 3
  - axis: x
    source:
      analog: 7
"#;
    let config = FeederConfig::from_yaml(yaml.to_string())?;
    let report = DecodedReport {
        analog: [10, 11, 12, 13, 14, 15, 16, 17],
        spinners: [20, 21, 22, 23],
        buttons: [0x0001, 0x8000],
        ..Default::default()
    };

    let state = config.mapping().map(&report, config.joystick_id);
    assert_eq!(state.device, 3);
    // The last binding of an axis wins
    assert_eq!(state.axis(JoystickAxis::X), 17);
    assert_eq!(state.axis(JoystickAxis::Slider), 23);
    // Axes left out of the config are not bound
    assert_eq!(state.axis(JoystickAxis::Y), 0);
    assert_eq!(state.axis(JoystickAxis::Rudder), 0);
    assert_eq!(state.buttons, 0x8000_0001);

    Ok(())
}

#[test]
fn test_bundled_config_matches_defaults() -> Result<(), Box<dyn Error>> {
    let config = FeederConfig::from_yaml_file(BUNDLED_CONFIG)?;
    assert_eq!(config, FeederConfig::default());

    let yaml = config.to_yaml()?;
    assert!(yaml.contains("analog: 0"), "sources are written as maps: {yaml}");

    Ok(())
}

#[test]
fn test_config_paths_order() {
    let paths = get_config_paths();
    assert_eq!(paths.len(), 3);
    assert!(paths[0].starts_with("./rootfs"));
    assert!(paths[1].starts_with("/etc/io4feeder"));
}
