use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::drivers::io4::hid_report::{DecodedReport, ANALOG_COUNT, SPINNER_COUNT};

use super::joystick::{JoystickAxis, JoystickState};

/// Report field an axis value is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AxisSource {
    /// Analog channel 0-7
    Analog(usize),
    /// Spinner channel 0-3
    Spinner(usize),
}

impl AxisSource {
    /// Returns true if the channel index exists in an IO4 report
    pub fn is_valid(&self) -> bool {
        match *self {
            AxisSource::Analog(index) => index < ANALOG_COUNT,
            AxisSource::Spinner(index) => index < SPINNER_COUNT,
        }
    }

    /// Read the raw value of this source from the given report. Channels
    /// outside the report read as zero.
    pub fn read(&self, report: &DecodedReport) -> u16 {
        let value = match *self {
            AxisSource::Analog(index) => report.analog.get(index),
            AxisSource::Spinner(index) => report.spinners.get(index),
        };
        value.copied().unwrap_or_default()
    }
}

/// Binds a joystick axis to a report field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct AxisBinding {
    pub axis: JoystickAxis,
    /// Written as `{ analog: 0 }` or `{ spinner: 0 }`
    #[serde(with = "serde_yaml::with::singleton_map")]
    #[schemars(with = "AxisSource")]
    pub source: AxisSource,
}

impl AxisBinding {
    pub fn new(axis: JoystickAxis, source: AxisSource) -> Self {
        Self { axis, source }
    }
}

/// Returns the default axis bindings for the IO4 board
pub fn default_bindings() -> Vec<AxisBinding> {
    vec![
        AxisBinding::new(JoystickAxis::X, AxisSource::Analog(0)),
        AxisBinding::new(JoystickAxis::Y, AxisSource::Analog(1)),
        AxisBinding::new(JoystickAxis::Z, AxisSource::Analog(2)),
        AxisBinding::new(JoystickAxis::Rudder, AxisSource::Spinner(0)),
        AxisBinding::new(JoystickAxis::Aileron, AxisSource::Spinner(1)),
    ]
}

/// Translates decoded IO4 reports into joystick state
#[derive(Debug, Clone, PartialEq)]
pub struct AxisMapping {
    bindings: Vec<AxisBinding>,
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self::new(default_bindings())
    }
}

impl AxisMapping {
    pub fn new(bindings: Vec<AxisBinding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[AxisBinding] {
        &self.bindings
    }

    /// Map the given report onto the joystick with the given device id.
    /// Unbound axes stay at zero. Values are passed through without scaling.
    pub fn map(&self, report: &DecodedReport, device: u8) -> JoystickState {
        let mut state = JoystickState::new(device);
        for binding in self.bindings.iter() {
            state.set_axis(binding.axis, binding.source.read(report));
        }
        state.buttons = button_mask(report);
        state
    }
}

/// Combine both 16-button bitfields into a single mask. The first bitfield
/// occupies bits 0-15, the second bits 16-31.
pub fn button_mask(report: &DecodedReport) -> u32 {
    u32::from(report.buttons[0]) | (u32::from(report.buttons[1]) << 16)
}
