use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of buttons a virtual joystick exposes
pub const BUTTON_COUNT: usize = 32;

/// Number of axes a virtual joystick exposes
pub const AXIS_COUNT: usize = 10;

/// Named axes of a virtual joystick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JoystickAxis {
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    Slider,
    Dial,
    Rudder,
    Aileron,
}

impl JoystickAxis {
    /// All axes in report order
    pub const ALL: [JoystickAxis; AXIS_COUNT] = [
        JoystickAxis::X,
        JoystickAxis::Y,
        JoystickAxis::Z,
        JoystickAxis::Rx,
        JoystickAxis::Ry,
        JoystickAxis::Rz,
        JoystickAxis::Slider,
        JoystickAxis::Dial,
        JoystickAxis::Rudder,
        JoystickAxis::Aileron,
    ];

    /// Position of the axis in [JoystickState] storage
    pub fn index(&self) -> usize {
        match self {
            JoystickAxis::X => 0,
            JoystickAxis::Y => 1,
            JoystickAxis::Z => 2,
            JoystickAxis::Rx => 3,
            JoystickAxis::Ry => 4,
            JoystickAxis::Rz => 5,
            JoystickAxis::Slider => 6,
            JoystickAxis::Dial => 7,
            JoystickAxis::Rudder => 8,
            JoystickAxis::Aileron => 9,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JoystickAxis::X => "x",
            JoystickAxis::Y => "y",
            JoystickAxis::Z => "z",
            JoystickAxis::Rx => "rx",
            JoystickAxis::Ry => "ry",
            JoystickAxis::Rz => "rz",
            JoystickAxis::Slider => "slider",
            JoystickAxis::Dial => "dial",
            JoystickAxis::Rudder => "rudder",
            JoystickAxis::Aileron => "aileron",
        }
    }
}

impl Display for JoystickAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full position of a virtual joystick. Axis values are raw 16-bit values;
/// bit N of `buttons` is button N+1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoystickState {
    pub device: u8,
    axes: [u16; AXIS_COUNT],
    pub buttons: u32,
}

impl JoystickState {
    pub fn new(device: u8) -> Self {
        Self {
            device,
            ..Default::default()
        }
    }

    /// Returns the value of the given axis
    pub fn axis(&self, axis: JoystickAxis) -> u16 {
        self.axes[axis.index()]
    }

    /// Set the value of the given axis
    pub fn set_axis(&mut self, axis: JoystickAxis, value: u16) {
        self.axes[axis.index()] = value;
    }

    /// Returns whether the given zero-based button is pressed
    pub fn is_pressed(&self, button: usize) -> bool {
        button < BUTTON_COUNT && self.buttons & (1 << button) != 0
    }
}
