use std::{
    collections::HashMap,
    fmt::Debug,
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisCode, AttributeSet, EventType, InputEvent, KeyCode, SynchronizationCode,
    SynchronizationEvent, UinputAbsSetup,
};

use crate::input::joystick::{JoystickAxis, JoystickState, BUTTON_COUNT};

use super::{SessionState, TargetError, VirtualJoystick};

/// Default path to the uinput character device
pub const UINPUT_PATH: &str = "/dev/uinput";

/// Returns the name of the virtual device created for the given joystick id
pub fn device_name(id: u8) -> String {
    format!("IO4 Virtual Joystick {id}")
}

/// Returns the evdev axis code used for the given joystick axis
pub fn axis_code(axis: JoystickAxis) -> AbsoluteAxisCode {
    match axis {
        JoystickAxis::X => AbsoluteAxisCode::ABS_X,
        JoystickAxis::Y => AbsoluteAxisCode::ABS_Y,
        JoystickAxis::Z => AbsoluteAxisCode::ABS_Z,
        JoystickAxis::Rx => AbsoluteAxisCode::ABS_RX,
        JoystickAxis::Ry => AbsoluteAxisCode::ABS_RY,
        JoystickAxis::Rz => AbsoluteAxisCode::ABS_RZ,
        JoystickAxis::Slider => AbsoluteAxisCode::ABS_THROTTLE,
        JoystickAxis::Dial => AbsoluteAxisCode::ABS_GAS,
        JoystickAxis::Rudder => AbsoluteAxisCode::ABS_RUDDER,
        JoystickAxis::Aileron => AbsoluteAxisCode::ABS_WHEEL,
    }
}

/// Returns the evdev key code used for the given zero-based button
pub fn button_code(button: usize) -> KeyCode {
    KeyCode::new(KeyCode::BTN_TRIGGER_HAPPY1.0 + button as u16)
}

/// Translate a joystick state into the evdev events needed to move the
/// virtual device from `old_state` to `state`. Everything is emitted when
/// there is no previous state.
pub fn translate_state(old_state: Option<&JoystickState>, state: &JoystickState) -> Vec<InputEvent> {
    let mut events = Vec::new();

    for axis in JoystickAxis::ALL {
        let value = state.axis(axis);
        if old_state.is_some_and(|old| old.axis(axis) == value) {
            continue;
        }
        let code = axis_code(axis);
        events.push(InputEvent::new(EventType::ABSOLUTE.0, code.0, value as i32));
    }

    for button in 0..BUTTON_COUNT {
        let pressed = state.is_pressed(button);
        if old_state.is_some_and(|old| old.is_pressed(button) == pressed) {
            continue;
        }
        let code = button_code(button);
        events.push(InputEvent::new(EventType::KEY.0, code.0, pressed as i32));
    }

    events
}

/// A virtual joystick that has been created by this feeder
struct JoystickDevice {
    device: VirtualDevice,
    last_state: Option<JoystickState>,
}

/// [VirtualJoystick] implementation backed by the Linux uinput subsystem.
/// Acquiring a joystick creates a uinput device; releasing destroys it.
pub struct UinputJoystick {
    uinput_path: PathBuf,
    devices: HashMap<u8, JoystickDevice>,
}

impl Default for UinputJoystick {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for UinputJoystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputJoystick")
            .field("uinput_path", &self.uinput_path)
            .field("devices", &self.devices.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl UinputJoystick {
    pub fn new() -> Self {
        Self::with_path(UINPUT_PATH)
    }

    /// Probe the uinput character device at the given path. Only
    /// [VirtualJoystick::is_available] and [VirtualJoystick::status] look at
    /// this path; devices are always created through [UINPUT_PATH].
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            uinput_path: path.as_ref().to_path_buf(),
            devices: HashMap::new(),
        }
    }

    /// Returns true if another input device already carries the name of the
    /// given joystick
    fn is_claimed_elsewhere(&self, id: u8) -> bool {
        let name = device_name(id);
        evdev::enumerate().any(|(_, device)| device.name() == Some(name.as_str()))
    }

    /// Create the virtual device to emulate
    fn create_virtual_device(&self, id: u8) -> Result<VirtualDevice, TargetError> {
        let mut keys = AttributeSet::<KeyCode>::new();
        for button in 0..BUTTON_COUNT {
            keys.insert(button_code(button));
        }

        // Full 16-bit range, values are fed without scaling
        let axis_setup = AbsInfo::new(0, 0, u16::MAX as i32, 0, 0, 1);

        let name = device_name(id);
        let mut builder = VirtualDeviceBuilder::new()?
            .name(name.as_str())
            .with_keys(&keys)?;
        for axis in JoystickAxis::ALL {
            let setup = UinputAbsSetup::new(axis_code(axis), axis_setup);
            builder = builder.with_absolute_axis(&setup)?;
        }
        let device = builder.build()?;

        Ok(device)
    }
}

impl VirtualJoystick for UinputJoystick {
    fn is_available(&self) -> bool {
        self.uinput_path.exists()
    }

    fn status(&self, id: u8) -> SessionState {
        if self.devices.contains_key(&id) {
            return SessionState::OwnedBySelf;
        }
        if !self.uinput_path.exists() {
            return SessionState::Missing;
        }
        if let Err(e) = OpenOptions::new().write(true).open(&self.uinput_path) {
            log::debug!("Unable to open {:?} for writing: {e}", self.uinput_path);
            return SessionState::GeneralError;
        }
        if self.is_claimed_elsewhere(id) {
            return SessionState::OwnedByOther;
        }

        SessionState::Free
    }

    fn acquire(&mut self, id: u8) -> Result<(), TargetError> {
        if self.devices.contains_key(&id) {
            return Ok(());
        }
        if !self.is_available() {
            return Err(TargetError::Unavailable);
        }
        if self.is_claimed_elsewhere(id) {
            return Err(TargetError::Busy(id));
        }

        log::debug!("Creating virtual joystick {id}");
        let device = self.create_virtual_device(id)?;
        self.devices.insert(
            id,
            JoystickDevice {
                device,
                last_state: None,
            },
        );

        Ok(())
    }

    fn update(&mut self, id: u8, state: &JoystickState) -> Result<(), TargetError> {
        let Some(joystick) = self.devices.get_mut(&id) else {
            return Err(TargetError::NotAcquired(id));
        };

        let mut events = translate_state(joystick.last_state.as_ref(), state);
        if events.is_empty() {
            return Ok(());
        }
        events.push(SynchronizationEvent::new(SynchronizationCode::SYN_REPORT, 0).into());

        if let Err(e) = joystick.device.emit(events.as_slice()) {
            // The device is unusable; a following acquire recreates it
            log::debug!("Dropping virtual joystick {id} after write failure");
            self.devices.remove(&id);
            return Err(e.into());
        }
        joystick.last_state = Some(*state);

        Ok(())
    }

    fn release(&mut self, id: u8) {
        if self.devices.remove(&id).is_some() {
            log::debug!("Destroyed virtual joystick {id}");
        }
    }
}
