pub mod uinput;
#[cfg(test)]
pub mod uinput_test;

use std::{fmt::Display, io};

use thiserror::Error;

use super::joystick::JoystickState;

/// Possible errors for a virtual joystick
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("virtual device subsystem is not available")]
    Unavailable,
    #[error("virtual joystick {0} is not acquired")]
    NotAcquired(u8),
    #[error("virtual joystick {0} is owned by another feeder")]
    Busy(u8),
    #[error("virtual device i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Ownership state of a virtual joystick as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody owns the device; it can be acquired
    Free,
    /// This feeder already owns the device
    OwnedBySelf,
    /// Another feeder owns the device
    OwnedByOther,
    /// The device is not installed or is disabled
    Missing,
    /// The driver returned an unknown state
    GeneralError,
}

impl SessionState {
    pub fn as_str(&self) -> &str {
        match self {
            SessionState::Free => "free",
            SessionState::OwnedBySelf => "owned by this feeder",
            SessionState::OwnedByOther => "owned by another feeder",
            SessionState::Missing => "missing",
            SessionState::GeneralError => "general error",
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ownership and feeding interface of a virtual joystick driver. All calls
/// are synchronous and return without waiting on input.
pub trait VirtualJoystick {
    /// Returns true if the virtual device subsystem is installed and usable
    fn is_available(&self) -> bool;
    /// Query the ownership state of the joystick with the given id
    fn status(&self, id: u8) -> SessionState;
    /// Take ownership of the joystick with the given id
    fn acquire(&mut self, id: u8) -> Result<(), TargetError>;
    /// Feed a new position to an acquired joystick
    fn update(&mut self, id: u8, state: &JoystickState) -> Result<(), TargetError>;
    /// Give up ownership of the joystick. Safe to call when the joystick was
    /// never acquired or has already been released.
    fn release(&mut self, id: u8);
}
