pub mod joystick;
pub mod mapping;
#[cfg(test)]
pub mod mapping_test;
pub mod source;
pub mod target;
