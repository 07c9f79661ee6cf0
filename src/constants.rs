/// Name used for config directories and the XDG prefix
pub const APP_NAME: &str = "io4feeder";

/// Sega IO4 board hardware ID's
pub const IO4_VID: u16 = 0x0CA3;
pub const IO4_PID: u16 = 0x0021;

/// Default virtual joystick device id
pub const DEFAULT_JOYSTICK_ID: u8 = 1;

/// Highest virtual joystick device id that can be configured
pub const MAX_JOYSTICK_ID: u8 = 16;

/// Default bounded wait for a single input report, in milliseconds
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 100;

/// Upper bound for the poll timeout. The loop only notices a stop request
/// between reads, so this bounds shutdown latency.
pub const MAX_POLL_TIMEOUT_MS: u64 = 100;

/// Default delay at the end of every polling iteration, in milliseconds
pub const DEFAULT_PACING_INTERVAL_MS: u64 = 5;
