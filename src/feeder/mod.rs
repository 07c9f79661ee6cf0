//! The feeder loop bridges an IO4 board into a virtual joystick.
//!
//! It moves through `Init -> Discovering -> Acquiring -> Polling`, bouncing
//! between `Polling` and `Recovering` when feeding the joystick fails. Every
//! exit path, clean or fatal, ends in `Shutdown`, which releases the joystick
//! and closes the board.

use std::{
    fmt::Display,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use thiserror::Error;

use crate::{
    config::FeederConfig,
    drivers::io4::{
        driver::{Driver, ReadOutcome},
        hid_report::{decode, DecodedReport},
    },
    input::{
        mapping::AxisMapping,
        source::hidraw::{self, HidTransport, LocateError, TransportError},
        target::{SessionState, TargetError, VirtualJoystick},
    },
};

/// Fatal conditions that end the feeder loop
#[derive(Error, Debug)]
pub enum FeederError {
    #[error("virtual joystick driver is not enabled or not installed")]
    SubsystemUnavailable,
    #[error("could not find board with VID: {vendor_id:04x}, PID: {product_id:04x}")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    #[error("unable to enumerate input devices: {0}")]
    Discovery(TransportError),
    #[error("failed to open board: {0}")]
    DeviceOpen(TransportError),
    #[error("virtual joystick {0} is already owned by another feeder")]
    DeviceOwnedByOther(u8),
    #[error("virtual joystick {0} is not installed or disabled")]
    DeviceMissing(u8),
    #[error("virtual joystick {0} general error")]
    GeneralSessionError(u8),
    #[error("failed to acquire virtual joystick {id}: {source}")]
    AcquisitionFailure { id: u8, source: TargetError },
    #[error("board read error: {0}")]
    TransportRead(TransportError),
    #[error("failed to re-acquire virtual joystick {id}: {source}")]
    ReacquisitionFailure { id: u8, source: TargetError },
    #[error("feeding virtual joystick {id} failed again after re-acquiring: {source}")]
    RepeatedUpdateFailure { id: u8, source: TargetError },
}

impl From<LocateError> for FeederError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::NotFound {
                vendor_id,
                product_id,
            } => Self::DeviceNotFound {
                vendor_id,
                product_id,
            },
            LocateError::Discovery(e) => Self::Discovery(e),
        }
    }
}

/// States of the feeder loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederState {
    Init,
    Discovering,
    Acquiring,
    Polling,
    Recovering,
    Shutdown,
}

impl Display for FeederState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeederState::Init => "init",
            FeederState::Discovering => "discovering",
            FeederState::Acquiring => "acquiring",
            FeederState::Polling => "polling",
            FeederState::Recovering => "recovering",
            FeederState::Shutdown => "shutdown",
        };
        write!(f, "{name}")
    }
}

/// Counters collected over one feeder session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeederStats {
    /// Reports successfully fed to the joystick
    pub reports: u64,
    /// Frames dropped because of an unexpected report ID or size
    pub dropped: u64,
    /// Reads that timed out
    pub timeouts: u64,
    /// Times the joystick was re-acquired after a failed update
    pub recoveries: u64,
}

/// Drives an IO4 board into a virtual joystick. The feeder exclusively owns
/// both the hidraw transport and the joystick for its whole lifetime.
pub struct Feeder<T: HidTransport, J: VirtualJoystick> {
    config: FeederConfig,
    mapping: AxisMapping,
    transport: T,
    joystick: J,
    stop: Arc<AtomicBool>,
    state: FeederState,
    stats: FeederStats,
    /// Last seen (system, transport) status bytes
    status: Option<(u8, u8)>,
}

impl<T: HidTransport, J: VirtualJoystick> Feeder<T, J> {
    pub fn new(config: FeederConfig, transport: T, joystick: J) -> Self {
        let mapping = config.mapping();
        Self {
            config,
            mapping,
            transport,
            joystick,
            stop: Arc::new(AtomicBool::new(false)),
            state: FeederState::Init,
            stats: FeederStats::default(),
            status: None,
        }
    }

    /// Returns a flag that stops the feeder when set. The flag is checked
    /// once per polling iteration, so a stop is noticed within one poll
    /// timeout.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Use the given flag to stop the feeder
    pub fn with_stop_handle(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Run the feeder until it is stopped or hits a fatal condition. The
    /// joystick is released and the board closed before this returns.
    pub fn run(mut self) -> Result<FeederStats, FeederError> {
        let mut driver = None;
        let result = self.run_until_shutdown(&mut driver);
        self.shutdown(driver, &result);
        result.map(|_| self.stats)
    }

    fn run_until_shutdown(
        &mut self,
        driver: &mut Option<Driver<T::Handle>>,
    ) -> Result<(), FeederError> {
        // Init
        log::info!("Feeder state: {}, checking virtual device subsystem", self.state);
        if !self.joystick.is_available() {
            return Err(FeederError::SubsystemUnavailable);
        }
        log::info!("Virtual device subsystem is available");

        // Discovering
        self.set_state(FeederState::Discovering);
        let vendor_id = self.config.device.vendor_id;
        let product_id = self.config.device.product_id;
        let device = hidraw::find(&mut self.transport, vendor_id, product_id)?;
        log::info!("Found IO4 board: {}", device.path_string());
        let driver = driver.insert(
            Driver::open(&self.transport, &device.path).map_err(FeederError::DeviceOpen)?,
        );

        // Acquiring
        self.set_state(FeederState::Acquiring);
        self.acquire()?;

        // Polling
        self.set_state(FeederState::Polling);
        self.poll(driver)
    }

    /// Check the joystick status and take ownership of it
    fn acquire(&mut self) -> Result<(), FeederError> {
        let id = self.config.joystick_id;
        let status = self.joystick.status(id);
        log::info!("Virtual joystick {id} is {status}");
        match status {
            SessionState::Free | SessionState::OwnedBySelf => (),
            SessionState::OwnedByOther => return Err(FeederError::DeviceOwnedByOther(id)),
            SessionState::Missing => return Err(FeederError::DeviceMissing(id)),
            SessionState::GeneralError => return Err(FeederError::GeneralSessionError(id)),
        }

        self.joystick
            .acquire(id)
            .map_err(|source| FeederError::AcquisitionFailure { id, source })?;
        log::info!("Acquired virtual joystick {id}");

        Ok(())
    }

    /// Read, decode and feed reports until stopped or a fatal error occurs
    fn poll(&mut self, driver: &mut Driver<T::Handle>) -> Result<(), FeederError> {
        let id = self.config.joystick_id;
        let timeout = self.config.poll_timeout();
        let pacing = self.config.pacing_interval();
        let mut update_failed = false;

        loop {
            if self.stop.load(Ordering::Relaxed) {
                log::info!("Stop requested");
                return Ok(());
            }

            let report = match driver.read_report(timeout).map_err(FeederError::TransportRead)? {
                ReadOutcome::Timeout => {
                    self.stats.timeouts += 1;
                    continue;
                }
                ReadOutcome::Data(bytes) => decode(bytes),
            };

            if let Some(report) = report {
                self.track_status(&report);
                let state = self.mapping.map(&report, id);
                match self.joystick.update(id, &state) {
                    Ok(()) => {
                        update_failed = false;
                        self.stats.reports += 1;
                    }
                    Err(source) if update_failed => {
                        return Err(FeederError::RepeatedUpdateFailure { id, source });
                    }
                    Err(e) => {
                        log::warn!("Feeding virtual joystick {id} failed: {e}. Trying to re-acquire.");
                        update_failed = true;
                        self.recover()?;
                    }
                }
            } else {
                log::trace!("Dropped frame that is not an input report");
                self.stats.dropped += 1;
            }

            if !pacing.is_zero() {
                thread::sleep(pacing);
            }
        }
    }

    /// Attempt exactly one re-acquire of the joystick
    fn recover(&mut self) -> Result<(), FeederError> {
        let id = self.config.joystick_id;
        self.set_state(FeederState::Recovering);
        self.stats.recoveries += 1;
        self.joystick
            .acquire(id)
            .map_err(|source| FeederError::ReacquisitionFailure { id, source })?;
        log::info!("Re-acquired virtual joystick {id}");
        self.set_state(FeederState::Polling);

        Ok(())
    }

    /// Log changes of the board's status bytes
    fn track_status(&mut self, report: &DecodedReport) {
        let status = (report.system_status, report.transport_status);
        if self.status == Some(status) {
            return;
        }
        log::debug!(
            "Board status changed: system {:#04x}, transport {:#04x}",
            status.0,
            status.1
        );
        self.status = Some(status);
    }

    /// Release the joystick and close the board
    fn shutdown(&mut self, driver: Option<Driver<T::Handle>>, result: &Result<(), FeederError>) {
        self.set_state(FeederState::Shutdown);
        let id = self.config.joystick_id;
        self.joystick.release(id);
        if let Some(driver) = driver {
            driver.close();
        }

        let stats = self.stats;
        log::info!(
            "Fed {} reports, dropped {} frames, {} timeouts, {} recoveries",
            stats.reports,
            stats.dropped,
            stats.timeouts,
            stats.recoveries
        );
        match result {
            Ok(()) => log::info!("Feeder stopped"),
            Err(e) => log::error!("Feeder stopped: {e}"),
        }
    }

    fn set_state(&mut self, state: FeederState) {
        log::info!("Feeder state: {} -> {}", self.state, state);
        self.state = state;
    }
}
