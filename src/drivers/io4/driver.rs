use std::{ffi::CStr, time::Duration};

use crate::input::source::hidraw::{HidHandle, HidTransport, TransportError};

use super::hid_report::REPORT_SIZE;

/// Outcome of a single bounded read
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome<'a> {
    /// A report arrived. The slice holds exactly the bytes that were read.
    Data(&'a [u8]),
    /// Nothing arrived within the timeout; poll again.
    Timeout,
}

/// Report reader for an opened IO4 board. Dropping the driver closes the
/// underlying hidraw handle.
pub struct Driver<H: HidHandle> {
    /// HIDRAW device instance
    device: H,
    /// Report buffer reused for every read
    buf: [u8; REPORT_SIZE],
}

impl<H: HidHandle> Driver<H> {
    /// Open the IO4 board at the given path
    pub fn open<T>(transport: &T, path: &CStr) -> Result<Self, TransportError>
    where
        T: HidTransport<Handle = H>,
    {
        let device = transport.open(path)?;
        Ok(Self::from_handle(device))
    }

    /// Wrap an already opened device handle
    pub fn from_handle(device: H) -> Self {
        Self {
            device,
            buf: [0; REPORT_SIZE],
        }
    }

    /// Issue one read and wait at most `timeout` for it to complete. Each call
    /// either completes or times out before returning, so no read is ever left
    /// outstanding between calls.
    pub fn read_report(&mut self, timeout: Duration) -> Result<ReadOutcome<'_>, TransportError> {
        let bytes_read = self.device.read_bounded(&mut self.buf[..], timeout)?;
        if bytes_read == 0 {
            return Ok(ReadOutcome::Timeout);
        }
        log::trace!("Got report of {bytes_read} bytes, report ID: {}", self.buf[0]);

        Ok(ReadOutcome::Data(&self.buf[..bytes_read]))
    }

    /// Close the device
    pub fn close(self) {
        drop(self.device);
    }
}
