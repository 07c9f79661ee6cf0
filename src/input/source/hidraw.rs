use std::{
    ffi::{CStr, CString},
    time::Duration,
};

use hidapi::{DeviceInfo, HidApi, HidDevice, HidError};
use thiserror::Error;

/// Possible errors from the hidraw transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("hidapi error: {0}")]
    Hid(#[from] HidError),
    #[error("{0}")]
    Other(String),
}

/// Possible errors when locating a hidraw device
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("no device found with VID: {vendor_id:04x}, PID: {product_id:04x}")]
    NotFound { vendor_id: u16, product_id: u16 },
    #[error("unable to enumerate hidraw devices: {0}")]
    Discovery(#[from] TransportError),
}

/// Identifies a candidate hidraw interface as reported by enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub path: CString,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl DeviceDescriptor {
    /// Returns the device path as a lossy string (e.g. /dev/hidraw0)
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// Returns true if the enumerated identity matches the given IDs
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl From<&DeviceInfo> for DeviceDescriptor {
    fn from(info: &DeviceInfo) -> Self {
        Self {
            path: info.path().to_owned(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            manufacturer: info.manufacturer_string().map(String::from),
            product: info.product_string().map(String::from),
        }
    }
}

/// An open hidraw device. Dropping the handle closes the device.
pub trait HidHandle {
    /// Query the vendor and product id of the opened device
    fn identity(&self) -> Result<(u16, u16), TransportError>;
    /// Read a single input report, waiting at most `timeout`. Returns the
    /// number of bytes read, or 0 if nothing arrived in time.
    fn read_bounded(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;
}

/// The operating system's hidraw enumeration and open surface
pub trait HidTransport {
    type Handle: HidHandle;

    /// Returns all currently present hidraw interfaces. Order is whatever the
    /// platform provides.
    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, TransportError>;
    /// Open the device at the given path in shared read/write mode
    fn open(&self, path: &CStr) -> Result<Self::Handle, TransportError>;
}

/// [HidTransport] implementation backed by hidapi. The hidapi context is
/// created on first enumeration so a broken hidraw subsystem surfaces as an
/// enumeration error.
#[derive(Default)]
pub struct HidApiTransport {
    api: Option<HidApi>,
}

impl HidApiTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for HidApiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidApiTransport")
            .field("initialized", &self.api.is_some())
            .finish()
    }
}

impl HidTransport for HidApiTransport {
    type Handle = HidDevice;

    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        match self.api.as_mut() {
            Some(api) => api.refresh_devices()?,
            None => self.api = Some(HidApi::new()?),
        }
        let devices = self
            .api
            .iter()
            .flat_map(|api| api.device_list())
            .map(DeviceDescriptor::from)
            .collect();
        Ok(devices)
    }

    fn open(&self, path: &CStr) -> Result<Self::Handle, TransportError> {
        let Some(api) = self.api.as_ref() else {
            return Err(TransportError::Other("hidapi is not initialized".into()));
        };
        let device = api.open_path(path)?;
        Ok(device)
    }
}

impl HidHandle for HidDevice {
    fn identity(&self) -> Result<(u16, u16), TransportError> {
        let info = self.get_device_info()?;
        Ok((info.vendor_id(), info.product_id()))
    }

    fn read_bounded(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let bytes_read = self.read_timeout(buf, timeout_ms)?;
        Ok(bytes_read)
    }
}

/// Returns an array of all hidraw devices
pub fn list_devices<T: HidTransport>(transport: &mut T) -> Result<Vec<DeviceDescriptor>, TransportError> {
    transport.enumerate()
}

/// Find the path of the first hidraw device whose queried identity matches
/// the given vendor and product id. Each candidate is opened briefly to ask
/// the device itself for its identity and is closed again before moving on.
pub fn find<T: HidTransport>(
    transport: &mut T,
    vendor_id: u16,
    product_id: u16,
) -> Result<DeviceDescriptor, LocateError> {
    let candidates = transport.enumerate()?;
    log::debug!("Probing {} hidraw interfaces", candidates.len());

    for candidate in candidates {
        let path = candidate.path_string();
        let device = match transport.open(&candidate.path) {
            Ok(device) => device,
            Err(e) => {
                log::trace!("Unable to open {path}: {e}");
                continue;
            }
        };

        let identity = device.identity();
        // Close the probe handle before deciding anything
        drop(device);

        match identity {
            Ok((vid, pid)) if vid == vendor_id && pid == product_id => {
                log::debug!("Found matching device at {path}");
                return Ok(candidate);
            }
            Ok((vid, pid)) => {
                log::trace!("Skipping {path} with VID: {vid:04x}, PID: {pid:04x}");
            }
            Err(e) => {
                log::trace!("Unable to query attributes of {path}: {e}");
            }
        }
    }

    Err(LocateError::NotFound {
        vendor_id,
        product_id,
    })
}
