use std::error::Error;

use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};

use crate::{
    config::FeederConfig,
    input::source::hidraw::{list_devices, DeviceDescriptor, HidApiTransport},
};

#[derive(Tabled)]
struct HidrawDeviceRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "VID")]
    vendor_id: String,
    #[tabled(rename = "PID")]
    product_id: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Target")]
    target: String,
}

impl HidrawDeviceRow {
    fn new(device: DeviceDescriptor, config: &FeederConfig) -> Self {
        let is_target = device.matches(config.device.vendor_id, config.device.product_id);
        Self {
            path: device.path_string(),
            vendor_id: format!("{:04x}", device.vendor_id),
            product_id: format!("{:04x}", device.product_id),
            manufacturer: device.manufacturer.unwrap_or_default(),
            product: device.product.unwrap_or_default(),
            target: if is_target { "*".to_string() } else { String::new() },
        }
    }
}

/// List all hidraw devices, marking the ones matching the configured board
pub async fn handle_devices(config: FeederConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut transport = HidApiTransport::new();
    let mut devices = list_devices(&mut transport)?;
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    let count = devices.len();

    let rows: Vec<HidrawDeviceRow> = devices
        .into_iter()
        .map(|device| HidrawDeviceRow::new(device, &config))
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Hidraw Devices"));
    println!("{table}");
    println!("Found {count} hidraw device(s)");

    Ok(())
}
