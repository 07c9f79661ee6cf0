use std::{
    error::Error,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{
    config::FeederConfig,
    drivers::io4::{
        driver::{Driver, ReadOutcome},
        hid_report::{decode, DecodedReport},
    },
    input::{
        mapping::button_mask,
        source::hidraw::{self, HidApiTransport},
    },
};

/// Counters for a monitor session
#[derive(Debug, Default)]
struct MonitorStats {
    decoded: u64,
    dropped: u64,
}

/// Print every decoded report from the board until Ctrl+C or until `count`
/// reports have been printed
pub async fn handle_monitor(
    config: FeederConfig,
    count: Option<u64>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let stop = Arc::new(AtomicBool::new(false));
    let ctrl_c_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_stop.store(true, Ordering::Relaxed);
        }
    });

    let stats = tokio::task::spawn_blocking(move || monitor(config, count, stop)).await??;
    println!(
        "Decoded {} report(s), dropped {} frame(s)",
        stats.decoded, stats.dropped
    );

    Ok(())
}

fn monitor(
    config: FeederConfig,
    count: Option<u64>,
    stop: Arc<AtomicBool>,
) -> Result<MonitorStats, Box<dyn Error + Send + Sync>> {
    let mut transport = HidApiTransport::new();
    let device = hidraw::find(
        &mut transport,
        config.device.vendor_id,
        config.device.product_id,
    )?;
    log::info!("Monitoring IO4 board: {}", device.path_string());
    let mut driver = Driver::open(&transport, &device.path)?;

    let timeout = config.poll_timeout();
    let mut stats = MonitorStats::default();
    while !stop.load(Ordering::Relaxed) {
        if count.is_some_and(|count| stats.decoded >= count) {
            break;
        }
        let bytes = match driver.read_report(timeout)? {
            ReadOutcome::Timeout => continue,
            ReadOutcome::Data(bytes) => bytes,
        };
        let Some(report) = decode(bytes) else {
            log::debug!(
                "Dropped frame of {} bytes with report ID {:#04x}",
                bytes.len(),
                bytes.first().copied().unwrap_or_default()
            );
            stats.dropped += 1;
            continue;
        };
        stats.decoded += 1;
        println!("{}", format_report(&report));
        log::trace!("Reserved bytes: {:02x?}", report.reserved);
    }
    driver.close();

    Ok(stats)
}

/// Format a decoded report as a single line
fn format_report(report: &DecodedReport) -> String {
    format!(
        "adc: {:?} spinner: {:?} chute: {:?} buttons: {:#010x} system: {:#04x} usb: {:#04x}",
        report.analog,
        report.spinners,
        report.chutes,
        button_mask(report),
        report.system_status,
        report.transport_status
    )
}

#[cfg(test)]
mod tests {
    use crate::drivers::io4::hid_report::DecodedReport;

    use super::format_report;

    #[test]
    fn test_format_report() {
        let report = DecodedReport {
            analog: [1, 2, 3, 4, 5, 6, 7, 8],
            buttons: [0x0003, 0x0001],
            system_status: 0x02,
            ..Default::default()
        };
        let line = format_report(&report);
        assert!(line.starts_with("adc: [1, 2, 3, 4, 5, 6, 7, 8]"));
        assert!(line.contains("buttons: 0x00010003"));
        assert!(line.contains("system: 0x02"));
    }
}
