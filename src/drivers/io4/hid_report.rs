//! Input report layout of the Sega IO4 board.
//!
//! The board emits a single 64 byte input report. All multi-byte fields are
//! little endian 16-bit integers at fixed offsets.
use packed_struct::prelude::*;
use packed_struct::types::SizedInteger;

/// Size of an IO4 input report in bytes
pub const REPORT_SIZE: usize = 64;

/// Number of analog (ADC) channels
pub const ANALOG_COUNT: usize = 8;
/// Number of rotary spinner channels
pub const SPINNER_COUNT: usize = 4;
/// Number of coin chute counters
pub const CHUTE_COUNT: usize = 2;
/// Number of 16-button bitfields
pub const BUTTON_FIELD_COUNT: usize = 2;

/// Different report types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportType {
    InputData = 0x01,
}

impl ReportType {
    pub fn to_u8(&self) -> u8 {
        match self {
            ReportType::InputData => ReportType::InputData as u8,
        }
    }
}

// InputData
//
// # ReportID: 1 | ADC 0-7 | Spinner 0-3 | Chute 0-1 | Buttons 0-1 | System | USB | Reserved
// 01 00 80 00 80 ff ff 00 00 00 00 00 00 00 00 00 00 ...
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "64")]
pub struct PackedInputDataReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8, // Report ID (always 0x01)

    // bytes 1-16
    #[packed_field(bytes = "1..=2", endian = "lsb")]
    pub analog_0: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "3..=4", endian = "lsb")]
    pub analog_1: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "5..=6", endian = "lsb")]
    pub analog_2: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "7..=8", endian = "lsb")]
    pub analog_3: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "9..=10", endian = "lsb")]
    pub analog_4: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "11..=12", endian = "lsb")]
    pub analog_5: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "13..=14", endian = "lsb")]
    pub analog_6: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "15..=16", endian = "lsb")]
    pub analog_7: Integer<u16, packed_bits::Bits<16>>,

    // bytes 17-24
    #[packed_field(bytes = "17..=18", endian = "lsb")]
    pub spinner_0: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "19..=20", endian = "lsb")]
    pub spinner_1: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "21..=22", endian = "lsb")]
    pub spinner_2: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "23..=24", endian = "lsb")]
    pub spinner_3: Integer<u16, packed_bits::Bits<16>>,

    // bytes 25-28
    #[packed_field(bytes = "25..=26", endian = "lsb")]
    pub chute_0: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "27..=28", endian = "lsb")]
    pub chute_1: Integer<u16, packed_bits::Bits<16>>,

    // bytes 29-32
    #[packed_field(bytes = "29..=30", endian = "lsb")]
    pub buttons_0: Integer<u16, packed_bits::Bits<16>>, // Buttons 1-16
    #[packed_field(bytes = "31..=32", endian = "lsb")]
    pub buttons_1: Integer<u16, packed_bits::Bits<16>>, // Buttons 17-32

    // byte 33
    #[packed_field(bytes = "33")]
    pub system_status: u8,
    // byte 34
    #[packed_field(bytes = "34")]
    pub usb_status: u8,

    // bytes 35-63
    #[packed_field(bytes = "35..=63")]
    pub reserved: [u8; 29],
}

impl Default for PackedInputDataReport {
    fn default() -> Self {
        Self {
            report_id: ReportType::InputData.to_u8(),
            analog_0: Integer::from_primitive(0),
            analog_1: Integer::from_primitive(0),
            analog_2: Integer::from_primitive(0),
            analog_3: Integer::from_primitive(0),
            analog_4: Integer::from_primitive(0),
            analog_5: Integer::from_primitive(0),
            analog_6: Integer::from_primitive(0),
            analog_7: Integer::from_primitive(0),
            spinner_0: Integer::from_primitive(0),
            spinner_1: Integer::from_primitive(0),
            spinner_2: Integer::from_primitive(0),
            spinner_3: Integer::from_primitive(0),
            chute_0: Integer::from_primitive(0),
            chute_1: Integer::from_primitive(0),
            buttons_0: Integer::from_primitive(0),
            buttons_1: Integer::from_primitive(0),
            system_status: 0,
            usb_status: 0,
            reserved: [0; 29],
        }
    }
}

/// Decoded IO4 input report. Raw 16-bit values are carried through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodedReport {
    pub analog: [u16; ANALOG_COUNT],
    pub spinners: [u16; SPINNER_COUNT],
    /// Coin chute counters. Not used by the joystick mapping.
    pub chutes: [u16; CHUTE_COUNT],
    pub buttons: [u16; BUTTON_FIELD_COUNT],
    pub system_status: u8,
    pub transport_status: u8,
    pub reserved: [u8; 29],
}

impl From<PackedInputDataReport> for DecodedReport {
    fn from(report: PackedInputDataReport) -> Self {
        Self {
            analog: [
                report.analog_0.to_primitive(),
                report.analog_1.to_primitive(),
                report.analog_2.to_primitive(),
                report.analog_3.to_primitive(),
                report.analog_4.to_primitive(),
                report.analog_5.to_primitive(),
                report.analog_6.to_primitive(),
                report.analog_7.to_primitive(),
            ],
            spinners: [
                report.spinner_0.to_primitive(),
                report.spinner_1.to_primitive(),
                report.spinner_2.to_primitive(),
                report.spinner_3.to_primitive(),
            ],
            chutes: [report.chute_0.to_primitive(), report.chute_1.to_primitive()],
            buttons: [
                report.buttons_0.to_primitive(),
                report.buttons_1.to_primitive(),
            ],
            system_status: report.system_status,
            transport_status: report.usb_status,
            reserved: report.reserved,
        }
    }
}

/// Decode the given buffer as an IO4 input report. Returns [None] if the
/// buffer is not exactly [REPORT_SIZE] bytes long or does not carry the
/// input data report ID. The board emits other frames too, so this is not
/// treated as an error.
pub fn decode(bytes: &[u8]) -> Option<DecodedReport> {
    let buf: &[u8; REPORT_SIZE] = bytes.try_into().ok()?;
    if buf[0] != ReportType::InputData.to_u8() {
        return None;
    }

    match PackedInputDataReport::unpack(buf) {
        Ok(report) => Some(report.into()),
        Err(e) => {
            log::trace!("Unable to unpack input report: {e:?}");
            None
        }
    }
}
