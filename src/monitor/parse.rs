//! Parser for the block-structured output of `ddcutil detect`.
//!
//! The text format is the wire contract with the external tool:
//!
//! ```text
//! Display 1
//!    I2C bus:  /dev/i2c-4
//!    EDID synopsis:
//!       Mfg id:               DEL
//!       Model:                DELL U3419W
//!       Serial number:        9B6SWP2
//! ```
//!
//! An `I2C bus:` line opens a display block; the nested EDID fields fill it
//! in. Fields a monitor does not report stay empty rather than failing the
//! enumeration. Format drift that leaves no block recognizable is a parse
//! error, not silently zero monitors.

use tracing::warn;

use super::DisplayRecord;
use crate::error::{BctlError, Result};

const BUS_PREFIX: &str = "I2C bus:";
const MFG_PREFIX: &str = "Mfg id:";
const MODEL_PREFIX: &str = "Model:";
const SERIAL_PREFIX: &str = "Serial number:";

/// Message ddcutil prints when it finds nothing; distinguishes a genuinely
/// empty desk from output we failed to understand.
const NO_DISPLAYS: &str = "No displays found";

/// Parse `ddcutil detect` output into display records.
///
/// # Errors
///
/// Fails with a detection-parse error when the output is non-empty, does
/// not report zero displays, and contains no recognizable display block.
pub fn parse_detect(output: &str) -> Result<Vec<DisplayRecord>> {
    let mut records = Vec::new();
    let mut current: Option<DisplayRecord> = None;

    for line in output.lines() {
        let line = line.trim();

        // An I2C bus line opens a new display block.
        if let Some(rest) = line.strip_prefix(BUS_PREFIX) {
            finish_block(&mut records, current.take());
            let bus = rest.trim();
            if bus.starts_with("/dev/i2c-") {
                current = Some(DisplayRecord {
                    bus: bus.to_string(),
                    manufacturer: String::new(),
                    model: String::new(),
                    serial: String::new(),
                });
            } else {
                warn!(line, "Skipping display block with unrecognized bus");
            }
            continue;
        }

        let Some(record) = current.as_mut() else {
            continue;
        };
        if let Some(value) = line.strip_prefix(MFG_PREFIX) {
            record.manufacturer = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(SERIAL_PREFIX) {
            record.serial = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix(MODEL_PREFIX) {
            record.model = value.trim().to_string();
        }
    }
    finish_block(&mut records, current.take());

    let trimmed = output.trim();
    if records.is_empty() && !trimmed.is_empty() && !trimmed.contains(NO_DISPLAYS) {
        return Err(BctlError::DetectionParse(
            "no display blocks recognized in detect output".to_string(),
        ));
    }
    Ok(records)
}

fn finish_block(records: &mut Vec<DisplayRecord>, block: Option<DisplayRecord>) {
    if let Some(record) = block {
        if record.manufacturer.is_empty() && record.model.is_empty() && record.serial.is_empty() {
            // A bus with no EDID fields at all is a phantom display
            // (ddcutil reports these for some DP MST hubs). Its identity
            // would collide with every other phantom, so drop the block.
            warn!(bus = %record.bus, "Skipping display block with no EDID fields");
        } else {
            records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DISPLAYS: &str = "\
Display 1
   I2C bus:  /dev/i2c-4
   DRM connector:           card1-DP-1
   EDID synopsis:
      Mfg id:               DEL
      Model:                DELL U3419W
      Product code:         41234
      Serial number:        9B6SWP2
      Binary serial number: 1128163925
      Manufacture year:     2019,  Week: 33
   VCP version:         2.1

Display 2
   I2C bus:  /dev/i2c-5
   EDID synopsis:
      Mfg id:               GSM
      Model:                LG HDR 4K
      Serial number:        0x01010101
   VCP version:         2.1
";

    #[test]
    fn parses_two_display_blocks() {
        let records = parse_detect(TWO_DISPLAYS).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].bus, "/dev/i2c-4");
        assert_eq!(records[0].manufacturer, "DEL");
        assert_eq!(records[0].model, "DELL U3419W");
        assert_eq!(records[0].serial, "9B6SWP2");
        assert_eq!(records[1].bus, "/dev/i2c-5");
        assert_eq!(records[1].manufacturer, "GSM");
    }

    #[test]
    fn preserves_detection_order() {
        let records = parse_detect(TWO_DISPLAYS).unwrap();
        assert_eq!(records[0].bus, "/dev/i2c-4");
        assert_eq!(records[1].bus, "/dev/i2c-5");
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let output = "\
Display 1
   I2C bus:  /dev/i2c-7
   EDID synopsis:
      Model:                NS-32D312
";
        let records = parse_detect(output).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].manufacturer, "");
        assert_eq!(records[0].model, "NS-32D312");
        assert_eq!(records[0].serial, "");
    }

    #[test]
    fn block_with_no_edid_fields_is_skipped() {
        let output = "\
Display 1
   I2C bus:  /dev/i2c-4
   EDID synopsis:
      Mfg id:               DEL
      Model:                U2720Q
      Serial number:        ABC123

Invalid display
   I2C bus:  /dev/i2c-9
";
        let records = parse_detect(output).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bus, "/dev/i2c-4");
    }

    #[test]
    fn empty_output_is_zero_displays() {
        assert!(parse_detect("").unwrap().is_empty());
        assert!(parse_detect("No displays found\n").unwrap().is_empty());
    }

    #[test]
    fn unrecognizable_output_is_a_parse_error() {
        let result = parse_detect("something entirely different\nanother line\n");
        assert!(matches!(result, Err(BctlError::DetectionParse(_))));
    }
}
