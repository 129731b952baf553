//! Sensor interface kinds and their parameter limits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Highest 7-bit I2C device address.
pub const MAX_I2C_ADDR: u8 = 127;

/// Highest SPI chip-select line number.
pub const MAX_CS_VAL: u8 = 7;

/// Slowest supported UART baud rate.
pub const MIN_BAUD_RATE: u32 = 2400;

/// Fastest supported UART baud rate.
pub const MAX_BAUD_RATE: u32 = 921_400;

/// The bus interface a sensor is attached through.
///
/// Parses case-insensitively from the lower-case tags used in sensor specs
/// (`"i2c"`, `"spi"`, `"uart"`) and displays upper-case.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    #[strum(to_string = "I2C", serialize = "i2c")]
    I2c,
    #[strum(to_string = "SPI", serialize = "spi")]
    Spi,
    #[strum(to_string = "UART", serialize = "uart")]
    Uart,
}

impl InterfaceKind {
    /// Name of the kind-specific required field in keyed sensor specs.
    pub const fn secondary_field(self) -> &'static str {
        match self {
            InterfaceKind::I2c => "i2c_addr",
            InterfaceKind::Spi => "cs_no",
            InterfaceKind::Uart => "baud_rate",
        }
    }

    /// Human-readable name of the kind-specific property.
    pub const fn secondary_label(self) -> &'static str {
        match self {
            InterfaceKind::I2c => "I2C-address",
            InterfaceKind::Spi => "SPI ChipSelect-num",
            InterfaceKind::Uart => "UART baudrate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test_case("i2c", InterfaceKind::I2c)]
    #[test_case("I2C", InterfaceKind::I2c)]
    #[test_case("spi", InterfaceKind::Spi)]
    #[test_case("Uart", InterfaceKind::Uart)]
    fn test_parse_kind(tag: &str, expected: InterfaceKind) {
        assert_eq!(InterfaceKind::from_str(tag).unwrap(), expected);
    }

    #[test]
    fn test_unknown_kind_does_not_parse() {
        assert!(InterfaceKind::from_str("can").is_err());
        assert!(InterfaceKind::from_str("").is_err());
    }

    #[test]
    fn test_display_is_upper_case() {
        assert_eq!(InterfaceKind::I2c.to_string(), "I2C");
        assert_eq!(InterfaceKind::Spi.to_string(), "SPI");
        assert_eq!(InterfaceKind::Uart.to_string(), "UART");
    }

    #[test]
    fn test_iterates_all_kinds() {
        let kinds: Vec<_> = InterfaceKind::iter().collect();
        assert_eq!(
            kinds,
            [InterfaceKind::I2c, InterfaceKind::Spi, InterfaceKind::Uart]
        );
    }

    #[test]
    fn test_serde_uses_lower_case_tags() {
        let json = serde_json::to_string(&InterfaceKind::Spi).unwrap();
        assert_eq!(json, "\"spi\"");
        let kind: InterfaceKind = serde_json::from_str("\"uart\"").unwrap();
        assert_eq!(kind, InterfaceKind::Uart);
    }
}
