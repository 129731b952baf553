//! Bus resource keys: the physical slot a sensor occupies on its interface.

use std::fmt;

use serde::Serialize;

use crate::kind::InterfaceKind;

/// Identifies the bus resource a sensor occupies.
///
/// Baud rate is a device property, not part of the UART key: one device per
/// serial port regardless of speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BusResourceKey {
    I2c { bus: u32, address: u8 },
    Spi { bus: u32, chip_select: u8 },
    Uart { port: u32 },
}

impl BusResourceKey {
    pub const fn kind(&self) -> InterfaceKind {
        match self {
            BusResourceKey::I2c { .. } => InterfaceKind::I2c,
            BusResourceKey::Spi { .. } => InterfaceKind::Spi,
            BusResourceKey::Uart { .. } => InterfaceKind::Uart,
        }
    }

    /// Bus (or serial port) number.
    pub const fn bus(&self) -> u32 {
        match *self {
            BusResourceKey::I2c { bus, .. } | BusResourceKey::Spi { bus, .. } => bus,
            BusResourceKey::Uart { port } => port,
        }
    }

    /// Whether a sensor at `self` would occupy the same resource as one
    /// already at `other`.
    ///
    /// Keys of different kinds never collide. I2C devices collide on address
    /// alone, SPI devices on bus and chip select, UART devices on port.
    pub fn collides_with(&self, other: &BusResourceKey) -> bool {
        match (self, other) {
            (BusResourceKey::I2c { address: a, .. }, BusResourceKey::I2c { address: b, .. }) => {
                a == b
            }
            (
                BusResourceKey::Spi {
                    bus: bus_a,
                    chip_select: cs_a,
                },
                BusResourceKey::Spi {
                    bus: bus_b,
                    chip_select: cs_b,
                },
            ) => bus_a == bus_b && cs_a == cs_b,
            (BusResourceKey::Uart { port: a }, BusResourceKey::Uart { port: b }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for BusResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusResourceKey::I2c { bus, address } => {
                write!(f, "bus {} address 0x{:02X}", bus, address)
            }
            BusResourceKey::Spi { bus, chip_select } => {
                write!(f, "bus {} CS {}", bus, chip_select)
            }
            BusResourceKey::Uart { port } => write!(f, "serial port {}", port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i2c_collides_on_address() {
        let a = BusResourceKey::I2c { bus: 2, address: 78 };
        assert!(a.collides_with(&BusResourceKey::I2c { bus: 2, address: 78 }));
        // Address alone decides for I2C
        assert!(a.collides_with(&BusResourceKey::I2c { bus: 3, address: 78 }));
        assert!(!a.collides_with(&BusResourceKey::I2c { bus: 2, address: 77 }));
    }

    #[test]
    fn test_spi_collides_on_bus_and_chip_select() {
        let a = BusResourceKey::Spi { bus: 1, chip_select: 3 };
        assert!(a.collides_with(&BusResourceKey::Spi { bus: 1, chip_select: 3 }));
        assert!(!a.collides_with(&BusResourceKey::Spi { bus: 1, chip_select: 4 }));
        assert!(!a.collides_with(&BusResourceKey::Spi { bus: 2, chip_select: 3 }));
    }

    #[test]
    fn test_uart_collides_on_port() {
        let a = BusResourceKey::Uart { port: 4 };
        assert!(a.collides_with(&BusResourceKey::Uart { port: 4 }));
        assert!(!a.collides_with(&BusResourceKey::Uart { port: 5 }));
    }

    #[test]
    fn test_different_kinds_never_collide() {
        let i2c = BusResourceKey::I2c { bus: 1, address: 3 };
        let spi = BusResourceKey::Spi { bus: 1, chip_select: 3 };
        let uart = BusResourceKey::Uart { port: 1 };
        assert!(!i2c.collides_with(&spi));
        assert!(!spi.collides_with(&uart));
        assert!(!uart.collides_with(&i2c));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BusResourceKey::I2c { bus: 2, address: 0x4E }.to_string(),
            "bus 2 address 0x4E"
        );
        assert_eq!(
            BusResourceKey::Spi { bus: 1, chip_select: 3 }.to_string(),
            "bus 1 CS 3"
        );
        assert_eq!(BusResourceKey::Uart { port: 4 }.to_string(), "serial port 4");
    }
}
