//! Sensor driver collaborators.
//!
//! A driver is the read capability bound to every descriptor of one interface
//! kind. Drivers may also carry a one-time configuration step, invoked when a
//! sensor is accepted into a registry. The [`DriverTable`] is the typed
//! dispatch table a registry uses to pick the driver for a kind.
//!
//! The built-in drivers are mocks returning fixed placeholder data; they
//! register themselves with `inventory` so [`DriverTable::builtin`] can find
//! them without a hand-maintained list.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::DriverError;
use crate::kind::InterfaceKind;
use crate::readout::ReadResult;
use crate::tracing::prelude::*;

/// Read capability for one interface kind.
pub trait SensorDriver: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Prepare the device at `bus`/`secondary` (address, chip select or
    /// baud rate). Drivers without a configuration step keep the default.
    fn configure(&self, _bus: u32, _secondary: u32) -> Result<(), DriverError> {
        Ok(())
    }

    /// Take a reading.
    fn read(&self) -> ReadResult;
}

impl fmt::Debug for dyn SensorDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorDriver")
            .field("name", &self.name())
            .finish()
    }
}

/// Static registration record for a built-in driver.
pub struct DriverDescriptor {
    pub kind: InterfaceKind,
    pub name: &'static str,
    pub create_fn: fn() -> Arc<dyn SensorDriver>,
}

inventory::collect!(DriverDescriptor);

/// Maps each interface kind to the driver bound for it.
#[derive(Clone, Default)]
pub struct DriverTable {
    drivers: HashMap<InterfaceKind, Arc<dyn SensorDriver>>,
}

impl DriverTable {
    /// A table with no drivers bound.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A table holding every driver registered through `inventory`.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for desc in inventory::iter::<DriverDescriptor>() {
            trace!(kind = %desc.kind, driver = desc.name, "Binding built-in driver");
            table.register(desc.kind, (desc.create_fn)());
        }
        table
    }

    /// Bind `driver` to `kind`, replacing any driver bound before.
    pub fn register(&mut self, kind: InterfaceKind, driver: Arc<dyn SensorDriver>) {
        if let Some(old) = self.drivers.insert(kind, driver) {
            debug!(kind = %kind, replaced = old.name(), "Driver rebound");
        }
    }

    pub fn get(&self, kind: InterfaceKind) -> Option<&Arc<dyn SensorDriver>> {
        self.drivers.get(&kind)
    }
}

impl fmt::Debug for DriverTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .drivers
            .iter()
            .map(|(kind, driver)| (*kind, driver.name()))
            .collect();
        names.sort();
        f.debug_struct("DriverTable").field("drivers", &names).finish()
    }
}

/// Mock I2C driver returning a single scalar reading.
#[derive(Debug, Default)]
pub struct MockI2cDriver;

impl SensorDriver for MockI2cDriver {
    fn name(&self) -> &'static str {
        "mock-i2c"
    }

    fn configure(&self, bus: u32, address: u32) -> Result<(), DriverError> {
        debug!(bus, address, "MOCK: configuring I2C sensor");
        Ok(())
    }

    fn read(&self) -> ReadResult {
        trace!("MOCK: getting I2C sensor value");
        ReadResult::Scalar(1.12345)
    }
}

/// Mock SPI driver returning a structured reading.
#[derive(Debug, Default)]
pub struct MockSpiDriver;

impl SensorDriver for MockSpiDriver {
    fn name(&self) -> &'static str {
        "mock-spi"
    }

    fn configure(&self, bus: u32, chip_select: u32) -> Result<(), DriverError> {
        debug!(bus, chip_select, "MOCK: configuring SPI sensor");
        Ok(())
    }

    fn read(&self) -> ReadResult {
        trace!("MOCK: getting SPI sensor value");
        ReadResult::Structured {
            triggered: true,
            channel: 7,
            value: 8.765,
        }
    }
}

/// Mock UART driver returning a list of readings. Has no configuration
/// step.
#[derive(Debug, Default)]
pub struct MockUartDriver;

impl SensorDriver for MockUartDriver {
    fn name(&self) -> &'static str {
        "mock-uart"
    }

    fn read(&self) -> ReadResult {
        trace!("MOCK: getting UART sensor value");
        ReadResult::List(vec![3, 4, 5])
    }
}

fn create_mock_i2c() -> Arc<dyn SensorDriver> {
    Arc::new(MockI2cDriver)
}

fn create_mock_spi() -> Arc<dyn SensorDriver> {
    Arc::new(MockSpiDriver)
}

fn create_mock_uart() -> Arc<dyn SensorDriver> {
    Arc::new(MockUartDriver)
}

inventory::submit! {
    DriverDescriptor {
        kind: InterfaceKind::I2c,
        name: "mock-i2c",
        create_fn: create_mock_i2c,
    }
}

inventory::submit! {
    DriverDescriptor {
        kind: InterfaceKind::Spi,
        name: "mock-spi",
        create_fn: create_mock_spi,
    }
}

inventory::submit! {
    DriverDescriptor {
        kind: InterfaceKind::Uart,
        name: "mock-uart",
        create_fn: create_mock_uart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_builtin_table_covers_every_kind() {
        let table = DriverTable::builtin();
        for kind in InterfaceKind::iter() {
            assert!(table.get(kind).is_some(), "no driver for {kind}");
        }
    }

    #[test]
    fn test_mock_readings() {
        let table = DriverTable::builtin();
        let read = |kind| table.get(kind).unwrap().read();

        assert_eq!(read(InterfaceKind::I2c), ReadResult::Scalar(1.12345));
        assert_eq!(read(InterfaceKind::Uart), ReadResult::List(vec![3, 4, 5]));
        assert_eq!(
            read(InterfaceKind::Spi),
            ReadResult::Structured {
                triggered: true,
                channel: 7,
                value: 8.765
            }
        );
    }

    #[test]
    fn test_uart_configure_is_noop() {
        assert_eq!(MockUartDriver.configure(4, 115_200), Ok(()));
    }

    #[test]
    fn test_register_replaces_driver() {
        struct Fixed;
        impl SensorDriver for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }
            fn read(&self) -> ReadResult {
                ReadResult::Scalar(42.0)
            }
        }

        let mut table = DriverTable::builtin();
        table.register(InterfaceKind::I2c, Arc::new(Fixed));
        let driver = table.get(InterfaceKind::I2c).unwrap();
        assert_eq!(driver.name(), "fixed");
        assert_eq!(driver.read(), ReadResult::Scalar(42.0));
    }

    #[test]
    fn test_empty_table_has_no_drivers() {
        let table = DriverTable::empty();
        assert!(InterfaceKind::iter().all(|kind| table.get(kind).is_none()));
    }
}
