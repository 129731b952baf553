//! Sensor descriptors: the registry's record of one configured sensor.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::driver::SensorDriver;
use crate::key::BusResourceKey;
use crate::kind::InterfaceKind;
use crate::readout::ReadResult;

/// Name used when a sensor has no device name or alias.
pub const UNNAMED: &str = "none";

/// I2C interface settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2cConfig {
    pub bus_no: u32,
    pub i2c_addr: u8,
}

/// SPI interface settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiConfig {
    pub bus_no: u32,
    pub cs_no: u8,
}

/// UART interface settings. `bus_no` is the serial port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UartConfig {
    pub bus_no: u32,
    pub baud_rate: u32,
}

/// Validated interface settings, one variant per [`InterfaceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "sensor_type", rename_all = "lowercase")]
pub enum Interface {
    I2c(I2cConfig),
    Spi(SpiConfig),
    Uart(UartConfig),
}

impl Interface {
    pub const fn kind(&self) -> InterfaceKind {
        match self {
            Interface::I2c(_) => InterfaceKind::I2c,
            Interface::Spi(_) => InterfaceKind::Spi,
            Interface::Uart(_) => InterfaceKind::Uart,
        }
    }

    pub const fn bus_no(&self) -> u32 {
        match *self {
            Interface::I2c(I2cConfig { bus_no, .. })
            | Interface::Spi(SpiConfig { bus_no, .. })
            | Interface::Uart(UartConfig { bus_no, .. }) => bus_no,
        }
    }

    /// The kind-specific value: I2C address, SPI chip select or UART baud
    /// rate.
    pub const fn secondary(&self) -> u32 {
        match *self {
            Interface::I2c(c) => c.i2c_addr as u32,
            Interface::Spi(c) => c.cs_no as u32,
            Interface::Uart(c) => c.baud_rate,
        }
    }

    pub const fn resource_key(&self) -> BusResourceKey {
        match *self {
            Interface::I2c(c) => BusResourceKey::I2c {
                bus: c.bus_no,
                address: c.i2c_addr,
            },
            Interface::Spi(c) => BusResourceKey::Spi {
                bus: c.bus_no,
                chip_select: c.cs_no,
            },
            Interface::Uart(c) => BusResourceKey::Uart { port: c.bus_no },
        }
    }
}

/// One configured sensor. Immutable once built.
#[derive(Clone)]
pub struct SensorDescriptor {
    interface: Interface,
    device_name: String,
    alias: String,
    extensions: BTreeMap<String, Value>,
    driver: Arc<dyn SensorDriver>,
}

impl SensorDescriptor {
    /// Assemble a descriptor from already-validated parts.
    ///
    /// Empty names fall back to [`UNNAMED`].
    pub(crate) fn new(
        interface: Interface,
        device_name: Option<String>,
        alias: Option<String>,
        extensions: BTreeMap<String, Value>,
        driver: Arc<dyn SensorDriver>,
    ) -> Self {
        let or_unnamed = |s: Option<String>| {
            s.filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNNAMED.to_string())
        };
        Self {
            interface,
            device_name: or_unnamed(device_name),
            alias: or_unnamed(alias),
            extensions,
            driver,
        }
    }

    pub fn kind(&self) -> InterfaceKind {
        self.interface.kind()
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn resource_key(&self) -> BusResourceKey {
        self.interface.resource_key()
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Kind-specific extra properties such as `clk_speed`.
    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Take a reading through the bound driver.
    pub fn read(&self) -> ReadResult {
        self.driver.read()
    }

    /// Multi-line property listing for this sensor.
    pub fn describe(&self) -> String {
        let kind = self.kind();
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}-sensor properties:", kind);
        let _ = writeln!(out, "---------------------");
        let _ = writeln!(out, "{}-interface no: {}", kind, self.interface.bus_no());
        let _ = writeln!(out, "{} connected device: {}", kind, self.device_name);
        let _ = writeln!(out, "{} sensor alias: {}", kind, self.alias);
        let _ = writeln!(out, "Bus-specific properties:");
        let _ = write!(
            out,
            "{}: {}",
            kind.secondary_label(),
            self.interface.secondary()
        );
        for (name, value) in &self.extensions {
            let _ = write!(out, "\nSensor property {} = {}", name, value);
        }
        out
    }
}

impl fmt::Debug for SensorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorDescriptor")
            .field("interface", &self.interface)
            .field("device_name", &self.device_name)
            .field("alias", &self.alias)
            .field("extensions", &self.extensions)
            .field("driver", &self.driver.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockI2cDriver, MockUartDriver};
    use serde_json::json;

    fn i2c_descriptor(device_name: Option<&str>, alias: Option<&str>) -> SensorDescriptor {
        SensorDescriptor::new(
            Interface::I2c(I2cConfig {
                bus_no: 2,
                i2c_addr: 78,
            }),
            device_name.map(String::from),
            alias.map(String::from),
            BTreeMap::new(),
            Arc::new(MockI2cDriver),
        )
    }

    #[test]
    fn test_names_default_to_none() {
        let desc = i2c_descriptor(None, Some(""));
        assert_eq!(desc.device_name(), "none");
        assert_eq!(desc.alias(), "none");
    }

    #[test]
    fn test_resource_key_per_interface() {
        assert_eq!(
            Interface::Spi(SpiConfig { bus_no: 1, cs_no: 3 }).resource_key(),
            BusResourceKey::Spi {
                bus: 1,
                chip_select: 3
            }
        );
        assert_eq!(
            Interface::Uart(UartConfig {
                bus_no: 4,
                baud_rate: 115_200
            })
            .resource_key(),
            BusResourceKey::Uart { port: 4 }
        );
    }

    #[test]
    fn test_describe_lists_properties() {
        let desc = i2c_descriptor(Some("BM280"), Some("RHT1"));
        assert_eq!(
            desc.describe(),
            "I2C-sensor properties:\n\
             ---------------------\n\
             I2C-interface no: 2\n\
             I2C connected device: BM280\n\
             I2C sensor alias: RHT1\n\
             Bus-specific properties:\n\
             I2C-address: 78"
        );
    }

    #[test]
    fn test_describe_includes_extensions() {
        let mut extensions = BTreeMap::new();
        extensions.insert("clk_speed".to_string(), json!(100_000));
        let desc = SensorDescriptor::new(
            Interface::Uart(UartConfig {
                bus_no: 4,
                baud_rate: 38_400,
            }),
            None,
            None,
            extensions,
            Arc::new(MockUartDriver),
        );
        let text = desc.describe();
        assert!(text.contains("UART baudrate: 38400"));
        assert!(text.ends_with("Sensor property clk_speed = 100000"));
        assert_eq!(desc.driver_name(), "mock-uart");
        assert_eq!(desc.read(), ReadResult::List(vec![3, 4, 5]));
    }

    #[test]
    fn test_read_uses_bound_driver() {
        let desc = i2c_descriptor(None, None);
        assert_eq!(desc.read(), ReadResult::Scalar(1.12345));
        assert_eq!(desc.driver_name(), "mock-i2c");
    }
}
