//! Step-by-step sensor construction.
//!
//! The builder collects raw values and validates all of them in
//! [`SensorBuilder::build`], so an out-of-range value is reported as a
//! construction error rather than a panic at the setter. Properties beyond
//! the base set go into a typed extension map and are checked at build time.

use std::collections::BTreeMap;

use serde_json::Value;
use strum::IntoEnumIterator;

use crate::descriptor::{I2cConfig, Interface, SensorDescriptor, SpiConfig, UartConfig};
use crate::driver::DriverTable;
use crate::error::ConstructionError;
use crate::kind::{InterfaceKind, MAX_BAUD_RATE, MAX_CS_VAL, MAX_I2C_ADDR, MIN_BAUD_RATE};
use crate::tracing::prelude::*;

/// Property names with a fixed meaning in every sensor spec.
pub const BASE_PROPERTIES: [&str; 4] = ["sensor_type", "bus_no", "dev_name", "alias"];

/// Clock speed extension, in Hz.
pub const CLK_SPEED: &str = "clk_speed";

/// Builder for a [`SensorDescriptor`].
#[derive(Debug, Clone)]
pub struct SensorBuilder {
    kind: InterfaceKind,
    bus: Option<Value>,
    secondary: Option<(&'static str, Value)>,
    device_name: Option<String>,
    alias: Option<String>,
    extensions: BTreeMap<String, Value>,
}

impl SensorBuilder {
    pub fn new(kind: InterfaceKind) -> Self {
        Self {
            kind,
            bus: None,
            secondary: None,
            device_name: None,
            alias: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Bus number (serial port number for UART).
    pub fn bus(self, bus: i64) -> Self {
        self.bus_value(Value::from(bus))
    }

    /// I2C device address.
    pub fn address(self, address: i64) -> Self {
        self.secondary_value("i2c_addr", Value::from(address))
    }

    /// SPI chip-select line.
    pub fn chip_select(self, chip_select: i64) -> Self {
        self.secondary_value("cs_no", Value::from(chip_select))
    }

    /// UART baud rate.
    pub fn baud_rate(self, baud_rate: i64) -> Self {
        self.secondary_value("baud_rate", Value::from(baud_rate))
    }

    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Attach a kind-specific extra property such as `clk_speed`.
    pub fn extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    pub(crate) fn bus_value(mut self, value: Value) -> Self {
        self.bus = Some(value);
        self
    }

    pub(crate) fn secondary_value(mut self, field: &'static str, value: Value) -> Self {
        self.secondary = Some((field, value));
        self
    }

    /// Validate the collected values and bind the kind's driver.
    pub fn build(self, drivers: &DriverTable) -> Result<SensorDescriptor, ConstructionError> {
        let interface = self.interface()?;
        check_extensions(self.kind, &self.extensions)?;

        let driver = drivers
            .get(self.kind)
            .cloned()
            .ok_or(ConstructionError::NoDriver(self.kind))?;

        Ok(SensorDescriptor::new(
            interface,
            self.device_name,
            self.alias,
            self.extensions,
            driver,
        ))
    }

    fn interface(&self) -> Result<Interface, ConstructionError> {
        let bus = self
            .bus
            .as_ref()
            .ok_or(ConstructionError::MissingField("bus_no"))?;
        let bus_no = bus
            .as_u64()
            .and_then(|b| u32::try_from(b).ok())
            .ok_or_else(|| ConstructionError::InvalidBusNumber(bus.to_string()))?;

        let expected = self.kind.secondary_field();
        let value = match &self.secondary {
            Some((field, value)) if *field == expected => value,
            Some((field, _)) => {
                return Err(ConstructionError::MalformedParams(format!(
                    "'{}' does not apply to {} sensors",
                    field, self.kind
                )))
            }
            None => return Err(ConstructionError::MissingField(expected)),
        };

        let interface = match self.kind {
            InterfaceKind::I2c => {
                let i2c_addr = in_range(value, 0, MAX_I2C_ADDR.into())
                    .ok_or_else(|| ConstructionError::InvalidAddress(value.to_string()))?;
                Interface::I2c(I2cConfig {
                    bus_no,
                    i2c_addr: i2c_addr as u8,
                })
            }
            InterfaceKind::Spi => {
                let cs_no = in_range(value, 0, MAX_CS_VAL.into())
                    .ok_or_else(|| ConstructionError::InvalidChipSelect(value.to_string()))?;
                Interface::Spi(SpiConfig {
                    bus_no,
                    cs_no: cs_no as u8,
                })
            }
            InterfaceKind::Uart => {
                let baud_rate = in_range(value, MIN_BAUD_RATE.into(), MAX_BAUD_RATE.into())
                    .ok_or_else(|| ConstructionError::InvalidBaudRate(value.to_string()))?;
                Interface::Uart(UartConfig {
                    bus_no,
                    baud_rate: baud_rate as u32,
                })
            }
        };
        Ok(interface)
    }
}

// Integer value within [min, max], inclusive.
fn in_range(value: &Value, min: i64, max: i64) -> Option<i64> {
    value.as_i64().filter(|v| (min..=max).contains(v))
}

fn check_extensions(
    kind: InterfaceKind,
    extensions: &BTreeMap<String, Value>,
) -> Result<(), ConstructionError> {
    for (name, value) in extensions {
        if BASE_PROPERTIES.contains(&name.as_str()) || name == kind.secondary_field() {
            return Err(ConstructionError::InvalidExtension {
                name: name.clone(),
                reason: "reserved property name".to_string(),
            });
        }
        if let Some(owner) = InterfaceKind::iter().find(|k| name == k.secondary_field()) {
            return Err(ConstructionError::InvalidExtension {
                name: name.clone(),
                reason: format!("{} property on a {} sensor", owner, kind),
            });
        }
        if name == CLK_SPEED {
            if !value.as_u64().is_some_and(|hz| hz > 0) {
                return Err(ConstructionError::InvalidExtension {
                    name: name.clone(),
                    reason: format!("expected positive integer (Hz), got {}", value),
                });
            }
        } else {
            warn!(
                kind = %kind,
                property = %name,
                "Property not known for sensor kind, extending sensor"
            );
        }
    }
    Ok(())
}
