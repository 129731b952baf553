//! Registry of bus-attached sensors.
//!
//! Sensors on I2C, SPI and UART interfaces are described by a
//! [`SensorDescriptor`] and collected in a [`Registry`], which refuses any
//! sensor that would occupy a bus resource (I2C address, SPI chip select,
//! serial port) already taken by a sensor of the same kind. Each descriptor
//! carries the read capability of its kind's driver; readings come back as a
//! [`ReadResult`] and are rendered by the readout dispatcher.

pub mod builder;
pub mod config;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod key;
pub mod kind;
pub mod params;
pub mod readout;
pub mod registry;
pub mod schema;
pub mod shared;
pub mod tracing;

pub use builder::SensorBuilder;
pub use config::{Config, RegistrySettings};
pub use descriptor::{Interface, SensorDescriptor};
pub use driver::{DriverTable, SensorDriver};
pub use error::{AddError, ConstructionError, Error, ReadoutError, Result, SchemaError};
pub use key::BusResourceKey;
pub use kind::InterfaceKind;
pub use params::RawParams;
pub use readout::{describe_readout, dispatch_value, ReadResult};
pub use registry::Registry;
pub use shared::SharedRegistry;
