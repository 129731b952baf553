//! Common error types for sensor-registry.
//!
//! Each failure family has its own thiserror enum so callers can match on
//! exactly the reasons an operation can fail. The crate-wide [`Error`] wraps
//! them all, with conversions from the underlying error types.

use thiserror::Error;

use crate::key::BusResourceKey;
use crate::kind::InterfaceKind;

/// Failure to build a sensor descriptor from raw parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("invalid I2C address {0} (expected integer in 0..=127)")]
    InvalidAddress(String),

    #[error("invalid SPI chip select {0} (expected integer in 0..=7)")]
    InvalidChipSelect(String),

    #[error("invalid UART baud rate {0} (expected integer in 2400..=921400)")]
    InvalidBaudRate(String),

    #[error("invalid bus number {0} (expected non-negative integer)")]
    InvalidBusNumber(String),

    #[error("unknown sensor kind '{0}'")]
    UnknownSensorKind(String),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid extension property '{name}': {reason}")]
    InvalidExtension { name: String, reason: String },

    #[error("malformed parameters: {0}")]
    MalformedParams(String),

    #[error("no driver bound for {0} sensors")]
    NoDriver(InterfaceKind),
}

/// A single field-level failure found at the schema boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("missing required property '{0}'")]
    MissingField(String),

    #[error("property '{0}' has wrong type (expected {1})")]
    WrongType(String, &'static str),

    #[error("sensor spec is not a JSON object")]
    NotAnObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// Every field-level failure found while checking one input.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", join_errors(.0))]
pub struct SchemaErrors(pub Vec<SchemaError>);

impl SchemaErrors {
    /// Field-level failures in the order they were found.
    pub fn errors(&self) -> &[SchemaError] {
        &self.0
    }
}

fn join_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure reported by a sensor driver collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    #[error("failed to configure {kind} sensor on bus {bus}: {reason}")]
    Configure {
        kind: InterfaceKind,
        bus: u32,
        reason: String,
    },
}

/// Reasons a registry refuses a sensor. The registry is unchanged in every
/// case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddError {
    #[error("sensor construction failed: {0}")]
    ConstructionFailed(#[from] ConstructionError),

    #[error("sensor spec rejected: {0}")]
    SchemaRejected(#[from] SchemaErrors),

    #[error("{kind} resource {key} already in use")]
    ResourceConflict {
        kind: InterfaceKind,
        key: BusResourceKey,
    },

    #[error("alias '{0}' already registered")]
    DuplicateAlias(String),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Failure to classify a raw readout value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadoutError {
    #[error("cannot parse sensor readout result: {0}")]
    UnrecognizedReadoutShape(String),
}

/// Main error type for sensor-registry operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors, e.g. while reading a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Add(#[from] AddError),

    #[error(transparent)]
    Readout(#[from] ReadoutError),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
