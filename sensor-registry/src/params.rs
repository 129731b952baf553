//! Raw construction parameters.
//!
//! Sensors arrive either as a positional tuple in fixed per-kind order
//! (`kind, bus, address|chip-select|baud, device name, alias`) or as a keyed
//! map (`{"sensor_type", "bus_no", "i2c_addr"|"cs_no"|"baud_rate",
//! "dev_name", "alias", ...}`). Both are lowered onto a [`SensorBuilder`].

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::builder::SensorBuilder;
use crate::descriptor::SensorDescriptor;
use crate::driver::DriverTable;
use crate::error::ConstructionError;
use crate::kind::InterfaceKind;

/// Parameters for one sensor, without the kind tag.
#[derive(Debug, Clone, PartialEq)]
pub enum RawParams {
    /// `bus, secondary, [device name, [alias]]`
    Positional(Vec<Value>),
    /// Keyed properties; keys outside the base set become extensions.
    Keyed(Map<String, Value>),
}

impl RawParams {
    /// Split a full positional tuple into its kind tag and parameters.
    pub fn from_tuple(tuple: &[Value]) -> Result<(InterfaceKind, RawParams), ConstructionError> {
        let (tag, rest) = tuple
            .split_first()
            .ok_or(ConstructionError::MissingField("sensor_type"))?;
        let kind = parse_kind(tag)?;
        Ok((kind, RawParams::Positional(rest.to_vec())))
    }

    /// Split a keyed map into its kind tag (`sensor_type`) and parameters.
    pub fn from_map(map: Map<String, Value>) -> Result<(InterfaceKind, RawParams), ConstructionError> {
        let tag = map
            .get("sensor_type")
            .ok_or(ConstructionError::MissingField("sensor_type"))?;
        let kind = parse_kind(tag)?;
        Ok((kind, RawParams::Keyed(map)))
    }

    /// Lower these parameters onto a builder for `kind`.
    pub fn into_builder(self, kind: InterfaceKind) -> Result<SensorBuilder, ConstructionError> {
        match self {
            RawParams::Positional(values) => positional_builder(kind, values),
            RawParams::Keyed(map) => keyed_builder(kind, map),
        }
    }
}

/// Build a descriptor of `kind` from raw parameters, binding its driver from
/// `drivers`. Pure: nothing is registered or configured.
pub fn construct(
    kind: InterfaceKind,
    params: RawParams,
    drivers: &DriverTable,
) -> Result<SensorDescriptor, ConstructionError> {
    params.into_builder(kind)?.build(drivers)
}

pub(crate) fn parse_kind(tag: &Value) -> Result<InterfaceKind, ConstructionError> {
    match tag {
        Value::String(s) => {
            InterfaceKind::from_str(s).map_err(|_| ConstructionError::UnknownSensorKind(s.clone()))
        }
        other => Err(ConstructionError::UnknownSensorKind(other.to_string())),
    }
}

fn positional_builder(
    kind: InterfaceKind,
    values: Vec<Value>,
) -> Result<SensorBuilder, ConstructionError> {
    if values.len() > 4 {
        return Err(ConstructionError::MalformedParams(format!(
            "{} sensor takes at most 4 positional parameters after the kind, got {}",
            kind,
            values.len()
        )));
    }

    let mut values = values.into_iter();
    let mut builder = SensorBuilder::new(kind);
    if let Some(bus) = values.next() {
        builder = builder.bus_value(bus);
    }
    if let Some(secondary) = values.next() {
        builder = builder.secondary_value(kind.secondary_field(), secondary);
    }
    if let Some(name) = optional_string("dev_name", values.next())? {
        builder = builder.device_name(name);
    }
    if let Some(alias) = optional_string("alias", values.next())? {
        builder = builder.alias(alias);
    }
    Ok(builder)
}

fn keyed_builder(
    kind: InterfaceKind,
    map: Map<String, Value>,
) -> Result<SensorBuilder, ConstructionError> {
    let secondary_field = kind.secondary_field();
    let mut builder = SensorBuilder::new(kind);

    for (name, value) in map {
        match name.as_str() {
            "sensor_type" => {
                let tagged = parse_kind(&value)?;
                if tagged != kind {
                    return Err(ConstructionError::MalformedParams(format!(
                        "sensor_type {} does not match {}",
                        tagged, kind
                    )));
                }
            }
            "bus_no" => builder = builder.bus_value(value),
            "dev_name" => {
                if let Some(dev_name) = optional_string("dev_name", Some(value))? {
                    builder = builder.device_name(dev_name);
                }
            }
            "alias" => {
                if let Some(alias) = optional_string("alias", Some(value))? {
                    builder = builder.alias(alias);
                }
            }
            field if field == secondary_field => {
                builder = builder.secondary_value(secondary_field, value);
            }
            _ => builder = builder.extension(name, value),
        }
    }
    Ok(builder)
}

// Strings pass through; absent or null mean "not given".
fn optional_string(
    field: &str,
    value: Option<Value>,
) -> Result<Option<String>, ConstructionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ConstructionError::MalformedParams(format!(
            "'{}' must be a string, got {}",
            field, other
        ))),
    }
}
