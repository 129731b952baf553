//! Boundary checks for keyed (JSON) sensor specs.
//!
//! A spec must carry the base fields `sensor_type` (string), `bus_no`
//! (integer) and `dev_name` (string), plus the integer field required by its
//! kind. Every failing field is reported, and a spec with any failure is
//! rejected before construction is attempted.

use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaErrors};
use crate::kind::InterfaceKind;

/// JSON type a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
}

impl FieldType {
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
        }
    }
}

/// A required field and its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn required(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec { name, ty }
}

/// Fields every sensor spec must carry.
pub const BASE_FIELDS: &[FieldSpec] = &[
    required("sensor_type", FieldType::String),
    required("bus_no", FieldType::Integer),
    required("dev_name", FieldType::String),
];

const I2C_FIELDS: &[FieldSpec] = &[required("i2c_addr", FieldType::Integer)];
const SPI_FIELDS: &[FieldSpec] = &[required("cs_no", FieldType::Integer)];
const UART_FIELDS: &[FieldSpec] = &[required("baud_rate", FieldType::Integer)];

/// Fields required in addition to [`BASE_FIELDS`] for `kind`.
pub const fn kind_fields(kind: InterfaceKind) -> &'static [FieldSpec] {
    match kind {
        InterfaceKind::I2c => I2C_FIELDS,
        InterfaceKind::Spi => SPI_FIELDS,
        InterfaceKind::Uart => UART_FIELDS,
    }
}

/// Check `map` against `fields`, reporting every missing or mistyped field.
pub fn check_fields(map: &Map<String, Value>, fields: &[FieldSpec]) -> Result<(), SchemaErrors> {
    let errors: Vec<SchemaError> = fields
        .iter()
        .filter_map(|field| match map.get(field.name) {
            None => Some(SchemaError::MissingField(field.name.to_string())),
            Some(value) if !field.ty.matches(value) => {
                Some(SchemaError::WrongType(field.name.to_string(), field.ty.name()))
            }
            Some(_) => None,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors(errors))
    }
}

/// Parse spec text into a JSON object.
pub fn parse_spec(text: &str) -> Result<Map<String, Value>, SchemaErrors> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SchemaErrors(vec![SchemaError::InvalidJson(e.to_string())]))?;
    into_object(value)
}

/// Require `value` to be a JSON object.
pub fn into_object(value: Value) -> Result<Map<String, Value>, SchemaErrors> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(SchemaErrors(vec![SchemaError::NotAnObject])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        into_object(value).unwrap()
    }

    #[test]
    fn test_valid_base_fields() {
        let spec = object(json!({"sensor_type": "i2c", "bus_no": 2, "dev_name": "BM280"}));
        assert!(check_fields(&spec, BASE_FIELDS).is_ok());
    }

    #[test]
    fn test_reports_every_failing_field() {
        let spec = object(json!({"sensor_type": 3, "dev_name": "BM281"}));
        let errors = check_fields(&spec, BASE_FIELDS).unwrap_err();
        assert_eq!(
            errors.errors(),
            [
                SchemaError::WrongType("sensor_type".into(), "string"),
                SchemaError::MissingField("bus_no".into()),
            ]
        );
    }

    #[test]
    fn test_kind_fields() {
        let spec = object(json!({"sensor_type": "i2c", "bus_no": 2, "dev_name": "BM281"}));
        assert_eq!(
            check_fields(&spec, kind_fields(InterfaceKind::I2c))
                .unwrap_err()
                .errors(),
            [SchemaError::MissingField("i2c_addr".into())]
        );

        let spec = object(json!({"cs_no": "3"}));
        assert_eq!(
            check_fields(&spec, kind_fields(InterfaceKind::Spi))
                .unwrap_err()
                .errors(),
            [SchemaError::WrongType("cs_no".into(), "integer")]
        );
    }

    #[test]
    fn test_float_is_not_integer() {
        let spec = object(json!({"baud_rate": 9600.5}));
        assert!(check_fields(&spec, kind_fields(InterfaceKind::Uart)).is_err());
    }

    #[test]
    fn test_parse_spec() {
        assert!(parse_spec(r#"{"sensor_type": "spi"}"#).is_ok());
        assert_eq!(
            parse_spec("[1, 2]").unwrap_err().errors(),
            [SchemaError::NotAnObject]
        );
        assert!(matches!(
            parse_spec("{not json").unwrap_err().errors(),
            [SchemaError::InvalidJson(_)]
        ));
    }

    #[test]
    fn test_error_display_joins_fields() {
        let errors = SchemaErrors(vec![
            SchemaError::MissingField("bus_no".into()),
            SchemaError::WrongType("dev_name".into(), "string"),
        ]);
        assert_eq!(
            errors.to_string(),
            "missing required property 'bus_no'; property 'dev_name' has wrong type (expected string)"
        );
    }
}
