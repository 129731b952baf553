//! The sensor registry.
//!
//! A registry owns an insertion-ordered list of sensor descriptors. Every
//! add is all-or-nothing: the descriptor is constructed, checked for bus
//! resource conflicts against sensors of the same kind, configured through
//! its driver, and only then appended. Any failure leaves the registry
//! unchanged and is returned to the caller as an [`AddError`]; the registry
//! keeps accepting further adds and reads afterwards.
//!
//! Lookups are linear scans. At the scale of one board's worth of sensors
//! this is cheaper than maintaining an index.

use std::fmt::Write as _;

use serde_json::Value;

use crate::builder::SensorBuilder;
use crate::config::{Config, RegistrySettings};
use crate::descriptor::{SensorDescriptor, UNNAMED};
use crate::driver::DriverTable;
use crate::error::AddError;
use crate::kind::InterfaceKind;
use crate::params::{self, RawParams};
use crate::readout::{describe_readout, ReadResult};
use crate::schema;
use crate::tracing::prelude::*;

/// Ordered collection of registered sensors.
#[derive(Debug)]
pub struct Registry {
    sensors: Vec<SensorDescriptor>,
    drivers: DriverTable,
    settings: RegistrySettings,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry using the built-in drivers.
    pub fn new() -> Self {
        Self::with_drivers(DriverTable::builtin())
    }

    /// An empty registry using the given driver table.
    pub fn with_drivers(drivers: DriverTable) -> Self {
        Self {
            sensors: Vec::new(),
            drivers,
            settings: RegistrySettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RegistrySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build a registry from configuration, adding each configured sensor in
    /// order. Returns the registry and one outcome per configured sensor; a
    /// failed entry does not stop the rest from loading.
    pub fn from_config(config: &Config) -> (Self, Vec<Result<(), AddError>>) {
        let mut registry = Self::new().with_settings(config.registry.clone());
        let outcomes = config
            .sensors
            .iter()
            .map(|spec| registry.add_value(spec.clone()))
            .collect();
        (registry, outcomes)
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Construct a sensor of `kind` from raw parameters and register it.
    pub fn add(&mut self, kind: InterfaceKind, params: RawParams) -> Result<(), AddError> {
        let descriptor = match params::construct(kind, params, &self.drivers) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Cannot create sensor");
                return Err(e.into());
            }
        };
        self.insert(descriptor)
    }

    /// Register a sensor from a positional tuple
    /// `(kind, bus, address|chip-select|baud, [device name, [alias]])`.
    pub fn add_positional(&mut self, tuple: &[Value]) -> Result<(), AddError> {
        let (kind, params) = RawParams::from_tuple(tuple).inspect_err(|e| {
            warn!(error = %e, "Cannot create sensor");
        })?;
        self.add(kind, params)
    }

    /// Register a sensor from a builder.
    pub fn add_built(&mut self, builder: SensorBuilder) -> Result<(), AddError> {
        let kind = builder.kind();
        let descriptor = builder.build(&self.drivers).inspect_err(|e| {
            warn!(kind = %kind, error = %e, "Cannot create sensor");
        })?;
        self.insert(descriptor)
    }

    /// Register a sensor from JSON spec text, checking it against the spec
    /// schema first.
    pub fn add_json(&mut self, text: &str) -> Result<(), AddError> {
        let map = schema::parse_spec(text).inspect_err(|e| {
            warn!(error = %e, "Invalid sensor JSON input");
        })?;
        self.add_object(map)
    }

    /// Register a sensor from an already-parsed JSON spec, checking it
    /// against the spec schema first.
    pub fn add_value(&mut self, spec: Value) -> Result<(), AddError> {
        let map = schema::into_object(spec).inspect_err(|e| {
            warn!(error = %e, "Invalid sensor JSON input");
        })?;
        self.add_object(map)
    }

    fn add_object(&mut self, map: serde_json::Map<String, Value>) -> Result<(), AddError> {
        schema::check_fields(&map, schema::BASE_FIELDS).inspect_err(|e| {
            warn!(error = %e, "Sensor spec failed base schema check");
        })?;

        let (kind, params) = RawParams::from_map(map).inspect_err(|e| {
            warn!(error = %e, "Cannot create sensor");
        })?;

        if let RawParams::Keyed(map) = &params {
            schema::check_fields(map, schema::kind_fields(kind)).inspect_err(|e| {
                warn!(kind = %kind, error = %e, "Sensor spec failed device schema check");
            })?;
        }

        self.add(kind, params)
    }

    /// Validate, configure and append a constructed descriptor.
    fn insert(&mut self, descriptor: SensorDescriptor) -> Result<(), AddError> {
        let kind = descriptor.kind();
        let key = descriptor.resource_key();

        if !validate(&descriptor, &self.sensors) {
            warn!(
                kind = %kind,
                key = %key,
                alias = %descriptor.alias(),
                "Bus resource already in use, sensor not added"
            );
            return Err(AddError::ResourceConflict { kind, key });
        }

        if self.settings.unique_aliases
            && descriptor.alias() != UNNAMED
            && self.find_by_alias(descriptor.alias()).is_some()
        {
            warn!(alias = %descriptor.alias(), "Alias already registered, sensor not added");
            return Err(AddError::DuplicateAlias(descriptor.alias().to_string()));
        }

        let interface = descriptor.interface();
        if let Some(driver) = self.drivers.get(kind) {
            driver
                .configure(interface.bus_no(), interface.secondary())
                .inspect_err(|e| {
                    warn!(kind = %kind, key = %key, error = %e, "Sensor configuration failed");
                })?;
        }

        info!(
            kind = %kind,
            key = %key,
            device = %descriptor.device_name(),
            alias = %descriptor.alias(),
            "Sensor added."
        );
        self.sensors.push(descriptor);
        Ok(())
    }

    /// Registered sensors in insertion order. Restartable: each call yields
    /// the same sequence.
    pub fn list(&self) -> impl Iterator<Item = &SensorDescriptor> + '_ {
        self.sensors.iter()
    }

    /// Sensors of `kind`, in insertion order.
    pub fn find_by_kind(&self, kind: InterfaceKind) -> Vec<&SensorDescriptor> {
        self.sensors.iter().filter(|s| s.kind() == kind).collect()
    }

    /// First sensor registered under `alias`.
    pub fn find_by_alias(&self, alias: &str) -> Option<&SensorDescriptor> {
        self.sensors.iter().find(|s| s.alias() == alias)
    }

    /// `(alias, reading)` for every sensor, in insertion order.
    ///
    /// Readings are taken lazily as the iterator advances, so a consumer sees
    /// the value current at that moment.
    pub fn read_all(&self) -> impl Iterator<Item = (&str, ReadResult)> + '_ {
        self.sensors.iter().map(|sensor| {
            trace!(alias = %sensor.alias(), driver = sensor.driver_name(), "Reading sensor");
            (sensor.alias(), sensor.read())
        })
    }

    /// Property listing for every sensor.
    pub fn describe_all(&self) -> String {
        if self.sensors.is_empty() {
            return "No sensors registered!".to_string();
        }
        let mut out = String::from("Registered sensors:\n===================");
        for sensor in &self.sensors {
            // Writing to a String cannot fail
            let _ = write!(out, "\n{}\n", sensor.describe());
        }
        out
    }

    /// Take a reading from every sensor and render it with the sensor's
    /// index, alias and device name.
    pub fn read_report(&self) -> String {
        if self.sensors.is_empty() {
            return "No sensors registered!".to_string();
        }
        let mut out = String::from("Sensor readings:\n================");
        for (idx, sensor) in self.sensors.iter().enumerate() {
            let reading = sensor.read();
            let _ = write!(
                out,
                "\nSensor no.{}: {} (type={})\n{}",
                idx,
                sensor.alias(),
                sensor.device_name(),
                describe_readout(&reading)
            );
        }
        out
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a SensorDescriptor;
    type IntoIter = std::slice::Iter<'a, SensorDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.sensors.iter()
    }
}

/// Whether `candidate` can join `existing` without occupying a bus resource
/// already taken by a sensor of the same kind.
pub fn validate(candidate: &SensorDescriptor, existing: &[SensorDescriptor]) -> bool {
    let key = candidate.resource_key();
    !existing
        .iter()
        .filter(|s| s.kind() == candidate.kind())
        .any(|s| key.collides_with(&s.resource_key()))
}
