//! Registry access shared between threads.
//!
//! The registry is the only mutable state in the crate. `add` checks for
//! conflicts and then inserts, so it holds the write lock across both steps;
//! two concurrent adds of the same resource cannot both pass validation.
//! Readers take the read lock and get owned copies, so no reference outlives
//! the lock.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::builder::SensorBuilder;
use crate::descriptor::SensorDescriptor;
use crate::error::AddError;
use crate::kind::InterfaceKind;
use crate::params::RawParams;
use crate::readout::ReadResult;
use crate::registry::Registry;

/// Cloneable handle to a registry behind a reader-writer lock.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn add(&self, kind: InterfaceKind, params: RawParams) -> Result<(), AddError> {
        self.inner.write().add(kind, params)
    }

    pub fn add_positional(&self, tuple: &[Value]) -> Result<(), AddError> {
        self.inner.write().add_positional(tuple)
    }

    pub fn add_json(&self, text: &str) -> Result<(), AddError> {
        self.inner.write().add_json(text)
    }

    pub fn add_built(&self, builder: SensorBuilder) -> Result<(), AddError> {
        self.inner.write().add_built(builder)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of every registered descriptor, in insertion order.
    pub fn snapshot(&self) -> Vec<SensorDescriptor> {
        self.inner.read().list().cloned().collect()
    }

    pub fn find_by_kind(&self, kind: InterfaceKind) -> Vec<SensorDescriptor> {
        self.inner
            .read()
            .find_by_kind(kind)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<SensorDescriptor> {
        self.inner.read().find_by_alias(alias).cloned()
    }

    /// `(alias, reading)` for every sensor, taken under one read lock.
    pub fn read_all(&self) -> Vec<(String, ReadResult)> {
        self.inner
            .read()
            .read_all()
            .map(|(alias, reading)| (alias.to_string(), reading))
            .collect()
    }

    /// Run `f` with shared access to the registry.
    pub fn with_read<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn test_concurrent_adds_of_same_resource() {
        let shared = SharedRegistry::default();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let alias = format!("sensor{}", n);
                    shared.add_positional(&[
                        json!("i2c"),
                        json!(2),
                        json!(78),
                        json!("BM280"),
                        json!(alias),
                    ])
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AddError::ResourceConflict { .. })));
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_adds() {
        let shared = SharedRegistry::default();
        let handles: Vec<_> = (0..8)
            .map(|cs| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.add_built(SensorBuilder::new(InterfaceKind::Spi).bus(1).chip_select(cs))
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(shared.find_by_kind(InterfaceKind::Spi).len(), 8);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let shared = SharedRegistry::default();
        shared
            .add_positional(&[json!("uart"), json!(4), json!(115200), json!("H"), json!("u")])
            .unwrap();
        let snapshot = shared.snapshot();
        shared
            .add_positional(&[json!("uart"), json!(5), json!(9600), json!("H"), json!("v")])
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.find_by_alias("v").unwrap().device_name(), "H");
        assert_eq!(
            shared.read_all(),
            [
                ("u".to_string(), ReadResult::List(vec![3, 4, 5])),
                ("v".to_string(), ReadResult::List(vec![3, 4, 5])),
            ]
        );
        assert_eq!(shared.with_read(|r| r.list().count()), 2);
    }
}
