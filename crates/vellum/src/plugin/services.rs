// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistrationError;
use crate::plugin::ServiceKey;

struct ServiceEntry {
    plugin_id: Option<String>,
    value: Arc<dyn Any + Send + Sync>,
}

/// Typed service registry: plugins publish shared implementations under
/// a [`ServiceKey`] and consumers downcast through the same key.
#[derive(Default)]
pub struct ServiceMap {
    services: HashMap<&'static str, ServiceEntry>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Send + Sync + 'static>(
        &mut self,
        key: &ServiceKey<T>,
        value: Arc<T>,
        plugin_id: Option<String>,
    ) -> Result<(), RegistrationError> {
        if self.services.contains_key(key.name()) {
            return Err(RegistrationError::Duplicate {
                kind: "service",
                name: key.name().to_owned(),
            });
        }
        self.services.insert(
            key.name(),
            ServiceEntry {
                plugin_id,
                value,
            },
        );
        Ok(())
    }

    pub fn get<T: Send + Sync + 'static>(
        &self,
        key: &ServiceKey<T>,
    ) -> Option<Arc<T>> {
        let entry = self.services.get(key.name())?;
        Arc::clone(&entry.value).downcast::<T>().ok()
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.services.remove(name).is_some()
    }

    pub fn remove_plugin(&mut self, plugin_id: &str) {
        self.services.retain(|_, entry| {
            entry.plugin_id.as_deref() != Some(plugin_id)
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static DICTIONARY: ServiceKey<Vec<String>> =
        ServiceKey::new("dictionary");

    #[test]
    fn services_round_trip_through_their_typed_key() {
        let mut services = ServiceMap::new();
        services
            .register(
                &DICTIONARY,
                Arc::new(vec!["hello".to_owned()]),
                None,
            )
            .unwrap();
        let words = services.get(&DICTIONARY).unwrap();
        assert_eq!(words[0], "hello");
    }

    #[test]
    fn duplicate_service_registration_fails() {
        let mut services = ServiceMap::new();
        services
            .register(&DICTIONARY, Arc::new(Vec::new()), None)
            .unwrap();
        assert!(services
            .register(&DICTIONARY, Arc::new(Vec::new()), None)
            .is_err());
    }
}
