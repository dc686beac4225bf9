//! Named service registry.
//!
//! The host builds one at startup and dispatches operations by name. There
//! is no global registration.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ServiceHandler: Send + Sync {
    /// Run the operation. `Value::Null` means nothing was produced.
    async fn call(&self, attrs: Value) -> Value;
}

#[derive(Clone)]
pub struct ServiceEntry {
    pub description: String,
    pub handler: Arc<dyn ServiceHandler>,
}

#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, description: &str, handler: Arc<dyn ServiceHandler>) {
        if self.services.contains_key(name) {
            log::warn!("service {} re-registered", name);
        }
        self.services.insert(
            name.to_string(),
            ServiceEntry {
                description: description.to_string(),
                handler,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn describe(&self, name: &str) -> Option<&str> {
        self.services.get(name).map(|e| e.description.as_str())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    /// `None` when no service is registered under `name`.
    pub async fn dispatch(&self, name: &str, attrs: Value) -> Option<Value> {
        let Some(entry) = self.services.get(name) else {
            log::warn!("dispatch to unknown service {}", name);
            return None;
        };
        log::debug!("dispatching {}", name);
        Some(entry.handler.call(attrs).await)
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}
