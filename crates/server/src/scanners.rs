// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-device validation engines.
//!
//! Each scanning device gets its own `ValidationEngine`, created on first
//! scan. The engine acts as whichever gatekeeper sent the current request,
//! so a device may change hands between scans. Engines are locked
//! individually so one device never blocks another.

use mi3ad::ValidationEngine;
use mi3ad_api::AuthenticatedActor;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A device's engine behind its own lock.
pub type SharedEngine = Arc<Mutex<ValidationEngine>>;

/// Registry of scanning devices keyed by device id.
#[derive(Default)]
pub struct ScannerRegistry {
    engines: Mutex<HashMap<String, SharedEngine>>,
}

impl ScannerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the engine for `device_id`, creating an idle one if needed.
    pub async fn get_or_create(&self, device_id: &str, actor: &AuthenticatedActor) -> SharedEngine {
        let mut engines = self.engines.lock().await;
        Arc::clone(engines.entry(device_id.to_string()).or_insert_with(|| {
            info!(device_id = %device_id, actor_id = %actor.id, "Registered scanning device");
            Arc::new(Mutex::new(ValidationEngine::new(actor.to_audit_actor())))
        }))
    }

    /// Returns the engine for `device_id`, if the device has scanned before.
    pub async fn get(&self, device_id: &str) -> Option<SharedEngine> {
        self.engines.lock().await.get(device_id).map(Arc::clone)
    }
}
