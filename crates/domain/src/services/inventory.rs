//! Source-inventory collaborator trait.
//!
//! The source-of-truth inventory is an external system; this trait is
//! the read seam the sync core uses to look devices up (conflict
//! detection, export eligibility). The in-memory implementation is
//! kept current by the device lifecycle events the collaborator sends.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::SourceDevice;

/// Read access to the source-of-truth inventory.
#[async_trait]
pub trait SourceInventory: Send + Sync {
    /// Fetch one device by its source-inventory ID.
    async fn get_device(&self, id: Uuid) -> Option<SourceDevice>;

    /// All devices whose primary IPv4 (CIDR stripped) equals `ip`.
    async fn find_by_primary_ip(&self, ip: &str) -> Vec<SourceDevice>;

    /// All devices currently known to the inventory.
    async fn list_devices(&self) -> Vec<SourceDevice>;
}

/// In-process mirror of the source inventory, fed by lifecycle events.
///
/// Devices the collaborator has announced via device-saved events are
/// the set visible to conflict detection and export.
#[derive(Default)]
pub struct InMemorySourceInventory {
    devices: RwLock<HashMap<Uuid, SourceDevice>>,
}

impl InMemorySourceInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a device in the mirror.
    pub async fn upsert(&self, device: SourceDevice) {
        self.devices.write().await.insert(device.id, device);
    }

    /// Remove a device from the mirror. Unknown IDs are a no-op.
    pub async fn remove(&self, id: Uuid) {
        self.devices.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }
}

#[async_trait]
impl SourceInventory for InMemorySourceInventory {
    async fn get_device(&self, id: Uuid) -> Option<SourceDevice> {
        self.devices.read().await.get(&id).cloned()
    }

    async fn find_by_primary_ip(&self, ip: &str) -> Vec<SourceDevice> {
        self.devices
            .read()
            .await
            .values()
            .filter(|d| d.primary_ip().as_deref() == Some(ip))
            .cloned()
            .collect()
    }

    async fn list_devices(&self) -> Vec<SourceDevice> {
        self.devices.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceDeviceStatus;

    fn device(name: &str, ip: &str) -> SourceDevice {
        SourceDevice {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: SourceDeviceStatus::Active,
            primary_ip4: Some(ip.to_string()),
            site: None,
            role: None,
            platform: None,
            device_type: None,
            serial: None,
            asset_tag: None,
            comments: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let inventory = InMemorySourceInventory::new();
        let d = device("core-sw-01", "10.1.1.10/24");
        let id = d.id;

        inventory.upsert(d).await;
        let found = inventory.get_device(id).await.unwrap();
        assert_eq!(found.name, "core-sw-01");
    }

    #[tokio::test]
    async fn test_find_by_primary_ip_matches_stripped_cidr() {
        let inventory = InMemorySourceInventory::new();
        inventory.upsert(device("a", "10.0.0.5/24")).await;
        inventory.upsert(device("b", "10.0.0.5")).await;
        inventory.upsert(device("c", "10.0.0.6/24")).await;

        let matches = inventory.find_by_primary_ip("10.0.0.5").await;
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let inventory = InMemorySourceInventory::new();
        let mut d = device("core-sw-01", "10.1.1.10/24");
        let id = d.id;
        inventory.upsert(d.clone()).await;

        d.name = "core-sw-01-renamed".to_string();
        inventory.upsert(d).await;

        assert_eq!(inventory.len().await, 1);
        assert_eq!(
            inventory.get_device(id).await.unwrap().name,
            "core-sw-01-renamed"
        );
    }

    #[tokio::test]
    async fn test_remove_unknown_is_noop() {
        let inventory = InMemorySourceInventory::new();
        inventory.remove(Uuid::new_v4()).await;
        assert!(inventory.is_empty().await);
    }
}
