// ── Fleet ──
//
// Named firewall connections for multi-appliance front ends. The map is
// guarded by an async RwLock so lookups run concurrently with each other.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::CoreError;
use crate::firewall::Firewall;

#[derive(Default)]
pub struct Fleet {
    connections: RwLock<HashMap<String, Firewall>>,
    active: RwLock<Option<String>>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a connection. The first connection becomes active.
    pub async fn insert(&self, name: impl Into<String>, firewall: Firewall) -> Option<Firewall> {
        let name = name.into();
        let previous = self
            .connections
            .write()
            .await
            .insert(name.clone(), firewall);

        let mut active = self.active.write().await;
        if active.is_none() {
            debug!(%name, "first connection becomes active");
            *active = Some(name);
        }
        previous
    }

    /// Drop a connection, clearing the active selection if it pointed here.
    pub async fn remove(&self, name: &str) -> Option<Firewall> {
        let removed = self.connections.write().await.remove(name);
        let mut active = self.active.write().await;
        if active.as_deref() == Some(name) {
            *active = None;
        }
        removed
    }

    pub async fn get(&self, name: &str) -> Option<Firewall> {
        self.connections.read().await.get(name).cloned()
    }

    /// Connection names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn set_active(&self, name: &str) -> Result<(), CoreError> {
        if !self.connections.read().await.contains_key(name) {
            return Err(CoreError::NotFound {
                entity_type: "connection".into(),
                identifier: name.into(),
            });
        }
        *self.active.write().await = Some(name.to_owned());
        Ok(())
    }

    pub async fn active_name(&self) -> Option<String> {
        self.active.read().await.clone()
    }

    /// The active connection, if one is selected and still present.
    pub async fn active(&self) -> Option<Firewall> {
        let name = self.active_name().await?;
        self.get(&name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panfly_api::XmlApiClient;

    fn firewall(host: &str) -> Firewall {
        let base = url::Url::parse(host).expect("valid url");
        let client =
            XmlApiClient::with_client(reqwest::Client::new(), &base).expect("valid client");
        Firewall::with_client(client)
    }

    #[tokio::test]
    async fn first_insert_is_active_and_removal_clears_it() {
        let fleet = Fleet::new();
        fleet.insert("hq", firewall("https://hq.example.net")).await;
        fleet.insert("branch", firewall("https://branch.example.net")).await;

        assert_eq!(fleet.active_name().await.as_deref(), Some("hq"));
        assert_eq!(fleet.names().await, vec!["branch", "hq"]);

        fleet.set_active("branch").await.expect("known connection");
        let active = fleet.active().await.expect("active connection");
        assert_eq!(active.client().endpoint().host_str(), Some("branch.example.net"));

        fleet.remove("branch").await;
        assert!(fleet.active().await.is_none());
    }

    #[tokio::test]
    async fn unknown_connection_is_not_found() {
        let fleet = Fleet::new();
        assert!(matches!(
            fleet.set_active("nope").await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn clones_share_target_state() {
        let fleet = Fleet::new();
        fleet.insert("panorama", firewall("https://panorama.example.net")).await;
        let a = fleet.get("panorama").await.expect("present");
        a.set_target("0011223344");
        let b = fleet.get("panorama").await.expect("present");
        assert_eq!(b.target().as_deref(), Some("0011223344"));
    }
}
