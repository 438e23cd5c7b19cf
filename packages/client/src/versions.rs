//! # Version Snapshots
//!
//! Named copies of a page's content fields. Saving resolves the target
//! snapshot by explicit id first, then by exact name; only a save that
//! would create a new snapshot counts against the tier cap, and hitting
//! the cap is an error rather than an eviction.

use pagecraft_blocks::PageContent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::api::{PageApi, SaveVersionRequest, SnapshotRef};
use crate::error::{ApiError, VersionError};

/// Subscription tier, which bounds how many snapshots a page keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Base,
    Pro,
}

impl Tier {
    pub fn version_cap(self) -> usize {
        match self {
            Tier::Base => 10,
            Tier::Pro => 30,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Base => "base",
            Tier::Pro => "pro",
        })
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Tier::Base),
            "pro" => Ok(Tier::Pro),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

/// Snapshot operations for one tier, over any backend
pub struct VersionService<'a, A: PageApi> {
    api: &'a A,
    tier: Tier,
}

impl<'a, A: PageApi> VersionService<'a, A> {
    pub fn new(api: &'a A, tier: Tier) -> Self {
        Self { api, tier }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Create a snapshot, or overwrite the one matching `existing_id` or `name`
    pub async fn save(
        &self,
        page_id: &str,
        name: &str,
        payload: PageContent,
        existing_id: Option<&str>,
    ) -> Result<SnapshotRef, VersionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VersionError::EmptyName);
        }

        let current = self.api.list_versions(page_id).await.map_err(unavailable)?;
        let target = existing_id
            .and_then(|id| current.iter().find(|v| v.id == id))
            .or_else(|| current.iter().find(|v| v.name == name))
            .map(|v| v.id.clone());

        let limit = self.tier.version_cap();
        if target.is_none() && current.len() >= limit {
            warn!(page_id, tier = %self.tier, limit, "Version cap reached");
            return Err(VersionError::CapReached { tier: self.tier, limit });
        }

        let overwrite = target.is_some();
        let request = SaveVersionRequest {
            name: name.to_string(),
            snapshot_payload: payload,
            version_id: target,
        };
        let saved = self.api.save_version(page_id, &request).await.map_err(unavailable)?;

        info!(page_id, version_id = %saved.id, name, overwrite, "Saved version");
        Ok(saved)
    }

    /// Snapshots of a page, most recently updated first
    pub async fn list(&self, page_id: &str) -> Result<Vec<SnapshotRef>, VersionError> {
        let mut versions = self.api.list_versions(page_id).await.map_err(unavailable)?;
        versions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(versions)
    }

    pub async fn fetch_payload(&self, version_id: &str) -> Result<PageContent, VersionError> {
        self.api.fetch_version_payload(version_id).await.map_err(unavailable)
    }

    /// Overwrite the live page with a snapshot, returning the applied payload.
    /// The snapshot itself is kept.
    pub async fn apply(&self, page_id: &str, version_id: &str) -> Result<PageContent, VersionError> {
        let payload = self.fetch_payload(version_id).await?;
        self.api.apply_version(page_id, &payload).await.map_err(unavailable)?;
        info!(page_id, version_id, "Applied version");
        Ok(payload)
    }

    pub async fn delete(&self, version_id: &str) -> Result<(), VersionError> {
        self.api.delete_version(version_id).await.map_err(unavailable)?;
        info!(version_id, "Deleted version");
        Ok(())
    }
}

fn unavailable(err: ApiError) -> VersionError {
    VersionError::ServiceUnavailable(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryPageApi, Operation};

    #[tokio::test]
    async fn test_cap_rejects_new_but_allows_overwrite() {
        let api = MemoryPageApi::new();
        let service = VersionService::new(&api, Tier::Base);
        for i in 0..10 {
            service
                .save("p1", &format!("v{}", i), PageContent::default(), None)
                .await
                .unwrap();
        }

        let err = service.save("p1", "v10", PageContent::default(), None).await.unwrap_err();
        assert!(matches!(err, VersionError::CapReached { limit: 10, .. }));
        assert_eq!(api.snapshots("p1").len(), 10);

        // same name overwrites in place
        service.save("p1", "v3", PageContent::default(), None).await.unwrap();
        assert_eq!(api.snapshots("p1").len(), 10);
    }

    #[tokio::test]
    async fn test_pro_tier_allows_thirty() {
        let api = MemoryPageApi::new();
        let service = VersionService::new(&api, Tier::Pro);
        for i in 0..30 {
            service
                .save("p1", &format!("v{}", i), PageContent::default(), None)
                .await
                .unwrap();
        }
        assert!(service.save("p1", "one more", PageContent::default(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_explicit_id_beats_name_match() {
        let api = MemoryPageApi::new();
        let service = VersionService::new(&api, Tier::Base);
        let a = service.save("p1", "A", PageContent::default(), None).await.unwrap();
        let b = service.save("p1", "B", PageContent::default(), None).await.unwrap();

        // renaming snapshot A to "B" overwrites A, not B
        let saved = service.save("p1", "B", PageContent::default(), Some(&a.id)).await.unwrap();
        assert_eq!(saved.id, a.id);

        let names: Vec<_> = api.snapshots("p1").into_iter().map(|v| (v.id, v.name)).collect();
        assert_eq!(names, vec![(a.id, "B".to_string()), (b.id, "B".to_string())]);
    }

    #[tokio::test]
    async fn test_blank_name_and_outage() {
        let api = MemoryPageApi::new();
        let service = VersionService::new(&api, Tier::Base);
        assert!(matches!(
            service.save("p1", "  ", PageContent::default(), None).await,
            Err(VersionError::EmptyName)
        ));

        api.fail(Operation::ListVersions);
        assert!(matches!(
            service.save("p1", "A", PageContent::default(), None).await,
            Err(VersionError::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("pro".parse::<Tier>(), Ok(Tier::Pro));
        assert!("gold".parse::<Tier>().is_err());
        assert_eq!(Tier::default().version_cap(), 10);
    }
}
