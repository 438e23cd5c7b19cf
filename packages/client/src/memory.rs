//! In-process [`PageApi`] backed by maps, for tests and offline use.
//!
//! Failures can be injected per operation and a fixed latency added so
//! overlapping requests are observable.

use chrono::Utc;
use pagecraft_blocks::{LandingPage, PageContent};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::api::{CheckoutRequest, CopyRequest, PageApi, SaveVersionRequest, SnapshotRef, VersionSnapshot};
use crate::error::ApiError;

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    GetPage,
    PutPage,
    SaveVersion,
    ListVersions,
    FetchVersion,
    ApplyVersion,
    DeleteVersion,
    GenerateCopy,
    Checkout,
    Upload,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Pages by owner username
    pages: BTreeMap<String, LandingPage>,
    /// Snapshots by page id, in creation order
    versions: BTreeMap<String, Vec<VersionSnapshot>>,
    failing: BTreeSet<Operation>,
    checkouts: Vec<CheckoutRequest>,
    uploads: Vec<String>,
    puts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPageApi {
    state: Arc<Mutex<MemoryState>>,
    latency: Option<Duration>,
}

impl MemoryPageApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, page: LandingPage) -> Self {
        self.insert_page(page);
        self
    }

    /// Delay every request by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_page(&self, page: LandingPage) {
        self.lock().pages.insert(page.username.clone(), page);
    }

    /// Stored page for `owner`
    pub fn page(&self, owner: &str) -> Option<LandingPage> {
        self.lock().pages.get(owner).cloned()
    }

    pub fn snapshots(&self, page_id: &str) -> Vec<VersionSnapshot> {
        self.lock().versions.get(page_id).cloned().unwrap_or_default()
    }

    /// Make `op` fail until [`MemoryPageApi::recover`] is called
    pub fn fail(&self, op: Operation) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Operation) {
        self.lock().failing.remove(&op);
    }

    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.lock().checkouts.clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.lock().uploads.clone()
    }

    /// Number of successful full-page saves
    pub fn put_count(&self) -> usize {
        self.lock().puts
    }

    async fn enter(&self, op: Operation) -> Result<(), ApiError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.lock().failing.contains(&op) {
            debug!(?op, "Injected failure");
            return Err(ApiError::Unavailable(format!("{:?} is failing", op)));
        }
        Ok(())
    }
}

impl PageApi for MemoryPageApi {
    async fn get_landing_page(&self, owner: &str) -> Result<LandingPage, ApiError> {
        self.enter(Operation::GetPage).await?;
        self.page(owner)
            .ok_or_else(|| ApiError::NotFound(format!("landing page for {}", owner)))
    }

    async fn put_landing_page(&self, page: &LandingPage) -> Result<(), ApiError> {
        self.enter(Operation::PutPage).await?;
        let mut state = self.lock();
        state.pages.insert(page.username.clone(), page.clone());
        state.puts += 1;
        Ok(())
    }

    async fn save_version(&self, page_id: &str, request: &SaveVersionRequest) -> Result<SnapshotRef, ApiError> {
        self.enter(Operation::SaveVersion).await?;
        let now = Utc::now();
        let mut state = self.lock();
        let versions = state.versions.entry(page_id.to_string()).or_default();

        let existing = request
            .version_id
            .as_deref()
            .and_then(|id| versions.iter_mut().find(|v| v.id == id));

        let snapshot = match existing {
            Some(snapshot) => {
                snapshot.name = request.name.clone();
                snapshot.snapshot_payload = request.snapshot_payload.clone();
                snapshot.updated_at = now;
                snapshot.to_ref()
            }
            None => {
                let snapshot = VersionSnapshot {
                    id: Uuid::new_v4().to_string(),
                    name: request.name.clone(),
                    created_at: now,
                    updated_at: now,
                    snapshot_payload: request.snapshot_payload.clone(),
                };
                let created = snapshot.to_ref();
                versions.push(snapshot);
                created
            }
        };
        Ok(snapshot)
    }

    async fn list_versions(&self, page_id: &str) -> Result<Vec<SnapshotRef>, ApiError> {
        self.enter(Operation::ListVersions).await?;
        Ok(self.snapshots(page_id).iter().map(VersionSnapshot::to_ref).collect())
    }

    async fn fetch_version_payload(&self, version_id: &str) -> Result<PageContent, ApiError> {
        self.enter(Operation::FetchVersion).await?;
        self.lock()
            .versions
            .values()
            .flatten()
            .find(|v| v.id == version_id)
            .map(|v| v.snapshot_payload.clone())
            .ok_or_else(|| ApiError::NotFound(format!("version {}", version_id)))
    }

    async fn apply_version(&self, page_id: &str, payload: &PageContent) -> Result<(), ApiError> {
        self.enter(Operation::ApplyVersion).await?;
        let mut state = self.lock();
        let page = state
            .pages
            .values_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| ApiError::NotFound(format!("landing page {}", page_id)))?;
        page.apply_content(payload.clone());
        Ok(())
    }

    async fn delete_version(&self, version_id: &str) -> Result<(), ApiError> {
        self.enter(Operation::DeleteVersion).await?;
        let mut state = self.lock();
        for versions in state.versions.values_mut() {
            if let Some(index) = versions.iter().position(|v| v.id == version_id) {
                versions.remove(index);
                return Ok(());
            }
        }
        Err(ApiError::NotFound(format!("version {}", version_id)))
    }

    async fn generate_copy(&self, request: &CopyRequest) -> Result<String, ApiError> {
        self.enter(Operation::GenerateCopy).await?;
        Ok(format!("{} ({})", request.prompt.trim(), request.block_type.label()))
    }

    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<String, ApiError> {
        self.enter(Operation::Checkout).await?;
        let session = Uuid::new_v4();
        self.lock().checkouts.push(request.clone());
        Ok(format!("https://checkout.example.test/session/{}", session))
    }

    async fn upload_asset(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        self.enter(Operation::Upload).await?;
        let url = format!("https://cdn.example.test/{}/{}", bytes.len(), file_name);
        self.lock().uploads.push(url.clone());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, version_id: Option<&str>) -> SaveVersionRequest {
        SaveVersionRequest {
            name: name.into(),
            snapshot_payload: PageContent::default(),
            version_id: version_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_by_id() {
        let api = MemoryPageApi::new();
        let first = api.save_version("p1", &request("Draft", None)).await.unwrap();
        let again = api.save_version("p1", &request("Final", Some(&first.id))).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_eq!(again.name, "Final");
        assert_eq!(api.list_versions("p1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let api = MemoryPageApi::new().with_page(LandingPage::new("p1", "ada"));
        api.fail(Operation::GetPage);
        assert!(matches!(api.get_landing_page("ada").await, Err(ApiError::Unavailable(_))));

        api.recover(Operation::GetPage);
        assert_eq!(api.get_landing_page("ada").await.unwrap().id, "p1");
    }

    #[tokio::test]
    async fn test_delete_unknown_version() {
        let api = MemoryPageApi::new();
        assert!(matches!(api.delete_version("nope").await, Err(ApiError::NotFound(_))));
    }
}
