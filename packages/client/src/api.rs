//! # Page Backend Contract
//!
//! The REST collaborator the builder talks to. Everything behind this trait
//! (auth, storage, payments, AI copy) is out of process; implementations
//! only move payloads.

use chrono::{DateTime, Utc};
use pagecraft_blocks::{BlockKind, LandingPage, PageContent};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::ApiError;

/// A saved snapshot as listed, without its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRef {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, timestamped copy of a page's content fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub snapshot_payload: PageContent,
}

impl VersionSnapshot {
    pub fn to_ref(&self) -> SnapshotRef {
        SnapshotRef {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVersionRequest {
    pub name: String,
    pub snapshot_payload: PageContent,
    /// Snapshot to overwrite, `None` creates a new one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    pub prompt: String,
    pub block_type: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub page_id: String,
    pub seller_id: String,
    pub product_ref: String,
    pub price_cents: u64,
}

/// Backend operations used by the builder
pub trait PageApi: Send + Sync {
    /// Load the page owned by `owner`, with its blocks normalized
    fn get_landing_page(&self, owner: &str) -> impl Future<Output = Result<LandingPage, ApiError>> + Send;

    /// Full-payload overwrite; concurrent saves are last-write-wins
    fn put_landing_page(&self, page: &LandingPage) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn save_version(
        &self,
        page_id: &str,
        request: &SaveVersionRequest,
    ) -> impl Future<Output = Result<SnapshotRef, ApiError>> + Send;

    fn list_versions(&self, page_id: &str) -> impl Future<Output = Result<Vec<SnapshotRef>, ApiError>> + Send;

    fn fetch_version_payload(&self, version_id: &str) -> impl Future<Output = Result<PageContent, ApiError>> + Send;

    /// Overwrite the live page's content fields with `payload`
    fn apply_version(
        &self,
        page_id: &str,
        payload: &PageContent,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_version(&self, version_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Opaque AI copy source
    fn generate_copy(&self, request: &CopyRequest) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Returns the redirect URL of the new checkout session
    fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Store an uploaded file, returning its public URL
    fn upload_asset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
}
